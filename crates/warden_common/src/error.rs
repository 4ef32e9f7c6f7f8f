// SPDX-License-Identifier: Apache-2.0

//! A small convention for crates that need to collect more than one error
//! from a single operation (e.g. loading every policy document under a
//! directory, where one bad file should not hide the others).

use std::error::Error;
use std::fmt::Display;

/// Implemented by an error enum that has a variant able to hold a list of
/// its own kind, so a batch of failures can be folded into one error.
pub trait AggregateError<E: Error> {
    /// Wraps a (possibly already-flattened) list of errors into a single
    /// compound error of the same type.
    fn compound(errors: Vec<E>) -> E;
}

/// Folds a list of errors into `Ok(())` if empty, or `Err` of the compound
/// error otherwise.
pub fn handle_errors<E>(errors: Vec<E>) -> Result<(), E>
where
    E: AggregateError<E> + Error,
{
    if errors.is_empty() {
        Ok(())
    } else {
        Err(E::compound(errors))
    }
}

/// Renders a list of errors as one message, one per line.
#[must_use]
pub fn format_errors<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
