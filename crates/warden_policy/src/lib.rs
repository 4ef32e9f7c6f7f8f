// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

pub mod error;
pub mod loader;
pub mod model;
pub mod registry;

pub use error::{FileNotFoundError, PolicyError};
pub use model::{EngineBinding, Policy, Rule};
pub use registry::PolicyRegistry;
