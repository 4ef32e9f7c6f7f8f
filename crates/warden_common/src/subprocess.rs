// SPDX-License-Identifier: Apache-2.0

//! Runs a child process under a wall-clock deadline without pulling an
//! async runtime into an otherwise-synchronous core: the child is spawned
//! and waited-on from a helper thread, and the caller races that thread
//! against `recv_timeout` on a channel. Also provides the counting
//! semaphore that throttles subprocess-spawning checks independently of
//! the worker pool's own concurrency cap.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// A blocking counting semaphore bounding how many subprocess-spawning
/// checks may be mid-flight at once, regardless of how many worker
/// threads the audit's rayon pool is running.
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Creates a semaphore with `permits` concurrent slots.
    #[must_use]
    pub fn new(permits: usize) -> Self {
        Semaphore {
            permits: Mutex::new(permits.max(1)),
            available: Condvar::new(),
        }
    }

    /// Blocks until a slot is free, then holds it until the returned
    /// guard is dropped.
    pub fn acquire(&self) -> SemaphorePermit<'_> {
        let mut permits = self.permits.lock().expect("semaphore lock poisoned");
        while *permits == 0 {
            permits = self.available.wait(permits).expect("semaphore lock poisoned");
        }
        *permits -= 1;
        SemaphorePermit { semaphore: self }
    }
}

/// A held semaphore slot, released back to the pool on drop.
pub struct SemaphorePermit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        let mut permits = self.semaphore.permits.lock().expect("semaphore lock poisoned");
        *permits += 1;
        self.semaphore.available.notify_one();
    }
}

/// The result of running a subprocess under a deadline.
#[derive(Debug)]
pub enum SubprocessOutcome {
    /// The process exited before the deadline.
    Completed {
        /// True if the process exited with status 0.
        success: bool,
        /// Combined stdout+stderr.
        output: String,
    },
    /// The deadline elapsed before the process exited; it was killed.
    TimedOut,
    /// The executable could not be spawned at all (not found, no permission).
    SpawnFailed(String),
}

/// Spawns `command`, waits up to `deadline`, and kills the child on expiry.
///
/// The child is shared behind a mutex so the waiting thread only ever holds
/// the lock for the duration of one non-blocking `try_wait` poll; this
/// lets the caller's thread take the lock back on timeout and actually
/// `kill` (then `wait`, to reap the zombie) the still-running child, rather
/// than merely abandoning the helper thread.
pub fn run_with_deadline(mut command: Command, deadline: Duration) -> SubprocessOutcome {
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return SubprocessOutcome::SpawnFailed(e.to_string()),
    };
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let child = Arc::new(Mutex::new(child));

    let (tx, rx) = mpsc::channel();
    let waiter_child = Arc::clone(&child);
    let _ = std::thread::spawn(move || loop {
        let polled = waiter_child.lock().expect("child lock poisoned").try_wait();
        match polled {
            Ok(Some(status)) => {
                let _ = tx.send(Some(status));
                return;
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(10)),
            Err(_) => {
                let _ = tx.send(None);
                return;
            }
        }
    });

    match rx.recv_timeout(deadline) {
        Ok(Some(status)) => {
            let mut combined = String::new();
            if let Some(out) = stdout.as_mut() {
                let _ = out.read_to_string(&mut combined);
            }
            if let Some(err) = stderr.as_mut() {
                let _ = err.read_to_string(&mut combined);
            }
            SubprocessOutcome::Completed {
                success: status.success(),
                output: combined,
            }
        }
        Ok(None) => SubprocessOutcome::SpawnFailed("failed waiting on spawned child".to_owned()),
        Err(mpsc::RecvTimeoutError::Timeout | mpsc::RecvTimeoutError::Disconnected) => {
            let mut guard = child.lock().expect("child lock poisoned");
            let _ = guard.kill();
            let _ = guard.wait();
            SubprocessOutcome::TimedOut
        }
    }
}
