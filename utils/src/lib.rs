//! Shared utilities for Immanence.

mod atomic_write;

pub use atomic_write::{atomic_write, recover_bak_file};
