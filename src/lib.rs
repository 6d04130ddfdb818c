//! Small cli for tracking time spent on real-life activities.
//! Start an activity when you begin doing it, stop it when you're done, and ask for the total
//! time spent whenever you like. Everything is kept in a single JSON file.
//!

pub mod cli;
pub mod storage;
pub mod tracker;
pub mod utils;
