//! Activities, their sessions and the statistics derived from them.
//! [service::ActivityService] is the main artifact of this module, everything a caller can do with
//! tracked activities goes through it.

pub mod entities;
pub mod error;
pub mod service;
pub mod stats;
