//! Catch log persistence
//!
//! Stores one catch per user per date in a single JSON document shaped
//! `{username: {date: entry}}`. Saving an entry for an existing user and date
//! replaces it.

mod catch_log;

pub use catch_log::{CatchLog, CatchLogEntry, CatchLogRecord, CatchLogStore, StoreError, UserLog};
