//! Background Tasks Module
//!
//! Contains the tasks that move cache snapshots to and from a blob store.
//!
//! # Tasks
//! - Remote persistence: snapshots the cache at a configured interval and
//!   uploads it
//! - Cold start: `Cache::from_remote` restores a cache from the latest upload

mod persist;

pub use persist::{persist_once, spawn_persist_task, PersistConfig};
