//! Stash Split
//!
//! This crate provides a personal deposit ledger that splits every cash
//! deposit across a fixed set of investment targets and reports rolling
//! time-window statistics over the recorded history.

pub mod core;
pub mod storage;
