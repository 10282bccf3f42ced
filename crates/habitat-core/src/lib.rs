//! Core types and trait definitions for the Habitat habit tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the calendar conventions, the "is this habit due" rules, and the
//! [`Tracker`] service that composes them over any [`store::HabitStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod error;
pub mod habit;
pub mod ledger;
pub mod schedule;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};
pub use tracker::Tracker;
