//! Core types and logic for the SnapTour campus photo bot.
//!
//! Scoring, classification interpretation and reply composition are pure and
//! live here. Everything that talks to the outside world is behind the traits
//! in [`service`]; this crate has no HTTP or database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod command;
pub mod interpret;
pub mod record;
pub mod reply;
pub mod service;

pub use aggregate::{Summary, aggregate_history, goal_reached};
pub use command::Command;
pub use interpret::{CandidateLabel, Outcome, interpret};
