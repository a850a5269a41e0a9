//! Skill-based team formation for hackathons.
//!
//! Participants and teams are scored against each other by skill overlap
//! ([`matching`]), join requests move from pending to accepted or rejected
//! under a per-team capacity guard ([`db`], driven through
//! [`service::TeamFormation`]), and every state change is recorded as a
//! notification and pushed to live subscribers ([`hub`]).

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod hub;
pub mod matching;
pub mod models;
pub mod service;

pub use error::{Error, Result};
