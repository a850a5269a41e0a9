//! Domain models for hackmatch.
//!
//! # Core Concepts
//!
//! ## Roster Entities
//!
//! Owned by the registration side of the platform; the matching core reads
//! them and only changes team membership as the effect of a join request.
//!
//! - [`Participant`]: A registered hacker with a flat skill set.
//! - [`Team`]: A capacity-limited group whose skill set is the union of its members'.
//!
//! ## Workflow Entities
//!
//! Owned and mutated exclusively by the core:
//!
//! - [`JoinRequest`]: A directional proposal to add a participant to a team.
//!   Terminal once accepted or rejected.
//! - [`Notification`]: A per-recipient record of a workflow event, with read state.
//!
//! ## Derived
//!
//! - [`MatchResult`]: A scored counterpart suggestion, regenerated on demand.

mod join_request;
mod notification;
mod participant;
mod recommendation;
mod team;

pub use join_request::*;
pub use notification::*;
pub use participant::*;
pub use recommendation::*;
pub use team::*;

/// An opaque skill label. Equality is exact and case-sensitive.
pub type Skill = String;

/// A set of skills, kept ordered so breakdowns serialize deterministically.
pub type SkillSet = std::collections::BTreeSet<Skill>;
