use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PartyType, SkillSet};

/// A scored counterpart suggestion.
///
/// Derived on demand and never persisted. For a participant the
/// counterpart is a team; for a team it is a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub counterpart_id: Uuid,
    pub score: u32,
    pub shared_skills: SkillSet,
    pub complementary_skills: SkillSet,
}

/// Query parameters for fetching recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationQuery {
    pub subject_id: Uuid,
    pub subject_type: PartyType,
    /// How many suggestions to return. The HTTP layer supplies a default
    /// per subject type when absent.
    pub k: Option<usize>,
}

/// Recommendations for one subject, best match first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub subject_id: Uuid,
    pub subject_type: PartyType,
    pub matches: Vec<MatchResult>,
}
