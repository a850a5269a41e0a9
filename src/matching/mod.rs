//! Skill-compatibility scoring and top-K recommendation.
//!
//! Everything here is a pure function over roster snapshots: no I/O, no
//! shared state, safe to call from any number of tasks at once.
//!
//! # Scoring
//!
//! For a participant's skills `P` and a team's aggregate skills `T`:
//!
//! ```text
//! shared        = P ∩ T
//! complementary = P − T
//! score         = 2·|shared| + |complementary|
//! ```
//!
//! The score is an absolute count. It is not normalized by either side's
//! size, so broad skill sets are never penalized.

use crate::models::{MatchResult, Participant, SkillSet, Team};

/// Score and skill breakdown for one participant/team pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    pub score: u32,
    pub shared: SkillSet,
    pub complementary: SkillSet,
}

impl Compatibility {
    fn into_match(self, counterpart_id: uuid::Uuid) -> MatchResult {
        MatchResult {
            counterpart_id,
            score: self.score,
            shared_skills: self.shared,
            complementary_skills: self.complementary,
        }
    }
}

/// Score a participant's skills against a team's member skills.
pub fn score(participant_skills: &SkillSet, team_skills: &SkillSet) -> Compatibility {
    let (shared, complementary): (SkillSet, SkillSet) = participant_skills
        .iter()
        .cloned()
        .partition(|skill| team_skills.contains(skill));

    let score = 2 * shared.len() as u32 + complementary.len() as u32;

    Compatibility {
        score,
        shared,
        complementary,
    }
}

/// Rank teams for a participant, best first, at most `k` results.
///
/// Teams without open roles are never returned. Equal scores keep the
/// order of `teams`.
pub fn recommend_teams(participant: &Participant, teams: &[Team], k: usize) -> Vec<MatchResult> {
    let matches = teams
        .iter()
        .filter(|team| team.has_open_roles())
        .map(|team| score(&participant.skills, &team.member_skills).into_match(team.id))
        .collect();

    top_k(matches, k)
}

/// Rank participants for a team, best first, at most `k` results.
///
/// A team without open roles gets no suggestions. Equal scores keep the
/// order of `participants`.
pub fn recommend_participants(
    team: &Team,
    participants: &[Participant],
    k: usize,
) -> Vec<MatchResult> {
    if !team.has_open_roles() {
        return Vec::new();
    }

    let matches = participants
        .iter()
        .map(|p| score(&p.skills, &team.member_skills).into_match(p.id))
        .collect();

    top_k(matches, k)
}

fn top_k(mut matches: Vec<MatchResult>, k: usize) -> Vec<MatchResult> {
    // `sort_by` is stable, which is what gives ties their input order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(k);
    matches
}
