//! Block standings rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::team::TournamentTeamId;

/// One team's line in a block table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub block_id: Uuid,
    pub tournament_team_id: TournamentTeamId,
    pub team_name: String,
    /// 1-based.
    pub rank: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub withdrawn: bool,
}

impl Standing {
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}
