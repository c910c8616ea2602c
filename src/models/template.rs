//! Match templates: the static shape of a tournament's schedule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::tournament::TournamentId;

/// Phase a match or block belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Round-robin blocks; draws allowed, standings computed.
    #[default]
    Preliminary,
    /// Knockout bracket; every match needs a winner.
    Final,
}

text_enum!(MatchPhase, "match phase", {
    Preliminary => "preliminary",
    Final => "final",
});

/// One of the two team slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Team1,
    Team2,
}

text_enum!(Slot, "slot", {
    Team1 => "team1",
    Team2 => "team2",
});

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Team1, Slot::Team2];
}

/// A scheduled match's code, phase and slot sources (e.g. `A_1`, `M3_winner`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTemplate {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    /// Unique per tournament, e.g. `A-1` or `SF1`.
    pub match_code: String,
    pub phase: MatchPhase,
    pub block_name: Option<String>,
    pub round_name: Option<String>,
    /// Ordering within the schedule.
    pub match_number: u32,
    pub team1_source: String,
    pub team2_source: String,
}

impl MatchTemplate {
    pub fn new(
        tournament_id: TournamentId,
        match_code: impl Into<String>,
        phase: MatchPhase,
        block_name: Option<String>,
        match_number: u32,
        team1_source: impl Into<String>,
        team2_source: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            match_code: match_code.into(),
            phase,
            block_name,
            round_name: None,
            match_number,
            team1_source: team1_source.into(),
            team2_source: team2_source.into(),
        }
    }

    pub fn source(&self, slot: Slot) -> &str {
        match slot {
            Slot::Team1 => &self.team1_source,
            Slot::Team2 => &self.team2_source,
        }
    }
}
