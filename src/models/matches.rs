//! Blocks, live (mutable) matches, final (confirmed) matches and overrides.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::team::TournamentTeamId;
use crate::models::template::{MatchPhase, MatchTemplate, Slot};
use crate::models::tournament::TournamentId;

/// Unique identifier for a live match (also keys its final match).
pub type MatchId = Uuid;

/// A named group of teams, e.g. "Block A", or the knockout bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchBlock {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub name: String,
    pub phase: MatchPhase,
    pub display_order: u32,
}

impl MatchBlock {
    pub fn new(tournament_id: TournamentId, name: impl Into<String>, phase: MatchPhase, display_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            phase,
            display_order,
        }
    }
}

/// Progress of a live match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveMatchStatus {
    #[default]
    Scheduled,
    Ongoing,
    /// Final whistle; waiting for confirmation.
    Finished,
    /// Result confirmed; a final match exists.
    Confirmed,
}

text_enum!(LiveMatchStatus, "match status", {
    Scheduled => "scheduled",
    Ongoing => "ongoing",
    Finished => "finished",
    Confirmed => "confirmed",
});

/// The mutable, in-progress record of one templated match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LiveMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub template_id: Uuid,
    pub match_code: String,
    pub phase: MatchPhase,
    pub block_id: Option<Uuid>,
    pub match_number: u32,
    /// None until the slot's source resolves.
    pub team1_id: Option<TournamentTeamId>,
    pub team2_id: Option<TournamentTeamId>,
    /// Team name, or a placeholder such as "Winner M3".
    pub team1_display: String,
    pub team2_display: String,
    pub court_number: Option<u32>,
    pub start_time: Option<NaiveTime>,
    pub team1_score: Option<u32>,
    pub team2_score: Option<u32>,
    /// Penalty shootout, final phase only.
    pub team1_pk: Option<u32>,
    pub team2_pk: Option<u32>,
    pub status: LiveMatchStatus,
    pub updated_at: DateTime<Utc>,
}

impl LiveMatch {
    /// New unresolved match for a template; slots are filled by the bracket refresh.
    pub fn from_template(template: &MatchTemplate, block_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id: template.tournament_id,
            template_id: template.id,
            match_code: template.match_code.clone(),
            phase: template.phase,
            block_id,
            match_number: template.match_number,
            team1_id: None,
            team2_id: None,
            team1_display: String::new(),
            team2_display: String::new(),
            court_number: None,
            start_time: None,
            team1_score: None,
            team2_score: None,
            team1_pk: None,
            team2_pk: None,
            status: LiveMatchStatus::Scheduled,
            updated_at: Utc::now(),
        }
    }

    pub fn team(&self, slot: Slot) -> Option<TournamentTeamId> {
        match slot {
            Slot::Team1 => self.team1_id,
            Slot::Team2 => self.team2_id,
        }
    }

    pub fn display(&self, slot: Slot) -> &str {
        match slot {
            Slot::Team1 => &self.team1_display,
            Slot::Team2 => &self.team2_display,
        }
    }

    pub fn set_slot(&mut self, slot: Slot, team: Option<TournamentTeamId>, display: String) {
        match slot {
            Slot::Team1 => {
                self.team1_id = team;
                self.team1_display = display;
            }
            Slot::Team2 => {
                self.team2_id = team;
                self.team2_display = display;
            }
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == LiveMatchStatus::Confirmed
    }

    pub fn clear_scores(&mut self) {
        self.team1_score = None;
        self.team2_score = None;
        self.team1_pk = None;
        self.team2_pk = None;
    }
}

/// Immutable record created once a live match's result is confirmed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinalMatch {
    pub live_match_id: MatchId,
    pub tournament_id: TournamentId,
    pub match_code: String,
    pub phase: MatchPhase,
    pub block_id: Option<Uuid>,
    pub team1_id: TournamentTeamId,
    pub team2_id: TournamentTeamId,
    pub team1_score: u32,
    pub team2_score: u32,
    pub team1_pk: Option<u32>,
    pub team2_pk: Option<u32>,
    /// None on a draw.
    pub winner_id: Option<TournamentTeamId>,
    pub loser_id: Option<TournamentTeamId>,
    pub confirmed_at: DateTime<Utc>,
}

impl FinalMatch {
    pub fn is_draw(&self) -> bool {
        self.winner_id.is_none()
    }

    /// (goals for, goals against) from `team`'s point of view, if it played.
    pub fn goals_for(&self, team: TournamentTeamId) -> Option<(u32, u32)> {
        if self.team1_id == team {
            Some((self.team1_score, self.team2_score))
        } else if self.team2_id == team {
            Some((self.team2_score, self.team1_score))
        } else {
            None
        }
    }

    pub fn involves(&self, team: TournamentTeamId) -> bool {
        self.team1_id == team || self.team2_id == team
    }
}

/// Admin replacement for a template's slot sources, per match code.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchOverride {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub match_code: String,
    pub team1_source: Option<String>,
    pub team2_source: Option<String>,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MatchOverride {
    pub fn new(tournament_id: TournamentId, match_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            match_code: match_code.into(),
            team1_source: None,
            team2_source: None,
            reason: None,
            updated_at: Utc::now(),
        }
    }

    pub fn source(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Team1 => self.team1_source.as_deref(),
            Slot::Team2 => self.team2_source.as_deref(),
        }
    }

    pub fn set(&mut self, slot: Slot, source: Option<String>) {
        match slot {
            Slot::Team1 => self.team1_source = source,
            Slot::Team2 => self.team2_source = source,
        }
        self.updated_at = Utc::now();
    }

    /// No slot is overridden any more.
    pub fn is_empty(&self) -> bool {
        self.team1_source.is_none() && self.team2_source.is_none()
    }
}
