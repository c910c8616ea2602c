//! Tournament, TournamentGroup and TournamentStatus.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TournamentError;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Unique identifier for a tournament group.
pub type GroupId = Uuid;

/// Current phase of the tournament. Only moves forward, except that
/// withdrawing the last confirmed result reopens a completed tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Being set up by an admin; not visible to teams yet.
    #[default]
    Planning,
    /// Accepting team registrations.
    Recruiting,
    /// Matches generated and being played.
    Ongoing,
    /// Every match confirmed.
    Completed,
}

text_enum!(TournamentStatus, "tournament status", {
    Planning => "planning",
    Recruiting => "recruiting",
    Ongoing => "ongoing",
    Completed => "completed",
});

impl TournamentStatus {
    /// Registrations, removals and block seats may still change.
    pub fn is_setup(&self) -> bool {
        matches!(self, TournamentStatus::Planning | TournamentStatus::Recruiting)
    }
}

/// Points awarded per match outcome in block standings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub win_points: u32,
    pub draw_points: u32,
    pub loss_points: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            win_points: 3,
            draw_points: 1,
            loss_points: 0,
        }
    }
}

/// Umbrella event that several tournaments (divisions) belong to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentGroup {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TournamentGroup {
    pub fn new(name: &str, description: Option<String>) -> Result<Self, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            created_at: Utc::now(),
        })
    }
}

/// A single tournament: settings, status and publication flag.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub group_id: Option<GroupId>,
    pub name: String,
    pub venue: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub status: TournamentStatus,
    #[serde(flatten)]
    pub scoring: ScoringRules,
    /// Visible on the public endpoints.
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Planning with default scoring.
    pub fn new(name: &str) -> Result<Self, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            group_id: None,
            name: name.to_string(),
            venue: None,
            event_date: None,
            status: TournamentStatus::Planning,
            scoring: ScoringRules::default(),
            is_public: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rename; the name must not be empty.
    pub fn rename(&mut self, name: &str) -> Result<(), TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        self.name = name.to_string();
        self.touch();
        Ok(())
    }

    /// Move the status forward. Same-state or backwards moves are rejected.
    pub fn advance_status(&mut self, to: TournamentStatus) -> Result<(), TournamentError> {
        if to <= self.status {
            return Err(TournamentError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    pub fn set_published(&mut self, is_public: bool) {
        self.is_public = is_public;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_moves_forward() {
        let mut t = Tournament::new("Spring Cup").unwrap();
        t.advance_status(TournamentStatus::Recruiting).unwrap();
        t.advance_status(TournamentStatus::Ongoing).unwrap();
        assert_eq!(
            t.advance_status(TournamentStatus::Recruiting),
            Err(TournamentError::InvalidStatusTransition {
                from: TournamentStatus::Ongoing,
                to: TournamentStatus::Recruiting,
            })
        );
        assert!(t.advance_status(TournamentStatus::Ongoing).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(Tournament::new("   "), Err(TournamentError::EmptyName));
    }

    #[test]
    fn status_text_round_trips() {
        assert_eq!("ongoing".parse::<TournamentStatus>(), Ok(TournamentStatus::Ongoing));
        assert!("paused".parse::<TournamentStatus>().is_err());
    }
}
