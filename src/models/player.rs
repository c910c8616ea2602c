//! Rostered players of a registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TournamentError;
use crate::models::team::TournamentTeamId;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// A player on a team's roster for one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub tournament_team_id: TournamentTeamId,
    pub name: String,
    pub jersey_number: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a new player with the given name. Name is trimmed and must not be empty.
    pub fn new(
        tournament_team_id: TournamentTeamId,
        name: &str,
        jersey_number: Option<u32>,
    ) -> Result<Self, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            tournament_team_id,
            name: name.to_string(),
            jersey_number,
            created_at: Utc::now(),
        })
    }
}
