//! Master teams and per-tournament registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TournamentError;
use crate::models::tournament::TournamentId;

/// Unique identifier for a master team.
pub type TeamId = Uuid;

/// Unique identifier for a team's registration in one tournament.
pub type TournamentTeamId = Uuid;

/// A team as known across tournaments.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(name: &str) -> Result<Self, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            short_name: None,
            contact_email: None,
            created_at: Utc::now(),
        })
    }
}

/// Withdrawal workflow of a registration. Transitions are one-directional:
/// Active -> Requested -> Approved | Rejected.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    #[default]
    Active,
    Requested,
    Approved,
    Rejected,
}

text_enum!(WithdrawalStatus, "withdrawal status", {
    Active => "active",
    Requested => "requested",
    Approved => "approved",
    Rejected => "rejected",
});

impl WithdrawalStatus {
    pub fn can_transition_to(&self, to: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;
        matches!(
            (self, to),
            (Active, Requested) | (Requested, Approved) | (Requested, Rejected)
        )
    }
}

/// A team's registration in one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentTeam {
    pub id: TournamentTeamId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    /// Name at registration time (master team may be renamed later).
    pub team_name: String,
    pub block_name: Option<String>,
    /// 1-based seat within the block.
    pub block_position: Option<u32>,
    pub withdrawal: WithdrawalStatus,
    pub withdrawal_reason: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl TournamentTeam {
    pub fn new(tournament_id: TournamentId, team: &Team) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            team_id: team.id,
            team_name: team.name.clone(),
            block_name: None,
            block_position: None,
            withdrawal: WithdrawalStatus::Active,
            withdrawal_reason: None,
            registered_at: Utc::now(),
        }
    }

    /// Withdrawal approved: ranked last in standings.
    pub fn is_withdrawn(&self) -> bool {
        self.withdrawal == WithdrawalStatus::Approved
    }

    pub fn is_seated_at(&self, block: &str, position: u32) -> bool {
        self.block_name.as_deref() == Some(block) && self.block_position == Some(position)
    }

    pub fn assign_block(&mut self, block_name: Option<String>, block_position: Option<u32>) {
        self.block_name = block_name;
        self.block_position = block_position;
    }

    fn transition(&mut self, to: WithdrawalStatus) -> Result<(), TournamentError> {
        if !self.withdrawal.can_transition_to(to) {
            return Err(TournamentError::InvalidWithdrawalTransition {
                from: self.withdrawal,
                to,
            });
        }
        self.withdrawal = to;
        Ok(())
    }

    pub fn request_withdrawal(&mut self, reason: Option<String>) -> Result<(), TournamentError> {
        self.transition(WithdrawalStatus::Requested)?;
        self.withdrawal_reason = reason;
        Ok(())
    }

    pub fn approve_withdrawal(&mut self) -> Result<(), TournamentError> {
        self.transition(WithdrawalStatus::Approved)
    }

    pub fn reject_withdrawal(&mut self) -> Result<(), TournamentError> {
        self.transition(WithdrawalStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> TournamentTeam {
        let team = Team::new("Falcons").unwrap();
        TournamentTeam::new(Uuid::new_v4(), &team)
    }

    #[test]
    fn withdrawal_moves_forward_only() {
        let mut r = registration();
        r.request_withdrawal(Some("injuries".into())).unwrap();
        r.approve_withdrawal().unwrap();
        assert!(r.is_withdrawn());
        assert_eq!(
            r.request_withdrawal(None),
            Err(TournamentError::InvalidWithdrawalTransition {
                from: WithdrawalStatus::Approved,
                to: WithdrawalStatus::Requested,
            })
        );
    }

    #[test]
    fn cannot_approve_without_request() {
        let mut r = registration();
        assert!(r.approve_withdrawal().is_err());
        assert!(r.reject_withdrawal().is_err());
        assert_eq!(r.withdrawal, WithdrawalStatus::Active);
    }

    #[test]
    fn rejected_is_terminal() {
        let mut r = registration();
        r.request_withdrawal(None).unwrap();
        r.reject_withdrawal().unwrap();
        assert!(!r.is_withdrawn());
        assert!(r.approve_withdrawal().is_err());
        assert!(r.request_withdrawal(None).is_err());
    }
}
