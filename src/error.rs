//! Domain errors raised by tournament operations.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{TournamentStatus, WithdrawalStatus};

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// A name field was empty after trimming.
    #[error("Name must not be empty")]
    EmptyName,
    /// Tournament status may only move forward.
    #[error("Cannot change tournament status from {from} to {to}")]
    InvalidStatusTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action: {0}")]
    InvalidState(&'static str),
    #[error("Tournament not found")]
    TournamentNotFound(Uuid),
    #[error("Tournament group not found")]
    GroupNotFound(Uuid),
    #[error("Team not found")]
    TeamNotFound(Uuid),
    #[error("Player not found")]
    PlayerNotFound(Uuid),
    #[error("Match not found")]
    MatchNotFound(Uuid),
    #[error("No match with code {0}")]
    MatchCodeNotFound(String),
    #[error("No block named {0}")]
    BlockNotFound(String),
    /// The team is already registered for this tournament.
    #[error("Team is already registered for this tournament")]
    DuplicateTeam,
    #[error("Jersey number {0} is already taken in this team")]
    DuplicateJerseyNumber(u32),
    #[error("Cannot change withdrawal status from {from} to {to}")]
    InvalidWithdrawalTransition {
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    },
    /// A slot source expression could not be parsed.
    #[error("Invalid source expression: {0}")]
    InvalidSource(String),
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),
    /// Following winner/loser edges from this match code leads back to it.
    #[error("Match dependency cycle through {0}")]
    DependencyCycle(String),
    #[error("No match templates defined")]
    NoTemplates,
    #[error("Matches have already been generated")]
    MatchesAlreadyGenerated,
    #[error("Blocks can no longer be drawn once results are confirmed")]
    DrawLocked,
    #[error("Need at least one block name")]
    NoBlocks,
    /// One or both slots of the match have no team yet.
    #[error("Both teams must be decided first")]
    TeamsNotDecided,
    #[error("Both scores must be entered")]
    ScoreMissing,
    /// Final-phase matches need a winner (PK scores must differ on a tie).
    #[error("A final-phase match cannot end in a draw")]
    DrawNotAllowed,
    #[error("Match is already confirmed")]
    AlreadyConfirmed,
    #[error("Match is not confirmed")]
    NotConfirmed,
    /// A confirmed match depends on the result being withdrawn.
    #[error("Confirmed match {0} depends on this result")]
    DownstreamConfirmed(String),
    #[error("Export failed: {0}")]
    Export(String),
}

impl TournamentError {
    /// True for lookups that failed (mapped to 404 at the HTTP boundary).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TournamentError::TournamentNotFound(_)
                | TournamentError::GroupNotFound(_)
                | TournamentError::TeamNotFound(_)
                | TournamentError::PlayerNotFound(_)
                | TournamentError::MatchNotFound(_)
                | TournamentError::MatchCodeNotFound(_)
                | TournamentError::BlockNotFound(_)
        )
    }

    /// True when the request was well-formed but conflicts with current state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TournamentError::InvalidStatusTransition { .. }
                | TournamentError::InvalidState(_)
                | TournamentError::DuplicateTeam
                | TournamentError::DuplicateJerseyNumber(_)
                | TournamentError::InvalidWithdrawalTransition { .. }
                | TournamentError::MatchesAlreadyGenerated
                | TournamentError::DrawLocked
                | TournamentError::TeamsNotDecided
                | TournamentError::AlreadyConfirmed
                | TournamentError::NotConfirmed
                | TournamentError::DownstreamConfirmed(_)
        )
    }
}
