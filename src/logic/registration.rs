//! Registrations, block seats, withdrawals and rosters.

use serde::Deserialize;

use crate::error::TournamentError;
use crate::logic::bracket::{Bracket, SlotChange};
use crate::logic::source::is_block_name;
use crate::models::{Player, Team, Tournament, TournamentTeam, TournamentTeamId};

/// Step of the withdrawal workflow requested by a team or an admin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalAction {
    Request,
    Approve,
    Reject,
}

/// Register `team` for `tournament`. Only during setup, and only once.
pub fn register_team(
    tournament: &Tournament,
    registered: &[TournamentTeam],
    team: &Team,
) -> Result<TournamentTeam, TournamentError> {
    if !tournament.status.is_setup() {
        return Err(TournamentError::InvalidState("registration is closed"));
    }
    if registered.iter().any(|r| r.team_id == team.id) {
        return Err(TournamentError::DuplicateTeam);
    }
    Ok(TournamentTeam::new(tournament.id, team))
}

/// Registrations can only be removed before matches exist.
pub fn ensure_can_unregister(tournament: &Tournament) -> Result<(), TournamentError> {
    if !tournament.status.is_setup() {
        return Err(TournamentError::InvalidState("registration is closed"));
    }
    Ok(())
}

/// Seat a registration manually (or unseat it with `None`).
pub fn assign_block_seat(
    bracket: &mut Bracket,
    team_id: TournamentTeamId,
    block_name: Option<String>,
    block_position: Option<u32>,
) -> Result<Vec<SlotChange>, TournamentError> {
    if bracket.has_results() {
        return Err(TournamentError::DrawLocked);
    }
    let (block_name, block_position) = match (block_name, block_position) {
        (Some(name), Some(position)) if position > 0 && !name.trim().is_empty() => {
            (Some(name.trim().to_string()), Some(position))
        }
        (None, None) => (None, None),
        _ => {
            return Err(TournamentError::InvalidState(
                "block name and a positive position go together",
            ))
        }
    };
    if let Some(bad) = block_name.as_deref().filter(|n| !is_block_name(n)) {
        return Err(TournamentError::InvalidTemplate(format!("invalid block name {bad:?}")));
    }
    if let (Some(name), Some(position)) = (&block_name, block_position) {
        if bracket
            .teams
            .iter()
            .any(|t| t.id != team_id && t.is_seated_at(name, position))
        {
            return Err(TournamentError::InvalidState("block seat already taken"));
        }
    }
    bracket.team_mut(team_id)?.assign_block(block_name, block_position);
    if bracket.matches.is_empty() {
        return Ok(Vec::new());
    }
    bracket.recalculate_all_standings();
    bracket.refresh_slots()
}

/// Advance the withdrawal workflow. Approval re-ranks the team's block and
/// moves any block-rank slot that now points at a different team.
pub fn apply_withdrawal(
    bracket: &mut Bracket,
    team_id: TournamentTeamId,
    action: WithdrawalAction,
    reason: Option<String>,
) -> Result<(TournamentTeam, Vec<SlotChange>), TournamentError> {
    let team = bracket.team_mut(team_id)?;
    match action {
        WithdrawalAction::Request => team.request_withdrawal(reason)?,
        WithdrawalAction::Approve => team.approve_withdrawal()?,
        WithdrawalAction::Reject => team.reject_withdrawal()?,
    }
    let team = team.clone();
    if action != WithdrawalAction::Approve {
        return Ok((team, Vec::new()));
    }
    log::info!("{} withdrew from {}", team.team_name, bracket.tournament.name);
    bracket.recalculate_all_standings();
    if bracket.matches.is_empty() {
        return Ok((team, Vec::new()));
    }
    let slot_changes = bracket.refresh_slots()?;
    Ok((team, slot_changes))
}

/// Add a player to a roster; jersey numbers are unique within the roster.
pub fn add_player(
    roster: &[Player],
    tournament_team_id: TournamentTeamId,
    name: &str,
    jersey_number: Option<u32>,
) -> Result<Player, TournamentError> {
    if let Some(number) = jersey_number {
        if roster.iter().any(|p| p.jersey_number == Some(number)) {
            return Err(TournamentError::DuplicateJerseyNumber(number));
        }
    }
    Player::new(tournament_team_id, name, jersey_number)
}
