//! Admin overrides: redirect a slot away from its templated source.

use std::collections::HashSet;

use crate::error::TournamentError;
use crate::logic::bracket::{Bracket, SlotChange};
use crate::logic::source::SourceExpr;
use crate::models::{MatchOverride, Slot};

/// True if following winner/loser edges (overrides included) from `from`
/// reaches `target`.
fn reaches(bracket: &Bracket, from: &str, target: &str) -> Result<bool, TournamentError> {
    let mut stack = vec![from.to_string()];
    let mut seen = HashSet::new();
    while let Some(code) = stack.pop() {
        if code == target {
            return Ok(true);
        }
        if !seen.insert(code.clone()) {
            continue;
        }
        for slot in Slot::BOTH {
            if let Some(dep) = bracket.effective_expr(&code, slot)?.match_dependency() {
                stack.push(dep.to_string());
            }
        }
    }
    Ok(false)
}

fn check_target(bracket: &Bracket, match_code: &str, expr: &SourceExpr) -> Result<(), TournamentError> {
    let m = bracket
        .match_by_code(match_code)
        .ok_or_else(|| TournamentError::MatchCodeNotFound(match_code.to_string()))?;
    match expr {
        SourceExpr::MatchOutcome { match_code: dep, .. } => {
            if bracket.match_by_code(dep).is_none() {
                return Err(TournamentError::MatchCodeNotFound(dep.clone()));
            }
            if reaches(bracket, dep, match_code)? {
                return Err(TournamentError::DependencyCycle(match_code.to_string()));
            }
        }
        SourceExpr::BlockRank { block, .. } => {
            let block = bracket
                .standings_block(block)
                .ok_or_else(|| TournamentError::BlockNotFound(block.clone()))?;
            if m.block_id == Some(block.id) {
                return Err(TournamentError::DependencyCycle(match_code.to_string()));
            }
        }
        SourceExpr::Team(id) => {
            if bracket.team(*id).is_none() {
                return Err(TournamentError::TeamNotFound(*id));
            }
        }
        SourceExpr::BlockSeat { .. } => {}
    }
    Ok(())
}

/// Replace the source of one slot of an unconfirmed match and re-resolve.
pub fn set_override(
    bracket: &mut Bracket,
    match_code: &str,
    slot: Slot,
    source: &str,
    reason: Option<String>,
) -> Result<Vec<SlotChange>, TournamentError> {
    let expr: SourceExpr = source.parse()?;
    let m = bracket
        .match_by_code(match_code)
        .ok_or_else(|| TournamentError::MatchCodeNotFound(match_code.to_string()))?;
    if m.is_confirmed() {
        return Err(TournamentError::AlreadyConfirmed);
    }
    check_target(bracket, match_code, &expr)?;

    let tournament_id = bracket.tournament.id;
    let idx = match bracket.overrides.iter().position(|o| o.match_code == match_code) {
        Some(idx) => idx,
        None => {
            bracket.overrides.push(MatchOverride::new(tournament_id, match_code));
            bracket.overrides.len() - 1
        }
    };
    let o = &mut bracket.overrides[idx];
    o.set(slot, Some(expr.to_string()));
    if reason.is_some() {
        o.reason = reason;
    }
    log::info!("{match_code}/{slot}: source overridden to {expr}");
    bracket.refresh_slots()
}

/// Drop the override of one slot, falling back to the template source.
/// Clearing a slot that is not overridden changes nothing.
pub fn clear_override(
    bracket: &mut Bracket,
    match_code: &str,
    slot: Slot,
) -> Result<Vec<SlotChange>, TournamentError> {
    let m = bracket
        .match_by_code(match_code)
        .ok_or_else(|| TournamentError::MatchCodeNotFound(match_code.to_string()))?;
    if m.is_confirmed() {
        return Err(TournamentError::AlreadyConfirmed);
    }
    let Some(o) = bracket.overrides.iter_mut().find(|o| o.match_code == match_code) else {
        return Ok(Vec::new());
    };
    o.set(slot, None);
    bracket.overrides.retain(|o| !o.is_empty());
    bracket.refresh_slots()
}
