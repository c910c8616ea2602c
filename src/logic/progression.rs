//! Score entry, result confirmation and its propagation through the bracket.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TournamentError;
use crate::logic::bracket::{Bracket, SlotChange};
use crate::models::{
    FinalMatch, LiveMatch, LiveMatchStatus, MatchId, MatchPhase, Slot, TournamentStatus,
    TournamentTeamId,
};

/// Score submitted for a live match.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ScoreEntry {
    pub team1_score: u32,
    pub team2_score: u32,
    #[serde(default)]
    pub team1_pk: Option<u32>,
    #[serde(default)]
    pub team2_pk: Option<u32>,
    /// Final whistle; otherwise the match stays ongoing.
    #[serde(default)]
    pub finished: bool,
}

/// What a confirmation changed.
#[derive(Clone, Debug, Serialize)]
pub struct Confirmation {
    pub result: FinalMatch,
    /// Preliminary block whose table was recalculated.
    pub standings_block: Option<Uuid>,
    pub slot_changes: Vec<SlotChange>,
    pub tournament_completed: bool,
}

/// What withdrawing a confirmation changed.
#[derive(Clone, Debug, Serialize)]
pub struct Unconfirmation {
    pub match_id: MatchId,
    pub standings_block: Option<Uuid>,
    pub slot_changes: Vec<SlotChange>,
    pub tournament_reopened: bool,
}

fn editable_match(bracket: &mut Bracket, match_id: MatchId) -> Result<&mut LiveMatch, TournamentError> {
    let idx = bracket.match_index(match_id)?;
    let m = &mut bracket.matches[idx];
    if m.is_confirmed() {
        return Err(TournamentError::AlreadyConfirmed);
    }
    Ok(m)
}

/// Set court and start time of an unconfirmed match.
pub fn schedule_match(
    bracket: &mut Bracket,
    match_id: MatchId,
    court_number: Option<u32>,
    start_time: Option<NaiveTime>,
) -> Result<LiveMatch, TournamentError> {
    let m = editable_match(bracket, match_id)?;
    m.court_number = court_number;
    m.start_time = start_time;
    m.updated_at = Utc::now();
    Ok(m.clone())
}

/// Record the (possibly running) score of a match whose teams are decided.
pub fn record_score(
    bracket: &mut Bracket,
    match_id: MatchId,
    entry: &ScoreEntry,
) -> Result<LiveMatch, TournamentError> {
    let m = editable_match(bracket, match_id)?;
    if m.team1_id.is_none() || m.team2_id.is_none() {
        return Err(TournamentError::TeamsNotDecided);
    }
    m.team1_score = Some(entry.team1_score);
    m.team2_score = Some(entry.team2_score);
    if m.phase == MatchPhase::Final {
        m.team1_pk = entry.team1_pk;
        m.team2_pk = entry.team2_pk;
    }
    m.status = if entry.finished {
        LiveMatchStatus::Finished
    } else {
        LiveMatchStatus::Ongoing
    };
    m.updated_at = Utc::now();
    Ok(m.clone())
}

/// Winner and loser, or None on a draw. Final-phase ties are settled by PK.
fn decide(
    m: &LiveMatch,
    team1: TournamentTeamId,
    team2: TournamentTeamId,
    s1: u32,
    s2: u32,
) -> Result<Option<(TournamentTeamId, TournamentTeamId)>, TournamentError> {
    use std::cmp::Ordering::*;
    match s1.cmp(&s2) {
        Greater => Ok(Some((team1, team2))),
        Less => Ok(Some((team2, team1))),
        Equal if m.phase == MatchPhase::Preliminary => Ok(None),
        Equal => match (m.team1_pk, m.team2_pk) {
            (Some(p1), Some(p2)) if p1 > p2 => Ok(Some((team1, team2))),
            (Some(p1), Some(p2)) if p2 > p1 => Ok(Some((team2, team1))),
            _ => Err(TournamentError::DrawNotAllowed),
        },
    }
}

fn standings_block_of(bracket: &Bracket, block_id: Option<Uuid>) -> Option<Uuid> {
    block_id.filter(|id| {
        bracket
            .blocks
            .iter()
            .any(|b| b.id == *id && b.phase == MatchPhase::Preliminary)
    })
}

/// Confirm a match result.
///
/// 1. Reject a second confirmation, undecided teams and missing scores.
/// 2. Create the final match and mark the live match confirmed.
/// 3. Recalculate the match's block table (preliminary blocks only).
/// 4. Refresh every downstream slot (winner/loser and block-rank sources).
/// 5. Complete the tournament once every match is confirmed.
pub fn confirm_match(
    bracket: &mut Bracket,
    match_id: MatchId,
    confirmed_at: DateTime<Utc>,
) -> Result<Confirmation, TournamentError> {
    let idx = bracket.match_index(match_id)?;
    let m = &bracket.matches[idx];
    if m.is_confirmed() || bracket.result_for(match_id).is_some() {
        return Err(TournamentError::AlreadyConfirmed);
    }
    let (Some(team1), Some(team2)) = (m.team1_id, m.team2_id) else {
        return Err(TournamentError::TeamsNotDecided);
    };
    let (Some(s1), Some(s2)) = (m.team1_score, m.team2_score) else {
        return Err(TournamentError::ScoreMissing);
    };
    let decided = decide(m, team1, team2, s1, s2)?;

    let result = FinalMatch {
        live_match_id: m.id,
        tournament_id: m.tournament_id,
        match_code: m.match_code.clone(),
        phase: m.phase,
        block_id: m.block_id,
        team1_id: team1,
        team2_id: team2,
        team1_score: s1,
        team2_score: s2,
        team1_pk: if m.phase == MatchPhase::Final { m.team1_pk } else { None },
        team2_pk: if m.phase == MatchPhase::Final { m.team2_pk } else { None },
        winner_id: decided.map(|(w, _)| w),
        loser_id: decided.map(|(_, l)| l),
        confirmed_at,
    };
    let standings_block = standings_block_of(bracket, m.block_id);

    bracket.results.push(result.clone());
    let m = &mut bracket.matches[idx];
    m.status = LiveMatchStatus::Confirmed;
    m.updated_at = confirmed_at;

    if let Some(block_id) = standings_block {
        bracket.recalculate_standings(block_id);
    }
    let slot_changes = bracket.refresh_slots()?;

    let tournament_completed = bracket.all_confirmed();
    if tournament_completed && bracket.tournament.status != TournamentStatus::Completed {
        bracket.tournament.status = TournamentStatus::Completed;
        bracket.tournament.touch();
    }

    Ok(Confirmation {
        result,
        standings_block,
        slot_changes,
        tournament_completed,
    })
}

/// First confirmed match whose slot is fed by `code`, either directly through a
/// winner/loser source or through the final table of `block_name`.
fn confirmed_dependent(
    bracket: &Bracket,
    code: &str,
    block_name: Option<&str>,
) -> Result<Option<String>, TournamentError> {
    for other in bracket
        .matches
        .iter()
        .filter(|m| m.is_confirmed() && m.match_code != code)
    {
        for slot in Slot::BOTH {
            let expr = bracket.effective_expr(&other.match_code, slot)?;
            let via_outcome = expr.match_dependency() == Some(code);
            let via_rank = block_name.is_some() && expr.block_dependency() == block_name;
            if via_outcome || via_rank {
                return Ok(Some(other.match_code.clone()));
            }
        }
    }
    Ok(None)
}

/// Withdraw a confirmed result so it can be corrected.
///
/// Refused while any confirmed match was fed by it. The live match goes back
/// to finished with its score kept, dependent slots are cleared again.
pub fn unconfirm_match(bracket: &mut Bracket, match_id: MatchId) -> Result<Unconfirmation, TournamentError> {
    let idx = bracket.match_index(match_id)?;
    let m = &bracket.matches[idx];
    if !m.is_confirmed() {
        return Err(TournamentError::NotConfirmed);
    }
    let standings_block = standings_block_of(bracket, m.block_id);
    let block_name = standings_block
        .and_then(|id| bracket.blocks.iter().find(|b| b.id == id))
        .map(|b| b.name.clone());
    if let Some(dependent) = confirmed_dependent(bracket, &m.match_code, block_name.as_deref())? {
        return Err(TournamentError::DownstreamConfirmed(dependent));
    }

    bracket.results.retain(|r| r.live_match_id != match_id);
    let m = &mut bracket.matches[idx];
    m.status = LiveMatchStatus::Finished;
    m.updated_at = Utc::now();

    if let Some(block_id) = standings_block {
        bracket.recalculate_standings(block_id);
    }
    let slot_changes = bracket.refresh_slots()?;

    let tournament_reopened = bracket.tournament.status == TournamentStatus::Completed;
    if tournament_reopened {
        bracket.tournament.status = TournamentStatus::Ongoing;
        bracket.tournament.touch();
    }

    Ok(Unconfirmation {
        match_id,
        standings_block,
        slot_changes,
        tournament_reopened,
    })
}
