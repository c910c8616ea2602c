use actix_web::{
    delete, get, post, put,
    web::{Json, Path},
};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{created, ok, ApiResult};
use super::{block_tables, load_bracket, Pool};
use crate::db;
use crate::error::TournamentError;
use crate::logic::{
    clear_override as clear_slot_override, confirm_match, generate_matches, record_score,
    round_robin_templates, schedule_match, set_override as set_slot_override, unconfirm_match,
    validate_templates, ScoreEntry,
};
use crate::models::{
    FinalMatch, LiveMatch, MatchId, MatchPhase, MatchTemplate, Slot, TournamentId,
};

#[derive(Deserialize)]
struct TemplateBody {
    match_code: String,
    phase: MatchPhase,
    #[serde(default)]
    block_name: Option<String>,
    #[serde(default)]
    round_name: Option<String>,
    match_number: u32,
    team1_source: String,
    team2_source: String,
}

impl TemplateBody {
    fn into_template(self, tournament_id: TournamentId) -> MatchTemplate {
        let mut t = MatchTemplate::new(
            tournament_id,
            self.match_code.trim(),
            self.phase,
            self.block_name.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
            self.match_number,
            self.team1_source.trim(),
            self.team2_source.trim(),
        );
        t.round_name = self.round_name;
        t
    }
}

#[derive(Deserialize)]
struct RoundRobinBody {
    block: String,
    team_count: u32,
    /// Defaults to one past the highest existing match number.
    #[serde(default)]
    first_number: Option<u32>,
}

#[derive(Deserialize)]
struct ScheduleBody {
    #[serde(default)]
    court_number: Option<u32>,
    #[serde(default)]
    start_time: Option<NaiveTime>,
}

#[derive(Deserialize)]
struct OverrideBody {
    match_code: String,
    slot: Slot,
    source: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Path segments: tournament id and live match id.
#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct OverridePath {
    id: TournamentId,
    match_code: String,
    slot: Slot,
}

#[derive(Serialize)]
struct MatchList {
    matches: Vec<LiveMatch>,
    results: Vec<FinalMatch>,
}

#[get("/api/tournaments/{id}/templates")]
pub async fn list_templates(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    let mut conn = pool.acquire().await?;
    if db::tournaments::get(&mut *conn, id).await?.is_none() {
        return Err(TournamentError::TournamentNotFound(id).into());
    }
    ok(db::bracket::list_templates(&mut *conn, id).await?)
}

/// Replace the whole template set. Only before matches are generated.
#[post("/api/tournaments/{id}/templates")]
pub async fn replace_templates(pool: Pool, path: Path<TournamentId>, body: Json<Vec<TemplateBody>>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let bracket = load_bracket(&mut *tx, id).await?;
    if !bracket.matches.is_empty() {
        return Err(TournamentError::MatchesAlreadyGenerated.into());
    }
    let templates: Vec<MatchTemplate> = body.into_inner().into_iter().map(|t| t.into_template(id)).collect();
    validate_templates(&templates)?;
    db::bracket::replace_templates(&mut *tx, id, &templates).await?;
    tx.commit().await?;
    log::info!("Stored {} template(s) for {}", templates.len(), bracket.tournament.name);
    ok(templates)
}

/// Append a round robin for one block to the existing templates.
#[post("/api/tournaments/{id}/templates/round-robin")]
pub async fn round_robin(pool: Pool, path: Path<TournamentId>, body: Json<RoundRobinBody>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let bracket = load_bracket(&mut *tx, id).await?;
    if !bracket.matches.is_empty() {
        return Err(TournamentError::MatchesAlreadyGenerated.into());
    }
    let first_number = body.first_number.unwrap_or_else(|| {
        bracket.templates.iter().map(|t| t.match_number).max().unwrap_or(0) + 1
    });
    let added = round_robin_templates(id, body.block.trim(), body.team_count, first_number)?;
    let mut all = bracket.templates;
    all.extend(added.iter().cloned());
    validate_templates(&all)?;
    db::bracket::insert_templates(&mut *tx, &added).await?;
    tx.commit().await?;
    created(added)
}

#[post("/api/tournaments/{id}/matches/generate")]
pub async fn generate(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, id).await?;
    generate_matches(&mut bracket)?;
    db::bracket::insert_blocks(&mut *tx, &bracket.blocks).await?;
    db::bracket::insert_live_matches(&mut *tx, &bracket.matches).await?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    created(MatchList {
        matches: bracket.matches,
        results: bracket.results,
    })
}

#[get("/api/tournaments/{id}/matches")]
pub async fn list_matches(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let mut conn = pool.acquire().await?;
    let bracket = load_bracket(&mut *conn, path.into_inner()).await?;
    ok(MatchList {
        matches: bracket.matches,
        results: bracket.results,
    })
}

#[put("/api/tournaments/{id}/matches/{match_id}/schedule")]
pub async fn schedule(pool: Pool, path: Path<MatchPath>, body: Json<ScheduleBody>) -> ApiResult {
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let m = schedule_match(&mut bracket, path.match_id, body.court_number, body.start_time)?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    ok(m)
}

#[put("/api/tournaments/{id}/matches/{match_id}/score")]
pub async fn score(pool: Pool, path: Path<MatchPath>, body: Json<ScoreEntry>) -> ApiResult {
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let m = record_score(&mut bracket, path.match_id, &body)?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    ok(m)
}

/// Confirm the entered score and propagate the outcome downstream.
#[post("/api/tournaments/{id}/matches/{match_id}/confirm")]
pub async fn confirm(pool: Pool, path: Path<MatchPath>) -> ApiResult {
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let confirmation = confirm_match(&mut bracket, path.match_id, Utc::now())?;
    db::bracket::insert_final_match(&mut *tx, &confirmation.result).await?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    log::info!(
        "Confirmed {} ({} slot(s) updated)",
        confirmation.result.match_code,
        confirmation.slot_changes.len()
    );
    if confirmation.tournament_completed {
        log::info!("{} completed", bracket.tournament.name);
    }
    ok(confirmation)
}

#[delete("/api/tournaments/{id}/matches/{match_id}/confirm")]
pub async fn unconfirm(pool: Pool, path: Path<MatchPath>) -> ApiResult {
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let change = unconfirm_match(&mut bracket, path.match_id)?;
    db::bracket::delete_final_match(&mut *tx, path.match_id).await?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    log::info!("Unconfirmed match {}", path.match_id);
    ok(change)
}

#[get("/api/tournaments/{id}/overrides")]
pub async fn list_overrides(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let mut conn = pool.acquire().await?;
    let bracket = load_bracket(&mut *conn, path.into_inner()).await?;
    ok(bracket.overrides)
}

#[put("/api/tournaments/{id}/overrides")]
pub async fn set_override(pool: Pool, path: Path<TournamentId>, body: Json<OverrideBody>) -> ApiResult {
    let body = body.into_inner();
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.into_inner()).await?;
    let changes = set_slot_override(&mut bracket, &body.match_code, body.slot, body.source.trim(), body.reason)?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    ok(changes)
}

#[delete("/api/tournaments/{id}/overrides/{match_code}/{slot}")]
pub async fn clear_override(pool: Pool, path: Path<OverridePath>) -> ApiResult {
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let changes = clear_slot_override(&mut bracket, &path.match_code, path.slot)?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    ok(changes)
}

#[get("/api/tournaments/{id}/standings")]
pub async fn standings(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let mut conn = pool.acquire().await?;
    let bracket = load_bracket(&mut *conn, path.into_inner()).await?;
    ok(block_tables(&bracket))
}
