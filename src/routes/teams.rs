use actix_web::{
    delete, get, post, put,
    web::{Json, Path},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{created, ok, ApiResult};
use super::{load_bracket, Pool};
use crate::db;
use crate::error::TournamentError;
use crate::logic::{
    add_player as add_roster_player, apply_withdrawal, assign_block_seat, draw_blocks,
    ensure_can_unregister, register_team, SlotChange, WithdrawalAction,
};
use crate::models::{Team, TeamId, TournamentId, TournamentTeam, TournamentTeamId};

#[derive(Deserialize)]
struct CreateTeamBody {
    name: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    contact_email: Option<String>,
}

#[derive(Deserialize)]
struct RegisterBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct BlockSeatBody {
    #[serde(default)]
    block_name: Option<String>,
    #[serde(default)]
    block_position: Option<u32>,
}

#[derive(Deserialize)]
struct WithdrawalBody {
    action: WithdrawalAction,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default)]
    jersey_number: Option<u32>,
}

#[derive(Deserialize)]
struct DrawBody {
    blocks: Vec<String>,
}

/// Path segments: tournament id and registration id.
#[derive(Deserialize)]
struct RegistrationPath {
    id: TournamentId,
    team_id: TournamentTeamId,
}

#[derive(Deserialize)]
struct PlayerPath {
    id: TournamentId,
    team_id: TournamentTeamId,
    player_id: Uuid,
}

/// A registration after a change, plus the slots that moved because of it.
#[derive(Serialize)]
struct SeatChange {
    team: TournamentTeam,
    slot_changes: Vec<SlotChange>,
}

#[derive(Serialize)]
struct DrawResult {
    teams: Vec<TournamentTeam>,
    slot_changes: Vec<SlotChange>,
}

#[get("/api/teams")]
pub async fn list_teams(pool: Pool) -> ApiResult {
    let mut conn = pool.acquire().await?;
    ok(db::teams::list_teams(&mut *conn).await?)
}

#[post("/api/teams")]
pub async fn create_team(pool: Pool, body: Json<CreateTeamBody>) -> ApiResult {
    let body = body.into_inner();
    let mut team = Team::new(&body.name)?;
    team.short_name = body.short_name.filter(|s| !s.trim().is_empty());
    team.contact_email = body.contact_email.filter(|s| !s.trim().is_empty());
    let mut conn = pool.acquire().await?;
    db::teams::insert_team(&mut *conn, &team).await?;
    created(team)
}

#[get("/api/tournaments/{id}/teams")]
pub async fn list_registrations(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    let mut conn = pool.acquire().await?;
    if db::tournaments::get(&mut *conn, id).await?.is_none() {
        return Err(TournamentError::TournamentNotFound(id).into());
    }
    ok(db::teams::list_registrations(&mut *conn, id).await?)
}

#[post("/api/tournaments/{id}/teams")]
pub async fn register(pool: Pool, path: Path<TournamentId>, body: Json<RegisterBody>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let tournament = db::tournaments::get(&mut *tx, id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(id))?;
    let team = db::teams::get_team(&mut *tx, body.team_id)
        .await?
        .ok_or(TournamentError::TeamNotFound(body.team_id))?;
    let registered = db::teams::list_registrations(&mut *tx, id).await?;
    let registration = register_team(&tournament, &registered, &team)?;
    db::teams::insert_registration(&mut *tx, &registration).await?;
    tx.commit().await?;
    log::info!("{} registered for {}", team.name, tournament.name);
    created(registration)
}

#[delete("/api/tournaments/{id}/teams/{team_id}")]
pub async fn unregister(pool: Pool, path: Path<RegistrationPath>) -> ApiResult {
    let mut tx = pool.begin().await?;
    let tournament = db::tournaments::get(&mut *tx, path.id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(path.id))?;
    ensure_can_unregister(&tournament)?;
    if db::teams::get_registration(&mut *tx, path.id, path.team_id).await?.is_none() {
        return Err(TournamentError::TeamNotFound(path.team_id).into());
    }
    db::teams::delete_registration(&mut *tx, path.team_id).await?;
    tx.commit().await?;
    ok(path.team_id)
}

/// Seat a team manually, or unseat it by sending no block.
#[put("/api/tournaments/{id}/teams/{team_id}/block")]
pub async fn assign_block(pool: Pool, path: Path<RegistrationPath>, body: Json<BlockSeatBody>) -> ApiResult {
    let body = body.into_inner();
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let slot_changes = assign_block_seat(&mut bracket, path.team_id, body.block_name, body.block_position)?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    let team = bracket
        .team(path.team_id)
        .cloned()
        .ok_or(TournamentError::TeamNotFound(path.team_id))?;
    ok(SeatChange { team, slot_changes })
}

#[post("/api/tournaments/{id}/teams/{team_id}/withdrawal")]
pub async fn withdrawal(pool: Pool, path: Path<RegistrationPath>, body: Json<WithdrawalBody>) -> ApiResult {
    let body = body.into_inner();
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, path.id).await?;
    let (team, slot_changes) = apply_withdrawal(&mut bracket, path.team_id, body.action, body.reason)?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    ok(SeatChange { team, slot_changes })
}

#[get("/api/tournaments/{id}/teams/{team_id}/players")]
pub async fn list_players(pool: Pool, path: Path<RegistrationPath>) -> ApiResult {
    let mut conn = pool.acquire().await?;
    if db::teams::get_registration(&mut *conn, path.id, path.team_id).await?.is_none() {
        return Err(TournamentError::TeamNotFound(path.team_id).into());
    }
    ok(db::teams::list_players(&mut *conn, path.team_id).await?)
}

#[post("/api/tournaments/{id}/teams/{team_id}/players")]
pub async fn add_player(pool: Pool, path: Path<RegistrationPath>, body: Json<AddPlayerBody>) -> ApiResult {
    let mut tx = pool.begin().await?;
    if db::teams::get_registration(&mut *tx, path.id, path.team_id).await?.is_none() {
        return Err(TournamentError::TeamNotFound(path.team_id).into());
    }
    let roster = db::teams::list_players(&mut *tx, path.team_id).await?;
    let player = add_roster_player(&roster, path.team_id, &body.name, body.jersey_number)?;
    db::teams::insert_player(&mut *tx, &player).await?;
    tx.commit().await?;
    created(player)
}

#[delete("/api/tournaments/{id}/teams/{team_id}/players/{player_id}")]
pub async fn remove_player(pool: Pool, path: Path<PlayerPath>) -> ApiResult {
    let mut tx = pool.begin().await?;
    if db::teams::get_registration(&mut *tx, path.id, path.team_id).await?.is_none() {
        return Err(TournamentError::TeamNotFound(path.team_id).into());
    }
    if !db::teams::delete_player(&mut *tx, path.team_id, path.player_id).await? {
        return Err(TournamentError::PlayerNotFound(path.player_id).into());
    }
    tx.commit().await?;
    ok(path.player_id)
}

/// Randomly seat every active team into the named blocks.
#[post("/api/tournaments/{id}/draw")]
pub async fn draw(pool: Pool, path: Path<TournamentId>, body: Json<DrawBody>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let mut bracket = load_bracket(&mut *tx, id).await?;
    let slot_changes = draw_blocks(&mut bracket, &body.blocks, &mut rand::thread_rng())?;
    db::bracket::save_progress(&mut *tx, &bracket).await?;
    tx.commit().await?;
    ok(DrawResult {
        teams: bracket.teams,
        slot_changes,
    })
}
