use actix_web::{
    delete, get, patch, post, put,
    web::{Json, Path},
    HttpResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{created, ok, ApiResult};
use super::Pool;
use crate::db;
use crate::error::TournamentError;
use crate::models::{GroupId, ScoringRules, Tournament, TournamentGroup, TournamentId, TournamentStatus};

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateGroupBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct TournamentBody {
    name: String,
    #[serde(default)]
    group_id: Option<GroupId>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    event_date: Option<NaiveDate>,
    #[serde(default)]
    win_points: Option<u32>,
    #[serde(default)]
    draw_points: Option<u32>,
    #[serde(default)]
    loss_points: Option<u32>,
}

impl TournamentBody {
    fn scoring(&self, current: ScoringRules) -> ScoringRules {
        ScoringRules {
            win_points: self.win_points.unwrap_or(current.win_points),
            draw_points: self.draw_points.unwrap_or(current.draw_points),
            loss_points: self.loss_points.unwrap_or(current.loss_points),
        }
    }
}

#[derive(Deserialize)]
struct StatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize)]
struct PublishBody {
    is_public: bool,
}

#[get("/api/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-manager",
    })
}

#[get("/api/groups")]
pub async fn list_groups(pool: Pool) -> ApiResult {
    let mut conn = pool.acquire().await?;
    ok(db::tournaments::list_groups(&mut *conn).await?)
}

#[post("/api/groups")]
pub async fn create_group(pool: Pool, body: Json<CreateGroupBody>) -> ApiResult {
    let body = body.into_inner();
    let group = TournamentGroup::new(&body.name, body.description)?;
    let mut conn = pool.acquire().await?;
    db::tournaments::insert_group(&mut *conn, &group).await?;
    log::info!("Created group {}", group.name);
    created(group)
}

/// Tournaments of the group are kept and detached.
#[delete("/api/groups/{id}")]
pub async fn delete_group(pool: Pool, path: Path<GroupId>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    if !db::tournaments::delete_group(&mut *tx, id).await? {
        return Err(TournamentError::GroupNotFound(id).into());
    }
    tx.commit().await?;
    ok(id)
}

#[get("/api/tournaments")]
pub async fn list_tournaments(pool: Pool) -> ApiResult {
    let mut conn = pool.acquire().await?;
    ok(db::tournaments::list(&mut *conn, false).await?)
}

#[post("/api/tournaments")]
pub async fn create_tournament(pool: Pool, body: Json<TournamentBody>) -> ApiResult {
    let mut tournament = Tournament::new(&body.name)?;
    tournament.group_id = body.group_id;
    tournament.venue = body.venue.clone();
    tournament.event_date = body.event_date;
    tournament.scoring = body.scoring(tournament.scoring);
    let mut conn = pool.acquire().await?;
    db::tournaments::insert(&mut *conn, &tournament).await?;
    log::info!("Created tournament {} ({})", tournament.name, tournament.id);
    created(tournament)
}

#[get("/api/tournaments/{id}")]
pub async fn get_tournament(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    let mut conn = pool.acquire().await?;
    let tournament = db::tournaments::get(&mut *conn, id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(id))?;
    ok(tournament)
}

/// Update settings. Scoring is fixed once matches have been generated.
#[put("/api/tournaments/{id}")]
pub async fn update_tournament(pool: Pool, path: Path<TournamentId>, body: Json<TournamentBody>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let mut tournament = db::tournaments::get(&mut *tx, id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(id))?;
    let scoring = body.scoring(tournament.scoring);
    if scoring != tournament.scoring && !tournament.status.is_setup() {
        return Err(TournamentError::InvalidState("scoring is fixed once matches exist").into());
    }
    tournament.rename(&body.name)?;
    tournament.group_id = body.group_id;
    tournament.venue = body.venue.clone();
    tournament.event_date = body.event_date;
    tournament.scoring = scoring;
    db::tournaments::update(&mut *tx, &tournament).await?;
    tx.commit().await?;
    ok(tournament)
}

/// Delete the tournament and everything under it. Responds with the step
/// report; a purge that stopped early is a 500 carrying the same report.
#[delete("/api/tournaments/{id}")]
pub async fn purge_tournament(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    {
        let mut conn = pool.acquire().await?;
        if db::tournaments::get(&mut *conn, id).await?.is_none() {
            return Err(TournamentError::TournamentNotFound(id).into());
        }
    }
    let report = db::purge::purge_tournament(&pool, id).await;
    if report.success {
        return ok(report);
    }
    let error = match report.aborted_at {
        Some(table) => format!("purge aborted at {table}"),
        None => "purge finished with errors".to_string(),
    };
    Ok(HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": error,
        "data": report,
    })))
}

#[patch("/api/tournaments/{id}/status")]
pub async fn set_status(pool: Pool, path: Path<TournamentId>, body: Json<StatusBody>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let mut tournament = db::tournaments::get(&mut *tx, id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(id))?;
    tournament.advance_status(body.status)?;
    db::tournaments::update(&mut *tx, &tournament).await?;
    tx.commit().await?;
    log::info!("{} is now {}", tournament.name, tournament.status);
    ok(tournament)
}

#[patch("/api/tournaments/{id}/publish")]
pub async fn set_published(pool: Pool, path: Path<TournamentId>, body: Json<PublishBody>) -> ApiResult {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let mut tournament = db::tournaments::get(&mut *tx, id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(id))?;
    tournament.set_published(body.is_public);
    db::tournaments::update(&mut *tx, &tournament).await?;
    tx.commit().await?;
    ok(tournament)
}
