//! Read-only endpoints for published tournaments. Unpublished ones are
//! reported as missing.

use actix_web::{
    get,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web::Path,
    HttpResponse,
};
use serde::Serialize;

use super::error::{ok, ApiResult, AppError};
use super::{block_tables, load_bracket, BlockTable, Pool};
use crate::db;
use crate::error::TournamentError;
use crate::logic::{results_csv as render_results, standings_csv as render_standings, Bracket};
use crate::models::{FinalMatch, LiveMatch, Tournament, TournamentId, TournamentTeam};

/// What spectators see; override reasons stay private.
#[derive(Serialize)]
struct PublicView<'a> {
    tournament: &'a Tournament,
    teams: Vec<&'a TournamentTeam>,
    matches: &'a [LiveMatch],
    results: &'a [FinalMatch],
    standings: Vec<BlockTable<'a>>,
}

async fn published_bracket(pool: &Pool, id: TournamentId) -> Result<Bracket, AppError> {
    let mut conn = pool.acquire().await?;
    let bracket = load_bracket(&mut *conn, id).await?;
    if !bracket.tournament.is_public {
        return Err(TournamentError::TournamentNotFound(id).into());
    }
    Ok(bracket)
}

fn csv_response(filename: String, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(body)
}

#[get("/api/public/tournaments")]
pub async fn list_published(pool: Pool) -> ApiResult {
    let mut conn = pool.acquire().await?;
    ok(db::tournaments::list(&mut *conn, true).await?)
}

#[get("/api/public/tournaments/{id}")]
pub async fn view(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let bracket = published_bracket(&pool, path.into_inner()).await?;
    ok(PublicView {
        tournament: &bracket.tournament,
        teams: bracket.teams.iter().filter(|t| !t.is_withdrawn()).collect(),
        matches: &bracket.matches,
        results: &bracket.results,
        standings: block_tables(&bracket),
    })
}

#[get("/api/public/tournaments/{id}/standings.csv")]
pub async fn standings_csv(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    let bracket = published_bracket(&pool, id).await?;
    let body = render_standings(&bracket)?;
    Ok(csv_response(format!("standings-{id}.csv"), body))
}

#[get("/api/public/tournaments/{id}/results.csv")]
pub async fn results_csv(pool: Pool, path: Path<TournamentId>) -> ApiResult {
    let id = path.into_inner();
    let bracket = published_bracket(&pool, id).await?;
    let body = render_results(&bracket)?;
    Ok(csv_response(format!("results-{id}.csv"), body))
}
