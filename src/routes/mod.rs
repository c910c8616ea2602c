//! HTTP API. Every handler is registered in [`configure`]; state is a shared
//! `SqlitePool` in `web::Data`.

mod error;
mod matches;
mod public;
mod teams;
mod tournaments;

use actix_web::web::{self, Data};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db;
use crate::error::TournamentError;
use crate::logic::Bracket;
use crate::models::{MatchBlock, MatchPhase, Standing, TournamentId};

pub use error::{ApiResult, AppError};

type Pool = Data<SqlitePool>;

/// One preliminary block with its table, ordered by rank.
#[derive(Serialize)]
struct BlockTable<'a> {
    block: &'a MatchBlock,
    rows: Vec<&'a Standing>,
}

fn block_tables(bracket: &Bracket) -> Vec<BlockTable<'_>> {
    bracket
        .blocks
        .iter()
        .filter(|b| b.phase == MatchPhase::Preliminary)
        .map(|block| BlockTable {
            block,
            rows: bracket.block_table(block.id),
        })
        .collect()
}

async fn load_bracket(conn: &mut SqliteConnection, id: TournamentId) -> Result<Bracket, AppError> {
    db::bracket::load(conn, id)
        .await?
        .ok_or(AppError::Tournament(TournamentError::TournamentNotFound(id)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .service(tournaments::health)
    .service(tournaments::list_groups)
    .service(tournaments::create_group)
    .service(tournaments::delete_group)
    .service(tournaments::list_tournaments)
    .service(tournaments::create_tournament)
    .service(tournaments::get_tournament)
    .service(tournaments::update_tournament)
    .service(tournaments::purge_tournament)
    .service(tournaments::set_status)
    .service(tournaments::set_published)
    .service(teams::list_teams)
    .service(teams::create_team)
    .service(teams::list_registrations)
    .service(teams::register)
    .service(teams::unregister)
    .service(teams::assign_block)
    .service(teams::withdrawal)
    .service(teams::list_players)
    .service(teams::add_player)
    .service(teams::remove_player)
    .service(teams::draw)
    .service(matches::list_templates)
    .service(matches::replace_templates)
    .service(matches::round_robin)
    .service(matches::generate)
    .service(matches::list_matches)
    .service(matches::schedule)
    .service(matches::score)
    .service(matches::confirm)
    .service(matches::unconfirm)
    .service(matches::list_overrides)
    .service(matches::set_override)
    .service(matches::clear_override)
    .service(matches::standings)
    .service(public::list_published)
    .service(public::view)
    .service(public::standings_csv)
    .service(public::results_csv);
}
