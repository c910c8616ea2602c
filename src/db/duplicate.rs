use sqlx::SqlitePool;

use crate::db::{bracket, teams, tournaments};
use crate::error::TournamentError;
use crate::logic::{duplicate_tournament, TournamentCopy};
use crate::models::TournamentId;

#[derive(Debug, thiserror::Error)]
pub enum DuplicateError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Copy a tournament's setup into a new Planning tournament in one transaction.
pub async fn duplicate(
    pool: &SqlitePool,
    source_id: TournamentId,
    new_name: &str,
    include_teams: bool,
) -> Result<TournamentCopy, DuplicateError> {
    let mut tx = pool.begin().await?;
    let source = tournaments::get(&mut *tx, source_id)
        .await?
        .ok_or(TournamentError::TournamentNotFound(source_id))?;
    let templates = bracket::list_templates(&mut *tx, source_id).await?;
    let registrations = teams::list_registrations(&mut *tx, source_id).await?;
    let players = teams::list_tournament_players(&mut *tx, source_id).await?;

    let copy = duplicate_tournament(&source, &templates, &registrations, &players, new_name, include_teams)?;

    tournaments::insert(&mut *tx, &copy.tournament).await?;
    bracket::insert_templates(&mut *tx, &copy.templates).await?;
    for team in &copy.teams {
        teams::insert_registration(&mut *tx, team).await?;
    }
    for player in &copy.players {
        teams::insert_player(&mut *tx, player).await?;
    }
    tx.commit().await?;
    log::info!(
        "Duplicated {} into {} ({} template(s), {} team(s))",
        source.name,
        copy.tournament.name,
        copy.templates.len(),
        copy.teams.len()
    );
    Ok(copy)
}
