//! Master teams, tournament registrations and rosters.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::rows::{convert_all, PlayerRow, TeamRow, TournamentTeamRow};
use crate::models::{Player, Team, TournamentId, TournamentTeam, TournamentTeamId};

const REGISTRATION_COLUMNS: &str = "id, tournament_id, team_id, team_name, block_name, \
     block_position, withdrawal, withdrawal_reason, registered_at";

pub async fn insert_team(conn: &mut SqliteConnection, team: &Team) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO teams (id, name, short_name, contact_email, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(team.id)
    .bind(&team.name)
    .bind(&team.short_name)
    .bind(&team.contact_email)
    .bind(team.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn list_teams(conn: &mut SqliteConnection) -> Result<Vec<Team>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TeamRow>(
        "SELECT id, name, short_name, contact_email, created_at FROM teams ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_team(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Team>, sqlx::Error> {
    let row = sqlx::query_as::<_, TeamRow>(
        "SELECT id, name, short_name, contact_email, created_at FROM teams WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn insert_registration(
    conn: &mut SqliteConnection,
    team: &TournamentTeam,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO tournament_teams ({REGISTRATION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(team.id)
    .bind(team.tournament_id)
    .bind(team.team_id)
    .bind(&team.team_name)
    .bind(&team.block_name)
    .bind(team.block_position.map(i64::from))
    .bind(team.withdrawal.as_str())
    .bind(&team.withdrawal_reason)
    .bind(team.registered_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Registrations of a tournament, seated teams first by block and seat.
pub async fn list_registrations(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
) -> Result<Vec<TournamentTeam>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TournamentTeamRow>(&format!(
        "SELECT {REGISTRATION_COLUMNS} FROM tournament_teams WHERE tournament_id = ? \
         ORDER BY block_name IS NULL, block_name, block_position, registered_at"
    ))
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    convert_all(rows)
}

pub async fn get_registration(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
    id: TournamentTeamId,
) -> Result<Option<TournamentTeam>, sqlx::Error> {
    let row = sqlx::query_as::<_, TournamentTeamRow>(&format!(
        "SELECT {REGISTRATION_COLUMNS} FROM tournament_teams WHERE tournament_id = ? AND id = ?"
    ))
    .bind(tournament_id)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(TournamentTeam::try_from).transpose()
}

/// Write back seat and withdrawal state.
pub async fn update_registration(
    conn: &mut SqliteConnection,
    team: &TournamentTeam,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE tournament_teams
        SET block_name = ?, block_position = ?, withdrawal = ?, withdrawal_reason = ?
        WHERE id = ?
        "#,
    )
    .bind(&team.block_name)
    .bind(team.block_position.map(i64::from))
    .bind(team.withdrawal.as_str())
    .bind(&team.withdrawal_reason)
    .bind(team.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Remove a registration together with its roster.
pub async fn delete_registration(
    conn: &mut SqliteConnection,
    id: TournamentTeamId,
) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM players WHERE tournament_team_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let done = sqlx::query("DELETE FROM tournament_teams WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected() > 0)
}

pub async fn insert_player(conn: &mut SqliteConnection, player: &Player) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO players (id, tournament_team_id, name, jersey_number, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(player.id)
    .bind(player.tournament_team_id)
    .bind(&player.name)
    .bind(player.jersey_number.map(i64::from))
    .bind(player.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn list_players(
    conn: &mut SqliteConnection,
    tournament_team_id: TournamentTeamId,
) -> Result<Vec<Player>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PlayerRow>(
        "SELECT id, tournament_team_id, name, jersey_number, created_at FROM players \
         WHERE tournament_team_id = ? ORDER BY jersey_number IS NULL, jersey_number, name",
    )
    .bind(tournament_team_id)
    .fetch_all(&mut *conn)
    .await?;
    convert_all(rows)
}

/// Every player registered in a tournament.
pub async fn list_tournament_players(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
) -> Result<Vec<Player>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PlayerRow>(
        r#"
        SELECT p.id, p.tournament_team_id, p.name, p.jersey_number, p.created_at
        FROM players p
        JOIN tournament_teams tt ON tt.id = p.tournament_team_id
        WHERE tt.tournament_id = ?
        ORDER BY p.created_at
        "#,
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    convert_all(rows)
}

pub async fn delete_player(
    conn: &mut SqliteConnection,
    tournament_team_id: TournamentTeamId,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let done = sqlx::query("DELETE FROM players WHERE id = ? AND tournament_team_id = ?")
        .bind(id)
        .bind(tournament_team_id)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected() > 0)
}
