//! Tournament groups and tournaments.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::rows::{convert_all, GroupRow, TournamentRow};
use crate::models::{Tournament, TournamentGroup};

const TOURNAMENT_COLUMNS: &str = "id, group_id, name, venue, event_date, status, win_points, \
     draw_points, loss_points, is_public, created_at, updated_at";

pub async fn insert_group(conn: &mut SqliteConnection, group: &TournamentGroup) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tournament_groups (id, name, description, created_at) VALUES (?, ?, ?, ?)")
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.created_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list_groups(conn: &mut SqliteConnection) -> Result<Vec<TournamentGroup>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, description, created_at FROM tournament_groups ORDER BY created_at",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Delete a group; its tournaments are detached, not deleted. Returns false if absent.
pub async fn delete_group(conn: &mut SqliteConnection, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query("UPDATE tournaments SET group_id = NULL WHERE group_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let done = sqlx::query("DELETE FROM tournament_groups WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected() > 0)
}

pub async fn insert(conn: &mut SqliteConnection, t: &Tournament) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tournaments (id, group_id, name, venue, event_date, status, win_points,
                                 draw_points, loss_points, is_public, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(t.id)
    .bind(t.group_id)
    .bind(&t.name)
    .bind(&t.venue)
    .bind(t.event_date)
    .bind(t.status.as_str())
    .bind(i64::from(t.scoring.win_points))
    .bind(i64::from(t.scoring.draw_points))
    .bind(i64::from(t.scoring.loss_points))
    .bind(t.is_public)
    .bind(t.created_at)
    .bind(t.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Tournament>, sqlx::Error> {
    let row = sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Tournament::try_from).transpose()
}

/// All tournaments, or only published ones, newest first.
pub async fn list(conn: &mut SqliteConnection, public_only: bool) -> Result<Vec<Tournament>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE (? = 0 OR is_public = 1) \
         ORDER BY event_date DESC, created_at DESC"
    ))
    .bind(public_only)
    .fetch_all(&mut *conn)
    .await?;
    convert_all(rows)
}

/// Write back every mutable column.
pub async fn update(conn: &mut SqliteConnection, t: &Tournament) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE tournaments
        SET group_id = ?, name = ?, venue = ?, event_date = ?, status = ?, win_points = ?,
            draw_points = ?, loss_points = ?, is_public = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(t.group_id)
    .bind(&t.name)
    .bind(&t.venue)
    .bind(t.event_date)
    .bind(t.status.as_str())
    .bind(i64::from(t.scoring.win_points))
    .bind(i64::from(t.scoring.draw_points))
    .bind(i64::from(t.scoring.loss_points))
    .bind(t.is_public)
    .bind(t.updated_at)
    .bind(t.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
