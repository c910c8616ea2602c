//! Loading and storing the bracket aggregate of one tournament.
//!
//! Handlers open a transaction, `load`, mutate the aggregate with the pure
//! logic functions, write back what changed and commit.

use sqlx::SqliteConnection;

use crate::db::rows::{convert_all, BlockRow, FinalMatchRow, LiveMatchRow, OverrideRow, StandingRow, TemplateRow};
use crate::db::{teams, tournaments};
use crate::logic::Bracket;
use crate::models::{
    FinalMatch, LiveMatch, MatchBlock, MatchId, MatchOverride, MatchTemplate, Standing, TournamentId,
};

const MATCH_COLUMNS: &str = "id, tournament_id, template_id, match_code, phase, block_id, match_number, \
     team1_id, team2_id, team1_display, team2_display, court_number, start_time, team1_score, \
     team2_score, team1_pk, team2_pk, status, updated_at";

const RESULT_COLUMNS: &str = "live_match_id, tournament_id, match_code, phase, block_id, team1_id, \
     team2_id, team1_score, team2_score, team1_pk, team2_pk, winner_id, loser_id, confirmed_at";

pub async fn list_templates(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
) -> Result<Vec<MatchTemplate>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TemplateRow>(
        "SELECT id, tournament_id, match_code, phase, block_name, round_name, match_number, \
         team1_source, team2_source FROM match_templates WHERE tournament_id = ? \
         ORDER BY match_number, match_code",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    convert_all(rows)
}

pub async fn list_matches(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
) -> Result<Vec<LiveMatch>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LiveMatchRow>(&format!(
        "SELECT {MATCH_COLUMNS} FROM live_matches WHERE tournament_id = ? ORDER BY match_number, match_code"
    ))
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    convert_all(rows)
}

/// Load the whole aggregate, or None if the tournament does not exist.
pub async fn load(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
) -> Result<Option<Bracket>, sqlx::Error> {
    let Some(tournament) = tournaments::get(conn, tournament_id).await? else {
        return Ok(None);
    };
    let mut bracket = Bracket::new(tournament);
    bracket.teams = teams::list_registrations(conn, tournament_id).await?;

    let blocks = sqlx::query_as::<_, BlockRow>(
        "SELECT id, tournament_id, name, phase, display_order FROM match_blocks \
         WHERE tournament_id = ? ORDER BY display_order",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    bracket.blocks = convert_all(blocks)?;
    bracket.templates = list_templates(conn, tournament_id).await?;
    bracket.matches = list_matches(conn, tournament_id).await?;

    let results = sqlx::query_as::<_, FinalMatchRow>(&format!(
        "SELECT {RESULT_COLUMNS} FROM final_matches WHERE tournament_id = ? ORDER BY confirmed_at"
    ))
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    bracket.results = convert_all(results)?;

    let overrides = sqlx::query_as::<_, OverrideRow>(
        "SELECT id, tournament_id, match_code, team1_source, team2_source, reason, updated_at \
         FROM match_overrides WHERE tournament_id = ?",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    bracket.overrides = overrides.into_iter().map(Into::into).collect();

    let standings = sqlx::query_as::<_, StandingRow>(
        "SELECT block_id, tournament_team_id, team_name, rank, played, wins, draws, losses, \
         goals_for, goals_against, points, withdrawn FROM block_standings \
         WHERE tournament_id = ? ORDER BY block_id, rank",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;
    bracket.standings = convert_all(standings)?;
    Ok(Some(bracket))
}

/// Replace the template set of a tournament that has no live matches yet.
pub async fn replace_templates(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
    templates: &[MatchTemplate],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM match_templates WHERE tournament_id = ?")
        .bind(tournament_id)
        .execute(&mut *conn)
        .await?;
    insert_templates(conn, templates).await
}

pub async fn insert_templates(
    conn: &mut SqliteConnection,
    templates: &[MatchTemplate],
) -> Result<(), sqlx::Error> {
    for t in templates {
        sqlx::query(
            r#"
            INSERT INTO match_templates (id, tournament_id, match_code, phase, block_name,
                                         round_name, match_number, team1_source, team2_source)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(t.id)
        .bind(t.tournament_id)
        .bind(&t.match_code)
        .bind(t.phase.as_str())
        .bind(&t.block_name)
        .bind(&t.round_name)
        .bind(i64::from(t.match_number))
        .bind(&t.team1_source)
        .bind(&t.team2_source)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn insert_blocks(conn: &mut SqliteConnection, blocks: &[MatchBlock]) -> Result<(), sqlx::Error> {
    for b in blocks {
        sqlx::query(
            "INSERT INTO match_blocks (id, tournament_id, name, phase, display_order) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(b.id)
        .bind(b.tournament_id)
        .bind(&b.name)
        .bind(b.phase.as_str())
        .bind(i64::from(b.display_order))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn insert_live_matches(conn: &mut SqliteConnection, matches: &[LiveMatch]) -> Result<(), sqlx::Error> {
    for m in matches {
        sqlx::query(&format!(
            "INSERT INTO live_matches ({MATCH_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(m.id)
        .bind(m.tournament_id)
        .bind(m.template_id)
        .bind(&m.match_code)
        .bind(m.phase.as_str())
        .bind(m.block_id)
        .bind(i64::from(m.match_number))
        .bind(m.team1_id)
        .bind(m.team2_id)
        .bind(&m.team1_display)
        .bind(&m.team2_display)
        .bind(m.court_number.map(i64::from))
        .bind(m.start_time)
        .bind(m.team1_score.map(i64::from))
        .bind(m.team2_score.map(i64::from))
        .bind(m.team1_pk.map(i64::from))
        .bind(m.team2_pk.map(i64::from))
        .bind(m.status.as_str())
        .bind(m.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn update_live_match(conn: &mut SqliteConnection, m: &LiveMatch) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE live_matches
        SET team1_id = ?, team2_id = ?, team1_display = ?, team2_display = ?, court_number = ?,
            start_time = ?, team1_score = ?, team2_score = ?, team1_pk = ?, team2_pk = ?,
            status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(m.team1_id)
    .bind(m.team2_id)
    .bind(&m.team1_display)
    .bind(&m.team2_display)
    .bind(m.court_number.map(i64::from))
    .bind(m.start_time)
    .bind(m.team1_score.map(i64::from))
    .bind(m.team2_score.map(i64::from))
    .bind(m.team1_pk.map(i64::from))
    .bind(m.team2_pk.map(i64::from))
    .bind(m.status.as_str())
    .bind(m.updated_at)
    .bind(m.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Store a confirmed result. A second insert for the same live match fails
/// on the primary key.
pub async fn insert_final_match(conn: &mut SqliteConnection, r: &FinalMatch) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO final_matches ({RESULT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(r.live_match_id)
    .bind(r.tournament_id)
    .bind(&r.match_code)
    .bind(r.phase.as_str())
    .bind(r.block_id)
    .bind(r.team1_id)
    .bind(r.team2_id)
    .bind(i64::from(r.team1_score))
    .bind(i64::from(r.team2_score))
    .bind(r.team1_pk.map(i64::from))
    .bind(r.team2_pk.map(i64::from))
    .bind(r.winner_id)
    .bind(r.loser_id)
    .bind(r.confirmed_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete_final_match(conn: &mut SqliteConnection, match_id: MatchId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM final_matches WHERE live_match_id = ?")
        .bind(match_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn replace_overrides(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
    overrides: &[MatchOverride],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM match_overrides WHERE tournament_id = ?")
        .bind(tournament_id)
        .execute(&mut *conn)
        .await?;
    for o in overrides {
        sqlx::query(
            "INSERT INTO match_overrides (id, tournament_id, match_code, team1_source, team2_source, \
             reason, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(o.id)
        .bind(o.tournament_id)
        .bind(&o.match_code)
        .bind(&o.team1_source)
        .bind(&o.team2_source)
        .bind(&o.reason)
        .bind(o.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_standings(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
    standings: &[Standing],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM block_standings WHERE tournament_id = ?")
        .bind(tournament_id)
        .execute(&mut *conn)
        .await?;
    for s in standings {
        sqlx::query(
            r#"
            INSERT INTO block_standings (block_id, tournament_team_id, tournament_id, team_name, rank,
                                         played, wins, draws, losses, goals_for, goals_against,
                                         points, withdrawn)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(s.block_id)
        .bind(s.tournament_team_id)
        .bind(tournament_id)
        .bind(&s.team_name)
        .bind(i64::from(s.rank))
        .bind(i64::from(s.played))
        .bind(i64::from(s.wins))
        .bind(i64::from(s.draws))
        .bind(i64::from(s.losses))
        .bind(i64::from(s.goals_for))
        .bind(i64::from(s.goals_against))
        .bind(i64::from(s.points))
        .bind(s.withdrawn)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Write back the mutable parts of the aggregate: tournament status, every
/// live match, registrations, overrides and standings. Final matches are
/// written separately with `insert_final_match` / `delete_final_match`.
pub async fn save_progress(conn: &mut SqliteConnection, bracket: &Bracket) -> Result<(), sqlx::Error> {
    let tournament_id = bracket.tournament.id;
    tournaments::update(conn, &bracket.tournament).await?;
    for team in &bracket.teams {
        teams::update_registration(conn, team).await?;
    }
    for m in &bracket.matches {
        update_live_match(conn, m).await?;
    }
    replace_overrides(conn, tournament_id, &bracket.overrides).await?;
    replace_standings(conn, tournament_id, &bracket.standings).await?;
    log::debug!("Saved bracket of {}", bracket.tournament.name);
    Ok(())
}
