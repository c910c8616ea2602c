//! Hard deletion of a tournament and all of its data.
//!
//! Each table is cleared in its own statement, children first. Steps marked
//! critical stop the purge when they fail, since later deletes would violate
//! foreign keys; the others are logged and skipped.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::TournamentId;

#[derive(Clone, Debug, Serialize)]
pub struct PurgeStep {
    pub table: &'static str,
    pub critical: bool,
    pub deleted: u64,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PurgeReport {
    pub tournament_id: TournamentId,
    pub steps: Vec<PurgeStep>,
    pub aborted_at: Option<&'static str>,
    pub success: bool,
}

impl PurgeReport {
    /// Rows removed from the tournaments table (0 if it never existed).
    pub fn tournament_deleted(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.table == "tournaments" && s.deleted > 0)
    }
}

const STEPS: &[(&str, bool, &str)] = &[
    ("match_overrides", false, "DELETE FROM match_overrides WHERE tournament_id = ?"),
    ("block_standings", false, "DELETE FROM block_standings WHERE tournament_id = ?"),
    ("final_matches", true, "DELETE FROM final_matches WHERE tournament_id = ?"),
    ("live_matches", true, "DELETE FROM live_matches WHERE tournament_id = ?"),
    ("match_blocks", true, "DELETE FROM match_blocks WHERE tournament_id = ?"),
    ("match_templates", true, "DELETE FROM match_templates WHERE tournament_id = ?"),
    (
        "players",
        true,
        "DELETE FROM players WHERE tournament_team_id IN \
         (SELECT id FROM tournament_teams WHERE tournament_id = ?)",
    ),
    ("tournament_teams", true, "DELETE FROM tournament_teams WHERE tournament_id = ?"),
    ("tournaments", true, "DELETE FROM tournaments WHERE id = ?"),
];

pub async fn purge_tournament(pool: &SqlitePool, tournament_id: TournamentId) -> PurgeReport {
    let mut steps = Vec::with_capacity(STEPS.len());
    let mut aborted_at = None;

    for &(table, critical, sql) in STEPS {
        match sqlx::query(sql).bind(tournament_id).execute(pool).await {
            Ok(done) => {
                log::debug!("purge {tournament_id}: {} row(s) from {table}", done.rows_affected());
                steps.push(PurgeStep {
                    table,
                    critical,
                    deleted: done.rows_affected(),
                    error: None,
                });
            }
            Err(e) => {
                steps.push(PurgeStep {
                    table,
                    critical,
                    deleted: 0,
                    error: Some(e.to_string()),
                });
                if critical {
                    log::error!("purge {tournament_id}: {table} failed, aborting: {e}");
                    aborted_at = Some(table);
                    break;
                }
                log::warn!("purge {tournament_id}: {table} failed, continuing: {e}");
            }
        }
    }

    let success = aborted_at.is_none() && steps.iter().all(|s| s.error.is_none());
    if success {
        log::info!("Purged tournament {tournament_id}");
    }
    PurgeReport {
        tournament_id,
        steps,
        aborted_at,
        success,
    }
}
