//! Database round trips against an in-memory SQLite pool.

use chrono::{NaiveTime, Utc};
use sqlx::SqlitePool;
use tournament_manager::db::{self, bracket, teams, tournaments};
use tournament_manager::logic::{round_robin_templates, schedule_match};
use tournament_manager::models::{Player, TournamentGroup};
use tournament_manager::{
    confirm_match, generate_matches, record_score, set_override, Bracket, LiveMatchStatus,
    ScoreEntry, Slot, Team, Tournament, TournamentId, TournamentStatus, TournamentTeam,
};

/// A tournament with one block of four seated teams and its round robin stored.
async fn seeded(pool: &SqlitePool) -> TournamentId {
    let mut conn = pool.acquire().await.unwrap();
    let mut tournament = Tournament::new("Autumn League").unwrap();
    tournament.scoring.win_points = 2;
    tournaments::insert(&mut *conn, &tournament).await.unwrap();
    for (i, name) in ["Otters", "Pumas", "Quails", "Ravens"].iter().enumerate() {
        let team = Team::new(name).unwrap();
        teams::insert_team(&mut *conn, &team).await.unwrap();
        let mut registration = TournamentTeam::new(tournament.id, &team);
        registration.assign_block(Some("A".into()), Some(i as u32 + 1));
        teams::insert_registration(&mut *conn, &registration).await.unwrap();
        let player = Player::new(registration.id, &format!("{name} captain"), Some(10)).unwrap();
        teams::insert_player(&mut *conn, &player).await.unwrap();
    }
    let templates = round_robin_templates(tournament.id, "A", 4, 1).unwrap();
    bracket::insert_templates(&mut *conn, &templates).await.unwrap();
    tournament.id
}

async fn generated(pool: &SqlitePool) -> TournamentId {
    let id = seeded(pool).await;
    let mut tx = pool.begin().await.unwrap();
    let mut b = bracket::load(&mut *tx, id).await.unwrap().unwrap();
    generate_matches(&mut b).unwrap();
    bracket::insert_blocks(&mut *tx, &b.blocks).await.unwrap();
    bracket::insert_live_matches(&mut *tx, &b.matches).await.unwrap();
    bracket::save_progress(&mut *tx, &b).await.unwrap();
    tx.commit().await.unwrap();
    id
}

async fn load(pool: &SqlitePool, id: TournamentId) -> Bracket {
    let mut conn = pool.acquire().await.unwrap();
    bracket::load(&mut *conn, id).await.unwrap().unwrap()
}

#[tokio::test]
async fn tournament_round_trip() {
    let pool = db::connect_in_memory().await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let group = TournamentGroup::new("Regional Cup", Some("All divisions".into())).unwrap();
    tournaments::insert_group(&mut *conn, &group).await.unwrap();

    let mut t = Tournament::new("U12").unwrap();
    t.group_id = Some(group.id);
    t.venue = Some("North Park".into());
    t.event_date = chrono::NaiveDate::from_ymd_opt(2026, 5, 9);
    tournaments::insert(&mut *conn, &t).await.unwrap();

    let stored = tournaments::get(&mut *conn, t.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "U12");
    assert_eq!(stored.venue.as_deref(), Some("North Park"));
    assert_eq!(stored.event_date, t.event_date);
    assert_eq!(stored.status, TournamentStatus::Planning);
    assert_eq!(stored.scoring, t.scoring);

    assert!(tournaments::list(&mut *conn, true).await.unwrap().is_empty());
    t.set_published(true);
    tournaments::update(&mut *conn, &t).await.unwrap();
    assert_eq!(tournaments::list(&mut *conn, true).await.unwrap().len(), 1);

    assert!(tournaments::delete_group(&mut *conn, group.id).await.unwrap());
    let detached = tournaments::get(&mut *conn, t.id).await.unwrap().unwrap();
    assert_eq!(detached.group_id, None);
    assert!(!tournaments::delete_group(&mut *conn, group.id).await.unwrap());
}

#[tokio::test]
async fn duplicate_registration_is_rejected_by_the_schema() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = seeded(&pool).await;
    let mut conn = pool.acquire().await.unwrap();
    let existing = teams::list_registrations(&mut *conn, id).await.unwrap();
    assert_eq!(existing.len(), 4);
    let team = teams::get_team(&mut *conn, existing[0].team_id).await.unwrap().unwrap();
    let again = TournamentTeam::new(id, &team);
    let err = teams::insert_registration(&mut *conn, &again).await.unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(ref e) if e.is_unique_violation()));
}

#[tokio::test]
async fn generated_bracket_survives_a_reload() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = generated(&pool).await;
    let b = load(&pool, id).await;

    assert_eq!(b.tournament.status, TournamentStatus::Ongoing);
    assert_eq!(b.teams.len(), 4);
    assert_eq!(b.templates.len(), 6);
    assert_eq!(b.matches.len(), 6);
    assert_eq!(b.blocks.len(), 1);
    assert_eq!(b.standings.len(), 4);
    assert!(b.matches.iter().all(|m| m.team1_id.is_some() && m.team2_id.is_some()));
    assert_eq!(b.matches[0].match_code, "A-1");
}

#[tokio::test]
async fn confirmation_is_persisted_once() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = generated(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let mut b = bracket::load(&mut *tx, id).await.unwrap().unwrap();
    let match_id = b.matches[0].id;
    schedule_match(&mut b, match_id, Some(2), NaiveTime::from_hms_opt(10, 30, 0)).unwrap();
    let entry = ScoreEntry {
        team1_score: 3,
        team2_score: 1,
        finished: true,
        ..Default::default()
    };
    record_score(&mut b, match_id, &entry).unwrap();
    let confirmation = confirm_match(&mut b, match_id, Utc::now()).unwrap();
    bracket::insert_final_match(&mut *tx, &confirmation.result).await.unwrap();
    bracket::save_progress(&mut *tx, &b).await.unwrap();
    tx.commit().await.unwrap();

    let reloaded = load(&pool, id).await;
    let m = reloaded.match_by_code("A-1").unwrap();
    assert_eq!(m.status, LiveMatchStatus::Confirmed);
    assert_eq!(m.court_number, Some(2));
    assert_eq!(m.start_time, NaiveTime::from_hms_opt(10, 30, 0));
    assert_eq!(reloaded.results.len(), 1);
    assert_eq!(reloaded.results[0].winner_id, m.team1_id);
    let winner = reloaded
        .standings
        .iter()
        .find(|s| Some(s.tournament_team_id) == m.team1_id)
        .unwrap();
    assert_eq!((winner.points, winner.rank), (2, 1));

    let mut conn = pool.acquire().await.unwrap();
    let err = bracket::insert_final_match(&mut *conn, &confirmation.result)
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(ref e) if e.is_unique_violation()));
}

#[tokio::test]
async fn overrides_are_replaced_on_save() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = generated(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let mut b = bracket::load(&mut *tx, id).await.unwrap().unwrap();
    set_override(&mut b, "A-1", Slot::Team1, "A2", Some("late arrival".into())).unwrap();
    bracket::save_progress(&mut *tx, &b).await.unwrap();
    tx.commit().await.unwrap();

    let reloaded = load(&pool, id).await;
    let o = reloaded.override_for("A-1").unwrap();
    assert_eq!(o.team1_source.as_deref(), Some("A2"));
    assert_eq!(o.team2_source, None);
    assert_eq!(o.reason.as_deref(), Some("late arrival"));
    assert_eq!(reloaded.match_by_code("A-1").unwrap().team1_display, "Pumas");
}

#[tokio::test]
async fn purge_removes_every_table() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = generated(&pool).await;
    let other = seeded(&pool).await;

    let report = db::purge::purge_tournament(&pool, id).await;
    assert!(report.success, "{report:?}");
    assert_eq!(report.aborted_at, None);
    assert_eq!(report.steps.len(), 9);
    assert!(report.tournament_deleted());
    let live = report.steps.iter().find(|s| s.table == "live_matches").unwrap();
    assert_eq!(live.deleted, 6);

    let mut conn = pool.acquire().await.unwrap();
    assert!(bracket::load(&mut *conn, id).await.unwrap().is_none());
    assert_eq!(teams::list_registrations(&mut *conn, other).await.unwrap().len(), 4);
    assert_eq!(teams::list_tournament_players(&mut *conn, other).await.unwrap().len(), 4);
}

#[tokio::test]
async fn purge_stops_at_a_failing_critical_step() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = generated(&pool).await;
    sqlx::query("DROP TABLE final_matches")
        .execute(&pool)
        .await
        .unwrap();

    let report = db::purge::purge_tournament(&pool, id).await;
    assert!(!report.success);
    assert_eq!(report.aborted_at, Some("final_matches"));
    assert_eq!(report.steps.len(), 3);
    assert!(report.steps[2].error.is_some());
    assert!(!report.tournament_deleted());
}

#[tokio::test]
async fn duplicate_copies_setup_into_a_new_tournament() {
    let pool = db::connect_in_memory().await.unwrap();
    let id = generated(&pool).await;

    let copy = db::duplicate::duplicate(&pool, id, "Autumn League II", true)
        .await
        .unwrap();
    assert_eq!(copy.tournament.status, TournamentStatus::Planning);

    let b = load(&pool, copy.tournament.id).await;
    assert_eq!(b.tournament.name, "Autumn League II");
    assert_eq!(b.tournament.scoring.win_points, 2);
    assert_eq!(b.templates.len(), 6);
    assert!(b.matches.is_empty());
    assert_eq!(b.teams.len(), 4);
    assert!(b.teams.iter().all(|t| t.block_name.as_deref() == Some("A")));

    let mut conn = pool.acquire().await.unwrap();
    let players = teams::list_tournament_players(&mut *conn, copy.tournament.id)
        .await
        .unwrap();
    assert_eq!(players.len(), 4);
}
