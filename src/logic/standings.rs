//! Block standings: points table with tie-break ordering.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::models::{FinalMatch, MatchBlock, ScoringRules, Standing, TournamentTeam, TournamentTeamId};

fn points_for(goals_for: u32, goals_against: u32, rules: &ScoringRules) -> u32 {
    match goals_for.cmp(&goals_against) {
        std::cmp::Ordering::Greater => rules.win_points,
        std::cmp::Ordering::Equal => rules.draw_points,
        std::cmp::Ordering::Less => rules.loss_points,
    }
}

fn tally(row: &mut Standing, goals_for: u32, goals_against: u32, rules: &ScoringRules) {
    row.played += 1;
    row.goals_for += goals_for;
    row.goals_against += goals_against;
    match goals_for.cmp(&goals_against) {
        std::cmp::Ordering::Greater => row.wins += 1,
        std::cmp::Ordering::Equal => row.draws += 1,
        std::cmp::Ordering::Less => row.losses += 1,
    }
    row.points += points_for(goals_for, goals_against, rules);
}

/// Withdrawn last, then points, goal difference, goals for.
fn primary_key(row: &Standing) -> (bool, Reverse<u32>, Reverse<i64>, Reverse<u32>) {
    (
        row.withdrawn,
        Reverse(row.points),
        Reverse(row.goal_difference()),
        Reverse(row.goals_for),
    )
}

/// Order teams level on the primary key by a mini league of the games among them,
/// then by block seat, then by name.
fn break_tie(group: &mut [(Standing, u32)], results: &[&FinalMatch], rules: &ScoringRules) {
    let ids: HashSet<TournamentTeamId> = group.iter().map(|(s, _)| s.tournament_team_id).collect();
    let mut mini: HashMap<TournamentTeamId, (u32, i64)> = HashMap::new();
    for r in results
        .iter()
        .filter(|r| ids.contains(&r.team1_id) && ids.contains(&r.team2_id))
    {
        for (team, gf, ga) in [
            (r.team1_id, r.team1_score, r.team2_score),
            (r.team2_id, r.team2_score, r.team1_score),
        ] {
            let entry = mini.entry(team).or_default();
            entry.0 += points_for(gf, ga, rules);
            entry.1 += i64::from(gf) - i64::from(ga);
        }
    }
    group.sort_by(|(a, seat_a), (b, seat_b)| {
        let ma = mini.get(&a.tournament_team_id).copied().unwrap_or_default();
        let mb = mini.get(&b.tournament_team_id).copied().unwrap_or_default();
        mb.0.cmp(&ma.0)
            .then(mb.1.cmp(&ma.1))
            .then(seat_a.cmp(seat_b))
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
}

/// Compute the table for one block from its confirmed results.
///
/// Members are registrations whose `block_name` is the block's name; only
/// results tagged with the block's id count.
pub fn compute_block_standings(
    block: &MatchBlock,
    teams: &[TournamentTeam],
    results: &[FinalMatch],
    rules: &ScoringRules,
) -> Vec<Standing> {
    let block_results: Vec<&FinalMatch> = results
        .iter()
        .filter(|r| r.block_id == Some(block.id))
        .collect();

    let mut rows: Vec<(Standing, u32)> = teams
        .iter()
        .filter(|t| t.block_name.as_deref() == Some(block.name.as_str()))
        .map(|t| {
            let mut row = Standing {
                block_id: block.id,
                tournament_team_id: t.id,
                team_name: t.team_name.clone(),
                withdrawn: t.is_withdrawn(),
                ..Standing::default()
            };
            for r in &block_results {
                if let Some((gf, ga)) = r.goals_for(t.id) {
                    tally(&mut row, gf, ga, rules);
                }
            }
            (row, t.block_position.unwrap_or(u32::MAX))
        })
        .collect();

    rows.sort_by_key(|(row, _)| primary_key(row));

    let mut start = 0;
    while start < rows.len() {
        let key = primary_key(&rows[start].0);
        let mut end = start + 1;
        while end < rows.len() && primary_key(&rows[end].0) == key {
            end += 1;
        }
        if end - start > 1 {
            break_tie(&mut rows[start..end], &block_results, rules);
        }
        start = end;
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, (mut row, _))| {
            row.rank = (i + 1) as u32;
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchPhase, Team};
    use chrono::Utc;
    use uuid::Uuid;

    fn seat(block: &MatchBlock, name: &str, position: u32) -> TournamentTeam {
        let team = Team::new(name).unwrap();
        let mut r = TournamentTeam::new(block.tournament_id, &team);
        r.assign_block(Some(block.name.clone()), Some(position));
        r
    }

    fn result(block: &MatchBlock, a: &TournamentTeam, b: &TournamentTeam, sa: u32, sb: u32) -> FinalMatch {
        let (winner_id, loser_id) = match sa.cmp(&sb) {
            std::cmp::Ordering::Greater => (Some(a.id), Some(b.id)),
            std::cmp::Ordering::Less => (Some(b.id), Some(a.id)),
            std::cmp::Ordering::Equal => (None, None),
        };
        FinalMatch {
            live_match_id: Uuid::new_v4(),
            tournament_id: block.tournament_id,
            match_code: format!("{}-{}", a.team_name, b.team_name),
            phase: MatchPhase::Preliminary,
            block_id: Some(block.id),
            team1_id: a.id,
            team2_id: b.id,
            team1_score: sa,
            team2_score: sb,
            team1_pk: None,
            team2_pk: None,
            winner_id,
            loser_id,
            confirmed_at: Utc::now(),
        }
    }

    fn names(rows: &[Standing]) -> Vec<&str> {
        rows.iter().map(|r| r.team_name.as_str()).collect()
    }

    #[test]
    fn points_then_goal_difference() {
        let block = MatchBlock::new(Uuid::new_v4(), "A", MatchPhase::Preliminary, 0);
        let a = seat(&block, "Ants", 1);
        let b = seat(&block, "Bees", 2);
        let c = seat(&block, "Crows", 3);
        let results = vec![
            result(&block, &a, &b, 1, 0),
            result(&block, &c, &a, 3, 0),
            result(&block, &b, &c, 2, 0),
        ];
        let rows = compute_block_standings(&block, &[a, b, c], &results, &ScoringRules::default());
        // All on 3 points; GD: Crows +1, Bees +1, Ants -2; GF: Crows 3, Bees 2.
        assert_eq!(names(&rows), vec!["Crows", "Bees", "Ants"]);
        assert_eq!(rows[0].points, 3);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[2].goal_difference(), -2);
    }

    #[test]
    fn head_to_head_breaks_full_tie() {
        let block = MatchBlock::new(Uuid::new_v4(), "B", MatchPhase::Preliminary, 0);
        let a = seat(&block, "Ants", 1);
        let b = seat(&block, "Bees", 2);
        let c = seat(&block, "Crows", 3);
        let d = seat(&block, "Doves", 4);
        // Ants and Bees finish level on points, GD and GF; Bees won the meeting.
        let results = vec![
            result(&block, &a, &b, 0, 1),
            result(&block, &a, &c, 1, 0),
            result(&block, &b, &c, 0, 1),
            result(&block, &c, &d, 0, 0),
        ];
        let rows = compute_block_standings(&block, &[a, b, c, d], &results, &ScoringRules::default());
        let ants = rows.iter().find(|r| r.team_name == "Ants").unwrap();
        let bees = rows.iter().find(|r| r.team_name == "Bees").unwrap();
        assert_eq!((ants.points, ants.goal_difference(), ants.goals_for), (3, 0, 1));
        assert_eq!((bees.points, bees.goal_difference(), bees.goals_for), (3, 0, 1));
        assert_eq!(names(&rows), vec!["Crows", "Bees", "Ants", "Doves"]);
    }

    #[test]
    fn level_without_meeting_falls_back_to_seat() {
        let block = MatchBlock::new(Uuid::new_v4(), "C", MatchPhase::Preliminary, 0);
        let a = seat(&block, "Zebras", 1);
        let b = seat(&block, "Ants", 2);
        let rows = compute_block_standings(&block, &[b, a], &[], &ScoringRules::default());
        assert_eq!(names(&rows), vec!["Zebras", "Ants"]);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn withdrawn_team_is_ranked_last() {
        let block = MatchBlock::new(Uuid::new_v4(), "A", MatchPhase::Preliminary, 0);
        let mut a = seat(&block, "Ants", 1);
        let b = seat(&block, "Bees", 2);
        let results = vec![result(&block, &a, &b, 5, 0)];
        a.request_withdrawal(None).unwrap();
        a.approve_withdrawal().unwrap();
        let rows = compute_block_standings(&block, &[a, b], &results, &ScoringRules::default());
        assert_eq!(names(&rows), vec!["Bees", "Ants"]);
        assert!(rows[1].withdrawn);
        assert_eq!(rows[1].points, 3);
    }

    #[test]
    fn ignores_other_blocks_and_custom_points() {
        let block = MatchBlock::new(Uuid::new_v4(), "A", MatchPhase::Preliminary, 0);
        let other = MatchBlock::new(block.tournament_id, "B", MatchPhase::Preliminary, 1);
        let a = seat(&block, "Ants", 1);
        let b = seat(&block, "Bees", 2);
        let stray = result(&other, &a, &b, 3, 0);
        let draw = result(&block, &a, &b, 1, 1);
        let rules = ScoringRules {
            win_points: 2,
            draw_points: 1,
            loss_points: 0,
        };
        let rows = compute_block_standings(&block, &[a, b], &[stray, draw], &rules);
        assert!(rows.iter().all(|r| r.played == 1 && r.draws == 1 && r.points == 1));
    }
}
