//! CSV exports of published standings and results.

use serde::Serialize;

use crate::error::TournamentError;
use crate::logic::bracket::Bracket;

#[derive(Serialize)]
struct StandingRecord<'a> {
    block: &'a str,
    rank: u32,
    team: &'a str,
    played: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
    goal_difference: i64,
    points: u32,
    withdrawn: bool,
}

#[derive(Serialize)]
struct ResultRecord<'a> {
    match_code: &'a str,
    phase: &'a str,
    team1: &'a str,
    team2: &'a str,
    score: String,
    winner: &'a str,
    confirmed_at: String,
}

fn to_csv<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, TournamentError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| TournamentError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TournamentError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TournamentError::Export(e.to_string()))
}

/// All block tables, blocks in display order, rows by rank.
pub fn standings_csv(bracket: &Bracket) -> Result<String, TournamentError> {
    let mut blocks: Vec<_> = bracket.blocks.iter().collect();
    blocks.sort_by_key(|b| b.display_order);
    let records = blocks.into_iter().flat_map(|block| {
        bracket
            .block_table(block.id)
            .into_iter()
            .map(move |s| StandingRecord {
                block: &block.name,
                rank: s.rank,
                team: &s.team_name,
                played: s.played,
                wins: s.wins,
                draws: s.draws,
                losses: s.losses,
                goals_for: s.goals_for,
                goals_against: s.goals_against,
                goal_difference: s.goal_difference(),
                points: s.points,
                withdrawn: s.withdrawn,
            })
    });
    to_csv(records)
}

/// Confirmed results in schedule order.
pub fn results_csv(bracket: &Bracket) -> Result<String, TournamentError> {
    let name = |id| bracket.team(id).map_or("", |t| t.team_name.as_str());
    let mut matches: Vec<_> = bracket.matches.iter().filter(|m| m.is_confirmed()).collect();
    matches.sort_by_key(|m| m.match_number);
    let records = matches.into_iter().filter_map(|m| {
        let r = bracket.result_for(m.id)?;
        let score = match (r.team1_pk, r.team2_pk) {
            (Some(p1), Some(p2)) => format!("{}-{} ({}-{} PK)", r.team1_score, r.team2_score, p1, p2),
            _ => format!("{}-{}", r.team1_score, r.team2_score),
        };
        Some(ResultRecord {
            match_code: &r.match_code,
            phase: r.phase.as_str(),
            team1: name(r.team1_id),
            team2: name(r.team2_id),
            score,
            winner: r.winner_id.map_or("draw", name),
            confirmed_at: r.confirmed_at.to_rfc3339(),
        })
    });
    to_csv(records)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::logic::{confirm_match, generate_matches, record_score, round_robin_templates, ScoreEntry};
    use crate::models::{Team, Tournament, TournamentTeam};

    fn played_pair() -> Bracket {
        let tournament = Tournament::new("Cup").unwrap();
        let mut bracket = Bracket::new(tournament.clone());
        for (i, name) in ["Owls", "Hawks"].iter().enumerate() {
            let mut t = TournamentTeam::new(tournament.id, &Team::new(name).unwrap());
            t.assign_block(Some("A".into()), Some(i as u32 + 1));
            bracket.teams.push(t);
        }
        bracket.templates = round_robin_templates(tournament.id, "A", 2, 1).unwrap();
        generate_matches(&mut bracket).unwrap();
        let id = bracket.matches[0].id;
        let entry = ScoreEntry {
            team1_score: 3,
            team2_score: 1,
            finished: true,
            ..Default::default()
        };
        record_score(&mut bracket, id, &entry).unwrap();
        confirm_match(&mut bracket, id, Utc::now()).unwrap();
        bracket
    }

    #[test]
    fn standings_rows_follow_rank() {
        let csv = standings_csv(&played_pair()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "block,rank,team,played,wins,draws,losses,goals_for,goals_against,goal_difference,points,withdrawn"
        );
        assert_eq!(lines[1], "A,1,Owls,1,1,0,0,3,1,2,3,false");
        assert_eq!(lines[2], "A,2,Hawks,1,0,0,1,1,3,-2,0,false");
    }

    #[test]
    fn results_list_confirmed_matches_only() {
        let csv = results_csv(&played_pair()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("A-1,preliminary,Owls,Hawks,3-1,Owls,"));

        let empty = Bracket::new(Tournament::new("Empty").unwrap());
        assert_eq!(results_csv(&empty).unwrap(), "");
    }
}
