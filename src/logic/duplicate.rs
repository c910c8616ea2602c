//! Copy a tournament's configuration into a fresh tournament.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::TournamentError;
use crate::models::{
    MatchTemplate, Player, Tournament, TournamentStatus, TournamentTeam, WithdrawalStatus,
};

/// Everything written for a duplicated tournament.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentCopy {
    pub tournament: Tournament,
    pub templates: Vec<MatchTemplate>,
    pub teams: Vec<TournamentTeam>,
    pub players: Vec<Player>,
}

/// Build a Planning-state copy with new ids. Results, live matches and
/// overrides stay behind; registrations (minus withdrawn teams) and their
/// rosters come along when `include_teams` is set.
pub fn duplicate_tournament(
    source: &Tournament,
    templates: &[MatchTemplate],
    teams: &[TournamentTeam],
    players: &[Player],
    new_name: &str,
    include_teams: bool,
) -> Result<TournamentCopy, TournamentError> {
    let mut tournament = Tournament::new(new_name)?;
    tournament.group_id = source.group_id;
    tournament.venue = source.venue.clone();
    tournament.event_date = source.event_date;
    tournament.scoring = source.scoring;
    tournament.status = TournamentStatus::Planning;

    let templates = templates
        .iter()
        .map(|t| MatchTemplate {
            id: Uuid::new_v4(),
            tournament_id: tournament.id,
            ..t.clone()
        })
        .collect();

    let mut copied_teams = Vec::new();
    let mut copied_players = Vec::new();
    if include_teams {
        let mut id_map = HashMap::new();
        let now = Utc::now();
        for team in teams.iter().filter(|t| !t.is_withdrawn()) {
            let copy = TournamentTeam {
                id: Uuid::new_v4(),
                tournament_id: tournament.id,
                withdrawal: WithdrawalStatus::Active,
                withdrawal_reason: None,
                registered_at: now,
                ..team.clone()
            };
            id_map.insert(team.id, copy.id);
            copied_teams.push(copy);
        }
        copied_players = players
            .iter()
            .filter_map(|p| {
                let tournament_team_id = *id_map.get(&p.tournament_team_id)?;
                Some(Player {
                    id: Uuid::new_v4(),
                    tournament_team_id,
                    created_at: now,
                    ..p.clone()
                })
            })
            .collect();
    }

    Ok(TournamentCopy {
        tournament,
        templates,
        teams: copied_teams,
        players: copied_players,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::round_robin_templates;
    use crate::models::Team;

    #[test]
    fn copies_configuration_with_fresh_ids() {
        let mut source = Tournament::new("Cup 2025").unwrap();
        source.scoring.win_points = 2;
        source.advance_status(TournamentStatus::Completed).unwrap();
        let templates = round_robin_templates(source.id, "A", 3, 1).unwrap();

        let active = TournamentTeam::new(source.id, &Team::new("Owls").unwrap());
        let mut gone = TournamentTeam::new(source.id, &Team::new("Hawks").unwrap());
        gone.request_withdrawal(None).unwrap();
        gone.approve_withdrawal().unwrap();
        let players = vec![
            Player::new(active.id, "Kim", Some(9)).unwrap(),
            Player::new(gone.id, "Lee", Some(4)).unwrap(),
        ];

        let copy = duplicate_tournament(
            &source,
            &templates,
            &[active.clone(), gone],
            &players,
            "Cup 2026",
            true,
        )
        .unwrap();

        assert_ne!(copy.tournament.id, source.id);
        assert_eq!(copy.tournament.status, TournamentStatus::Planning);
        assert_eq!(copy.tournament.scoring.win_points, 2);
        assert!(!copy.tournament.is_public);
        assert_eq!(copy.templates.len(), templates.len());
        assert!(copy.templates.iter().all(|t| t.tournament_id == copy.tournament.id));
        assert_eq!(copy.templates[0].team1_source, templates[0].team1_source);
        assert_eq!(copy.teams.len(), 1);
        assert_ne!(copy.teams[0].id, active.id);
        assert_eq!(copy.players.len(), 1);
        assert_eq!(copy.players[0].tournament_team_id, copy.teams[0].id);
    }

    #[test]
    fn teams_are_optional() {
        let source = Tournament::new("Cup").unwrap();
        let team = TournamentTeam::new(source.id, &Team::new("Owls").unwrap());
        let copy = duplicate_tournament(&source, &[], &[team], &[], "Copy", false).unwrap();
        assert!(copy.teams.is_empty());
        assert!(duplicate_tournament(&source, &[], &[], &[], "", false).is_err());
    }
}
