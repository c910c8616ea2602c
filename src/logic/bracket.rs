//! The bracket aggregate: everything progression needs about one tournament,
//! loaded once per request and written back after mutation.

use serde::Serialize;
use uuid::Uuid;

use crate::error::TournamentError;
use crate::logic::source::{Outcome, SourceExpr};
use crate::logic::standings::compute_block_standings;
use crate::models::{
    FinalMatch, LiveMatch, LiveMatchStatus, MatchBlock, MatchId, MatchOverride, MatchPhase,
    MatchTemplate, Slot, Standing, Tournament, TournamentTeam, TournamentTeamId,
};

/// Where a slot source currently points.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    Resolved(TournamentTeamId),
    /// Depends on results not confirmed yet.
    Pending,
}

/// A slot whose team or label changed during a refresh.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SlotChange {
    pub match_id: MatchId,
    pub match_code: String,
    pub slot: Slot,
    pub team_id: Option<TournamentTeamId>,
    pub display: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Bracket {
    pub tournament: Tournament,
    pub teams: Vec<TournamentTeam>,
    pub blocks: Vec<MatchBlock>,
    pub templates: Vec<MatchTemplate>,
    pub matches: Vec<LiveMatch>,
    pub results: Vec<FinalMatch>,
    pub overrides: Vec<MatchOverride>,
    pub standings: Vec<Standing>,
}

impl Bracket {
    pub fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            teams: Vec::new(),
            blocks: Vec::new(),
            templates: Vec::new(),
            matches: Vec::new(),
            results: Vec::new(),
            overrides: Vec::new(),
            standings: Vec::new(),
        }
    }

    pub fn team(&self, id: TournamentTeamId) -> Option<&TournamentTeam> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TournamentTeamId) -> Result<&mut TournamentTeam, TournamentError> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TeamNotFound(id))
    }

    pub fn match_index(&self, id: MatchId) -> Result<usize, TournamentError> {
        self.matches
            .iter()
            .position(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn match_by_code(&self, code: &str) -> Option<&LiveMatch> {
        self.matches.iter().find(|m| m.match_code == code)
    }

    pub fn template_by_code(&self, code: &str) -> Option<&MatchTemplate> {
        self.templates.iter().find(|t| t.match_code == code)
    }

    pub fn result_for(&self, match_id: MatchId) -> Option<&FinalMatch> {
        self.results.iter().find(|r| r.live_match_id == match_id)
    }

    pub fn override_for(&self, code: &str) -> Option<&MatchOverride> {
        self.overrides.iter().find(|o| o.match_code == code)
    }

    /// Preliminary block by name (the only blocks with standings).
    pub fn standings_block(&self, name: &str) -> Option<&MatchBlock> {
        self.blocks
            .iter()
            .find(|b| b.name == name && b.phase == MatchPhase::Preliminary)
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// Source text for a slot: the override if one is set, else the template's.
    pub fn effective_source(&self, code: &str, slot: Slot) -> Result<&str, TournamentError> {
        if let Some(source) = self.override_for(code).and_then(|o| o.source(slot)) {
            return Ok(source);
        }
        self.template_by_code(code)
            .map(|t| t.source(slot))
            .ok_or_else(|| TournamentError::MatchCodeNotFound(code.to_string()))
    }

    pub fn effective_expr(&self, code: &str, slot: Slot) -> Result<SourceExpr, TournamentError> {
        self.effective_source(code, slot)?.parse()
    }

    /// Every match of the block is confirmed (and there is at least one).
    pub fn is_block_complete(&self, block_id: Uuid) -> bool {
        let mut in_block = self.matches.iter().filter(|m| m.block_id == Some(block_id)).peekable();
        in_block.peek().is_some() && in_block.all(LiveMatch::is_confirmed)
    }

    pub fn all_confirmed(&self) -> bool {
        !self.matches.is_empty() && self.matches.iter().all(LiveMatch::is_confirmed)
    }

    /// Rows of one block ordered by rank.
    pub fn block_table(&self, block_id: Uuid) -> Vec<&Standing> {
        let mut rows: Vec<&Standing> = self.standings.iter().filter(|s| s.block_id == block_id).collect();
        rows.sort_by_key(|s| s.rank);
        rows
    }

    pub fn resolve(&self, expr: &SourceExpr) -> Result<Resolution, TournamentError> {
        match expr {
            SourceExpr::BlockSeat { block, position } => Ok(self
                .teams
                .iter()
                .find(|t| t.is_seated_at(block, *position))
                .map_or(Resolution::Pending, |t| Resolution::Resolved(t.id))),
            SourceExpr::BlockRank { block, rank } => {
                let block = self
                    .standings_block(block)
                    .ok_or_else(|| TournamentError::BlockNotFound(block.clone()))?;
                if !self.is_block_complete(block.id) {
                    return Ok(Resolution::Pending);
                }
                Ok(self
                    .standings
                    .iter()
                    .find(|s| s.block_id == block.id && s.rank == *rank)
                    .map_or(Resolution::Pending, |s| Resolution::Resolved(s.tournament_team_id)))
            }
            SourceExpr::MatchOutcome { match_code, outcome } => {
                let m = self
                    .match_by_code(match_code)
                    .ok_or_else(|| TournamentError::MatchCodeNotFound(match_code.clone()))?;
                let team = self.result_for(m.id).and_then(|r| match outcome {
                    Outcome::Winner => r.winner_id,
                    Outcome::Loser => r.loser_id,
                });
                Ok(team.map_or(Resolution::Pending, Resolution::Resolved))
            }
            SourceExpr::Team(id) => self
                .team(*id)
                .map(|t| Resolution::Resolved(t.id))
                .ok_or(TournamentError::TeamNotFound(*id)),
        }
    }

    /// Recompute both slots of every unconfirmed match from its effective source.
    ///
    /// Sources only depend on confirmed results, so one pass is enough. A slot
    /// whose team changes loses any score entered against the old pairing.
    pub fn refresh_slots(&mut self) -> Result<Vec<SlotChange>, TournamentError> {
        let mut updates = Vec::new();
        for (idx, m) in self.matches.iter().enumerate() {
            if m.is_confirmed() {
                continue;
            }
            for slot in Slot::BOTH {
                let expr = self.effective_expr(&m.match_code, slot)?;
                let (team, display) = match self.resolve(&expr)? {
                    Resolution::Resolved(id) => (
                        Some(id),
                        self.team(id).map(|t| t.team_name.clone()).unwrap_or_default(),
                    ),
                    Resolution::Pending => (None, expr.placeholder()),
                };
                if m.team(slot) != team || m.display(slot) != display {
                    updates.push((idx, slot, team, display));
                }
            }
        }

        let mut changes = Vec::with_capacity(updates.len());
        for (idx, slot, team, display) in updates {
            let m = &mut self.matches[idx];
            if m.team(slot) != team && m.status != LiveMatchStatus::Scheduled {
                log::info!("{}: pairing changed, clearing entered score", m.match_code);
                m.clear_scores();
                m.status = LiveMatchStatus::Scheduled;
            }
            m.set_slot(slot, team, display.clone());
            m.updated_at = chrono::Utc::now();
            changes.push(SlotChange {
                match_id: m.id,
                match_code: m.match_code.clone(),
                slot,
                team_id: team,
                display,
            });
        }
        Ok(changes)
    }

    /// Replace the stored table of one preliminary block.
    pub fn recalculate_standings(&mut self, block_id: Uuid) {
        let Some(block) = self
            .blocks
            .iter()
            .find(|b| b.id == block_id && b.phase == MatchPhase::Preliminary)
        else {
            return;
        };
        let rows = compute_block_standings(block, &self.teams, &self.results, &self.tournament.scoring);
        self.standings.retain(|s| s.block_id != block_id);
        self.standings.extend(rows);
    }

    pub fn recalculate_all_standings(&mut self) {
        let ids: Vec<Uuid> = self
            .blocks
            .iter()
            .filter(|b| b.phase == MatchPhase::Preliminary)
            .map(|b| b.id)
            .collect();
        for id in ids {
            self.recalculate_standings(id);
        }
    }
}
