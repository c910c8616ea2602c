//! Templates, block draws and live match generation.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::TournamentError;
use crate::logic::bracket::{Bracket, SlotChange};
use crate::logic::source::{is_block_name, SourceExpr};
use crate::models::{LiveMatch, MatchBlock, MatchPhase, MatchTemplate, Slot, TournamentId, TournamentStatus};

/// Check a full template set.
///
/// Codes are non-empty and unique, preliminary templates name a block, sources
/// parse and point at existing codes / preliminary blocks, fixed-team sources
/// are left to overrides, and winner/loser edges form no cycle.
pub fn validate_templates(templates: &[MatchTemplate]) -> Result<(), TournamentError> {
    let invalid = |msg: String| Err(TournamentError::InvalidTemplate(msg));

    let mut codes = HashSet::new();
    for t in templates {
        if t.match_code.trim().is_empty() || t.match_code.chars().any(char::is_whitespace) {
            return invalid(format!("bad match code {:?}", t.match_code));
        }
        if !codes.insert(t.match_code.as_str()) {
            return invalid(format!("duplicate match code {}", t.match_code));
        }
        if t.phase == MatchPhase::Preliminary && !t.block_name.as_deref().is_some_and(is_block_name) {
            return invalid(format!("{} is preliminary but has no valid block", t.match_code));
        }
    }
    let prelim_blocks: HashSet<&str> = templates
        .iter()
        .filter(|t| t.phase == MatchPhase::Preliminary)
        .filter_map(|t| t.block_name.as_deref())
        .collect();

    let mut edges: HashMap<&str, Vec<String>> = HashMap::new();
    for t in templates {
        for slot in Slot::BOTH {
            let expr: SourceExpr = t.source(slot).parse()?;
            match &expr {
                SourceExpr::MatchOutcome { match_code, .. } => {
                    if !codes.contains(match_code.as_str()) {
                        return invalid(format!("{} refers to unknown match {match_code}", t.match_code));
                    }
                    edges.entry(t.match_code.as_str()).or_default().push(match_code.clone());
                }
                SourceExpr::BlockRank { block, .. } => {
                    if !prelim_blocks.contains(block.as_str()) {
                        return invalid(format!("{} refers to unknown block {block}", t.match_code));
                    }
                    if t.phase == MatchPhase::Preliminary && t.block_name.as_deref() == Some(block.as_str()) {
                        return Err(TournamentError::DependencyCycle(t.match_code.clone()));
                    }
                }
                SourceExpr::Team(_) => {
                    return invalid(format!(
                        "{}: fixed team sources are only allowed in overrides",
                        t.match_code
                    ));
                }
                SourceExpr::BlockSeat { .. } => {}
            }
        }
    }

    // Depth-first search with an explicit path set.
    fn visit<'a>(
        code: &'a str,
        edges: &'a HashMap<&str, Vec<String>>,
        on_path: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), TournamentError> {
        if done.contains(code) {
            return Ok(());
        }
        if !on_path.insert(code) {
            return Err(TournamentError::DependencyCycle(code.to_string()));
        }
        for dep in edges.get(code).into_iter().flatten() {
            visit(dep, edges, on_path, done)?;
        }
        on_path.remove(code);
        done.insert(code);
        Ok(())
    }
    let mut on_path = HashSet::new();
    let mut done = HashSet::new();
    for t in templates {
        visit(&t.match_code, &edges, &mut on_path, &mut done)?;
    }
    Ok(())
}

/// Round robin over seats `{block}1..{block}n` using the circle method.
/// Codes are `{block}-1`, `{block}-2`, ... numbered from `first_number`.
pub fn round_robin_templates(
    tournament_id: TournamentId,
    block: &str,
    team_count: u32,
    first_number: u32,
) -> Result<Vec<MatchTemplate>, TournamentError> {
    if !is_block_name(block) {
        return Err(TournamentError::InvalidTemplate(format!("invalid block name {block:?}")));
    }
    if team_count < 2 {
        return Err(TournamentError::InvalidTemplate(
            "a round robin needs at least 2 teams".to_string(),
        ));
    }
    // Seat 0 is the bye when the count is odd.
    let mut seats: Vec<u32> = (1..=team_count).collect();
    if team_count % 2 == 1 {
        seats.push(0);
    }
    let n = seats.len();

    let mut templates = Vec::new();
    for round in 0..n - 1 {
        for i in 0..n / 2 {
            let (mut home, mut away) = (seats[i], seats[n - 1 - i]);
            if home == 0 || away == 0 {
                continue;
            }
            if i == 0 && round % 2 == 1 {
                std::mem::swap(&mut home, &mut away);
            }
            let k = templates.len() as u32 + 1;
            let mut t = MatchTemplate::new(
                tournament_id,
                format!("{block}-{k}"),
                MatchPhase::Preliminary,
                Some(block.to_string()),
                first_number + k - 1,
                format!("{block}{home}"),
                format!("{block}{away}"),
            );
            t.round_name = Some(format!("Round {}", round + 1));
            templates.push(t);
        }
        seats[1..].rotate_right(1);
    }
    Ok(templates)
}

/// Randomly seat active registrations into the given blocks, dealing them
/// out in turn so block sizes differ by at most one. Withdrawn teams are
/// unseated.
pub fn draw_blocks<R: Rng + ?Sized>(
    bracket: &mut Bracket,
    block_names: &[String],
    rng: &mut R,
) -> Result<Vec<SlotChange>, TournamentError> {
    if block_names.is_empty() {
        return Err(TournamentError::NoBlocks);
    }
    if let Some(bad) = block_names.iter().find(|n| !is_block_name(n)) {
        return Err(TournamentError::InvalidTemplate(format!("invalid block name {bad:?}")));
    }
    if bracket.has_results() {
        return Err(TournamentError::DrawLocked);
    }

    let mut order: Vec<usize> = (0..bracket.teams.len())
        .filter(|&i| !bracket.teams[i].is_withdrawn())
        .collect();
    order.shuffle(rng);

    for team in &mut bracket.teams {
        team.assign_block(None, None);
    }
    for (n, &i) in order.iter().enumerate() {
        let block = &block_names[n % block_names.len()];
        let position = (n / block_names.len()) as u32 + 1;
        bracket.teams[i].assign_block(Some(block.clone()), Some(position));
    }
    log::info!(
        "Drew {} team(s) into {} block(s)",
        order.len(),
        block_names.len()
    );
    if bracket.matches.is_empty() {
        return Ok(Vec::new());
    }
    bracket.recalculate_all_standings();
    bracket.refresh_slots()
}

/// Create blocks and one live match per template, then resolve every slot.
pub fn generate_matches(bracket: &mut Bracket) -> Result<Vec<SlotChange>, TournamentError> {
    if !bracket.matches.is_empty() {
        return Err(TournamentError::MatchesAlreadyGenerated);
    }
    if bracket.templates.is_empty() {
        return Err(TournamentError::NoTemplates);
    }
    if bracket.tournament.status == TournamentStatus::Completed {
        return Err(TournamentError::InvalidState("tournament is completed"));
    }
    validate_templates(&bracket.templates)?;

    let mut templates = bracket.templates.clone();
    templates.sort_by(|a, b| {
        a.match_number
            .cmp(&b.match_number)
            .then_with(|| a.match_code.cmp(&b.match_code))
    });

    let tournament_id = bracket.tournament.id;
    let mut blocks: Vec<MatchBlock> = Vec::new();
    let mut matches = Vec::with_capacity(templates.len());
    for t in &templates {
        let block_id = match &t.block_name {
            Some(name) => {
                let existing = blocks.iter().find(|b| b.name == *name && b.phase == t.phase);
                Some(match existing {
                    Some(b) => b.id,
                    None => {
                        let b = MatchBlock::new(tournament_id, name.clone(), t.phase, blocks.len() as u32);
                        let id = b.id;
                        blocks.push(b);
                        id
                    }
                })
            }
            None => None,
        };
        matches.push(LiveMatch::from_template(t, block_id));
    }

    bracket.blocks = blocks;
    bracket.matches = matches;
    bracket.recalculate_all_standings();
    if bracket.tournament.status < TournamentStatus::Ongoing {
        bracket.tournament.status = TournamentStatus::Ongoing;
        bracket.tournament.touch();
    }
    log::info!(
        "Generated {} match(es) in {} block(s) for {}",
        bracket.matches.len(),
        bracket.blocks.len(),
        bracket.tournament.name
    );
    bracket.refresh_slots()
}
