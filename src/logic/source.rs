//! Slot source expressions: `A1` (block seat), `A_1` (block rank),
//! `M3_winner` / `M3_loser` (match outcome) and `team:<id>` (fixed team).

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::TournamentError;
use crate::models::TournamentTeamId;

/// Which side of a confirmed match feeds the slot.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    Winner,
    Loser,
}

/// Parsed form of a template or override source.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SourceExpr {
    /// Team drawn into `block` at `position`.
    BlockSeat { block: String, position: u32 },
    /// Team finishing at `rank` once the whole block is confirmed.
    BlockRank { block: String, rank: u32 },
    MatchOutcome { match_code: String, outcome: Outcome },
    Team(TournamentTeamId),
}

impl SourceExpr {
    /// Match code this source waits on, if any.
    pub fn match_dependency(&self) -> Option<&str> {
        match self {
            SourceExpr::MatchOutcome { match_code, .. } => Some(match_code),
            _ => None,
        }
    }

    /// Block whose final table this source waits on, if any.
    pub fn block_dependency(&self) -> Option<&str> {
        match self {
            SourceExpr::BlockRank { block, .. } => Some(block),
            _ => None,
        }
    }

    /// Label shown in a slot while the source is unresolved.
    pub fn placeholder(&self) -> String {
        match self {
            SourceExpr::BlockSeat { block, position } => format!("{block}{position}"),
            SourceExpr::BlockRank { block, rank } => format!("Block {block} #{rank}"),
            SourceExpr::MatchOutcome {
                match_code,
                outcome: Outcome::Winner,
            } => format!("Winner {match_code}"),
            SourceExpr::MatchOutcome {
                match_code,
                outcome: Outcome::Loser,
            } => format!("Loser {match_code}"),
            SourceExpr::Team(_) => "TBD".to_string(),
        }
    }
}

/// Non-empty, letters only.
pub(crate) fn is_block_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

fn parse_positive(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|n| *n > 0)
}

impl FromStr for SourceExpr {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TournamentError::InvalidSource(s.to_string());

        if let Some(id) = s.strip_prefix("team:") {
            return Uuid::parse_str(id).map(SourceExpr::Team).map_err(|_| invalid());
        }

        if let Some((head, tail)) = s.rsplit_once('_') {
            if head.is_empty() || head.chars().any(char::is_whitespace) {
                return Err(invalid());
            }
            return match tail {
                "winner" => Ok(SourceExpr::MatchOutcome {
                    match_code: head.to_string(),
                    outcome: Outcome::Winner,
                }),
                "loser" => Ok(SourceExpr::MatchOutcome {
                    match_code: head.to_string(),
                    outcome: Outcome::Loser,
                }),
                digits => {
                    let rank = parse_positive(digits).ok_or_else(invalid)?;
                    if !is_block_name(head) {
                        return Err(invalid());
                    }
                    Ok(SourceExpr::BlockRank {
                        block: head.to_string(),
                        rank,
                    })
                }
            };
        }

        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (block, digits) = s.split_at(split);
        if !is_block_name(block) {
            return Err(invalid());
        }
        let position = parse_positive(digits).ok_or_else(invalid)?;
        Ok(SourceExpr::BlockSeat {
            block: block.to_string(),
            position,
        })
    }
}

impl fmt::Display for SourceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceExpr::BlockSeat { block, position } => write!(f, "{block}{position}"),
            SourceExpr::BlockRank { block, rank } => write!(f, "{block}_{rank}"),
            SourceExpr::MatchOutcome {
                match_code,
                outcome: Outcome::Winner,
            } => write!(f, "{match_code}_winner"),
            SourceExpr::MatchOutcome {
                match_code,
                outcome: Outcome::Loser,
            } => write!(f, "{match_code}_loser"),
            SourceExpr::Team(id) => write!(f, "team:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_form() {
        assert_eq!(
            "A1".parse::<SourceExpr>().unwrap(),
            SourceExpr::BlockSeat {
                block: "A".into(),
                position: 1
            }
        );
        assert_eq!(
            "B_2".parse::<SourceExpr>().unwrap(),
            SourceExpr::BlockRank {
                block: "B".into(),
                rank: 2
            }
        );
        assert_eq!(
            "M3_winner".parse::<SourceExpr>().unwrap(),
            SourceExpr::MatchOutcome {
                match_code: "M3".into(),
                outcome: Outcome::Winner
            }
        );
        assert_eq!(
            "A-4_loser".parse::<SourceExpr>().unwrap(),
            SourceExpr::MatchOutcome {
                match_code: "A-4".into(),
                outcome: Outcome::Loser
            }
        );
        let id = Uuid::new_v4();
        assert_eq!(
            format!("team:{id}").parse::<SourceExpr>().unwrap(),
            SourceExpr::Team(id)
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "A", "1", "A_0", "A0", "_winner", "A_first", "A 1_winner", "team:x", "1A_2"] {
            assert!(bad.parse::<SourceExpr>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn display_matches_input() {
        for text in ["A1", "C_3", "SF1_winner", "M10_loser"] {
            assert_eq!(text.parse::<SourceExpr>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn placeholders() {
        assert_eq!("A_1".parse::<SourceExpr>().unwrap().placeholder(), "Block A #1");
        assert_eq!("M3_loser".parse::<SourceExpr>().unwrap().placeholder(), "Loser M3");
    }
}
