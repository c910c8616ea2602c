//! Data structures for tournaments: registrations, templates, matches, standings.

/// Stored text did not match any variant of a persisted enum.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Text round-trip (`as_str`, `Display`, `FromStr`) for enums stored as TEXT columns.
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(crate::models::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

mod matches;
mod player;
mod standing;
mod team;
mod template;
mod tournament;

pub use matches::{FinalMatch, LiveMatch, LiveMatchStatus, MatchBlock, MatchId, MatchOverride};
pub use player::{Player, PlayerId};
pub use standing::Standing;
pub use team::{Team, TeamId, TournamentTeam, TournamentTeamId, WithdrawalStatus};
pub use template::{MatchPhase, MatchTemplate, Slot};
pub use tournament::{
    GroupId, ScoringRules, Tournament, TournamentGroup, TournamentId, TournamentStatus,
};
