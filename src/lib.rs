//! Tournament manager: library with models, progression logic, storage and HTTP routes.

pub mod config;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;
pub mod routes;

pub use error::TournamentError;
pub use logic::{
    clear_override, confirm_match, draw_blocks, generate_matches, record_score, set_override,
    unconfirm_match, Bracket, Confirmation, ScoreEntry, SlotChange, SourceExpr,
};
pub use models::{
    FinalMatch, LiveMatch, LiveMatchStatus, MatchBlock, MatchOverride, MatchPhase, MatchTemplate,
    Player, Slot, Standing, Team, Tournament, TournamentId, TournamentStatus, TournamentTeam,
};
