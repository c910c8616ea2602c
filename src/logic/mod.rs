//! Tournament business logic: sources, standings, progression, overrides, scheduling.

mod bracket;
mod duplicate;
mod export;
mod overrides;
mod progression;
mod registration;
mod schedule;
mod source;
mod standings;

pub use bracket::{Bracket, Resolution, SlotChange};
pub use duplicate::{duplicate_tournament, TournamentCopy};
pub use export::{results_csv, standings_csv};
pub use overrides::{clear_override, set_override};
pub use progression::{
    confirm_match, record_score, schedule_match, unconfirm_match, Confirmation, ScoreEntry,
    Unconfirmation,
};
pub use registration::{
    add_player, apply_withdrawal, assign_block_seat, ensure_can_unregister, register_team,
    WithdrawalAction,
};
pub use schedule::{draw_blocks, generate_matches, round_robin_templates, validate_templates};
pub use source::{Outcome, SourceExpr};
pub use standings::compute_block_standings;
