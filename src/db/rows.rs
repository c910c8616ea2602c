//! Row types as stored in SQLite and their conversion into domain models.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{
    FinalMatch, LiveMatch, MatchBlock, MatchOverride, MatchTemplate, Player, ScoringRules,
    Standing, Team, Tournament, TournamentGroup, TournamentTeam, UnknownVariant,
};

fn decode_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

fn to_u32(v: i64) -> Result<u32, sqlx::Error> {
    u32::try_from(v).map_err(decode_err)
}

fn opt_u32(v: Option<i64>) -> Result<Option<u32>, sqlx::Error> {
    v.map(to_u32).transpose()
}

fn parse<T: FromStr<Err = UnknownVariant>>(s: &str) -> Result<T, sqlx::Error> {
    s.parse().map_err(decode_err)
}

#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<GroupRow> for TournamentGroup {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TournamentRow {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    pub name: String,
    pub venue: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub status: String,
    pub win_points: i64,
    pub draw_points: i64,
    pub loss_points: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TournamentRow> for Tournament {
    type Error = sqlx::Error;

    fn try_from(row: TournamentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            venue: row.venue,
            event_date: row.event_date,
            status: parse(&row.status)?,
            scoring: ScoringRules {
                win_points: to_u32(row.win_points)?,
                draw_points: to_u32(row.draw_points)?,
                loss_points: to_u32(row.loss_points)?,
            },
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub short_name: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            short_name: row.short_name,
            contact_email: row.contact_email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TournamentTeamRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub team_name: String,
    pub block_name: Option<String>,
    pub block_position: Option<i64>,
    pub withdrawal: String,
    pub withdrawal_reason: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl TryFrom<TournamentTeamRow> for TournamentTeam {
    type Error = sqlx::Error;

    fn try_from(row: TournamentTeamRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tournament_id: row.tournament_id,
            team_id: row.team_id,
            team_name: row.team_name,
            block_name: row.block_name,
            block_position: opt_u32(row.block_position)?,
            withdrawal: parse(&row.withdrawal)?,
            withdrawal_reason: row.withdrawal_reason,
            registered_at: row.registered_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    pub id: Uuid,
    pub tournament_team_id: Uuid,
    pub name: String,
    pub jersey_number: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = sqlx::Error;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tournament_team_id: row.tournament_team_id,
            name: row.name,
            jersey_number: opt_u32(row.jersey_number)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub match_code: String,
    pub phase: String,
    pub block_name: Option<String>,
    pub round_name: Option<String>,
    pub match_number: i64,
    pub team1_source: String,
    pub team2_source: String,
}

impl TryFrom<TemplateRow> for MatchTemplate {
    type Error = sqlx::Error;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tournament_id: row.tournament_id,
            match_code: row.match_code,
            phase: parse(&row.phase)?,
            block_name: row.block_name,
            round_name: row.round_name,
            match_number: to_u32(row.match_number)?,
            team1_source: row.team1_source,
            team2_source: row.team2_source,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BlockRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub name: String,
    pub phase: String,
    pub display_order: i64,
}

impl TryFrom<BlockRow> for MatchBlock {
    type Error = sqlx::Error;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tournament_id: row.tournament_id,
            name: row.name,
            phase: parse(&row.phase)?,
            display_order: to_u32(row.display_order)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LiveMatchRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub template_id: Uuid,
    pub match_code: String,
    pub phase: String,
    pub block_id: Option<Uuid>,
    pub match_number: i64,
    pub team1_id: Option<Uuid>,
    pub team2_id: Option<Uuid>,
    pub team1_display: String,
    pub team2_display: String,
    pub court_number: Option<i64>,
    pub start_time: Option<NaiveTime>,
    pub team1_score: Option<i64>,
    pub team2_score: Option<i64>,
    pub team1_pk: Option<i64>,
    pub team2_pk: Option<i64>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LiveMatchRow> for LiveMatch {
    type Error = sqlx::Error;

    fn try_from(row: LiveMatchRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tournament_id: row.tournament_id,
            template_id: row.template_id,
            match_code: row.match_code,
            phase: parse(&row.phase)?,
            block_id: row.block_id,
            match_number: to_u32(row.match_number)?,
            team1_id: row.team1_id,
            team2_id: row.team2_id,
            team1_display: row.team1_display,
            team2_display: row.team2_display,
            court_number: opt_u32(row.court_number)?,
            start_time: row.start_time,
            team1_score: opt_u32(row.team1_score)?,
            team2_score: opt_u32(row.team2_score)?,
            team1_pk: opt_u32(row.team1_pk)?,
            team2_pk: opt_u32(row.team2_pk)?,
            status: parse(&row.status)?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FinalMatchRow {
    pub live_match_id: Uuid,
    pub tournament_id: Uuid,
    pub match_code: String,
    pub phase: String,
    pub block_id: Option<Uuid>,
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    pub team1_score: i64,
    pub team2_score: i64,
    pub team1_pk: Option<i64>,
    pub team2_pk: Option<i64>,
    pub winner_id: Option<Uuid>,
    pub loser_id: Option<Uuid>,
    pub confirmed_at: DateTime<Utc>,
}

impl TryFrom<FinalMatchRow> for FinalMatch {
    type Error = sqlx::Error;

    fn try_from(row: FinalMatchRow) -> Result<Self, Self::Error> {
        Ok(Self {
            live_match_id: row.live_match_id,
            tournament_id: row.tournament_id,
            match_code: row.match_code,
            phase: parse(&row.phase)?,
            block_id: row.block_id,
            team1_id: row.team1_id,
            team2_id: row.team2_id,
            team1_score: to_u32(row.team1_score)?,
            team2_score: to_u32(row.team2_score)?,
            team1_pk: opt_u32(row.team1_pk)?,
            team2_pk: opt_u32(row.team2_pk)?,
            winner_id: row.winner_id,
            loser_id: row.loser_id,
            confirmed_at: row.confirmed_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OverrideRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub match_code: String,
    pub team1_source: Option<String>,
    pub team2_source: Option<String>,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<OverrideRow> for MatchOverride {
    fn from(row: OverrideRow) -> Self {
        Self {
            id: row.id,
            tournament_id: row.tournament_id,
            match_code: row.match_code,
            team1_source: row.team1_source,
            team2_source: row.team2_source,
            reason: row.reason,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StandingRow {
    pub block_id: Uuid,
    pub tournament_team_id: Uuid,
    pub team_name: String,
    pub rank: i64,
    pub played: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub points: i64,
    pub withdrawn: bool,
}

impl TryFrom<StandingRow> for Standing {
    type Error = sqlx::Error;

    fn try_from(row: StandingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            block_id: row.block_id,
            tournament_team_id: row.tournament_team_id,
            team_name: row.team_name,
            rank: to_u32(row.rank)?,
            played: to_u32(row.played)?,
            wins: to_u32(row.wins)?,
            draws: to_u32(row.draws)?,
            losses: to_u32(row.losses)?,
            goals_for: to_u32(row.goals_for)?,
            goals_against: to_u32(row.goals_against)?,
            points: to_u32(row.points)?,
            withdrawn: row.withdrawn,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one.
pub fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, sqlx::Error>
where
    T: TryFrom<R, Error = sqlx::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}
