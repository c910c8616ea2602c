//! JSON envelopes and the error type returned by every handler.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::db::duplicate::DuplicateError;
use crate::error::TournamentError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),
    #[error("database error")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<DuplicateError> for AppError {
    fn from(e: DuplicateError) -> Self {
        match e {
            DuplicateError::Tournament(e) => AppError::Tournament(e),
            DuplicateError::Db(e) => AppError::Db(e),
        }
    }
}

/// Constraint violations surface as conflicts rather than 500s.
fn is_constraint_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation() || db.is_foreign_key_violation(),
        _ => false,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Tournament(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Tournament(e) if e.is_conflict() => StatusCode::CONFLICT,
            AppError::Tournament(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(e) if is_constraint_violation(e) => StatusCode::CONFLICT,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = match self {
            AppError::Db(e) if status == StatusCode::CONFLICT => {
                log::warn!("Constraint violation: {e}");
                "Conflicts with existing data".to_string()
            }
            AppError::Db(e) => {
                log::error!("Database error: {e}");
                self.to_string()
            }
            other => {
                log::warn!("{status}: {other}");
                other.to_string()
            }
        };
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error,
        })
    }
}

#[derive(Serialize)]
struct Success<T> {
    success: bool,
    data: T,
}

pub type ApiResult = Result<HttpResponse, AppError>;

/// 200 with `{ success: true, data }`.
pub fn ok<T: Serialize>(data: T) -> ApiResult {
    Ok(HttpResponse::Ok().json(Success { success: true, data }))
}

/// 201 with `{ success: true, data }`.
pub fn created<T: Serialize>(data: T) -> ApiResult {
    Ok(HttpResponse::Created().json(Success { success: true, data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (TournamentError::TournamentNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (TournamentError::MatchCodeNotFound("M1".into()), StatusCode::NOT_FOUND),
            (TournamentError::AlreadyConfirmed, StatusCode::CONFLICT),
            (TournamentError::DownstreamConfirmed("F1".into()), StatusCode::CONFLICT),
            (TournamentError::DrawNotAllowed, StatusCode::BAD_REQUEST),
            (TournamentError::InvalidSource("??".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
        assert_eq!(
            AppError::Db(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
