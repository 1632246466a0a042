use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, AppError>;

/// Errors safe to surface to the client verbatim: the request itself was
/// malformed or violated a precondition the caller can fix.
#[derive(Debug)]
pub enum PublicError {
	InvalidCoords(String),
	InvalidSort(String),
	InvalidStatus(String),
	MissingName,
	MissingCoords,
	MissingDescriptionOrSummary,
	NotFound(String),
	NoSummary,
	WeakSummary,
	WeakTags,
	NoPhotos,
	StaleWrite,
	BadRequest(String),
	Unauthorized,
}

impl PublicError {
	fn code(&self) -> &'static str {
		match self {
			PublicError::InvalidCoords(_) => "INVALID_COORDS",
			PublicError::InvalidSort(_) => "INVALID_SORT",
			PublicError::InvalidStatus(_) => "INVALID_STATUS",
			PublicError::MissingName => "MISSING_NAME",
			PublicError::MissingCoords => "MISSING_COORDS",
			PublicError::MissingDescriptionOrSummary => "MISSING_DESCRIPTION_OR_SUMMARY",
			PublicError::NotFound(_) => "NOT_FOUND",
			PublicError::NoSummary => "NO_SUMMARY",
			PublicError::WeakSummary => "WEAK_SUMMARY",
			PublicError::WeakTags => "WEAK_TAGS",
			PublicError::NoPhotos => "NO_PHOTOS",
			PublicError::StaleWrite => "STALE_WRITE",
			PublicError::BadRequest(_) => "BAD_REQUEST",
			PublicError::Unauthorized => "UNAUTHORIZED",
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			PublicError::NotFound(_) => StatusCode::NOT_FOUND,
			PublicError::StaleWrite => StatusCode::CONFLICT,
			PublicError::Unauthorized => StatusCode::UNAUTHORIZED,
			_ => StatusCode::BAD_REQUEST,
		}
	}

	fn message(&self) -> String {
		match self {
			PublicError::InvalidCoords(m)
			| PublicError::InvalidSort(m)
			| PublicError::InvalidStatus(m)
			| PublicError::NotFound(m)
			| PublicError::BadRequest(m) => m.clone(),
			PublicError::MissingName => "name is required".to_string(),
			PublicError::MissingCoords => "lat and lon are required".to_string(),
			PublicError::MissingDescriptionOrSummary => {
				"one of description or summary is required".to_string()
			}
			PublicError::NoSummary => "venue has no summary".to_string(),
			PublicError::WeakSummary => "summary did not meet the quality bar".to_string(),
			PublicError::WeakTags => "tag set did not meet the quality bar".to_string(),
			PublicError::NoPhotos => "venue has no photos".to_string(),
			PublicError::StaleWrite => "the record changed since it was read".to_string(),
			PublicError::Unauthorized => "unauthorized".to_string(),
		}
	}
}

/// Errors that must never reach the client: upstream provider failures,
/// database failures, and invariant violations. Logged in full server-side;
/// the client only ever sees a generic 500.
#[derive(Debug)]
pub enum PrivateError {
	Db(sqlx::Error),
	ProviderError(String),
	Timeout(String),
	FatalInvariant(String),
	FatalConfig(String),
}

impl PrivateError {
	fn code(&self) -> &'static str {
		match self {
			PrivateError::Db(_) => "DB_ERROR",
			PrivateError::ProviderError(_) => "PROVIDER_ERROR",
			PrivateError::Timeout(_) => "TIMEOUT",
			PrivateError::FatalInvariant(_) => "FATAL_INVARIANT",
			PrivateError::FatalConfig(_) => "FATAL_CONFIG",
		}
	}
}

/// Transport-facing error. Every handler returns `ApiResult<T>`; this is
/// the single point where an internal failure is either exposed (public)
/// or swallowed behind a generic message (private), with two source
/// enums feeding one `IntoResponse` type.
#[derive(Debug)]
pub enum AppError {
	Public(PublicError),
	Private(PrivateError),
}

impl From<PublicError> for AppError {
	fn from(err: PublicError) -> Self {
		AppError::Public(err)
	}
}

impl From<PrivateError> for AppError {
	fn from(err: PrivateError) -> Self {
		AppError::Private(err)
	}
}

impl From<sqlx::Error> for AppError {
	fn from(err: sqlx::Error) -> Self {
		AppError::Private(PrivateError::Db(err))
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		match self {
			AppError::Public(err) => {
				let status = err.status();
				let body = json!({ "error": err.code(), "message": err.message() });
				(status, Json(body)).into_response()
			}
			AppError::Private(err) => {
				tracing::error!(code = err.code(), error = ?err, "internal error");
				let body = json!({ "error": "INTERNAL_ERROR", "message": "internal error" });
				(StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn public_not_found_maps_to_404() {
		let err = PublicError::NotFound("venue 1".to_string());
		assert_eq!(err.status(), StatusCode::NOT_FOUND);
		assert_eq!(err.code(), "NOT_FOUND");
	}

	#[test]
	fn public_stale_write_maps_to_409() {
		let err = PublicError::StaleWrite;
		assert_eq!(err.status(), StatusCode::CONFLICT);
	}

	#[test]
	fn db_error_converts_into_private_app_error() {
		let sqlx_err = sqlx::Error::RowNotFound;
		let app_err: AppError = sqlx_err.into();
		assert!(matches!(app_err, AppError::Private(PrivateError::Db(_))));
	}
}
