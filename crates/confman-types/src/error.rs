//! Error taxonomy shared by the service, the adapters and the HTTP layer.
//!
//! Every variant maps to exactly one HTTP status. Variants that describe server-side
//! failures never carry store or library text into the response body.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type CmResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Client input is malformed. The reason names the field and the violated constraint.
	ValidationError(String),
	/// An identifier is not structurally valid for the store
	InvalidIdentifier(Box<str>),
	NotFound(String),
	/// Duplicate record or lost optimistic update
	Conflict(String),
	Unauthorized,
	PermissionDenied,
	/// The document store cannot be reached (transient, safe to retry)
	StoreUnavailable,
	/// Unclassified store failure. Logged by the adapter, opaque to the caller.
	DbError,
	Internal(String),
	Parse,
}

impl Error {
	fn status(&self) -> StatusCode {
		match self {
			Error::ValidationError(_) | Error::InvalidIdentifier(_) | Error::Parse => {
				StatusCode::BAD_REQUEST
			}
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::Conflict(_) => StatusCode::CONFLICT,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
			Error::DbError | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn code(&self) -> &'static str {
		match self {
			Error::ValidationError(_) => "E-VALIDATION",
			Error::InvalidIdentifier(_) => "E-INVALID-ID",
			Error::Parse => "E-PARSE",
			Error::NotFound(_) => "E-NOT-FOUND",
			Error::Conflict(_) => "E-CONFLICT",
			Error::Unauthorized => "E-UNAUTHORIZED",
			Error::PermissionDenied => "E-PERMISSION-DENIED",
			Error::StoreUnavailable => "E-STORE-UNAVAILABLE",
			Error::DbError | Error::Internal(_) => "E-INTERNAL",
		}
	}

	/// Message that is safe to return to the caller
	fn public_message(&self) -> String {
		match self {
			Error::ValidationError(msg) | Error::NotFound(msg) | Error::Conflict(msg) => msg.clone(),
			Error::InvalidIdentifier(id) => format!("Invalid identifier '{}'", id),
			Error::Parse => "Malformed request".into(),
			Error::Unauthorized => "Invalid credentials".into(),
			Error::PermissionDenied => "Permission denied".into(),
			Error::StoreUnavailable => {
				"Database connection failed. Please try again later.".into()
			}
			Error::DbError | Error::Internal(_) => "Internal server error".into(),
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::InvalidIdentifier(id) => write!(f, "invalid identifier: {}", id),
			Error::NotFound(msg) => write!(f, "not found: {}", msg),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::StoreUnavailable => write!(f, "store unavailable"),
			Error::DbError => write!(f, "database error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Parse => write!(f, "parse error"),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Internal(format!("io: {}", err))
	}
}

impl From<serde_json::Error> for Error {
	fn from(_err: serde_json::Error) -> Self {
		Self::Parse
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!("{}", self);
		}
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": self.public_message(),
			}
		});

		(status, Json(body)).into_response()
	}
}


// vim: ts=4
