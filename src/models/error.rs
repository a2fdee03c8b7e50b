use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable API error envelope.
///
/// The `error` field is a stable machine-readable kind; the description is
/// the human-readable part surfaced to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub error_description: Option<String>,
}

impl ApiError {
    pub fn new(error: &str, description: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            error_description: description.map(|s| s.to_string()),
        }
    }

    pub fn not_found(description: &str) -> Self {
        Self::new("not_found", Some(description))
    }

    pub fn invalid_request(description: &str) -> Self {
        Self::new("invalid_request", Some(description))
    }

    /// A fixed filesystem resource (e.g. the certificate template) is
    /// absent; there is no fallback for these.
    pub fn resource_missing(description: &str) -> Self {
        Self::new("resource_missing", Some(description))
    }

    pub fn server_error(description: &str) -> Self {
        Self::new("server_error", Some(description))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {:?}", self.error, self.error_description)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "invalid_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Provide a stable, non-leaky mapping for common constraint
        // violations (unique group names).
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code().unwrap_or_default();
            let msg = db_err.message();

            // Postgres unique violation: 23505.
            // SQLite constraint error codes vary by extended code; also
            // match by message.
            let is_unique = code == "23505"
                || code == "2067"
                || code == "1555"
                || msg.contains("UNIQUE constraint failed")
                || msg.contains("duplicate key");

            if is_unique {
                return Self::invalid_request("duplicate key");
            }
        }

        Self::server_error(&err.to_string())
    }
}
