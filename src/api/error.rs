use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

use crate::modules::friend::schema::RequestStatus;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: Cow<'static, str>,
    pub status: u16,
}

impl Error {
    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = match self {
            Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::BadRequest(msg)
            | Error::Forbidden(msg) => msg.clone(),
            Error::InternalServer => "Internal Server Error".into(),
        };

        HttpResponse::build(status).json(ErrorBody { error, status: status.as_u16() })
    }
}

/// Why a relation or uniqueness rule rejected an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    SelfTarget,
    AlreadyFriends,
    DuplicateRequest,
    InvalidState(RequestStatus),
    LoginTaken,
    Serialization,
    Duplicate(Option<DbErrorMeta>),
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictReason::SelfTarget => f.write_str("Can't target yourself"),
            ConflictReason::AlreadyFriends => f.write_str("Users are already friends"),
            ConflictReason::DuplicateRequest => {
                f.write_str("There's already a pending friend request between these users")
            }
            ConflictReason::InvalidState(status) => {
                write!(f, "Friend request is already {status} and can't change anymore")
            }
            ConflictReason::LoginTaken => f.write_str("Login is already taken"),
            ConflictReason::Serialization => {
                f.write_str("Concurrent modification detected, please retry")
            }
            ConflictReason::Duplicate(meta) => f.write_str(&conflict_message(meta)),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // jwt errors
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration Error: {0}")]
    Config(Cow<'static, str>),
    // Custom Errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Database Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(ConflictReason),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> String {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };

    let field = constraint.trim_end_matches("_key").split('_').next_back().unwrap_or("value");

    let mut chars = field.chars();
    let field = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Value".to_string(),
    };

    format!("{field} already exists")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Unauthorized(msg) => Error::Unauthorized(msg),
            SystemError::Forbidden(msg) => Error::Forbidden(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Conflict(reason) => Error::Conflict(reason.to_string().into()),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

/// Maps a violated constraint name onto the conflict the application-level
/// pre-checks would have reported for the same situation.
fn unique_violation(meta: DbErrorMeta) -> SystemError {
    let reason = match meta.constraint.as_deref() {
        Some("friend_requests_pending_pair_key") => ConflictReason::DuplicateRequest,
        Some("friendships_pkey") => ConflictReason::AlreadyFriends,
        Some("users_login_key") => ConflictReason::LoginTaken,
        _ => ConflictReason::Duplicate(Some(meta)),
    };
    SystemError::Conflict(reason)
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let meta = DbErrorMeta {
                code: db_err.code().map(|s| s.to_string()),
                constraint: db_err.constraint().map(|s| s.to_string()),
                message: db_err.message().to_string(),
            };
            match meta.code.as_deref() {
                Some("23505") => return unique_violation(meta),
                Some("23514")
                    if meta.constraint.as_deref().is_some_and(|c| c.ends_with("_not_self")) =>
                {
                    return SystemError::Conflict(ConflictReason::SelfTarget);
                }
                Some("23503") => {
                    log::debug!("Foreign key violation: {:?}", meta);
                    return SystemError::NotFound("Referenced user not found".into());
                }
                Some("40001") | Some("40P01") => {
                    log::warn!("Transaction aborted by concurrent update: {}", meta.message);
                    return SystemError::Conflict(ConflictReason::Serialization);
                }
                _ => {
                    log::error!("Unhandled DB error: {:?}", db_err);
                    return SystemError::DatabaseError(meta.message.into());
                }
            }
        }
        log::error!("{:?}", err);
        SystemError::InternalError(Box::new(err))
    }
}

impl From<validator::ValidationErrors> for SystemError {
    fn from(err: validator::ValidationErrors) -> Self {
        SystemError::BadRequest(err.to_string().into())
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(reason: ConflictReason) -> Self {
        Self::Conflict(reason)
    }

    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the error is a conflict for the given reason.
    pub fn is_conflict(&self, reason: &ConflictReason) -> bool {
        matches!(self, SystemError::Conflict(r) if r == reason)
    }
}
