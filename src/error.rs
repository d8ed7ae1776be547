//! Error types for member queries

use thiserror::Error;

/// Errors that can occur while storing or searching members
#[derive(Debug, Error)]
pub enum MemberQueryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid search condition: {0}")]
    InvalidSearch(String),

    #[error("Unfiltered search rejected: {0}")]
    UnfilteredSearch(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl MemberQueryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_search(msg: impl Into<String>) -> Self {
        Self::InvalidSearch(msg.into())
    }

    pub fn member_not_found(msg: impl Into<String>) -> Self {
        Self::MemberNotFound(msg.into())
    }

    pub fn team_not_found(msg: impl Into<String>) -> Self {
        Self::TeamNotFound(msg.into())
    }
}

impl From<serde_urlencoded::de::Error> for MemberQueryError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        Self::InvalidSearch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MemberQueryError>;
