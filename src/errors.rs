use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    UserNotFound,
    Database(sqlx::Error),
    Embedding(anyhow::Error),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::UserNotFound => write!(f, "User not found"),
            MatchError::Database(e) => write!(f, "Database error: {}", e),
            MatchError::Embedding(e) => write!(f, "Embedding backend error: {}", e),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<sqlx::Error> for MatchError {
    fn from(err: sqlx::Error) -> Self {
        MatchError::Database(err)
    }
}
