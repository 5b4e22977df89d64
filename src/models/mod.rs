pub mod match_candidate;
pub mod match_result;
pub mod user_embeddings;
pub mod users;

pub use match_candidate::MatchCandidateRow;
pub use match_result::MatchResult;
pub use user_embeddings::UserEmbeddingRow;
pub use users::UsersRow;
