use sqlx::SqlitePool;

use crate::database::{hobby_repo, user_repo};
use crate::errors::MatchError;

// Builds the embedding input sentence for a user's current hobby set.
// Names are sorted so the same set always yields the same text, whatever
// order the assignment rows come back in.
pub async fn build_hobby_text(pool: &SqlitePool, user_id: i64) -> Result<String, MatchError> {
    if user_repo::load_match_profile(pool, user_id).await?.is_none() {
        return Err(MatchError::UserNotFound);
    }

    let mut names: Vec<String> = hobby_repo::list_user_hobby_names(pool, user_id)
        .await?
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        return Ok(String::new());
    }

    names.sort();
    Ok(format_hobby_sentence(&names))
}

fn format_hobby_sentence(names: &[String]) -> String {
    format!("Hobbies: {}.", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_joins_names_with_commas() {
        let names = vec!["hiking".to_string(), "painting".to_string()];
        assert_eq!(format_hobby_sentence(&names), "Hobbies: hiking, painting.");
    }

    #[test]
    fn sentence_keeps_diacritics() {
        let names = vec!["varenie".to_string(), "čítanie".to_string()];
        assert_eq!(format_hobby_sentence(&names), "Hobbies: varenie, čítanie.");
    }
}
