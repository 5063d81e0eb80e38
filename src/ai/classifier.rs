use chrono::Utc;

use crate::domain::{PostList, ProfileSnapshot, ScoreResult};

use super::{client::CompletionClient, error::CompletionError, label::normalize, prompt::build_prompt};

/// Prompt builder, completion call and label normalizer wired together.
pub struct ClassifierService {
    client: CompletionClient,
}

impl ClassifierService {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    pub async fn score_profile(
        &self,
        profile: Option<&ProfileSnapshot>,
        posts: &PostList,
    ) -> Result<ScoreResult, CompletionError> {
        let messages = build_prompt(profile, posts);
        let raw_output = self.client.complete(&messages).await?;
        let label = normalize(&raw_output);

        let result = ScoreResult {
            label,
            raw_output,
            scored_at: Utc::now(),
        };
        tracing::debug!(
            target: "ai",
            label = %result.label,
            raw = %result.raw_output,
            scored_at = %result.scored_at.to_rfc3339(),
            "profile scored"
        );
        Ok(result)
    }
}
