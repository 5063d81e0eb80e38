use serde::{Deserialize, Serialize};

use crate::domain::{PostList, ProfileSnapshot, ScoreLabel};

/// Every message that crosses a context boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    ScoreProfile {
        #[serde(default)]
        profile: Option<ProfileSnapshot>,
        #[serde(default)]
        posts: PostList,
    },
    GetProfileInfo,
    GetRecentPosts,
    SetProfileScore {
        #[serde(default)]
        level: ScoreLabel,
    },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::ScoreProfile { .. } => "score-profile",
            Request::GetProfileInfo => "get-profile-info",
            Request::GetRecentPosts => "get-recent-posts",
            Request::SetProfileScore { .. } => "set-profile-score",
        }
    }
}

/// `{ok: true, score}` or `{ok: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreReply {
    pub fn scored(label: ScoreLabel) -> Self {
        Self {
            ok: true,
            score: Some(label),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            score: None,
            error: Some(error.into()),
        }
    }

    /// A successful reply without a score still counts as `maybe`.
    pub fn into_result(self) -> Result<ScoreLabel, String> {
        if self.ok {
            Ok(self.score.unwrap_or_default())
        } else {
            Err(self.error.unwrap_or_else(|| "Unknown error".to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Score(ScoreReply),
    Profile { profile: Option<ProfileSnapshot> },
    Posts { posts: PostList },
    Ack { ok: bool },
    /// The receiving context does not serve this request type.
    Unhandled,
}
