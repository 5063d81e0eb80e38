use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed classification taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ScoreLabel {
    Engage,
    #[default]
    Maybe,
    Rage,
}

impl ScoreLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Engage => "engage",
            ScoreLabel::Maybe => "maybe",
            ScoreLabel::Rage => "rage",
        }
    }

    /// Exact wire decoding. Anything that is not `engage` or `rage` is `maybe`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "engage" => ScoreLabel::Engage,
            "rage" => ScoreLabel::Rage,
            _ => ScoreLabel::Maybe,
        }
    }
}

impl From<String> for ScoreLabel {
    fn from(value: String) -> Self {
        ScoreLabel::from_wire(&value)
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub label: ScoreLabel,
    /// Unparsed model reply, kept for diagnostics only.
    pub raw_output: String,
    pub scored_at: DateTime<Utc>,
}

/// Badge status of a single identity element, read back from its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeState {
    pub level: ScoreLabel,
    pub attached: bool,
}
