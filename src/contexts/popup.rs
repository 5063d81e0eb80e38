use std::fmt;

use tokio::sync::watch;

use crate::{
    domain::{ProfileSnapshot, ScoreLabel},
    messaging::Endpoint,
    page::guard::is_supported_host,
};

use super::{
    background::request_profile_score,
    page::{request_profile_info, request_recent_posts, send_profile_score},
};

const TITLE: &str = "Detect Rage Bait";
const STATUS_ANALYZING: &str = "Analyzing profile…";
const STATUS_OPEN_PROFILE: &str = "Open an X profile page, then try again.";
const STATUS_UNREADABLE: &str = "Unable to read profile on this page.";

/// The tab the popup was opened over.
#[derive(Debug, Clone)]
pub struct ActiveTab {
    pub url: Option<String>,
    pub page: Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreState {
    Pending,
    Ready(ScoreLabel),
    Failed,
}

impl ScoreState {
    fn status_text(&self) -> &'static str {
        match self {
            ScoreState::Pending => "Analyzing account with AI…",
            ScoreState::Ready(_) => "Analysis complete.",
            ScoreState::Failed => "Unable to score this account.",
        }
    }

    fn pill_text(&self) -> &'static str {
        match self {
            ScoreState::Pending => "Analyzing account…",
            ScoreState::Ready(ScoreLabel::Engage) => "Engage (green)",
            ScoreState::Ready(ScoreLabel::Rage) => "Ragebait (red)",
            ScoreState::Ready(ScoreLabel::Maybe) => "Maybe (yellow)",
            ScoreState::Failed => "No score available.",
        }
    }
}

/// What the popup panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupView {
    Status(String),
    Profile {
        profile: ProfileSnapshot,
        score: ScoreState,
    },
}

impl PopupView {
    fn status(message: &str) -> Self {
        PopupView::Status(message.to_string())
    }

    /// Terminal views are the ones a run can end on.
    pub fn is_terminal(&self) -> bool {
        match self {
            PopupView::Status(message) => message != STATUS_ANALYZING,
            PopupView::Profile { score, .. } => *score != ScoreState::Pending,
        }
    }
}

impl fmt::Display for PopupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        let (profile, score) = match self {
            PopupView::Status(message) => return write!(f, "{message}"),
            PopupView::Profile { profile, score } => (profile, score),
        };

        writeln!(f, "{}", score.status_text())?;
        writeln!(f, "Account rating: {}", score.pill_text())?;

        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        write!(f, "{} {}", field(&profile.display_name), field(&profile.handle))?;
        if let Some(bio) = &profile.bio {
            write!(f, "\n{bio}")?;
        }

        let meta: Vec<&str> = [&profile.location, &profile.joined]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .collect();
        if !meta.is_empty() {
            write!(f, "\n{}", meta.join(" · "))?;
        }

        let mut stats = Vec::new();
        if let Some(following) = &profile.following {
            stats.push(format!("{following} Following"));
        }
        if let Some(followers) = &profile.followers {
            stats.push(format!("{followers} Followers"));
        }
        if !stats.is_empty() {
            write!(f, "\n{}", stats.join(" · "))?;
        }

        if let Some(note) = &profile.relationship_note {
            write!(f, "\n{note}")?;
        }
        Ok(())
    }
}

/// Drives one extract, score, display and propagate pass for the active tab.
/// Every intermediate view is published so a renderer can follow along.
pub struct PopupController {
    background: Endpoint,
    view: watch::Sender<PopupView>,
}

impl PopupController {
    pub fn new(background: Endpoint) -> (Self, watch::Receiver<PopupView>) {
        let (view, receiver) = watch::channel(PopupView::status(STATUS_ANALYZING));
        (Self { background, view }, receiver)
    }

    /// Always ends on a terminal view, which is also returned.
    pub async fn run(&self, tab: Option<&ActiveTab>) -> PopupView {
        self.render(PopupView::status(STATUS_ANALYZING));

        let Some((url, page)) = tab.and_then(|tab| Some((tab.url.as_deref()?, &tab.page))) else {
            tracing::info!(target: "popup", "no active tab to analyze");
            return self.render(PopupView::status(STATUS_OPEN_PROFILE));
        };
        if !is_supported_host(url) {
            tracing::info!(target: "popup", url, "active tab is not on a supported host");
            return self.render(PopupView::status(STATUS_OPEN_PROFILE));
        }

        let (profile, posts) = tokio::join!(request_profile_info(page), request_recent_posts(page));
        let (profile, posts) = match (profile, posts) {
            (Ok(profile), Ok(posts)) => (profile, posts),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(target: "popup", error = %err, "error reading the page");
                return self.render(PopupView::status(STATUS_UNREADABLE));
            }
        };
        tracing::debug!(target: "popup", ?profile, posts = posts.len(), "page data received");

        let Some(profile) = profile.filter(ProfileSnapshot::is_usable) else {
            return self.render(PopupView::status(STATUS_OPEN_PROFILE));
        };

        self.render(PopupView::Profile {
            profile: profile.clone(),
            score: ScoreState::Pending,
        });

        let reply = request_profile_score(&self.background, Some(profile.clone()), posts).await;
        let level = match reply.into_result() {
            Ok(level) => level,
            Err(error) => {
                tracing::warn!(target: "popup", %error, "scoring failed");
                return self.render(PopupView::Profile {
                    profile,
                    score: ScoreState::Failed,
                });
            }
        };

        let view = self.render(PopupView::Profile {
            profile,
            score: ScoreState::Ready(level),
        });

        if let Err(err) = send_profile_score(page, level).await {
            tracing::warn!(target: "popup", error = %err, "error sending score to the page");
        }
        view
    }

    fn render(&self, view: PopupView) -> PopupView {
        self.view.send_replace(view.clone());
        view
    }
}
