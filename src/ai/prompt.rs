use crate::domain::{PostList, ProfileSnapshot};

use super::inference::ChatMessage;

pub const NO_POSTS_LINE: &str = "(No recent posts available.)";

const SYSTEM_PROMPT: &str = "You are an assistant that classifies social media accounts as ENGAGE (green), MAYBE (yellow), or RAGEBAIT (red).\n\
You must respond with exactly one of these words: ENGAGE, MAYBE, or RAGEBAIT. No other text.";

const INSTRUCTIONS: &[&str] = &[
    "Analyze the following X (Twitter) account and its last 3 posts, and decide whether it is likely to be:",
    "- ENGAGE (green): generally constructive, good‑faith, and non‑manipulative.",
    "- MAYBE (yellow): mixed content; some potentially manipulative or outrage‑bait, but not consistently.",
    "- RAGEBAIT (red): primarily outrage‑driven, manipulative, or designed to inflame emotions.",
    "",
    "Focus primarily on patterns in the 3 most recent posts, using the profile bio as supporting context:",
    "- Are they frequently insulting groups or individuals?",
    "- Do they exaggerate, catastrophize, or use sensational language?",
    "- Do they frame issues in a way that provokes anger or contempt more than understanding?",
    "- Do they encourage pile‑ons or harassment?",
];

const ANSWER_FORMAT: &[&str] = &[
    "Return exactly ONE of these words with no explanation and no extra characters:",
    "ENGAGE",
    "MAYBE",
    "RAGEBAIT",
];

/// Builds the two-message conversation sent to the completion endpoint.
///
/// Every profile field is always listed, with an empty value when absent, so
/// the model sees the same layout on every call.
pub fn build_prompt(profile: Option<&ProfileSnapshot>, posts: &PostList) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_content(profile, posts)),
    ]
}

fn user_content(profile: Option<&ProfileSnapshot>, posts: &PostList) -> String {
    let mut lines: Vec<String> = INSTRUCTIONS.iter().map(|line| line.to_string()).collect();

    lines.push(String::new());
    lines.push("Profile:".to_string());
    lines.extend(profile_lines(profile));

    lines.push(String::new());
    lines.push("Recent posts (up to 3, most recent first):".to_string());
    if posts.is_empty() {
        lines.push(NO_POSTS_LINE.to_string());
    } else {
        lines.extend(
            posts
                .iter()
                .enumerate()
                .map(|(index, post)| format!("{}. [{}] {}", index + 1, post.timestamp, post.text)),
        );
    }

    lines.push(String::new());
    lines.extend(ANSWER_FORMAT.iter().map(|line| line.to_string()));
    lines.join("\n")
}

fn profile_lines(profile: Option<&ProfileSnapshot>) -> Vec<String> {
    let empty = ProfileSnapshot::default();
    let p = profile.unwrap_or(&empty);
    let field = |value: &Option<String>| value.as_deref().unwrap_or("").to_string();

    vec![
        format!("Display name: {}", field(&p.display_name)),
        format!("Handle: {}", field(&p.handle)),
        format!("Bio: {}", field(&p.bio)),
        format!("Location: {}", field(&p.location)),
        format!("Joined: {}", field(&p.joined)),
        format!("Following: {}", field(&p.following)),
        format!("Followers: {}", field(&p.followers)),
        format!("Relationship note: {}", field(&p.relationship_note)),
    ]
}
