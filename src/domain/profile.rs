use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Upper bound on the number of posts carried through the pipeline.
pub const MAX_RECENT_POSTS: usize = 3;

/// Best-effort view of a profile header. Every field is raw page text and any
/// of them may be missing on a partially rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub joined: Option<String>,
    #[serde(default)]
    pub following: Option<String>,
    #[serde(default)]
    pub followers: Option<String>,
    #[serde(default)]
    pub relationship_note: Option<String>,
}

impl ProfileSnapshot {
    /// A snapshot without a display name is not worth scoring.
    pub fn is_usable(&self) -> bool {
        self.display_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Recent posts in page order (most recent first), never more than
/// [`MAX_RECENT_POSTS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PostSnapshot>", into = "Vec<PostSnapshot>")]
pub struct PostList(Vec<PostSnapshot>);

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a post; returns `false` once the list is already full.
    pub fn push(&mut self, post: PostSnapshot) -> bool {
        if self.is_full() {
            return false;
        }
        self.0.push(post);
        true
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_RECENT_POSTS
    }
}

impl Deref for PostList {
    type Target = [PostSnapshot];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<PostSnapshot> for PostList {
    fn from_iter<I: IntoIterator<Item = PostSnapshot>>(iter: I) -> Self {
        Self(iter.into_iter().take(MAX_RECENT_POSTS).collect())
    }
}

impl From<Vec<PostSnapshot>> for PostList {
    fn from(posts: Vec<PostSnapshot>) -> Self {
        posts.into_iter().collect()
    }
}

impl From<PostList> for Vec<PostSnapshot> {
    fn from(list: PostList) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> PostSnapshot {
        PostSnapshot {
            text: text.to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn post_list_keeps_first_three_in_order() {
        let list: PostList = ["a", "b", "c", "d", "e"].into_iter().map(post).collect();
        let texts: Vec<_> = list.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn push_refuses_past_capacity() {
        let mut list = PostList::new();
        assert!(list.push(post("1")));
        assert!(list.push(post("2")));
        assert!(list.push(post("3")));
        assert!(!list.push(post("4")));
        assert_eq!(list.len(), MAX_RECENT_POSTS);
    }

    #[test]
    fn inbound_payload_is_capped() {
        let raw = serde_json::json!([
            {"text": "1", "timestamp": "2024-01-05T00:00:00Z"},
            {"text": "2", "timestamp": ""},
            {"text": "3"},
            {"text": "4", "timestamp": ""}
        ]);
        let list: PostList = serde_json::from_value(raw).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].timestamp, "");
    }

    #[test]
    fn profile_uses_camel_case_keys() {
        let profile = ProfileSnapshot {
            display_name: Some("Jane Doe".into()),
            relationship_note: Some("Follows you".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["displayName"], "Jane Doe");
        assert_eq!(value["relationshipNote"], "Follows you");
        assert!(value["bio"].is_null());
    }

    #[test]
    fn profile_without_display_name_is_not_usable() {
        assert!(!ProfileSnapshot::default().is_usable());
        let empty_name = ProfileSnapshot {
            display_name: Some(String::new()),
            ..Default::default()
        };
        assert!(!empty_name.is_usable());
    }
}
