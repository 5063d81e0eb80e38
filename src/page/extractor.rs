//! Profile and post scraping against the host markup.
//!
//! The host page is versioned by a third party; every lookup here is allowed
//! to come back empty and no single missing node fails the extraction.

use crate::domain::{MAX_RECENT_POSTS, PostList, PostSnapshot, ProfileSnapshot};

use super::{
    guard::is_profile_page,
    tree::{AttrMatch, DocumentTree, NodeId, Selector},
};

pub const USER_NAME: Selector =
    Selector::new(Some("div"), &[AttrMatch::Equals("data-testid", "User-Name")]);
const USER_DESCRIPTION: Selector = Selector::new(
    Some("div"),
    &[AttrMatch::Equals("data-testid", "UserDescription")],
);
const USER_LOCATION: Selector =
    Selector::new(Some("span"), &[AttrMatch::Equals("data-testid", "UserLocation")]);
const USER_JOIN_DATE: Selector =
    Selector::new(Some("span"), &[AttrMatch::Equals("data-testid", "UserJoinDate")]);
const FOLLOWING_LINK: Selector = Selector::new(
    Some("a"),
    &[
        AttrMatch::EndsWith("href", "/following"),
        AttrMatch::Equals("role", "link"),
    ],
);
const FOLLOWERS_LINK: Selector = Selector::new(
    Some("a"),
    &[
        AttrMatch::EndsWith("href", "/followers"),
        AttrMatch::Equals("role", "link"),
    ],
);
const POST_ARTICLE: Selector =
    Selector::new(Some("article"), &[AttrMatch::Equals("data-testid", "tweet")]);
const POST_TEXT: Selector =
    Selector::new(Some("div"), &[AttrMatch::Equals("data-testid", "tweetText")]);
const SPAN: Selector = Selector::tag("span");
const TIME: Selector = Selector::tag("time");

const RELATIONSHIP_PHRASES: &[&str] = &["Follows you", "Not followed by anyone you’re following"];

/// Guard-gated access to one page: off-profile locations yield empty results
/// instead of partial scrapes.
pub struct PageExtractor<'a, D: DocumentTree + ?Sized> {
    doc: &'a D,
    location: &'a str,
}

impl<'a, D: DocumentTree + ?Sized> PageExtractor<'a, D> {
    pub fn new(doc: &'a D, location: &'a str) -> Self {
        Self { doc, location }
    }

    pub fn profile_info(&self) -> Option<ProfileSnapshot> {
        if !is_profile_page(self.location) {
            tracing::debug!(target: "page", location = %self.location, "not a profile page, skipping profile extraction");
            return None;
        }
        Some(extract_profile(self.doc))
    }

    pub fn recent_posts(&self) -> PostList {
        if !is_profile_page(self.location) {
            tracing::debug!(target: "page", location = %self.location, "not a profile page, skipping post extraction");
            return PostList::new();
        }
        extract_recent_posts(self.doc, MAX_RECENT_POSTS)
    }
}

fn non_empty_text<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<String> {
    let text = doc.text_content(node);
    (!text.is_empty()).then_some(text)
}

fn text_of<D: DocumentTree + ?Sized>(doc: &D, selector: Selector) -> Option<String> {
    doc.select_first(doc.root(), selector)
        .and_then(|node| non_empty_text(doc, node))
}

fn link_count<D: DocumentTree + ?Sized>(doc: &D, link: Selector) -> Option<String> {
    let link = doc.select_first(doc.root(), link)?;
    let span = doc.select_first(link, SPAN)?;
    non_empty_text(doc, span)
}

pub fn extract_profile<D: DocumentTree + ?Sized>(doc: &D) -> ProfileSnapshot {
    let mut profile = ProfileSnapshot::default();

    if let Some(user_name) = doc.select_first(doc.root(), USER_NAME) {
        let spans = doc.select_all(user_name, SPAN);
        profile.display_name = spans.first().and_then(|span| non_empty_text(doc, *span));
        profile.handle = spans
            .iter()
            .find(|span| doc.text_content(**span).trim().starts_with('@'))
            .and_then(|span| non_empty_text(doc, *span));
    } else {
        tracing::debug!(target: "page", "identity container not found");
    }

    profile.bio = text_of(doc, USER_DESCRIPTION);
    profile.location = text_of(doc, USER_LOCATION);
    profile.joined = text_of(doc, USER_JOIN_DATE);
    profile.following = link_count(doc, FOLLOWING_LINK);
    profile.followers = link_count(doc, FOLLOWERS_LINK);
    profile.relationship_note = doc
        .select(doc.root(), SPAN)
        .find(|span| RELATIONSHIP_PHRASES.contains(&doc.text_content(*span).trim()))
        .and_then(|span| non_empty_text(doc, span));

    tracing::debug!(target: "page", ?profile, "extracted profile info");
    profile
}

/// Collects up to `limit` non-empty posts in document order, stopping as
/// soon as the limit is reached.
pub fn extract_recent_posts<D: DocumentTree + ?Sized>(doc: &D, limit: usize) -> PostList {
    let limit = limit.min(MAX_RECENT_POSTS);
    let mut posts = PostList::new();
    if limit == 0 {
        return posts;
    }
    let mut scanned = 0usize;

    for article in doc.select(doc.root(), POST_ARTICLE) {
        scanned += 1;

        let text = doc
            .select_first(article, POST_TEXT)
            .map(|node| doc.text_content(node))
            .unwrap_or_default();
        if text.trim().is_empty() {
            continue;
        }
        let timestamp = doc
            .select_first(article, TIME)
            .and_then(|node| doc.attribute(node, "datetime"))
            .unwrap_or_default();

        posts.push(PostSnapshot { text, timestamp });
        if posts.len() >= limit {
            break;
        }
    }

    tracing::debug!(target: "page", scanned, collected = posts.len(), "extracted recent posts");
    posts
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use crate::page::memory::{MemoryDocument, SnapshotNode};

    use super::*;

    fn doc(body: serde_json::Value) -> MemoryDocument {
        let snapshot: SnapshotNode =
            serde_json::from_value(json!({"tag": "body", "children": body})).unwrap();
        MemoryDocument::from_snapshot(&snapshot)
    }

    fn article(text: Option<&str>, datetime: Option<&str>) -> serde_json::Value {
        let mut children = Vec::new();
        if let Some(datetime) = datetime {
            children.push(json!({"tag": "time", "attrs": {"datetime": datetime}, "children": ["1h"]}));
        }
        if let Some(text) = text {
            children.push(json!({"tag": "div", "attrs": {"data-testid": "tweetText"}, "children": [
                {"tag": "span", "children": [text]}
            ]}));
        }
        json!({"tag": "article", "attrs": {"data-testid": "tweet"}, "children": children})
    }

    fn full_profile() -> MemoryDocument {
        doc(json!([
            {"tag": "div", "attrs": {"data-testid": "User-Name"}, "children": [
                {"tag": "div", "children": [{"tag": "span", "children": ["Jane Doe"]}]},
                {"tag": "div", "children": [{"tag": "span", "children": [" @jane"]}]}
            ]},
            {"tag": "div", "attrs": {"data-testid": "UserDescription"}, "children": [
                {"tag": "span", "children": ["Writer. "]},
                {"tag": "span", "children": ["Opinions mine."]}
            ]},
            {"tag": "span", "attrs": {"data-testid": "UserLocation"}, "children": ["Lisbon"]},
            {"tag": "span", "attrs": {"data-testid": "UserJoinDate"}, "children": ["Joined March 2011"]},
            {"tag": "a", "attrs": {"href": "/jane/following", "role": "link"}, "children": [
                {"tag": "span", "children": ["512"]}, " Following"
            ]},
            {"tag": "a", "attrs": {"href": "/jane/followers", "role": "link"}, "children": [
                {"tag": "span", "children": ["12.4K"]}, " Followers"
            ]},
            {"tag": "span", "children": ["Follows you"]}
        ]))
    }

    #[test]
    fn extracts_every_profile_field() {
        let profile = extract_profile(&full_profile());
        assert_eq!(
            profile,
            ProfileSnapshot {
                display_name: Some("Jane Doe".into()),
                handle: Some(" @jane".into()),
                bio: Some("Writer. Opinions mine.".into()),
                location: Some("Lisbon".into()),
                joined: Some("Joined March 2011".into()),
                following: Some("512".into()),
                followers: Some("12.4K".into()),
                relationship_note: Some("Follows you".into()),
            }
        );
    }

    #[test]
    fn missing_pieces_degrade_independently() {
        let page = doc(json!([
            {"tag": "span", "attrs": {"data-testid": "UserLocation"}, "children": ["Lisbon"]},
            {"tag": "a", "attrs": {"href": "/jane/followers"}, "children": [
                {"tag": "span", "children": ["10"]}
            ]},
            {"tag": "a", "attrs": {"href": "/jane/following", "role": "link"}}
        ]));
        let profile = extract_profile(&page);
        assert_eq!(profile.location.as_deref(), Some("Lisbon"));
        assert!(profile.display_name.is_none());
        assert!(profile.handle.is_none());
        // link without role="link" is not a follower counter
        assert!(profile.followers.is_none());
        assert!(profile.following.is_none());
        assert!(profile.relationship_note.is_none());
    }

    #[test]
    fn handle_requires_at_prefix() {
        let page = doc(json!([
            {"tag": "div", "attrs": {"data-testid": "User-Name"}, "children": [
                {"tag": "span", "children": ["Jane Doe"]},
                {"tag": "span", "children": ["·"]}
            ]}
        ]));
        let profile = extract_profile(&page);
        assert_eq!(profile.display_name.as_deref(), Some("Jane Doe"));
        assert!(profile.handle.is_none());
    }

    #[test]
    fn relationship_note_matches_exact_phrases_only() {
        let page = doc(json!([
            {"tag": "span", "children": ["Follows you back"]},
            {"tag": "span", "children": ["  Not followed by anyone you’re following "]}
        ]));
        let profile = extract_profile(&page);
        assert_eq!(
            profile.relationship_note.as_deref(),
            Some("  Not followed by anyone you’re following ")
        );
    }

    #[test]
    fn posts_skip_blank_text_and_keep_order() {
        let page = doc(json!([
            article(Some("first"), Some("2024-01-03T00:00:00.000Z")),
            article(Some("   "), Some("2024-01-02T00:00:00.000Z")),
            article(None, None),
            article(Some("second"), None)
        ]));
        let posts = extract_recent_posts(&page, 3);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text, "first");
        assert_eq!(posts[0].timestamp, "2024-01-03T00:00:00.000Z");
        assert_eq!(posts[1].text, "second");
        assert_eq!(posts[1].timestamp, "");
    }

    #[test]
    fn posts_are_capped_at_three() {
        let page = doc(json!((1..=5)
            .map(|n| article(Some(&format!("post {n}")), None))
            .collect::<Vec<_>>()));
        let posts = extract_recent_posts(&page, 10);
        let texts: Vec<_> = posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["post 1", "post 2", "post 3"]);
    }

    /// Counts how many post articles the extraction matched.
    struct CountingDocument<'a> {
        inner: &'a MemoryDocument,
        articles_matched: Cell<usize>,
    }

    impl DocumentTree for CountingDocument<'_> {
        fn root(&self) -> NodeId {
            self.inner.root()
        }

        fn descendants(&self, scope: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_> {
            self.inner.descendants(scope)
        }

        fn matches(&self, node: NodeId, selector: Selector) -> bool {
            let matched = self.inner.matches(node, selector);
            if matched && selector == POST_ARTICLE {
                self.articles_matched.set(self.articles_matched.get() + 1);
            }
            matched
        }

        fn text_content(&self, node: NodeId) -> String {
            self.inner.text_content(node)
        }

        fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
            self.inner.attribute(node, name)
        }
    }

    #[test]
    fn post_scan_stops_at_the_limit() {
        let page = doc(json!((1..=50)
            .map(|n| article(Some(&format!("post {n}")), None))
            .collect::<Vec<_>>()));
        let counting = CountingDocument {
            inner: &page,
            articles_matched: Cell::new(0),
        };

        let posts = extract_recent_posts(&counting, MAX_RECENT_POSTS);
        assert_eq!(posts.len(), 3);
        assert_eq!(counting.articles_matched.get(), 3);

        counting.articles_matched.set(0);
        assert!(extract_recent_posts(&counting, 0).is_empty());
        assert_eq!(counting.articles_matched.get(), 0);
    }

    #[test]
    fn blank_posts_do_not_count_toward_the_limit() {
        let page = doc(json!([
            article(Some(" "), None),
            article(Some("a"), None),
            article(None, None),
            article(Some("b"), None),
            article(Some("c"), None),
            article(Some("d"), None)
        ]));
        let counting = CountingDocument {
            inner: &page,
            articles_matched: Cell::new(0),
        };

        let texts: Vec<_> = extract_recent_posts(&counting, 3)
            .iter()
            .map(|p| p.text.clone())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(counting.articles_matched.get(), 5);
    }

    #[test]
    fn guard_short_circuits_off_profile_pages() {
        let page = full_profile();
        let extractor = PageExtractor::new(&page, "https://x.com/home");
        assert!(extractor.profile_info().is_none());
        assert!(extractor.recent_posts().is_empty());

        let extractor = PageExtractor::new(&page, "https://x.com/jane");
        assert_eq!(
            extractor.profile_info().and_then(|p| p.display_name).as_deref(),
            Some("Jane Doe")
        );
    }
}
