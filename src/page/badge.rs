//! On-page badges next to account identity elements.
//!
//! The marker attribute on an identity element records the last level applied
//! to it and is the only state this module relies on: attaching to a marked
//! element is a no-op, so overlapping scans never stack badges.

use crate::domain::{BadgeState, ScoreLabel};

use super::{
    extractor::USER_NAME,
    tree::{AttrMatch, DocumentTree, DocumentTreeMut, NodeId, Selector},
};

pub const BADGE_MARKER_ATTRIBUTE: &str = "data-drb-badge-attached";

const BADGE: Selector = Selector::new(Some("span"), &[AttrMatch::HasClass("drb-badge")]);
const BADGE_LABEL: Selector =
    Selector::new(Some("span"), &[AttrMatch::HasClass("drb-badge__label")]);

fn badge_class(level: ScoreLabel) -> String {
    format!("drb-badge drb-badge--{level}")
}

fn badge_text(level: ScoreLabel) -> &'static str {
    match level {
        ScoreLabel::Engage => "engage",
        ScoreLabel::Rage => "rage bait",
        ScoreLabel::Maybe => "maybe",
    }
}

fn create_badge<D: DocumentTreeMut + ?Sized>(doc: &mut D, level: ScoreLabel) -> NodeId {
    let badge = doc.create_element("span");
    doc.set_attribute(badge, "class", &badge_class(level));

    let dot = doc.create_element("span");
    doc.set_attribute(dot, "class", "drb-badge__dot");

    let label = doc.create_element("span");
    doc.set_attribute(label, "class", "drb-badge__label");
    doc.set_text(label, badge_text(level));

    doc.append_child(badge, dot);
    doc.append_child(badge, label);
    badge
}

/// Applies `level` to one identity element, rewriting an existing badge in
/// place or creating it on first use. Always refreshes the marker.
pub fn set_badge_level<D: DocumentTreeMut + ?Sized>(doc: &mut D, node: NodeId, level: ScoreLabel) {
    if let Some(existing) = doc.select_first(node, BADGE) {
        doc.set_attribute(existing, "class", &badge_class(level));
        if let Some(label) = doc.select_first(existing, BADGE_LABEL) {
            doc.set_text(label, badge_text(level));
        }
        doc.set_attribute(node, BADGE_MARKER_ATTRIBUTE, level.as_str());
        return;
    }

    doc.set_attribute(node, BADGE_MARKER_ATTRIBUTE, level.as_str());
    let badge = create_badge(doc, level);
    doc.append_child(node, badge);
}

/// Gives an unmarked identity element a pending badge. Marked elements are
/// left untouched.
pub fn attach_badge<D: DocumentTreeMut + ?Sized>(doc: &mut D, node: NodeId) -> bool {
    if doc.attribute(node, BADGE_MARKER_ATTRIBUTE).is_some() {
        return false;
    }
    set_badge_level(doc, node, ScoreLabel::Maybe);
    true
}

/// Attaches pending badges to every identity element under `scope`.
pub fn scan_for_identities<D: DocumentTreeMut + ?Sized>(doc: &mut D, scope: NodeId) -> usize {
    let mut attached = 0;
    for node in doc.select_all(scope, USER_NAME) {
        attached += usize::from(attach_badge(doc, node));
    }
    attached
}

/// Handles one batch of inserted subtree roots.
pub fn annotate_inserted<D: DocumentTreeMut + ?Sized>(doc: &mut D, inserted: &[NodeId]) -> usize {
    let mut attached = 0;
    for node in inserted {
        if doc.matches(*node, USER_NAME) {
            attached += usize::from(attach_badge(doc, *node));
        } else {
            attached += scan_for_identities(doc, *node);
        }
    }
    attached
}

/// Pushes an authoritative score to every rendered identity element.
pub fn apply_score<D: DocumentTreeMut + ?Sized>(doc: &mut D, level: ScoreLabel) -> usize {
    let root = doc.root();
    let identities = doc.select_all(root, USER_NAME);
    for node in &identities {
        set_badge_level(doc, *node, level);
    }
    identities.len()
}

pub fn badge_state<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<BadgeState> {
    let marker = doc.attribute(node, BADGE_MARKER_ATTRIBUTE)?;
    Some(BadgeState {
        level: ScoreLabel::from_wire(&marker),
        attached: doc.select_first(node, BADGE).is_some(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::page::memory::{MemoryDocument, SnapshotNode};

    use super::*;

    fn identity(name: &str) -> serde_json::Value {
        json!({"tag": "div", "attrs": {"data-testid": "User-Name"}, "children": [
            {"tag": "span", "children": [name]}
        ]})
    }

    fn page(children: Vec<serde_json::Value>) -> MemoryDocument {
        let snapshot: SnapshotNode =
            serde_json::from_value(json!({"tag": "body", "children": children})).unwrap();
        MemoryDocument::from_snapshot(&snapshot)
    }

    fn identities(doc: &MemoryDocument) -> Vec<NodeId> {
        doc.select_all(doc.root(), USER_NAME)
    }

    fn label_text(doc: &MemoryDocument, node: NodeId) -> String {
        let label = doc.select_first(node, BADGE_LABEL).expect("badge label");
        doc.text_content(label)
    }

    #[test]
    fn attach_creates_pending_badge_once() {
        let mut doc = page(vec![identity("Jane Doe")]);
        let node = identities(&doc)[0];

        assert!(attach_badge(&mut doc, node));
        assert!(!attach_badge(&mut doc, node));

        assert_eq!(doc.select_all(node, BADGE).len(), 1);
        assert_eq!(
            doc.attribute(node, BADGE_MARKER_ATTRIBUTE).as_deref(),
            Some("maybe")
        );
        assert_eq!(label_text(&doc, node), "maybe");
        assert_eq!(
            badge_state(&doc, node),
            Some(BadgeState {
                level: ScoreLabel::Maybe,
                attached: true
            })
        );
    }

    #[test]
    fn attach_does_not_reset_a_scored_badge() {
        let mut doc = page(vec![identity("Jane Doe")]);
        let node = identities(&doc)[0];
        set_badge_level(&mut doc, node, ScoreLabel::Engage);

        assert!(!attach_badge(&mut doc, node));
        assert_eq!(badge_state(&doc, node).unwrap().level, ScoreLabel::Engage);
    }

    #[test]
    fn update_rewrites_class_text_and_marker_in_place() {
        let mut doc = page(vec![identity("Jane Doe")]);
        let node = identities(&doc)[0];
        set_badge_level(&mut doc, node, ScoreLabel::Engage);
        let badge = doc.select_first(node, BADGE).unwrap();
        assert_eq!(label_text(&doc, node), "engage");

        set_badge_level(&mut doc, node, ScoreLabel::Rage);

        assert_eq!(doc.select_all(node, BADGE), vec![badge]);
        assert_eq!(
            doc.attribute(badge, "class").as_deref(),
            Some("drb-badge drb-badge--rage")
        );
        assert_eq!(label_text(&doc, node), "rage bait");
        assert_eq!(
            doc.attribute(node, BADGE_MARKER_ATTRIBUTE).as_deref(),
            Some("rage")
        );
    }

    #[test]
    fn repeated_update_is_stable() {
        let mut doc = page(vec![identity("Jane Doe")]);
        let node = identities(&doc)[0];
        set_badge_level(&mut doc, node, ScoreLabel::Rage);
        let first = badge_state(&doc, node);
        set_badge_level(&mut doc, node, ScoreLabel::Rage);
        assert_eq!(badge_state(&doc, node), first);
        assert_eq!(doc.select_all(node, BADGE).len(), 1);
    }

    #[test]
    fn apply_score_updates_every_identity() {
        let mut doc = page(vec![identity("Jane Doe"), identity("Jane Doe")]);
        let root = doc.root();
        assert_eq!(scan_for_identities(&mut doc, root), 2);

        assert_eq!(apply_score(&mut doc, ScoreLabel::Engage), 2);
        for node in identities(&doc) {
            assert_eq!(badge_state(&doc, node).unwrap().level, ScoreLabel::Engage);
            assert_eq!(doc.select_all(node, BADGE).len(), 1);
        }
    }

    #[test]
    fn inserted_batches_are_annotated() {
        let mut doc = page(vec![]);
        let body = doc.select_first(doc.root(), Selector::tag("body")).unwrap();
        let direct: SnapshotNode = serde_json::from_value(identity("Direct")).unwrap();
        let nested: SnapshotNode = serde_json::from_value(json!({"tag": "article", "children": [
            {"tag": "div", "children": [identity("Nested")]}
        ]}))
        .unwrap();

        let mut watcher = doc.watch();
        doc.insert_snapshot(body, &direct);
        doc.insert_snapshot(body, &nested);
        let batch = watcher.drain_pending();

        assert_eq!(annotate_inserted(&mut doc, &batch), 2);
        // badges inserted by the first pass produce their own batch; replaying is harmless
        let follow_up = watcher.drain_pending();
        assert!(!follow_up.is_empty());
        assert_eq!(annotate_inserted(&mut doc, &follow_up), 0);
        assert_eq!(annotate_inserted(&mut doc, &batch), 0);

        for node in identities(&doc) {
            assert_eq!(doc.select_all(node, BADGE).len(), 1);
        }
    }

    #[test]
    fn unmarked_element_has_no_state() {
        let doc = page(vec![identity("Jane Doe")]);
        assert!(badge_state(&doc, identities(&doc)[0]).is_none());
    }
}
