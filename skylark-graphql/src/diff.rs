//! Minimal diffs between the original and updated versions of a list of links.
//!
//! Relationship, content, availability and segment editors all hand the mutation builders two
//! snapshots of the same list: what was loaded and what the user ended up with. Sending the whole
//! updated list would be both wasteful and dangerous (an empty list would read as "clear
//! everything"), so the builders only send what changed. This module computes that change.

use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// An item in a list of links, identified by a key.
pub trait Link {
    /// The identity of the linked item. Two items with the same key are the same link.
    fn key(&self) -> &str;

    /// The stored 1-based position of the item, for ordered lists.
    fn position(&self) -> Option<u32> {
        None
    }
}

/// A reference to another object, as found in relationship, content and availability lists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRef {
    pub uid: String,
    pub object_type: String,
    /// The stored 1-based position, for ordered lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl LinkRef {
    pub fn new(uid: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            object_type: object_type.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

impl Link for String {
    fn key(&self) -> &str {
        self
    }
}

impl Link for LinkRef {
    fn key(&self) -> &str {
        &self.uid
    }

    fn position(&self) -> Option<u32> {
        self.position
    }
}

/// A link that stays in the updated list but moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repositioned<'a, T> {
    pub link: &'a T,
    /// The new 1-based position.
    pub position: u32,
}

/// The difference between two lists of links.
///
/// `added`, `removed` and `unchanged` are disjoint, and together they hold every key found in
/// either list exactly once. `repositioned` is the subset of `unchanged` whose position moved.
#[derive(Derivative)]
#[derivative(Debug(bound = "T: std::fmt::Debug"), Default(bound = ""))]
pub struct LinkDiff<'a, T> {
    /// Links only in the updated list, in updated order, with their new 1-based position.
    pub added: Vec<(&'a T, u32)>,
    /// Links only in the original list, in original order.
    pub removed: Vec<&'a T>,
    /// Links in both lists, in updated order.
    pub unchanged: Vec<&'a T>,
    /// Links in both lists whose position changed.
    pub repositioned: Vec<Repositioned<'a, T>>,
}

impl<'a, T> LinkDiff<'a, T> {
    /// Did anything change?
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.repositioned.is_empty()
    }

    /// Were links added or removed? This ignores reordering, for unordered lists.
    pub fn has_membership_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    pub fn added_links(&self) -> impl '_ + Iterator<Item = &'a T> {
        self.added.iter().map(|(link, _)| *link)
    }
}

/// Compute the change from `original` to `updated`, keyed by [`Link::key`].
///
/// Positions in `original` are the stored ones where present. Positions in `updated` are always
/// the place in the list, since that is the order the user ended up with. Duplicate keys within
/// one list are treated as a single link; the first occurrence wins.
pub fn diff_links<'a, T: Link>(original: &'a [T], updated: &'a [T]) -> LinkDiff<'a, T> {
    let original_positions = positions(original);
    let updated_keys = dedup(updated)
        .map(|(link, _)| link.key())
        .collect::<HashSet<_>>();

    let mut diff = LinkDiff::default();
    for (link, position) in dedup(updated) {
        match original_positions.get(link.key()) {
            Some(original_position) => {
                diff.unchanged.push(link);
                if *original_position != position {
                    diff.repositioned.push(Repositioned { link, position });
                }
            }
            None => diff.added.push((link, position)),
        }
    }
    for (link, _) in dedup(original) {
        if !updated_keys.contains(link.key()) {
            diff.removed.push(link);
        }
    }
    diff
}

/// The 1-based position of each link in a list: its stored position if it has one, otherwise its
/// place in the list.
fn positions<T: Link>(links: &[T]) -> HashMap<&str, u32> {
    dedup(links)
        .map(|(link, index)| (link.key(), link.position().unwrap_or(index)))
        .collect()
}

/// The links in `links`, skipping repeated keys, with their 1-based places in the list.
fn dedup<T: Link>(links: &[T]) -> impl '_ + Iterator<Item = (&T, u32)> {
    let mut seen = HashSet::new();
    links
        .iter()
        .filter(move |&link| seen.insert(link.key()))
        .zip(1..)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn links(uids: &[&str]) -> Vec<LinkRef> {
        uids.iter().map(|uid| LinkRef::new(*uid, "Episode")).collect()
    }

    fn uids<'a>(links: impl IntoIterator<Item = &'a LinkRef>) -> Vec<&'a str> {
        links.into_iter().map(|link| link.uid.as_str()).collect()
    }

    #[test]
    fn test_added_and_removed() {
        let original = links(&["a", "b", "c"]);
        let updated = links(&["b", "c", "d"]);
        let diff = diff_links(&original, &updated);

        assert_eq!(uids(diff.added_links()), ["d"]);
        assert_eq!(uids(diff.removed.iter().copied()), ["a"]);
        assert_eq!(uids(diff.unchanged.iter().copied()), ["b", "c"]);
        assert_eq!(diff.added[0].1, 3);
        assert!(diff.has_membership_changes());
    }

    #[test]
    fn test_reposition() {
        let original = links(&["a", "b", "c"]);
        let updated = links(&["c", "b", "a"]);
        let diff = diff_links(&original, &updated);

        assert!(!diff.has_membership_changes());
        assert!(!diff.is_empty());
        let moved = diff
            .repositioned
            .iter()
            .map(|r| (r.link.uid.as_str(), r.position))
            .collect::<Vec<_>>();
        assert_eq!(moved, [("c", 1), ("a", 3)]);
    }

    #[test]
    fn test_stored_positions() {
        // Stored positions win over list order for the original list.
        let original = vec![
            LinkRef::new("a", "Episode").at(2),
            LinkRef::new("b", "Episode").at(1),
        ];
        let updated = links(&["b", "a"]);
        let diff = diff_links(&original, &updated);
        assert!(diff.is_empty());

        // Updated lists still carry the positions they were loaded with; list order wins.
        let original = links(&["a", "b"]);
        let updated = vec![original[1].clone().at(2), original[0].clone().at(1)];
        let diff = diff_links(&original, &updated);
        assert_eq!(diff.repositioned.len(), 2);
        assert_eq!(diff.repositioned[0].position, 1);
    }

    #[test]
    fn test_string_links() {
        let original = vec!["pc".to_string(), "tv".to_string()];
        let updated = vec!["tv".to_string(), "phone".to_string()];
        let diff = diff_links(&original, &updated);
        assert_eq!(diff.added_links().collect::<Vec<_>>(), ["phone"]);
        assert_eq!(diff.removed, ["pc"]);
    }

    #[test]
    fn test_no_change() {
        let list = links(&["a", "b"]);
        let diff = diff_links(&list, &list);
        assert!(diff.is_empty());
        assert_eq!(uids(diff.unchanged.iter().copied()), ["a", "b"]);

        let empty: Vec<LinkRef> = vec![];
        assert!(diff_links(&empty, &empty).is_empty());
    }

    #[test]
    fn test_duplicates() {
        let original = links(&["a"]);
        let updated = links(&["b", "b", "a"]);
        let diff = diff_links(&original, &updated);
        assert_eq!(uids(diff.added_links()), ["b"]);
        assert_eq!(uids(diff.unchanged.iter().copied()), ["a"]);
    }

    fn uid_list() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-f]", 0..8)
    }

    proptest! {
        #[test]
        fn test_diff_partitions_union(original in uid_list(), updated in uid_list()) {
            let original = original.iter().map(|uid| LinkRef::new(uid.as_str(), "Brand")).collect::<Vec<_>>();
            let updated = updated.iter().map(|uid| LinkRef::new(uid.as_str(), "Brand")).collect::<Vec<_>>();
            let diff = diff_links(&original, &updated);

            let added: HashSet<_> = uids(diff.added_links()).into_iter().collect();
            let removed: HashSet<_> = uids(diff.removed.iter().copied()).into_iter().collect();
            let unchanged: HashSet<_> = uids(diff.unchanged.iter().copied()).into_iter().collect();

            prop_assert!(added.is_disjoint(&removed));
            prop_assert!(added.is_disjoint(&unchanged));
            prop_assert!(removed.is_disjoint(&unchanged));

            let union: HashSet<_> = original.iter().chain(&updated).map(|link| link.uid.as_str()).collect();
            let all: HashSet<_> = added.union(&removed).copied().chain(unchanged.iter().copied()).collect();
            prop_assert_eq!(all, union);

            for uid in &added {
                prop_assert!(!original.iter().any(|link| link.uid == *uid));
            }
            for uid in &removed {
                prop_assert!(!updated.iter().any(|link| link.uid == *uid));
            }
        }
    }
}
