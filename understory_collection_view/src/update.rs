// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural changes between two data generations.

use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;

use crate::error::CollectionError;
use crate::index_path::IndexPath;
use crate::info::GridLayoutInfo;

/// Kind of structural change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateAction {
    /// A new item appears at the after index path.
    Insert,
    /// The item at the before index path goes away.
    Delete,
    /// The item keeps its place but its content changes.
    Reload,
    /// The item moves from the before to the after index path.
    Move,
    /// Nothing changes.
    None,
}

impl UpdateAction {
    /// Tie-break between updates that share an effective index path.
    const fn rank(self) -> u8 {
        match self {
            Self::Insert => 0,
            Self::Reload => 1,
            Self::Move => 2,
            Self::None => 3,
            Self::Delete => 4,
        }
    }
}

/// One structural change between a "before" and an "after" generation.
///
/// The before index path is absent exactly for inserts and the after index
/// path exactly for deletes; every constructor enforces this.
///
/// Updates are ordered by their effective index path (where the item ends up
/// for inserts, moves, and reloads; where it was for deletes), so sorting a
/// batch yields the forward application order and
/// [`inverse_compare_index_paths`](Self::inverse_compare_index_paths) the
/// order in which removals must be applied.
///
/// ```rust
/// use understory_collection_view::{IndexPath, UpdateAction, UpdateItem};
///
/// let delete = UpdateItem::delete(IndexPath::new(0, 2));
/// let insert = UpdateItem::insert(IndexPath::new(0, 2));
/// let mut batch = [insert, delete];
/// batch.sort_by(UpdateItem::inverse_compare_index_paths);
/// assert_eq!(batch[0].action(), UpdateAction::Delete);
///
/// assert!(UpdateItem::with_action(UpdateAction::Move, IndexPath::new(0, 0)).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UpdateItem {
    before: Option<IndexPath>,
    after: Option<IndexPath>,
    action: UpdateAction,
}

impl UpdateItem {
    /// An update from explicit parts.
    ///
    /// Fails with [`CollectionError::InvalidUpdate`] if the present index
    /// paths do not match `action`.
    pub fn new(
        before: Option<IndexPath>,
        after: Option<IndexPath>,
        action: UpdateAction,
    ) -> Result<Self, CollectionError> {
        let consistent = before.is_none() == (action == UpdateAction::Insert)
            && after.is_none() == (action == UpdateAction::Delete);
        if !consistent {
            return Err(CollectionError::InvalidUpdate {
                action,
                before,
                after,
            });
        }
        Ok(Self {
            before,
            after,
            action,
        })
    }

    /// An insert or delete at `index_path`. Other actions are rejected.
    pub fn with_action(
        action: UpdateAction,
        index_path: IndexPath,
    ) -> Result<Self, CollectionError> {
        match action {
            UpdateAction::Insert => Self::new(None, Some(index_path), action),
            _ => Self::new(Some(index_path), None, action),
        }
    }

    /// A move from `old` to `new`, or a no-op if they are equal.
    pub fn moved(old: IndexPath, new: IndexPath) -> Self {
        Self {
            before: Some(old),
            after: Some(new),
            action: if old == new {
                UpdateAction::None
            } else {
                UpdateAction::Move
            },
        }
    }

    /// Insert at `index_path`.
    pub const fn insert(index_path: IndexPath) -> Self {
        Self {
            before: None,
            after: Some(index_path),
            action: UpdateAction::Insert,
        }
    }

    /// Delete at `index_path`.
    pub const fn delete(index_path: IndexPath) -> Self {
        Self {
            before: Some(index_path),
            after: None,
            action: UpdateAction::Delete,
        }
    }

    /// Reload the item that moves from `before` to `after`.
    pub const fn reload(before: IndexPath, after: IndexPath) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
            action: UpdateAction::Reload,
        }
    }

    /// Index path in the before generation.
    pub const fn before(&self) -> Option<IndexPath> {
        self.before
    }

    /// Index path in the after generation.
    pub const fn after(&self) -> Option<IndexPath> {
        self.after
    }

    /// The action.
    pub const fn action(&self) -> UpdateAction {
        self.action
    }

    /// The index path used for ordering.
    pub fn effective_index_path(&self) -> IndexPath {
        let path = match self.action {
            UpdateAction::Insert | UpdateAction::Move | UpdateAction::Reload => {
                self.after.or(self.before)
            }
            UpdateAction::Delete | UpdateAction::None => self.before.or(self.after),
        };
        // Every constructor guarantees at least one side.
        path.unwrap_or_default()
    }

    /// Ascending by effective index path, then by action.
    pub fn compare_index_paths(&self, other: &Self) -> Ordering {
        self.effective_index_path()
            .cmp(&other.effective_index_path())
            .then_with(|| self.action.rank().cmp(&other.action.rank()))
            .then_with(|| self.before.cmp(&other.before))
            .then_with(|| self.after.cmp(&other.after))
    }

    /// The exact reverse of [`compare_index_paths`](Self::compare_index_paths).
    pub fn inverse_compare_index_paths(&self, other: &Self) -> Ordering {
        other.compare_index_paths(self)
    }
}

impl Ord for UpdateItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_index_paths(other)
    }
}

impl PartialOrd for UpdateItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Before and after frames of one updated item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemTransition {
    /// The update.
    pub update: UpdateItem,
    /// Frame in the before generation; absent for inserts.
    pub from: Option<Rect>,
    /// Frame in the after generation; absent for deletes.
    pub to: Option<Rect>,
}

/// A batch of updates grouped and sorted for application.
///
/// Deletes are kept in inverse order so that removing them one by one never
/// shifts an index still to be removed; inserts, moves, and reloads are kept
/// in forward order. No-op updates are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    deletes: Vec<UpdateItem>,
    inserts: Vec<UpdateItem>,
    reloads: Vec<UpdateItem>,
    moves: Vec<UpdateItem>,
}

impl UpdatePlan {
    /// Group and sort `updates`.
    pub fn new(updates: impl IntoIterator<Item = UpdateItem>) -> Self {
        let mut plan = Self::default();
        for update in updates {
            match update.action {
                UpdateAction::Delete => plan.deletes.push(update),
                UpdateAction::Insert => plan.inserts.push(update),
                UpdateAction::Reload => plan.reloads.push(update),
                UpdateAction::Move => plan.moves.push(update),
                UpdateAction::None => {}
            }
        }
        plan.deletes.sort_by(UpdateItem::inverse_compare_index_paths);
        plan.inserts.sort();
        plan.reloads.sort();
        plan.moves.sort();
        plan
    }

    /// Deletes, highest index path first.
    pub fn deletes(&self) -> &[UpdateItem] {
        &self.deletes
    }

    /// Inserts, lowest index path first.
    pub fn inserts(&self) -> &[UpdateItem] {
        &self.inserts
    }

    /// Reloads in forward order.
    pub fn reloads(&self) -> &[UpdateItem] {
        &self.reloads
    }

    /// Moves, ordered by destination.
    pub fn moves(&self) -> &[UpdateItem] {
        &self.moves
    }

    /// Number of updates in the plan.
    pub fn len(&self) -> usize {
        self.deletes.len() + self.inserts.len() + self.reloads.len() + self.moves.len()
    }

    /// Whether the plan changes nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Before index paths vacated by deletes and moves, highest first.
    pub fn removal_order(&self) -> Vec<IndexPath> {
        let mut paths: Vec<_> = self
            .deletes
            .iter()
            .chain(&self.moves)
            .filter_map(UpdateItem::before)
            .collect();
        paths.sort_by(|a, b| b.cmp(a));
        paths
    }

    /// After index paths filled by inserts and moves, lowest first.
    pub fn insertion_order(&self) -> Vec<IndexPath> {
        let mut paths: Vec<_> = self
            .inserts
            .iter()
            .chain(&self.moves)
            .filter_map(UpdateItem::after)
            .collect();
        paths.sort();
        paths
    }

    /// Per-section item counts after applying the plan to `before`.
    ///
    /// Removals are applied highest first and insertions lowest first. Each
    /// index path must be valid at the moment it is applied.
    pub fn expected_counts(&self, before: &[usize]) -> Result<Vec<usize>, CollectionError> {
        let mut counts = before.to_vec();
        for update in &self.reloads {
            if let Some(path) = update.before {
                check_index_path(&counts, path, false)?;
            }
        }
        for path in self.removal_order() {
            check_index_path(&counts, path, false)?;
            counts[path.section] -= 1;
        }
        for path in self.insertion_order() {
            check_index_path(&counts, path, true)?;
            counts[path.section] += 1;
        }
        Ok(counts)
    }

    /// Check that applying the plan to `before` yields `after`.
    pub fn validate_counts(
        &self,
        before: &[usize],
        after: &[usize],
    ) -> Result<(), CollectionError> {
        let expected = self.expected_counts(before)?;
        for section in 0..expected.len().max(after.len()) {
            let expected = expected.get(section).copied().unwrap_or(0);
            let actual = after.get(section).copied().unwrap_or(0);
            if expected != actual {
                cv_warn!(section, expected, actual, "update batch disagrees with data source");
                return Err(CollectionError::InconsistentUpdate {
                    section,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Pair every update with its frames in two generations of geometry.
    ///
    /// Deletes come first, then moves, reloads, and inserts, each in plan
    /// order.
    pub fn transitions<'a>(
        &'a self,
        before: &'a GridLayoutInfo,
        after: &'a GridLayoutInfo,
    ) -> impl Iterator<Item = ItemTransition> + 'a {
        self.deletes
            .iter()
            .chain(&self.moves)
            .chain(&self.reloads)
            .chain(&self.inserts)
            .map(move |update| ItemTransition {
                update: *update,
                from: update
                    .before
                    .and_then(|path| before.frame_for_item_at_index_path(path)),
                to: update
                    .after
                    .and_then(|path| after.frame_for_item_at_index_path(path)),
            })
    }
}

fn check_index_path(
    counts: &[usize],
    path: IndexPath,
    inserting: bool,
) -> Result<(), CollectionError> {
    let items = *counts
        .get(path.section)
        .ok_or(CollectionError::SectionOutOfRange {
            section: path.section,
            sections: counts.len(),
        })?;
    let in_range = if inserting {
        path.item <= items
    } else {
        path.item < items
    };
    if in_range {
        Ok(())
    } else {
        Err(CollectionError::ItemOutOfRange {
            index_path: path,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{UpdateAction, UpdateItem, UpdatePlan};
    use crate::config::GridLayoutConfig;
    use crate::error::CollectionError;
    use crate::index_path::IndexPath;
    use crate::info::GridLayoutInfo;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cmp::Ordering;
    use kurbo::{Rect, Size};

    fn ip(section: usize, item: usize) -> IndexPath {
        IndexPath::new(section, item)
    }

    #[test]
    fn constructors_enforce_index_path_presence() {
        assert!(UpdateItem::new(None, Some(ip(0, 0)), UpdateAction::Insert).is_ok());
        assert!(UpdateItem::new(Some(ip(0, 0)), None, UpdateAction::Delete).is_ok());
        assert!(UpdateItem::new(Some(ip(0, 0)), Some(ip(0, 1)), UpdateAction::Move).is_ok());
        assert!(UpdateItem::new(None, None, UpdateAction::Insert).is_err());
        assert!(UpdateItem::new(Some(ip(0, 0)), Some(ip(0, 0)), UpdateAction::Insert).is_err());
        assert!(UpdateItem::new(Some(ip(0, 0)), None, UpdateAction::Reload).is_err());
        assert_eq!(
            UpdateItem::new(None, None, UpdateAction::None),
            Err(CollectionError::InvalidUpdate {
                action: UpdateAction::None,
                before: None,
                after: None,
            })
        );

        let insert = UpdateItem::with_action(UpdateAction::Insert, ip(1, 2)).unwrap();
        assert_eq!((insert.before(), insert.after()), (None, Some(ip(1, 2))));
        let delete = UpdateItem::with_action(UpdateAction::Delete, ip(1, 2)).unwrap();
        assert_eq!((delete.before(), delete.after()), (Some(ip(1, 2)), None));
        assert!(UpdateItem::with_action(UpdateAction::Reload, ip(1, 2)).is_err());
    }

    #[test]
    fn moved_infers_action() {
        assert_eq!(UpdateItem::moved(ip(0, 1), ip(0, 3)).action(), UpdateAction::Move);
        assert_eq!(UpdateItem::moved(ip(0, 1), ip(0, 1)).action(), UpdateAction::None);
    }

    #[test]
    fn effective_index_path_follows_final_position() {
        assert_eq!(UpdateItem::insert(ip(0, 4)).effective_index_path(), ip(0, 4));
        assert_eq!(UpdateItem::delete(ip(0, 4)).effective_index_path(), ip(0, 4));
        assert_eq!(UpdateItem::moved(ip(0, 1), ip(2, 0)).effective_index_path(), ip(2, 0));
        assert_eq!(UpdateItem::reload(ip(0, 1), ip(0, 0)).effective_index_path(), ip(0, 0));
    }

    #[test]
    fn orderings_are_total_and_reversed() {
        let items = [
            UpdateItem::insert(ip(0, 2)),
            UpdateItem::delete(ip(0, 2)),
            UpdateItem::delete(ip(1, 0)),
            UpdateItem::moved(ip(0, 0), ip(0, 5)),
            UpdateItem::moved(ip(0, 3), ip(0, 3)),
            UpdateItem::reload(ip(0, 1), ip(0, 1)),
            UpdateItem::insert(ip(0, 0)),
        ];
        for a in &items {
            for b in &items {
                let forward = a.compare_index_paths(b);
                assert_eq!(a.inverse_compare_index_paths(b), forward.reverse());
                assert_eq!(forward == Ordering::Equal, a == b);
                if a.effective_index_path() < b.effective_index_path() {
                    assert_eq!(forward, Ordering::Less);
                }
            }
        }

        let mut sorted = items.to_vec();
        sorted.sort();
        let paths: Vec<_> = sorted.iter().map(UpdateItem::effective_index_path).collect();
        assert!(paths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn delete_applies_before_insert_at_same_index() {
        let delete = UpdateItem::delete(ip(0, 2));
        let insert = UpdateItem::insert(ip(0, 2));
        let earlier_insert = UpdateItem::insert(ip(0, 1));
        let mut batch = vec![insert, earlier_insert, delete];
        batch.sort_by(UpdateItem::inverse_compare_index_paths);
        assert_eq!(batch, [delete, insert, earlier_insert]);
    }

    #[test]
    fn plan_groups_and_orders_updates() {
        let plan = UpdatePlan::new([
            UpdateItem::delete(ip(0, 1)),
            UpdateItem::insert(ip(0, 4)),
            UpdateItem::delete(ip(0, 3)),
            UpdateItem::insert(ip(0, 0)),
            UpdateItem::moved(ip(1, 0), ip(0, 2)),
            UpdateItem::moved(ip(0, 0), ip(0, 0)),
        ]);
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.deletes()[0].before(), Some(ip(0, 3)));
        assert_eq!(plan.inserts()[0].after(), Some(ip(0, 0)));
        assert_eq!(plan.removal_order(), [ip(1, 0), ip(0, 3), ip(0, 1)]);
        assert_eq!(plan.insertion_order(), [ip(0, 0), ip(0, 2), ip(0, 4)]);
        assert!(UpdatePlan::new([UpdateItem::moved(ip(0, 0), ip(0, 0))]).is_empty());
    }

    #[test]
    fn plan_validates_counts() {
        let plan = UpdatePlan::new([
            UpdateItem::delete(ip(0, 4)),
            UpdateItem::delete(ip(0, 0)),
            UpdateItem::insert(ip(1, 0)),
            UpdateItem::moved(ip(0, 2), ip(1, 1)),
        ]);
        assert_eq!(plan.expected_counts(&[5, 1]), Ok(vec![2, 3]));
        assert_eq!(plan.validate_counts(&[5, 1], &[2, 3]), Ok(()));
        assert_eq!(
            plan.validate_counts(&[5, 1], &[2, 4]),
            Err(CollectionError::InconsistentUpdate {
                section: 1,
                expected: 3,
                actual: 4,
            })
        );
        assert_eq!(
            plan.expected_counts(&[4, 1]),
            Err(CollectionError::ItemOutOfRange {
                index_path: ip(0, 4),
                items: 4,
            })
        );
        assert_eq!(
            UpdatePlan::new([UpdateItem::insert(ip(2, 0))]).expected_counts(&[1]),
            Err(CollectionError::SectionOutOfRange {
                section: 2,
                sections: 1,
            })
        );
    }

    #[test]
    fn transitions_pair_frames_across_generations() {
        let config = GridLayoutConfig::default().with_viewport(Size::new(100.0, 100.0));
        let mut before = GridLayoutInfo::from_config(&config);
        before.add_section().set_uniform_items(3, Size::new(50.0, 50.0));
        before.validate();
        let mut after = before.snapshot();
        after.section_mut(0).unwrap().set_uniform_items(2, Size::new(50.0, 50.0));
        after.validate();

        let plan = UpdatePlan::new([
            UpdateItem::delete(ip(0, 0)),
            UpdateItem::moved(ip(0, 2), ip(0, 1)),
        ]);
        let transitions: Vec<_> = plan.transitions(&before, &after).collect();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].from, Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert_eq!(transitions[0].to, None);
        assert_eq!(transitions[1].from, Some(Rect::new(0.0, 50.0, 50.0, 100.0)));
        assert_eq!(transitions[1].to, Some(Rect::new(50.0, 0.0, 100.0, 50.0)));
    }
}
