//! Ordering model for order-managed lists (links, notes, categories).
//!
//! # Responsibility
//! - Define the total order implied by the optional `order` field.
//! - Provide dense reindexing and prepend/append order allocation.
//!
//! # Invariants
//! - Ordered items come first, ascending by `order`; ties are broken by
//!   `created_at` descending (newest first), then by id ascending.
//! - Items without `order` follow all ordered items, newest first.
//! - After `reindex`, `order` equals the zero-based position of each item.
//! - Orders are whole numbers. Every writer (prepend, append, reindex) only
//!   produces integers, so a backup carrying a fractional `order` is
//!   rejected as malformed instead of being rounded.

use crate::model::entity::Entity;
use std::cmp::Ordering;

/// Entity whose position in its list is encoded by an optional order key.
pub trait Ordered: Entity {
    fn order(&self) -> Option<i64>;

    fn set_order(&mut self, order: Option<i64>);
}

/// Compares two items according to the list ordering rules.
pub fn compare_by_order<T: Ordered>(left: &T, right: &T) -> Ordering {
    let by_order = match (left.order(), right.order()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_order
        .then_with(|| right.created_at().cmp(&left.created_at()))
        .then_with(|| left.id().cmp(right.id()))
}

/// Sorts items in place according to the list ordering rules.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by(compare_by_order);
}

/// Rewrites every item's order to its zero-based position.
///
/// Returns the positions whose order value actually changed.
pub fn reindex<T: Ordered>(items: &mut [T]) -> Vec<usize> {
    let mut changed = Vec::new();
    for (index, item) in items.iter_mut().enumerate() {
        let target = Some(index as i64);
        if item.order() != target {
            item.set_order(target);
            changed.push(index);
        }
    }
    changed
}

/// Moves one element from `from` to `to`, shifting the elements between.
///
/// Moving forward lands the element after the one previously at `to`;
/// moving backward lands it before. Out-of-range indexes leave the list
/// untouched and return `false`.
pub fn move_within<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from == to {
        return true;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Order value that places a new item before every ordered item.
pub fn prepend_order<T: Ordered>(items: &[T]) -> i64 {
    items
        .iter()
        .filter_map(Ordered::order)
        .min()
        .map_or(0, |min| min - 1)
}

/// Order value that places a new item after every ordered item.
pub fn append_order<T: Ordered>(items: &[T]) -> i64 {
    items
        .iter()
        .filter_map(Ordered::order)
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::{append_order, move_within, prepend_order, reindex, sort_by_order};
    use crate::model::note::NoteItem;

    fn note(id: &str, created_at: i64, order: Option<i64>) -> NoteItem {
        NoteItem {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            created_at,
            order,
        }
    }

    fn ids(items: &[NoteItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn ordered_items_precede_unordered_newest_first() {
        let mut items = vec![
            note("old-unordered", 10, None),
            note("second", 5, Some(1)),
            note("new-unordered", 20, None),
            note("first", 1, Some(0)),
        ];
        sort_by_order(&mut items);
        assert_eq!(
            ids(&items),
            ["first", "second", "new-unordered", "old-unordered"]
        );
    }

    #[test]
    fn equal_orders_break_ties_by_newest_created_at() {
        let mut items = vec![note("older", 1, Some(3)), note("newer", 2, Some(3))];
        sort_by_order(&mut items);
        assert_eq!(ids(&items), ["newer", "older"]);
    }

    #[test]
    fn reindex_assigns_dense_positions_and_reports_changes() {
        let mut items = vec![
            note("a", 1, Some(0)),
            note("b", 2, Some(7)),
            note("c", 3, None),
        ];
        let changed = reindex(&mut items);
        assert_eq!(changed, vec![1, 2]);
        let orders: Vec<_> = items.iter().map(|item| item.order).collect();
        assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn move_within_places_item_in_drag_direction() {
        let mut forward = vec!["a", "b", "c", "d"];
        assert!(move_within(&mut forward, 0, 2));
        assert_eq!(forward, ["b", "c", "a", "d"]);

        let mut backward = vec!["a", "b", "c", "d"];
        assert!(move_within(&mut backward, 3, 1));
        assert_eq!(backward, ["a", "d", "b", "c"]);

        let mut untouched = vec!["a"];
        assert!(!move_within(&mut untouched, 0, 4));
    }

    #[test]
    fn prepend_and_append_orders_bracket_existing_items() {
        let items = vec![note("a", 1, Some(2)), note("b", 2, Some(-1)), note("c", 3, None)];
        assert_eq!(prepend_order(&items), -2);
        assert_eq!(append_order(&items), 3);

        let empty: Vec<NoteItem> = Vec::new();
        assert_eq!(prepend_order(&empty), 0);
        assert_eq!(append_order(&empty), 0);
    }
}
