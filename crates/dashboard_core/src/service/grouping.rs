//! Category grouping view over links.
//!
//! # Responsibility
//! - Bucket links by category for folder rendering.
//! - Split buckets into expanded/collapsed lists from a preference set.
//!
//! # Invariants
//! - The "General" bucket always exists and is always first.
//! - Every persisted category yields a bucket, even when empty.
//! - Link-to-category matching is case-insensitive.
//! - Remaining buckets: ordered ones ascending by `order`, then unordered
//!   ones by ordinal name comparison.

use crate::model::category::CategoryItem;
use crate::model::link::{is_general, LinkItem, GENERAL_CATEGORY};
use crate::model::ordering::sort_by_order;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Prefix of synthetic header ids for buckets without a persisted category.
pub const CATEGORY_HEADER_PREFIX: &str = "category-header:";

/// Returns the synthetic header id for a bucket named `name`.
pub fn category_header_id(name: &str) -> String {
    format!("{CATEGORY_HEADER_PREFIX}{name}")
}

/// Extracts the bucket name from a synthetic header id.
pub fn parse_category_header_id(id: &str) -> Option<&str> {
    id.strip_prefix(CATEGORY_HEADER_PREFIX)
}

/// One rendered category bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    /// Display name; the persisted category's spelling when one exists.
    pub name: String,
    /// Drop-target id of the bucket header.
    pub header_id: String,
    /// Backing category, `None` for the implicit or ad hoc buckets.
    pub category: Option<CategoryItem>,
    pub links: Vec<LinkItem>,
}

impl LinkGroup {
    fn new(name: String, category: Option<CategoryItem>) -> Self {
        let header_id = match &category {
            Some(category) => category.id.clone(),
            None => category_header_id(&name),
        };
        Self {
            name,
            header_id,
            category,
            links: Vec::new(),
        }
    }

    /// Returns whether a `CategoryItem` backs this bucket.
    pub fn is_persisted(&self) -> bool {
        self.category.is_some()
    }

    fn order(&self) -> Option<i64> {
        self.category.as_ref().and_then(|category| category.order)
    }
}

/// Buckets `links` by category, General first.
pub fn group_links(links: &[LinkItem], categories: &[CategoryItem]) -> Vec<LinkGroup> {
    let mut general = LinkGroup::new(GENERAL_CATEGORY.to_string(), None);
    let mut others: Vec<LinkGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for category in categories {
        if category.is_general() {
            if general.category.is_none() {
                general = LinkGroup::new(GENERAL_CATEGORY.to_string(), Some(category.clone()));
            }
            continue;
        }
        let key = category.name.trim().to_lowercase();
        if index_by_key.contains_key(&key) {
            continue;
        }
        index_by_key.insert(key, others.len());
        others.push(LinkGroup::new(category.name.clone(), Some(category.clone())));
    }

    for link in links {
        if link.category.trim().is_empty() || is_general(&link.category) {
            general.links.push(link.clone());
            continue;
        }
        let key = link.category.trim().to_lowercase();
        let index = match index_by_key.get(&key) {
            Some(index) => *index,
            None => {
                let index = others.len();
                others.push(LinkGroup::new(link.category.trim().to_string(), None));
                index_by_key.insert(key, index);
                index
            }
        };
        others[index].links.push(link.clone());
    }

    others.sort_by(compare_groups);

    let mut groups = Vec::with_capacity(others.len() + 1);
    groups.push(general);
    groups.extend(others);
    for group in &mut groups {
        sort_by_order(&mut group.links);
    }
    groups
}

fn compare_groups(left: &LinkGroup, right: &LinkGroup) -> Ordering {
    match (left.order(), right.order()) {
        (Some(a), Some(b)) => a.cmp(&b).then_with(|| left.name.cmp(&right.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.name.cmp(&right.name),
    }
}

/// Buckets split by the collapsed-name preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPartition {
    pub expanded: Vec<LinkGroup>,
    pub collapsed: Vec<LinkGroup>,
}

/// Splits `groups` into expanded and collapsed lists, keeping their order.
pub fn partition_groups(groups: Vec<LinkGroup>, collapsed: &HashSet<String>) -> GroupPartition {
    let (collapsed, expanded) = groups
        .into_iter()
        .partition(|group| collapsed.contains(&group.name));
    GroupPartition {
        expanded,
        collapsed,
    }
}
