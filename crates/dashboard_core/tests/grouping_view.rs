mod common;

use common::{category, ids, link};
use dashboard_core::{group_links, partition_groups, LinkItem};
use std::collections::HashSet;

#[test]
fn every_category_gets_a_bucket_and_general_leads() {
    let links = vec![link("a", "Work", Some(1)), link("b", "", Some(0))];
    let categories = vec![
        category("work", "Work", Some(1)),
        category("home", "Home", Some(0)),
        category("misc", "Misc", None),
    ];

    let groups = group_links(&links, &categories);
    let names: Vec<_> = groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, ["General", "Home", "Work", "Misc"]);
    assert_eq!(ids(&groups[0].links), ["b"]);
    assert!(groups[1].links.is_empty());
    assert_eq!(groups[2].header_id, "work");
}

#[test]
fn unordered_buckets_sort_by_ordinal_name_after_ordered_ones() {
    let links = vec![
        link("z", "zeta", None),
        link("y", "Alpha", None),
        link("x", "Beta", None),
    ];
    let categories = vec![category("beta", "Beta", Some(7))];

    let groups = group_links(&links, &categories);
    let names: Vec<_> = groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, ["General", "Beta", "Alpha", "zeta"]);
    assert!(groups[1].is_persisted());
    assert!(!groups[2].is_persisted());
    assert_eq!(groups[3].header_id, "category-header:zeta");
}

#[test]
fn links_match_categories_case_insensitively_and_sort_within_bucket() {
    let mut newer = link("newer", "work", None);
    newer.created_at += 10;
    let links: Vec<LinkItem> = vec![
        link("older", "WORK", None),
        newer,
        link("first", "Work", Some(0)),
    ];
    let categories = vec![category("work", "Work", Some(0))];

    let groups = group_links(&links, &categories);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].name, "Work");
    assert_eq!(ids(&groups[1].links), ["first", "newer", "older"]);
}

#[test]
fn partition_splits_by_collapsed_names_and_keeps_order() {
    let categories = vec![
        category("a", "A", Some(0)),
        category("b", "B", Some(1)),
        category("c", "C", Some(2)),
    ];
    let groups = group_links(&[], &categories);
    let collapsed: HashSet<String> = ["B", "General"].iter().map(|name| name.to_string()).collect();

    let partition = partition_groups(groups, &collapsed);
    let expanded: Vec<_> = partition.expanded.iter().map(|group| group.name.as_str()).collect();
    let hidden: Vec<_> = partition.collapsed.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(expanded, ["A", "C"]);
    assert_eq!(hidden, ["General", "B"]);
}
