mod common;

use common::{category, ids, link, note, FlakyStore};
use dashboard_core::service::grouping::category_header_id;
use dashboard_core::{
    group_links, Board, CommitOutcome, DashboardRepository, DashboardStore, DragState,
    DragSubject, EntityKind, LinkGroup, LinkItem, RepoError, ReorderEngine, ReorderError,
    Snapshot,
};

async fn seeded<S: DashboardStore>(
    repo: &DashboardRepository<S>,
    snapshot: Snapshot,
) -> ReorderEngine {
    repo.add_snapshot(&snapshot).await.unwrap();
    ReorderEngine::new(Board::from(repo.load_all().await.unwrap()))
}

fn find<'a>(links: &'a [LinkItem], id: &str) -> &'a LinkItem {
    links.iter().find(|item| item.id == id).unwrap()
}

fn bucket<'a>(groups: &'a [LinkGroup], name: &str) -> &'a LinkGroup {
    groups.iter().find(|group| group.name == name).unwrap()
}

#[tokio::test]
async fn dragging_b_before_a_swaps_their_orders() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![link("a", "General", Some(0)), link("b", "General", Some(1))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("b").unwrap();
    let outcome = engine.drag_end(&repo, "b", Some("a")).await.unwrap();
    assert_eq!(
        outcome,
        CommitOutcome::Reordered {
            kind: EntityKind::Link,
            persisted: 2
        }
    );

    let links = repo.links().await.unwrap();
    assert_eq!(find(&links, "a").order, Some(1));
    assert_eq!(find(&links, "b").order, Some(0));
    assert_eq!(engine.state(), DragState::Idle);
}

#[tokio::test]
async fn commit_densely_reindexes_the_whole_list() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            notes: vec![
                note("n1", Some(-4)),
                note("n2", Some(10)),
                note("n3", None),
                note("n4", Some(30)),
            ],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("n3").unwrap();
    engine.drag_end(&repo, "n3", Some("n1")).await.unwrap();

    let notes = repo.notes().await.unwrap();
    assert_eq!(ids(&notes), ["n3", "n1", "n2", "n4"]);
    for (index, item) in notes.iter().enumerate() {
        assert_eq!(item.order, Some(index as i64));
    }
}

#[tokio::test]
async fn moved_item_lands_next_to_its_target() {
    let repo = DashboardRepository::in_memory();
    let notes = vec![
        note("a", Some(0)),
        note("b", Some(1)),
        note("c", Some(2)),
        note("d", Some(3)),
    ];
    let mut engine = seeded(
        &repo,
        Snapshot {
            notes,
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("a").unwrap();
    engine.drag_end(&repo, "a", Some("c")).await.unwrap();
    assert_eq!(ids(&repo.notes().await.unwrap()), ["b", "c", "a", "d"]);

    engine.drag_start("d").unwrap();
    engine.drag_end(&repo, "d", Some("b")).await.unwrap();
    let after = repo.notes().await.unwrap();
    assert_eq!(ids(&after), ["d", "b", "c", "a"]);
    assert_eq!(after.len(), 4);
}

#[tokio::test]
async fn dropping_on_category_header_only_recategorizes_that_link() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![
                link("a", "Work", Some(0)),
                link("b", "Work", Some(1)),
                link("c", "General", Some(2)),
            ],
            categories: vec![category("work", "Work", Some(0)), category("home", "Home", Some(1))],
            ..Snapshot::default()
        },
    )
    .await;
    let before = repo.links().await.unwrap();

    engine.drag_start("a").unwrap();
    let outcome = engine.drag_end(&repo, "a", Some("home")).await.unwrap();
    assert_eq!(
        outcome,
        CommitOutcome::Recategorized {
            link_id: "a".to_string(),
            category: "Home".to_string()
        }
    );

    let after = repo.links().await.unwrap();
    assert_eq!(find(&after, "a").category, "Home");
    assert_eq!(find(&after, "a").order, Some(0));
    assert_eq!(find(&after, "b"), find(&before, "b"));
    assert_eq!(find(&after, "c"), find(&before, "c"));
}

#[tokio::test]
async fn synthetic_general_header_accepts_links() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![link("a", "Work", Some(0))],
            categories: vec![category("work", "Work", Some(0))],
            ..Snapshot::default()
        },
    )
    .await;

    let header = category_header_id("General");
    engine.drag_start("a").unwrap();
    engine.drag_end(&repo, "a", Some(&header)).await.unwrap();

    assert_eq!(repo.links().await.unwrap()[0].category, "General");
}

#[tokio::test]
async fn missing_or_self_target_is_a_noop() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![link("a", "General", Some(0)), link("b", "General", Some(1))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("a").unwrap();
    assert_eq!(
        engine.drag_end(&repo, "a", None).await.unwrap(),
        CommitOutcome::NoOp
    );
    assert_eq!(engine.state(), DragState::Idle);

    engine.drag_start("a").unwrap();
    assert_eq!(
        engine.drag_end(&repo, "a", Some("a")).await.unwrap(),
        CommitOutcome::NoOp
    );
    assert_eq!(engine.state(), DragState::Idle);
}

#[tokio::test]
async fn cross_kind_drop_is_a_noop() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![link("a", "General", Some(0))],
            notes: vec![note("n", Some(0))],
            ..Snapshot::default()
        },
    )
    .await;

    assert_eq!(
        engine.drag_start("n").unwrap(),
        DragSubject::Note("n".to_string())
    );
    let outcome = engine.drag_end(&repo, "n", Some("a")).await.unwrap();
    assert_eq!(outcome, CommitOutcome::NoOp);
    assert_eq!(repo.notes().await.unwrap()[0].order, Some(0));
}

#[tokio::test]
async fn unknown_drag_id_is_rejected() {
    let mut engine = ReorderEngine::default();
    let err = engine.drag_start("missing").unwrap_err();
    assert!(matches!(err, ReorderError::UnknownItem(id) if id == "missing"));
    assert_eq!(engine.state(), DragState::Idle);
}

#[tokio::test]
async fn drag_over_previews_without_persisting() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![
                link("a", "Work", Some(0)),
                link("b", "General", Some(1)),
                link("c", "General", Some(2)),
            ],
            categories: vec![category("work", "Work", Some(0))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("a").unwrap();
    assert!(engine.drag_over("a", "c"));
    assert!(engine.has_preview());
    assert_eq!(find(engine.links_view(), "a").category, "General");
    assert_eq!(ids(engine.links_view()), ["b", "c", "a"]);

    let groups = engine.grouped_view();
    assert_eq!(groups[0].links.len(), 3);

    let persisted = repo.links().await.unwrap();
    assert_eq!(find(&persisted, "a").category, "Work");

    engine.drag_start("b").unwrap();
    assert!(!engine.has_preview());
    assert_eq!(find(engine.links_view(), "a").category, "Work");
}

#[tokio::test]
async fn header_preview_appends_after_the_category_links_and_commits() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![
                link("w1", "Work", Some(0)),
                link("g1", "General", Some(1)),
                link("w2", "Work", Some(2)),
                link("g2", "General", Some(3)),
            ],
            categories: vec![category("work", "Work", Some(0))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("g1").unwrap();
    assert!(engine.drag_over("g1", "work"));
    assert_eq!(ids(engine.links_view()), ["w1", "w2", "g1", "g2"]);
    assert!(!engine.drag_over("g1", "work"));

    engine.drag_end(&repo, "g1", Some("w2")).await.unwrap();
    let links = repo.links().await.unwrap();
    assert_eq!(find(&links, "g1").category, "Work");
    for (index, item) in links.iter().enumerate() {
        assert_eq!(item.order, Some(index as i64));
    }
    assert!(!engine.has_preview());
}

#[tokio::test]
async fn link_commit_adopts_target_category_without_preview() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![link("a", "Work", Some(0)), link("b", "Home", Some(1))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("a").unwrap();
    engine.drag_end(&repo, "a", Some("b")).await.unwrap();
    let links = repo.links().await.unwrap();
    assert_eq!(ids(&links), ["b", "a"]);
    assert_eq!(find(&links, "a").category, "Home");
}

#[tokio::test]
async fn failed_commit_surfaces_error_and_keeps_computed_board() {
    let repo = DashboardRepository::new(FlakyStore::failing_on(&["b"]));
    let mut engine = seeded(
        &repo,
        Snapshot {
            notes: vec![note("a", Some(0)), note("c", Some(2))],
            ..Snapshot::default()
        },
    )
    .await;
    // "b" is only known to the board; its write fails.
    let mut board = engine.board().clone();
    board.notes.insert(1, note("b", Some(1)));
    engine.replace_board(board);

    engine.drag_start("c").unwrap();
    let err = engine.drag_end(&repo, "c", Some("a")).await.unwrap_err();
    assert!(matches!(
        err,
        ReorderError::Repo(RepoError::PartialFailure(_))
    ));
    assert_eq!(engine.state(), DragState::Idle);
    assert_eq!(ids(&engine.board().notes), ["c", "a", "b"]);

    let persisted = repo.notes().await.unwrap();
    assert_eq!(ids(&persisted), ["c", "a"]);

    engine.reload(&repo).await.unwrap();
    assert_eq!(ids(&engine.board().notes), ["c", "a"]);
}

#[tokio::test]
async fn dragging_category_onto_category_reindexes_categories() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            categories: vec![
                category("work", "Work", Some(0)),
                category("home", "Home", Some(1)),
                category("travel", "Travel", Some(2)),
            ],
            ..Snapshot::default()
        },
    )
    .await;

    assert_eq!(
        engine.drag_start("travel").unwrap(),
        DragSubject::Category("travel".to_string())
    );
    let outcome = engine.drag_end(&repo, "travel", Some("work")).await.unwrap();
    assert_eq!(
        outcome,
        CommitOutcome::Reordered {
            kind: EntityKind::Category,
            persisted: 3
        }
    );

    let categories = repo.categories().await.unwrap();
    assert_eq!(ids(&categories), ["travel", "work", "home"]);
    for (index, item) in categories.iter().enumerate() {
        assert_eq!(item.order, Some(index as i64));
    }

    let names: Vec<_> = group_links(&[], &categories)
        .into_iter()
        .map(|group| group.name)
        .collect();
    assert_eq!(names, ["General", "Travel", "Work", "Home"]);
}

#[tokio::test]
async fn later_header_preview_replaces_the_earlier_one() {
    let repo = DashboardRepository::in_memory();
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![
                link("a", "General", Some(0)),
                link("w", "Work", Some(1)),
                link("h", "Home", Some(2)),
            ],
            categories: vec![category("work", "Work", Some(0)), category("home", "Home", Some(1))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("a").unwrap();
    assert!(engine.drag_over("a", "work"));
    assert_eq!(find(engine.links_view(), "a").category, "Work");

    assert!(engine.drag_over("a", "home"));
    assert_eq!(find(engine.links_view(), "a").category, "Home");
    assert_eq!(ids(engine.links_view()), ["w", "h", "a"]);

    let groups = engine.grouped_view();
    assert_eq!(ids(&bucket(&groups, "Work").links), ["w"]);
    assert_eq!(ids(&bucket(&groups, "Home").links), ["h", "a"]);
    assert!(bucket(&groups, "General").links.is_empty());
}

#[tokio::test]
async fn persisted_id_with_header_prefix_is_a_link_target() {
    let repo = DashboardRepository::in_memory();
    let lookalike = category_header_id("Work");
    let mut engine = seeded(
        &repo,
        Snapshot {
            links: vec![link("a", "General", Some(0)), link(&lookalike, "General", Some(1))],
            categories: vec![category("work", "Work", Some(0))],
            ..Snapshot::default()
        },
    )
    .await;

    engine.drag_start("a").unwrap();
    let outcome = engine.drag_end(&repo, "a", Some(&lookalike)).await.unwrap();
    assert_eq!(
        outcome,
        CommitOutcome::Reordered {
            kind: EntityKind::Link,
            persisted: 2
        }
    );

    let links = repo.links().await.unwrap();
    assert_eq!(find(&links, "a").category, "General");
    assert_eq!(ids(&links), [lookalike.as_str(), "a"]);
}
