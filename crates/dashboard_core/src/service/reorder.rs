//! Drag-and-drop reorder engine.
//!
//! # Responsibility
//! - Track one active drag gesture (`Idle -> Dragging -> Idle`).
//! - Maintain an unpersisted link preview while the gesture hovers.
//! - Commit the gesture by densely reindexing the affected list and
//!   persisting every changed record.
//!
//! # Invariants
//! - Only one gesture is active; `drag_start` discards any earlier preview.
//! - `drag_over` never persists.
//! - `drag_end` always returns the engine to `Idle`, whatever the outcome.
//! - Cross-kind drops are no-ops.
//! - A failed commit is not retried; the board keeps the computed state
//!   until the caller reloads.

use crate::model::category::CategoryItem;
use crate::model::entity::{Entity, EntityId, EntityKind};
use crate::model::link::{same_category, LinkItem};
use crate::model::note::NoteItem;
use crate::model::ordering::{move_within, reindex, sort_by_order, Ordered};
use crate::model::snapshot::Snapshot;
use crate::repo::collection_repo::{DashboardRepository, RepoError};
use crate::repo::store::{DashboardStore, StoreAdapter};
use crate::service::grouping::{group_links, parse_category_header_id, LinkGroup};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Dragged element, resolved once when the gesture starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSubject {
    Link(EntityId),
    Note(EntityId),
    Category(EntityId),
}

impl DragSubject {
    pub fn id(&self) -> &str {
        match self {
            Self::Link(id) | Self::Note(id) | Self::Category(id) => id,
        }
    }
}

/// Element under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Link(EntityId),
    Note(EntityId),
    /// A persisted category; for links this is its folder header.
    Category(EntityId),
    /// Header of a bucket without a persisted category, by name.
    CategoryHeader(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging(DragSubject),
}

/// Result of a committed gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing to persist.
    NoOp,
    /// A list was reindexed; `persisted` records were written.
    Reordered { kind: EntityKind, persisted: usize },
    /// One link moved to another category.
    Recategorized { link_id: EntityId, category: String },
}

#[derive(Debug)]
pub enum ReorderError {
    /// `drag_start` referenced an id on no order-managed list.
    UnknownItem(String),
    /// Persisting the commit failed.
    Repo(RepoError),
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItem(id) => write!(f, "no draggable item with id {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReorderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UnknownItem(_) => None,
        }
    }
}

impl From<RepoError> for ReorderError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Persisted, order-managed lists the engine works on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub links: Vec<LinkItem>,
    pub notes: Vec<NoteItem>,
    pub categories: Vec<CategoryItem>,
}

impl Board {
    /// Builds a board, sorting every list by the ordering rules.
    pub fn new(
        mut links: Vec<LinkItem>,
        mut notes: Vec<NoteItem>,
        mut categories: Vec<CategoryItem>,
    ) -> Self {
        sort_by_order(&mut links);
        sort_by_order(&mut notes);
        sort_by_order(&mut categories);
        Self {
            links,
            notes,
            categories,
        }
    }
}

impl From<Snapshot> for Board {
    fn from(value: Snapshot) -> Self {
        Self::new(value.links, value.notes, value.categories)
    }
}

/// Single-gesture reorder state machine.
#[derive(Debug, Default)]
pub struct ReorderEngine {
    board: Board,
    dragging: Option<DragSubject>,
    preview: Option<Vec<LinkItem>>,
}

impl ReorderEngine {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            dragging: None,
            preview: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> DragState {
        match &self.dragging {
            Some(subject) => DragState::Dragging(subject.clone()),
            None => DragState::Idle,
        }
    }

    /// Replaces the persisted lists, ending any active gesture.
    pub fn replace_board(&mut self, board: Board) {
        self.board = board;
        self.dragging = None;
        self.preview = None;
    }

    /// Reloads the board from `repo`, discarding any diverged state.
    pub async fn reload<S: DashboardStore>(
        &mut self,
        repo: &DashboardRepository<S>,
    ) -> Result<(), ReorderError> {
        let snapshot = repo.load_all().await?;
        self.replace_board(Board::from(snapshot));
        Ok(())
    }

    /// Links as they should render now: the preview if any, else persisted.
    pub fn links_view(&self) -> &[LinkItem] {
        self.preview.as_deref().unwrap_or(&self.board.links)
    }

    /// Category buckets over `links_view`.
    pub fn grouped_view(&self) -> Vec<LinkGroup> {
        group_links(self.links_view(), &self.board.categories)
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Starts a gesture for `active_id`, superseding any prior one.
    pub fn drag_start(&mut self, active_id: &str) -> Result<DragSubject, ReorderError> {
        self.preview = None;
        self.dragging = None;

        let subject = self
            .resolve_subject(active_id)
            .ok_or_else(|| ReorderError::UnknownItem(active_id.to_string()))?;
        self.dragging = Some(subject.clone());
        Ok(subject)
    }

    /// Abandons the active gesture and its preview.
    pub fn drag_cancel(&mut self) {
        self.dragging = None;
        self.preview = None;
    }

    /// Updates the preview while a link hovers over `over_id`.
    ///
    /// Returns whether the preview changed. Only cross-category link moves
    /// produce a preview; everything else is left to the renderer.
    pub fn drag_over(&mut self, active_id: &str, over_id: &str) -> bool {
        let Some(DragSubject::Link(link_id)) = self.dragging.as_ref() else {
            return false;
        };
        if link_id != active_id || active_id == over_id {
            return false;
        }
        let Some(target) = self.resolve_target(over_id) else {
            return false;
        };

        let mut view = self.links_view().to_vec();
        let Some(from) = position_of(&view, active_id) else {
            return false;
        };

        let changed = match &target {
            DropTarget::Link(over_link) => {
                let Some(to) = position_of(&view, over_link) else {
                    return false;
                };
                if same_category(&view[from].category, &view[to].category) {
                    return false;
                }
                view[from].category = view[to].category.clone();
                move_within(&mut view, from, to)
            }
            DropTarget::Category(_) | DropTarget::CategoryHeader(_) => {
                let Some(name) = self.header_name(&target) else {
                    return false;
                };
                if same_category(&view[from].category, &name) {
                    return false;
                }
                let mut link = view.remove(from);
                link.category = name;
                let insert_at = view
                    .iter()
                    .rposition(|item| item.in_category(&link.category))
                    .map_or(view.len(), |index| index + 1);
                view.insert(insert_at, link);
                true
            }
            DropTarget::Note(_) => false,
        };

        if changed {
            reindex(&mut view);
            self.preview = Some(view);
        }
        changed
    }

    /// Commits the gesture and returns to `Idle`.
    ///
    /// On a persistence failure the board keeps the computed lists and the
    /// error is returned; callers reconcile with `reload`.
    pub async fn drag_end<S: DashboardStore>(
        &mut self,
        repo: &DashboardRepository<S>,
        active_id: &str,
        over_id: Option<&str>,
    ) -> Result<CommitOutcome, ReorderError> {
        let started = self.dragging.take();
        let preview = self.preview.take();

        let Some(over_id) = over_id.filter(|over| *over != active_id) else {
            return Ok(CommitOutcome::NoOp);
        };
        let subject = match started {
            Some(subject) if subject.id() == active_id => Some(subject),
            _ => self.resolve_subject(active_id),
        };
        let (Some(subject), Some(target)) = (subject, self.resolve_target(over_id)) else {
            warn!("event=reorder_commit module=reorder status=skipped reason=unknown_id");
            return Ok(CommitOutcome::NoOp);
        };

        let result = match (subject, target) {
            (DragSubject::Link(active), DropTarget::Link(over)) => {
                self.commit_link_move(repo, preview, &active, &over).await
            }
            (DragSubject::Link(active), target @ DropTarget::Category(_))
            | (DragSubject::Link(active), target @ DropTarget::CategoryHeader(_)) => {
                match self.header_name(&target) {
                    Some(name) => self.commit_recategorize(repo, &active, name).await,
                    None => Ok(CommitOutcome::NoOp),
                }
            }
            (DragSubject::Note(active), DropTarget::Note(over)) => {
                match reorder_list(&self.board.notes, &active, &over) {
                    Some((notes, changed)) => {
                        self.board.notes = notes;
                        persist_reorder(repo, &changed).await
                    }
                    None => Ok(CommitOutcome::NoOp),
                }
            }
            (DragSubject::Category(active), DropTarget::Category(over)) => {
                match reorder_list(&self.board.categories, &active, &over) {
                    Some((categories, changed)) => {
                        self.board.categories = categories;
                        persist_reorder(repo, &changed).await
                    }
                    None => Ok(CommitOutcome::NoOp),
                }
            }
            _ => Ok(CommitOutcome::NoOp),
        };

        match &result {
            Ok(CommitOutcome::NoOp) => {}
            Ok(outcome) => info!(
                "event=reorder_commit module=reorder status=ok outcome={}",
                outcome_label(outcome)
            ),
            Err(err) => error!(
                "event=reorder_commit module=reorder status=error error={}",
                err
            ),
        }
        result
    }

    async fn commit_link_move<S: DashboardStore>(
        &mut self,
        repo: &DashboardRepository<S>,
        preview: Option<Vec<LinkItem>>,
        active_id: &str,
        over_id: &str,
    ) -> Result<CommitOutcome, ReorderError> {
        let mut working = preview.unwrap_or_else(|| self.board.links.clone());
        let (Some(from), Some(to)) = (
            position_of(&working, active_id),
            position_of(&working, over_id),
        ) else {
            return Ok(CommitOutcome::NoOp);
        };

        if !same_category(&working[from].category, &working[to].category) {
            working[from].category = working[to].category.clone();
        }
        move_within(&mut working, from, to);
        reindex(&mut working);

        let changed = changed_records(&self.board.links, &working);
        self.board.links = working;
        persist_reorder(repo, &changed).await
    }

    async fn commit_recategorize<S: DashboardStore>(
        &mut self,
        repo: &DashboardRepository<S>,
        link_id: &str,
        category: String,
    ) -> Result<CommitOutcome, ReorderError> {
        let Some(index) = position_of(&self.board.links, link_id) else {
            return Ok(CommitOutcome::NoOp);
        };
        if same_category(&self.board.links[index].category, &category) {
            return Ok(CommitOutcome::NoOp);
        }

        self.board.links[index].category = category.clone();
        repo.update(&self.board.links[index]).await?;
        Ok(CommitOutcome::Recategorized {
            link_id: link_id.to_string(),
            category,
        })
    }

    fn resolve_subject(&self, id: &str) -> Option<DragSubject> {
        if contains_id(&self.board.links, id) {
            Some(DragSubject::Link(id.to_string()))
        } else if contains_id(&self.board.notes, id) {
            Some(DragSubject::Note(id.to_string()))
        } else if contains_id(&self.board.categories, id) {
            Some(DragSubject::Category(id.to_string()))
        } else {
            None
        }
    }

    /// Persisted ids win over the synthetic header prefix.
    fn resolve_target(&self, id: &str) -> Option<DropTarget> {
        match self.resolve_subject(id) {
            Some(DragSubject::Link(id)) => Some(DropTarget::Link(id)),
            Some(DragSubject::Note(id)) => Some(DropTarget::Note(id)),
            Some(DragSubject::Category(id)) => Some(DropTarget::Category(id)),
            None => parse_category_header_id(id)
                .map(|name| DropTarget::CategoryHeader(name.to_string())),
        }
    }

    fn header_name(&self, target: &DropTarget) -> Option<String> {
        match target {
            DropTarget::CategoryHeader(name) => Some(name.clone()),
            DropTarget::Category(id) => self
                .board
                .categories
                .iter()
                .find(|category| category.id == *id)
                .map(|category| category.name.clone()),
            _ => None,
        }
    }
}

async fn persist_reorder<T, S>(
    repo: &DashboardRepository<S>,
    changed: &[T],
) -> Result<CommitOutcome, ReorderError>
where
    T: Entity,
    S: DashboardStore + StoreAdapter<T>,
{
    let persisted = repo.update_many(changed).await?;
    Ok(CommitOutcome::Reordered {
        kind: T::KIND,
        persisted,
    })
}

/// Moves `active_id` onto `over_id` and densely reindexes a copy of `list`.
///
/// Returns the new list and the records that differ from `list`.
fn reorder_list<T>(list: &[T], active_id: &str, over_id: &str) -> Option<(Vec<T>, Vec<T>)>
where
    T: Ordered + PartialEq,
{
    let mut working = list.to_vec();
    let from = position_of(&working, active_id)?;
    let to = position_of(&working, over_id)?;
    move_within(&mut working, from, to);
    reindex(&mut working);
    let changed = changed_records(list, &working);
    Some((working, changed))
}

fn changed_records<T: Entity + PartialEq>(before: &[T], after: &[T]) -> Vec<T> {
    after
        .iter()
        .filter(|item| {
            before
                .iter()
                .find(|previous| previous.id() == item.id())
                .map_or(true, |previous| previous != *item)
        })
        .cloned()
        .collect()
}

fn position_of<T: Entity>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

fn contains_id<T: Entity>(items: &[T], id: &str) -> bool {
    position_of(items, id).is_some()
}

fn outcome_label(outcome: &CommitOutcome) -> String {
    match outcome {
        CommitOutcome::NoOp => "noop".to_string(),
        CommitOutcome::Reordered { kind, persisted } => {
            format!("reordered kind={kind} persisted={persisted}")
        }
        CommitOutcome::Recategorized { .. } => "recategorized kind=link persisted=1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{changed_records, reorder_list};
    use crate::model::note::NoteItem;

    fn note(id: &str, order: i64) -> NoteItem {
        NoteItem {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            created_at: 0,
            order: Some(order),
        }
    }

    #[test]
    fn reorder_list_reports_only_changed_records() {
        let notes = vec![note("a", 0), note("b", 1), note("c", 2), note("d", 3)];
        let (reordered, changed) = reorder_list(&notes, "c", "b").unwrap();

        let ids: Vec<_> = reordered.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b", "d"]);
        let changed_ids: Vec<_> = changed.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(changed_ids, ["c", "b"]);
    }

    #[test]
    fn sparse_orders_are_densified_on_commit() {
        let notes = vec![note("a", -3), note("b", 7)];
        let (reordered, changed) = reorder_list(&notes, "a", "b").unwrap();
        assert_eq!(reordered[0].order, Some(0));
        assert_eq!(reordered[1].order, Some(1));
        assert_eq!(changed.len(), 2);
        assert!(changed_records(&reordered, &reordered).is_empty());
    }
}
