//! User-initiated mutations.
//!
//! Each action goes to the backend first and is then followed by a full
//! resync, whether or not the action succeeded. Nothing is applied to the
//! local snapshot optimistically; the backend stays the only source of truth.

use std::future::Future;

use crate::client::RemoteStore;
use crate::error::{Error, Result};
use crate::models::{EntryId, FlagKind, FlagUpdate};
use crate::sync::Synchronizer;
use crate::view::{sort_for_display, View};

const NOTHING_TO_CLEAR_NOTICE: &str = "No items to clear!";

/// Asks the user to approve a bulk clear.
pub trait Confirmer {
    /// Return `true` to proceed. Called at most once per plan.
    fn confirm(&self, plan: &BulkClearPlan) -> impl Future<Output = bool> + Send;
}

/// Confirmer with a fixed answer, for `--yes` style flows.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirmer for FixedAnswer {
    async fn confirm(&self, _plan: &BulkClearPlan) -> bool {
        self.0
    }
}

/// Target set of a bulk clear, frozen when the plan is made.
///
/// A poll that lands after planning does not change which ids are deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkClearPlan {
    view: View,
    ids: Vec<EntryId>,
}

impl BulkClearPlan {
    pub const fn view(&self) -> View {
        self.view
    }

    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub const fn prompt(&self) -> &'static str {
        self.view.clear_prompt()
    }
}

/// What happened to each id of an executed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkClearReport {
    pub view: View,
    pub deleted: Vec<EntryId>,
    pub failed: Vec<EntryId>,
    /// Whether the closing resync succeeded
    pub resynced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkClearOutcome {
    Cancelled,
    Cleared(BulkClearReport),
}

/// Applies single user actions against the store and forces a resync.
pub struct MutationCoordinator<S> {
    sync: Synchronizer<S>,
}

impl<S> Clone for MutationCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            sync: self.sync.clone(),
        }
    }
}

impl<S: RemoteStore + 'static> MutationCoordinator<S> {
    pub const fn new(sync: Synchronizer<S>) -> Self {
        Self { sync }
    }

    pub const fn synchronizer(&self) -> &Synchronizer<S> {
        &self.sync
    }

    pub async fn toggle_pin(&self, id: EntryId) -> Result<()> {
        self.set_flag(id, FlagKind::Pin, FlagUpdate::Toggle).await
    }

    pub async fn toggle_favourite(&self, id: EntryId) -> Result<()> {
        self.set_flag(id, FlagKind::Favourite, FlagUpdate::Toggle)
            .await
    }

    pub async fn set_flag(&self, id: EntryId, kind: FlagKind, update: FlagUpdate) -> Result<()> {
        tracing::info!(%id, %kind, ?update, "updating flag");
        let outcome = self.sync.store().set_flag(id, kind, update).await;
        self.finish(outcome, &format!("Failed to update {kind} for entry {id}"))
            .await
    }

    pub async fn delete(&self, id: EntryId) -> Result<()> {
        tracing::info!(%id, "deleting entry");
        let outcome = self.sync.store().delete_entry(id).await;
        self.finish(outcome, &format!("Failed to delete entry {id}"))
            .await
    }

    /// Always resync; report the mutation's error ahead of the resync's.
    async fn finish(&self, outcome: Result<()>, failure_notice: &str) -> Result<()> {
        if let Err(error) = &outcome {
            tracing::warn!(%error, "mutation failed; resyncing anyway");
            self.sync.notices().error(failure_notice);
        }
        let resync = self.sync.resync().await;
        outcome?;
        resync.map(|_| ())
    }

    /// Freeze the ids currently visible in `view`.
    ///
    /// An empty view yields `EmptyTargetSet` and a notice; nothing is sent.
    pub fn plan_bulk_clear(&self, view: View) -> Result<BulkClearPlan> {
        let snapshot = self.sync.cache().current();
        let mut targets = snapshot
            .entries()
            .iter()
            .filter(|entry| view.includes(entry))
            .cloned()
            .collect::<Vec<_>>();

        if targets.is_empty() {
            self.sync.notices().info(NOTHING_TO_CLEAR_NOTICE);
            return Err(Error::EmptyTargetSet(format!(
                "no entries in the {} view",
                view.label()
            )));
        }

        sort_for_display(&mut targets);
        Ok(BulkClearPlan {
            view,
            ids: targets.into_iter().map(|entry| entry.id).collect(),
        })
    }

    /// Plan, confirm once, then execute.
    pub async fn bulk_clear<C: Confirmer>(&self, view: View, confirmer: &C) -> Result<BulkClearOutcome> {
        let plan = self.plan_bulk_clear(view)?;
        if !confirmer.confirm(&plan).await {
            tracing::info!(view = view.label(), "bulk clear cancelled");
            return Ok(BulkClearOutcome::Cancelled);
        }
        Ok(BulkClearOutcome::Cleared(self.execute_bulk_clear(plan).await))
    }

    /// Delete the planned ids one at a time, then resync once.
    pub async fn execute_bulk_clear(&self, plan: BulkClearPlan) -> BulkClearReport {
        let BulkClearPlan { view, ids } = plan;
        tracing::info!(view = view.label(), count = ids.len(), "bulk clear started");

        let mut deleted = Vec::with_capacity(ids.len());
        let mut failed = Vec::new();
        for id in ids {
            match self.sync.store().delete_entry(id).await {
                Ok(()) => deleted.push(id),
                Err(error) => {
                    tracing::warn!(%id, %error, "bulk clear delete failed");
                    failed.push(id);
                }
            }
        }

        let resynced = self.sync.resync().await.is_ok();
        if failed.is_empty() {
            self.sync.notices().info(view.cleared_message());
        } else {
            self.sync.notices().error(format!(
                "Could not delete {} of {} entries",
                failed.len(),
                failed.len() + deleted.len()
            ));
        }

        BulkClearReport {
            view,
            deleted,
            failed,
            resynced,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::ClipboardEntry;
    use crate::notice::NoticeBoard;
    use crate::snapshot::SnapshotCache;
    use crate::test_support::{at, Call, FakeStore};

    struct CountingConfirmer {
        answer: bool,
        asked: AtomicUsize,
    }

    impl CountingConfirmer {
        const fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: AtomicUsize::new(0),
            }
        }

        fn asked(&self) -> usize {
            self.asked.load(Ordering::SeqCst)
        }
    }

    impl Confirmer for CountingConfirmer {
        async fn confirm(&self, _plan: &BulkClearPlan) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn scenario() -> Vec<ClipboardEntry> {
        vec![
            ClipboardEntry::new(1, "hello world", at(10)),
            ClipboardEntry::new(2, "goodbye", at(9))
                .favourite(true)
                .pinned(true),
        ]
    }

    async fn coordinator(entries: Vec<ClipboardEntry>) -> MutationCoordinator<FakeStore> {
        let sync = Synchronizer::new(
            Arc::new(FakeStore::with_entries(entries)),
            SnapshotCache::new(),
            NoticeBoard::new(std::time::Duration::from_secs(60), 4),
        );
        sync.resync().await.unwrap();
        sync.store().clear_calls();
        MutationCoordinator::new(sync)
    }

    fn store(coordinator: &MutationCoordinator<FakeStore>) -> &FakeStore {
        coordinator.synchronizer().store()
    }

    fn cached(coordinator: &MutationCoordinator<FakeStore>, id: i64) -> Option<ClipboardEntry> {
        coordinator
            .synchronizer()
            .cache()
            .current()
            .entries()
            .iter()
            .find(|entry| entry.id == EntryId::new(id))
            .cloned()
    }

    #[tokio::test]
    async fn pin_is_visible_after_resync() {
        let coordinator = coordinator(scenario()).await;
        assert!(!cached(&coordinator, 1).unwrap().is_pinned);

        coordinator.toggle_pin(EntryId::new(1)).await.unwrap();

        assert_eq!(
            store(&coordinator).calls(),
            vec![
                Call::SetFlag(EntryId::new(1), FlagKind::Pin, FlagUpdate::Toggle),
                Call::List
            ]
        );
        assert!(cached(&coordinator, 1).unwrap().is_pinned);
    }

    #[tokio::test]
    async fn favourite_moves_entry_between_views() {
        let coordinator = coordinator(scenario()).await;
        coordinator.toggle_favourite(EntryId::new(1)).await.unwrap();
        assert!(cached(&coordinator, 1).unwrap().is_favourite);

        coordinator
            .set_flag(EntryId::new(1), FlagKind::Favourite, FlagUpdate::Set(false))
            .await
            .unwrap();
        assert!(!cached(&coordinator, 1).unwrap().is_favourite);
    }

    #[tokio::test]
    async fn failed_mutation_still_resyncs() {
        let coordinator = coordinator(scenario()).await;
        store(&coordinator).fail_writes(true);
        store(&coordinator).set_entries(vec![ClipboardEntry::new(9, "new", at(20))]);

        let error = coordinator.toggle_pin(EntryId::new(1)).await.unwrap_err();
        assert!(error.is_unreachable());

        assert_eq!(
            store(&coordinator).calls(),
            vec![
                Call::SetFlag(EntryId::new(1), FlagKind::Pin, FlagUpdate::Toggle),
                Call::List
            ]
        );
        assert!(cached(&coordinator, 9).is_some());
        assert!(cached(&coordinator, 1).is_none());
    }

    #[tokio::test]
    async fn delete_removes_entry_after_resync() {
        let coordinator = coordinator(scenario()).await;
        coordinator.delete(EntryId::new(2)).await.unwrap();

        assert_eq!(
            store(&coordinator).calls(),
            vec![Call::Delete(EntryId::new(2)), Call::List]
        );
        assert!(cached(&coordinator, 2).is_none());
    }

    #[tokio::test]
    async fn bulk_clear_all_deletes_then_resyncs_once() {
        let coordinator = coordinator(scenario()).await;
        let confirmer = CountingConfirmer::new(true);

        let outcome = coordinator.bulk_clear(View::All, &confirmer).await.unwrap();

        assert_eq!(confirmer.asked(), 1);
        assert_eq!(
            store(&coordinator).calls(),
            vec![Call::Delete(EntryId::new(1)), Call::List]
        );
        assert_eq!(
            outcome,
            BulkClearOutcome::Cleared(BulkClearReport {
                view: View::All,
                deleted: vec![EntryId::new(1)],
                failed: Vec::new(),
                resynced: true,
            })
        );
        assert!(cached(&coordinator, 2).is_some());
    }

    #[tokio::test]
    async fn bulk_clear_resyncs_even_when_deletes_fail() {
        let coordinator = coordinator(scenario()).await;
        store(&coordinator).fail_writes(true);

        let outcome = coordinator
            .bulk_clear(View::All, &FixedAnswer(true))
            .await
            .unwrap();

        assert_eq!(
            store(&coordinator).calls(),
            vec![Call::Delete(EntryId::new(1)), Call::List]
        );
        let BulkClearOutcome::Cleared(report) = outcome else {
            panic!("expected clear to run");
        };
        assert_eq!(report.failed, vec![EntryId::new(1)]);
        assert!(report.deleted.is_empty());
    }

    #[tokio::test]
    async fn empty_view_short_circuits_before_confirm() {
        let coordinator = coordinator(vec![ClipboardEntry::new(1, "plain", at(1))]).await;
        let confirmer = CountingConfirmer::new(true);

        let error = coordinator
            .bulk_clear(View::Favorites, &confirmer)
            .await
            .unwrap_err();

        assert!(matches!(error, Error::EmptyTargetSet(_)));
        assert_eq!(confirmer.asked(), 0);
        assert!(store(&coordinator).calls().is_empty());
        let notices = coordinator.synchronizer().notices().active();
        assert_eq!(notices[0].message, "No items to clear!");
    }

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let coordinator = coordinator(scenario()).await;
        let outcome = coordinator
            .bulk_clear(View::Favorites, &FixedAnswer(false))
            .await
            .unwrap();

        assert_eq!(outcome, BulkClearOutcome::Cancelled);
        assert!(store(&coordinator).calls().is_empty());
    }

    #[tokio::test]
    async fn planned_targets_survive_a_later_poll() {
        let coordinator = coordinator(scenario()).await;
        let plan = coordinator.plan_bulk_clear(View::All).unwrap();
        assert_eq!(plan.ids(), &[EntryId::new(1)]);
        assert_eq!(plan.prompt(), "Are you sure you want to clear all items?");

        // A poll lands between confirmation and execution with a new entry.
        let mut entries = store(&coordinator).entries();
        entries.push(ClipboardEntry::new(3, "arrived late", at(30)));
        store(&coordinator).set_entries(entries);
        coordinator.synchronizer().resync().await.unwrap();
        store(&coordinator).clear_calls();

        let report = coordinator.execute_bulk_clear(plan).await;

        assert_eq!(report.deleted, vec![EntryId::new(1)]);
        assert_eq!(
            store(&coordinator).calls(),
            vec![Call::Delete(EntryId::new(1)), Call::List]
        );
        assert!(cached(&coordinator, 3).is_some());
    }

    #[tokio::test]
    async fn bulk_clear_favourites_deletes_in_display_order() {
        let coordinator = coordinator(vec![
            ClipboardEntry::new(1, "old fav", at(1)).favourite(true),
            ClipboardEntry::new(2, "new fav", at(5)).favourite(true),
            ClipboardEntry::new(3, "pinned fav", at(0))
                .favourite(true)
                .pinned(true),
            ClipboardEntry::new(4, "not fav", at(9)),
        ])
        .await;

        coordinator
            .bulk_clear(View::Favorites, &FixedAnswer(true))
            .await
            .unwrap();

        assert_eq!(
            store(&coordinator).calls(),
            vec![
                Call::Delete(EntryId::new(3)),
                Call::Delete(EntryId::new(2)),
                Call::Delete(EntryId::new(1)),
                Call::List
            ]
        );
        let remaining = store(&coordinator).entries();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, EntryId::new(4));
        let messages = coordinator
            .synchronizer()
            .notices()
            .active()
            .into_iter()
            .map(|notice| notice.message)
            .collect::<Vec<_>>();
        assert!(messages.contains(&"Cleared Favorites".to_string()));
    }
}
