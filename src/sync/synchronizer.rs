//! Subscription synchronizer
//!
//! Keeps the broker subscriptions in step with the regions drawn on the map.
//!
//! Region edits arrive at drag rate. They are buffered by a background
//! debounce task and only committed after a quiet window; each commit runs
//! one sync round against the attached client:
//!
//! 1. `unsubscribe_all()` (a failure is logged and the round continues)
//! 2. subscribe every covering filter of every region, concurrently, or the
//!    catch-all filter when no regions are drawn
//! 3. record the filters that succeeded as the active set
//!
//! Rounds never overlap. Edits that arrive while a round is in flight wait
//! for the next quiet window. Only the latest uncommitted edit is kept, so
//! edits made before the debounce task starts do not pile up.

use super::retry::RetryPolicy;
use super::state::{SubscriptionSet, SyncPhase, SyncReport};
use crate::filter::{CoveringFilters, GridGenerator, TopicFilter};
use crate::geometry::DrawnShape;
use crate::messaging::{MessageHandler, MessagingClient};
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Callback run with the newly committed regions before each sync
pub type CommitHook = Arc<dyn Fn(&[DrawnShape]) + Send + Sync>;

/// Tuning for the synchronizer
#[derive(Debug, Clone)]
pub struct SynchronizerOptions {
    /// Quiet window an edit must survive before it is committed
    pub debounce: Duration,
    /// Applied to each `unsubscribe_all` and `subscribe` call
    pub retry: RetryPolicy,
}

impl Default for SynchronizerOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        }
    }
}

enum Command {
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Drives a [`MessagingClient`] from debounced region edits
pub struct SubscriptionSynchronizer {
    options: SynchronizerOptions,
    generator: GridGenerator,
    handler: MessageHandler,
    commit_hooks: Vec<CommitHook>,
    client: RwLock<Option<Arc<dyn MessagingClient>>>,
    phase: RwLock<SyncPhase>,
    committed: RwLock<Vec<DrawnShape>>,
    active: RwLock<SubscriptionSet>,
    /// Held for the duration of a sync round
    round_lock: Mutex<()>,
    rounds: AtomicU64,
    /// Latest uncommitted region set; each edit replaces the last
    pending: watch::Sender<Option<Vec<DrawnShape>>>,
    commands: mpsc::UnboundedSender<Command>,
    inbox: Mutex<Option<mpsc::UnboundedReceiver<Command>>>,
    started: AtomicBool,
    stopped: AtomicBool,
    reports: watch::Sender<Option<SyncReport>>,
}

impl std::fmt::Debug for SubscriptionSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSynchronizer")
            .field("options", &self.options)
            .field("generator", &self.generator)
            .field("rounds", &self.rounds.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl SubscriptionSynchronizer {
    /// Create an idle synchronizer routing every matched message to `handler`
    pub fn new(options: SynchronizerOptions, generator: GridGenerator, handler: MessageHandler) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(None);
        let (reports, _) = watch::channel(None);
        Self {
            options,
            generator,
            handler,
            commit_hooks: Vec::new(),
            client: RwLock::new(None),
            phase: RwLock::new(SyncPhase::Idle),
            committed: RwLock::new(Vec::new()),
            active: RwLock::new(SubscriptionSet::new()),
            round_lock: Mutex::new(()),
            rounds: AtomicU64::new(0),
            pending,
            commands,
            inbox: Mutex::new(Some(inbox)),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            reports,
        }
    }

    /// Run `hook` each time a region set is committed
    pub fn with_commit_hook(mut self, hook: CommitHook) -> Self {
        self.commit_hooks.push(hook);
        self
    }

    /// Seed the committed regions without syncing
    pub fn with_regions(mut self, regions: Vec<DrawnShape>) -> Self {
        *self.committed.get_mut() = regions;
        self
    }

    pub fn options(&self) -> &SynchronizerOptions {
        &self.options
    }

    pub async fn phase(&self) -> SyncPhase {
        *self.phase.read().await
    }

    /// Regions of the last commit
    pub async fn committed_regions(&self) -> Vec<DrawnShape> {
        self.committed.read().await.clone()
    }

    /// Filters currently believed subscribed, in sorted order
    pub async fn active_filters(&self) -> Vec<TopicFilter> {
        self.active.read().await.filters()
    }

    /// Number of sync rounds run so far
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::SeqCst)
    }

    /// Watch the report of the latest sync round
    pub fn subscribe_reports(&self) -> watch::Receiver<Option<SyncReport>> {
        self.reports.subscribe()
    }

    /// Attach a client and run the initial sync.
    ///
    /// A client that is already attached is replaced once any round in
    /// flight has settled.
    pub async fn attach(&self, client: Arc<dyn MessagingClient>) -> Option<SyncReport> {
        {
            let _round = self.round_lock.lock().await;
            let replaced = self.client.write().await.replace(client).is_some();
            if replaced {
                tracing::warn!("Replacing attached messaging client");
            }
            *self.phase.write().await = SyncPhase::Active;
        }
        tracing::info!("Messaging client attached");

        self.sync().await
    }

    /// Detach the client, returning it.
    ///
    /// Broker-side subscriptions are left for the caller to tear down.
    pub async fn detach(&self) -> Option<Arc<dyn MessagingClient>> {
        let _round = self.round_lock.lock().await;
        let client = self.client.write().await.take();
        *self.phase.write().await = SyncPhase::Idle;
        self.active.write().await.clear();
        if client.is_some() {
            tracing::info!("Messaging client detached");
        }
        client
    }

    /// Buffer a new full region set, replacing any uncommitted one. It is
    /// committed once no further edit arrives within the debounce window.
    pub fn on_regions_changed(&self, regions: Vec<DrawnShape>) {
        if self.stopped.load(Ordering::SeqCst) {
            tracing::warn!("Debounce task has stopped; region edit dropped");
            return;
        }
        tracing::trace!(regions = regions.len(), "Region edit buffered");
        self.pending.send_replace(Some(regions));
    }

    /// Commit any buffered edit now instead of waiting out the window.
    ///
    /// Returns after the resulting sync round, if any, has settled.
    pub async fn flush(&self) {
        if self.stopped.load(Ordering::SeqCst) {
            tracing::warn!("Debounce task has stopped; nothing to flush");
            return;
        }
        if !self.started.load(Ordering::SeqCst) {
            self.commit_pending().await;
            return;
        }

        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Flush(ack)).is_err() {
            tracing::warn!("Debounce task has stopped; nothing to flush");
            return;
        }
        let _ = done.await;
    }

    /// Stop the debounce task. Buffered edits that were not flushed are
    /// discarded.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Start the background debounce task
    pub fn start_background_debounce(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let Some(inbox) = self.inbox.lock().await.take() else {
                tracing::warn!("Debounce task already started");
                return;
            };
            let edits = self.pending.subscribe();
            self.started.store(true, Ordering::SeqCst);

            tracing::info!(
                debounce_ms = self.options.debounce.as_millis() as u64,
                "Starting region debounce"
            );
            self.run_debounce(inbox, edits).await;
            tracing::info!("Region debounce stopped");
        })
    }

    async fn run_debounce(
        &self,
        mut inbox: mpsc::UnboundedReceiver<Command>,
        mut edits: watch::Receiver<Option<Vec<DrawnShape>>>,
    ) {
        // subscribing marks an edit buffered before start as already seen
        let mut armed = edits.borrow().is_some();

        loop {
            tokio::select! {
                changed = edits.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    armed = true;
                }
                command = inbox.recv() => match command {
                    Some(Command::Flush(ack)) => {
                        armed = false;
                        self.commit_pending().await;
                        let _ = ack.send(());
                    }
                    Some(Command::Shutdown) | None => {
                        if self.take_pending().is_some() {
                            tracing::debug!("Discarding uncommitted region edit");
                        }
                        break;
                    }
                },
                _ = tokio::time::sleep(self.options.debounce), if armed => {
                    armed = false;
                    self.commit_pending().await;
                }
            }
        }
    }

    /// Take the buffered edit without waking the debounce task
    fn take_pending(&self) -> Option<Vec<DrawnShape>> {
        let mut taken = None;
        self.pending.send_if_modified(|slot| {
            taken = slot.take();
            false
        });
        taken
    }

    async fn commit_pending(&self) {
        if let Some(regions) = self.take_pending() {
            self.commit(regions).await;
        }
    }

    async fn commit(&self, regions: Vec<DrawnShape>) {
        tracing::debug!(regions = regions.len(), "Committing region set");
        for hook in &self.commit_hooks {
            hook(&regions);
        }
        *self.committed.write().await = regions;

        if self.sync().await.is_none() {
            tracing::debug!("No messaging client attached; regions committed without sync");
        }
    }

    /// Run one sync round against the attached client.
    ///
    /// Returns `None` when no client is attached.
    pub async fn sync(&self) -> Option<SyncReport> {
        let _round = self.round_lock.lock().await;
        let client = self.client.read().await.clone()?;

        *self.phase.write().await = SyncPhase::Syncing;
        let started = Instant::now();
        let round = self.rounds.fetch_add(1, Ordering::SeqCst) + 1;

        let regions = self.committed.read().await.clone();
        let (plan, regions_skipped) = self.plan(&regions);

        let retry = self.options.retry;
        let unsubscribe_all_ok = match retry.run("unsubscribe_all", || client.unsubscribe_all()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(round, error = %e, "unsubscribe_all failed; subscribing new set anyway");
                false
            }
        };
        self.active.write().await.clear();

        let outcomes = join_all(plan.iter().map(|filter| {
            let client = Arc::clone(&client);
            let handler = self.handler.clone();
            async move {
                let result = retry
                    .run("subscribe", || client.subscribe(filter, handler.clone()))
                    .await;
                (filter, result)
            }
        }))
        .await;

        let mut failed = Vec::new();
        {
            let mut active = self.active.write().await;
            for (filter, result) in outcomes {
                match result {
                    Ok(()) => {
                        active.insert(filter.clone(), self.handler.clone());
                    }
                    Err(e) => {
                        tracing::warn!(round, filter = %filter, error = %e, "Subscription failed; filter dropped");
                        failed.push(filter.clone());
                    }
                }
            }
        }

        *self.phase.write().await = SyncPhase::Active;

        let report = SyncReport {
            round,
            regions: regions.len(),
            regions_skipped,
            planned: plan.len(),
            subscribed: plan.len() - failed.len(),
            failed,
            unsubscribe_all_ok,
            duration_ms: started.elapsed().as_millis() as u64,
            completed_at: Utc::now(),
        };

        tracing::info!(
            round,
            regions = report.regions,
            skipped = report.regions_skipped,
            planned = report.planned,
            subscribed = report.subscribed,
            failed = report.failed.len(),
            duration_ms = report.duration_ms,
            "Sync round complete"
        );

        self.reports.send_replace(Some(report.clone()));
        Some(report)
    }

    /// Distinct filters for a region set, in generation order, plus the
    /// number of regions that had to be skipped
    fn plan(&self, regions: &[DrawnShape]) -> (Vec<TopicFilter>, usize) {
        if regions.is_empty() {
            return (vec![self.generator.layout().catch_all()], 0);
        }

        let mut seen = HashSet::new();
        let mut plan = Vec::new();
        let mut skipped = 0;

        for (index, drawn) in regions.iter().enumerate() {
            match drawn.to_region() {
                Ok(region) => {
                    for filter in region.covering_filters(&self.generator) {
                        if seen.insert(filter.clone()) {
                            plan.push(filter);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(index, shape = %drawn.shape, error = %e, "Skipping unusable region");
                    skipped += 1;
                }
            }
        }

        (plan, skipped)
    }
}
