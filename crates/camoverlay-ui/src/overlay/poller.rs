//! Poll loop
//!
//! Every tick spawns one fetch tagged with a ticket from a monotonic
//! [`RequestSequencer`]. Polling consumes the step at the source, so a polled
//! step is parked in a [`PendingStep`] until its homography arrives; a fetch
//! that is aborted, times out or fails leaves it parked for the next tick.
//! A new tick aborts the previous fetch only while it is still polling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, trace, warn};

use camoverlay_communication::CommandSource;
use camoverlay_core::{Homography, Result, SourceError, Step, StepType};
use camoverlay_settings::PollingSettings;
use camoverlay_visualizer::DrawingSurface;

use super::compositor::Compositor;

/// A polled step with the homography to draw it through
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedStep {
    pub step: Step,
    pub homography: Homography,
}

/// Monotonic request tickets
///
/// Only results that carry a step are sequenced; an empty poll never makes
/// an older step stale.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
    applied: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a new request
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a result with `ticket` may be applied; accepting it makes
    /// every older ticket stale
    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}

/// A step taken from the source but not yet handed to the compositor
#[derive(Debug, Default)]
pub struct PendingStep {
    slot: Mutex<Option<Step>>,
}

impl PendingStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a consumed step is waiting for its homography
    pub fn is_held(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn get(&self) -> Option<Step> {
        self.slot.lock().clone()
    }

    /// Park a freshly polled step, replacing an older one
    fn park(&self, step: Step) {
        *self.slot.lock() = Some(step);
    }

    /// Forget `step` once it is on its way to the compositor
    fn release(&self, step: &Step) {
        let mut slot = self.slot.lock();
        if slot.as_ref() == Some(step) {
            *slot = None;
        }
    }
}

/// Poll once; for a drawable step, fetch its homography before returning
///
/// A newly polled step replaces the parked one. With nothing new, the parked
/// step is retried. No stored homography means identity.
pub async fn fetch_step(
    source: &dyn CommandSource,
    pending: &PendingStep,
) -> Result<Option<FetchedStep>> {
    let step = match source.poll().await? {
        Some(step) => {
            pending.park(step.clone());
            step
        }
        None => match pending.get() {
            Some(step) => {
                debug!("Retrying parked step '{}'", step.name);
                step
            }
            None => return Ok(None),
        },
    };

    let homography = if step.step_type == StepType::Step {
        match source.get_homography().await? {
            Some(record) => Homography::from_record(&record)?,
            None => Homography::identity(),
        }
    } else {
        Homography::identity()
    };

    pending.release(&step);
    Ok(Some(FetchedStep { step, homography }))
}

async fn fetch_with_timeout(
    source: &dyn CommandSource,
    pending: &PendingStep,
    timeout_ms: u64,
) -> Result<Option<FetchedStep>> {
    match timeout(Duration::from_millis(timeout_ms), fetch_step(source, pending)).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout { timeout_ms }.into()),
    }
}

fn apply_result<S: DrawingSurface>(
    compositor: &Mutex<Compositor<S>>,
    sequencer: &mut RequestSequencer,
    ticket: u64,
    result: Result<Option<FetchedStep>>,
) {
    match result {
        Ok(Some(fetched)) => {
            if !sequencer.accept(ticket) {
                debug!("Dropping stale step '{}' from poll {}", fetched.step.name, ticket);
                return;
            }
            if let Err(e) = compositor.lock().apply(&fetched) {
                warn!("Failed to present step '{}': {:#}", fetched.step.name, e);
            }
        }
        Ok(None) => trace!("No pending step"),
        Err(e) => warn!("Poll failed, keeping current scene: {}", e),
    }
}

/// Poll `source` until `shutdown` resolves
///
/// The compositor is locked only while a result is applied, so input
/// handlers can share it.
pub async fn run_poll_loop<S, F>(
    source: Arc<dyn CommandSource>,
    compositor: Arc<Mutex<Compositor<S>>>,
    polling: &PollingSettings,
    shutdown: F,
) where
    S: DrawingSurface,
    F: Future<Output = ()>,
{
    // Unbounded so a finished fetch never waits to hand over its result
    let (tx, mut rx) = mpsc::unbounded_channel::<(u64, Result<Option<FetchedStep>>)>();
    let mut ticker = tokio::time::interval(Duration::from_millis(polling.interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let timeout_ms = polling.request_timeout_ms;

    let pending = Arc::new(PendingStep::new());
    let mut sequencer = RequestSequencer::new();
    let mut in_flight: Option<JoinHandle<()>> = None;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if let Some(previous) = in_flight.as_ref().filter(|task| !task.is_finished()) {
                    if pending.is_held() {
                        debug!("Homography for a consumed step still pending, skipping tick");
                        continue;
                    }
                    debug!("Previous poll still running, aborting it");
                    previous.abort();
                }
                let ticket = sequencer.issue();
                let source = source.clone();
                let pending = pending.clone();
                let tx = tx.clone();
                in_flight = Some(tokio::spawn(async move {
                    let result = fetch_with_timeout(source.as_ref(), &pending, timeout_ms).await;
                    let _ = tx.send((ticket, result));
                }));
            }
            Some((ticket, result)) = rx.recv() => {
                apply_result(&compositor, &mut sequencer, ticket, result);
            }
        }
    }

    if let Some(task) = in_flight {
        task.abort();
    }
    if let Some(step) = pending.get() {
        warn!("Stopping with step '{}' not presented", step.name);
    }
    debug!("Poll loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use camoverlay_communication::OverlayMailbox;
    use camoverlay_core::HomographyRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sequencer_drops_stale_tickets() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(second > first);

        assert!(sequencer.accept(second));
        assert!(!sequencer.accept(first));
        assert!(!sequencer.accept(second));
        assert_eq!(sequencer.last_applied(), second);

        let third = sequencer.issue();
        assert!(sequencer.accept(third));
    }

    fn step(name: &str) -> Step {
        Step::new(name, StepType::Step, Vec::new())
    }

    #[test]
    fn test_pending_step_release_matches_step() {
        let pending = PendingStep::new();
        pending.park(step("first"));
        pending.park(step("second"));
        assert_eq!(pending.get().map(|s| s.name), Some("second".to_string()));

        pending.release(&step("first"));
        assert!(pending.is_held());
        pending.release(&step("second"));
        assert!(!pending.is_held());
    }

    /// Consuming source whose homography store fails a set number of times
    struct FlakyHomography {
        mailbox: OverlayMailbox,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl CommandSource for FlakyHomography {
        async fn poll(&self) -> Result<Option<Step>> {
            self.mailbox.poll().await
        }

        async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(SourceError::Unavailable {
                    reason: "store offline".to_string(),
                }
                .into());
            }
            Ok(None)
        }

        async fn put_homography(&self, _record: &HomographyRecord) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_homography_keeps_step_for_retry() {
        let source = FlakyHomography {
            mailbox: OverlayMailbox::new(),
            failures: AtomicUsize::new(1),
        };
        source.mailbox.post_step(step("cut"));
        let pending = PendingStep::new();

        assert!(fetch_step(&source, &pending).await.is_err());
        assert!(!source.mailbox.has_pending_step());
        assert!(pending.is_held());

        let fetched = fetch_step(&source, &pending).await.unwrap().unwrap();
        assert_eq!(fetched.step.name, "cut");
        assert!(fetched.homography.is_identity());
        assert!(!pending.is_held());

        assert!(fetch_step(&source, &pending).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_newer_step_replaces_parked_one() {
        let source = FlakyHomography {
            mailbox: OverlayMailbox::new(),
            failures: AtomicUsize::new(1),
        };
        source.mailbox.post_step(step("old"));
        let pending = PendingStep::new();
        assert!(fetch_step(&source, &pending).await.is_err());

        source.mailbox.post_step(step("new"));
        let fetched = fetch_step(&source, &pending).await.unwrap().unwrap();
        assert_eq!(fetched.step.name, "new");
        assert!(!pending.is_held());
    }
}
