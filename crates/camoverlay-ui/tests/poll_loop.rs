use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use camoverlay_communication::{CommandSource, OverlayMailbox};
use camoverlay_core::{
    HomographyRecord, Location, Mark, PlainMark, Result, SourceError, Step, StepType,
};
use camoverlay_settings::{Config, PollingSettings};
use camoverlay_ui::{run_poll_loop, Compositor, OverlayState};
use camoverlay_visualizer::{DrawingSurface, Group};

#[derive(Default)]
struct RecordingSurface {
    presented: Vec<Group>,
}

impl DrawingSurface for RecordingSurface {
    fn clear(&mut self) {}

    fn present(&mut self, scene: &Group) -> anyhow::Result<()> {
        self.presented.push(scene.clone());
        Ok(())
    }
}

fn crosshair_step() -> Step {
    Step::new(
        "crosshair",
        StepType::Step,
        vec![Mark::Crosshair(PlainMark {
            location: Location::new(1.0, 2.0),
        })],
    )
}

fn fast_polling() -> PollingSettings {
    PollingSettings {
        interval_ms: 10,
        request_timeout_ms: 1000,
    }
}

fn compositor() -> Arc<Mutex<Compositor<RecordingSurface>>> {
    Arc::new(Mutex::new(Compositor::new(
        RecordingSurface::default(),
        &Config::default(),
    )))
}

async fn run_for(
    source: Arc<dyn CommandSource>,
    compositor: Arc<Mutex<Compositor<RecordingSurface>>>,
    polling: PollingSettings,
    millis: u64,
) {
    run_poll_loop(
        source,
        compositor,
        &polling,
        tokio::time::sleep(Duration::from_millis(millis)),
    )
    .await;
}

#[tokio::test]
async fn test_posted_step_is_presented_once() {
    let mailbox = Arc::new(OverlayMailbox::new());
    mailbox.post_step(crosshair_step());
    let compositor = compositor();

    run_for(mailbox.clone(), compositor.clone(), fast_polling(), 100).await;

    let compositor = compositor.lock();
    assert_eq!(compositor.state(), OverlayState::Step);
    assert_eq!(compositor.surface().presented.len(), 1);
    assert!(compositor.scene().find_group("crosshair").is_some());
    assert!(!mailbox.has_pending_step());
}

#[tokio::test]
async fn test_standby_after_step_keeps_scene() {
    let mailbox = Arc::new(OverlayMailbox::new());
    mailbox.post_step(crosshair_step());
    let compositor = compositor();
    run_for(mailbox.clone(), compositor.clone(), fast_polling(), 60).await;
    let before = compositor.lock().scene().clone();

    mailbox.post_step(Step::standby());
    run_for(mailbox.clone(), compositor.clone(), fast_polling(), 60).await;

    let compositor = compositor.lock();
    assert_eq!(compositor.scene(), &before);
    assert_eq!(compositor.surface().presented.len(), 1);
}

/// Hands out a step but cannot reach the homography store
struct BrokenHomography;

#[async_trait]
impl CommandSource for BrokenHomography {
    async fn poll(&self) -> Result<Option<Step>> {
        Ok(Some(crosshair_step()))
    }

    async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
        Err(SourceError::Unavailable {
            reason: "connection refused".to_string(),
        }
        .into())
    }

    async fn put_homography(&self, _record: &HomographyRecord) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_homography_failure_leaves_scene() {
    let compositor = compositor();
    run_for(Arc::new(BrokenHomography), compositor.clone(), fast_polling(), 60).await;

    let compositor = compositor.lock();
    assert_eq!(compositor.state(), OverlayState::Standby);
    assert!(compositor.surface().presented.is_empty());
}

/// Every poll outlives the polling interval
struct SlowSource {
    started: AtomicUsize,
    finished: AtomicUsize,
    delay: Duration,
}

impl SlowSource {
    fn new(delay: Duration) -> Self {
        Self {
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            delay,
        }
    }
}

#[async_trait]
impl CommandSource for SlowSource {
    async fn poll(&self) -> Result<Option<Step>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(Some(crosshair_step()))
    }

    async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
        Ok(None)
    }

    async fn put_homography(&self, _record: &HomographyRecord) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_new_tick_aborts_running_fetch() {
    let source = Arc::new(SlowSource::new(Duration::from_millis(200)));
    let compositor = compositor();
    run_for(source.clone(), compositor.clone(), fast_polling(), 100).await;

    assert!(source.started.load(Ordering::SeqCst) > 1);
    assert_eq!(source.finished.load(Ordering::SeqCst), 0);
    assert!(compositor.lock().surface().presented.is_empty());
}

#[tokio::test]
async fn test_fetch_times_out() {
    let source = Arc::new(SlowSource::new(Duration::from_millis(500)));
    let compositor = compositor();
    let polling = PollingSettings {
        interval_ms: 1000,
        request_timeout_ms: 20,
    };
    run_for(source.clone(), compositor.clone(), polling, 100).await;

    assert_eq!(source.started.load(Ordering::SeqCst), 1);
    assert_eq!(source.finished.load(Ordering::SeqCst), 0);
    assert!(compositor.lock().surface().presented.is_empty());
}

/// Consumes steps like the mailbox, but answers homography requests slowly
struct SlowHomography {
    mailbox: OverlayMailbox,
    delay: Duration,
}

#[async_trait]
impl CommandSource for SlowHomography {
    async fn poll(&self) -> Result<Option<Step>> {
        self.mailbox.poll().await
    }

    async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn put_homography(&self, _record: &HomographyRecord) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_consumed_step_survives_slow_homography() {
    let source = Arc::new(SlowHomography {
        mailbox: OverlayMailbox::new(),
        delay: Duration::from_millis(50),
    });
    source.mailbox.post_step(crosshair_step());
    let compositor = compositor();

    run_for(source.clone(), compositor.clone(), fast_polling(), 400).await;

    assert!(!source.mailbox.has_pending_step());
    let compositor = compositor.lock();
    assert_eq!(compositor.surface().presented.len(), 1);
    assert!(compositor.scene().find_group("crosshair").is_some());
}
