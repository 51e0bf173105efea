//! The polling state machine.
//!
//! One [`DesktopWatcher::watch`] call drives a full watch: immediate
//! refusal when the feature is off or demo mode is active, baseline
//! capture with bounded retries, then a polling loop that diffs frames
//! against the baseline and consults the oracle only when a visible change
//! occurred. Transient failures back off exponentially; `max_retries`
//! consecutive failures, the stop flag, or `max_duration` end the watch.
//! Resources are torn down exactly once on every exit path.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use errand_gateway::Gateway;
use errand_types::{Settings, TaskContext, WatchOutcome, WatcherConfig};

use crate::cleanup::ResourceSet;
use crate::frame::{self, Frame};
use crate::inhibit::{SleepInhibitor, DEFAULT_INHIBITOR_CMD};
use crate::oracle::{verdict_indicates_complete, ChangeOracle};

/// Pause between baseline capture attempts.
const BASELINE_RETRY_PAUSE: Duration = Duration::from_secs(2);

/// Cooperative cancellation for an in-flight watch.
///
/// Checked once per loop iteration; an in-flight capture or oracle call is
/// never interrupted, so cancellation latency is bounded by the current
/// interval plus one capture/classify round trip.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-process watcher settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct WatcherOptions {
    /// Feature flag; when off every watch refuses immediately.
    pub enabled: bool,
    /// Visual monitoring is considered higher-risk than one-shot commands
    /// and is disabled entirely under demo sandboxing.
    pub demo_mode: bool,
    pub config: WatcherConfig,
    /// Screenshot command template; `{path}` is replaced per capture.
    pub screenshot_cmd: String,
    /// Sleep-inhibitor invocation; `None` skips inhibition.
    pub inhibitor_cmd: Option<Vec<String>>,
    /// Directory for the two temp screenshot files.
    pub temp_dir: PathBuf,
    /// Pause between baseline capture retries.
    pub baseline_retry_pause: Duration,
}

impl WatcherOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            enabled: settings.watcher_enabled,
            demo_mode: settings.demo_mode,
            config: settings.watcher.clone(),
            screenshot_cmd: settings.screenshot_cmd.clone(),
            inhibitor_cmd: Some(DEFAULT_INHIBITOR_CMD.iter().map(|s| s.to_string()).collect()),
            temp_dir: std::env::temp_dir(),
            baseline_retry_pause: BASELINE_RETRY_PAUSE,
        }
    }
}

/// Watches the desktop for changes and asks the oracle whether the task is
/// complete once a change is visible.
pub struct DesktopWatcher {
    gateway: Arc<Gateway>,
    oracle: Arc<dyn ChangeOracle>,
    options: WatcherOptions,
}

impl DesktopWatcher {
    pub fn new(
        gateway: Arc<Gateway>,
        oracle: Arc<dyn ChangeOracle>,
        options: WatcherOptions,
    ) -> Self {
        Self {
            gateway,
            oracle,
            options,
        }
    }

    fn baseline_path(&self) -> PathBuf {
        self.options.temp_dir.join("errand-baseline.png")
    }

    fn latest_path(&self) -> PathBuf {
        self.options.temp_dir.join("errand-latest.png")
    }

    /// Run one watch for `task`. Always resolves to an outcome; never
    /// propagates an error or panic to the caller.
    pub async fn watch(&self, task: &str, ctx: &TaskContext, stop: &StopFlag) -> WatchOutcome {
        if !self.options.enabled {
            return WatchOutcome::failed("desktop watching is currently disabled");
        }

        if self.options.demo_mode {
            ctx.sink()
                .send_message("[demo] desktop watching is disabled for security")
                .await;
            return WatchOutcome::failed(
                "demo mode: desktop watching is disabled for security",
            );
        }

        let config = &self.options.config;
        if let Err(e) = config.validate() {
            return WatchOutcome::failed(format!("invalid watcher configuration: {e}"));
        }

        tracing::info!(
            max_duration_secs = config.max_duration.as_secs(),
            base_interval_secs = config.base_interval.as_secs(),
            change_threshold = config.change_threshold,
            "desktop watch starting"
        );
        ctx.sink()
            .send_message("errand started watching the desktop for changes")
            .await;

        let resources = ResourceSet::new();

        if let Some(cmd) = &self.options.inhibitor_cmd {
            match SleepInhibitor::acquire(cmd) {
                Ok(inhibitor) => resources.defer(move || inhibitor.kill()),
                Err(e) => {
                    resources.release();
                    return WatchOutcome::failed(format!(
                        "failed to acquire sleep inhibitor: {e}"
                    ));
                }
            }
        }

        let baseline = match self.capture_baseline(ctx, &resources).await {
            Ok(frame) => frame,
            Err(outcome) => return outcome,
        };

        self.poll(task, ctx, stop, &resources, &baseline).await
    }

    /// Capture the baseline frame, retrying up to `max_retries` times.
    ///
    /// Exhausting the retries tears down every acquired resource and yields
    /// the terminal outcome directly.
    async fn capture_baseline(
        &self,
        ctx: &TaskContext,
        resources: &ResourceSet,
    ) -> Result<Frame, WatchOutcome> {
        let path = self.baseline_path();
        let max_retries = self.options.config.max_retries;

        for attempt in 1..=max_retries {
            match Frame::capture(&self.gateway, ctx, &self.options.screenshot_cmd, &path).await {
                Ok(frame) => {
                    let cleanup_path = path.clone();
                    resources.defer(move || frame::remove_quietly(&cleanup_path));
                    return Ok(frame);
                }
                Err(e) => {
                    tracing::warn!(attempt, max_retries, error = %e, "baseline capture failed");
                    if attempt == max_retries {
                        resources.release();
                        let message =
                            "failed to capture initial screenshot after repeated attempts";
                        ctx.sink().send_message(message).await;
                        return Err(WatchOutcome::failed(message));
                    }
                    tokio::time::sleep(self.options.baseline_retry_pause).await;
                }
            }
        }

        unreachable!("max_retries is validated positive")
    }

    async fn poll(
        &self,
        task: &str,
        ctx: &TaskContext,
        stop: &StopFlag,
        resources: &ResourceSet,
        baseline: &Frame,
    ) -> WatchOutcome {
        let config = &self.options.config;
        let latest_path = self.latest_path();
        let started = Instant::now();
        let mut interval = config.base_interval;
        let mut failures = 0u32;

        while started.elapsed() < config.max_duration {
            tokio::time::sleep(interval).await;

            // Cooperative cancellation, checked once per iteration.
            if stop.is_stopped() || resources.is_released() {
                resources.release();
                return WatchOutcome::failed("desktop watching was stopped");
            }

            let latest = match Frame::capture(
                &self.gateway,
                ctx,
                &self.options.screenshot_cmd,
                &latest_path,
            )
            .await
            {
                Ok(frame) => frame,
                Err(e) => {
                    failures += 1;
                    interval = backoff(config.base_interval, failures, config.max_interval);
                    tracing::warn!(
                        failures,
                        next_interval_ms = interval.as_millis() as u64,
                        error = %e,
                        "transient capture failure"
                    );
                    if failures >= config.max_retries {
                        resources.release();
                        let message = format!(
                            "desktop watching failed after {} consecutive failures",
                            config.max_retries
                        );
                        ctx.sink().send_message(&message).await;
                        return WatchOutcome::failed(message);
                    }
                    continue;
                }
            };

            if latest.width != baseline.width || latest.height != baseline.height {
                // Resolution changed mid-watch; skip the frame without
                // counting it as a failure.
                tracing::warn!(
                    baseline = %format!("{}x{}", baseline.width, baseline.height),
                    latest = %format!("{}x{}", latest.width, latest.height),
                    "screenshot dimensions mismatch, skipping frame"
                );
                frame::remove_quietly(&latest_path);
                continue;
            }

            // The iteration succeeded; reset the backoff.
            failures = 0;
            interval = config.base_interval;

            let change = crate::diff::change_percentage(
                &baseline.rgba,
                &latest.rgba,
                baseline.width,
                baseline.height,
            );
            tracing::debug!(
                change = %format!("{change:.2}%"),
                threshold = config.change_threshold,
                "frame compared"
            );

            // Classification is only invoked when a visible change
            // occurred, to bound external-call cost. Strictly greater:
            // a diff exactly at the threshold does not classify.
            if change > config.change_threshold {
                match self
                    .oracle
                    .classify(task, &baseline.encoded, &latest.encoded)
                    .await
                {
                    Ok(verdict) if verdict_indicates_complete(&verdict) => {
                        tracing::info!(%verdict, "task judged complete, stopping watch");
                        ctx.sink()
                            .send_message(
                                "errand stopped watching the desktop. Task completed.",
                            )
                            .await;
                        ctx.sink()
                            .send_document(&latest_path, Some("final screenshot"))
                            .await;
                        frame::remove_quietly(&latest_path);
                        resources.release();
                        return WatchOutcome::completed(format!(
                            "desktop task completed; oracle verdict: {verdict}"
                        ));
                    }
                    Ok(verdict) => {
                        tracing::debug!(%verdict, "task not yet complete");
                    }
                    Err(e) => {
                        // Inconclusive, never watch-aborting.
                        tracing::warn!(error = %e, "classification failed, treating as not yet complete");
                    }
                }
            }

            frame::remove_quietly(&latest_path);
        }

        resources.release();
        let message = format!(
            "desktop watching timed out after {} seconds",
            config.max_duration.as_secs()
        );
        ctx.sink().send_message(&message).await;
        WatchOutcome::failed(message)
    }
}

/// Backed-off interval after `failures` consecutive transient failures:
/// `min(base * 2^failures, max)`.
fn backoff(base: Duration, failures: u32, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(failures);
    base.checked_mul(factor).map_or(max, |d| d.min(max))
}
