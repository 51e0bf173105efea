//! `errand watch` -- watch the desktop until a task appears complete.
//!
//! Wires the watcher to the configured operator channel: with Telegram
//! settings present, notifications go to the chat and an operator "stop"
//! message cancels the watch; otherwise the local terminal is used and
//! ctrl-c is the only cancellation path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use errand_channel::telegram::{api::TelegramApi, poller};
use errand_channel::{PromptBroker, TelegramSink, TerminalSink};
use errand_gateway::Gateway;
use errand_types::{
    ExecutionContext, NotificationSink, OperatingMode, Settings, TaskContext,
};
use errand_watcher::{DesktopWatcher, FallbackOracle, StopFlag, WatcherOptions};

use crate::shutdown::ShutdownCoordinator;

const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(10);

pub async fn run(settings: &Settings, task: &str) -> anyhow::Result<()> {
    let coordinator = Arc::new(ShutdownCoordinator::new(SHUTDOWN_DEADLINE));
    let stop = StopFlag::new();
    {
        let stop = stop.clone();
        coordinator.register(async move { stop.stop() });
    }

    let ctx = match &settings.telegram {
        Some(tg) => {
            let api = Arc::new(TelegramApi::new(&tg.bot_token));
            let sink: Arc<dyn NotificationSink> =
                Arc::new(TelegramSink::new(Arc::clone(&api), tg.chat_id));

            let (message_tx, mut message_rx) = mpsc::channel(64);
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(poller::poll_loop(
                api,
                tg.chat_id,
                tg.poll_timeout_secs,
                message_tx,
                cancel_rx,
            ));
            coordinator.register(async move {
                let _ = cancel_tx.send(true);
            });

            // Inbound messages are offered to the prompt broker first so a
            // late reply to a pending question is never misread as a watch
            // command; anything else saying "stop" cancels the watch.
            let broker = Arc::new(PromptBroker::new(settings.prompt_timeout));
            let stop = stop.clone();
            tokio::spawn(async move {
                while let Some(text) = message_rx.recv().await {
                    if broker.resolve_oldest(&text) {
                        continue;
                    }
                    if text.trim().eq_ignore_ascii_case("stop") {
                        tracing::info!("operator requested stop");
                        stop.stop();
                    }
                }
            });

            TaskContext::new(ExecutionContext::Remote, sink)
        }
        None => TaskContext::new(ExecutionContext::Local, Arc::new(TerminalSink)),
    };

    // Screenshot captures come from configuration, not operator input, so
    // the watcher's internal gateway is not subject to the exec-mode flags.
    let gateway = Arc::new(Gateway::new(OperatingMode::Normal));
    let oracle = Arc::new(FallbackOracle::from_settings(&settings.oracle)?);
    let watcher = DesktopWatcher::new(gateway, oracle, WatcherOptions::from_settings(settings));

    let signal_coordinator = Arc::clone(&coordinator);
    tokio::spawn(async move { signal_coordinator.wait_for_signal().await });

    let outcome = watcher.watch(task, &ctx, &stop).await;
    coordinator.run().await;

    println!("{}", outcome.message);
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
