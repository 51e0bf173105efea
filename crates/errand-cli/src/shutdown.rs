//! Process shutdown coordination.
//!
//! A single coordinator owns every cleanup the process must run on
//! ctrl-c, instead of each entry point installing its own signal handler.
//! Cleanups run in registration order under one overall deadline; a hung
//! cleanup cannot block exit forever.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

type Cleanup = Pin<Box<dyn Future<Output = ()> + Send>>;

pub struct ShutdownCoordinator {
    cleanups: Mutex<Vec<Cleanup>>,
    deadline: Duration,
}

impl ShutdownCoordinator {
    pub fn new(deadline: Duration) -> Self {
        Self {
            cleanups: Mutex::new(Vec::new()),
            deadline,
        }
    }

    /// Register a cleanup to run at shutdown.
    pub fn register<F>(&self, cleanup: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.lock().push(Box::pin(cleanup));
    }

    /// Run all registered cleanups under the overall deadline.
    ///
    /// Drains the registry, so a second call is a no-op; the normal exit
    /// path and the signal path can both call this safely.
    pub async fn run(&self) {
        let cleanups: Vec<Cleanup> = self.lock().drain(..).collect();
        if cleanups.is_empty() {
            return;
        }

        tracing::info!(count = cleanups.len(), "running shutdown cleanups");
        let work = async {
            for cleanup in cleanups {
                cleanup.await;
            }
        };
        if tokio::time::timeout(self.deadline, work).await.is_err() {
            tracing::warn!(
                deadline_secs = self.deadline.as_secs(),
                "shutdown deadline exceeded, abandoning remaining cleanups"
            );
        }
    }

    /// Block until ctrl-c, then run the cleanups.
    pub async fn wait_for_signal(&self) {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("interrupt received, shutting down");
        self.run().await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Cleanup>> {
        match self.cleanups.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
