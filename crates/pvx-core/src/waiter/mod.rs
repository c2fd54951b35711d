//! Completion protocol for asynchronous cluster jobs.
//!
//! A submitted job is polled until the cluster reports a terminal state.
//! Between polls the job log is paged with a cursor, so every line reaches
//! the [`TaskLogSink`] once and in order. There is no timeout: the loop ends
//! only when the cluster reports a terminal state or a request fails.
mod cursor;
mod sink;

pub use sink::{LogSinkHandle, TaskLogSink, TracingLogSink};

use std::time::Duration;

use pvx_model::TaskHandle;
use tracing::{debug, instrument, trace, warn};

use crate::client::ClientError;
use crate::context::OpsContext;
use cursor::LogCursor;

/// Polls one job at a time to a boolean result.
#[derive(Debug, Clone)]
pub struct TaskWaiter {
    ctx: OpsContext,
}

impl TaskWaiter {
    pub fn from_context(ctx: &OpsContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.ctx.config().poll_interval_ms)
    }

    /// Wait for a submitted job and report whether it succeeded.
    ///
    /// A refused submission is a failure without any status poll. Success
    /// means the terminal exit status is exactly `OK`.
    #[instrument(level = "debug", skip(self, submitted), fields(node = %node))]
    pub async fn wait(&self, submitted: &Result<TaskHandle, ClientError>, node: &str) -> bool {
        let handle = match submitted {
            Ok(handle) => handle,
            Err(err) => {
                self.ctx.sink().rejected(err);
                return false;
            }
        };

        let mut cursor = LogCursor::default();
        loop {
            let state = match self.ctx.client().task_status(handle, node).await {
                Ok(state) => state,
                Err(err) => {
                    warn!(task = %handle, error = %err, "task status query failed");
                    return false;
                }
            };

            if state.is_terminal() {
                if let Err(err) = self.drain(handle, node, &mut cursor).await {
                    warn!(task = %handle, error = %err, "final log drain failed");
                    return false;
                }
                let ok = state.succeeded();
                if ok {
                    debug!(task = %handle, status = %state, "task finished");
                } else {
                    warn!(task = %handle, status = %state, "task finished with failure");
                }
                return ok;
            }

            trace!(task = %handle, status = %state, "waiting for task");
            tokio::time::sleep(self.poll_interval()).await;

            if let Err(err) = self.fetch_page(handle, node, &mut cursor).await {
                warn!(task = %handle, error = %err, "task log query failed");
                return false;
            }
        }
    }

    /// Fetch one page above the cursor and emit the unseen entries.
    ///
    /// Returns the raw page length and the number of entries emitted.
    async fn fetch_page(
        &self,
        handle: &TaskHandle,
        node: &str,
        cursor: &mut LogCursor,
    ) -> Result<(usize, usize), ClientError> {
        let limit = self.ctx.config().log_page_limit;
        let page = self
            .ctx
            .client()
            .task_log(handle, node, cursor.position(), limit)
            .await?;
        let raw = page.len();

        let fresh = cursor.accept(page);
        for entry in &fresh {
            self.ctx.sink().entry(handle, entry);
        }
        Ok((raw, fresh.len()))
    }

    /// Page until a short page or until a page brings nothing new.
    async fn drain(
        &self,
        handle: &TaskHandle,
        node: &str,
        cursor: &mut LogCursor,
    ) -> Result<(), ClientError> {
        let limit = self.ctx.config().log_page_limit as usize;
        loop {
            let (raw, fresh) = self.fetch_page(handle, node, cursor).await?;
            if raw < limit || fresh == 0 {
                return Ok(());
            }
        }
    }
}
