//! # Event Feed Handler
//!
//! Reads newline-delimited JSON [`OriginEvent`]s and dispatches each one on
//! its own task, so a slow fan-out never holds up the next event.
//!
//! ```text
//! {"type":"post","message_id":10,"content":{"text":"damas 2015"}}
//! {"type":"edit","message_id":10,"content":{"text":"damas 2016"}}
//! {"type":"forward","actor":777,"forwarded_message_id":10}
//! {"type":"confirm_delete","actor":777,"origin":"10"}
//! ```
//!
//! Blank lines are skipped. Lines that are not valid events are logged and
//! counted, never fatal.

use cr_03_propagation::{MessageTransport, OriginEvent, PropagationError, TransitionOutcome};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::container::RelayRuntime;

/// Counters for one run of the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Non-blank lines read.
    pub received: usize,
    /// Lines that decoded and were handed to the runtime.
    pub dispatched: usize,
    pub malformed: usize,
    /// Dispatched transitions that returned an error or panicked.
    pub failed: usize,
}

/// Drives a [`RelayRuntime`] from a line-oriented reader.
pub struct EventFeedHandler<T: MessageTransport + 'static> {
    runtime: Arc<RelayRuntime<T>>,
}

impl<T: MessageTransport + 'static> EventFeedHandler<T> {
    pub fn new(runtime: Arc<RelayRuntime<T>>) -> Self {
        Self { runtime }
    }

    /// Consume `reader` until EOF, then wait for every in-flight transition.
    pub async fn run<R>(&self, reader: R) -> FeedStats
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut tasks = JoinSet::new();
        let mut stats = FeedStats::default();

        loop {
            tokio::select! {
                Some(done) = tasks.join_next(), if !tasks.is_empty() => {
                    record_outcome(done, &mut stats);
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        stats.received += 1;
                        match serde_json::from_str::<OriginEvent>(line) {
                            Ok(event) => {
                                debug!(kind = event.kind(), origin = %event.origin(), "Event received");
                                let runtime = Arc::clone(&self.runtime);
                                tasks.spawn(async move { runtime.dispatch(event).await });
                                stats.dispatched += 1;
                            }
                            Err(e) => {
                                warn!(error = %e, line, "Skipping malformed event");
                                stats.malformed += 1;
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "Event feed read failed, draining in-flight transitions");
                        break;
                    }
                }
            }
        }

        while let Some(done) = tasks.join_next().await {
            record_outcome(done, &mut stats);
        }

        info!(
            received = stats.received,
            dispatched = stats.dispatched,
            malformed = stats.malformed,
            failed = stats.failed,
            "Event feed drained"
        );
        stats
    }
}

fn record_outcome(
    done: Result<Result<TransitionOutcome, PropagationError>, JoinError>,
    stats: &mut FeedStats,
) {
    match done {
        Ok(Ok(outcome)) => debug!(?outcome, "Transition finished"),
        Ok(Err(e)) => {
            warn!(error = %e, "Transition failed");
            stats.failed += 1;
        }
        Err(e) => {
            error!(error = %e, "Transition task aborted");
            stats.failed += 1;
        }
    }
}
