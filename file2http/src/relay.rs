//! Dispatch pipeline: fan input lines out to a pool of publishers.
//!
//! This module:
//! 1. Spawns N publisher tasks sharing one unbounded queue
//! 2. Reads the input line by line and hands every line to the queue
//! 3. Closes the queue at end of input (or on a read error)
//! 4. Waits until every publisher has drained the queue and exited

use std::borrow::Cow;

use async_channel::{unbounded, Receiver};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::publish::Publisher;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    /// Number of lines handed to the publishers
    pub lines: usize,
}

/// Relay every line of `input` through `publisher` using `workers` tasks.
///
/// Returns once the input is exhausted and all queued messages have been
/// published (or failed and been logged).
pub async fn run<R>(mut input: R, publisher: Publisher, workers: usize) -> RelaySummary
where
    R: AsyncBufRead + Unpin,
{
    let (tx, rx) = unbounded::<String>();

    // Start all publishers before reading any input.
    let mut publishers = JoinSet::new();
    debug_assert!(workers > 0, "relay needs at least one publisher");
    for worker in 0..workers {
        publishers.spawn(publish_loop(worker, publisher.clone(), rx.clone()));
    }
    drop(rx);

    info!(workers = publishers.len(), "relay_started");

    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                // Invalid UTF-8 is replaced with U+FFFD.
                let line = String::from_utf8_lossy(&buf);
                if let Cow::Owned(_) = line {
                    warn!(line = count, "relay_invalid_utf8");
                }

                // Every receiver lives until the queue is closed.
                if tx.send(line.trim().to_string()).await.is_err() {
                    error!("relay_queue_closed");
                    break;
                }
                count += 1;
            }
            Err(e) => {
                error!(error = %e, "relay_read_error");
                break;
            }
        }
    }

    tx.close();
    info!(lines = count, "relay_input_closed");

    while let Some(joined) = publishers.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "relay_publisher_aborted");
        }
    }

    info!(lines = count, "relay_complete");
    RelaySummary { lines: count }
}

/// Publish queued messages until the queue is closed and empty.
async fn publish_loop(worker: usize, publisher: Publisher, messages: Receiver<String>) {
    while let Ok(msg) = messages.recv().await {
        match publisher.publish(&msg).await {
            Ok(()) => debug!(worker = worker, "publish_complete"),
            Err(e) => error!(worker = worker, message = %msg, error = %e, "publish_failed"),
        }
    }

    debug!(worker = worker, "publisher_drained");
}
