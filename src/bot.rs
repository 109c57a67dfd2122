//! Consume loop: pulls events from the chat transport, dispatches them one at
//! a time and sends each reply.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::dispatch::Dispatcher;
use crate::telegram::ChatTransport;

/// Counters for one run of the consume loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Events dispatched
    pub handled: u64,
    /// Replies the transport failed to deliver
    pub send_failures: u64,
    /// Failed attempts to receive events
    pub receive_failures: u64,
}

pub struct Bot {
    transport: Arc<dyn ChatTransport>,
    dispatcher: Dispatcher,
    retry_delay: Duration,
}

impl Bot {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        dispatcher: Dispatcher,
        retry_delay: Duration,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            retry_delay,
        }
    }

    /// Run until `shutdown` resolves.
    ///
    /// Each event is fully handled, reply included, before the next one is
    /// taken. Shutdown is only observed between batches and while waiting on
    /// the transport, so a batch in progress is finished first.
    pub async fn run_until<F>(&self, shutdown: F) -> RunStats
    where
        F: Future<Output = ()>,
    {
        info!("Running bot...");
        tokio::pin!(shutdown);
        let mut stats = RunStats::default();

        loop {
            let received = tokio::select! {
                _ = &mut shutdown => break,
                received = self.transport.receive() => received,
            };

            let events = match received {
                Ok(events) => events,
                Err(e) => {
                    stats.receive_failures += 1;
                    warn!(
                        error = %e,
                        retry_in_secs = self.retry_delay.as_secs(),
                        "Failed to receive updates"
                    );
                    let stop = tokio::select! {
                        _ = &mut shutdown => true,
                        _ = tokio::time::sleep(self.retry_delay) => false,
                    };
                    if stop {
                        break;
                    }
                    continue;
                }
            };

            for event in &events {
                let reply = self.dispatcher.dispatch(event).await;
                stats.handled += 1;

                if let Err(e) = self.transport.send(&reply).await {
                    stats.send_failures += 1;
                    error!(user_id = %reply.user, error = %e, "Failed to send reply");
                }
            }
        }

        info!(
            handled = stats.handled,
            send_failures = stats.send_failures,
            receive_failures = stats.receive_failures,
            "Bot stopped"
        );
        stats
    }
}
