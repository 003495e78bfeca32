use std::sync::Arc;
use std::time::Duration;

use innerspace_whatsapp::ConversationStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Purges idle conversations every `every` until the task is aborted.
pub fn spawn(store: Arc<dyn ConversationStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(
                    event_name = "whatsapp.conversation.expired",
                    correlation_id = "sweeper",
                    purged,
                    "purged idle conversations"
                ),
                Err(error) => warn!(
                    event_name = "whatsapp.conversation.sweep_failed",
                    correlation_id = "sweeper",
                    error = %error,
                    "conversation sweep failed"
                ),
            }
        }
    })
}
