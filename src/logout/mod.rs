use std::sync::Mutex;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Channel identifier, kept for log correlation with other gateway contexts.
pub const LOGOUT_CHANNEL_NAME: &str = "logoutChannel";

/// Fixed sentinel message value; anything else on the channel is ignored.
pub const LOGOUT_MESSAGE: &str = "LOGOUT";

const CHANNEL_CAPACITY: usize = 16;

/// Cross-context logout fan-out: logging out in one context logs out every
/// subscribed listener.
///
/// A single instance is constructed at application start and owned by the
/// application state; lifecycle is explicit via `open`/`close`. Broadcasting
/// on a channel that is not open logs an error and is a no-op — it never
/// fails the caller.
#[derive(Debug)]
pub struct LogoutChannel {
    sender: Mutex<Option<broadcast::Sender<String>>>,
}

/// Handle for an active listener; dropping it tears the subscription down.
#[derive(Debug)]
pub struct LogoutSubscription {
    handle: JoinHandle<()>,
}

impl Drop for LogoutSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl LogoutChannel {
    /// Create the channel in the closed state.
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
        }
    }

    /// Open the channel. Reopening an already-open channel is a no-op.
    pub fn open(&self) {
        let mut sender = self.sender.lock().expect("logout channel lock");
        if sender.is_none() {
            let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
            *sender = Some(tx);
            tracing::debug!(channel = LOGOUT_CHANNEL_NAME, "Logout channel opened");
        }
    }

    /// Close the channel; active subscriptions end once they observe the
    /// closed channel.
    pub fn close(&self) {
        let mut sender = self.sender.lock().expect("logout channel lock");
        *sender = None;
    }

    /// Send the logout sentinel to all subscribed contexts.
    pub fn broadcast_logout_message(&self) {
        let sender = self.sender.lock().expect("logout channel lock");
        match sender.as_ref() {
            Some(tx) => {
                // A send error only means no context is listening right now
                if tx.send(LOGOUT_MESSAGE.to_string()).is_err() {
                    tracing::debug!(
                        channel = LOGOUT_CHANNEL_NAME,
                        "Logout broadcast had no listeners"
                    );
                }
            }
            None => {
                tracing::error!(
                    channel = LOGOUT_CHANNEL_NAME,
                    "Cannot broadcast logout: channel is not open"
                );
            }
        }
    }

    /// Register a callback invoked whenever the logout sentinel arrives.
    /// Returns None (with an error logged) when the channel is not open.
    pub fn subscribe<F>(&self, on_logout: F) -> Option<LogoutSubscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let sender = self.sender.lock().expect("logout channel lock");
        let Some(tx) = sender.as_ref() else {
            tracing::error!(
                channel = LOGOUT_CHANNEL_NAME,
                "Cannot subscribe to logout: channel is not open"
            );
            return None;
        };

        let mut rx = tx.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) if message == LOGOUT_MESSAGE => on_logout(),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            channel = LOGOUT_CHANNEL_NAME,
                            skipped,
                            "Logout listener lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Some(LogoutSubscription { handle })
    }
}

impl Default for LogoutChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_broadcast_on_closed_channel_is_noop() {
        let channel = LogoutChannel::new();
        // must not panic or propagate an error
        channel.broadcast_logout_message();
        assert!(channel.subscribe(|| {}).is_none());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let channel = LogoutChannel::new();
        channel.open();

        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let _subscription = channel
            .subscribe(move || {
                let _ = notify_tx.send(());
            })
            .expect("subscription on open channel");

        channel.broadcast_logout_message();

        tokio::time::timeout(Duration::from_secs(1), notify_rx.recv())
            .await
            .expect("logout callback should fire")
            .expect("callback sender alive");
    }

    #[tokio::test]
    async fn test_non_sentinel_messages_are_ignored() {
        let channel = LogoutChannel::new();
        channel.open();

        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let _subscription = channel
            .subscribe(move || {
                let _ = notify_tx.send(());
            })
            .expect("subscription on open channel");

        {
            let sender = channel.sender.lock().unwrap();
            sender
                .as_ref()
                .unwrap()
                .send("SOMETHING_ELSE".to_string())
                .unwrap();
        }
        channel.broadcast_logout_message();

        // only the sentinel should have produced a callback
        tokio::time::timeout(Duration::from_secs(1), notify_rx.recv())
            .await
            .expect("sentinel callback should fire")
            .expect("callback sender alive");
        assert!(notify_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_after_close_is_noop() {
        let channel = LogoutChannel::new();
        channel.open();
        channel.close();
        channel.broadcast_logout_message();
    }
}
