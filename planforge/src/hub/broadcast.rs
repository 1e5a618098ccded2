//! The hub: best-effort fan-out of update events.

use super::UpdateEvent;
use crate::errors::ValidationError;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Configuration for [`UpdateHub`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    heartbeat_interval_secs: u64,
    observer_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 30,
            observer_buffer: 64,
        }
    }
}

impl HubConfig {
    /// Creates the default hub configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the heartbeat interval in seconds.
    #[must_use]
    pub fn with_heartbeat_interval_secs(mut self, secs: u64) -> Self {
        self.heartbeat_interval_secs = secs;
        self
    }

    /// Sets the per-observer event buffer size.
    #[must_use]
    pub fn with_observer_buffer(mut self, buffer: usize) -> Self {
        self.observer_buffer = buffer;
        self
    }

    /// The heartbeat interval.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// The per-observer event buffer size.
    #[must_use]
    pub fn observer_buffer(&self) -> usize {
        self.observer_buffer
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.heartbeat_interval_secs == 0 {
            return Err(ValidationError::new(
                "heartbeat_interval_secs",
                "must be at least 1",
            ));
        }
        if self.observer_buffer == 0 {
            return Err(ValidationError::new("observer_buffer", "must be at least 1"));
        }
        Ok(())
    }
}

/// An observer's end of the update stream.
pub struct Subscription {
    /// Identity of this observer inside the hub.
    pub observer_id: Uuid,
    /// Stream of events; the first is always the connected acknowledgement.
    pub receiver: mpsc::Receiver<UpdateEvent>,
}

/// Fans update events out to connected observers.
///
/// Delivery is best effort. An observer that disconnects or stops draining
/// its buffer is pruned at the next send; a hub with zero observers makes
/// every broadcast a no-op.
pub struct UpdateHub {
    observers: RwLock<HashMap<Uuid, mpsc::Sender<UpdateEvent>>>,
    config: HubConfig,
    shutdown: watch::Sender<bool>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl UpdateHub {
    /// Creates a hub. The heartbeat does not run until
    /// [`UpdateHub::start_heartbeat`] is called.
    #[must_use]
    pub fn new(config: HubConfig) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            observers: RwLock::new(HashMap::new()),
            config,
            shutdown,
            heartbeat: Mutex::new(None),
        })
    }

    /// Registers an observer and hands back its event stream.
    ///
    /// The connected acknowledgement is queued before the observer is visible
    /// to broadcasts, so it is always the first event received.
    pub fn subscribe(&self) -> Subscription {
        let observer_id = Uuid::new_v4();
        let (tx, receiver) = mpsc::channel(self.config.observer_buffer());

        let _ = tx.try_send(UpdateEvent::connected(observer_id));
        self.observers.write().insert(observer_id, tx);

        debug!(observer_id = %observer_id, "observer subscribed");
        Subscription {
            observer_id,
            receiver,
        }
    }

    /// Removes an observer. Returns false if it was already gone.
    pub fn unsubscribe(&self, observer_id: Uuid) -> bool {
        let removed = self.observers.write().remove(&observer_id).is_some();
        if removed {
            debug!(observer_id = %observer_id, "observer unsubscribed");
        }
        removed
    }

    /// Number of currently connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Sends an event to every observer, pruning the ones that cannot take
    /// it. Returns how many observers received the event.
    pub fn broadcast(&self, event: &UpdateEvent) -> usize {
        let mut delivered = 0;
        let mut dead: Vec<Uuid> = Vec::new();

        {
            let observers = self.observers.read();
            if observers.is_empty() {
                return 0;
            }
            for (id, tx) in observers.iter() {
                match tx.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => dead.push(*id),
                }
            }
        }

        if !dead.is_empty() {
            let mut observers = self.observers.write();
            for id in dead {
                if observers.remove(&id).is_some() {
                    warn!(
                        observer_id = %id,
                        kind = %event.kind,
                        "pruned unresponsive observer"
                    );
                }
            }
        }

        delivered
    }

    /// Starts the heartbeat task. Calling it again is a no-op.
    pub fn start_heartbeat(self: &Arc<Self>) {
        let mut guard = self.heartbeat.lock();
        if guard.is_some() {
            return;
        }

        let hub = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();
        let period = self.config.heartbeat_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; the connected ack already
            // covers time zero.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        hub.broadcast(&UpdateEvent::ping());
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("heartbeat stopped");
        });

        *guard = Some(handle);
    }

    /// Stops the heartbeat and waits for it to finish.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let handle = self.heartbeat.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("update hub stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::EventKind;

    #[tokio::test]
    async fn test_subscribe_acks_first() {
        let hub = UpdateHub::new(HubConfig::default());
        let mut sub = hub.subscribe();

        let first = sub.receiver.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::Connected);
        assert_eq!(
            first.payload.unwrap()["observerId"],
            sub.observer_id.to_string()
        );
        assert_eq!(hub.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_observer() {
        let hub = UpdateHub::new(HubConfig::default());
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        // Drain the acks.
        first.receiver.recv().await.unwrap();
        second.receiver.recv().await.unwrap();

        let delivered = hub.broadcast(&UpdateEvent::ping());
        assert_eq!(delivered, 2);
        assert_eq!(first.receiver.recv().await.unwrap().kind, EventKind::Ping);
        assert_eq!(second.receiver.recv().await.unwrap().kind, EventKind::Ping);
    }

    #[tokio::test]
    async fn test_broadcast_without_observers_is_noop() {
        let hub = UpdateHub::new(HubConfig::default());
        assert_eq!(hub.broadcast(&UpdateEvent::ping()), 0);
    }

    #[tokio::test]
    async fn test_disconnected_observer_pruned_on_send() {
        let hub = UpdateHub::new(HubConfig::default());
        let sub = hub.subscribe();
        drop(sub.receiver);

        assert_eq!(hub.observer_count(), 1);
        let delivered = hub.broadcast(&UpdateEvent::ping());
        assert_eq!(delivered, 0);
        assert_eq!(hub.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_dead_observer_pruned_while_live_one_still_receives() {
        let hub = UpdateHub::new(HubConfig::default());
        let dead = hub.subscribe();
        let mut live = hub.subscribe();

        drop(dead.receiver);
        live.receiver.recv().await.unwrap();

        let delivered = hub.broadcast(&UpdateEvent::ping());
        assert_eq!(delivered, 1);
        assert_eq!(hub.observer_count(), 1);
        assert_eq!(live.receiver.recv().await.unwrap().kind, EventKind::Ping);
    }

    #[tokio::test]
    async fn test_stalled_observer_pruned_when_buffer_fills() {
        let hub = UpdateHub::new(HubConfig::new().with_observer_buffer(1));
        let _sub = hub.subscribe();

        // The ack fills the single-slot buffer and nothing drains it.
        let delivered = hub.broadcast(&UpdateEvent::ping());
        assert_eq!(delivered, 0);
        assert_eq!(hub.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let hub = UpdateHub::new(HubConfig::default());
        let sub = hub.subscribe();

        assert!(hub.unsubscribe(sub.observer_id));
        assert!(!hub.unsubscribe(sub.observer_id));
        assert_eq!(hub.observer_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_pings_observers() {
        let hub = UpdateHub::new(HubConfig::default());
        let mut sub = hub.subscribe();
        sub.receiver.recv().await.unwrap();

        hub.start_heartbeat();
        hub.start_heartbeat(); // second call is a no-op

        let event = sub.receiver.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::Ping);

        hub.shutdown().await;
    }

    #[test]
    fn test_config_validation() {
        assert!(HubConfig::default().validate().is_ok());
        assert!(HubConfig::new()
            .with_heartbeat_interval_secs(0)
            .validate()
            .is_err());
        assert!(HubConfig::new().with_observer_buffer(0).validate().is_err());
    }
}
