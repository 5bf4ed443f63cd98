//! Change notification delivery
//!
//! Every committed transaction that staged an event hands it to the
//! [`EventHub`], which fans it out to registered [`ChangeSink`]s.
//! When delivery happens relative to the write is set by [`NotificationPolicy`].

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;

use parking_lot::RwLock;
use population_core::{ChangeEvent, PopulationError, PopulationResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coupling between a write and its change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Deliver after the write is logged and before it is applied; a failed delivery aborts the write
    #[default]
    Strict,
    /// Deliver after the write is applied; failures are logged and ignored
    BestEffort,
}

/// Why a sink did not take an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The sink refused or could not accept the event
    Rejected(String),
    /// The sink is gone and should be dropped
    Disconnected,
}

/// Receiver of committed change events
///
/// Sinks are called from inside the commit path. They may read from the
/// database and register or remove sinks, but a write from inside `deliver`
/// is refused with `InvalidInput`.
pub trait ChangeSink: Send + Sync {
    /// Accept one event
    fn deliver(&self, event: &ChangeEvent) -> Result<(), DeliveryError>;
}

/// Sink backed by a bounded channel; a full channel rejects the event
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: SyncSender<ChangeEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it
    pub fn new(capacity: usize) -> (Self, Receiver<ChangeEvent>) {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        (ChannelSink { sender }, receiver)
    }
}

impl ChangeSink for ChannelSink {
    fn deliver(&self, event: &ChangeEvent) -> Result<(), DeliveryError> {
        match self.sender.try_send(event.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                Err(DeliveryError::Rejected("subscriber channel is full".to_string()))
            }
            Err(TrySendError::Disconnected(_)) => Err(DeliveryError::Disconnected),
        }
    }
}

thread_local! {
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// True while this thread is inside a sink's `deliver`
pub(crate) fn delivering() -> bool {
    DELIVERING.with(Cell::get)
}

/// Marks the current thread as delivering until dropped
struct DeliveryGuard {
    outer: bool,
}

impl DeliveryGuard {
    fn enter() -> Self {
        DeliveryGuard {
            outer: DELIVERING.with(|d| d.replace(true)),
        }
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        let outer = self.outer;
        DELIVERING.with(|d| d.set(outer));
    }
}

/// Handle returned by [`EventHub::add_sink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

/// Registry of sinks and fan-out of events
#[derive(Default)]
pub struct EventHub {
    sinks: RwLock<Vec<(SinkId, Arc<dyn ChangeSink>)>>,
    next_id: AtomicU64,
}

impl EventHub {
    /// Create a hub with no sinks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink
    pub fn add_sink(&self, sink: Arc<dyn ChangeSink>) -> SinkId {
        let id = SinkId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sinks.write().push((id, sink));
        id
    }

    /// Unregister a sink; false if it was not registered
    pub fn remove_sink(&self, id: SinkId) -> bool {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|(sink_id, _)| *sink_id != id);
        sinks.len() != before
    }

    /// Register a channel sink and return its receiver
    pub fn subscribe(&self, capacity: usize) -> Receiver<ChangeEvent> {
        let (sink, receiver) = ChannelSink::new(capacity);
        self.add_sink(Arc::new(sink));
        receiver
    }

    /// Number of registered sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Deliver to every sink.
    ///
    /// Stops at the first rejection and reports it as `NotificationFailure`.
    /// Disconnected sinks are dropped without failing the delivery.
    pub fn deliver(&self, event: &ChangeEvent) -> PopulationResult<()> {
        // sinks run without the registry lock held
        let sinks: Vec<(SinkId, Arc<dyn ChangeSink>)> = self.sinks.read().clone();
        let mut disconnected = Vec::new();
        let mut outcome = Ok(());

        {
            let _guard = DeliveryGuard::enter();
            for (id, sink) in &sinks {
                match sink.deliver(event) {
                    Ok(()) => {}
                    Err(DeliveryError::Disconnected) => disconnected.push(*id),
                    Err(DeliveryError::Rejected(reason)) => {
                        outcome = Err(PopulationError::notification(event.name.clone(), reason));
                        break;
                    }
                }
            }
        }

        if !disconnected.is_empty() {
            debug!(count = disconnected.len(), "Pruning disconnected sinks");
            self.sinks
                .write()
                .retain(|(id, _)| !disconnected.contains(id));
        }
        outcome
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("sinks", &self.sink_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use population_core::TxId;

    struct RejectingSink;

    impl ChangeSink for RejectingSink {
        fn deliver(&self, _event: &ChangeEvent) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected("offline".to_string()))
        }
    }

    fn event(payload: &str) -> ChangeEvent {
        ChangeEvent::staged("Change", payload.as_bytes().to_vec(), TxId::new()).committed(1)
    }

    #[test]
    fn test_subscribe_receives_events() {
        let hub = EventHub::new();
        let rx = hub.subscribe(4);

        hub.deliver(&event("a")).unwrap();
        hub.deliver(&event("b")).unwrap();

        assert_eq!(rx.recv().unwrap().payload, b"a");
        assert_eq!(rx.recv().unwrap().payload, b"b");
    }

    #[test]
    fn test_no_sinks_is_ok() {
        let hub = EventHub::new();
        assert!(hub.deliver(&event("a")).is_ok());
    }

    #[test]
    fn test_full_channel_is_failure() {
        let hub = EventHub::new();
        let _rx = hub.subscribe(1);

        hub.deliver(&event("a")).unwrap();
        let err = hub.deliver(&event("b")).unwrap_err();
        match err {
            PopulationError::NotificationFailure { event, reason } => {
                assert_eq!(event, "Change");
                assert!(reason.contains("full"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_disconnected_subscriber_is_pruned() {
        let hub = EventHub::new();
        let rx = hub.subscribe(4);
        drop(rx);
        assert_eq!(hub.sink_count(), 1);

        hub.deliver(&event("a")).unwrap();
        assert_eq!(hub.sink_count(), 0);
    }

    #[test]
    fn test_rejecting_sink_fails_delivery() {
        let hub = EventHub::new();
        hub.add_sink(Arc::new(RejectingSink));
        assert!(hub.deliver(&event("a")).is_err());
    }

    #[test]
    fn test_remove_sink() {
        let hub = EventHub::new();
        let id = hub.add_sink(Arc::new(RejectingSink));
        assert!(hub.remove_sink(id));
        assert!(!hub.remove_sink(id));
        assert!(hub.deliver(&event("a")).is_ok());
    }

    #[test]
    fn test_policy_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: NotificationPolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"best_effort\"").unwrap();
        assert_eq!(parsed.policy, NotificationPolicy::BestEffort);
        assert_eq!(NotificationPolicy::default(), NotificationPolicy::Strict);
    }

    struct RegisteringSink {
        hub: Arc<EventHub>,
    }

    impl ChangeSink for RegisteringSink {
        fn deliver(&self, _event: &ChangeEvent) -> Result<(), DeliveryError> {
            let id = self.hub.add_sink(Arc::new(RejectingSink));
            assert!(self.hub.remove_sink(id));
            Ok(())
        }
    }

    #[test]
    fn test_sink_may_register_sinks_during_delivery() {
        let hub = Arc::new(EventHub::new());
        hub.add_sink(Arc::new(RegisteringSink { hub: hub.clone() }));

        hub.deliver(&event("a")).unwrap();
        assert_eq!(hub.sink_count(), 1);
    }

    #[test]
    fn test_delivering_flag_is_scoped() {
        struct FlagSink(parking_lot::Mutex<Vec<bool>>);
        impl ChangeSink for FlagSink {
            fn deliver(&self, _event: &ChangeEvent) -> Result<(), DeliveryError> {
                self.0.lock().push(delivering());
                Ok(())
            }
        }

        let hub = EventHub::new();
        let sink = Arc::new(FlagSink(parking_lot::Mutex::new(Vec::new())));
        hub.add_sink(sink.clone());

        assert!(!delivering());
        hub.deliver(&event("a")).unwrap();
        assert!(!delivering());
        assert_eq!(*sink.0.lock(), vec![true]);
    }
}
