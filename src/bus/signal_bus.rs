//! Publish/subscribe implementation
//!
//! Subscribers are stored per topic in a small inline vector; a topic rarely has more than a
//! couple of consumers (the HUD coordinator and the renderer bridge). `publish` snapshots the
//! handler list and releases the lock before invoking anything, so a handler may subscribe,
//! unsubscribe or publish again without deadlocking.

use parking_lot::Mutex;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

/// Named change topics carried by the bus
///
/// Topics carry no payload: consumers re-query the component that owns the changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// Output volume or mute state changed
    VolumeChanged,
    /// Display brightness changed
    BrightnessChanged,
    /// Clipboard history changed
    ClipboardChanged,
}

impl Topic {
    /// Every topic, in table order
    pub const ALL: [Self; 3] = [
        Self::VolumeChanged,
        Self::BrightnessChanged,
        Self::ClipboardChanged,
    ];

    /// Stable wire name of the topic
    pub const fn name(self) -> &'static str {
        match self {
            Self::VolumeChanged => "volume-changed",
            Self::BrightnessChanged => "brightness-changed",
            Self::ClipboardChanged => "clipboard-changed",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::VolumeChanged => 0,
            Self::BrightnessChanged => 1,
            Self::ClipboardChanged => 2,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback invoked for every publish on a subscribed topic
pub type SignalHandler = Arc<dyn Fn(Topic) + Send + Sync>;

/// Opaque handle returned by [`SignalBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: Uuid,
    topic: Topic,
}

impl SubscriptionHandle {
    /// Topic this subscription listens to
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

type HandlerList = SmallVec<[(Uuid, SignalHandler); 4]>;

/// Destination for signals raised by producers
///
/// Producers that live on foreign threads (OS callbacks, backend pollers) only ever see this
/// trait, which lets the process wire them to the coordinating thread's queue while tests wire
/// them to a recorder.
pub trait SignalSink: Send + Sync {
    /// Hand off a signal. Must not block.
    fn post(&self, topic: Topic);
}

/// Process-wide change signal bus
///
/// Cloning is cheap and every clone shares the same subscriber table.
#[derive(Clone, Default)]
pub struct SignalBus {
    subscribers: Arc<Mutex<[HandlerList; 3]>>,
}

impl SignalBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`
    ///
    /// Only publishes that happen after this call are delivered.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionHandle
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.subscribers.lock()[topic.index()].push((id, Arc::new(handler)));
        trace!("Subscribed {} to {}", id, topic);
        SubscriptionHandle { id, topic }
    }

    /// Remove a subscription. Returns `false` if the handle was already removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subscribers = self.subscribers.lock();
        let list = &mut subscribers[handle.topic.index()];
        let before = list.len();
        list.retain(|(id, _)| *id != handle.id);
        before != list.len()
    }

    /// Deliver `topic` to every current subscriber on the calling thread
    pub fn publish(&self, topic: Topic) {
        let handlers: SmallVec<[SignalHandler; 4]> = self.subscribers.lock()[topic.index()]
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!("Publishing {} to {} subscriber(s)", topic, handlers.len());
        for handler in handlers {
            handler(topic);
        }
    }

    /// Number of subscribers currently registered for `topic`
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers.lock()[topic.index()].len()
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.lock();
        let mut map = f.debug_map();
        for topic in Topic::ALL {
            map.entry(&topic.name(), &subscribers[topic.index()].len());
        }
        map.finish()
    }
}

/// Publishing straight onto the bus delivers on the caller's thread. Only producers that already
/// run on the coordinating thread should be wired this way.
impl SignalSink for SignalBus {
    fn post(&self, topic: Topic) {
        self.publish(topic);
    }
}
