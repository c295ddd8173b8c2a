// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot fan-out for device subscribers.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`SnapshotChannel`] - Registry of subscriber queues
//! - [`SnapshotSubscription`] - Receiving end held by one subscriber

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::state::DeviceSnapshot;

type SnapshotSender = mpsc::UnboundedSender<Arc<DeviceSnapshot>>;

/// Unique identifier for a subscription.
///
/// IDs are unique within the lifetime of one [`SnapshotChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Fan-out channel delivering decoded snapshots to every subscriber.
///
/// Each subscriber owns an unbounded queue, so a slow subscriber never
/// loses snapshots and never blocks the publisher. Every subscriber
/// registered when [`publish`](Self::publish) is called receives that
/// snapshot exactly once, in publication order.
///
/// Closing the channel ends every subscription: pending snapshots can still
/// be drained, after which [`SnapshotSubscription::recv`] returns `None`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pwrctrl_lib::state::DeviceSnapshot;
/// use pwrctrl_lib::subscription::SnapshotChannel;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let channel = SnapshotChannel::new();
/// let mut sub = channel.subscribe();
///
/// let delivered = channel.publish(Arc::new(DeviceSnapshot::default()));
/// assert_eq!(delivered, 1);
/// assert!(sub.recv().await.is_some());
/// # }
/// ```
pub struct SnapshotChannel {
    next_id: AtomicU64,
    closed: AtomicBool,
    subscribers: RwLock<HashMap<SubscriptionId, SnapshotSender>>,
}

impl SnapshotChannel {
    /// Creates an open channel without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a new subscriber.
    ///
    /// Subscribing to a closed channel yields a subscription that is already
    /// at end of stream.
    pub fn subscribe(&self) -> SnapshotSubscription {
        let id = self.next_id();
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut subscribers = self.subscribers.write();
        if !self.closed.load(Ordering::Acquire) {
            subscribers.insert(id, sender);
        }

        SnapshotSubscription { id, receiver }
    }

    /// Removes a subscriber.
    ///
    /// Returns `true` if the subscription was registered. Snapshots already
    /// queued for it stay readable.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.write().remove(&id).is_some()
    }

    /// Delivers `snapshot` to every registered subscriber.
    ///
    /// Returns the number of subscribers that received it. Subscribers whose
    /// receiving end was dropped are pruned.
    pub fn publish(&self, snapshot: Arc<DeviceSnapshot>) -> usize {
        let mut delivered = 0;
        let mut gone = Vec::new();

        {
            let subscribers = self.subscribers.read();
            for (id, sender) in subscribers.iter() {
                if sender.send(Arc::clone(&snapshot)).is_ok() {
                    delivered += 1;
                } else {
                    gone.push(*id);
                }
            }
        }

        if !gone.is_empty() {
            let mut subscribers = self.subscribers.write();
            for id in gone {
                subscribers.remove(&id);
            }
        }

        delivered
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Closes the channel and ends every subscription.
    pub fn close(&self) {
        let mut subscribers = self.subscribers.write();
        self.closed.store(true, Ordering::Release);
        subscribers.clear();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for SnapshotChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnapshotChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotChannel")
            .field("subscribers", &self.subscriber_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Receiving end of a [`SnapshotChannel`] subscription.
#[derive(Debug)]
pub struct SnapshotSubscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Arc<DeviceSnapshot>>,
}

impl SnapshotSubscription {
    /// Returns the ID to pass to [`SnapshotChannel::unsubscribe`].
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the subscription has ended and every queued
    /// snapshot has been received.
    pub async fn recv(&mut self) -> Option<Arc<DeviceSnapshot>> {
        self.receiver.recv().await
    }

    /// Returns the next queued snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<DeviceSnapshot>> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::decode;

    fn snapshot(name: &str) -> Arc<DeviceSnapshot> {
        let raw = format!(
            "NET-PwrCtrl:{name}:10.0.0.5:255.255.255.0:10.0.0.1:0.0.0.0.0.1:\
             A,0:B,0:C,0:D,0:E,0:F,0:G,0:H,0:0:80"
        );
        Arc::new(decode(&raw).unwrap())
    }

    #[test]
    fn subscription_id_display() {
        assert_eq!(SubscriptionId::new(42).to_string(), "Sub(42)");
    }

    #[test]
    fn unique_ids() {
        let channel = SnapshotChannel::new();
        let a = channel.subscribe();
        let b = channel.subscribe();
        assert_ne!(a.id(), b.id());
        assert_eq!(channel.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn fans_out_in_order() {
        let channel = SnapshotChannel::new();
        let mut a = channel.subscribe();
        let mut b = channel.subscribe();

        assert_eq!(channel.publish(snapshot("first")), 2);
        assert_eq!(channel.publish(snapshot("second")), 2);

        for sub in [&mut a, &mut b] {
            assert_eq!(sub.recv().await.unwrap().identity().name, "first");
            assert_eq!(sub.recv().await.unwrap().identity().name, "second");
            assert!(sub.try_recv().is_none());
        }
    }

    #[test]
    fn late_subscriber_misses_earlier_snapshots() {
        let channel = SnapshotChannel::new();
        channel.publish(snapshot("early"));
        let mut sub = channel.subscribe();
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn unsubscribe_keeps_queued_snapshots() {
        let channel = SnapshotChannel::new();
        let mut sub = channel.subscribe();
        channel.publish(snapshot("queued"));

        assert!(channel.unsubscribe(sub.id()));
        assert!(!channel.unsubscribe(sub.id()));
        assert_eq!(channel.publish(snapshot("after")), 0);

        assert_eq!(sub.try_recv().unwrap().identity().name, "queued");
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let channel = SnapshotChannel::new();
        let sub = channel.subscribe();
        let _kept = channel.subscribe();
        drop(sub);

        assert_eq!(channel.publish(snapshot("x")), 1);
        assert_eq!(channel.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn close_ends_subscriptions() {
        let channel = SnapshotChannel::new();
        let mut sub = channel.subscribe();
        channel.publish(snapshot("last"));
        channel.close();

        assert!(channel.is_closed());
        assert_eq!(channel.publish(snapshot("dropped")), 0);
        assert_eq!(sub.recv().await.unwrap().identity().name, "last");
        assert!(sub.recv().await.is_none());

        let mut late = channel.subscribe();
        assert!(late.recv().await.is_none());
    }
}
