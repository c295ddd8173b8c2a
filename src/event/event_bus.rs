// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for manager events.

use tokio::sync::broadcast;

use super::DeviceEvent;

/// Broadcast bus carrying the [`DeviceEvent`]s of every managed device.
///
/// Backed by a bounded tokio broadcast channel. A subscriber that falls
/// more than the capacity behind receives `RecvError::Lagged` and skips the
/// oldest events. Use [`Device::subscribe`](crate::Device::subscribe) when
/// every snapshot must be seen.
///
/// Clones share the same channel.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::event::{DeviceId, DeviceEvent, EventBus};
///
/// let bus = EventBus::with_capacity(16);
/// let mut rx = bus.subscribe();
///
/// let id = DeviceId::new();
/// assert_eq!(bus.publish_counted(DeviceEvent::device_removed(id)), 1);
/// assert_eq!(rx.try_recv().unwrap().device_id(), id);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Default channel capacity.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a bus with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering at most `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Without receivers the event is discarded.
    pub fn publish(&self, event: DeviceEvent) {
        let _ = self.publish_counted(event);
    }

    /// Publishes an event and returns how many receivers it reached.
    #[must_use]
    pub fn publish_counted(&self, event: DeviceEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DeviceId;

    #[test]
    fn receiver_count_follows_subscriptions() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx = bus.subscribe();
        let _rx2 = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn publish_without_receivers_is_discarded() {
        let bus = EventBus::new();
        assert_eq!(bus.publish_counted(DeviceEvent::device_removed(DeviceId::new())), 0);
    }

    #[tokio::test]
    async fn every_receiver_gets_each_event() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let id = DeviceId::new();
        bus.publish(DeviceEvent::device_added(id, "HUTOG"));

        for rx in [&mut a, &mut b] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.device_id(), id);
            assert!(event.is_lifecycle());
        }
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for _ in 0..3 {
            bus.publish(DeviceEvent::device_removed(DeviceId::new()));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }
}
