//! In-process push channel for notifications.
//!
//! Each recipient gets a broadcast channel, created on first subscribe and
//! dropped again once nobody listens. The hub only fans out notifications
//! that were already stored; a recipient with no live subscriber simply
//! finds them in their list later.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use crate::models::Notification;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct NotificationHub {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<Notification>>>>,
    capacity: usize,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Capacity is per recipient. Slow subscribers that fall further behind
    /// than this see a lag error and skip ahead.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    /// Push a notification to its recipient's live subscribers.
    /// Returns how many subscribers received it. A channel whose receivers
    /// are all gone is removed.
    pub fn publish(&self, notification: &Notification) -> usize {
        let mut channels = self.channels.lock().expect("hub lock poisoned");
        let Some(tx) = channels.get(&notification.recipient_id) else {
            return 0;
        };

        match tx.send(notification.clone()) {
            Ok(received) => received,
            Err(_) => {
                channels.remove(&notification.recipient_id);
                0
            }
        }
    }

    pub fn subscribe(&self, recipient_id: Uuid) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.lock().expect("hub lock poisoned");
        channels
            .entry(recipient_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe as a stream. The recipient's channel is released when the
    /// last feed or receiver for it is dropped.
    pub fn feed(&self, recipient_id: Uuid) -> NotificationFeed {
        NotificationFeed {
            inner: Some(Box::pin(BroadcastStream::new(self.subscribe(recipient_id)))),
            hub: self.clone(),
        }
    }

    /// Drop channels nobody listens to any more.
    pub fn cleanup(&self) {
        let mut channels = self.channels.lock().expect("hub lock poisoned");
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }

    pub fn subscriber_count(&self, recipient_id: Uuid) -> usize {
        let channels = self.channels.lock().expect("hub lock poisoned");
        channels
            .get(&recipient_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Live notifications for one recipient, as a stream.
///
/// Yields `Lagged` when the subscriber fell behind the channel capacity.
pub struct NotificationFeed {
    inner: Option<Pin<Box<BroadcastStream<Notification>>>>,
    hub: NotificationHub,
}

impl Stream for NotificationFeed {
    type Item = Result<Notification, BroadcastStreamRecvError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut() {
            Some(inner) => inner.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for NotificationFeed {
    fn drop(&mut self) {
        // The receiver has to go before the sweep can see the channel as idle.
        self.inner.take();
        self.hub.cleanup();
    }
}
