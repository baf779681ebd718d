use super::{Message, Transport, View};
use async_trait::async_trait;
use derive_more::{Display, Error};
use std::fmt::{self, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{instrument, warn};

/// Identifies a message posted to or sent through a [`Room`].
pub type MessageId = u64;

/// The reason why a [`Room`] could not deliver a message.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum RoomError {
    #[display(fmt = "the room has been closed")]
    Closed,
}

/// Something a [`Seat`] did to the room.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Update {
    Sent(MessageId, View),
    Edited(MessageId, View),
    Deleted(MessageId),
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Update::Sent(id, view) => write!(f, "#{id} {view}"),
            Update::Edited(id, view) => write!(f, "#{id} (edited) {view}"),
            Update::Deleted(id) => write!(f, "#{id} (deleted)"),
        }
    }
}

/// An in-process chat room.
///
/// Every [`Seat`] sees every message posted after it joined.
/// Whatever seats send, edit or delete is reported as an [`Update`].
#[derive(Debug, Clone)]
pub struct Room {
    inbox: broadcast::Sender<Message<String, MessageId>>,
    outbox: mpsc::UnboundedSender<Update>,
    ids: Arc<AtomicU64>,
}

impl Room {
    /// Opens a room that buffers up to `capacity` messages per seat.
    pub fn new(capacity: usize) -> (Self, mpsc::UnboundedReceiver<Update>) {
        let (inbox, _) = broadcast::channel(capacity.max(1));
        let (outbox, updates) = mpsc::unbounded_channel();
        let ids = Arc::new(AtomicU64::new(1));
        (Room { inbox, outbox, ids }, updates)
    }

    /// Posts a message on behalf of a participant.
    #[instrument(level = "trace", skip(self), ret)]
    pub fn post(&self, author: &str, content: &str) -> Message<String, MessageId> {
        let msg = Message {
            author: author.to_string(),
            content: content.to_string(),
            handle: self.ids.fetch_add(1, Ordering::Relaxed),
        };

        // Nobody might be listening yet.
        self.inbox.send(msg.clone()).ok();
        msg
    }

    /// Takes a seat in this room.
    pub fn join(&self) -> Seat {
        Seat {
            inbox: self.inbox.subscribe(),
            outbox: self.outbox.clone(),
            ids: self.ids.clone(),
        }
    }
}

/// A [`Transport`] that delivers messages through a [`Room`].
///
/// The seat stops receiving messages once every handle to the room is dropped.
#[derive(Debug)]
pub struct Seat {
    inbox: broadcast::Receiver<Message<String, MessageId>>,
    outbox: mpsc::UnboundedSender<Update>,
    ids: Arc<AtomicU64>,
}

impl Seat {
    fn publish(&self, update: Update) -> Result<(), RoomError> {
        self.outbox.send(update).map_err(|_| RoomError::Closed)
    }
}

#[async_trait]
impl Transport for Seat {
    type User = String;
    type Handle = MessageId;
    type Error = RoomError;

    #[instrument(level = "trace", skip(self), err)]
    async fn send(&mut self, view: &View) -> Result<MessageId, RoomError> {
        let id = self.ids.fetch_add(1, Ordering::Relaxed);
        self.publish(Update::Sent(id, view.clone()))?;
        Ok(id)
    }

    #[instrument(level = "trace", skip(self), err)]
    async fn edit(&mut self, handle: &MessageId, view: &View) -> Result<(), RoomError> {
        self.publish(Update::Edited(*handle, view.clone()))
    }

    #[instrument(level = "trace", skip(self), err)]
    async fn delete(&mut self, handle: &MessageId) -> Result<(), RoomError> {
        self.publish(Update::Deleted(*handle))
    }

    #[instrument(level = "trace", skip(self), ret, err)]
    async fn recv(&mut self) -> Result<Message<String, MessageId>, RoomError> {
        use broadcast::error::RecvError;

        loop {
            match self.inbox.recv().await {
                Ok(msg) => break Ok(msg),
                Err(RecvError::Closed) => break Err(RoomError::Closed),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "seat fell behind the room"),
            }
        }
    }
}
