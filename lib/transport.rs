use async_trait::async_trait;
use std::fmt::{Debug, Display};

mod room;
mod view;

pub use room::*;
pub use view::*;

/// A chat message.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Message<U, H> {
    /// Who wrote the message.
    pub author: U,
    /// What the message says.
    pub content: String,
    /// Refers to the message itself, so it can be deleted.
    pub handle: H,
}

/// Trait for types that deliver chat messages.
#[async_trait]
pub trait Transport: Send {
    /// Identifies a participant of the chat.
    ///
    /// Its [`Display`] implementation is expected to mention the participant.
    type User: Debug + Display + Clone + Eq + Send + Sync;

    /// Refers to a message previously sent or received.
    type Handle: Debug + Clone + Send + Sync;

    /// The reason why delivering a message failed.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends a new message.
    async fn send(&mut self, view: &View) -> Result<Self::Handle, Self::Error>;

    /// Replaces the contents of a message previously sent.
    async fn edit(&mut self, handle: &Self::Handle, view: &View) -> Result<(), Self::Error>;

    /// Deletes a message.
    async fn delete(&mut self, handle: &Self::Handle) -> Result<(), Self::Error>;

    /// Receives the next message.
    async fn recv(&mut self) -> Result<Message<Self::User, Self::Handle>, Self::Error>;

    /// Waits for the next message that passes the filter.
    ///
    /// Messages rejected by the filter are dropped for good.
    async fn wait_for<F>(
        &mut self,
        mut filter: F,
    ) -> Result<Message<Self::User, Self::Handle>, Self::Error>
    where
        F: FnMut(&Message<Self::User, Self::Handle>) -> bool + Send,
    {
        loop {
            let msg = self.recv().await?;
            if filter(&msg) {
                break Ok(msg);
            }
        }
    }
}

#[cfg(test)]
mockall::mock! {
    pub(crate) Transport {
        pub fn send(&mut self, view: &View) -> Result<u64, RoomError>;
        pub fn edit(&mut self, handle: &u64, view: &View) -> Result<(), RoomError>;
        pub fn delete(&mut self, handle: &u64) -> Result<(), RoomError>;
        pub fn recv(&mut self) -> Result<Message<String, u64>, RoomError>;
    }
}

#[cfg(test)]
#[async_trait]
impl Transport for MockTransport {
    type User = String;
    type Handle = u64;
    type Error = RoomError;

    async fn send(&mut self, view: &View) -> Result<Self::Handle, Self::Error> {
        MockTransport::send(self, view)
    }

    async fn edit(&mut self, handle: &Self::Handle, view: &View) -> Result<(), Self::Error> {
        MockTransport::edit(self, handle, view)
    }

    async fn delete(&mut self, handle: &Self::Handle) -> Result<(), Self::Error> {
        MockTransport::delete(self, handle)
    }

    async fn recv(&mut self) -> Result<Message<Self::User, Self::Handle>, Self::Error> {
        MockTransport::recv(self)
    }
}
