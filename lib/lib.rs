/// Chess domain types.
pub mod chess;
/// Games of chess refereed over chat.
pub mod session;
/// Chat transport abstractions.
pub mod transport;
