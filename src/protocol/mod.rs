//! Wire protocol for driving a negotiation thread

pub mod codec;
pub mod message;

pub use codec::{decode_line, encode_line};
pub use message::{ChatCommand, ChatEvent, ErrorKind};
