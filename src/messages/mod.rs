pub mod codec;
pub mod types;
pub mod wire;

pub use codec::{decode, encode, CodecError, BUF_MESSAGE_SIZE, PROTOCOL_VERSION};
pub use types::{ErrorCode, Message, MAX_NAME_LEN};
pub use wire::{
    FramedMessage, WireConfig, WireProtocolError, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT,
    LENGTH_PREFIX_SIZE,
};
