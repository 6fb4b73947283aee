//! Gateway wire protocol
//!
//! Frames are JSON objects with an op code, optional event type/sequence,
//! and an opaque payload. This module defines the op codes, the frame
//! format, the payloads the client sends and receives, and the close-code
//! vocabulary.

mod close_codes;
mod frame;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use frame::GatewayFrame;
pub use opcodes::OpCode;
pub use payloads::{
    ClientProperties, HelloPayload, IdentifyPayload, ReadyPayload, ResumePayload,
};
