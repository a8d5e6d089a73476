//! Inbound email webhook: payload model and signature verification.

pub mod payload;
pub mod signature;

pub use payload::{AttachmentInfo, InboundEmailPayload, Recipients};
pub use signature::{sign, verify_signature, SignatureError, DEFAULT_SIGNATURE_HEADER};
