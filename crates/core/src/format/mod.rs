//! Container/codec compatibility model.
//!
//! A static table of which codecs each output container carries natively.
//! The planner consults it to decide whether a stream can be copied as-is
//! or has to be re-encoded.

mod compat;
mod types;

pub use compat::{accepted_codecs, can_copy};
pub use types::{CodecId, ContainerFormat, EncodeTemplate, StreamKind};
