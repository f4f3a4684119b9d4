//! Shared data model, ring buffers, fingerprinting and error taxonomy
//! for the gasoline observability daemon.
//!
//! Every other crate in the workspace depends on this one; it carries
//! no knowledge of HTTP, stdio, or JSON-RPC — only the entities and
//! primitives the spec's data model (§3) and error design (§7) define.

pub mod client_id;
pub mod entities;
pub mod error;
pub mod fingerprint;
pub mod json;
pub mod ring_buffer;

pub use client_id::derive_client_id;
pub use error::{GasolineError, GasolineResult};
pub use ring_buffer::{BufferCursor, CursorRead, RingBuffer};
