//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Text generator implementations (Gemini, canned, mock)
//! - `http` - axum routes, DTOs and the snapshot WebSocket

pub mod ai;
pub mod http;
