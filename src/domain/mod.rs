//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine trait)
//! - `study` - Staged study reducer, personas and chat transcript
//!
//! Nothing in this layer performs I/O.

pub mod foundation;
pub mod study;
