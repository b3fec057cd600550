//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TextGenerator` - the single external text-generation call

mod text_generator;

pub use text_generator::{GenerationError, GeneratorInfo, TextGenerator};
