//! UX Study Chat - Staged UX study playback with persona-grounded chat.
//!
//! A user submits a study setup; the service plays back a five-stage progress
//! sequence on a timer while the user chats with the study. Replies come from
//! one external text-generation call grounded in scripted persona feedback.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
