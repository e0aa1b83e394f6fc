//! Speech-to-text client.
//!
//! The pipeline talks to the [`SpeechToText`] trait; [`AssemblyAiClient`]
//! implements it over the AssemblyAI v2 REST API (upload, submit, poll).

pub mod client;
pub mod error;
pub mod types;

pub use client::{AssemblyAiClient, SpeechConfig};
pub use error::{SpeechError, SpeechResult};
pub use types::{SpeechToText, TranscribeOptions};
