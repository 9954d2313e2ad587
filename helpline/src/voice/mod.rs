//! Voice worker: serves voice jobs from the media platform.
//!
//! The worker registers over a websocket, receives room job assignments and
//! answers transcribed caller utterances through the conversation manager.
//! The transport is a trait so tests can run jobs without a media server.

pub mod protocol;
pub mod worker;

pub use protocol::{ServerFrame, WorkerFrame};
pub use worker::{JobTransport, VoiceWorker, WorkerOptions, INIT_TOKEN};
