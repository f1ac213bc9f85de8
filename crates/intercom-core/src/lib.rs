//! # Intercom-Core - Call Admission for Intercom Calls
//!
//! This crate implements the call-admission core of an intercom endpoint:
//! it inspects the intent header carried on a call (`Subject` by default),
//! classifies the call's purpose, resolves per-account policy overrides
//! and decides whether to accept, reject or override the call. Hidden
//! calls additionally drive a small timer-based state machine that injects
//! a DTMF code into the established call before tearing it down.
//!
//! The signaling stack, call objects and media pipelines stay external:
//! the host implements [`CallOps`] and [`EventSink`] and forwards call
//! lifecycle events to [`AdmissionEngine::on_event`]. Override decisions
//! leave the engine as notification strings such as
//! `sip_autoanswer_aufile:icnormal_aufile`, consumed by whatever component
//! renders ring and answer tones.
//!
//! ```no_run
//! use std::sync::Arc;
//! use intercom_core::{AdmissionEngine, CallEvent, CallId, IntercomConfig};
//! # use intercom_core::{CallOps, EventSink};
//!
//! # async fn run(ops: Arc<dyn CallOps>, sink: Arc<dyn EventSink>) {
//! let config = IntercomConfig::new()
//!     .with_custom_intents(["Intercom/Door,sendrecv,yes,door.wav"]);
//! let engine = AdmissionEngine::new(config, ops, sink);
//!
//! let call = CallId::new();
//! engine.on_event(CallEvent::Incoming, &call).await;
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod hidden;
pub mod host;
pub mod outgoing;
pub mod policy;
pub mod registry;
pub mod types;

pub use config::IntercomConfig;
pub use deferred::DeferredDestructionQueue;
pub use engine::AdmissionEngine;
pub use error::{IntercomError, Result};
pub use hidden::{HiddenCallManager, HiddenState};
pub use host::{CallOps, EventSink};
pub use outgoing::OutgoingIntent;
pub use policy::{resolve, EffectivePolicy};
pub use registry::{CustomIntentEntry, IntentRegistry};
pub use types::{AnswerDelay, CallEvent, CallId, Intent, MediaDirection};
