//! Host-facing trait seams.
//!
//! The admission core never touches the signaling stack or the call
//! objects directly; the host implements [`CallOps`] over its call layer
//! and [`EventSink`] over its notification bus, and hands both to the
//! engine as `Arc<dyn _>`. All operations are async so the host is free to
//! bridge to whatever runtime its call objects live on.

use std::any::Any;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AnswerDelay, CallId, MediaDirection};

/// Operations the admission core performs on host-owned calls.
#[async_trait]
pub trait CallOps: Send + Sync {
    /// Ordered custom header pairs of the call, readable at any event.
    async fn custom_headers(&self, call: &CallId) -> Vec<(String, String)>;

    /// The account's free-form `extra` parameter string, if any.
    async fn account_extra(&self, call: &CallId) -> Option<String>;

    async fn is_outgoing(&self, call: &CallId) -> bool;

    /// Configured auto-answer delay for the call; `None` when auto answer
    /// is disabled.
    async fn answer_delay(&self, call: &CallId) -> Option<u32>;

    /// Terminates the call. A `None` status hangs up without a SIP reason.
    async fn hangup(&self, call: &CallId, status: Option<u16>, reason: Option<&str>)
        -> Result<()>;

    async fn set_answer_delay(&self, call: &CallId, delay: AnswerDelay) -> Result<()>;

    /// Arms the delayed-auto-answer timer on the call.
    async fn arm_answer_timer(&self, call: &CallId, secs: u32) -> Result<()>;

    /// Local media directions currently negotiated (audio, video).
    async fn local_media_directions(&self, call: &CallId) -> (MediaDirection, MediaDirection);

    async fn set_media_direction(
        &self,
        call: &CallId,
        audio: MediaDirection,
        video: MediaDirection,
    ) -> Result<()>;

    /// Overrides the directions offered in provisional responses, used for
    /// the one-way preview listen.
    async fn set_receive_direction(
        &self,
        call: &CallId,
        audio: MediaDirection,
        video: MediaDirection,
    ) -> Result<()>;

    async fn mute_local_audio(&self, call: &CallId, muted: bool) -> Result<()>;

    async fn send_dtmf(&self, call: &CallId, digit: char) -> Result<()>;

    /// Whether the outbound telephone-event buffer has been fully flushed.
    async fn dtmf_buffer_empty(&self, call: &CallId) -> bool;

    /// Suppresses (or re-enables) module-visible notifications for a call.
    async fn set_event_suppression(&self, call: &CallId, suppress: bool);

    /// Registers interest in a custom header so the signaling layer
    /// extracts it on future calls.
    async fn add_header_filter(&self, name: &str) -> Result<()>;

    /// Places an outgoing call carrying one custom header and the given
    /// media directions; `answer_delay_secs` is requested from the peer via
    /// the host's auto-answer mechanism.
    async fn place_call(
        &self,
        target: &str,
        header: (&str, &str),
        audio: MediaDirection,
        video: MediaDirection,
        answer_delay_secs: u32,
    ) -> Result<CallId>;

    /// Hands over the owned handle backing a call so it can be released off
    /// the current dispatch stack (see [`crate::deferred`]). Returns `None`
    /// when the host has nothing to release for this call.
    async fn release_handle(&self, call: &CallId) -> Option<Box<dyn Any + Send>>;
}

/// Outbound notifications consumed by an external renderer.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// A module-scoped notification, e.g. kind `"override-aufile"` with
    /// detail `"sip_autoanswer_aufile:icnormal_aufile"`.
    async fn module_event(&self, kind: &str, call: &CallId, detail: &str);

    /// The call-closed notification emitted alongside a rejection.
    async fn call_closed(&self, call: &CallId, reason: &str);
}
