//! Recording mock host shared by the integration tests.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use intercom_core::{AnswerDelay, CallId, CallOps, EventSink, MediaDirection, Result};

/// Everything the engine did to the host, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Hangup(CallId, Option<u16>, Option<String>),
    SetAnswerDelay(CallId, AnswerDelay),
    ArmAnswerTimer(CallId, u32),
    SetMediaDirection(CallId, MediaDirection, MediaDirection),
    SetReceiveDirection(CallId, MediaDirection, MediaDirection),
    MuteLocalAudio(CallId, bool),
    SendDtmf(CallId, char),
    SetEventSuppression(CallId, bool),
    AddHeaderFilter(String),
    PlaceCall(String, String, String, MediaDirection, MediaDirection, u32),
    ModuleEvent(String, CallId, String),
    CallClosed(CallId, String),
}

/// Drop guard handed out by `release_handle`; records its drop order.
pub struct ReleaseGuard {
    tag: usize,
    log: Arc<Mutex<Vec<usize>>>,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.log.lock().push(self.tag);
    }
}

#[derive(Default)]
pub struct MockHost {
    pub headers: Mutex<HashMap<CallId, Vec<(String, String)>>>,
    pub extra: Mutex<HashMap<CallId, String>>,
    pub outgoing: Mutex<HashSet<CallId>>,
    pub answer_delay: Mutex<HashMap<CallId, u32>>,
    pub local_dirs: Mutex<HashMap<CallId, (MediaDirection, MediaDirection)>>,
    /// Number of polls for which the DTMF buffer still reports non-empty.
    pub dtmf_busy_polls: Mutex<u32>,
    pub ops: Mutex<Vec<Op>>,
    pub released: Arc<Mutex<Vec<usize>>>,
    next_tag: Mutex<usize>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_call(&self, call: &CallId, headers: &[(&str, &str)]) {
        self.headers.lock().insert(
            call.clone(),
            headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        );
    }

    pub fn set_extra(&self, call: &CallId, extra: &str) {
        self.extra.lock().insert(call.clone(), extra.to_string());
    }

    pub fn set_outgoing(&self, call: &CallId) {
        self.outgoing.lock().insert(call.clone());
    }

    pub fn set_answer_delay(&self, call: &CallId, secs: u32) {
        self.answer_delay.lock().insert(call.clone(), secs);
    }

    pub fn set_local_dirs(&self, call: &CallId, audio: MediaDirection, video: MediaDirection) {
        self.local_dirs.lock().insert(call.clone(), (audio, video));
    }

    pub fn set_dtmf_busy_polls(&self, polls: u32) {
        *self.dtmf_busy_polls.lock() = polls;
    }

    /// Fresh drop guard for scheduling directly on the deferred queue.
    /// Guards are tagged in creation order; dropping pushes the tag.
    pub fn new_guard(&self) -> Box<ReleaseGuard> {
        let mut next = self.next_tag.lock();
        let tag = *next;
        *next += 1;
        Box::new(ReleaseGuard {
            tag,
            log: self.released.clone(),
        })
    }

    pub fn released_order(&self) -> Vec<usize> {
        self.released.lock().clone()
    }

    pub fn recorded(&self) -> Vec<Op> {
        self.ops.lock().clone()
    }

    pub fn record(&self, op: Op) {
        self.ops.lock().push(op);
    }

    pub fn hangups(&self) -> Vec<Op> {
        self.recorded()
            .into_iter()
            .filter(|op| matches!(op, Op::Hangup(..)))
            .collect()
    }

    pub fn module_events(&self, kind: &str) -> Vec<(CallId, String)> {
        self.recorded()
            .into_iter()
            .filter_map(|op| match op {
                Op::ModuleEvent(k, call, detail) if k == kind => Some((call, detail)),
                _ => None,
            })
            .collect()
    }

    pub fn overrides(&self) -> Vec<String> {
        self.module_events("override-aufile")
            .into_iter()
            .map(|(_, detail)| detail)
            .collect()
    }
}

#[async_trait]
impl CallOps for MockHost {
    async fn custom_headers(&self, call: &CallId) -> Vec<(String, String)> {
        self.headers.lock().get(call).cloned().unwrap_or_default()
    }

    async fn account_extra(&self, call: &CallId) -> Option<String> {
        self.extra.lock().get(call).cloned()
    }

    async fn is_outgoing(&self, call: &CallId) -> bool {
        self.outgoing.lock().contains(call)
    }

    async fn answer_delay(&self, call: &CallId) -> Option<u32> {
        self.answer_delay.lock().get(call).copied()
    }

    async fn hangup(
        &self,
        call: &CallId,
        status: Option<u16>,
        reason: Option<&str>,
    ) -> Result<()> {
        self.record(Op::Hangup(call.clone(), status, reason.map(String::from)));
        Ok(())
    }

    async fn set_answer_delay(&self, call: &CallId, delay: AnswerDelay) -> Result<()> {
        self.record(Op::SetAnswerDelay(call.clone(), delay));
        Ok(())
    }

    async fn arm_answer_timer(&self, call: &CallId, secs: u32) -> Result<()> {
        self.record(Op::ArmAnswerTimer(call.clone(), secs));
        Ok(())
    }

    async fn local_media_directions(&self, call: &CallId) -> (MediaDirection, MediaDirection) {
        self.local_dirs
            .lock()
            .get(call)
            .copied()
            .unwrap_or((MediaDirection::SendRecv, MediaDirection::Inactive))
    }

    async fn set_media_direction(
        &self,
        call: &CallId,
        audio: MediaDirection,
        video: MediaDirection,
    ) -> Result<()> {
        self.record(Op::SetMediaDirection(call.clone(), audio, video));
        Ok(())
    }

    async fn set_receive_direction(
        &self,
        call: &CallId,
        audio: MediaDirection,
        video: MediaDirection,
    ) -> Result<()> {
        self.record(Op::SetReceiveDirection(call.clone(), audio, video));
        Ok(())
    }

    async fn mute_local_audio(&self, call: &CallId, muted: bool) -> Result<()> {
        self.record(Op::MuteLocalAudio(call.clone(), muted));
        Ok(())
    }

    async fn send_dtmf(&self, call: &CallId, digit: char) -> Result<()> {
        self.record(Op::SendDtmf(call.clone(), digit));
        Ok(())
    }

    async fn dtmf_buffer_empty(&self, _call: &CallId) -> bool {
        let mut busy = self.dtmf_busy_polls.lock();
        if *busy > 0 {
            *busy -= 1;
            false
        } else {
            true
        }
    }

    async fn set_event_suppression(&self, call: &CallId, suppress: bool) {
        self.record(Op::SetEventSuppression(call.clone(), suppress));
    }

    async fn add_header_filter(&self, name: &str) -> Result<()> {
        self.record(Op::AddHeaderFilter(name.to_string()));
        Ok(())
    }

    async fn place_call(
        &self,
        target: &str,
        header: (&str, &str),
        audio: MediaDirection,
        video: MediaDirection,
        answer_delay_secs: u32,
    ) -> Result<CallId> {
        let call = CallId::new();
        self.add_call(&call, &[header]);
        self.set_outgoing(&call);
        self.record(Op::PlaceCall(
            target.to_string(),
            header.0.to_string(),
            header.1.to_string(),
            audio,
            video,
            answer_delay_secs,
        ));
        Ok(call)
    }

    async fn release_handle(&self, _call: &CallId) -> Option<Box<dyn Any + Send>> {
        Some(self.new_guard())
    }
}

#[async_trait]
impl EventSink for MockHost {
    async fn module_event(&self, kind: &str, call: &CallId, detail: &str) {
        self.record(Op::ModuleEvent(
            kind.to_string(),
            call.clone(),
            detail.to_string(),
        ));
    }

    async fn call_closed(&self, call: &CallId, reason: &str) {
        self.record(Op::CallClosed(call.clone(), reason.to_string()));
    }
}
