//! Hidden-call signaling state machine.
//!
//! A hidden call exists only to transmit a DTMF code: once the outgoing
//! call is established the stored code is sent digit by digit, followed by
//! a reserved release digit, and the call is hung up as soon as the
//! outbound telephone-event buffer has drained. The media layer offers no
//! drain-completion signal, so draining is polled on a short retry timer.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{IntercomError, Result};
use crate::host::CallOps;
use crate::types::CallId;

/// Reserved digit sent after the code to signal end-of-sequence.
pub const DTMF_RELEASE: char = 'R';

/// Poll interval for the outbound DTMF buffer.
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// States of one hidden-call session. Terminal state is session removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenState {
    /// Created, waiting for the call to be established and started.
    Established,
    /// Code transmission in progress.
    Send,
    /// Code sent; polling until the DTMF buffer drains, then hang up.
    Close,
}

struct Session {
    state: HiddenState,
    code: String,
    timer: Option<JoinHandle<()>>,
}

struct Inner {
    sessions: DashMap<CallId, Session>,
    ops: Arc<dyn CallOps>,
}

/// Owner of all active hidden-call sessions, keyed by call.
#[derive(Clone)]
pub struct HiddenCallManager {
    inner: Arc<Inner>,
}

impl HiddenCallManager {
    pub fn new(ops: Arc<dyn CallOps>) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: DashMap::new(),
                ops,
            }),
        }
    }

    /// Registers a session for an outgoing hidden call before it is
    /// established. At most one session may exist per call.
    pub fn register(&self, call: &CallId, code: &str) -> Result<()> {
        if self.inner.sessions.contains_key(call) {
            return Err(IntercomError::HiddenSessionExists(call.clone()));
        }

        self.inner.sessions.insert(
            call.clone(),
            Session {
                state: HiddenState::Established,
                code: code.to_string(),
                timer: None,
            },
        );
        Ok(())
    }

    /// Starts code transmission for an established hidden call.
    ///
    /// Only valid once, from state [`HiddenState::Established`]; any later
    /// call is a precondition failure with no side effects. Sends every
    /// digit of the code plus the release digit best-effort, then arms the
    /// drain-poll timer and moves to [`HiddenState::Close`].
    pub async fn start(&self, call: &CallId) -> Result<()> {
        let code = {
            let mut session = self
                .inner
                .sessions
                .get_mut(call)
                .ok_or_else(|| IntercomError::NoHiddenSession(call.clone()))?;

            if session.state != HiddenState::Established {
                return Err(IntercomError::InvalidTransition(session.state));
            }

            session.state = HiddenState::Send;
            session.code.clone()
        };

        info!("intercom: hidden call {} sending {} digit(s)", call, code.len());

        for digit in code.chars().chain(std::iter::once(DTMF_RELEASE)) {
            // A mid-sequence failure does not abort the sequence.
            if let Err(e) = self.inner.ops.send_dtmf(call, digit).await {
                debug!("intercom: hidden call {} digit failed: {}", call, e);
            }
        }

        // The session may have been torn down while the digits went out.
        if let Some(mut session) = self.inner.sessions.get_mut(call) {
            session.state = HiddenState::Close;
            session.timer = Some(spawn_drain_poll(self.inner.clone(), call.clone()));
        }

        Ok(())
    }

    /// Tears down the session for a call, cancelling its timer. No-op when
    /// no session exists; safe to call repeatedly.
    pub fn close(&self, call: &CallId) {
        if let Some((_, session)) = self.inner.sessions.remove(call) {
            if let Some(timer) = session.timer {
                timer.abort();
            }
            debug!("intercom: hidden call {} closed", call);
        }
    }

    /// Current state of a call's session, if one exists.
    pub fn state(&self, call: &CallId) -> Option<HiddenState> {
        self.inner.sessions.get(call).map(|s| s.state)
    }
}

/// Polls the outbound DTMF buffer every [`RETRY_INTERVAL`]; once it has
/// drained, hangs up without a SIP reason and removes the session.
fn spawn_drain_poll(inner: Arc<Inner>, call: CallId) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(RETRY_INTERVAL).await;

            if !inner.sessions.contains_key(&call) {
                break;
            }

            if inner.ops.dtmf_buffer_empty(&call).await {
                if let Err(e) = inner.ops.hangup(&call, None, None).await {
                    debug!("intercom: hidden call {} hangup failed: {}", call, e);
                }
                inner.sessions.remove(&call);
                break;
            }
        }
    })
}
