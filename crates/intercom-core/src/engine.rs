//! Call-admission engine.
//!
//! Stateless dispatcher over the call lifecycle events the host delivers.
//! For each event the engine re-classifies the call's custom headers and
//! decides to accept, reject (406) or override the call, emitting override
//! instructions consumed by an external renderer. It owns the hidden-call
//! session manager and the deferred destruction queue, and carries no
//! per-call state of its own between events.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::IntercomConfig;
use crate::deferred::DeferredDestructionQueue;
use crate::hidden::HiddenCallManager;
use crate::host::{CallOps, EventSink};
use crate::policy::{resolve, EffectivePolicy};
use crate::registry::IntentRegistry;
use crate::types::{AnswerDelay, CallEvent, CallId, Intent, MediaDirection};

/// Notification kinds emitted through [`EventSink::module_event`].
pub const EVENT_INCOMING: &str = "incoming";
pub const EVENT_OUTGOING: &str = "outgoing";
pub const EVENT_OVERRIDE_AUFILE: &str = "override-aufile";
pub const EVENT_INCOMING_ESTABLISHED: &str = "incoming-established";
pub const EVENT_OUTGOING_ESTABLISHED: &str = "outgoing-established";

/// Override instructions understood by the renderer.
pub const OVERRIDE_NORMAL: &str = "sip_autoanswer_aufile:icnormal_aufile";
pub const OVERRIDE_RING: &str = "ring_aufile:icring_aufile";
pub const OVERRIDE_ANNOUNCE: &str = "sip_autoanswer_aufile:icannounce_aufile";
pub const OVERRIDE_FORCE: &str = "sip_autoanswer_aufile:icforce_aufile";
pub const OVERRIDE_SURVEIL: &str = "sip_autoanswer_aufile:none";
pub const OVERRIDE_PREVIEW: &str = "ring_aufile:icpreview_aufile";
pub const OVERRIDE_RINGBACK: &str = "ringback_aufile:icringback_aufile";

const STATUS_NOT_ACCEPTABLE: u16 = 406;
const REASON_NOT_ACCEPTABLE: &str = "Not Acceptable";

pub struct AdmissionEngine {
    config: IntercomConfig,
    registry: Arc<IntentRegistry>,
    ops: Arc<dyn CallOps>,
    sink: Arc<dyn EventSink>,
    hidden: HiddenCallManager,
    deferred: DeferredDestructionQueue,
}

impl AdmissionEngine {
    pub fn new(config: IntercomConfig, ops: Arc<dyn CallOps>, sink: Arc<dyn EventSink>) -> Self {
        let registry = Arc::new(IntentRegistry::from_lines(&config.custom_intents));
        let hidden = HiddenCallManager::new(ops.clone());

        Self {
            config,
            registry,
            ops,
            sink,
            hidden,
            deferred: DeferredDestructionQueue::new(),
        }
    }

    pub fn config(&self) -> &IntercomConfig {
        &self.config
    }

    pub(crate) fn ops(&self) -> &Arc<dyn CallOps> {
        &self.ops
    }

    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    pub fn hidden(&self) -> &HiddenCallManager {
        &self.hidden
    }

    pub fn deferred(&self) -> &DeferredDestructionQueue {
        &self.deferred
    }

    /// Re-loads the custom-intent registry from the configured source
    /// lines, the operator reload command.
    pub fn reload_registry(&self) {
        self.registry.reload(&self.config.custom_intents);
    }

    /// Re-loads the registry from replacement source text.
    pub fn reload_registry_with<S: AsRef<str>>(&mut self, lines: Vec<S>) {
        self.config.custom_intents = lines.iter().map(|l| l.as_ref().to_string()).collect();
        self.registry.reload(&self.config.custom_intents);
    }

    /// Entry point for host-delivered call lifecycle events.
    pub async fn on_event(&self, event: CallEvent, call: &CallId) {
        // The hidden gate runs on every event except DTMF start/end: a
        // hidden intercom call must never produce module-visible
        // notifications while it progresses. Orthogonal to the per-event
        // admission dispatch below.
        if !matches!(event, CallEvent::DtmfStart | CallEvent::DtmfEnd) {
            self.refresh_event_suppression(call).await;
        }

        match event {
            CallEvent::Created => {
                if let Err(e) = self.ops.add_header_filter(&self.config.intent_header).await {
                    warn!("intercom: could not add header filter: {}", e);
                }
            }
            CallEvent::Incoming => self.on_incoming(call).await,
            CallEvent::LocalOfferReady => self.on_local_offer(call).await,
            CallEvent::Established => self.on_established(call).await,
            CallEvent::Closed => self.hidden.close(call),
            CallEvent::DtmfStart | CallEvent::DtmfEnd => {}
        }
    }

    fn classify_pair(&self, name: &str, value: &str) -> Intent {
        let snapshot = self.registry.snapshot();
        classify(
            name,
            value,
            &snapshot,
            &self.config.intent_header,
            &self.config.preview_subject,
        )
    }

    async fn effective_policy(&self, call: &CallId) -> EffectivePolicy {
        let extra = self.ops.account_extra(call).await;
        resolve(&self.config.policy, extra.as_deref())
    }

    /// Keeps the host's per-call event suppression in sync with whether the
    /// call is a hidden intercom call.
    async fn refresh_event_suppression(&self, call: &CallId) {
        for (name, value) in self.ops.custom_headers(call).await {
            let intent = self.classify_pair(&name, &value);
            if !intent.is_none() {
                self.ops
                    .set_event_suppression(call, intent == Intent::Hidden)
                    .await;
            }
        }
    }

    /// Terminates the call with 406, notifies, and schedules the backing
    /// handle for release on the next tick. The rejection runs inside a
    /// handler invoked by this very call, so the handle must not be freed
    /// inline.
    async fn reject(&self, call: &CallId) {
        info!("intercom: rejecting call {}", call);

        if let Err(e) = self
            .ops
            .hangup(call, Some(STATUS_NOT_ACCEPTABLE), Some(REASON_NOT_ACCEPTABLE))
            .await
        {
            warn!("intercom: hangup of {} failed: {}", call, e);
        }

        self.sink.call_closed(call, REASON_NOT_ACCEPTABLE).await;

        if let Some(handle) = self.ops.release_handle(call).await {
            self.deferred.schedule(handle);
        }
    }

    async fn emit_override(&self, call: &CallId, instruction: &str) {
        self.sink
            .module_event(EVENT_OVERRIDE_AUFILE, call, instruction)
            .await;
    }

    async fn on_incoming(&self, call: &CallId) {
        for (name, value) in self.ops.custom_headers(call).await {
            self.on_incoming_header(call, &name, &value).await;
        }
    }

    async fn on_incoming_header(&self, call: &CallId, name: &str, value: &str) {
        let intent = self.classify_pair(name, value);
        if intent.is_none() {
            return;
        }

        let policy = self.effective_policy(call).await;
        info!("intercom: [ call={} ] {}: {}", call, name, value);

        match &intent {
            Intent::Hidden => {
                if !policy.allow_hidden {
                    self.reject(call).await;
                    return;
                }

                if let Some(delay) = self.ops.answer_delay(call).await {
                    if let Err(e) = self.ops.arm_answer_timer(call, delay).await {
                        warn!("intercom: answer timer for {} failed: {}", call, e);
                    }
                }

                // No generic incoming notification for hidden calls.
                return;
            }
            Intent::Normal if policy.privacy => {
                info!("intercom: auto answer suppressed - privacy mode on");
                if let Err(e) = self.ops.set_answer_delay(call, AnswerDelay::Never).await {
                    warn!("intercom: answer delay for {} failed: {}", call, e);
                }
                self.emit_override(call, OVERRIDE_RING).await;
                return;
            }
            _ => {}
        }

        self.sink.module_event(EVENT_INCOMING, call, value).await;

        match intent {
            Intent::Normal => {
                self.emit_override(call, OVERRIDE_NORMAL).await;
            }
            Intent::Custom(entry) => {
                if !entry.allowed {
                    self.reject(call).await;
                    return;
                }
                let instruction = format!("sip_autoanswer_aufile:{}", entry.audio_file_key);
                self.emit_override(call, &instruction).await;
            }
            Intent::Announcement => {
                if !policy.allow_announce {
                    self.reject(call).await;
                    return;
                }
                self.emit_override(call, OVERRIDE_ANNOUNCE).await;
            }
            Intent::ForceTalk => {
                if !policy.allow_force {
                    self.reject(call).await;
                    return;
                }
                self.emit_override(call, OVERRIDE_FORCE).await;
            }
            Intent::Surveillance => {
                if !policy.allow_surveil {
                    self.reject(call).await;
                    return;
                }
                self.emit_override(call, OVERRIDE_SURVEIL).await;
            }
            Intent::Preview => {
                self.emit_override(call, OVERRIDE_PREVIEW).await;
                // One-way preview listen.
                if let Err(e) = self
                    .ops
                    .set_receive_direction(call, MediaDirection::Inactive, MediaDirection::RecvOnly)
                    .await
                {
                    warn!("intercom: preview direction for {} failed: {}", call, e);
                }
            }
            Intent::Hidden | Intent::None => {}
        }
    }

    async fn on_local_offer(&self, call: &CallId) {
        // Only meaningful while the call is in the outgoing phase.
        if !self.ops.is_outgoing(call).await {
            return;
        }

        for (name, value) in self.ops.custom_headers(call).await {
            match self.classify_pair(&name, &value) {
                Intent::Normal
                | Intent::Announcement
                | Intent::ForceTalk
                | Intent::Surveillance
                | Intent::Custom(_) => {
                    self.sink.module_event(EVENT_OUTGOING, call, &value).await;
                    self.emit_override(call, OVERRIDE_RINGBACK).await;
                }
                // Hidden stays silent through the suppression gate; the
                // rest is not an outgoing intercom call.
                _ => {}
            }
        }
    }

    async fn on_established(&self, call: &CallId) {
        let outgoing = self.ops.is_outgoing(call).await;

        for (name, value) in self.ops.custom_headers(call).await {
            let intent = self.classify_pair(&name, &value);
            if intent.is_none() {
                continue;
            }

            if outgoing && intent == Intent::Hidden {
                if let Err(e) = self.hidden.start(call).await {
                    debug!("intercom: hidden start for {} failed: {}", call, e);
                }
                // The caller neither hears nor is heard beyond the code.
                if let Err(e) = self.ops.mute_local_audio(call, true).await {
                    warn!("intercom: mute of {} failed: {}", call, e);
                }
                continue;
            }

            if outgoing && intent == Intent::ForceTalk {
                let (audio, video) = self.ops.local_media_directions(call).await;

                // Keeps a later re-INVITE proposing sendrecv acceptable.
                let audio = if audio.is_active() {
                    MediaDirection::SendRecv
                } else {
                    MediaDirection::Inactive
                };
                let video = if video.is_active() {
                    MediaDirection::SendRecv
                } else {
                    MediaDirection::Inactive
                };

                if let Err(e) = self.ops.set_media_direction(call, audio, video).await {
                    warn!("intercom: media direction for {} failed: {}", call, e);
                }
            }

            let kind = if outgoing {
                EVENT_OUTGOING_ESTABLISHED
            } else {
                EVENT_INCOMING_ESTABLISHED
            };
            self.sink.module_event(kind, call, &value).await;
        }
    }
}
