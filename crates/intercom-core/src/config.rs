//! Intercom configuration.
//!
//! Mirrors the configuration surface of the intercom module:
//!
//! ```text
//! icprivacy                    no
//! icallow_announce             yes
//! icallow_force                no
//! icallow_surveil              no
//! icallow_hidden               no
//! icpreview_subject            preview
//! iccustom                     Intercom/,sendrecv,yes,custom.wav
//! ```
//!
//! The five policy flags are global defaults; per-account overrides come
//! from the account's `extra` parameter string and are applied by
//! [`crate::policy::resolve`]. The audio file *keys* carried in override
//! instructions (`icnormal_aufile`, `icring_aufile`, ...) are fixed; the
//! mapping from key to an actual file is owned by the external renderer.

use serde::{Deserialize, Serialize};

use crate::policy::EffectivePolicy;

/// Name of the custom header carrying the call intent.
pub const DEFAULT_INTENT_HEADER: &str = "Subject";

/// Default prefix that classifies a subject as a preview call.
pub const DEFAULT_PREVIEW_SUBJECT: &str = "preview";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntercomConfig {
    /// Header name inspected for the call intent.
    pub intent_header: String,

    /// Subject prefix classified as `Intent::Preview`.
    pub preview_subject: String,

    /// Global policy defaults, overridable per account.
    pub policy: EffectivePolicy,

    /// Raw custom-intent lines (`prefix,direction,allowed,audio_file_key`),
    /// the registry's configuration source. Re-read on registry reload.
    pub custom_intents: Vec<String>,

    /// Answer delay in seconds requested when placing intercom calls.
    pub answer_delay_secs: u32,
}

impl Default for IntercomConfig {
    fn default() -> Self {
        Self {
            intent_header: DEFAULT_INTENT_HEADER.to_string(),
            preview_subject: DEFAULT_PREVIEW_SUBJECT.to_string(),
            policy: EffectivePolicy::default(),
            custom_intents: Vec::new(),
            answer_delay_secs: 0,
        }
    }
}

impl IntercomConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intent_header(mut self, name: impl Into<String>) -> Self {
        self.intent_header = name.into();
        self
    }

    pub fn with_preview_subject(mut self, prefix: impl Into<String>) -> Self {
        self.preview_subject = prefix.into();
        self
    }

    pub fn with_policy(mut self, policy: EffectivePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_custom_intents<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_intents = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_answer_delay(mut self, secs: u32) -> Self {
        self.answer_delay_secs = secs;
        self
    }
}
