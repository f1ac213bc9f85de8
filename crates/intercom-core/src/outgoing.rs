//! Outgoing intercom call setup.
//!
//! Places calls carrying the intent header the admission engine on the
//! peer side classifies. Each kind fixes the base media direction; the
//! caller can still switch audio or video off entirely, which degrades the
//! corresponding direction to inactive.

use crate::classify::{
    SUBJECT_ANNOUNCEMENT, SUBJECT_FORCETALK, SUBJECT_HIDDEN, SUBJECT_NORMAL, SUBJECT_SURVEILLANCE,
};
use crate::engine::AdmissionEngine;
use crate::error::{IntercomError, Result};
use crate::types::{CallId, MediaDirection};

/// Kind of intercom call to place.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingIntent {
    Normal,
    Announcement,
    ForceTalk,
    Surveillance,
    /// Operator-defined intent; the subject must match a registry entry.
    Custom { subject: String },
    /// Hidden DTMF call; the code is transmitted once established.
    Hidden { code: String },
}

impl OutgoingIntent {
    /// Value carried in the intent header of the outgoing call.
    pub fn header_value(&self) -> &str {
        match self {
            Self::Normal => SUBJECT_NORMAL,
            Self::Announcement => SUBJECT_ANNOUNCEMENT,
            Self::ForceTalk => SUBJECT_FORCETALK,
            Self::Surveillance => SUBJECT_SURVEILLANCE,
            Self::Custom { subject } => subject,
            Self::Hidden { .. } => SUBJECT_HIDDEN,
        }
    }
}

impl AdmissionEngine {
    /// Places an outgoing intercom call of the given kind.
    ///
    /// `audio_on` / `video_on` mirror the dial command's `audio=`/`video=`
    /// flags: switched off, the stream direction becomes inactive instead
    /// of the kind's base direction.
    pub async fn dial(
        &self,
        target: &str,
        intent: OutgoingIntent,
        audio_on: bool,
        video_on: bool,
    ) -> Result<CallId> {
        let dir = match &intent {
            OutgoingIntent::Normal => MediaDirection::SendRecv,
            OutgoingIntent::Announcement => MediaDirection::SendOnly,
            OutgoingIntent::ForceTalk => MediaDirection::SendOnly,
            OutgoingIntent::Surveillance => MediaDirection::RecvOnly,
            OutgoingIntent::Hidden { .. } => MediaDirection::SendOnly,
            OutgoingIntent::Custom { subject } => self
                .registry()
                .find(subject)
                .ok_or_else(|| IntercomError::UnknownCustomSubject(subject.clone()))?
                .direction,
        };

        let audio = if audio_on { dir } else { MediaDirection::Inactive };
        let video = if video_on { dir } else { MediaDirection::Inactive };

        let call = self
            .ops()
            .place_call(
                target,
                (&self.config().intent_header, intent.header_value()),
                audio,
                video,
                self.config().answer_delay_secs,
            )
            .await?;

        if let OutgoingIntent::Hidden { code } = &intent {
            self.hidden().register(&call, code)?;
        }

        Ok(call)
    }

    /// Places a hidden call that transmits `code` as DTMF and hangs up.
    /// Audio-only, as the call exists solely for the telephone events.
    pub async fn dial_hidden(&self, target: &str, code: &str) -> Result<CallId> {
        self.dial(
            target,
            OutgoingIntent::Hidden {
                code: code.to_string(),
            },
            true,
            false,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_values() {
        assert_eq!(OutgoingIntent::Normal.header_value(), "normal");
        assert_eq!(OutgoingIntent::Announcement.header_value(), "announcement");
        assert_eq!(OutgoingIntent::ForceTalk.header_value(), "forcetalk");
        assert_eq!(OutgoingIntent::Surveillance.header_value(), "surveillance");
        assert_eq!(
            OutgoingIntent::Custom {
                subject: "Intercom/Door".into()
            }
            .header_value(),
            "Intercom/Door"
        );
        assert_eq!(
            OutgoingIntent::Hidden { code: "123".into() }.header_value(),
            "hidden"
        );
    }
}
