//! Intent classification.
//!
//! A single exhaustive function turns one `(header name, header value)`
//! pair into an [`Intent`]. Classification is pure: it depends only on the
//! pair, the current registry snapshot and the configured preview subject,
//! and it is recomputed from the call's headers on every lifecycle event.

use crate::registry::{find_in, CustomIntentEntry};

use crate::types::Intent;

pub const SUBJECT_NORMAL: &str = "normal";
pub const SUBJECT_ANNOUNCEMENT: &str = "announcement";
pub const SUBJECT_FORCETALK: &str = "forcetalk";
pub const SUBJECT_SURVEILLANCE: &str = "surveillance";
pub const SUBJECT_HIDDEN: &str = "hidden";

/// Classifies one custom header pair.
///
/// Returns [`Intent::None`] unless `name` equals the configured intent
/// header. Evaluation order is significant and fixed: the exact literals
/// first, then the preview prefix, then the `hidden` literal, then the
/// custom-intent registry. Comparisons are case-sensitive.
pub fn classify(
    name: &str,
    value: &str,
    registry: &[CustomIntentEntry],
    intent_header: &str,
    preview_subject: &str,
) -> Intent {
    if name != intent_header {
        return Intent::None;
    }

    match value {
        SUBJECT_NORMAL => return Intent::Normal,
        SUBJECT_ANNOUNCEMENT => return Intent::Announcement,
        SUBJECT_FORCETALK => return Intent::ForceTalk,
        SUBJECT_SURVEILLANCE => return Intent::Surveillance,
        _ => {}
    }

    if value.as_bytes().starts_with(preview_subject.as_bytes()) {
        return Intent::Preview;
    }

    if value == SUBJECT_HIDDEN {
        return Intent::Hidden;
    }

    match find_in(registry, value) {
        Some(entry) => Intent::Custom(entry.clone()),
        None => Intent::None,
    }
}
