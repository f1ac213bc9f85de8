//! Per-call effective policy resolution.
//!
//! Global defaults are overlaid with the account's free-form `extra`
//! parameter, a comma-separated list of `key=yes|no` settings, e.g.
//!
//! ```text
//! <sip:A@localhost>;sip_autoanswer=yes;extra=icprivacy=yes,icallow_announce=no
//! ```
//!
//! Unknown keys and malformed values never change a flag.

use serde::{Deserialize, Serialize};

pub const KEY_PRIVACY: &str = "icprivacy";
pub const KEY_ALLOW_ANNOUNCE: &str = "icallow_announce";
pub const KEY_ALLOW_FORCE: &str = "icallow_force";
pub const KEY_ALLOW_SURVEIL: &str = "icallow_surveil";
pub const KEY_ALLOW_HIDDEN: &str = "icallow_hidden";

/// Admission policy in effect for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePolicy {
    /// Suppress auto answer for normal intercom calls.
    pub privacy: bool,
    pub allow_announce: bool,
    pub allow_force: bool,
    pub allow_surveil: bool,
    pub allow_hidden: bool,
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            privacy: false,
            allow_announce: true,
            allow_force: false,
            allow_surveil: false,
            allow_hidden: false,
        }
    }
}

/// Parses one `key=value` fragment into a yes/no override.
fn extra_bool(fragment: &str, key: &str) -> Option<bool> {
    let (k, v) = fragment.split_once('=')?;
    if k.trim() != key {
        return None;
    }
    match v.trim() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

/// Overlays the account extra-parameter string on the global defaults.
///
/// Pure and infallible: an absent or unparseable extra string leaves the
/// defaults untouched, and within a parseable list only recognized keys
/// with a valid `yes`/`no` value overwrite their flag.
pub fn resolve(global: &EffectivePolicy, account_extra: Option<&str>) -> EffectivePolicy {
    let mut policy = *global;

    let Some(extra) = account_extra else {
        return policy;
    };

    for fragment in extra.split(',') {
        if let Some(v) = extra_bool(fragment, KEY_PRIVACY) {
            policy.privacy = v;
        }
        if let Some(v) = extra_bool(fragment, KEY_ALLOW_ANNOUNCE) {
            policy.allow_announce = v;
        }
        if let Some(v) = extra_bool(fragment, KEY_ALLOW_FORCE) {
            policy.allow_force = v;
        }
        if let Some(v) = extra_bool(fragment, KEY_ALLOW_SURVEIL) {
            policy.allow_surveil = v;
        }
        if let Some(v) = extra_bool(fragment, KEY_ALLOW_HIDDEN) {
            policy.allow_hidden = v;
        }
    }

    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_extra() {
        let global = EffectivePolicy::default();
        assert_eq!(resolve(&global, None), global);
        assert_eq!(resolve(&global, Some("")), global);
    }

    #[test]
    fn overrides_recognized_keys() {
        let global = EffectivePolicy::default();
        let policy = resolve(&global, Some("icprivacy=yes,icallow_force=yes"));
        assert_eq!(
            policy,
            EffectivePolicy {
                privacy: true,
                allow_force: true,
                ..global
            }
        );
    }

    #[test]
    fn can_clear_a_default() {
        let global = EffectivePolicy::default();
        assert!(global.allow_announce);

        let policy = resolve(&global, Some("icallow_announce=no"));
        assert!(!policy.allow_announce);
    }

    #[test]
    fn ignores_unknown_keys_and_bad_values() {
        let global = EffectivePolicy::default();
        assert_eq!(resolve(&global, Some("bogus=xyz")), global);
        assert_eq!(resolve(&global, Some("icprivacy=maybe")), global);
        assert_eq!(resolve(&global, Some("icprivacy")), global);
        assert_eq!(resolve(&global, Some(",,,")), global);
    }

    #[test]
    fn later_fragment_wins() {
        let global = EffectivePolicy::default();
        let policy = resolve(&global, Some("icprivacy=yes,icprivacy=no"));
        assert!(!policy.privacy);
    }

    #[test]
    fn tolerates_whitespace_around_pairs() {
        let global = EffectivePolicy::default();
        let policy = resolve(&global, Some(" icallow_surveil=yes , icallow_hidden=yes "));
        assert!(policy.allow_surveil);
        assert!(policy.allow_hidden);
    }
}
