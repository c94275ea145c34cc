//! Site settings consumed by the reaper.

use serde::Serialize;

use crate::config::parse_bool;

/// Grace period applied when the setting is absent or unparsable.
pub const DEFAULT_GRACE_PERIOD_HOURS: i64 = 48;

/// Floor for the grace period. A zero or negative setting would let the
/// reaper delete uploads before anything had a chance to reference them.
pub const MIN_GRACE_PERIOD_HOURS: i64 = 1;

/// The named site settings the reaper needs, resolved to plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaperSettings {
    pub clean_up_uploads: bool,
    pub clean_orphan_uploads_grace_period_hours: i64,
    pub logo_url: String,
    pub logo_small_url: String,
    pub favicon_url: String,
    pub apple_touch_icon_url: String,
    pub s3_cdn_url: String,
}

impl Default for ReaperSettings {
    fn default() -> Self {
        Self {
            clean_up_uploads: true,
            clean_orphan_uploads_grace_period_hours: DEFAULT_GRACE_PERIOD_HOURS,
            logo_url: String::new(),
            logo_small_url: String::new(),
            favicon_url: String::new(),
            apple_touch_icon_url: String::new(),
            s3_cdn_url: String::new(),
        }
    }
}

impl ReaperSettings {
    /// Setting names as stored in `site_settings.name`.
    pub const NAMES: [&'static str; 7] = [
        "clean_up_uploads",
        "clean_orphan_uploads_grace_period_hours",
        "logo_url",
        "logo_small_url",
        "favicon_url",
        "apple_touch_icon_url",
        "s3_cdn_url",
    ];

    /// Build settings from a name lookup, falling back to defaults for
    /// missing or malformed values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let clean_up_uploads = match lookup("clean_up_uploads") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unparsable clean_up_uploads setting, using default");
                defaults.clean_up_uploads
            }),
            None => defaults.clean_up_uploads,
        };

        let grace = match lookup("clean_orphan_uploads_grace_period_hours") {
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "Unparsable clean_orphan_uploads_grace_period_hours setting, using default"
                );
                defaults.clean_orphan_uploads_grace_period_hours
            }),
            None => defaults.clean_orphan_uploads_grace_period_hours,
        };

        let text = |name: &str| lookup(name).map(|v| v.trim().to_string()).unwrap_or_default();

        Self {
            clean_up_uploads,
            clean_orphan_uploads_grace_period_hours: grace,
            logo_url: text("logo_url"),
            logo_small_url: text("logo_small_url"),
            favicon_url: text("favicon_url"),
            apple_touch_icon_url: text("apple_touch_icon_url"),
            s3_cdn_url: text("s3_cdn_url"),
        }
    }

    /// Configured grace period, never below one hour.
    pub fn effective_grace_period_hours(&self) -> i64 {
        self.clean_orphan_uploads_grace_period_hours
            .max(MIN_GRACE_PERIOD_HOURS)
    }

    /// Branding settings whose URLs must never be reclaimed, paired with the
    /// setting name for diagnostics.
    pub fn branding_urls(&self) -> [(&'static str, &str); 4] {
        [
            ("logo_url", self.logo_url.as_str()),
            ("logo_small_url", self.logo_small_url.as_str()),
            ("favicon_url", self.favicon_url.as_str()),
            ("apple_touch_icon_url", self.apple_touch_icon_url.as_str()),
        ]
    }

    /// CDN URL, if one is configured.
    pub fn cdn_url(&self) -> Option<&str> {
        Some(self.s3_cdn_url.as_str()).filter(|s| !s.is_empty())
    }
}
