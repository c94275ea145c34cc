//! Ignore list: URLs that site configuration points at directly.
//!
//! Branding images (logos, favicon, touch icon) are uploads that no table
//! references by id, so they would look orphaned. Their URLs are normalized
//! to the canonical form stored in `uploads.url` and exempted from reclamation.

use url::Url;

use crate::error::AppError;

/// Deduplicated canonical URLs, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    urls: Vec<String>,
}

impl IgnoreList {
    /// Build the ignore list from `(setting name, url)` pairs.
    ///
    /// `base_url` is the prefix uploads are stored under (relative for local
    /// storage, protocol-relative or absolute otherwise). When `cdn_url` names
    /// a different host than `base_url`, the CDN host inside each branding URL
    /// is swapped for the canonical one before matching.
    pub fn build(
        branding: &[(&str, &str)],
        base_url: &str,
        cdn_url: Option<&str>,
    ) -> Result<Self, AppError> {
        let canonical_host = hostname_of(base_url)?;
        let cdn_host = match cdn_url {
            Some(cdn) => hostname_of(cdn)?,
            None => None,
        };

        let rewrite = match (cdn_host, canonical_host) {
            (Some(cdn), Some(canonical)) if cdn != canonical => Some((cdn, canonical)),
            _ => None,
        };

        let mut urls: Vec<String> = Vec::new();
        for (setting, raw) in branding {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let url = match &rewrite {
                Some((cdn, canonical)) => raw.replace(cdn.as_str(), canonical),
                None => raw.to_string(),
            };

            let Some(start) = url.find(base_url) else {
                tracing::warn!(
                    setting = %setting,
                    url = %url,
                    base_url = %base_url,
                    "Branding URL is outside upload storage, not adding to ignore list"
                );
                continue;
            };

            let canonical = url[start..].to_string();
            if !urls.contains(&canonical) {
                urls.push(canonical);
            }
        }

        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Hostname of a URL, or `None` for empty, relative and scheme-less input.
///
/// Protocol-relative URLs (`//host/path`) are resolved as https.
pub fn hostname_of(url: &str) -> Result<Option<String>, AppError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let candidate = if trimmed.starts_with("//") {
        format!("https:{}", trimmed)
    } else if trimmed.starts_with('/') {
        return Ok(None);
    } else {
        trimmed.to_string()
    };

    match Url::parse(&candidate) {
        Ok(parsed) => Ok(parsed.host_str().map(str::to_string)),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(None),
        Err(e) => Err(AppError::InvalidConfig(format!(
            "Unparsable URL {:?}: {}",
            url, e
        ))),
    }
}
