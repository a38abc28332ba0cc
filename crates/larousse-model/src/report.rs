use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::asset::{AssetKind, AssetRef};
use crate::entry::ResolvedTarget;

/// Per-kind outcome of asset localization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindSummary {
    /// References with a non-empty source attribute.
    pub found: usize,
    /// References rewritten to a local copy.
    pub localized: usize,
    /// References removed after a failed download.
    pub failed: usize,
    /// Relative paths of localized items, in page order.
    pub local_paths: Vec<String>,
}

impl KindSummary {
    /// Build a summary from the refs one localization pass produced.
    pub fn from_refs(refs: &[AssetRef]) -> Self {
        let local_paths: Vec<String> = refs.iter().filter_map(|r| r.local_path.clone()).collect();
        Self {
            found: refs.len(),
            localized: local_paths.len(),
            failed: refs.len() - local_paths.len(),
            local_paths,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub target: ResolvedTarget,
    /// RFC 3339 time the page was rendered.
    pub fetched_at: String,
    /// Written snapshot document.
    pub html_file: PathBuf,
    pub css: KindSummary,
    pub js: KindSummary,
    pub audio: KindSummary,
    /// Links turned into inert spans.
    pub links_neutralized: usize,
}

impl RunReport {
    pub fn summary(&self, kind: AssetKind) -> &KindSummary {
        match kind {
            AssetKind::Stylesheet => &self.css,
            AssetKind::Script => &self.js,
            AssetKind::Audio => &self.audio,
        }
    }
}

/// Severity of a progress message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        })
    }
}

/// A human-readable progress line emitted by a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEvent {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_refs() {
        let mut ok = AssetRef::new(AssetKind::Audio, "https://x/a.mp3", 0);
        ok.local_path = Some("audio/a.mp3".into());
        let failed = AssetRef::new(AssetKind::Audio, "https://x/b.mp3", 1);

        let summary = KindSummary::from_refs(&[ok, failed]);
        assert_eq!(summary.found, 2);
        assert_eq!(summary.localized, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.local_paths, vec!["audio/a.mp3"]);
    }

    #[test]
    fn test_log_event_display() {
        let event = LogEvent {
            severity: Severity::Warn,
            message: "Failed to download".into(),
        };
        assert_eq!(event.to_string(), "[warn] Failed to download");
    }
}
