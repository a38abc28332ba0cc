use larousse_model::{AssetKind, SnapshotError};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout for one entry:
///
/// - `<root>/<safe_name>/<safe_name>.html` — the snapshot document
/// - `<root>/<safe_name>/css/` — stylesheets
/// - `<root>/<safe_name>/js/` — scripts
/// - `<root>/<safe_name>/audio/` — pronunciation audio
///
/// Directories are created on first write and reused by later runs; files
/// from a previous run for the same entry are overwritten, never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBundle {
    pub root_dir: PathBuf,
    pub html_file: PathBuf,
    pub audio_dir: PathBuf,
    pub css_dir: PathBuf,
    pub js_dir: PathBuf,
}

impl OutputBundle {
    /// Describe the bundle for `safe_name` under `base`. Touches nothing on disk.
    pub fn new(base: &Path, safe_name: &str) -> Self {
        let root_dir = base.join(safe_name);
        Self {
            html_file: root_dir.join(format!("{safe_name}.html")),
            audio_dir: root_dir.join(AssetKind::Audio.dir_name()),
            css_dir: root_dir.join(AssetKind::Stylesheet.dir_name()),
            js_dir: root_dir.join(AssetKind::Script.dir_name()),
            root_dir,
        }
    }

    pub fn dir_for(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Stylesheet => &self.css_dir,
            AssetKind::Script => &self.js_dir,
            AssetKind::Audio => &self.audio_dir,
        }
    }

    pub fn asset_path(&self, kind: AssetKind, name: &str) -> PathBuf {
        self.dir_for(kind).join(name)
    }

    /// Path of an asset as referenced from the HTML file (always `/`-separated).
    pub fn relative_path(kind: AssetKind, name: &str) -> String {
        format!("{}/{name}", kind.dir_name())
    }

    /// Create the directory for one asset kind (and the entry folder).
    pub fn ensure_dir(&self, kind: AssetKind) -> Result<(), SnapshotError> {
        let dir = self.dir_for(kind);
        fs::create_dir_all(dir).map_err(|e| SnapshotError::io(dir, e))
    }

    /// Write the snapshot document, replacing any earlier one.
    pub fn write_html(&self, html: &str) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.root_dir).map_err(|e| SnapshotError::io(&self.root_dir, e))?;
        fs::write(&self.html_file, html).map_err(|e| SnapshotError::io(&self.html_file, e))?;
        tracing::info!(path = %self.html_file.display(), bytes = html.len(), "Wrote snapshot HTML");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let bundle = OutputBundle::new(Path::new("/tmp/out"), "chat");
        assert_eq!(bundle.root_dir, Path::new("/tmp/out/chat"));
        assert_eq!(bundle.html_file, Path::new("/tmp/out/chat/chat.html"));
        assert_eq!(bundle.audio_dir, Path::new("/tmp/out/chat/audio"));
        assert_eq!(bundle.css_dir, Path::new("/tmp/out/chat/css"));
        assert_eq!(bundle.js_dir, Path::new("/tmp/out/chat/js"));
        assert_eq!(
            bundle.asset_path(AssetKind::Audio, "chat.mp3"),
            Path::new("/tmp/out/chat/audio/chat.mp3")
        );
        assert_eq!(OutputBundle::relative_path(AssetKind::Stylesheet, "main.css"), "css/main.css");
    }

    #[test]
    fn test_write_html_is_lazy_and_overwrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bundle = OutputBundle::new(tmp.path(), "cafe");
        assert!(!bundle.root_dir.exists());

        bundle.write_html("<p>one</p>").unwrap();
        bundle.write_html("<p>two</p>").unwrap();

        assert_eq!(fs::read_to_string(&bundle.html_file).unwrap(), "<p>two</p>");
        assert!(!bundle.css_dir.exists());
        assert_eq!(fs::read_dir(&bundle.root_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bundle = OutputBundle::new(tmp.path(), "chat");
        bundle.ensure_dir(AssetKind::Script).unwrap();
        bundle.ensure_dir(AssetKind::Script).unwrap();
        assert!(bundle.js_dir.is_dir());
    }
}
