use serde::{Deserialize, Serialize};

/// Category of a referenced asset. Each kind has its own output subdirectory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Stylesheet,
    Script,
    Audio,
}

impl AssetKind {
    /// Subdirectory of the entry folder holding this kind of asset.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
            AssetKind::Audio => "audio",
        }
    }

    /// Extension given to synthesized filenames.
    pub fn default_extension(&self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
            AssetKind::Audio => "mp3",
        }
    }

    /// Attribute holding the asset's URL.
    pub fn source_attr(&self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "href",
            AssetKind::Script | AssetKind::Audio => "src",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "CSS",
            AssetKind::Script => "JS",
            AssetKind::Audio => "Audio",
        }
    }
}

/// A single asset reference discovered in the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRef {
    pub kind: AssetKind,
    /// Absolute URL the asset is downloaded from.
    pub original_url: String,
    /// Path relative to the output document, set once the download succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    /// Position among same-kind references on the page.
    pub sequence_index: usize,
}

impl AssetRef {
    pub fn new(kind: AssetKind, original_url: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            kind,
            original_url: original_url.into(),
            local_path: None,
            sequence_index,
        }
    }

    pub fn is_localized(&self) -> bool {
        self.local_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_layout() {
        assert_eq!(AssetKind::Stylesheet.dir_name(), "css");
        assert_eq!(AssetKind::Script.default_extension(), "js");
        assert_eq!(AssetKind::Audio.source_attr(), "src");
        assert_eq!(AssetKind::Stylesheet.source_attr(), "href");
    }

    #[test]
    fn test_new_ref_is_not_localized() {
        let r = AssetRef::new(AssetKind::Audio, "https://www.larousse.fr/a.mp3", 2);
        assert!(!r.is_localized());
        assert_eq!(r.sequence_index, 2);
    }
}
