use serde::{Deserialize, Serialize};
use std::fmt;

/// Which bilingual dictionary an entry is looked up in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    FrancaisAnglais,
    AnglaisFrancais,
}

impl Direction {
    /// Path segment used by the site under `/dictionnaires/`.
    pub fn as_path(&self) -> &'static str {
        match self {
            Direction::FrancaisAnglais => "francais-anglais",
            Direction::AnglaisFrancais => "anglais-francais",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// One request to snapshot a dictionary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryRequest {
    /// A bare headword (e.g., "chat") or an absolute entry URL.
    pub input: String,
    pub direction: Direction,
}

impl EntryRequest {
    pub fn new(input: impl Into<String>, direction: Direction) -> Self {
        Self {
            input: input.into(),
            direction,
        }
    }
}

/// The page to fetch and the names derived from the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Absolute URL handed to the renderer.
    pub fetch_url: String,
    /// Headword as it appears in the input (may carry accents).
    pub display_name: String,
    /// ASCII-folded form of `display_name`, used for every output path.
    pub safe_name: String,
}
