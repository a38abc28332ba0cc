use std::collections::HashMap;

use anyhow::{Context, Result};
use ego_tree::NodeId;
use larousse_model::{AssetKind, AssetRef};
use scraper::Html;
use url::Url;

use crate::config::SnapshotConfig;
use crate::dom;
use crate::events::Reporter;
use crate::normalize;
use crate::output::OutputBundle;

/// Classes Larousse puts on the speaker icons next to pronunciations.
pub const SPEAKER_SELECTOR: &str = ".lienson, .lienson2, .haut-parleur";

/// Elements collected for each asset kind.
pub fn kind_selector(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Stylesheet => r#"link[rel~="stylesheet"]"#,
        AssetKind::Script => "script",
        AssetKind::Audio => "audio",
    }
}

/// Downloads referenced assets into an [`OutputBundle`] and points the
/// document at the local copies.
pub struct AssetLocalizer<'a> {
    client: reqwest::Client,
    origin: &'a str,
    max_filename_len: usize,
    bundle: &'a OutputBundle,
    reporter: &'a Reporter,
    /// Prefix for synthesized audio names (the entry's safe name).
    audio_prefix: &'a str,
}

impl<'a> AssetLocalizer<'a> {
    pub fn new(
        config: &'a SnapshotConfig,
        bundle: &'a OutputBundle,
        reporter: &'a Reporter,
        audio_prefix: &'a str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.asset_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            origin: &config.origin,
            max_filename_len: config.max_filename_len,
            bundle,
            reporter,
            audio_prefix,
        })
    }

    /// Localize every reference of one kind.
    ///
    /// Stylesheets and scripts are searched document-wide; pass the content
    /// region as `scope` to restrict the search (used for audio). Elements
    /// without a source attribute are skipped. A reference whose download
    /// fails is removed from the document so nothing dangling is serialized.
    ///
    /// Returns one [`AssetRef`] per attempted reference, in page order.
    pub async fn localize(
        &self,
        document: &mut Html,
        kind: AssetKind,
        scope: Option<NodeId>,
    ) -> Vec<AssetRef> {
        let attr = kind.source_attr();
        let ids = dom::select_ids(document, scope, &dom::selector(kind_selector(kind)));

        let mut refs = Vec::new();
        let mut names = NameRegistry::default();
        // Same URL twice on a page: download once, reuse the outcome.
        let mut fetched: HashMap<String, Option<String>> = HashMap::new();

        for (index, id) in ids.into_iter().enumerate() {
            let source = match dom::attr(document, id, attr) {
                Some(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => continue,
            };

            let Some(url) = absolute_url(&source, self.origin) else {
                self.reporter.warn(format!("Skipping unresolvable {} reference {source}", kind.label()));
                dom::detach(document, id);
                refs.push(AssetRef::new(kind, source, index));
                continue;
            };
            let mut asset = AssetRef::new(kind, url.clone(), index);

            let outcome = match fetched.get(&url) {
                Some(previous) => previous.clone(),
                None => {
                    let name = derive_filename(&url, kind, self.prefix(kind), index, self.max_filename_len);
                    let name = names.claim(name, &url, index);
                    let result = self.fetch_to_bundle(&url, kind, &name).await;
                    fetched.insert(url.clone(), result.clone());
                    result
                }
            };

            match outcome {
                Some(relative) => {
                    dom::set_attr(document, id, attr, &relative);
                    asset.local_path = Some(relative);
                }
                None => dom::detach(document, id),
            }
            refs.push(asset);
        }

        let localized = refs.iter().filter(|r| r.is_localized()).count();
        tracing::debug!(kind = ?kind, found = refs.len(), localized, "Localized assets");
        refs
    }

    fn prefix(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Stylesheet => "style",
            AssetKind::Script => "script",
            AssetKind::Audio => self.audio_prefix,
        }
    }

    /// Download `url` into the kind's directory as `name`.
    ///
    /// Returns the path relative to the HTML file, or `None` after logging a
    /// warning if anything failed.
    async fn fetch_to_bundle(&self, url: &str, kind: AssetKind, name: &str) -> Option<String> {
        let result = async {
            let bytes = self.download(url).await?;
            let path = self.bundle.asset_path(kind, name);
            self.bundle.ensure_dir(kind)?;
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!(url = %url, path = %path.display(), bytes = bytes.len(), "Saved asset");
            anyhow::Ok(())
        }
        .await;

        match result {
            Ok(()) => Some(OutputBundle::relative_path(kind, name)),
            Err(e) => {
                self.reporter.warn(format!("Failed to download {url}: {e:#}"));
                None
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Request failed")?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "HTTP {status}");

        let bytes = response.bytes().await.context("Failed to read response body")?;
        Ok(bytes.to_vec())
    }
}

/// Resolve a reference against the site origin.
///
/// Absolute `http(s)` URLs are returned unchanged and protocol-relative ones
/// get `https:`. Returns `None` for references that cannot be joined.
pub fn absolute_url(reference: &str, origin: &str) -> Option<String> {
    if crate::resolve::is_absolute_url(reference) {
        return Some(reference.to_string());
    }
    if let Some(rest) = reference.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    let base = Url::parse(origin).ok()?;
    base.join(reference).ok().map(|u| u.to_string())
}

/// Local filename for an asset URL.
///
/// Uses the URL's last path segment (query and fragment are never part of
/// it). When that is empty or longer than `max_len`, a name is synthesized as
/// `<prefix>_<index>.<ext>`. Audio always ends up with an `.mp3` extension.
pub fn derive_filename(url: &str, kind: AssetKind, prefix: &str, index: usize, max_len: usize) -> String {
    let from_url = last_segment(url)
        .map(|segment| {
            let decoded = urlencoding::decode(&segment)
                .map(|s| s.into_owned())
                .unwrap_or(segment);
            normalize::sanitize_filename(&decoded)
        })
        .unwrap_or_default();

    let name = if from_url.is_empty() || from_url.chars().count() > max_len {
        let prefix = normalize::sanitize_filename(prefix);
        let prefix = if prefix.is_empty() { "asset" } else { prefix.as_str() };
        format!("{prefix}_{index}.{}", kind.default_extension())
    } else {
        from_url
    };

    match kind {
        AssetKind::Audio => force_extension(&name, "mp3"),
        _ => name,
    }
}

fn last_segment(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => {
            let path = url.split(['?', '#']).next()?;
            path.rsplit('/').next().map(str::to_string)
        }
    }
}

fn force_extension(name: &str, ext: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    format!("{stem}.{ext}")
}

/// Tracks filenames handed out within one kind so that two different URLs
/// never write to the same file.
#[derive(Debug, Default)]
struct NameRegistry {
    taken: HashMap<String, String>,
}

impl NameRegistry {
    /// Reserve `name` for `url`, inserting `_<index>` before the extension if
    /// another URL already holds it.
    fn claim(&mut self, name: String, url: &str, index: usize) -> String {
        let mut candidate = name.clone();
        let mut attempt = 0;
        while let Some(owner) = self.taken.get(&candidate) {
            if owner == url {
                return candidate;
            }
            candidate = with_suffix(&name, index, attempt);
            attempt += 1;
        }
        self.taken.insert(candidate.clone(), url.to_string());
        candidate
    }
}

fn with_suffix(name: &str, index: usize, attempt: usize) -> String {
    let suffix = if attempt == 0 {
        format!("_{index}")
    } else {
        format!("_{index}_{attempt}")
    };
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}{suffix}{}", &name[..idx], &name[idx..]),
        _ => format!("{name}{suffix}"),
    }
}

/// Point speaker icons in `region` at the localized audio files.
///
/// Icons are paired with `audio_paths` by position. Matched icons become
/// `<a class="… audio-link" href="audio/…">`; any extra icons become an inert
/// `<span class="… audio-missing">`. Void icons such as `<img>` are wrapped in
/// the `<a>`/`<span>` instead of renamed. Returns `(linked, unmatched)`.
pub fn link_speaker_icons(document: &mut Html, region: NodeId, audio_paths: &[String]) -> (usize, usize) {
    let icons = dom::select_ids(document, Some(region), &dom::selector(SPEAKER_SELECTOR));

    let mut linked = 0;
    let mut unmatched = 0;
    for (position, id) in icons.into_iter().enumerate() {
        let path = audio_paths.get(position);
        if dom::is_void(document, id) {
            // An icon like <img class="lienson"> keeps its tag and goes inside the link.
            dom::edit_element(document, id, |_, attrs| dom::remove_in(attrs, &["target", "onclick"]));
            let attrs = match path {
                Some(path) => vec![
                    ("href".to_string(), path.clone()),
                    ("class".to_string(), "audio-link".to_string()),
                ],
                None => vec![("class".to_string(), "audio-missing".to_string())],
            };
            dom::wrap(document, id, if path.is_some() { "a" } else { "span" }, attrs);
        } else {
            match path {
                Some(path) => {
                    dom::edit_element(document, id, |name, attrs| {
                        *name = "a".to_string();
                        dom::remove_in(attrs, &["target", "onclick"]);
                        dom::set_in(attrs, "href", path);
                        dom::add_class_in(attrs, "audio-link");
                    });
                }
                None => {
                    dom::edit_element(document, id, |name, attrs| {
                        *name = "span".to_string();
                        dom::remove_in(attrs, &["href", "target", "onclick"]);
                        dom::add_class_in(attrs, "audio-missing");
                    });
                }
            }
        }

        if path.is_some() {
            linked += 1;
        } else {
            unmatched += 1;
        }
    }

    (linked, unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;

    const ORIGIN: &str = "https://www.larousse.fr";

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://cdn.example.test/a.css", ORIGIN).as_deref(),
            Some("https://cdn.example.test/a.css")
        );
        assert_eq!(
            absolute_url("/Styles/main.css?v=2", ORIGIN).as_deref(),
            Some("https://www.larousse.fr/Styles/main.css?v=2")
        );
        assert_eq!(
            absolute_url("js/app.js", ORIGIN).as_deref(),
            Some("https://www.larousse.fr/js/app.js")
        );
        assert_eq!(
            absolute_url("//voix.larousse.fr/fr/123.mp3", ORIGIN).as_deref(),
            Some("https://voix.larousse.fr/fr/123.mp3")
        );
    }

    #[test]
    fn test_filename_from_url_strips_query() {
        let name = derive_filename(
            "https://www.larousse.fr/Styles/main.css?v=12#x",
            AssetKind::Stylesheet,
            "style",
            0,
            100,
        );
        assert_eq!(name, "main.css");
    }

    #[test]
    fn test_filename_synthesized_when_empty() {
        let name = derive_filename("https://www.larousse.fr/", AssetKind::Stylesheet, "style", 3, 100);
        assert_eq!(name, "style_3.css");
        let name = derive_filename("https://www.larousse.fr/js/", AssetKind::Script, "script", 1, 100);
        assert_eq!(name, "script_1.js");
    }

    #[test]
    fn test_filename_synthesized_when_too_long() {
        let long = format!("https://www.larousse.fr/{}.js", "a".repeat(120));
        assert_eq!(derive_filename(&long, AssetKind::Script, "script", 4, 100), "script_4.js");

        let exact = format!("https://www.larousse.fr/{}.js", "b".repeat(97));
        assert_eq!(
            derive_filename(&exact, AssetKind::Script, "script", 4, 100),
            format!("{}.js", "b".repeat(97))
        );
    }

    #[test]
    fn test_audio_forced_to_mp3() {
        assert_eq!(
            derive_filename("https://voix.larousse.fr/fr/chat.ogg", AssetKind::Audio, "chat", 0, 100),
            "chat.mp3"
        );
        assert_eq!(
            derive_filename("https://voix.larousse.fr/fr/14765", AssetKind::Audio, "chat", 0, 100),
            "14765.mp3"
        );
        assert_eq!(
            derive_filename("https://voix.larousse.fr/", AssetKind::Audio, "chat", 2, 100),
            "chat_2.mp3"
        );
    }

    #[test]
    fn test_filename_never_escapes_directory() {
        let name = derive_filename("https://x.test/a/%2E%2E", AssetKind::Script, "script", 0, 100);
        assert_eq!(name, "script_0.js");
        let name = derive_filename("https://x.test/a/..%2Fsecret.js", AssetKind::Script, "script", 0, 100);
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_name_registry_disambiguates() {
        let mut names = NameRegistry::default();
        assert_eq!(names.claim("main.css".into(), "https://a.test/main.css", 0), "main.css");
        assert_eq!(names.claim("main.css".into(), "https://b.test/main.css", 1), "main_1.css");
        assert_eq!(names.claim("main.css".into(), "https://a.test/main.css", 2), "main.css");
        assert_eq!(names.claim("main.css".into(), "https://c.test/main.css", 1), "main_1_1.css");
        assert_eq!(names.claim("LICENSE".into(), "https://c.test/LICENSE", 0), "LICENSE");
        assert_eq!(names.claim("LICENSE".into(), "https://d.test/LICENSE", 5), "LICENSE_5");
    }

    #[test]
    fn test_speaker_icons_linked_by_position() {
        let mut doc = Html::parse_document(
            r#"
            <article class="article_bilingue">
                <span class="lienson" onclick="play(1)"><img src="hp.png"></span> chat
                <span class="lienson2">x</span> chatte
                <span class="haut-parleur">y</span> matou
            </article>
            "#,
        );
        let region = extract::find_content_region(&doc).unwrap();
        let paths = vec!["audio/chat.mp3".to_string(), "audio/chatte.mp3".to_string()];

        assert_eq!(link_speaker_icons(&mut doc, region, &paths), (2, 1));

        let links = dom::select_ids(&doc, Some(region), &dom::selector("a.audio-link"));
        assert_eq!(links.len(), 2);
        assert_eq!(dom::attr(&doc, links[0], "href"), Some("audio/chat.mp3"));
        assert_eq!(dom::attr(&doc, links[0], "onclick"), None);
        assert_eq!(dom::attr(&doc, links[1], "href"), Some("audio/chatte.mp3"));

        let missing = dom::select_ids(&doc, Some(region), &dom::selector("span.audio-missing"));
        assert_eq!(missing.len(), 1);
        assert_eq!(dom::attr(&doc, missing[0], "href"), None);
        assert!(dom::outer_html(&doc, links[0]).unwrap().contains("<img"));
    }

    #[test]
    fn test_void_speaker_icons_are_wrapped() {
        let mut doc = Html::parse_document(
            r#"<article class="article_bilingue">
                <img class="lienson" src="hp.png" onclick="play(1)"> chat
                <img class="lienson2" src="hp.png"> chatte
            </article>"#,
        );
        let region = extract::find_content_region(&doc).unwrap();
        let paths = vec!["audio/chat.mp3".to_string()];

        assert_eq!(link_speaker_icons(&mut doc, region, &paths), (1, 1));

        let links = dom::select_ids(&doc, Some(region), &dom::selector("a.audio-link"));
        assert_eq!(links.len(), 1);
        assert_eq!(dom::attr(&doc, links[0], "href"), Some("audio/chat.mp3"));
        let link_html = dom::outer_html(&doc, links[0]).unwrap();
        assert!(link_html.contains("<img"));
        assert!(link_html.contains(r#"class="lienson""#));
        assert!(!link_html.contains("onclick"));

        let missing = dom::select_ids(&doc, Some(region), &dom::selector("span.audio-missing"));
        assert_eq!(missing.len(), 1);
        assert!(dom::outer_html(&doc, missing[0]).unwrap().contains(r#"class="lienson2""#));

        // Both icons are still images.
        assert_eq!(dom::select_ids(&doc, Some(region), &dom::selector("img")).len(), 2);
    }
}
