use larousse_model::{Direction, EntryRequest, ResolvedTarget};
use url::Url;

use crate::normalize::{self, DEFAULT_LABEL};

/// Work out which page to fetch for a request and how to name its output.
///
/// Absolute URLs are fetched as given; anything else is treated as a headword
/// and looked up under `/dictionnaires/<direction>/` on `origin`. Surrounding
/// whitespace in the input is ignored.
pub fn resolve(request: &EntryRequest, origin: &str) -> ResolvedTarget {
    let input = request.input.trim();

    let (fetch_url, display_name) = if is_absolute_url(input) {
        (input.to_string(), display_name_from_url(input))
    } else {
        (build_url(origin, request.direction, input), stem(input).to_string())
    };

    let display_name = if display_name.trim().is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        display_name
    };
    let safe_name = normalize::safe_name(&display_name);

    ResolvedTarget {
        fetch_url,
        display_name,
        safe_name,
    }
}

/// True for `http://` and `https://` URLs.
pub fn is_absolute_url(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Entry URL for a headword in one dictionary direction.
pub fn build_url(origin: &str, direction: Direction, word: &str) -> String {
    format!(
        "{}/dictionnaires/{}/{word}",
        origin.trim_end_matches('/'),
        direction.as_path()
    )
}

/// Pick the headword out of an entry URL.
///
/// Entry URLs look like `/dictionnaires/francais-anglais/chien/12345`, so the
/// last path segment that is not purely numeric is used, percent-decoded and
/// without extension. Returns an empty string when no segment qualifies.
fn display_name_from_url(input: &str) -> String {
    let path = match Url::parse(input) {
        Ok(url) => url.path().to_string(),
        Err(_) => input.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    path.split('/')
        .rev()
        .filter(|segment| !segment.is_empty())
        .find(|segment| !segment.chars().all(|c| c.is_ascii_digit()))
        .map(|segment| {
            let decoded = urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string());
            stem(&decoded).to_string()
        })
        .unwrap_or_default()
}

/// File-stem of the last `/`-separated part: `chat.html` → `chat`.
fn stem(input: &str) -> &str {
    let name = input.rsplit('/').next().unwrap_or(input);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SITE_ORIGIN;

    fn resolve_word(input: &str) -> ResolvedTarget {
        resolve(&EntryRequest::new(input, Direction::FrancaisAnglais), SITE_ORIGIN)
    }

    #[test]
    fn test_word_builds_entry_url() {
        let target = resolve_word("chat");
        assert_eq!(
            target.fetch_url,
            "https://www.larousse.fr/dictionnaires/francais-anglais/chat"
        );
        assert_eq!(target.display_name, "chat");
        assert_eq!(target.safe_name, "chat");
    }

    #[test]
    fn test_direction_in_url() {
        let request = EntryRequest::new("dog", Direction::AnglaisFrancais);
        let target = resolve(&request, "https://example.test/");
        assert_eq!(target.fetch_url, "https://example.test/dictionnaires/anglais-francais/dog");
    }

    #[test]
    fn test_accented_word() {
        let target = resolve_word("café");
        assert_eq!(target.fetch_url, "https://www.larousse.fr/dictionnaires/francais-anglais/café");
        assert_eq!(target.display_name, "café");
        assert_eq!(target.safe_name, "cafe");
    }

    #[test]
    fn test_url_used_verbatim() {
        let urls = [
            "https://www.larousse.fr/dictionnaires/francais-anglais/chat/14765",
            "http://www.larousse.fr/dictionnaires/anglais-francais/dog",
            "https://www.larousse.fr/dictionnaires/francais-anglais/chat?q=1#top",
        ];
        for url in urls {
            assert_eq!(resolve_word(url).fetch_url, url);
        }
    }

    #[test]
    fn test_url_skips_numeric_id_segment() {
        let target =
            resolve_word("https://www.larousse.fr/dictionnaires/francais-anglais/chien/12345");
        assert_eq!(target.display_name, "chien");
        assert_eq!(target.safe_name, "chien");
    }

    #[test]
    fn test_url_with_trailing_slash_and_extension() {
        let target = resolve_word("https://www.larousse.fr/dictionnaires/francais-anglais/chat/");
        assert_eq!(target.display_name, "chat");

        let target = resolve_word("https://example.test/pages/maison.html");
        assert_eq!(target.display_name, "maison");
    }

    #[test]
    fn test_url_percent_encoded_word() {
        let target =
            resolve_word("https://www.larousse.fr/dictionnaires/francais-anglais/caf%C3%A9/12092");
        assert_eq!(target.display_name, "café");
        assert_eq!(target.safe_name, "cafe");
    }

    #[test]
    fn test_url_without_word_falls_back() {
        assert_eq!(resolve_word("https://www.larousse.fr/").display_name, DEFAULT_LABEL);
        assert_eq!(resolve_word("https://www.larousse.fr/12345/678").safe_name, DEFAULT_LABEL);
    }

    #[test]
    fn test_empty_input_falls_back() {
        let target = resolve_word("");
        assert_eq!(target.display_name, DEFAULT_LABEL);
        assert_eq!(target.safe_name, DEFAULT_LABEL);
    }

    #[test]
    fn test_padded_input_is_trimmed() {
        let target =
            resolve_word("  https://www.larousse.fr/dictionnaires/francais-anglais/chien/12345 \n");
        assert_eq!(
            target.fetch_url,
            "https://www.larousse.fr/dictionnaires/francais-anglais/chien/12345"
        );
        assert_eq!(target.display_name, "chien");
        assert_eq!(target.safe_name, "chien");

        let target = resolve_word("\tchat  ");
        assert_eq!(
            target.fetch_url,
            "https://www.larousse.fr/dictionnaires/francais-anglais/chat"
        );
        assert_eq!(target.display_name, "chat");
        assert_eq!(target.safe_name, "chat");
    }

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("https://www.larousse.fr"));
        assert!(is_absolute_url("HTTP://example.test/x"));
        assert!(!is_absolute_url("chat"));
        assert!(!is_absolute_url("httpx"));
        assert!(!is_absolute_url("/dictionnaires/francais-anglais/chat"));
    }
}
