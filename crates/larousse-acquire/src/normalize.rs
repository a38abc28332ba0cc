use unicode_normalization::UnicodeNormalization;

/// Label used when an input yields no usable name.
pub const DEFAULT_LABEL: &str = "entry";

/// Fold a headword into an ASCII token safe to use as a directory and file name.
///
/// Accents are stripped via NFD decomposition (café → cafe), a few ligatures
/// are spelled out (œuf → oeuf), and anything other than ASCII letters, digits,
/// `-` and `_` becomes `_`. Runs of `_` collapse and the ends are trimmed.
/// Case is preserved. Falls back to [`DEFAULT_LABEL`] when nothing survives.
pub fn safe_name(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());

    for c in input.nfd() {
        if unicode_normalization::char::is_combining_mark(c) {
            continue;
        }
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => folded.push(c),
            'œ' => folded.push_str("oe"),
            'Œ' => folded.push_str("OE"),
            'æ' => folded.push_str("ae"),
            'Æ' => folded.push_str("AE"),
            'ß' => folded.push_str("ss"),
            _ => folded.push('_'),
        }
    }

    let collapsed = collapse_underscores(&folded);
    let trimmed = collapsed.trim_matches(|c| c == '_' || c == '-');
    if trimmed.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Clean an asset filename taken from a URL.
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else (after
/// accent folding) becomes `_`. Returns an empty string for names made only of
/// dots so that `.` and `..` can never escape the asset directory.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        String::new()
    } else {
        cleaned
    }
}

fn collapse_underscores(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_underscore = false;

    for c in input.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name_folds_accents() {
        assert_eq!(safe_name("café"), "cafe");
        assert_eq!(safe_name("élève"), "eleve");
        assert_eq!(safe_name("Noël"), "Noel");
    }

    #[test]
    fn test_safe_name_decomposed_input() {
        // e + combining acute accent
        assert_eq!(safe_name("cafe\u{0301}"), "cafe");
    }

    #[test]
    fn test_safe_name_ligatures() {
        assert_eq!(safe_name("œuf"), "oeuf");
        assert_eq!(safe_name("ex æquo"), "ex_aequo");
    }

    #[test]
    fn test_safe_name_strips_path_characters() {
        assert_eq!(safe_name("../etc/passwd"), "etc_passwd");
        assert_eq!(safe_name("a\\b:c*d?e\"f<g>h|i"), "a_b_c_d_e_f_g_h_i");
        assert_eq!(safe_name("pomme de terre"), "pomme_de_terre");
        assert_eq!(safe_name("aujourd'hui"), "aujourd_hui");
    }

    #[test]
    fn test_safe_name_never_unsafe() {
        let inputs = ["", "/", "..", "日本語", "ça/va", "a\u{0000}b", "  ", "Ω≈ç√∫", "\t\n"];
        for input in inputs {
            let name = safe_name(input);
            assert!(!name.is_empty(), "empty name for {input:?}");
            assert!(
                name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unsafe name {name:?} for {input:?}"
            );
        }
    }

    #[test]
    fn test_safe_name_fallback() {
        assert_eq!(safe_name(""), DEFAULT_LABEL);
        assert_eq!(safe_name("日本"), DEFAULT_LABEL);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("main.min.css"), "main.min.css");
        assert_eq!(sanitize_filename("prononciation fr.mp3"), "prononciation_fr.mp3");
        assert_eq!(sanitize_filename("été.mp3"), "ete.mp3");
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("."), "");
    }
}
