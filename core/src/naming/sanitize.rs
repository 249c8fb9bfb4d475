use regex::Regex;
use std::sync::OnceLock;

fn separator_pattern() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[/\\]").expect("Failed to compile regex"))
}

fn illegal_pattern() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"[:?"<>|]"#).expect("Failed to compile regex"))
}

/// Makes one path component safe for the target filesystem
///
/// Fixed order: `*` is spelled out as `" star"`, path separators become
/// `_`, then characters illegal in filenames (`: ? " < > |`) are
/// stripped. Idempotent on already-clean input.
pub fn sanitize_component(s: &str) -> String {
    let s = s.replace('*', " star");
    let s = separator_pattern().replace_all(&s, "_");
    illegal_pattern().replace_all(&s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A*B/C:D", "A starB_CD")]
    #[case("T1*axial", "T1 staraxial")]
    #[case("sag\\t2", "sag_t2")]
    #[case("what?<ever>|", "whatever")]
    #[case("plain series", "plain series")]
    #[case("", "")]
    fn test_sanitize_component(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_component(input), expected);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in ["A*B/C:D", "already clean", "Unk_Series", "a:b*c"] {
            let once = sanitize_component(raw);
            assert_eq!(sanitize_component(&once), once);
        }
    }

    #[test]
    fn test_substitution_runs_before_strip() {
        // the star expands first; the colon produced text would otherwise
        // survive if strip ran first
        assert_eq!(sanitize_component("*:*"), " star star");
    }
}
