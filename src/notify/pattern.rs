/// Glob-style whole-string match.
///
/// `*` matches any run of characters (including none) and `?` matches exactly
/// one character; everything else matches literally and case-sensitively.
/// Runs in O(|text| * |pattern|) using a single rolling row of the match table.
pub fn matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // row[j]: the text prefix seen so far matches pattern[..j]
    let mut row = vec![false; pattern.len() + 1];
    row[0] = true;
    for j in 1..=pattern.len() {
        row[j] = pattern[j - 1] == '*' && row[j - 1];
    }

    for &c in &text {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '*' => next[j - 1] || row[j],
                '?' => row[j - 1],
                literal => literal == c && row[j - 1],
            };
        }
        row = next;
    }

    row[pattern.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_is_equality() {
        for (text, pattern) in [
            ("build", "build"),
            ("build", "Build"),
            ("build", "buil"),
            ("buil", "build"),
            ("", "x"),
        ] {
            assert_eq!(matches(text, pattern), text == pattern, "{text} vs {pattern}");
        }
    }

    #[test]
    fn test_star_matches_everything() {
        assert!(matches("", "*"));
        assert!(matches("anything at all", "*"));
        assert!(matches("", "***"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_text() {
        assert!(matches("", ""));
        assert!(!matches("x", ""));
    }

    #[test]
    fn test_question_mark_consumes_exactly_one_char() {
        assert!(matches("release-1", "release-?"));
        assert!(!matches("release-", "release-?"));
        assert!(!matches("release-10", "release-?"));
        assert!(matches("ä", "?"));
    }

    #[test]
    fn test_star_in_the_middle() {
        assert!(matches("build-main", "build-*"));
        assert!(matches("build-", "build-*"));
        assert!(matches("team-a-deploy", "team-*-deploy"));
        assert!(!matches("team-a-deploys", "team-*-deploy"));
        assert!(!matches("other", "build-*"));
    }

    #[test]
    fn test_many_stars_stay_polynomial() {
        let text = "a".repeat(200);
        let pattern = format!("{}b", "*a".repeat(50));
        assert!(!matches(&text, &pattern));
    }

    #[test]
    fn test_star_and_question_mark_combined() {
        assert!(matches("axxbyc", "a*b?c"));
        assert!(matches("abzc", "a*b?c"));
        assert!(!matches("abc", "a*b?c"));
        assert!(!matches("axxbyyc", "a*b?c"));
    }
}
