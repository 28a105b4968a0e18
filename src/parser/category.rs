/// Category for comments that mention none of the configured keywords.
pub const OTHER: &str = "other";

/// First keyword contained in `text` wins; keyword order is significant.
/// An empty keyword matches everything, so settings reject them up front.
pub fn classify(text: &str, keywords: &[String]) -> String {
    keywords
        .iter()
        .find(|k| text.contains(k.as_str()))
        .cloned()
        .unwrap_or_else(|| OTHER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_listed_keyword_wins() {
        let keywords = kw(&["naver", "gmail"]);
        assert_eq!(classify("gmail or naver, either", &keywords), "naver");
    }

    #[test]
    fn substring_match() {
        assert_eq!(classify("abc123 지메일입니다", &kw(&["지메일"])), "지메일");
    }

    #[test]
    fn falls_back_to_other() {
        assert_eq!(classify("hello", &kw(&["gmail"])), OTHER);
        assert_eq!(classify("hello", &[]), OTHER);
    }

    #[test]
    fn empty_keyword_matches_anything() {
        assert_eq!(classify("hello", &kw(&["gmail", "", "naver"])), "");
    }
}
