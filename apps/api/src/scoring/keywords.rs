//! Keyword extraction used by the local fallback paths.

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "this", "that", "these", "those",
];

pub const MAX_KEYWORDS: usize = 20;
const MIN_KEYWORD_LEN: usize = 3;

/// Lowercases, replaces anything but ASCII word characters with spaces, then
/// keeps the first `MAX_KEYWORDS` distinct tokens of 3+ characters that are
/// not stopwords.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut keywords: Vec<String> = Vec::new();
    for token in normalized.split_whitespace() {
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
        if token.chars().count() < MIN_KEYWORD_LEN || STOPWORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Job keywords that overlap some resume keyword, by substring in either
/// direction.
pub fn matching_keywords(job: &[String], resume: &[String]) -> Vec<String> {
    job.iter()
        .filter(|keyword| {
            resume.iter().any(|candidate| {
                candidate.contains(keyword.as_str()) || keyword.contains(candidate.as_str())
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_drops_short_tokens_and_stopwords() {
        let keywords =
            extract_keywords("The Rust engineer WILL build an API, and ship it to prod.");
        assert_eq!(keywords, vec!["rust", "engineer", "build", "api", "ship", "prod"]);
    }

    #[test]
    fn test_extract_splits_on_punctuation_and_dedupes() {
        let keywords = extract_keywords("node.js/Node.js; C++ postgres-sql postgres");
        assert_eq!(keywords, vec!["node", "postgres", "sql"]);
    }

    #[test]
    fn test_extract_caps_at_twenty() {
        let text: Vec<String> = (0..40).map(|i| format!("word{i}")).collect();
        let keywords = extract_keywords(&text.join(" "));
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "word0");
        assert_eq!(keywords[19], "word19");
    }

    #[test]
    fn test_extract_empty_text() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("a an the").is_empty());
    }

    #[test]
    fn test_matching_is_bidirectional_substring() {
        let job = vec!["kubernetes".to_string(), "go".to_string(), "java".to_string()];
        let resume = vec!["kube".to_string(), "golang".to_string()];
        assert_eq!(matching_keywords(&job, &resume), vec!["kubernetes", "go"]);
    }
}
