use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WordListError {
    #[error("failed to read word list {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Banned words, lowercased, in file order.
///
/// Entries are never deduplicated or reordered: the first entry contained in a
/// text is the one reported, even when a later entry is a substring of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordMatcher {
    words: Vec<String>,
}

impl WordMatcher {
    /// Build a matcher from raw lines, trimming and lowercasing each one and
    /// dropping blank lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    /// Load a newline-delimited word list file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub async fn from_file(path: &Path) -> Result<Self, WordListError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| WordListError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let matcher = Self::from_lines(contents.lines());
        debug!(path = %path.display(), words = matcher.len(), "Loaded word list");
        Ok(matcher)
    }

    /// Return the first listed word contained in `text`, ignoring case.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.words
            .iter()
            .find(|word| text.contains(word.as_str()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_lines_normalizes() {
        let matcher = WordMatcher::from_lines(["  Spam ", "", "   ", "EGGS"]);
        assert_eq!(matcher.words().collect::<Vec<_>>(), vec!["spam", "eggs"]);
    }

    #[test]
    fn test_find_is_case_insensitive_substring() {
        let matcher = WordMatcher::from_lines(["spam"]);
        assert_eq!(matcher.find("Buy SPAMMY stuff"), Some("spam"));
        assert_eq!(matcher.find("nothing here"), None);
    }

    #[test]
    fn test_find_returns_first_in_list_order() {
        let matcher = WordMatcher::from_lines(["zeta", "alpha"]);
        // Both present; list order wins over position in the text.
        assert_eq!(matcher.find("alpha then zeta"), Some("zeta"));
    }

    #[test]
    fn test_overlapping_entries_are_not_deduplicated() {
        let matcher = WordMatcher::from_lines(["abc", "ab"]);
        assert_eq!(matcher.find("xxabcxx"), Some("abc"));
        assert_eq!(matcher.find("xxabxx"), Some("ab"));

        let reversed = WordMatcher::from_lines(["ab", "abc"]);
        assert_eq!(reversed.find("xxabcxx"), Some("ab"));
    }

    #[test]
    fn test_find_matches_cjk_words() {
        let matcher = WordMatcher::from_lines(["广告"]);
        assert_eq!(matcher.find("发信站: 这是广告内容"), Some("广告"));
    }

    #[test]
    fn test_empty_matcher_never_matches() {
        let matcher = WordMatcher::default();
        assert!(matcher.is_empty());
        assert_eq!(matcher.find("anything"), None);
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Spam\n\n  scam  \r").unwrap();

        let matcher = WordMatcher::from_file(file.path()).await.unwrap();
        assert_eq!(matcher.len(), 2);
        assert_eq!(matcher.find("a SCAM offer"), Some("scam"));
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let err = WordMatcher::from_file(Path::new("/nonexistent/words.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, WordListError::Read { .. }));
    }
}
