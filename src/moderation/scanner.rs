use crate::moderation::post_extractor::PostRecord;
use crate::moderation::word_matcher::WordMatcher;

/// The single action taken on a thread in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationDecision<'a> {
    pub matched_word: &'a str,
    pub record: &'a PostRecord,
    /// The main post matched, so deleting it removes the thread.
    pub is_main_post: bool,
}

impl ModerationDecision<'_> {
    /// Console line describing which post matched.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_main_post {
            format!("The main article contains: {}", self.matched_word)
        } else {
            format!("A reply contains: {}", self.matched_word)
        }
    }
}

/// Find the first post whose body contains a banned word.
///
/// Scanning stops at the first hit, so later offending posts in the same
/// thread wait for the next run.
#[must_use]
pub fn scan<'a>(
    records: &'a [PostRecord],
    matcher: &'a WordMatcher,
) -> Option<ModerationDecision<'a>> {
    records.iter().find_map(|record| {
        matcher.find(&record.body_text).map(|matched_word| ModerationDecision {
            matched_word,
            record,
            is_main_post: record.position == 0,
        })
    })
}
