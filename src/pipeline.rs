//! Board-level moderation pass.
//!
//! Threads are processed one at a time in listing order. Every per-thread
//! failure is logged and counted; only login and the listing fetch can abort
//! the run.

use anyhow::{Context, Result};
use scraper::Html;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::constants::PROGRESS_INTERVAL;
use crate::forum::{extract_thread_links, ForumSession, SessionError, ThreadSummary};
use crate::moderation::delete_form::build_fields_from_document;
use crate::moderation::post_extractor::extract_from_document;
use crate::moderation::{scan, Confirmer, DeleteExecutor, DeleteOutcome, ParseError, WordMatcher};

/// Why a single thread could not be moderated.
#[derive(Debug, Error)]
pub enum ThreadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Terminal state of one thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadOutcome {
    NoMatch,
    Matched {
        word: String,
        position: usize,
        is_main_post: bool,
        outcome: DeleteOutcome,
    },
}

/// Counters for a whole pass over the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub matched: usize,
    pub deleted: usize,
    pub declined: usize,
    pub failed: usize,
    pub errors: usize,
}

impl RunSummary {
    fn record(&mut self, result: &Result<ThreadOutcome, ThreadError>) {
        self.processed += 1;
        match result {
            Ok(ThreadOutcome::NoMatch) => {}
            Ok(ThreadOutcome::Matched { outcome, .. }) => {
                self.matched += 1;
                match outcome {
                    DeleteOutcome::Deleted => self.deleted += 1,
                    DeleteOutcome::Declined => self.declined += 1,
                    DeleteOutcome::Failed => self.failed += 1,
                }
            }
            Err(_) => self.errors += 1,
        }
    }
}

/// Log in, walk the configured board and moderate every thread on it.
///
/// # Errors
///
/// Returns an error if the word list cannot be loaded, login fails, or the
/// board listing cannot be fetched or parsed.
pub async fn run(config: &Config, confirmer: Box<dyn Confirmer>) -> Result<RunSummary> {
    let matcher = WordMatcher::from_file(&config.word_list_path)
        .await
        .context("Failed to load word list")?;
    if matcher.is_empty() {
        warn!(path = %config.word_list_path.display(), "Word list is empty; nothing will match");
    }

    let session = ForumSession::new(config).context("Failed to build forum session")?;
    session
        .login(&config.username, &config.password)
        .await
        .context("Failed to log in")?;

    let listing = session
        .fetch_page(&config.board_url)
        .await
        .context("Failed to fetch board listing")?;
    let threads = extract_thread_links(&listing, session.base_url())
        .context("Failed to parse board listing")?;
    info!(board = %config.board_url, threads = threads.len(), "Fetched board listing");

    let executor = DeleteExecutor::new(confirmer, config.confirm_deletions);
    let summary = moderate_threads(&session, &matcher, &executor, &threads).await;

    info!(
        processed = summary.processed,
        matched = summary.matched,
        deleted = summary.deleted,
        declined = summary.declined,
        failed = summary.failed,
        errors = summary.errors,
        "done"
    );
    Ok(summary)
}

/// Moderate each thread in order. Never fails: per-thread errors are logged
/// and counted.
pub async fn moderate_threads(
    session: &ForumSession,
    matcher: &WordMatcher,
    executor: &DeleteExecutor,
    threads: &[ThreadSummary],
) -> RunSummary {
    let mut summary = RunSummary::default();

    for (n, thread) in threads.iter().enumerate() {
        if progress_due(n) {
            info!(processed = n + 1, "Processed {} threads", n + 1);
        }

        let result = process_thread(session, matcher, executor, thread).await;
        if let Err(e) = &result {
            error!(title = %thread.title, "Error occurred {e} for {}", thread.title);
        }
        summary.record(&result);
    }

    summary
}

/// Whether a progress line is due before the zero-based thread `index`.
fn progress_due(index: usize) -> bool {
    index % PROGRESS_INTERVAL == PROGRESS_INTERVAL - 1
}

/// Fetch one thread, scan its posts and act on the first match.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched, does not have the expected
/// structure, or the delete request cannot be sent.
pub async fn process_thread(
    session: &ForumSession,
    matcher: &WordMatcher,
    executor: &DeleteExecutor,
    thread: &ThreadSummary,
) -> Result<ThreadOutcome, ThreadError> {
    let page = session.fetch_page(&thread.link).await?;

    let (records, fields) = {
        let document = Html::parse_document(&page);
        let records = extract_from_document(&document)?;
        let fields = build_fields_from_document(&document)?;
        (records, fields)
    };

    let Some(decision) = scan(&records, matcher) else {
        return Ok(ThreadOutcome::NoMatch);
    };

    warn!(
        title = %thread.title,
        word = %decision.matched_word,
        position = decision.record.position,
        "Dirty word found in thread: {}. {}",
        thread.title,
        decision.describe()
    );

    let outcome = executor.execute(session, &decision, &fields).await?;
    Ok(ThreadOutcome::Matched {
        word: decision.matched_word.to_string(),
        position: decision.record.position,
        is_main_post: decision.is_main_post,
        outcome,
    })
}
