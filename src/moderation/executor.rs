use std::fmt;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::constants::DELETE_SUCCESS_MARKER;
use crate::forum::{ForumSession, SessionError};
use crate::moderation::delete_form::DeleteFormFields;
use crate::moderation::scanner::ModerationDecision;

const CONFIRM_PROMPT: &str = "Delete post? [y/n]";

/// Asks whether a pending deletion may go ahead.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Prompts on stdout and reads one answer line per prompt.
///
/// The buffered reader is kept across prompts, so answers piped in ahead of
/// time are consumed one per prompt.
pub struct LineConfirmer<R> {
    input: Mutex<BufReader<R>>,
}

/// Confirmer reading answers from the terminal.
pub type StdinConfirmer = LineConfirmer<Stdin>;

impl LineConfirmer<Stdin> {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin + Send> LineConfirmer<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            input: Mutex::new(BufReader::new(reader)),
        }
    }
}

impl<R> fmt::Debug for LineConfirmer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineConfirmer").finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> Confirmer for LineConfirmer<R> {
    async fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = tokio::io::stdout();
        let prompt = format!("{prompt} ");
        if let Err(e) = stdout.write_all(prompt.as_bytes()).await {
            warn!("Failed to write confirmation prompt: {e}");
        }
        let _ = stdout.flush().await;

        let mut answer = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut answer).await {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                warn!("Failed to read confirmation answer: {e}");
                false
            }
        }
    }
}

/// Always gives the same answer. Used for unattended runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmer(pub bool);

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Only an answer starting with `y` or `Y` approves; empty input declines.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmer said no; no request was sent.
    Declined,
    /// The forum's reply lacked the success marker.
    Failed,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f, "deleted"),
            Self::Declined => write!(f, "declined"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Issues one delete request per decision, optionally gated by a confirmer.
pub struct DeleteExecutor {
    confirmer: Box<dyn Confirmer>,
    confirm: bool,
}

impl DeleteExecutor {
    #[must_use]
    pub fn new(confirmer: Box<dyn Confirmer>, confirm: bool) -> Self {
        Self { confirmer, confirm }
    }

    /// Delete the decision's post using the page's shared form fields.
    ///
    /// A single attempt is made; the outcome is decided by the success marker
    /// in the response body, whatever the HTTP status.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete request cannot be sent or read.
    pub async fn execute(
        &self,
        session: &ForumSession,
        decision: &ModerationDecision<'_>,
        fields: &DeleteFormFields,
    ) -> Result<DeleteOutcome, SessionError> {
        let payload = fields.merge_descriptor(&decision.record.delete_descriptor);

        if self.confirm && !self.confirmer.confirm(CONFIRM_PROMPT).await {
            info!(author = %decision.record.author, "Post is NOT deleted.");
            return Ok(DeleteOutcome::Declined);
        }

        let body = session.submit_delete(&payload).await?;
        if body.contains(DELETE_SUCCESS_MARKER) {
            info!(
                author = %decision.record.author,
                position = decision.record.position,
                "succeed."
            );
            Ok(DeleteOutcome::Deleted)
        } else {
            warn!(
                author = %decision.record.author,
                position = decision.record.position,
                "failed"
            );
            Ok(DeleteOutcome::Failed)
        }
    }
}

impl fmt::Debug for DeleteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteExecutor")
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}
