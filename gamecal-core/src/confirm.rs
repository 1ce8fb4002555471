//! The human confirmation seam.

use std::fmt;

use crate::error::GameCalResult;

/// What the human said about a proposed change.
///
/// `Timeout` is not a "no": a declined addition is remembered, an unanswered
/// one is asked again on the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Timeout,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
            Answer::Timeout => write!(f, "no answer"),
        }
    }
}

/// A serial yes/no conversation with a human.
///
/// Implementations are called one prompt at a time and must return once the
/// human answered or their own timeout elapsed.
#[allow(async_fn_in_trait)]
pub trait Confirmation {
    async fn confirm(&self, prompt: &str) -> GameCalResult<Answer>;
}

impl<T: Confirmation + ?Sized> Confirmation for &T {
    async fn confirm(&self, prompt: &str) -> GameCalResult<Answer> {
        (**self).confirm(prompt).await
    }
}
