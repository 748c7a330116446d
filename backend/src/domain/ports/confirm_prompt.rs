//! Driving-side port for blocking yes/no confirmations.

use async_trait::async_trait;

/// Ask the user to confirm a destructive action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    /// Return `true` when the user accepted `message`.
    async fn confirm(&self, message: &str) -> bool;
}

/// Prompt with a predetermined answer.
///
/// HTTP callers answer up front (a `confirm=true` query parameter), so the
/// adapter already knows the reply when the domain asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConfirmation(pub bool);

#[async_trait]
impl ConfirmPrompt for FixedConfirmation {
    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!(accepted = self.0, prompt = message, "confirmation answered");
        self.0
    }
}
