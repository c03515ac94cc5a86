//! Answer generator — the recovery boundary for upstream failures.
//!
//! Sends the rendered prompt to the completion backend once. Any upstream
//! failure is converted here into a well-defined fallback answer plus the
//! failure kind, so callers log and degrade instead of propagating an
//! exception to the end user.

use docent_core::config::{IdentityConfig, LlmConfig};
use docent_core::traits::{CompleteParams, CompletionBackend};
use docent_core::types::FailureKind;

pub struct AnswerGenerator {
    backend: Box<dyn CompletionBackend>,
    params: CompleteParams,
    identity: IdentityConfig,
}

impl AnswerGenerator {
    pub fn new(backend: Box<dyn CompletionBackend>, llm: &LlmConfig, identity: IdentityConfig) -> Self {
        Self {
            backend,
            params: CompleteParams {
                max_tokens: llm.max_tokens,
                temperature: llm.temperature,
            },
            identity,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Run the prompt through the backend; on failure return the fallback
    /// text together with what went wrong.
    pub async fn generate(&self, prompt: &str) -> (String, Option<FailureKind>) {
        match self.backend.complete(prompt, &self.params).await {
            Ok(text) => (text, None),
            Err(e) => {
                let kind = e.failure_kind().unwrap_or(FailureKind::UpstreamError);
                tracing::error!("Completion via {} failed: {e}", self.backend.name());
                (self.trouble_text(), Some(kind))
            }
        }
    }

    /// Fallback when the completion service or embedder fails mid-query.
    pub fn trouble_text(&self) -> String {
        format!(
            "I apologize, but I'm having trouble processing your request right now. Please try again later.{}",
            self.contact_suffix()
        )
    }

    /// Fallback when the index snapshot is not available.
    pub fn kb_unavailable_text(&self) -> String {
        format!(
            "I'm sorry, but I'm currently unable to access my knowledge base. Please try again later.{}",
            self.contact_suffix()
        )
    }

    /// Benign answer when retrieval finds nothing relevant.
    pub fn no_results_text(&self) -> String {
        format!(
            "I don't have information about that in my current knowledge base.{}",
            self.contact_suffix()
        )
    }

    fn contact_suffix(&self) -> String {
        if self.identity.contact.is_empty() {
            String::new()
        } else {
            format!(
                " For specific inquiries, please contact {} directly at {}.",
                self.identity.owner, self.identity.contact
            )
        }
    }
}
