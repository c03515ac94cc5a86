//! Prompt assembly — pure and deterministic.
//!
//! Retrieved chunks are joined in rank order with an explicit separator
//! and substituted into the template along with the question. Both
//! placeholders are validated up front so a broken template fails at
//! construction, not per query.

use docent_core::config::IdentityConfig;
use docent_core::error::{DocentError, Result};
use docent_core::types::ScoredChunk;

/// Separator between chunks in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const DEFAULT_TEMPLATE: &str = "\
You are {assistant}, {owner}'s AI assistant. Answer questions about {owner} based only on the following context.

Context:
{context}

---

Please provide a detailed, comprehensive response about {owner} to the following question.
When referring to {owner}, use third person.
If you're asked about who you are, clearly state that you are {owner}'s AI assistant.

Key guidelines:
- Answer only based on the provided context
- Be professional and knowledgeable
- If information isn't in the context, say you don't have that information
- Keep responses focused and informative

Question: {question}

Answer:
";

pub struct PromptTemplate {
    template: String,
    max_chars: usize,
}

impl PromptTemplate {
    /// Create from a template string; it must contain both `{context}`
    /// and `{question}` placeholders.
    pub fn new(template: impl Into<String>, max_chars: usize) -> Result<Self> {
        let template = template.into();
        for placeholder in ["{context}", "{question}"] {
            if !template.contains(placeholder) {
                return Err(DocentError::TemplateError(format!(
                    "template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self {
            template,
            max_chars,
        })
    }

    /// The built-in template with the identity baked in.
    pub fn for_identity(identity: &IdentityConfig, max_chars: usize) -> Self {
        let template = DEFAULT_TEMPLATE
            .replace("{owner}", &identity.owner)
            .replace("{assistant}", &identity.assistant_name);
        Self {
            template,
            max_chars,
        }
    }

    /// Render the prompt for one query.
    ///
    /// Fails with `ContextTooLarge` if the result would exceed the
    /// character budget; chunks are never silently dropped.
    pub fn render(&self, question: &str, results: &[ScoredChunk]) -> Result<String> {
        let context = results
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        let prompt = self
            .template
            .replace("{context}", &context)
            .replace("{question}", question);

        let len = prompt.chars().count();
        if len > self.max_chars {
            return Err(DocentError::ContextTooLarge {
                len,
                max: self.max_chars,
            });
        }
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::types::Chunk;

    fn hit(id: u32, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id,
                doc_id: "doc.md".into(),
                start: 0,
                text: text.into(),
            },
            score: 1.0 - id as f32 * 0.1,
        }
    }

    #[test]
    fn test_placeholders_required() {
        assert!(PromptTemplate::new("Context: {context}", 1000).is_err());
        assert!(PromptTemplate::new("Q: {question}", 1000).is_err());
        assert!(PromptTemplate::new("{context} / {question}", 1000).is_ok());
    }

    #[test]
    fn test_render_joins_in_rank_order() {
        let template = PromptTemplate::new("C:{context}\nQ:{question}", 1000).unwrap();
        let prompt = template
            .render("who?", &[hit(0, "first"), hit(1, "second")])
            .unwrap();
        assert_eq!(prompt, "C:first\n\n---\n\nsecond\nQ:who?");
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = PromptTemplate::for_identity(&IdentityConfig::default(), 10000);
        let hits = vec![hit(0, "alpha"), hit(1, "beta")];
        assert_eq!(
            template.render("q", &hits).unwrap(),
            template.render("q", &hits).unwrap()
        );
    }

    #[test]
    fn test_context_too_large() {
        let template = PromptTemplate::new("{context}{question}", 20).unwrap();
        let err = template.render("q", &[hit(0, &"x".repeat(40))]).unwrap_err();
        assert!(matches!(
            err,
            DocentError::ContextTooLarge { len: 41, max: 20 }
        ));
    }

    #[test]
    fn test_identity_substitution() {
        let identity = IdentityConfig {
            owner: "Ada".into(),
            assistant_name: "Companion".into(),
            contact: String::new(),
        };
        let template = PromptTemplate::for_identity(&identity, 10000);
        let prompt = template.render("who is she?", &[hit(0, "bio")]).unwrap();
        assert!(prompt.contains("Ada's AI assistant"));
        assert!(prompt.contains("You are Companion"));
        assert!(prompt.contains("Question: who is she?"));
    }
}
