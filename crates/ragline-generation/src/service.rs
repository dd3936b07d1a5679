//! Generation pipeline: render the prompt, call the LLM, return the answer.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::GenerationError;
use crate::llm::DynLlmClient;
use crate::prompt::build_prompt;

/// Answer generation over an injected LLM backend.
pub struct GenerationService {
    llm: Arc<dyn DynLlmClient>,
}

impl GenerationService {
    pub fn new(llm: Arc<dyn DynLlmClient>) -> Self {
        Self { llm }
    }

    /// Generate an answer for `query` grounded in `context_chunks`.
    ///
    /// Chunks are rendered into the prompt in the order given. An empty chunk
    /// list is legal and produces an answer over the no-context placeholder.
    pub async fn generate(
        &self,
        query: &str,
        context_chunks: &[String],
    ) -> Result<String, GenerationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GenerationError::EmptyQuery);
        }

        debug!(chunks = context_chunks.len(), "Rendering answer prompt");
        let prompt = build_prompt(query, context_chunks);

        let answer = self.llm.complete_boxed(&prompt).await?;
        info!("Generated answer ({} chars)", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;

    #[tokio::test]
    async fn generate_feeds_chunks_into_prompt_in_order() {
        let llm = Arc::new(MockLlm::new("done"));
        let service = GenerationService::new(llm.clone());

        let chunks = vec!["alpha".to_string(), "beta".to_string()];
        let answer = service.generate("what now?", &chunks).await.unwrap();
        assert_eq!(answer, "done");

        let prompts = llm.seen_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("alpha\n---\nbeta"));
        assert!(prompts[0].contains("what now?"));
    }

    #[tokio::test]
    async fn generate_with_no_chunks_still_calls_llm() {
        let llm = Arc::new(MockLlm::new("no docs answer"));
        let service = GenerationService::new(llm.clone());

        let answer = service.generate("anything?", &[]).await.unwrap();
        assert_eq!(answer, "no docs answer");

        let prompts = llm.seen_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("No context provided."));
    }

    #[tokio::test]
    async fn generate_rejects_empty_query() {
        let llm = Arc::new(MockLlm::new("unused"));
        let service = GenerationService::new(llm.clone());

        let err = service.generate("  ", &[]).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyQuery));
        assert!(llm.seen_prompts().is_empty());
    }
}
