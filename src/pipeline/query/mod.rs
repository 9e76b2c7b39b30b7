#[cfg(test)]
mod tests;

use itertools::Itertools;
use tracing::{debug, info};

use super::QueryOutcome;
use super::context::aggregate;
use crate::openai::{CompletionClient, EmbeddingClient};
use crate::store::QdrantStore;
use crate::{RagError, Result};

pub const DEFAULT_TOP_K: usize = 5;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based on the provided context.";

/// One "answer question" operation: embed the question with the same model
/// the corpus was embedded with, retrieve the nearest chunks, and condition
/// a single completion call on them.
pub struct QueryPipeline {
    embeddings: EmbeddingClient,
    completion: CompletionClient,
    store: QdrantStore,
}

impl QueryPipeline {
    #[inline]
    pub fn new(
        embeddings: EmbeddingClient,
        completion: CompletionClient,
        store: QdrantStore,
    ) -> Self {
        Self {
            embeddings,
            completion,
            store,
        }
    }

    #[inline]
    pub fn answer(&self, question: &str, top_k: usize) -> Result<QueryOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        info!("Answering question with top_k {}", top_k);

        let query_vector = self.embeddings.embed_one(question)?;
        let hits = self.store.similarity_search(&query_vector, top_k)?;
        let retrieved = aggregate(&hits);

        debug!(
            "Aggregated {} context entries from {} hits across {} sources",
            retrieved.context.len(),
            hits.len(),
            retrieved.sources.len()
        );

        // An empty context set still goes to the model with a bare context
        // block; what it answers then is the model's business.
        let prompt = build_prompt(&retrieved.context, question);
        let answer = self.completion.complete(SYSTEM_PROMPT, &prompt)?;

        let num_contexts = retrieved.context.len();
        Ok(QueryOutcome {
            answer: answer.trim().to_string(),
            sources: retrieved.sources,
            num_contexts,
        })
    }
}

/// Build the grounding prompt: one bullet per context line in rank order,
/// then the question verbatim.
fn build_prompt(context: &[String], question: &str) -> String {
    let context_block = context.iter().map(|chunk| format!(" - {chunk}")).join("\n");

    format!(
        "Use the context to answer the question.\n\
         Context:\n\
         {context_block}\n\
         Question: {question}\n\
         Answer: concisely, using only the context above."
    )
}
