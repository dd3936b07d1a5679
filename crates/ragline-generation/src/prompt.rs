//! Prompt assembly for the documentation-assistant persona.
//!
//! The prompt grounds the model in retrieved manual excerpts and instructs it
//! to answer only from that context. Chunk order from retrieval is kept
//! as-is when the context block is rendered.

/// Template for one answer. `{context}` and `{query}` are substituted by
/// [`build_prompt`].
const ANSWER_TEMPLATE: &str = "\
You are a helpful technical documentation assistant specializing in user manuals and product guides. Your goal is to help users understand how to use products and troubleshoot issues based on the provided documentation.

Instructions:
- Answer questions using ONLY the information provided in the context below
- Provide clear, step-by-step instructions when explaining procedures
- Include relevant warnings, cautions, or safety notes mentioned in the documentation
- If the context contains multiple relevant sections, synthesize the information coherently
- When referencing specific features, buttons, or settings, use the exact terminology from the manual
- If the context doesn't contain sufficient information to answer the question, clearly state this limitation
- For troubleshooting questions, provide systematic diagnostic steps if available in the context

CONTEXT FROM USER MANUAL:
{context}

USER QUESTION:
{query}

ASSISTANT RESPONSE:
";

/// Separator between chunks in the rendered context block.
const CHUNK_SEPARATOR: &str = "\n---\n";

/// Placeholder rendered when retrieval produced no chunks. Generation still
/// runs; the model is expected to state that it has no documentation to
/// answer from.
const EMPTY_CONTEXT: &str = "No context provided.";

/// Join chunks with a separator line, or return the empty-context
/// placeholder.
pub fn format_context(chunks: &[String]) -> String {
    if chunks.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }
    chunks.join(CHUNK_SEPARATOR)
}

/// Render the full prompt for a query and its retrieved context.
pub fn build_prompt(query: &str, chunks: &[String]) -> String {
    ANSWER_TEMPLATE
        .replace("{context}", &format_context(chunks))
        .replace("{query}", query)
}
