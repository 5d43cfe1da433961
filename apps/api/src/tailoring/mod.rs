// Tailoring: templates → LLM generation → YAML post-processing → render → bundle.
// All LLM calls go through the TextGenerator capability in llm_client.

pub mod dates;
pub mod extract;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod scratch;
pub mod templates;
pub mod validate;

#[cfg(test)]
pub mod test_support;
