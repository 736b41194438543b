// Advisory boundary: request construction, the LLM client, and validation
// of what comes back.

pub mod client;
pub mod prompt;
pub mod validate;
