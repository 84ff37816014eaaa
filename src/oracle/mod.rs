mod api;
mod tasks;

pub use api::{parse_chat_completion, ChatClient, ChatMessage, COMPLETIONS_PATH};
pub use tasks::{
    design_instruction_prompt, follow_up_question, generate_bootstrap_script,
    repair_bootstrap_script, revise_instruction_prompt,
};

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("no api key configured; set APPSEED_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
    #[error("completion request failed: {0}")]
    Request(String),
    #[error("completion api returned an error: {0}")]
    Api(String),
    #[error("completion response was not usable: {0}")]
    Completion(String),
}
