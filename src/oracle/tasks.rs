use super::{ChatClient, ChatMessage, OracleError};
use crate::artifact::{split, SCRIPT_MARKER};
use crate::prompts;

pub fn follow_up_question(
    client: &ChatClient,
    model: &str,
    requirements_summary: &str,
) -> Result<String, OracleError> {
    client.complete(
        model,
        &[
            ChatMessage::system(prompts::FOLLOW_UP_PROMPT),
            ChatMessage::user(requirements_summary),
        ],
    )
}

pub fn design_instruction_prompt(
    client: &ChatClient,
    model: &str,
    requirements_summary: &str,
) -> Result<String, OracleError> {
    client.complete(
        model,
        &[
            ChatMessage::system(prompts::ARCHITECT_PROMPT),
            ChatMessage::user(requirements_summary),
        ],
    )
}

pub fn generate_bootstrap_script(
    client: &ChatClient,
    model: &str,
    instruction_prompt: &str,
) -> Result<String, OracleError> {
    client.complete(
        model,
        &[
            ChatMessage::system(prompts::GENERATOR_PROMPT),
            ChatMessage::user(instruction_prompt),
        ],
    )
}

/// Returns the revised script body, with the `[usage]` section already
/// stripped via the marker contract.
pub fn repair_bootstrap_script(
    client: &ChatClient,
    model: &str,
    current_script: &str,
    error_text: &str,
) -> Result<String, OracleError> {
    let combined = client.complete(
        model,
        &[
            ChatMessage::system(prompts::REPAIR_PROMPT),
            ChatMessage::user(prompts::render_repair_input(current_script, error_text)),
        ],
    )?;
    let artifact = split(&combined, SCRIPT_MARKER);
    if !artifact.has_script() {
        return Err(OracleError::Completion(
            "repair response contained no script body".to_string(),
        ));
    }
    Ok(artifact.script_body)
}

pub fn revise_instruction_prompt(
    client: &ChatClient,
    model: &str,
    instruction_prompt: &str,
    feedback: &str,
) -> Result<String, OracleError> {
    client.complete(
        model,
        &[
            ChatMessage::system(prompts::REVISION_PROMPT),
            ChatMessage::user(prompts::render_revision_input(instruction_prompt, feedback)),
        ],
    )
}
