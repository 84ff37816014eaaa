pub const FOLLOW_UP_PROMPT: &str = include_str!("assets/follow_up.prompt.md");
pub const ARCHITECT_PROMPT: &str = include_str!("assets/architect.prompt.md");
pub const GENERATOR_PROMPT: &str = include_str!("assets/generator.prompt.md");
pub const REPAIR_PROMPT: &str = include_str!("assets/repair.prompt.md");
pub const REVISION_PROMPT: &str = include_str!("assets/revision.prompt.md");

pub fn render_repair_input(script: &str, error_text: &str) -> String {
    format!("[current script]\n{script}\n\n[error output]\n{error_text}")
}

pub fn render_revision_input(instruction_prompt: &str, feedback: &str) -> String {
    format!("[original instruction prompt]\n{instruction_prompt}\n\n[test feedback]\n{feedback}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::SCRIPT_MARKER;

    #[test]
    fn generation_and_repair_templates_carry_the_marker_contract() {
        assert!(GENERATOR_PROMPT.contains(SCRIPT_MARKER));
        assert!(GENERATOR_PROMPT.contains("[usage]"));
        assert!(REPAIR_PROMPT.contains(SCRIPT_MARKER));
        assert!(REPAIR_PROMPT.contains("[usage]"));
    }

    #[test]
    fn follow_up_template_names_the_sentinel_line() {
        assert!(FOLLOW_UP_PROMPT.contains("No further questions"));
    }

    #[test]
    fn repair_input_embeds_script_and_error() {
        let rendered = render_repair_input("echo hi", "boom");
        assert!(rendered.contains("[current script]\necho hi"));
        assert!(rendered.contains("[error output]\nboom"));
    }

    #[test]
    fn revision_input_embeds_prompt_and_feedback() {
        let rendered = render_revision_input("build X", "needs Y");
        assert!(rendered.contains("[original instruction prompt]\nbuild X"));
        assert!(rendered.contains("[test feedback]\nneeds Y"));
    }
}
