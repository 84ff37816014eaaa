pub const SCRIPT_MARKER: &str = "[shell script]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptArtifact {
    pub instructions: String,
    pub script_body: String,
}

impl ScriptArtifact {
    pub fn has_script(&self) -> bool {
        !self.script_body.is_empty()
    }
}

pub fn split(combined_text: &str, marker: &str) -> ScriptArtifact {
    match combined_text.split_once(marker) {
        Some((instructions, script_body)) => ScriptArtifact {
            instructions: instructions.trim().to_string(),
            script_body: script_body.trim().to_string(),
        },
        None => ScriptArtifact {
            instructions: String::new(),
            script_body: combined_text.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_marker_trims_both_sides() {
        let combined = "  run it with sh  \n[shell script]\n#!/bin/sh\necho hi\n";
        let artifact = split(combined, SCRIPT_MARKER);
        assert_eq!(artifact.instructions, "run it with sh");
        assert_eq!(artifact.script_body, "#!/bin/sh\necho hi");
    }

    #[test]
    fn split_uses_first_marker_occurrence() {
        let combined = "usage\n[shell script]\necho '[shell script]'";
        let artifact = split(combined, SCRIPT_MARKER);
        assert_eq!(artifact.instructions, "usage");
        assert_eq!(artifact.script_body, "echo '[shell script]'");
    }

    #[test]
    fn missing_marker_yields_full_body_and_empty_instructions() {
        let artifact = split("  just a script  ", SCRIPT_MARKER);
        assert_eq!(artifact.instructions, "");
        assert_eq!(artifact.script_body, "just a script");
        assert!(artifact.has_script());
    }

    #[test]
    fn empty_input_is_a_valid_case() {
        let artifact = split("", SCRIPT_MARKER);
        assert_eq!(artifact.instructions, "");
        assert_eq!(artifact.script_body, "");
        assert!(!artifact.has_script());
    }
}
