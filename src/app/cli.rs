#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Setup,
    Run,
    Launch,
    Status,
    Logs,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "setup" => CliVerb::Setup,
        "run" => CliVerb::Run,
        "launch" => CliVerb::Launch,
        "status" => CliVerb::Status,
        "logs" => CliVerb::Logs,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  setup                                Initialize the state root and default settings"
            .to_string(),
        "  run                                  Start the interactive staged wizard".to_string(),
        "  launch <script> [--attempts N]       Run a bootstrap script with execute-and-repair"
            .to_string(),
        "  status                               Show the saved session summary".to_string(),
        "  logs                                 Print the session log".to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_verbs_parse_and_unknown_falls_through() {
        assert_eq!(parse_cli_verb("setup"), CliVerb::Setup);
        assert_eq!(parse_cli_verb("run"), CliVerb::Run);
        assert_eq!(parse_cli_verb("launch"), CliVerb::Launch);
        assert_eq!(parse_cli_verb("status"), CliVerb::Status);
        assert_eq!(parse_cli_verb("logs"), CliVerb::Logs);
        assert_eq!(parse_cli_verb("deploy"), CliVerb::Unknown);
    }

    #[test]
    fn help_names_every_command() {
        let help = help_text();
        for verb in ["setup", "run", "launch", "status", "logs"] {
            assert!(help.contains(verb), "help should mention `{verb}`");
        }
    }
}
