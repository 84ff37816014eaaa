use appseed::app::cli::{cli_help_lines, parse_cli_verb, CliVerb};
use appseed::app::command_handlers::{parse_launch_args, LaunchArgs};
use std::path::PathBuf;

#[test]
fn verbs_parse_to_their_handlers() {
    assert_eq!(parse_cli_verb("setup"), CliVerb::Setup);
    assert_eq!(parse_cli_verb("run"), CliVerb::Run);
    assert_eq!(parse_cli_verb("launch"), CliVerb::Launch);
    assert_eq!(parse_cli_verb("status"), CliVerb::Status);
    assert_eq!(parse_cli_verb("logs"), CliVerb::Logs);
    assert_eq!(parse_cli_verb("serve"), CliVerb::Unknown);
}

#[test]
fn help_covers_the_command_surface() {
    let help = cli_help_lines().join("\n");
    for verb in ["setup", "run", "launch", "status", "logs"] {
        assert!(help.contains(verb));
    }
}

#[test]
fn launch_args_take_a_script_and_optional_attempts() {
    let args = vec!["seed.sh".to_string()];
    assert_eq!(
        parse_launch_args(&args).expect("script only"),
        LaunchArgs {
            script_path: PathBuf::from("seed.sh"),
            attempts_override: None,
        }
    );

    let args = vec![
        "seed.sh".to_string(),
        "--attempts".to_string(),
        "5".to_string(),
    ];
    assert_eq!(
        parse_launch_args(&args).expect("with attempts"),
        LaunchArgs {
            script_path: PathBuf::from("seed.sh"),
            attempts_override: Some(5),
        }
    );
}

#[test]
fn launch_args_reject_bad_input() {
    assert!(parse_launch_args(&[]).is_err(), "script path is required");
    assert!(parse_launch_args(&["--attempts".to_string()]).is_err());
    assert!(parse_launch_args(&[
        "seed.sh".to_string(),
        "--attempts".to_string(),
        "many".to_string()
    ])
    .is_err());
    assert!(parse_launch_args(&[
        "seed.sh".to_string(),
        "extra.sh".to_string()
    ])
    .is_err());
}
