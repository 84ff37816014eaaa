mod launch;

pub use launch::{handle_launch, parse_launch_args, render_retry_report, LaunchArgs};

use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::config::{
    load_settings, resolve_state_root, save_settings, settings_file_exists, Settings,
};
use crate::intake::INTAKE_QUESTIONS;
use crate::session::load_session;
use crate::shared::logging::session_log_path;
use std::fs;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let Some(verb_raw) = args.first() else {
        return Ok(help_text());
    };
    match parse_cli_verb(verb_raw) {
        CliVerb::Setup => handle_setup(),
        CliVerb::Run => handle_run(),
        CliVerb::Launch => handle_launch(&args[1..]),
        CliVerb::Status => handle_status(),
        CliVerb::Logs => handle_logs(),
        CliVerb::Unknown => Err(format!("unknown command `{verb_raw}`\n\n{}", help_text())),
    }
}

fn handle_setup() -> Result<String, String> {
    let state_root = resolve_state_root().map_err(|err| err.to_string())?;
    let mut lines = Vec::new();

    let settings = if settings_file_exists(&state_root) {
        let settings = load_settings(&state_root).map_err(|err| err.to_string())?;
        lines.push(format!(
            "settings already present at {}",
            crate::config::settings_path(&state_root).display()
        ));
        settings
    } else {
        let settings = Settings::default();
        let path = save_settings(&state_root, &settings).map_err(|err| err.to_string())?;
        lines.push(format!("wrote default settings to {}", path.display()));
        settings
    };

    let workdirs = settings.resolve_workdirs_path(&state_root);
    for dir in [state_root.join("logs"), workdirs] {
        fs::create_dir_all(&dir)
            .map_err(|err| format!("failed to create {}: {err}", dir.display()))?;
        lines.push(format!("prepared {}", dir.display()));
    }
    lines.push("run `appseed run` to start the staged wizard".to_string());
    Ok(lines.join("\n"))
}

fn handle_run() -> Result<String, String> {
    let state_root = resolve_state_root().map_err(|err| err.to_string())?;
    if !settings_file_exists(&state_root) {
        return Err(format!(
            "no settings found under {}; run `appseed setup` first",
            state_root.display()
        ));
    }
    let settings = load_settings(&state_root).map_err(|err| err.to_string())?;
    let session = load_session(&state_root)
        .map_err(|err| err.to_string())?
        .unwrap_or_default();
    crate::tui::wizard::run_wizard(&state_root, &settings, session)?;
    Ok("session saved; run `appseed status` for a summary".to_string())
}

fn handle_status() -> Result<String, String> {
    let state_root = resolve_state_root().map_err(|err| err.to_string())?;
    let Some(session) = load_session(&state_root).map_err(|err| err.to_string())? else {
        return Ok("no saved session; run `appseed run` to start one".to_string());
    };

    let answered = (0..INTAKE_QUESTIONS.len())
        .filter(|idx| !session.intake.answer(*idx).trim().is_empty())
        .count();
    let mut lines = vec![
        format!("stage: {}", session.stage.title()),
        format!("intake answers: {answered}/{}", INTAKE_QUESTIONS.len()),
        format!(
            "instruction prompt: {}",
            presence(&session.instruction_prompt)
        ),
        format!("generated script: {}", presence(&session.generated_output)),
        format!("revised prompt: {}", presence(&session.revised_prompt)),
        format!("updated: {}", session.updated_at),
    ];
    if let Some(question) = &session.follow_up_question {
        lines.push(format!("open follow-up question: {question}"));
    }
    Ok(lines.join("\n"))
}

fn handle_logs() -> Result<String, String> {
    let state_root = resolve_state_root().map_err(|err| err.to_string())?;
    let path = session_log_path(&state_root);
    match fs::read_to_string(&path) {
        Ok(contents) if contents.trim().is_empty() => Ok("no log entries yet".to_string()),
        Ok(contents) => Ok(contents.trim_end().to_string()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Ok("no log entries yet".to_string())
        }
        Err(err) => Err(format!("failed to read {}: {err}", path.display())),
    }
}

fn presence(text: &str) -> &'static str {
    if text.trim().is_empty() {
        "not generated"
    } else {
        "present"
    }
}
