use crate::config::{load_settings, resolve_state_root, settings_file_exists};
use crate::oracle::{repair_bootstrap_script, ChatClient};
use crate::retry::{execute_with_retries, script_fingerprint, RetryOutcome, RetryRequest, RetrySession};
use crate::shared::logging::append_session_log_line;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    pub script_path: PathBuf,
    pub attempts_override: Option<u32>,
}

pub fn parse_launch_args(args: &[String]) -> Result<LaunchArgs, String> {
    let mut script_path = None;
    let mut attempts_override = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--attempts" {
            let raw = iter
                .next()
                .ok_or_else(|| "--attempts requires a value".to_string())?;
            let value: u32 = raw
                .parse()
                .map_err(|_| format!("--attempts requires a number, got `{raw}`"))?;
            attempts_override = Some(value);
        } else if script_path.is_none() {
            script_path = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }
    let script_path =
        script_path.ok_or_else(|| "usage: appseed launch <script> [--attempts N]".to_string())?;
    Ok(LaunchArgs {
        script_path,
        attempts_override,
    })
}

pub fn handle_launch(args: &[String]) -> Result<String, String> {
    let parsed = parse_launch_args(args)?;
    let state_root = resolve_state_root().map_err(|err| err.to_string())?;
    if !settings_file_exists(&state_root) {
        return Err(format!(
            "no settings found under {}; run `appseed setup` first",
            state_root.display()
        ));
    }
    let settings = load_settings(&state_root).map_err(|err| err.to_string())?;
    let script = fs::read_to_string(&parsed.script_path).map_err(|err| {
        format!(
            "failed to read script {}: {err}",
            parsed.script_path.display()
        )
    })?;

    let client =
        ChatClient::from_env(&settings.api_base, settings.request_timeout()).map_err(|err| err.to_string())?;
    let workdirs = settings.resolve_workdirs_path(&state_root);
    let max_attempts = parsed.attempts_override.unwrap_or(settings.max_attempts);
    let request = RetryRequest {
        initial_script: &script,
        max_attempts,
        base_directory: &workdirs,
        script_timeout: settings.script_timeout(),
    };
    let model = settings.generator_model.clone();
    let session = execute_with_retries(
        &request,
        |current, error_text| repair_bootstrap_script(&client, &model, current, error_text),
        || false,
    )
    .map_err(|err| err.to_string())?;

    let _ = append_session_log_line(
        &state_root,
        &format!(
            "launch outcome={} attempts={}/{} script={}",
            session.outcome.as_str(),
            session.attempts_used,
            session.max_attempts,
            script_fingerprint(&session.final_script),
        ),
    );
    Ok(render_retry_report(&session))
}

pub fn render_retry_report(session: &RetrySession) -> String {
    let mut lines = Vec::new();
    match &session.outcome {
        RetryOutcome::Succeeded => {
            lines.push(format!(
                "script launched successfully after {} attempt(s)",
                session.attempts_used
            ));
            if let Some(directory) = &session.final_directory {
                lines.push(format!("workdir: {}", directory.display()));
            }
        }
        RetryOutcome::Exhausted => {
            lines.push(format!(
                "attempt budget exhausted after {} attempt(s); the last repaired script is returned for reuse",
                session.attempts_used
            ));
        }
        RetryOutcome::Cancelled => {
            lines.push(format!(
                "launch cancelled after {} attempt(s)",
                session.attempts_used
            ));
        }
        RetryOutcome::OracleFailed { reason } => {
            lines.push(format!(
                "repair oracle failed after {} attempt(s): {reason}",
                session.attempts_used
            ));
        }
    }
    lines.push(format!(
        "script fingerprint: {}",
        script_fingerprint(&session.final_script)
    ));
    if !session.final_stdout.trim().is_empty() {
        lines.push(format!("stdout:\n{}", session.final_stdout.trim_end()));
    }
    if !session.final_stderr.trim().is_empty() {
        lines.push(format!("stderr:\n{}", session.final_stderr.trim_end()));
    }
    lines.join("\n")
}
