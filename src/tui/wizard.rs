use crate::config::Settings;
use crate::intake::{
    is_no_further_questions, render_answer_sheet, render_requirements_summary, INTAKE_QUESTIONS,
};
use crate::oracle::{
    design_instruction_prompt, follow_up_question, generate_bootstrap_script,
    repair_bootstrap_script, revise_instruction_prompt, ChatClient,
};
use crate::retry::{execute_with_retries, script_fingerprint, RetryRequest, RetrySession};
use crate::session::{save_session, Stage, WorkflowSession, ALL_STAGES};
use crate::shared::logging::append_session_log_line;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const WIZARD_EXIT_COMMANDS: &[&str] = &["/exit", "exit", "quit"];

const PROCESSING_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const UI_POLL_INTERVAL: Duration = Duration::from_millis(60);
const SPINNER_TICK_INTERVAL: Duration = Duration::from_millis(120);
const CURSOR_BLINK_INTERVAL: Duration = Duration::from_millis(500);

pub fn is_wizard_exit_command(message: &str) -> bool {
    WIZARD_EXIT_COMMANDS
        .iter()
        .any(|command| message.eq_ignore_ascii_case(command))
}

#[derive(Debug, Clone)]
struct ChatLine {
    speaker: &'static str,
    text: String,
}

enum WorkerOutcome {
    FollowUp(Result<String, String>),
    Prompt(Result<String, String>),
    Script(Result<String, String>),
    Launch(Result<RetrySession, String>),
    Revision(Result<String, String>),
}

struct OracleWorker {
    label: &'static str,
    result_rx: Receiver<WorkerOutcome>,
}

struct WizardState {
    session: WorkflowSession,
    input: String,
    transcript: Vec<ChatLine>,
    worker: Option<OracleWorker>,
    cancel_flag: Arc<AtomicBool>,
    spinner_index: usize,
    last_spinner_tick: Instant,
    cursor_visible: bool,
    last_cursor_tick: Instant,
}

impl WizardState {
    fn new(session: WorkflowSession) -> Self {
        Self {
            session,
            input: String::new(),
            transcript: Vec::new(),
            worker: None,
            cancel_flag: Arc::new(AtomicBool::new(false)),
            spinner_index: 0,
            last_spinner_tick: Instant::now(),
            cursor_visible: true,
            last_cursor_tick: Instant::now(),
        }
    }

    fn spinner_frame(&self) -> &'static str {
        PROCESSING_FRAMES[self.spinner_index % PROCESSING_FRAMES.len()]
    }

    fn advance_spinner_if_needed(&mut self) {
        if self.worker.is_some() && self.last_spinner_tick.elapsed() >= SPINNER_TICK_INTERVAL {
            self.spinner_index = (self.spinner_index + 1) % PROCESSING_FRAMES.len();
            self.last_spinner_tick = Instant::now();
        }
    }

    fn advance_cursor_blink_if_needed(&mut self) {
        if self.last_cursor_tick.elapsed() >= CURSOR_BLINK_INTERVAL {
            self.cursor_visible = !self.cursor_visible;
            self.last_cursor_tick = Instant::now();
        }
    }

    fn cursor_suffix(&self) -> &'static str {
        if self.cursor_visible {
            "█"
        } else {
            " "
        }
    }

    fn status_line(&self) -> String {
        if let Some(worker) = &self.worker {
            if self.cancel_flag.load(Ordering::Relaxed) {
                return format!(
                    "{} {} (cancellation requested)",
                    worker.label,
                    self.spinner_frame()
                );
            }
            return format!("{} {}", worker.label, self.spinner_frame());
        }
        "type an answer or a command; /help lists commands, /exit quits".to_string()
    }

    fn say(&mut self, speaker: &'static str, text: impl Into<String>) {
        self.transcript.push(ChatLine {
            speaker,
            text: text.into(),
        });
    }
}

pub fn run_wizard(
    state_root: &Path,
    settings: &Settings,
    session: WorkflowSession,
) -> Result<(), String> {
    let client = match ChatClient::from_env(&settings.api_base, settings.request_timeout()) {
        Ok(client) => Some(client),
        Err(err) => {
            eprintln!("warning: {err}");
            None
        }
    };

    let mut terminal = setup_terminal()?;
    let mut state = WizardState::new(session);
    announce_stage(&mut state);

    let result = run_event_loop(&mut terminal, state_root, settings, client.as_ref(), &mut state);
    teardown_terminal(&mut terminal)?;

    save_session(state_root, &state.session).map_err(|err| err.to_string())?;
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_root: &Path,
    settings: &Settings,
    client: Option<&ChatClient>,
    state: &mut WizardState,
) -> Result<(), String> {
    if client.is_none() {
        state.say(
            "system",
            "no api key configured; generation commands will fail until APPSEED_API_KEY or OPENAI_API_KEY is set",
        );
    }

    loop {
        state.advance_spinner_if_needed();
        state.advance_cursor_blink_if_needed();
        check_worker_result(state_root, state);
        draw_wizard_ui(terminal, state)?;

        if !event::poll(UI_POLL_INTERVAL).map_err(|e| format!("failed to poll events: {e}"))? {
            continue;
        }

        let Event::Key(key) = event::read().map_err(|e| format!("failed to read event: {e}"))?
        else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            break;
        }

        match key.code {
            KeyCode::Esc => {
                if state.worker.is_some() {
                    state.cancel_flag.store(true, Ordering::Relaxed);
                    state.say(
                        "system",
                        "cancellation requested; the running attempt is allowed to finish",
                    );
                } else {
                    break;
                }
            }
            KeyCode::Enter => {
                let message = state.input.trim().to_string();
                state.input.clear();
                if message.is_empty() {
                    continue;
                }
                if is_wizard_exit_command(&message) {
                    break;
                }
                if state.worker.is_some() {
                    state.say("system", "still working on the previous step");
                    continue;
                }
                handle_submission(state_root, settings, client, state, message);
            }
            KeyCode::Backspace => {
                state.input.pop();
            }
            KeyCode::Char(c) => {
                state.input.push(c);
            }
            _ => {}
        }
    }

    Ok(())
}

fn handle_submission(
    state_root: &Path,
    settings: &Settings,
    client: Option<&ChatClient>,
    state: &mut WizardState,
    message: String,
) {
    match message.as_str() {
        "/help" => {
            state.say(
                "system",
                "commands: /next advance stage | /back previous stage | /review show the answer sheet | /generate run this stage's model call | /launch execute the script | /apply adopt the revised prompt | /exit quit",
            );
        }
        "/next" => match state.session.advance() {
            Ok(stage) => {
                let _ = append_session_log_line(state_root, &format!("stage={stage}"));
                persist(state_root, state);
                announce_stage(state);
            }
            Err(feedback) => state.say("system", feedback),
        },
        "/back" => {
            if let Some(stage) = state.session.retreat() {
                let _ = append_session_log_line(state_root, &format!("stage={stage}"));
                persist(state_root, state);
                announce_stage(state);
            } else {
                state.say("system", "already at the first stage");
            }
        }
        "/review" => {
            for line in render_answer_sheet(&state.session.intake).lines() {
                if !line.trim().is_empty() {
                    state.say("system", line.to_string());
                }
            }
        }
        "/generate" => match state.session.stage {
            Stage::PromptDesign => spawn_prompt_design(settings, client, state),
            Stage::ScriptGeneration => spawn_script_generation(settings, client, state),
            _ => state.say(
                "system",
                "/generate works in the instruction prompt and script generation stages",
            ),
        },
        "/launch" => {
            if state.session.stage != Stage::Launch {
                state.say("system", "/launch works in the launch stage; use /next to get there");
            } else {
                spawn_launch(state_root, settings, client, state);
            }
        }
        "/apply" => {
            if state.session.revised_prompt.trim().is_empty() {
                state.say("system", "no revised prompt to apply; submit feedback first");
            } else {
                state.session.instruction_prompt = state.session.revised_prompt.clone();
                state.session.revised_prompt.clear();
                state.session.stage = Stage::ScriptGeneration;
                state.session.touch();
                persist(state_root, state);
                state.say(
                    "system",
                    "adopted the revised prompt; back in script generation, use /generate",
                );
            }
        }
        _ => handle_plain_text(state_root, settings, client, state, &message),
    }
}

fn handle_plain_text(
    state_root: &Path,
    settings: &Settings,
    client: Option<&ChatClient>,
    state: &mut WizardState,
    message: &str,
) {
    match state.session.stage {
        Stage::Requirements => {
            if state.session.follow_up_question.is_some() {
                state.say("you", message);
                state
                    .session
                    .intake
                    .additional_answers
                    .push(message.to_string());
                state.session.follow_up_question = None;
                state.session.touch();
                persist(state_root, state);
                spawn_follow_up(settings, client, state);
                return;
            }
            match state.session.intake.first_unanswered() {
                Some(index) => {
                    state.say("you", message);
                    state.session.intake.set_answer(index, message);
                    state.session.touch();
                    persist(state_root, state);
                    match state.session.intake.first_unanswered() {
                        Some(next) => ask_question(state, next),
                        None => spawn_follow_up(settings, client, state),
                    }
                }
                None => state.say(
                    "system",
                    "all questions are answered; type /next to design the instruction prompt",
                ),
            }
        }
        Stage::PromptDesign | Stage::ScriptGeneration => {
            state.say("system", "use /generate here, or /next and /back to navigate");
        }
        Stage::Launch => {
            state.say("you", message);
            spawn_revision(settings, client, state, message.to_string());
        }
    }
}

fn announce_stage(state: &mut WizardState) {
    let stage = state.session.stage;
    state.say("system", format!("stage: {}", stage.title()));
    match stage {
        Stage::Requirements => {
            if let Some(index) = state.session.intake.first_unanswered() {
                ask_question(state, index);
            } else if let Some(question) = state.session.follow_up_question.clone() {
                state.say("assistant", question);
            } else {
                state.say(
                    "system",
                    "all questions are answered; type /next to design the instruction prompt",
                );
            }
        }
        Stage::PromptDesign => {
            if state.session.instruction_prompt.trim().is_empty() {
                state.say("system", "type /generate to synthesize the instruction prompt");
            } else {
                state.say("system", "instruction prompt is ready; /generate redoes it, /next continues");
            }
        }
        Stage::ScriptGeneration => {
            if state.session.generated_output.trim().is_empty() {
                state.say("system", "type /generate to produce the bootstrap script");
            } else {
                let artifact = state.session.artifact();
                state.say(
                    "system",
                    format!(
                        "script is ready (fingerprint {}); /generate redoes it, /next continues",
                        script_fingerprint(&artifact.script_body)
                    ),
                );
            }
        }
        Stage::Launch => {
            state.say(
                "system",
                "type /launch to execute the script with repair retries, or send feedback text to revise the prompt",
            );
        }
    }
}

fn ask_question(state: &mut WizardState, index: usize) {
    let question = INTAKE_QUESTIONS[index];
    state.say(
        "assistant",
        format!(
            "question {}/{} [{}]: {}",
            index + 1,
            INTAKE_QUESTIONS.len(),
            question.label,
            question.prompt
        ),
    );
}

fn spawn_worker(
    state: &mut WizardState,
    label: &'static str,
    job: impl FnOnce() -> WorkerOutcome + Send + 'static,
) {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(job());
    });
    state.worker = Some(OracleWorker {
        label,
        result_rx: rx,
    });
    state.spinner_index = 0;
    state.last_spinner_tick = Instant::now();
}

fn require_client(client: Option<&ChatClient>, state: &mut WizardState) -> Option<ChatClient> {
    match client {
        Some(client) => Some(client.clone()),
        None => {
            state.say(
                "system",
                "no api key configured; set APPSEED_API_KEY or OPENAI_API_KEY and restart",
            );
            None
        }
    }
}

fn spawn_follow_up(settings: &Settings, client: Option<&ChatClient>, state: &mut WizardState) {
    let Some(client) = require_client(client, state) else {
        return;
    };
    let model = settings.architect_model.clone();
    let summary = render_requirements_summary(&state.session.intake);
    spawn_worker(state, "checking for follow-up questions", move || {
        WorkerOutcome::FollowUp(
            follow_up_question(&client, &model, &summary).map_err(|err| err.to_string()),
        )
    });
}

fn spawn_prompt_design(settings: &Settings, client: Option<&ChatClient>, state: &mut WizardState) {
    let Some(client) = require_client(client, state) else {
        return;
    };
    let model = settings.architect_model.clone();
    let summary = render_requirements_summary(&state.session.intake);
    spawn_worker(state, "designing the instruction prompt", move || {
        WorkerOutcome::Prompt(
            design_instruction_prompt(&client, &model, &summary).map_err(|err| err.to_string()),
        )
    });
}

fn spawn_script_generation(
    settings: &Settings,
    client: Option<&ChatClient>,
    state: &mut WizardState,
) {
    if state.session.instruction_prompt.trim().is_empty() {
        state.say("system", "no instruction prompt yet; go back and /generate it first");
        return;
    }
    let Some(client) = require_client(client, state) else {
        return;
    };
    let model = settings.generator_model.clone();
    let prompt = state.session.instruction_prompt.clone();
    spawn_worker(state, "generating the bootstrap script", move || {
        WorkerOutcome::Script(
            generate_bootstrap_script(&client, &model, &prompt).map_err(|err| err.to_string()),
        )
    });
}

fn spawn_launch(
    state_root: &Path,
    settings: &Settings,
    client: Option<&ChatClient>,
    state: &mut WizardState,
) {
    let artifact = state.session.artifact();
    if !artifact.has_script() {
        state.say("system", "no script to launch; generate one first");
        return;
    }
    let Some(client) = require_client(client, state) else {
        return;
    };
    state.cancel_flag.store(false, Ordering::Relaxed);
    let cancel_flag = Arc::clone(&state.cancel_flag);
    let model = settings.generator_model.clone();
    let script = artifact.script_body;
    let base_directory: PathBuf = settings.resolve_workdirs_path(state_root);
    let max_attempts = settings.max_attempts;
    let script_timeout = settings.script_timeout();
    spawn_worker(state, "launching the script", move || {
        let request = RetryRequest {
            initial_script: &script,
            max_attempts,
            base_directory: &base_directory,
            script_timeout,
        };
        WorkerOutcome::Launch(
            execute_with_retries(
                &request,
                |current, error_text| repair_bootstrap_script(&client, &model, current, error_text),
                || cancel_flag.load(Ordering::Relaxed),
            )
            .map_err(|err| err.to_string()),
        )
    });
}

fn spawn_revision(
    settings: &Settings,
    client: Option<&ChatClient>,
    state: &mut WizardState,
    feedback: String,
) {
    if state.session.instruction_prompt.trim().is_empty() {
        state.say("system", "no instruction prompt to revise yet");
        return;
    }
    let Some(client) = require_client(client, state) else {
        return;
    };
    let model = settings.architect_model.clone();
    let prompt = state.session.instruction_prompt.clone();
    spawn_worker(state, "revising the instruction prompt", move || {
        WorkerOutcome::Revision(
            revise_instruction_prompt(&client, &model, &prompt, &feedback)
                .map_err(|err| err.to_string()),
        )
    });
}

fn check_worker_result(state_root: &Path, state: &mut WizardState) {
    let Some(worker) = state.worker.take() else {
        return;
    };

    let outcome = match worker.result_rx.try_recv() {
        Ok(outcome) => outcome,
        Err(mpsc::TryRecvError::Empty) => {
            state.worker = Some(worker);
            return;
        }
        Err(mpsc::TryRecvError::Disconnected) => {
            state.say("system", "background worker disconnected unexpectedly");
            return;
        }
    };

    match outcome {
        WorkerOutcome::FollowUp(Ok(reply)) => {
            if is_no_further_questions(&reply) {
                state.session.follow_up_question = None;
                state.say(
                    "system",
                    "all needed information is present; type /next to design the instruction prompt",
                );
            } else {
                state.session.follow_up_question = Some(reply.clone());
                state.say("assistant", reply);
            }
            state.session.touch();
            persist(state_root, state);
        }
        WorkerOutcome::FollowUp(Err(err)) => {
            state.say(
                "system",
                format!("follow-up check failed: {err}; type /next to continue anyway"),
            );
        }
        WorkerOutcome::Prompt(Ok(prompt)) => {
            state.session.instruction_prompt = prompt;
            state.session.touch();
            persist(state_root, state);
            state.say(
                "system",
                format!(
                    "instruction prompt ready ({} chars); /next continues to script generation",
                    state.session.instruction_prompt.len()
                ),
            );
        }
        WorkerOutcome::Prompt(Err(err)) => {
            state.say("system", format!("prompt design failed: {err}"));
        }
        WorkerOutcome::Script(Ok(output)) => {
            state.session.generated_output = output;
            state.session.touch();
            persist(state_root, state);
            let artifact = state.session.artifact();
            if !artifact.instructions.is_empty() {
                state.say("assistant", artifact.instructions.clone());
            }
            state.say(
                "system",
                format!(
                    "script generated (fingerprint {}); /next then /launch to run it",
                    script_fingerprint(&artifact.script_body)
                ),
            );
        }
        WorkerOutcome::Script(Err(err)) => {
            state.say("system", format!("script generation failed: {err}"));
        }
        WorkerOutcome::Launch(Ok(retry_session)) => {
            let _ = append_session_log_line(
                state_root,
                &format!(
                    "launch outcome={} attempts={}/{} script={}",
                    retry_session.outcome.as_str(),
                    retry_session.attempts_used,
                    retry_session.max_attempts,
                    script_fingerprint(&retry_session.final_script),
                ),
            );
            for line in crate::app::command_handlers::render_retry_report(&retry_session).lines() {
                state.say("system", line.to_string());
            }
            if !retry_session.succeeded() {
                state.say(
                    "system",
                    "send feedback text to revise the instruction prompt, or /launch to retry",
                );
            }
        }
        WorkerOutcome::Launch(Err(err)) => {
            state.say("system", format!("launch failed: {err}"));
        }
        WorkerOutcome::Revision(Ok(revised)) => {
            state.session.revised_prompt = revised;
            state.session.touch();
            persist(state_root, state);
            state.say(
                "system",
                "revised instruction prompt ready; /apply adopts it and returns to script generation",
            );
        }
        WorkerOutcome::Revision(Err(err)) => {
            state.say("system", format!("prompt revision failed: {err}"));
        }
    }
}

fn persist(state_root: &Path, state: &mut WizardState) {
    if let Err(err) = save_session(state_root, &state.session) {
        state.say("system", format!("failed to save session: {err}"));
    }
}

fn draw_wizard_ui(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &WizardState,
) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(8),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(frame.area());

            let stage_line = ALL_STAGES
                .iter()
                .map(|stage| {
                    if *stage == state.session.stage {
                        format!("[{}]", stage.title())
                    } else {
                        stage.title().to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" > ");
            let header = Paragraph::new(vec![Line::raw("AppSeed Wizard"), Line::raw(stage_line)])
                .block(
                    Block::default()
                        .title("Session")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                );
            frame.render_widget(header, sections[0]);

            let visible_height = sections[1].height.saturating_sub(2) as usize;
            let skip = state.transcript.len().saturating_sub(visible_height);
            let transcript = state
                .transcript
                .iter()
                .skip(skip)
                .map(|line| {
                    let text = format!("{}> {}", line.speaker, line.text);
                    match line.speaker {
                        "assistant" => Line::styled(text, Style::default().fg(Color::Green)),
                        "you" => Line::styled(text, Style::default().fg(Color::Yellow)),
                        _ => Line::styled(text, Style::default().fg(Color::Gray)),
                    }
                })
                .collect::<Vec<_>>();
            let transcript_widget = Paragraph::new(transcript)
                .block(Block::default().title("Transcript").borders(Borders::ALL))
                .wrap(Wrap { trim: false });
            frame.render_widget(transcript_widget, sections[1]);

            let status_widget = Paragraph::new(state.status_line()).block(
                Block::default()
                    .title("Status")
                    .borders(Borders::ALL)
                    .border_style(if state.worker.is_some() {
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    }),
            );
            frame.render_widget(status_widget, sections[2]);

            let input_widget =
                Paragraph::new(format!("you> {}{}", state.input, state.cursor_suffix()))
                    .block(Block::default().title("Input").borders(Borders::ALL));
            frame.render_widget(input_widget, sections[3]);
        })
        .map_err(|e| format!("failed to render wizard UI: {e}"))?;

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, String> {
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| format!("failed to initialize terminal: {e}"))
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), String> {
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .map_err(|e| format!("failed to leave alternate screen: {e}"))?;
    terminal
        .show_cursor()
        .map_err(|e| format!("failed to restore cursor: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wizard_exit_commands_are_case_insensitive() {
        assert!(is_wizard_exit_command("/exit"));
        assert!(is_wizard_exit_command("EXIT"));
        assert!(is_wizard_exit_command("Quit"));
        assert!(!is_wizard_exit_command("continue"));
    }

    #[test]
    fn spinner_frame_cycles_across_ascii_frames() {
        let mut state = WizardState::new(WorkflowSession::new());
        assert_eq!(state.spinner_frame(), PROCESSING_FRAMES[0]);
        state.spinner_index = 3;
        assert_eq!(state.spinner_frame(), PROCESSING_FRAMES[3]);
    }

    #[test]
    fn cursor_blink_toggles_visibility_after_interval() {
        let mut state = WizardState::new(WorkflowSession::new());
        assert_eq!(state.cursor_suffix(), "█");

        state.last_cursor_tick = Instant::now() - CURSOR_BLINK_INTERVAL;
        state.advance_cursor_blink_if_needed();
        assert_eq!(state.cursor_suffix(), " ");
    }
}
