use crate::shared::ids::unique_token;
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const SCRIPT_FILE_NAME: &str = "bootstrap.sh";
pub const ATTEMPT_DIR_PREFIX: &str = "attempt-";
pub const LAUNCH_FAILURE_CODE: i32 = -1;

const ATTEMPT_DIR_MAX_ALLOCATION_ATTEMPTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write script file {path}: {source}")]
    WriteScript {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to set script permissions on {path}: {source}")]
    SetPermissions {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to allocate a unique attempt directory under {path}: {reason}")]
    AllocateDir { path: String, reason: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub directory: PathBuf,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

pub fn resolve_shell_binary() -> String {
    std::env::var("APPSEED_SHELL_BIN").unwrap_or_else(|_| "sh".to_string())
}

pub fn run_script(
    script_text: &str,
    base_directory: &Path,
    timeout: Option<Duration>,
) -> Result<ExecutionResult, SandboxError> {
    run_script_with_shell(script_text, base_directory, timeout, &resolve_shell_binary())
}

pub fn run_script_with_shell(
    script_text: &str,
    base_directory: &Path,
    timeout: Option<Duration>,
    shell_binary: &str,
) -> Result<ExecutionResult, SandboxError> {
    fs::create_dir_all(base_directory).map_err(|source| SandboxError::CreateDir {
        path: base_directory.display().to_string(),
        source,
    })?;
    let attempt_dir = allocate_attempt_dir(base_directory)?;

    let script_path = attempt_dir.join(SCRIPT_FILE_NAME);
    fs::write(&script_path, script_text).map_err(|source| SandboxError::WriteScript {
        path: script_path.display().to_string(),
        source,
    })?;
    set_owner_executable(&script_path)?;

    let mut command = Command::new(shell_binary);
    command
        .arg(SCRIPT_FILE_NAME)
        .current_dir(&attempt_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            return Ok(ExecutionResult {
                exit_code: LAUNCH_FAILURE_CODE,
                stdout: String::new(),
                stderr: format!("failed to start script process via `{shell_binary}`: {err}"),
                directory: attempt_dir,
            })
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_error(&attempt_dir, std::io::Error::other("missing stdout pipe")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_error(&attempt_dir, std::io::Error::other("missing stderr pipe")))?;

    let stdout_reader = thread::spawn(move || {
        let mut buf = String::new();
        let mut reader = BufReader::new(stdout);
        let _ = reader.read_to_string(&mut buf);
        buf
    });
    let stderr_reader = thread::spawn(move || {
        let mut buf = String::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_string(&mut buf);
        buf
    });

    let mut timed_out = false;
    let exit_status = match timeout {
        None => child.wait().map_err(|err| io_error(&attempt_dir, err))?,
        Some(limit) => {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {
                        if start.elapsed() > limit {
                            timed_out = true;
                            let _ = child.kill();
                            break child.wait().map_err(|err| io_error(&attempt_dir, err))?;
                        }
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(err) => return Err(io_error(&attempt_dir, err)),
                }
            }
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let mut stderr = stderr_reader.join().unwrap_or_default();
    let mut exit_code = exit_status.code().unwrap_or(LAUNCH_FAILURE_CODE);
    if timed_out {
        exit_code = LAUNCH_FAILURE_CODE;
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!(
            "script execution timed out after {}ms",
            timeout.map(|t| t.as_millis()).unwrap_or_default()
        ));
    }

    Ok(ExecutionResult {
        exit_code,
        stdout,
        stderr,
        directory: attempt_dir,
    })
}

pub fn remove_workdir(directory: &Path) -> std::io::Result<()> {
    if directory.exists() {
        fs::remove_dir_all(directory)
    } else {
        Ok(())
    }
}

fn allocate_attempt_dir(base_directory: &Path) -> Result<PathBuf, SandboxError> {
    for _ in 0..ATTEMPT_DIR_MAX_ALLOCATION_ATTEMPTS {
        let token = unique_token(now_nanos()).map_err(|reason| SandboxError::AllocateDir {
            path: base_directory.display().to_string(),
            reason,
        })?;
        let candidate = base_directory.join(format!("{ATTEMPT_DIR_PREFIX}{token}"));
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(SandboxError::CreateDir {
                    path: candidate.display().to_string(),
                    source,
                })
            }
        }
    }
    Err(SandboxError::AllocateDir {
        path: base_directory.display().to_string(),
        reason: format!(
            "no unique directory name after {ATTEMPT_DIR_MAX_ALLOCATION_ATTEMPTS} attempts"
        ),
    })
}

#[cfg(unix)]
fn set_owner_executable(path: &Path) -> Result<(), SandboxError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .map_err(|source| SandboxError::SetPermissions {
            path: path.display().to_string(),
            source,
        })?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(|source| SandboxError::SetPermissions {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(not(unix))]
fn set_owner_executable(_path: &Path) -> Result<(), SandboxError> {
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> SandboxError {
    SandboxError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn now_nanos() -> i128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i128)
        .unwrap_or(0)
}
