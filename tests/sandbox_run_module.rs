use appseed::sandbox::{
    remove_workdir, run_script, run_script_with_shell, ATTEMPT_DIR_PREFIX, LAUNCH_FAILURE_CODE,
    SCRIPT_FILE_NAME,
};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn successful_run_captures_stdout_and_keeps_the_directory() {
    let base = tempdir().expect("tempdir");

    let result = run_script("echo hello from seed\n", base.path(), None).expect("run");

    assert_eq!(result.exit_code, 0);
    assert!(result.succeeded());
    assert_eq!(result.stdout, "hello from seed\n");
    assert_eq!(result.stderr, "");
    assert!(result.directory.is_dir());
    let name = result
        .directory
        .file_name()
        .and_then(|n| n.to_str())
        .expect("dir name");
    assert!(name.starts_with(ATTEMPT_DIR_PREFIX));
    assert!(result.directory.join(SCRIPT_FILE_NAME).is_file());
}

#[cfg(unix)]
#[test]
fn script_file_is_owner_executable() {
    use std::os::unix::fs::PermissionsExt;

    let base = tempdir().expect("tempdir");
    let result = run_script("true\n", base.path(), None).expect("run");
    let mode = std::fs::metadata(result.directory.join(SCRIPT_FILE_NAME))
        .expect("metadata")
        .permissions()
        .mode();
    assert_ne!(mode & 0o100, 0, "owner execute bit must be set");
}

#[test]
fn failing_run_reports_exit_code_and_stderr() {
    let base = tempdir().expect("tempdir");

    let result = run_script("echo oops >&2\nexit 3\n", base.path(), None).expect("run");

    assert_eq!(result.exit_code, 3);
    assert!(!result.succeeded());
    assert!(result.stderr.contains("oops"));

    remove_workdir(&result.directory).expect("cleanup");
    assert!(!result.directory.exists());
}

#[test]
fn runs_use_unique_directories() {
    let base = tempdir().expect("tempdir");

    let first = run_script("true\n", base.path(), None).expect("first run");
    let second = run_script("true\n", base.path(), None).expect("second run");

    assert_ne!(first.directory, second.directory);
}

#[test]
fn script_runs_with_the_attempt_directory_as_cwd() {
    let base = tempdir().expect("tempdir");

    let result = run_script("pwd\n", base.path(), None).expect("run");

    assert_eq!(result.exit_code, 0);
    let reported = result.stdout.trim();
    let canonical_attempt = result.directory.canonicalize().expect("canonical attempt dir");
    assert_eq!(
        std::path::Path::new(reported)
            .canonicalize()
            .expect("canonical reported dir"),
        canonical_attempt
    );
}

#[test]
fn missing_interpreter_is_a_launch_failure_not_an_error() {
    let base = tempdir().expect("tempdir");

    let result = run_script_with_shell("true\n", base.path(), None, "/nonexistent/appseed-shell")
        .expect("launch failure is in-band");

    assert_eq!(result.exit_code, LAUNCH_FAILURE_CODE);
    assert!(result.stdout.is_empty());
    assert!(result.stderr.contains("failed to start script process"));
    assert!(result.directory.is_dir(), "caller decides about cleanup");
}

#[test]
fn timeout_terminates_a_long_running_script() {
    let base = tempdir().expect("tempdir");

    let result = run_script(
        "sleep 2\n",
        base.path(),
        Some(Duration::from_millis(200)),
    )
    .expect("run");

    assert_eq!(result.exit_code, LAUNCH_FAILURE_CODE);
    assert!(result.stderr.contains("timed out"));
}

#[test]
fn remove_workdir_tolerates_a_missing_directory() {
    let base = tempdir().expect("tempdir");
    let gone = base.path().join("attempt-never-created");
    remove_workdir(&gone).expect("missing directory is fine");
}
