//! End-to-end sessions against the `bangsh` binary with piped stdin.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn session(input: &str) -> Output {
    session_bytes(input.as_bytes())
}

fn session_bytes(input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_bangsh"))
        .env("TERM", "xterm")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start bangsh");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input)
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_exit_with_argument_then_exit() {
    let output = session("exit extra\nexit\nhelp\n");
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("ERROR: More arguments were provided than expected."));
    // `help` after `exit` is never run.
    assert!(!stdout.contains("'pwd' is a builtin command"));
}

#[test]
fn test_end_of_input_exits_cleanly() {
    let output = session("help cd\n");
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("'cd' is a builtin command for changing"));
}

#[test]
fn test_cd_dash_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let target = temp.path().canonicalize().unwrap();
    let start = std::env::current_dir().unwrap();

    let output = session(&format!("pwd\ncd {}\npwd\ncd -\npwd\nexit\n", target.display()));
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let start_line = format!("{}\n", start.display());
    let target_line = format!("{}\n", target.display());

    let first = stdout.find(&start_line).expect("initial pwd");
    let second = stdout[first + 1..].find(&target_line).expect("pwd after cd") + first + 1;
    let back = stdout[second + 1..].find(&start_line).expect("cd - echoes target");
    assert!(stdout[second + 1 + back + 1..].contains(&start_line), "pwd after cd -");
}

#[test]
#[cfg(unix)]
fn test_external_command_and_repeat() {
    let output = session("echo hello\n!!\nhistory\n");
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    // Every "echo hello" line (the expansion and two history rows) also ends in "hello".
    let runs = stdout.matches("hello\n").count() - stdout.matches("echo hello\n").count();
    assert_eq!(runs, 2, "{stdout}");
    assert_eq!(stdout.matches("echo hello\n").count(), 3);
    assert!(stdout.contains("2\thistory\n1\techo hello\n0\techo hello\n"));
}

#[test]
fn test_missing_program_goes_to_stderr() {
    let output = session("no-such-program-for-bangsh\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: Unable to execute 'no-such-program-for-bangsh'"));
    assert!(!stdout_of(&output).contains("Unable to execute"));
}

#[test]
fn test_zero_history_size_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_bangsh"))
        .args(["--history-size", "0"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--history-size"));
}

#[test]
fn test_invalid_utf8_line_is_skipped() {
    let output = session_bytes(b"echo \xff\nhelp cd\nexit\n");
    assert!(output.status.success(), "{output:?}");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("ERROR: Input is not valid UTF-8 and was ignored.\n"));
    assert!(stdout.contains("'cd' is a builtin command for changing"));
}

#[test]
fn test_prompt_shows_working_directory() {
    let cwd = std::env::current_dir().unwrap();
    let output = session("help exit\n");
    let stdout = stdout_of(&output);
    let prompt = format!("{}$ ", cwd.display());
    // One prompt per read, the last one answered by end of input.
    assert_eq!(stdout.matches(&prompt).count(), 2, "{stdout}");
    assert!(stdout.starts_with(&prompt));
}

#[test]
#[cfg(target_os = "linux")]
fn test_fatal_read_error_names_cause_once() {
    // Reading from a directory fails with EISDIR.
    let dir = std::fs::File::open("/").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_bangsh"))
        .env("TERM", "xterm")
        .env_remove("RUST_LOG")
        .stdin(Stdio::from(dir))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: Unable to read command: "), "{stderr}");
    assert_eq!(stderr.matches("Is a directory").count(), 1, "{stderr}");
}
