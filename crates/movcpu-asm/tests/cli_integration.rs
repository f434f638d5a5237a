//! Integration tests for the movcpu CLI.

use movcpu_asm as _;
use movcpu_core as _;
use rstest as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use thiserror as _;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_movcpu"))
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("failed to run movcpu")
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run movcpu");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn run_prints_default_dumps() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "load.s", "movb (%rax,%rcx), %rdx\n");

    let result = run(&["run", source.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&result.stdout);

    assert!(result.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("      +0    +1    +2    +3    +4    +5    +6    +7    \n"));
    assert!(stdout.contains("0x08: 0x95  0x48  0x78  0xC3  0x3F  0x97  0x86  0x39  \n"));
    assert!(stdout.contains("0x28: "));
    assert!(!stdout.contains("0x30: "));
    assert!(stdout.contains(
        "%rax:  0000000000000008\n%rcx:  0000000000000003\n%rdx:  00000000000000C3\n"
    ));
    assert!(stdout.contains("Executed 1 instruction(s), skipped 0 line(s)"));
}

#[test]
fn run_demo_program() {
    let demo = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("programs/demo.s");

    let result = run(&["run", demo.to_str().unwrap(), "--regs", "0x1A"]);
    let stdout = String::from_utf8_lossy(&result.stdout);

    assert!(result.status.success(), "stdout: {stdout}");
    assert!(stdout.contains(
        "%rbx:  00000000FFFFBEEF\n%rdx:  00000000000000C3\n%rsi:  00000000000000C3\n"
    ));
}

#[test]
fn run_reports_skipped_lines_and_continues() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "skips.s",
        "foo %rax\nmovq $7, %rbx\nmovb $300, %rbx\nmovq %rbx\n",
    );

    let result = run(&["run", source.to_str().unwrap(), "--regs", "0x2"]);
    let stdout = String::from_utf8_lossy(&result.stdout);
    let stderr = String::from_utf8_lossy(&result.stderr);

    assert!(result.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("skips.s:1:1: error: unknown instruction: foo"));
    assert!(stderr.contains("skips.s:3:6: error: immediate 300 does not fit in 1 bytes"));
    assert!(stderr.contains("skips.s:4:10: error: expected 2 operands, found 1"));
    assert!(stdout.contains("%rbx:  0000000000000007\n"));
    assert!(stdout.contains("Executed 1 instruction(s), skipped 3 line(s)"));
}

#[test]
fn fatal_fault_stops_run_with_failure() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "fatal.s",
        "movq %rax, 4095\nmovq $1, %rbx\n",
    );

    let result = run(&["run", source.to_str().unwrap(), "--regs", "0x2"]);
    let stdout = String::from_utf8_lossy(&result.stdout);
    let stderr = String::from_utf8_lossy(&result.stderr);

    assert!(!result.status.success());
    assert!(stderr.contains("fatal.s:1:12: error: memory access of 8 bytes at 0xfff is out of bounds"));
    assert!(stdout.contains("%rbx:  0000000000000000\n"));
}

#[test]
fn scale_policy_is_selectable() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "scale.s",
        "movb 2(%rcx,%rax,3), %rdx\n",
    );

    let strict = run(&["run", source.to_str().unwrap(), "--set", "rax=3", "--set", "rcx=0x10"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("invalid index scale: 3"));

    let relaxed = run(&[
        "run",
        source.to_str().unwrap(),
        "--set",
        "rax=3",
        "--set",
        "rcx=0x10",
        "--any-scale",
        "--regs",
        "0x8",
    ]);
    assert!(relaxed.status.success());
    assert!(String::from_utf8_lossy(&relaxed.stdout).contains("%rdx:  0000000000000034\n"));
}

#[test]
fn trace_flag_writes_events_to_stderr() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "trace.s", "movw $0x1234, 16\n");

    let result = run(&["run", source.to_str().unwrap(), "--trace", "--blank-memory"]);
    let stdout = String::from_utf8_lossy(&result.stdout);
    let stderr = String::from_utf8_lossy(&result.stderr);

    assert!(result.status.success());
    assert!(stderr.contains("trace: start movw (2 bytes)"));
    assert!(stderr.contains("trace: store 2 bytes at 0x10 = 0x1234"));
    assert!(stdout.contains("0x10: 0x34  0x12  0x00"));
    assert!(stdout.contains("0x00: 0x00  0x00"));
}

#[test]
fn run_reads_stdin_when_input_is_dash() {
    let result = run_with_stdin(&["run", "-", "--regs", "0x1"], "movq $0x99, %rax\n");
    let stdout = String::from_utf8_lossy(&result.stdout);

    assert!(result.status.success());
    assert!(stdout.contains("%rax:  0000000000000099\n"));
}

#[test]
fn interactive_mode_dumps_after_each_line() {
    let result = run_with_stdin(
        &["interactive", "--regs", "0x1"],
        "movq $1, %rax\nnope\nmovq $2, %rax\n",
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    let stderr = String::from_utf8_lossy(&result.stderr);

    assert!(result.status.success(), "stderr: {stderr}");
    assert!(stdout.contains("%rax:  0000000000000001\n%rax:  0000000000000002\n"));
    assert!(stderr.contains("<stdin>:2:1: error: unknown instruction: nope"));
}

#[test]
fn missing_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("absent.s");

    let result = run(&["run", missing.to_str().unwrap()]);

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("failed to read"));
}

#[test]
fn oversized_memory_is_rejected_before_running() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "big.s", "movq $1, %rax\n");

    let result = run(&[
        "run",
        source.to_str().unwrap(),
        "--memory-bytes",
        "18446744073709551615",
    ]);
    let stderr = String::from_utf8_lossy(&result.stderr);

    assert_eq!(result.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("invalid memory size: 18446744073709551615"));
    assert!(!stderr.contains("panicked"));
}

#[test]
fn help_shows_usage() {
    let result = run(&["--help"]);

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(result.status.success());
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("interactive"));
}

#[test]
fn unknown_command_fails() {
    let result = run(&["unknown"]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("unknown command"));
}
