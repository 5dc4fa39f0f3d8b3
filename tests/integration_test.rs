use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_expiry-labels"))
}

fn output_dir(name: &str) -> PathBuf {
    Path::new("tests/output").join(name)
}

fn setup(name: &str) -> PathBuf {
    let dir = output_dir(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("Failed to create output directory");
    dir
}

#[test]
fn test_basic_sheet() {
    let dir = setup("basic");

    let output = cargo_bin()
        .args(["-c", "25", "-d", "2024-01-20", "-o"])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);

    let path = dir.join("Labels_25_20-01-2024.pdf");
    assert!(path.exists(), "PDF file was not created");

    let metadata = fs::metadata(&path).expect("Failed to get file metadata");
    assert!(metadata.len() > 1000, "PDF file is too small, likely empty or corrupt");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Labels: 25 on 2 page(s)"), "stdout: {}", stdout);
    assert!(stdout.contains("BEST BEFORE: 06/03/2024"), "stdout: {}", stdout);
}

#[test]
fn test_json_summary() {
    let dir = setup("json");

    let output = cargo_bin()
        .args(["-c", "20", "-d", "2024-01-31", "--json", "-o"])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(summary["label_count"], 20);
    assert_eq!(summary["pages"], 1);
    assert_eq!(summary["labels_per_page"], 20);
    assert_eq!(summary["mfg_date"], "31/01/2024");
    assert_eq!(summary["exp_date"], "17/03/2024");
    assert!(dir.join("Labels_20_31-01-2024.pdf").exists());
}

#[test]
fn test_zero_count_rejected() {
    let dir = setup("zero");

    let output = cargo_bin()
        .args(["-c", "0", "-o"])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for zero labels");
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn test_non_numeric_count_rejected() {
    let output = cargo_bin()
        .args(["-c", "lots", "-o", "tests/output/should-not-exist"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for non-numeric count");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("valid number of labels"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_date_format() {
    let output = cargo_bin()
        .args(["-c", "4", "-d", "not-a-date", "-o", "tests/output/should-not-exist"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed for invalid date");
}

#[cfg(unix)]
#[test]
fn test_print_with_custom_command() {
    let dir = setup("print-ok");

    let output = cargo_bin()
        .args([
            "-c", "3",
            "-d", "2024-02-01",
            "--print",
            "--print-command", "true",
            "--release-delay-ms", "0",
            "-o",
        ])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sent to printer"), "stdout: {}", stdout);
}

#[cfg(unix)]
#[test]
fn test_print_failure_points_to_download() {
    let dir = setup("print-fail");

    let output = cargo_bin()
        .args([
            "-c", "3",
            "-d", "2024-02-02",
            "--print",
            "--print-command", "false",
            "-o",
        ])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should have failed when printing fails");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please use the downloaded PDF to print"), "stderr: {}", stderr);
    assert!(dir.join("Labels_3_02-02-2024.pdf").exists());
}

#[test]
fn test_interactive_session() {
    let dir = setup("interactive");

    let mut child = cargo_bin()
        .args(["-d", "2024-01-20", "-o"])
        .arg(&dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"print\ncount 41\nprint\ngenerate\nstatus\nquit\n")
        .expect("Failed to write commands");

    let output = child.wait_with_output().expect("Failed to wait for command");
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Manufacture date: 20/01/2024"), "stdout: {}", stdout);
    assert!(stdout.contains("Error: Please enter a valid number of labels."), "stdout: {}", stdout);
    assert!(stdout.contains("Please generate the PDF first."), "stdout: {}", stdout);
    assert!(stdout.contains("41 labels created using 3 page(s)."), "stdout: {}", stdout);
    assert!(stdout.contains("Generate: enabled, Print: enabled"), "stdout: {}", stdout);
    assert!(dir.join("Labels_41_20-01-2024.pdf").exists());
}
