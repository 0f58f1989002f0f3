use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "sdn-bench-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_with_stdin(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sdn_bench"))
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn sdn_bench");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait sdn_bench")
}

fn no_results_written(dir: &Path) -> bool {
    fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .all(|e| !e.file_name().to_string_lossy().ends_with("_results.json"))
}

#[test]
fn invalid_menu_choice_exits_without_output() {
    let dir = unique_temp_dir("cli-invalid-menu");
    let out_dir = dir.to_str().unwrap();

    let output = run_with_stdin(&dir, &["--out-dir", out_dir], "7\n");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains("1. Single Topology"), "stdout={stdout}");
    assert!(stdout.contains("2. Linear Topology"), "stdout={stdout}");
    assert!(stdout.contains("3. Tree Topology"), "stdout={stdout}");
    assert!(stdout.contains("Invalid choice"), "stdout={stdout}");
    assert!(no_results_written(&dir));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_stdin_is_an_invalid_choice() {
    let dir = unique_temp_dir("cli-empty-menu");
    let output = run_with_stdin(&dir, &[], "");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Invalid choice"));
    assert!(no_results_written(&dir));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_topology_flag_exits_without_output() {
    let dir = unique_temp_dir("cli-invalid-flag");
    let output = run_with_stdin(&dir, &["--topology", "ring"], "");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Invalid choice"));
    assert!(no_results_written(&dir));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn describe_prints_tree_topology_json() {
    let dir = unique_temp_dir("cli-describe");
    let output = run_with_stdin(&dir, &["--topology", "tree", "--describe"], "");
    assert!(
        output.status.success(),
        "sdn_bench failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: Value = serde_json::from_slice(&output.stdout).expect("describe output is JSON");
    assert_eq!(v.get("name").and_then(|n| n.as_str()), Some("Tree Topology"));
    let nodes = v.get("nodes").and_then(|n| n.as_array()).expect("nodes");
    let count = |kind: &str| {
        nodes
            .iter()
            .filter(|n| n.get("kind").and_then(|k| k.as_str()) == Some(kind))
            .count()
    };
    assert_eq!(count("host"), 16);
    assert_eq!(count("switch"), 5);
    let links = v.get("links").and_then(|l| l.as_array()).expect("links");
    assert_eq!(links.len(), 20);
    assert!(no_results_written(&dir));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn describe_single_respects_host_count_from_menu() {
    let dir = unique_temp_dir("cli-describe-menu");
    let output = run_with_stdin(&dir, &["--describe", "--hosts", "16"], "1\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout.find('{').expect("json in stdout");
    let v: Value = serde_json::from_str(&stdout[json_start..]).expect("parse json");
    assert_eq!(v["name"], "Single Topology");
    assert_eq!(v["links"].as_array().map(|l| l.len()), Some(16));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = unique_temp_dir("cli-config");
    let cfg = dir.join("run.json");
    fs::write(&cfg, r#"{ "packet_counts": [] }"#).expect("write config");

    let output = run_with_stdin(
        &dir,
        &["--config", cfg.to_str().unwrap(), "--topology", "single"],
        "",
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("packet_counts"),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let _ = fs::remove_dir_all(&dir);
}
