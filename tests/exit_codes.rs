// Exit status and console output of the binary
//
// None of these reach device creation, so they run without a GPU.

use std::{
    path::PathBuf,
    process::{Command, Output},
};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gpu-compute-image"))
        .args(args)
        .env_remove("GPU_COMPUTE_FILE_PATH")
        .env("RUST_LOG", "off")
        .output()
        .expect("binary should start")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gpu-compute-image-exit-{name}-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn missing_shader_prints_message_and_exits_1() {
    let dir = scratch_dir("missing");
    let shader = dir.join("does-not-exist.spv");
    let output = run(&["--shader", shader.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.lines().any(|line| line == "Error : No shader loaded."),
        "stdout was {stdout:?}"
    );
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn invalid_shader_prints_message_and_exits_1() {
    let dir = scratch_dir("invalid");
    let shader = dir.join("comp.spv");
    std::fs::write(&shader, b"not spir-v").unwrap();
    let output = run(&["--shader", shader.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Error : No shader loaded."));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn api_dump_without_debug_is_a_usage_error() {
    let output = run(&["-a"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("No shader loaded"));
}

#[test]
fn malformed_flags_are_usage_errors() {
    assert_eq!(run(&["-w", "wide"]).status.code(), Some(2));
    assert_eq!(run(&["-s", "1024"]).status.code(), Some(2));
    assert_eq!(run(&["--no-such-flag"]).status.code(), Some(2));
}

#[test]
fn invalid_values_are_usage_errors() {
    assert_eq!(run(&["-w", "0"]).status.code(), Some(2));
    assert_eq!(run(&["-s", "70000x70000"]).status.code(), Some(2));
}

#[test]
fn cpu_backend_writes_the_image_and_exits_0() {
    let dir = scratch_dir("cpu");
    let path = dir.join("out.png");
    let output = run(&[
        "--backend",
        "cpu",
        "-s",
        "16x8",
        "-o",
        path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (16, 8));
    std::fs::remove_dir_all(dir).ok();
}
