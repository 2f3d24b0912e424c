//! memdict E2E 测试
//!
//! 以子进程方式运行编译好的 memdict，覆盖两个子命令与错误处理

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ============== 基础设施 ==============

fn memdict() -> Command {
    Command::new(env!("CARGO_BIN_EXE_memdict"))
}

fn run(args: &[&str]) -> Output {
    memdict()
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to spawn memdict")
}

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    path
}

// ============== 测试 ==============

#[test]
fn test_help_lists_commands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("random-graph"));
    assert!(stdout.contains("embed"));
}

#[test]
fn test_unknown_command_fails() {
    let output = run(&["train"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_settings_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let output = run(&["embed", "--setting-file", missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Settings error"), "{}", stderr);
}

#[test]
fn test_random_graph_then_embed() {
    let dir = TempDir::new().unwrap();
    let graphs_dir = dir.path().join("graphs");
    let out_dir = dir.path().join("out");

    let rg = write_json(
        dir.path(),
        "rg.json",
        serde_json::json!({
            "num_nodes": 5,
            "connection_probs": [0.3],
            "self_connection": "allow",
            "outdir": graphs_dir,
            "suffix": "_e2e",
            "seed": 1
        }),
    );
    let output = run(&["random-graph", "-f", rg.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let graph = graphs_dir.join("n5_p0.3_ditrue_scallow_e2e");
    assert!(graph.join("adjacency_mat.json").is_file());

    let embed = write_json(
        dir.path(),
        "embed.json",
        serde_json::json!({
            "num_dims": 8,
            "graphs_dir": graphs_dir,
            "lrs": [1.0],
            "out_dir": out_dir,
            "retrieval": "threshold",
            "seed": 2
        }),
    );
    let output = run(&["-v", "embed", "-f", embed.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("accuracy: "));

    let result = out_dir
        .join("dtcossim_lr1_thres0.8")
        .join("n5_p0.3_ditrue_scallow_e2e");
    for file in ["metrics.txt", "memory_vectors.json", "rec_graph.dot", "params.json"] {
        assert!(result.join(file).is_file(), "missing {}", file);
    }
    assert!(out_dir.join("summary.json").is_file());
}
