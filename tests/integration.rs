use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn docsim_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docsim");
    path
}

fn setup_test_env(provider: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("cat1.txt"), "The cat sat on the mat.").unwrap();
    fs::write(docs_dir.join("cat2.txt"), "A cat sat on a mat.").unwrap();
    fs::write(
        docs_dir.join("physics.txt"),
        "Quantum entanglement in superconducting qubits.",
    )
    .unwrap();
    fs::write(
        docs_dir.join("kitchen.txt"),
        "The chef prepared a delicious lasagna.",
    )
    .unwrap();
    fs::write(docs_dir.join("empty.txt"), "").unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[server]
bind = "127.0.0.1:0"

[embedding]
provider = "{}"
dims = 256
"#,
        provider
    );
    let config_path = config_dir.join("docsim.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn doc(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("docs")
        .join(name)
        .display()
        .to_string()
}

fn run_docsim(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docsim_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docsim binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_compare_near_identical() {
    let (_tmp, config_path) = setup_test_env("hashing");
    let a = doc(&config_path, "cat1.txt");
    let b = doc(&config_path, "cat2.txt");

    let (stdout, stderr, success) = run_docsim(&config_path, &["compare", &a, &b]);
    assert!(success, "compare failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("similarity: 100.00"), "stdout={}", stdout);
    assert!(stdout.contains("chunks: 1 x 1 (1 similar of 1 pairs)"));
}

#[test]
fn test_compare_unrelated() {
    let (_tmp, config_path) = setup_test_env("hashing");
    let a = doc(&config_path, "physics.txt");
    let b = doc(&config_path, "kitchen.txt");

    let (stdout, stderr, success) = run_docsim(&config_path, &["compare", &a, &b]);
    assert!(success, "compare failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("similarity: 0.00"), "stdout={}", stdout);
}

#[test]
fn test_compare_json_matches_http_shape() {
    let (_tmp, config_path) = setup_test_env("hashing");
    let a = doc(&config_path, "cat1.txt");
    let b = doc(&config_path, "cat2.txt");

    let (stdout, stderr, success) = run_docsim(&config_path, &["compare", &a, &b, "--json"]);
    assert!(success, "compare failed: stdout={}, stderr={}", stdout, stderr);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["similarityScore"], 100.0);
    assert_eq!(json["totalPairs"], 1);
}

#[test]
fn test_compare_is_commutative() {
    let (_tmp, config_path) = setup_test_env("hashing");
    let a = doc(&config_path, "cat1.txt");
    let b = doc(&config_path, "kitchen.txt");

    let (ab, _, ok1) = run_docsim(&config_path, &["compare", &a, &b]);
    let (ba, _, ok2) = run_docsim(&config_path, &["compare", &b, &a]);
    assert!(ok1 && ok2);
    assert_eq!(ab, ba);
}

#[test]
fn test_compare_empty_document() {
    let (_tmp, config_path) = setup_test_env("hashing");
    let a = doc(&config_path, "empty.txt");
    let b = doc(&config_path, "cat1.txt");

    let (stdout, stderr, success) = run_docsim(&config_path, &["compare", &a, &b]);
    assert!(success, "compare failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("similarity: 0.00"));
}

#[test]
fn test_compare_errors_when_disabled() {
    let (_tmp, config_path) = setup_test_env("disabled");
    let a = doc(&config_path, "cat1.txt");
    let b = doc(&config_path, "cat2.txt");

    let (_, stderr, success) = run_docsim(&config_path, &["compare", &a, &b]);
    assert!(!success, "compare should fail with embeddings disabled");
    assert!(stderr.contains("disabled"), "stderr={}", stderr);
}

#[test]
fn test_compare_missing_file() {
    let (_tmp, config_path) = setup_test_env("hashing");
    let a = doc(&config_path, "cat1.txt");

    let (_, stderr, success) = run_docsim(&config_path, &["compare", &a, "/nonexistent/doc.txt"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read document"));
}

#[test]
fn test_normalize() {
    let (_tmp, config_path) = setup_test_env("disabled");
    let a = doc(&config_path, "physics.txt");

    let (stdout, stderr, success) = run_docsim(&config_path, &["normalize", &a]);
    assert!(success, "normalize failed: stdout={}, stderr={}", stdout, stderr);
    assert_eq!(stdout.trim(), "quantum entanglement superconducting qubit");
}

#[test]
fn test_invalid_config_rejected() {
    let (_tmp, config_path) = setup_test_env("word2vec");
    let a = doc(&config_path, "cat1.txt");

    let (_, stderr, success) = run_docsim(&config_path, &["normalize", &a]);
    assert!(!success);
    assert!(stderr.contains("Unknown embedding provider"));
}
