use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir()
            .join(format!("argtree_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn argtree(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argtree"))
        .args(args)
        .output()
        .expect("failed to run argtree")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Grammar with a persistent flag, a value flag and a sub-command.
fn write_yaml_grammar(dir: &TempDir) -> PathBuf {
    let yaml = r#"prog:
  flags:
    map:
      verbose:
        nvalue: 0
        persist: true
      output:
        nvalue: 1
        value_names: [file]
  commands:
    build:
      nvalue: one-or-more
      value_names: [target]
"#;
    let path = dir.join("grammar.yaml");
    fs::write(&path, yaml).expect("failed to write grammar");
    path
}

/// Windows-like dialect with a single value flag.
fn write_json_grammar(dir: &TempDir) -> PathBuf {
    let json = serde_json::json!({
        "prog": {
            "flags": {
                "map": {
                    "o": { "nvalue": 1 },
                    "f": { "nvalue": 0 }
                }
            }
        },
        "scanner_config": {
            "flag_prefix": "/",
            "assignment_operator": ":",
            "multi_value_delim": ","
        }
    });
    let path = dir.join("grammar.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap())
        .expect("failed to write grammar");
    path
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_without_grammar_accepts_any_flag() {
    let output = argtree(&["parse", "--", "prog", "-v", "--name", "x"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["errors"], serde_json::json!([]));
    assert_eq!(doc["tree"][0]["type"], "Command");
    assert_eq!(doc["tree"][0]["node"]["name"], "prog");

    let nodes = doc["tree"][0]["node"]["nodes"].as_array().unwrap();
    assert_eq!(nodes[1]["node"]["name"], "v");
    assert_eq!(nodes[3]["node"]["name"], "name");
    assert_eq!(nodes[5], serde_json::json!({"type": "Ident", "node": "x"}));
}

#[test]
fn parse_with_yaml_grammar_names_values() {
    let dir = TempDir::new("parse_yaml");
    let grammar = write_yaml_grammar(&dir);

    let output = argtree(&[
        "parse",
        "--ast",
        "--grammar",
        grammar.to_str().unwrap(),
        "--",
        "make",
        "--output",
        "out.log",
        "build",
        "lib",
        "bin",
        "--verbose",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let make = &doc["tree"][0]["node"];
    assert_eq!(make["nodes"][0]["node"]["name"], "output");
    assert_eq!(
        make["nodes"][0]["node"]["values"],
        serde_json::json!([{"key": "file", "value": "out.log"}])
    );

    let build = &make["nodes"][1]["node"];
    assert_eq!(build["name"], "build");
    assert_eq!(
        build["values"],
        serde_json::json!([
            {"key": "target", "value": "lib"},
            {"key": "target.1", "value": "bin"}
        ])
    );
    assert_eq!(build["nodes"][2]["node"]["name"], "verbose");
}

#[test]
fn parse_reports_recoverable_errors_with_exit_one() {
    let dir = TempDir::new("parse_errors");
    let grammar = write_yaml_grammar(&dir);

    let output = argtree(&[
        "parse",
        "--grammar",
        grammar.to_str().unwrap(),
        "--",
        "make",
        "--nope",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["errors"][0]["msg"], r#"unknown flag "nope""#);
    assert_eq!(doc["errors"][0]["pos"]["column"], 6);
    assert_eq!(doc["tree"][0]["node"]["name"], "make");
}

#[test]
fn parse_yaml_output() {
    let output = argtree(&["parse", "--format", "yaml", "--", "prog", "hello"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("tree:"), "unexpected output: {out}");
    assert!(out.contains("name: prog"), "unexpected output: {out}");
}

#[test]
fn parse_illegal_character_is_fatal() {
    let output = argtree(&["parse", "--", "prog", "\u{1}"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("error:"), "stderr: {}", stderr(&output));
}

#[test]
fn parse_missing_grammar_is_fatal() {
    let output = argtree(&["parse", "--grammar", "/nonexistent/grammar.yaml", "--", "prog"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to read"), "stderr: {}", stderr(&output));
}

#[test]
fn parse_rejects_unknown_grammar_extension() {
    let dir = TempDir::new("parse_ext");
    let path = dir.join("grammar.toml");
    fs::write(&path, "").unwrap();

    let output = argtree(&["parse", "--grammar", path.to_str().unwrap(), "--", "prog"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unsupported document"), "stderr: {}", stderr(&output));
}

// ---------------------------------------------------------------------------
// roundtrip / unparse
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_reproduces_arguments() {
    let output = argtree(&[
        "roundtrip", "--", "prog", "-abc", "--with", "a", "--", "tardigrade=smol", "-!",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).lines().collect::<Vec<_>>(),
        vec!["prog", "-abc", "--with", "a", "--", "tardigrade=smol", "-!"]
    );
}

#[test]
fn roundtrip_with_custom_dialect() {
    let dir = TempDir::new("roundtrip_dialect");
    let grammar = write_json_grammar(&dir);

    let output = argtree(&[
        "roundtrip",
        "--grammar",
        grammar.to_str().unwrap(),
        "--",
        "hotdog",
        "/f",
        "/o:ppy",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).lines().collect::<Vec<_>>(),
        vec!["hotdog", "/f", "/o:ppy"]
    );
}

#[test]
fn unparse_reads_parse_output() {
    let dir = TempDir::new("unparse");
    let grammar = write_yaml_grammar(&dir);
    let tree = dir.join("tree.json");
    let args = ["make", "--output=out.log", "build", "lib", "bin"];

    let mut parse = vec!["parse", "--grammar", grammar.to_str().unwrap(), "--"];
    parse.extend(args);
    let parsed = argtree(&parse);
    assert!(parsed.status.success(), "stderr: {}", stderr(&parsed));
    fs::write(&tree, &parsed.stdout).unwrap();

    let output = argtree(&[
        "unparse",
        "--grammar",
        grammar.to_str().unwrap(),
        "--input",
        tree.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).lines().collect::<Vec<_>>(), args);
}

#[test]
fn unparse_rejects_invalid_tree() {
    let dir = TempDir::new("unparse_invalid");
    let tree = dir.join("tree.json");
    let json = serde_json::json!([
        {"type": "CompoundShortFlag", "node": [{"type": "Ident", "node": "x"}]}
    ]);
    fs::write(&tree, json.to_string()).unwrap();

    let output = argtree(&["unparse", "--input", tree.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("error:"), "stderr: {}", stderr(&output));
}

// ---------------------------------------------------------------------------
// grammar
// ---------------------------------------------------------------------------

#[test]
fn grammar_describes_own_command_line() {
    let output = argtree(&["grammar", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let commands = &doc["prog"]["commands"];
    for name in ["parse", "unparse", "roundtrip", "grammar"] {
        assert!(commands.get(name).is_some(), "missing {name} in {commands}");
    }
    assert_eq!(commands["parse"]["flags"]["map"]["ast"]["nvalue"], 0);
    assert_eq!(commands["parse"]["flags"]["map"]["grammar"]["nvalue"], 1);
}
