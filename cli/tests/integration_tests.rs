use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("form_cli_test_{name}_{}", std::process::id()));
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

fn form_schema(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_form-schema"));
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("form-schema.yml"));
    cmd
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    form_schema(dir)
        .arg("--store")
        .arg(dir.join("store"))
        .args(args)
        .output()
        .expect("failed to run form-schema")
}

/// Runs a session over `script`. Without `store_args` the session uses the
/// default file store under `dir`.
fn run_session(dir: &TempDir, store_args: &[&str], script: &str) -> Output {
    let mut cmd = form_schema(dir);
    if store_args.is_empty() {
        cmd.arg("--store").arg(dir.join("store"));
    } else {
        cmd.args(store_args);
    }
    let mut child = cmd
        .arg("session")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn form-schema session");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(script.as_bytes())
        .expect("failed to write script");
    child.wait_with_output().expect("failed to wait for session")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_fields_file(dir: &TempDir) -> PathBuf {
    let json = serde_json::json!([
        { "type": "text", "title": "Name", "required": true },
        { "type": "number", "title": "Age", "minValue": 18, "maxValue": 60 },
    ]);
    let path = dir.join("fields.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap())
        .expect("failed to write fields");
    path
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[test]
fn session_builds_reorders_validates_and_saves() {
    let dir = TempDir::new("session_save");
    let script = r#"
add text Name --required
add number Age --min 18 --max 60 --helper "Enter your age"
add select Fruit --option Apple --option Banana --option Cherry
move 2 1
check 1 17
check 1 30
save Survey
list
schemas
quit
"#;
    let output = run_session(&dir, &[], script);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("1. [number] Age range 18..60"), "stdout: {out}");
    assert!(out.contains("2. [text] Name (required)"), "stdout: {out}");
    assert!(out.contains("invalid: Value should be greater than or equal to 18"));
    assert!(out.contains("ok (Enter a number between 18 and 60)"));
    assert!(out.contains("saved 'Survey' with 3 fields"));
    assert!(out.contains("(no fields)"));
    assert!(out.contains("Survey (3 fields)"));

    assert!(dir.join("store").join("savedSchemas.json").exists());

    let listed = run(&dir, &["schemas"]);
    assert!(listed.status.success());
    assert_eq!(stdout(&listed).trim(), "Survey (3 fields)");
}

#[test]
fn session_reports_errors_and_keeps_going() {
    let dir = TempDir::new("session_errors");
    let script = "\
add select Pick --option a --option b --option c --option d --option e --option f
add select Pick --option a
option 1 add b
frobnicate
add text \"unterminated
remove 00000000-0000-4000-8000-000000000000
move 1 7
list
";
    let output = run_session(&dir, &[], script);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let err = stderr(&output);
    assert!(err.contains("at most 5 options"), "stderr: {err}");
    assert!(err.contains("unterminated double quote"), "stderr: {err}");
    assert!(err.contains("no field at position 7"), "stderr: {err}");

    let out = stdout(&output);
    assert!(out.contains("nothing to remove"), "stdout: {out}");
    assert!(out.contains("1. [select] Pick options a | b"), "stdout: {out}");
}

#[test]
fn session_edit_changes_type_and_drops_other_attributes() {
    let dir = TempDir::new("session_edit");
    let script = "\
add select Size --option S --option M
edit 1 --type number --min 1 --title Quantity
list
";
    let output = run_session(&dir, &[], script);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("1. [number] Quantity range 1.."), "stdout: {out}");
    assert!(!out.contains("options S"), "stdout: {out}");
}

#[test]
fn session_edit_turns_text_into_select() {
    let dir = TempDir::new("session_to_select");
    let script = "\
add text Size
edit 1 --type select --option S --option M
option 1 add L
list
";
    let output = run_session(&dir, &[], script);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("1. [select] Size options S | M | L"), "stdout: {out}");
}

#[test]
fn session_opens_saved_schema() {
    let dir = TempDir::new("session_open");
    let saved = run_session(&dir, &[], "add text Email\nsave Contact\n");
    assert!(saved.status.success(), "stderr: {}", stderr(&saved));

    let output = run_session(&dir, &[], "open Contact\ncheck 1 anything\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("1. [text] Email"), "stdout: {out}");
    assert!(out.lines().any(|line| line == "ok"), "stdout: {out}");
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

#[test]
fn import_show_check_export_delete() {
    let dir = TempDir::new("one_shot");
    let fields = write_fields_file(&dir);
    let fields = fields.to_str().unwrap();

    let imported = run(&dir, &["import", "Contact", "--input", fields]);
    assert!(imported.status.success(), "stderr: {}", stderr(&imported));
    assert!(stdout(&imported).contains("Imported 'Contact' with 2 fields."));

    let shown = run(&dir, &["show", "Contact", "--format", "json"]);
    assert!(shown.status.success(), "stderr: {}", stderr(&shown));
    let schema: serde_json::Value = serde_json::from_str(&stdout(&shown)).unwrap();
    assert_eq!(schema["name"], "Contact");
    assert_eq!(schema["fields"][1]["minValue"], 18.0);

    let table = run(&dir, &["show", "Contact"]);
    assert!(stdout(&table).starts_with("Contact (2 fields)"));

    let rejected = run(&dir, &["check", "Contact", "--field", "2", "--value", "61"]);
    assert!(!rejected.status.success());
    assert!(stdout(&rejected).contains("invalid: Value should be less than or equal to 60"));

    let accepted = run(&dir, &["check", "Contact", "--field", "2", "--value", "30"]);
    assert!(accepted.status.success(), "stderr: {}", stderr(&accepted));

    let export_path = dir.join("export.json");
    let exported = run(
        &dir,
        &["export", "Contact", "--output", export_path.to_str().unwrap()],
    );
    assert!(exported.status.success(), "stderr: {}", stderr(&exported));
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(written, schema);

    let deleted = run(&dir, &["delete", "Contact"]);
    assert!(deleted.status.success());
    assert!(stdout(&deleted).contains("Deleted 1 schema(s) named 'Contact'."));

    let missing = run(&dir, &["show", "Contact"]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("no saved schema named 'Contact'"));
}

#[test]
fn import_rejects_invalid_definitions() {
    let dir = TempDir::new("import_invalid");
    let path = dir.join("bad.json");
    fs::write(&path, r#"[{ "type": "select", "title": "Empty choice" }]"#).unwrap();

    let output = run(&dir, &["import", "Bad", "--input", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid schema"), "stderr: {}", stderr(&output));

    let listed = run(&dir, &["schemas"]);
    assert_eq!(stdout(&listed).trim(), "No saved schemas.");
}

#[test]
fn config_reject_policy_blocks_duplicate_names() {
    let dir = TempDir::new("config_reject");
    fs::write(
        dir.join("form-schema.yml"),
        "library:\n  duplicate_names: reject\n",
    )
    .unwrap();
    let fields = write_fields_file(&dir);
    let fields = fields.to_str().unwrap();

    assert!(run(&dir, &["import", "Contact", "--input", fields]).status.success());
    let second = run(&dir, &["import", "Contact", "--input", fields]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already exists"), "stderr: {}", stderr(&second));
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

#[test]
fn sqlite_backend_and_migrations() {
    let dir = TempDir::new("sqlite");
    let db = dir.join("forms.db");
    let db_arg = db.to_str().unwrap();

    let output = run_session(
        &dir,
        &["--backend", "sqlite", "--store", db_arg],
        "add text Name\nsave Contact\n",
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let status = run(&dir, &["migrate", "status", "--db", db_arg, "--prefix", "form_"]);
    assert!(status.status.success(), "stderr: {}", stderr(&status));
    let out = stdout(&status);
    assert!(out.contains("Tables exist: yes"), "stdout: {out}");
    assert!(out.contains("Entry count: 1"), "stdout: {out}");

    let down = run(&dir, &["migrate", "down", "--db", db_arg]);
    assert!(down.status.success(), "stderr: {}", stderr(&down));
    let status = run(&dir, &["migrate", "status", "--db", db_arg]);
    assert!(stdout(&status).contains("Tables exist: no"));

    let up = run(&dir, &["migrate", "up", "--db", db_arg, "--prefix", "form_"]);
    assert!(up.status.success(), "stderr: {}", stderr(&up));

    let bad = run(&dir, &["migrate", "up", "--db", db_arg, "--prefix", "bad-prefix"]);
    assert!(!bad.status.success());
    assert!(stderr(&bad).contains("invalid prefix"));
}
