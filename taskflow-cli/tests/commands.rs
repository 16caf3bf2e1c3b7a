use clap::Parser;
use taskflow_cli::{execute, Cli, CliError};
use taskflow_core::config::load_config_file;

const SUPPORT_YAML: &str = r#"
defaultStatus: open
statuses: [open, waiting, solved, closed]
transitions:
  open: [waiting, solved]
  waiting: [open]
  solved: [closed, open]
"#;

fn write_config(dir: &tempfile::TempDir, file: &str, content: &str) -> String {
    let path = dir.path().join(file);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

async fn run(args: &[&str]) -> Result<taskflow_cli::Report, CliError> {
    let cli = Cli::try_parse_from(args).unwrap();
    let config = load_config_file(cli.config.as_deref())?;
    execute(&cli.command, &config).await
}

#[tokio::test]
async fn check_custom_workflow_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "support.yaml", SUPPORT_YAML);

    let report = run(&["taskflow", "check", "--config", &path]).await.unwrap();
    assert_eq!(
        report.text,
        "ok: 4 statuses, 5 transitions\ndefault: open\nterminal: closed\n"
    );
}

#[tokio::test]
async fn transitions_follow_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "support.yaml", SUPPORT_YAML);

    let report = run(&["taskflow", "transitions", "solved", "-c", &path])
        .await
        .unwrap();
    assert_eq!(report.text, "closed\nopen\n");
}

#[tokio::test]
async fn allowed_uses_custom_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "support.yaml", SUPPORT_YAML);

    let report = run(&["taskflow", "allowed", "waiting", "solved", "-c", &path])
        .await
        .unwrap();
    assert!(!report.success);

    let report = run(&["taskflow", "allowed", "closed", "closed", "-c", &path])
        .await
        .unwrap();
    assert!(report.success);
}

#[tokio::test]
async fn options_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "wf.json",
        r#"{"statuses": ["todo", "doing", "done"], "transitions": {"todo": ["doing"], "doing": ["done", "todo"]}}"#,
    );

    let report = run(&["taskflow", "options", "doing", "-c", &path])
        .await
        .unwrap();
    assert_eq!(report.text, "  done\n  todo\n* doing\n");
}

#[tokio::test]
async fn broken_reference_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "broken.yaml",
        "statuses: [open]\ntransitions:\n  open: [reopened]\n",
    );

    let err = run(&["taskflow", "check", "-c", &path]).await.unwrap_err();
    assert!(matches!(err, CliError::Invalid(_)));
    assert!(err.to_string().contains("reopened"));
}

#[tokio::test]
async fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let result = run(&["taskflow", "check", "-c", path.to_str().unwrap()]).await;
    assert!(matches!(result, Err(CliError::Config(_))));
}
