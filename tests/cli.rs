use assert_cmd::Command;
use predicates::prelude::*;

fn tldw() -> Command {
    let mut cmd = Command::cargo_bin("tldw").expect("binary builds");
    cmd.env_remove("OPENAI_API_KEY");
    cmd
}

#[test]
fn help_lists_subcommands() {
    tldw()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summarize"))
        .stdout(predicate::str::contains("transcript"))
        .stdout(predicate::str::contains("transcribe"));
}

#[test]
fn url_without_video_id_fails_with_typed_message() {
    tldw()
        .args(["--quiet", "transcript", "https://example.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no video id found"));
}

#[test]
fn summarize_without_api_key_fails_fast() {
    tldw()
        .args(["--quiet", "summarize", "https://www.youtube.com/watch?v=dQw4w9WgXcQ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn transcribe_missing_file_fails() {
    tldw()
        .args(["--quiet", "transcribe", "definitely-missing.mp3"])
        .assert()
        .failure();
}

#[test]
fn missing_subcommand_is_usage_error() {
    tldw().assert().failure().stderr(predicate::str::contains("Usage"));
}
