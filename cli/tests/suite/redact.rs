#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;

use tempfile::tempdir;

use super::common::admin_assistant;

#[test]
fn redacts_every_secret_in_a_file() -> anyhow::Result<()> {
    let home = tempdir()?;
    let message = home.path().join("message.txt");
    fs::write(&message, "key=sk-live-abcdef, backup=sk-live-abcdef-old\n")?;

    admin_assistant(home.path())
        .args(["redact", "--secret", "sk-live-abcdef", "--secret", "sk-live-abcdef-old"])
        .arg(&message)
        .assert()
        .success()
        .stdout("key=[REDACTED], backup=[REDACTED]\n");
    Ok(())
}

#[test]
fn short_secrets_are_left_alone() -> anyhow::Result<()> {
    let home = tempdir()?;

    admin_assistant(home.path())
        .args(["redact", "--secret", "abc", "-"])
        .write_stdin("abc abc")
        .assert()
        .success()
        .stdout("abc abc");
    Ok(())
}

#[test]
fn secrets_can_come_from_the_config_file() -> anyhow::Result<()> {
    let home = tempdir()?;
    fs::write(
        home.path().join("config.toml"),
        "secrets = [\"hunter2-hunter2\"]\n",
    )?;

    admin_assistant(home.path())
        .arg("redact")
        .write_stdin("password is hunter2-hunter2")
        .assert()
        .success()
        .stdout("password is [REDACTED]");
    Ok(())
}

#[test]
fn bad_config_file_is_an_error() -> anyhow::Result<()> {
    let home = tempdir()?;
    fs::write(home.path().join("config.toml"), "secrets = 5\n")?;

    admin_assistant(home.path())
        .arg("redact")
        .write_stdin("hello")
        .assert()
        .failure()
        .stderr(predicates::str::contains("config.toml"));
    Ok(())
}
