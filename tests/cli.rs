mod common;

use std::error::Error;
use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

use common::write_silence_then_tone;

#[test]
fn cli_reports_silence_and_writes_side_files() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("take.wav");
    write_silence_then_tone(&input, 8_000, 4_000)?;
    let table = dir.path().join("results.txt");

    let output = Command::cargo_bin("wavcheck")?
        .arg("--no-progress")
        .arg("--json")
        .arg("--table")
        .arg(&table)
        .arg(&input)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("SILENCE"), "stdout: {stdout}");
    assert!(stdout.contains("Peak value:\t"), "stdout: {stdout}");

    let table_text = fs::read_to_string(&table)?;
    assert_eq!(table_text.lines().count(), 2);
    assert!(
        table_text
            .lines()
            .nth(1)
            .unwrap_or_default()
            .starts_with("take.wav\t16\t1\t8000\t4020\t")
    );

    let markers = fs::read_to_string(dir.path().join("take.mrk"))?;
    assert!(markers.contains("Name=Silence"));
    assert!(markers.contains("Pos=0"));

    assert!(dir.path().join("take.wav.txt").exists());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("take.wav.json"))?)?;
    assert_eq!(json["defects"]["results"]["events"][0]["kind"], "silence");
    Ok(())
}

#[test]
fn cli_flags_unreadable_files_and_skips_others() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("broken.wav"), b"RIFF\0\0\0\0AVI ")?;
    fs::write(dir.path().join("notes.txt"), b"not audio")?;

    let output = Command::cargo_bin("wavcheck")?
        .args(["--no-progress", "--no-reports"])
        .arg(dir.path())
        .output()?;

    assert_eq!(output.status.code(), Some(8));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("is not a wav"), "stdout: {stdout}");
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("broken.wav"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn cli_rejects_invalid_thresholds() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("take.wav");
    write_silence_then_tone(&input, 8_000, 100)?;

    Command::cargo_bin("wavcheck")?
        .args(["--hold-samples", "0", "--no-reports"])
        .arg(&input)
        .assert()
        .code(8);
    Ok(())
}
