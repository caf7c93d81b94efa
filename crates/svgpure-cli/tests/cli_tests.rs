use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ICON: &str = r#"<?xml version="1.0"?>
<!-- exported -->
<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" id="icon">
  <title>Check</title>
  <defs><linearGradient id="a"><stop offset="0"/></linearGradient></defs>
  <path d="M4 12 L10 18 L20 6" stroke="black" class="line"/>
</svg>
"#;

fn svgpure() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("svgpure")?)
}

fn icons() -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("check.svg"), ICON)?;
    fs::write(dir.path().join("broken.svg"), "<svg><g></svg>")?;
    fs::write(dir.path().join("readme.txt"), "not an icon")?;
    Ok(dir)
}

#[test]
fn writes_into_purified_subdirectory_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path();
    fs::write(dir.join("check.svg"), ICON)?;

    svgpure()?
        .arg("--directory")
        .arg(dir)
        .arg("--no-validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 sanitized, 0 with warnings, 0 failed"));

    let output = fs::read_to_string(dir.join("purified").join("check.svg"))?;
    assert_eq!(
        output,
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24">"#,
            r#"<defs><linearGradient><stop/></linearGradient></defs>"#,
            r#"<path d="M4 12 L10 18 L20 6" stroke="black"/></svg>"#,
        )
    );
    assert_eq!(fs::read_to_string(dir.join("check.svg"))?, ICON);
    Ok(())
}

#[test]
fn overwrite_replaces_originals() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("check.svg"), ICON)?;

    svgpure()?
        .args(["--profile", "minimal", "--overwrite", "--no-validate", "-d"])
        .arg(dir.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("check.svg"))?,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24"><path d="M4 12 L10 18 L20 6" stroke="black"/></svg>"#
    );
    assert!(!dir.path().join("purified").exists());
    Ok(())
}

#[test]
fn one_broken_file_fails_the_run_but_not_the_batch() -> Result<(), Box<dyn std::error::Error>> {
    let dir = icons()?;
    let out = dir.path().join("out");

    svgpure()?
        .arg("-d")
        .arg(dir.path())
        .arg("--output-dir")
        .arg(&out)
        .arg("--no-validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed    "))
        .stdout(predicate::str::contains("mismatched closing tag"))
        .stdout(predicate::str::contains("1 sanitized, 0 with warnings, 1 failed"));

    assert!(out.join("check.svg").exists());
    assert!(!out.join("broken.svg").exists());
    assert!(!out.join("readme.txt").exists());
    Ok(())
}

#[test]
fn missing_validator_is_only_a_warning() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("check.svg"), ICON)?;

    svgpure()?
        .arg("-d")
        .arg(dir.path())
        .args(["--validator", "svgpure-test-missing-validator"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning   "))
        .stdout(predicate::str::contains("0 sanitized, 1 with warnings, 0 failed"));

    assert!(dir.path().join("purified").join("check.svg").exists());
    Ok(())
}

#[test]
fn config_file_extends_allowlists() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("dot.svg"),
        r#"<svg id="s"><circle cx="1" cy="1" r="1" id="c"/></svg>"#,
    )?;
    let config = dir.path().join("svgpure.toml");
    fs::write(
        &config,
        "profile = \"minimal\"\nelements = [\"circle\"]\nattributes = [\"id\"]\n[validator]\nenabled = false\n",
    )?;

    svgpure()?
        .arg("-d")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("purified").join("dot.svg"))?,
        r#"<svg id="s"><circle cx="1" cy="1" r="1" id="c"/></svg>"#
    );
    Ok(())
}

#[test]
fn max_depth_rejects_deeply_nested_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("flat.svg"), "<svg><g/></svg>")?;
    fs::write(dir.path().join("deep.svg"), "<svg><g><g><g/></g></g></svg>")?;

    svgpure()?
        .arg("-d")
        .arg(dir.path())
        .args(["--max-depth", "2", "--no-validate"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("max depth exceeded: 2"))
        .stdout(predicate::str::contains("1 sanitized, 0 with warnings, 1 failed"));

    assert!(dir.path().join("purified").join("flat.svg").exists());
    assert!(!dir.path().join("purified").join("deep.svg").exists());
    Ok(())
}

#[test]
fn invalid_allowlist_name_is_a_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = icons()?;

    svgpure()?
        .arg("-d")
        .arg(dir.path())
        .args(["--allow-attribute", "stroke width", "--no-validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid allow-list name"));

    assert!(!dir.path().join("purified").exists());
    Ok(())
}

#[test]
fn missing_directory_is_a_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    svgpure()?
        .args(["-d", "/definitely/not/a/dir", "--no-validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read directory"));
    Ok(())
}

#[test]
fn directory_flag_is_required() -> Result<(), Box<dyn std::error::Error>> {
    svgpure()?.assert().failure().code(2);
    Ok(())
}
