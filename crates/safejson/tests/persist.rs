#![cfg(feature = "derive")]

use std::fs;

use safejson::{Error, Reflect, save_json_file, save_secure_json_file};
use serde_json::json;

#[derive(Reflect)]
struct Config {
    pub name: String,
    #[mask("filled4")]
    pub api_key: String,
}

#[test]
fn writes_pretty_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.json");
    save_json_file(&path, &json!({"hello": "world"}))?;
    assert_eq!(fs::read_to_string(&path)?, "{\n\t\"hello\": \"world\"\n}\n");
    Ok(())
}

#[test]
fn overwrites_existing_content() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.json");
    fs::write(&path, "x".repeat(4096))?;
    save_json_file(&path, &true)?;
    assert_eq!(fs::read_to_string(&path)?, "true\n");
    Ok(())
}

#[test]
fn secure_variant_masks_before_writing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    let config = Config { name: String::from("svc"), api_key: String::from("sk-live-abcdef") };
    save_secure_json_file(&path, &config)?;
    let text = fs::read_to_string(&path)?;
    assert!(text.contains("\"api_key\": \"****\""));
    assert!(!text.contains("sk-live"));
    Ok(())
}

#[test]
fn print_failures_are_written_not_raised() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nan.json");
    save_json_file(&path, &f64::NAN)?;
    assert_eq!(fs::read_to_string(&path)?, "error printing: json: unsupported value: NaN");
    save_secure_json_file(&path, &f64::NAN)?;
    assert_eq!(fs::read_to_string(&path)?, "error printing");
    Ok(())
}

#[test]
fn write_failures_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.json");
    let err = save_json_file(&path, &1).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[cfg(unix)]
#[test]
fn new_files_are_not_executable() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mode.json");
    save_json_file(&path, &1)?;
    let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
    // 0o644 before the process umask
    assert_eq!(mode & 0o600, 0o600);
    assert_eq!(mode & 0o133, 0);
    Ok(())
}
