use serde_json::{json, Value};
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn module() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nios_extensible_attribute"));
    cmd.env_remove("INFOBLOX_HOST")
        .env_remove("INFOBLOX_USERNAME")
        .env_remove("INFOBLOX_PASSWORD")
        .env("RUST_LOG", "off");
    cmd
}

fn args_file(args: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", args).unwrap();
    file
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap()
}

#[test]
fn prints_argument_schema() {
    let output = module().arg("--print-schema").output().unwrap();
    assert!(output.status.success());

    let schema = stdout_json(&output);
    assert_eq!(schema["required"], json!(["name", "type"]));
    assert!(schema["properties"]["provider"]["properties"]["host"].is_object());
    assert_eq!(schema["properties"]["state"]["default"], json!("present"));
}

#[test]
fn missing_name_fails_with_json_message() {
    let file = args_file(&json!({
        "type": "STRING",
        "provider": {"host": "nios.example.com"}
    }));
    let output = module().arg(file.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    assert_eq!(result["failed"], json!(true));
    assert!(result["msg"].as_str().unwrap().contains("name"));
}

#[test]
fn missing_host_is_reported_before_connecting() {
    let file = args_file(&json!({"ANSIBLE_MODULE_ARGS": {"name": "my_string", "type": "STRING"}}));
    let output = module().arg(file.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let msg = stdout_json(&output)["msg"].as_str().unwrap().to_string();
    assert!(msg.contains("provider host is required"), "{}", msg);
}

#[test]
fn malformed_arguments_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "name=my_string type=STRING").unwrap();
    let output = module().arg(file.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_json(&output)["msg"]
        .as_str()
        .unwrap()
        .contains("not valid JSON"));
}

#[test]
fn missing_config_file_fails() {
    let output = module()
        .args(["--config", "/nonexistent/nios.toml", "--print-schema"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["failed"], json!(true));
}

#[test]
fn unusable_log_dir_fails_with_json_message() {
    let blocker = NamedTempFile::new().unwrap();
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[logging]").unwrap();
    writeln!(config, "dir = {:?}", blocker.path().join("logs").display().to_string()).unwrap();

    let output = module()
        .arg("--config")
        .arg(config.path())
        .arg("--print-schema")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    assert_eq!(result["failed"], json!(true));
    assert!(result["msg"].as_str().unwrap().contains("I/O error"));
}
