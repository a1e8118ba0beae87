//! Tool-level tests
//!
//! Exercise grep, ls and tree through the `Tool` boundary the agent uses.

use std::fs;
use std::path::Path;

use sandbox_fs_tools::error::{error_info, ErrorCode, FsToolsError};
use sandbox_fs_tools::tools::fs::{FileSystemToolError, FsToolsConfig, DEFAULT_IGNORE_PATTERNS};
use sandbox_fs_tools::tools::{fs_tools, Tool};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn path_str(p: &Path) -> String {
    p.to_str().unwrap().to_string()
}

async fn call(tool: &dyn Tool, input: Value) -> Value {
    let out = tool.call(&input.to_string()).await.unwrap();
    serde_json::from_str(&out).unwrap()
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src").join("handlers")).unwrap();
    fs::create_dir_all(root.join(".git").join("objects")).unwrap();
    fs::create_dir_all(root.join("node_modules").join("left-pad")).unwrap();
    fs::write(root.join("README.md"), "# Demo\nTODO: write docs\n").unwrap();
    fs::write(root.join("src").join("main.rs"), "fn main() {\n    // todo: wire handlers\n}\n").unwrap();
    fs::write(root.join("src").join("handlers").join("auth.rs"), "pub fn login() {}\n").unwrap();
    fs::write(root.join(".git").join("config"), "TODO inside git\n").unwrap();
    fs::write(root.join("node_modules").join("left-pad").join("index.js"), "// TODO\n").unwrap();
    fs::write(root.join("server.log"), "TODO in log\n").unwrap();
    dir
}

#[tokio::test]
async fn test_toolset_names() {
    let tools = fs_tools(FsToolsConfig::default());
    let names: Vec<String> = tools.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["grep", "ls", "tree"]);
    for tool in &tools {
        let params = tool.parameters();
        assert_eq!(params["type"], "object");
        assert!(params["required"].as_array().unwrap().contains(&json!("path")));
    }
}

#[tokio::test]
async fn test_relative_and_missing_paths_rejected_everywhere() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let missing = path_str(&dir.path().join("missing"));
    for tool in fs_tools(FsToolsConfig::default()) {
        let payload = call(tool.as_ref(), json!({ "pattern": "x", "path": "relative/path" })).await;
        assert_eq!(payload["status"], "error", "{}", tool.name());
        assert!(payload["message"].as_str().unwrap().contains("not absolute"));
        assert_eq!(payload["code"], ErrorCode::InvalidPath.as_u32());

        let payload = call(tool.as_ref(), json!({ "pattern": "x", "path": missing })).await;
        assert_eq!(payload["status"], "error", "{}", tool.name());
        assert!(payload["message"].as_str().unwrap().contains("not found"));
    }
}

#[tokio::test]
async fn test_grep_skips_default_ignores() {
    init_logging();
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    let payload = call(tools[0].as_ref(), json!({ "pattern": "todo", "path": path_str(dir.path()) })).await;

    assert_eq!(payload["status"], "success");
    let files: Vec<&str> = payload["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["file"].as_str().unwrap())
        .collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("README.md"));
    assert!(files[1].ends_with("main.rs"));

    let stats = &payload["stats"];
    assert_eq!(stats["files_searched"], 3);
    assert_eq!(stats["files_matched"], 2);
    assert_eq!(stats["truncated"], false);
}

#[tokio::test]
async fn test_grep_result_cap_invariant() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    for cap in 0..4 {
        let payload = call(
            tools[0].as_ref(),
            json!({ "pattern": "todo", "path": path_str(dir.path()), "max_results": cap }),
        )
        .await;
        let count = payload["matches"].as_array().unwrap().len();
        assert!(count <= cap);
        // Both matches sit before the last line of main.rs, so every cap up to 2 stops early.
        assert_eq!(payload["stats"]["truncated"], json!(cap <= 2), "cap {cap}");
        assert!(
            payload["stats"]["files_matched"].as_u64() <= payload["stats"]["files_searched"].as_u64()
        );
    }
}

#[tokio::test]
async fn test_grep_config_default_cap() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::new().with_default_max_results(1));
    let payload = call(tools[0].as_ref(), json!({ "pattern": "todo", "path": path_str(dir.path()) })).await;
    assert_eq!(payload["max_results"], 1);
    assert_eq!(payload["matches"].as_array().unwrap().len(), 1);
    assert_eq!(payload["stats"]["truncated"], true);
}

#[tokio::test]
async fn test_grep_invalid_pattern_payload() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    let payload = call(tools[0].as_ref(), json!({ "pattern": "(unclosed", "path": path_str(dir.path()) })).await;
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["code"], ErrorCode::InvalidPattern.as_u32());
}

#[tokio::test]
async fn test_ls_lists_workspace() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    let payload = call(tools[1].as_ref(), json!({ "path": path_str(dir.path()) })).await;
    assert_eq!(payload["items"], json!(["src/", "README.md"]));
    assert_eq!(payload["count"], 2);

    let payload = call(tools[1].as_ref(), json!({ "path": path_str(dir.path()), "match": ["*.md"] })).await;
    assert_eq!(payload["items"], json!(["README.md"]));
}

#[tokio::test]
async fn test_ls_rejects_file() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    let payload = call(tools[1].as_ref(), json!({ "path": path_str(&dir.path().join("README.md")) })).await;
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["code"], ErrorCode::NotADirectory.as_u32());
}

#[tokio::test]
async fn test_tree_counts_and_depth() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    let payload = call(tools[2].as_ref(), json!({ "path": path_str(dir.path()), "max_depth": 2 })).await;
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["max_depth"], 2);

    let src = &payload["tree"][0];
    assert_eq!(src["name"], "src");
    let handlers = &src["children"][0];
    assert_eq!(handlers["name"], "handlers");
    assert!(handlers.get("children").is_none());

    // src, handlers / main.rs, README.md
    assert_eq!(payload["directories"], 2);
    assert_eq!(payload["files"], 2);
    assert_eq!(payload["total"], 4);
}

#[tokio::test]
async fn test_text_format() {
    let dir = workspace();
    let tools = fs_tools(FsToolsConfig::default());
    let input = json!({ "path": path_str(dir.path()), "format": "text" }).to_string();

    let ls = tools[1].call(&input).await.unwrap();
    assert!(ls.contains("```\nsrc/\nREADME.md\n```"));

    let tree = tools[2].call(&input).await.unwrap();
    assert!(tree.starts_with("Directory tree:"));
    assert!(tree.contains("[F] README.md"));

    let err = tools[1]
        .call(&json!({ "path": "nope", "format": "text" }).to_string())
        .await
        .unwrap();
    assert!(err.contains("not absolute"));
}

#[tokio::test]
async fn test_malformed_arguments_are_payloads() {
    let tools = fs_tools(FsToolsConfig::default());
    for tool in &tools {
        let out = tool.call("this is not json").await.unwrap();
        let payload: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["code"], ErrorCode::ToolInputError.as_u32());
    }
    let payload = call(tools[2].as_ref(), json!({ "path": "/", "max_depth": "deep" })).await;
    assert_eq!(payload["status"], "error");
}

#[test]
fn test_default_ignore_set_is_fixed() {
    assert!(DEFAULT_IGNORE_PATTERNS.contains(&".git"));
    assert!(DEFAULT_IGNORE_PATTERNS.contains(&"node_modules"));
    assert!(DEFAULT_IGNORE_PATTERNS.contains(&"*.pyc"));
}

#[test]
fn test_error_info_includes_code() {
    let error: FsToolsError = FileSystemToolError::PermissionDenied("/root".to_string()).into();
    let info = error_info(&error);
    assert!(info.starts_with("[E1004: Permission denied]"));
}
