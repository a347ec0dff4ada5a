// Build script - reads config.yaml at compile time and generates defaults
// This allows changing defaults during development without editing source code

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Tell Cargo to rerun if config.yaml changes
    println!("cargo:rerun-if-changed=src/config.yaml");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("compiled_config.rs");

    // Try to read config.yaml from src/, fall back to hardcoded defaults if not found
    let config = if Path::new("src/config.yaml").exists() {
        let content = fs::read_to_string("src/config.yaml")
            .expect("Failed to read src/config.yaml");
        parse_config(&content)
    } else {
        CompiledConfig::default()
    };

    let generated = format!(
        r#"// Auto-generated from config.yaml at compile time
// Do not edit - modify config.yaml and rebuild instead

pub const WORKSPACE_DIR: &str = {workspace_dir:?};
pub const TEMP_ARCHIVE_PATH: &str = {temp_archive_path:?};
pub const REMOTE_BASE: &str = {remote_base:?};
pub const EXECUTABLE_SUBDIR: &str = {executable_subdir:?};
pub const ARCHIVE_SUBDIR: &str = {archive_subdir:?};

pub const ARCHIVE_EXTENSION: &str = {extension:?};
pub const FLATTEN_SINGLE_ROOT: bool = {flatten_single_root};
pub const BACKUP_SUPPLIED_ARCHIVE: bool = {backup_supplied_archive};

pub const SECRET_NAME: &str = {secret_name:?};
pub const SECRETS_FILE: &str = {secrets_file:?};

pub const EXTRACT_EXCLUDES: &[&str] = &[
{excludes}
];
"#,
        workspace_dir = config.workspace_dir,
        temp_archive_path = config.temp_archive_path,
        remote_base = config.remote_base,
        executable_subdir = config.executable_subdir,
        archive_subdir = config.archive_subdir,
        extension = config.extension,
        flatten_single_root = config.flatten_single_root,
        backup_supplied_archive = config.backup_supplied_archive,
        secret_name = config.secret_name,
        secrets_file = config.secrets_file,
        excludes = config.extract_excludes
            .iter()
            .map(|e| format!("    {:?},", e))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    fs::write(&dest_path, generated).expect("Failed to write compiled config");
}

struct CompiledConfig {
    workspace_dir: String,
    temp_archive_path: String,
    remote_base: String,
    executable_subdir: String,
    archive_subdir: String,
    extension: String,
    flatten_single_root: bool,
    backup_supplied_archive: bool,
    secret_name: String,
    secrets_file: String,
    extract_excludes: Vec<String>,
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            workspace_dir: "/content/project".to_string(),
            temp_archive_path: "/content/upload/project.zip".to_string(),
            remote_base: "/content/drive/MyDrive/project-sync".to_string(),
            executable_subdir: "executable".to_string(),
            archive_subdir: "archives".to_string(),
            extension: ".zip".to_string(),
            flatten_single_root: true,
            backup_supplied_archive: true,
            secret_name: "API_KEY".to_string(),
            secrets_file: "/content/secrets.yaml".to_string(),
            extract_excludes: vec![
                "__MACOSX".to_string(),
                "__pycache__".to_string(),
                ".ipynb_checkpoints".to_string(),
                ".DS_Store".to_string(),
            ],
        }
    }
}

fn parse_config(content: &str) -> CompiledConfig {
    let mut config = CompiledConfig::default();

    // Simple YAML parsing (avoiding external dependencies in build script)
    let mut section = "";
    let mut in_excludes = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Top-level keys start a new section
        if !line.starts_with(' ') && !line.starts_with('\t') {
            in_excludes = false;
            if trimmed.starts_with("extract_excludes:") {
                in_excludes = true;
                config.extract_excludes.clear(); // Start fresh when we see the section
            }
            section = trimmed.trim_end_matches(':');
            continue;
        }

        if in_excludes {
            if let Some(item) = trimmed.strip_prefix("- ") {
                config.extract_excludes.push(unquote(item).to_string());
            }
            continue;
        }

        let Some((key, value)) = parse_kv(trimmed) else {
            continue;
        };

        match (section, key) {
            ("paths", "workspace_dir") => config.workspace_dir = value.to_string(),
            ("paths", "temp_archive_path") => config.temp_archive_path = value.to_string(),
            ("paths", "remote_base") => config.remote_base = value.to_string(),
            ("paths", "executable_subdir") => config.executable_subdir = value.to_string(),
            ("paths", "archive_subdir") => config.archive_subdir = value.to_string(),
            ("archive", "extension") => config.extension = value.to_string(),
            ("archive", "flatten_single_root") => config.flatten_single_root = parse_bool(value),
            ("archive", "backup_supplied_archive") => config.backup_supplied_archive = parse_bool(value),
            ("secrets", "secret_name") => config.secret_name = value.to_string(),
            ("secrets", "secrets_file") => config.secrets_file = value.to_string(),
            _ => {}
        }
    }

    config
}

fn parse_kv(line: &str) -> Option<(&str, &str)> {
    let colon_pos = line.find(':')?;
    let key = line[..colon_pos].trim();
    let mut value = line[colon_pos + 1..].trim();

    // Remove inline comments
    if let Some(comment_pos) = value.find(" #") {
        value = value[..comment_pos].trim();
    }

    // Skip if value is empty (section header)
    if value.is_empty() {
        return None;
    }

    Some((key, unquote(value)))
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches('"').trim_matches('\'')
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "yes" | "1")
}
