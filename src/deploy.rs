//! Deployment helpers: packaging the app with the Functions CLI and pushing `.env` secrets into
//! Azure Key Vault with the `az` CLI.
//!
//! Both flows shell out to third-party tools; the parsing and naming rules live here so they can
//! be tested without either tool installed.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use thiserror::Error;

use crate::tools::Registry;

/// Tools every packaged build must register.
pub const EXPECTED_TOOLS: [&str; 5] = [
    "hello_mcp",
    "get_snippet",
    "save_snippet",
    "abuseipdb_check_ip",
    "abuseipdb_report_ip",
];

/// Errors raised by the deployment flows.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Required CLI is not on `PATH`.
    #[error("Required tool '{0}' is not on PATH.")]
    ToolMissing(String),
    /// Process could not be spawned.
    #[error("Failed to run {command}: {source}")]
    Spawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Process exited unsuccessfully.
    #[error("Command failed: {command}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// Command succeeded but printed something other than JSON.
    #[error("Expected JSON output but got: {0}")]
    NotJson(String),
    /// Packaging finished without leaving the expected archive.
    #[error("Expected package at {expected} after packing; zip files present: {found:?}")]
    PackageMissing {
        /// Archive path passed to the packer.
        expected: PathBuf,
        /// Zip files found next to it.
        found: Vec<String>,
    },
    /// Registered tools do not include every expected name.
    #[error("Missing expected tools: {0:?}")]
    MissingTools(Vec<String>),
    /// Env key cannot be turned into a vault secret name.
    #[error("Env key '{0}' cannot be converted to a valid secret name")]
    InvalidSecretName(String),
    /// Secret upload returned no identifier.
    #[error("Secret set succeeded but no URI was returned.")]
    MissingSecretUri,
    /// App setting readback did not match what was written.
    #[error("App setting {setting} was not set correctly on {app} in {resource_group}.")]
    SettingMismatch {
        /// Setting name.
        setting: String,
        /// Function App name.
        app: String,
        /// Resource group of the Function App.
        resource_group: String,
    },
    /// Local file operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Parse a `.env`-style file body into key/value pairs.
///
/// Blank lines, `#` comments and lines without `=` are skipped. A value wrapped in matching
/// single or double quotes is unwrapped.
pub fn parse_env(contents: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        values.insert(key.trim().to_string(), strip_quotes(value.trim()).to_string());
    }
    values
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == bytes[bytes.len() - 1]
        && matches!(bytes[0], b'"' | b'\'')
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Read and parse a `.env` file.
pub fn parse_env_file(path: &Path) -> Result<BTreeMap<String, String>, DeployError> {
    let contents = fs::read_to_string(path).map_err(|source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_env(&contents))
}

/// Map an env key to a Key Vault secret name.
///
/// Known keys use their established names; anything else has characters outside
/// `[A-Za-z0-9-]` replaced by `-`, repeated dashes collapsed and edge dashes trimmed.
pub fn secret_name_for_key(key: &str) -> Result<String, DeployError> {
    if key == crate::abuseipdb::API_KEY_ENV {
        return Ok("AbuseIpDbAPIKey".to_string());
    }

    let mut sanitized = String::with_capacity(key.len());
    for ch in key.chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '-' {
            ch
        } else {
            '-'
        };
        if ch == '-' && sanitized.ends_with('-') {
            continue;
        }
        sanitized.push(ch);
    }
    let sanitized = sanitized.trim_matches('-');
    if sanitized.is_empty() {
        return Err(DeployError::InvalidSecretName(key.to_string()));
    }
    Ok(sanitized.to_string())
}

/// Extract the resource group from an Azure resource id
/// (`/subscriptions/<sub>/resourceGroups/<rg>/providers/...`).
pub fn resource_group_from_id(resource_id: &str) -> Option<&str> {
    let parts: Vec<&str> = resource_id.split('/').collect();
    if parts.len() >= 5
        && parts[1] == "subscriptions"
        && parts[3].eq_ignore_ascii_case("resourcegroups")
    {
        Some(parts[4])
    } else {
        None
    }
}

/// App setting value referencing a vault secret.
pub fn key_vault_reference(secret_uri: &str) -> String {
    format!("@Microsoft.KeyVault(SecretUri={secret_uri})")
}

/// Narrow env values to those starting with `prefix`, then to the names in `keys`.
pub fn select_keys(
    values: &BTreeMap<String, String>,
    prefix: Option<&str>,
    keys: Option<&str>,
) -> BTreeMap<String, String> {
    let wanted: Option<BTreeSet<&str>> = keys.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect()
    });
    values
        .iter()
        .filter(|(key, _)| prefix.is_none_or(|prefix| key.starts_with(prefix)))
        .filter(|(key, _)| {
            wanted
                .as_ref()
                .is_none_or(|wanted| wanted.contains(key.as_str()))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Check that `registry` serves every name in `expected`; returns the registered names.
pub fn validate_tool_names(
    registry: &Registry,
    expected: &[&str],
) -> Result<BTreeSet<String>, DeployError> {
    let names: BTreeSet<String> = registry.names().map(str::to_string).collect();
    let missing: Vec<String> = expected
        .iter()
        .filter(|name| !names.contains(**name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(names)
    } else {
        Err(DeployError::MissingTools(missing))
    }
}

/// Resolve the archive path handed to `func pack`: a path without extension is a directory
/// that receives `src.zip`.
pub fn package_path(output: &Path) -> PathBuf {
    if output.extension().is_some() {
        output.to_path_buf()
    } else {
        output.join("src.zip")
    }
}

/// Locate `name` on `PATH`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| {
            let candidate = dir.join(name);
            let windows = dir.join(format!("{name}.exe"));
            [candidate, windows]
        })
        .find(|candidate| candidate.is_file())
}

fn run(program: &Path, args: &[&str], cwd: Option<&Path>) -> Result<Output, DeployError> {
    let command_line = format!("{} {}", program.display(), args.join(" "));
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    tracing::debug!(command = %command_line, "Running external command");
    let output = command.output().map_err(|source| DeployError::Spawn {
        command: command_line.clone(),
        source,
    })?;
    if !output.status.success() {
        return Err(DeployError::CommandFailed {
            command: command_line,
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Run `func pack` in `source_dir` and return the archive that was produced.
pub fn pack_functions(source_dir: &Path, output: &Path) -> Result<PathBuf, DeployError> {
    let func = find_on_path("func").ok_or_else(|| DeployError::ToolMissing("func".into()))?;
    let package = std::path::absolute(package_path(output)).map_err(|source| DeployError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    let parent = package
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&parent).map_err(|source| DeployError::Io {
        path: parent.clone(),
        source,
    })?;

    let package_arg = package.to_string_lossy().into_owned();
    run(&func, &["pack", "--output", &package_arg], Some(source_dir))?;

    if package.exists() {
        return Ok(package);
    }

    let zips: Vec<PathBuf> = fs::read_dir(&parent)
        .map_err(|source| DeployError::Io {
            path: parent.clone(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "zip"))
        .collect();
    match zips.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(DeployError::PackageMissing {
            expected: package,
            found: zips
                .iter()
                .filter_map(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
        }),
    }
}

/// Thin wrapper over the Azure CLI.
pub struct AzCli {
    program: PathBuf,
}

impl AzCli {
    /// Locate `az` on `PATH`.
    pub fn locate() -> Result<Self, DeployError> {
        let program = find_on_path("az").ok_or_else(|| DeployError::ToolMissing("az".into()))?;
        Ok(Self { program })
    }

    /// Run an `az` command, discarding its output.
    pub fn run(&self, args: &[&str]) -> Result<(), DeployError> {
        run(&self.program, args, None).map(|_| ())
    }

    /// Run an `az` command and parse its standard output as JSON.
    pub fn run_json(&self, args: &[&str]) -> Result<Value, DeployError> {
        let output = run(&self.program, args, None)?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        serde_json::from_str(&stdout).map_err(|_| DeployError::NotJson(stdout))
    }

    /// Store a secret and return its URI.
    pub fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<String, DeployError> {
        let secret = self.run_json(&[
            "keyvault", "secret", "set", "--vault-name", vault, "--name", name, "--value", value,
            "-o", "json",
        ])?;
        secret
            .get("id")
            .or_else(|| secret.get("kid"))
            .and_then(Value::as_str)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .ok_or(DeployError::MissingSecretUri)
    }

    /// Point a Function App setting at a vault secret and confirm the change.
    pub fn apply_key_vault_setting(
        &self,
        app: &str,
        resource_group: &str,
        setting: &str,
        secret_uri: &str,
    ) -> Result<(), DeployError> {
        let reference = key_vault_reference(secret_uri);
        let mut settings = serde_json::Map::new();
        settings.insert(setting.to_string(), Value::String(reference.clone()));

        // A settings file avoids shell parsing of the parentheses and equals sign.
        let file = tempfile_path(setting);
        fs::write(&file, Value::Object(settings).to_string()).map_err(|source| {
            DeployError::Io {
                path: file.clone(),
                source,
            }
        })?;
        let settings_arg = format!("@{}", file.display());
        let applied = self.run(&[
            "functionapp", "config", "appsettings", "set", "--name", app, "--resource-group",
            resource_group, "--settings", &settings_arg,
        ]);
        let _ = fs::remove_file(&file);
        applied?;

        let listed = self.run_json(&[
            "functionapp", "config", "appsettings", "list", "--name", app, "--resource-group",
            resource_group, "-o", "json",
        ])?;
        let matches = listed.as_array().is_some_and(|entries| {
            entries.iter().any(|entry| {
                entry.get("name").and_then(Value::as_str) == Some(setting)
                    && entry.get("value").and_then(Value::as_str) == Some(reference.as_str())
            })
        });
        if !matches {
            return Err(DeployError::SettingMismatch {
                setting: setting.to_string(),
                app: app.to_string(),
                resource_group: resource_group.to_string(),
            });
        }
        Ok(())
    }
}

fn tempfile_path(setting: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "mcptool-appsettings-{setting}-{}.json",
        uuid::Uuid::new_v4()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsing_skips_noise_and_unquotes() {
        let parsed = parse_env(
            "# comment\n\nABUSEIPDB_API_KEY=\"abc=123\"\nAZURE_FUNCTION_NAME='func-app'\nnot a pair\n  SPACED = value \nEMPTY=\nQUOTE=\"\n",
        );
        assert_eq!(parsed["ABUSEIPDB_API_KEY"], "abc=123");
        assert_eq!(parsed["AZURE_FUNCTION_NAME"], "func-app");
        assert_eq!(parsed["SPACED"], "value");
        assert_eq!(parsed["EMPTY"], "");
        assert_eq!(parsed["QUOTE"], "\"");
        assert_eq!(parsed.len(), 5);
    }

    #[test]
    fn secret_names_follow_vault_rules() {
        assert_eq!(
            secret_name_for_key("ABUSEIPDB_API_KEY").unwrap(),
            "AbuseIpDbAPIKey"
        );
        assert_eq!(secret_name_for_key("MY__SECRET_KEY").unwrap(), "MY-SECRET-KEY");
        assert_eq!(secret_name_for_key("_EDGE_").unwrap(), "EDGE");
        assert!(matches!(
            secret_name_for_key("___"),
            Err(DeployError::InvalidSecretName(_))
        ));
    }

    #[test]
    fn resource_group_parsed_from_vault_id() {
        let id = "/subscriptions/0000/resourceGroups/rg-mcp/providers/Microsoft.KeyVault/vaults/kv";
        assert_eq!(resource_group_from_id(id), Some("rg-mcp"));
        assert_eq!(resource_group_from_id("/subscriptions/0000/resourcegroups/rg"), Some("rg"));
        assert_eq!(resource_group_from_id("not-an-id"), None);
        assert_eq!(resource_group_from_id(""), None);
    }

    #[test]
    fn key_selection_applies_prefix_then_list() {
        let values = parse_env("ABUSEIPDB_API_KEY=a\nAZURE_FUNCTION_NAME=b\nAZURE_LOCATION=c\n");

        let all = select_keys(&values, None, None);
        assert_eq!(all.len(), 3);

        let azure = select_keys(&values, Some("AZURE_"), None);
        assert_eq!(azure.keys().collect::<Vec<_>>(), ["AZURE_FUNCTION_NAME", "AZURE_LOCATION"]);

        let picked = select_keys(&values, Some("AZURE_"), Some(" AZURE_LOCATION , ,ABUSEIPDB_API_KEY"));
        assert_eq!(picked.keys().collect::<Vec<_>>(), ["AZURE_LOCATION"]);
    }

    #[test]
    fn package_path_defaults_to_src_zip() {
        assert_eq!(
            package_path(Path::new("artifacts/pack")),
            PathBuf::from("artifacts/pack/src.zip")
        );
        assert_eq!(
            package_path(Path::new("out/app.zip")),
            PathBuf::from("out/app.zip")
        );
    }

    #[test]
    fn default_registry_passes_validation() {
        let names = validate_tool_names(&Registry::with_default_tools(), &EXPECTED_TOOLS)
            .expect("all tools registered");
        assert_eq!(names.len(), EXPECTED_TOOLS.len());

        let err = validate_tool_names(&Registry::new(), &["hello_mcp"]).unwrap_err();
        assert!(matches!(err, DeployError::MissingTools(missing) if missing == ["hello_mcp"]));
    }

    #[test]
    fn key_vault_reference_format() {
        assert_eq!(
            key_vault_reference("https://kv.vault.azure.net/secrets/x/1"),
            "@Microsoft.KeyVault(SecretUri=https://kv.vault.azure.net/secrets/x/1)"
        );
    }
}
