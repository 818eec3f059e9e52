use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mcptool::{
    deploy::{self, AzCli, EXPECTED_TOOLS},
    tools::Registry,
};

#[derive(Parser)]
#[command(
    name = "mcptool-deploy",
    about = "Packaging and secret provisioning for MCPTool deployments"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the Functions package and check that every tool is registered.
    Pack {
        /// Functions app source directory.
        #[arg(long, default_value = ".")]
        source: PathBuf,
        /// Archive path; a path without extension receives `src.zip`.
        #[arg(long, default_value = "artifacts/pack/src.zip")]
        output: PathBuf,
    },
    /// Upload `.env` values to Key Vault and reference them from Function App settings.
    PushSecrets {
        /// Target Key Vault name.
        #[arg(long)]
        vault_name: String,
        /// `.env` file to read.
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        /// Comma-separated keys to push.
        #[arg(long)]
        keys: Option<String>,
        /// Only push keys starting with this prefix.
        #[arg(long)]
        prefix: Option<String>,
        /// Function App to update; defaults to `AZURE_FUNCTION_NAME` from the env file.
        #[arg(long)]
        function_app_name: Option<String>,
        /// Resource group of the Function App.
        #[arg(long)]
        resource_group: Option<String>,
        /// App setting name; defaults to the env key being pushed.
        #[arg(long)]
        app_setting_name: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .compact()
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Pack { source, output } => pack(source, output),
        Command::PushSecrets {
            vault_name,
            env_file,
            keys,
            prefix,
            function_app_name,
            resource_group,
            app_setting_name,
        } => push_secrets(PushSecrets {
            vault_name,
            env_file,
            keys,
            prefix,
            function_app_name,
            resource_group,
            app_setting_name,
        }),
    }
}

fn pack(source: PathBuf, output: PathBuf) -> Result<()> {
    let package = deploy::pack_functions(&source, &output)
        .with_context(|| format!("failed to pack {}", source.display()))?;
    println!("Pack succeeded: {}", package.display());

    match deploy::validate_tool_names(&Registry::with_default_tools(), &EXPECTED_TOOLS) {
        Ok(names) => {
            let names: Vec<_> = names.into_iter().collect();
            println!("Tools discovered: {}", names.join(", "));
        }
        Err(err) => {
            println!("Validation warning: {err}");
            println!(
                "Proceeding without validation. Ensure your tools are discoverable in the packed artifact."
            );
        }
    }
    Ok(())
}

struct PushSecrets {
    vault_name: String,
    env_file: PathBuf,
    keys: Option<String>,
    prefix: Option<String>,
    function_app_name: Option<String>,
    resource_group: Option<String>,
    app_setting_name: Option<String>,
}

fn push_secrets(args: PushSecrets) -> Result<()> {
    if !args.env_file.is_file() {
        bail!("Env file not found: {}", args.env_file.display());
    }
    let env_values = deploy::parse_env_file(&args.env_file)?;
    if env_values.is_empty() {
        bail!("No key=value pairs found in env file");
    }

    let selected = deploy::select_keys(&env_values, args.prefix.as_deref(), args.keys.as_deref());
    if selected.is_empty() {
        bail!("No keys selected for upload");
    }

    let function_app = args
        .function_app_name
        .or_else(|| env_values.get("AZURE_FUNCTION_NAME").cloned())
        .filter(|name| !name.is_empty());
    let resource_group = args
        .resource_group
        .or_else(|| {
            env_values
                .get("KEY_VAULT_RESOURCE_ID")
                .and_then(|id| deploy::resource_group_from_id(id))
                .map(str::to_string)
        })
        .or_else(|| env_values.get("RESOURCE_GROUP_NAME").cloned())
        .filter(|name| !name.is_empty());

    let az = AzCli::locate()?;
    for (key, value) in &selected {
        let secret_name = deploy::secret_name_for_key(key)?;
        let secret_uri = az
            .set_secret(&args.vault_name, &secret_name, value)
            .with_context(|| format!("failed to upload {key}"))?;
        println!(
            "Uploaded {key} as {secret_name} to Key Vault {}",
            args.vault_name
        );

        let (Some(app), Some(group)) = (function_app.as_deref(), resource_group.as_deref()) else {
            println!("Function App name or resource group not provided; skipped app setting update.");
            continue;
        };
        let setting = args.app_setting_name.as_deref().unwrap_or(key);
        az.apply_key_vault_setting(app, group, setting, &secret_uri)?;
        println!("Applied app setting {setting} -> Key Vault reference for {app} (RG: {group}).");
    }
    Ok(())
}
