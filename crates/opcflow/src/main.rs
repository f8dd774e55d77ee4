mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use opcflow_resources::{Client, RuleStatus};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opc")]
#[command(
    about = "Reconcile load balancers and database instances on Oracle Cloud",
    long_about = None
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Configuration file (default: opc.yaml search path)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage LBaaS load balancers
    #[command(subcommand)]
    Lb(LbCommands),
    /// Manage database service instances
    #[command(subcommand)]
    Db(DbCommands),
    /// Manage database access rules
    #[command(subcommand)]
    AccessRule(AccessRuleCommands),
    /// Manage the SSH key of a database instance
    #[command(subcommand)]
    SshKey(SshKeyCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum LbCommands {
    /// Create a load balancer and wait until it is healthy
    Create {
        name: String,
        /// Region (defaults to the configured region)
        #[arg(short, long)]
        region: Option<String>,
        /// INTERNET_FACING or INTERNAL
        #[arg(long, default_value = "INTERNET_FACING")]
        scheme: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Permitted client CIDR (repeatable)
        #[arg(long = "permit")]
        permitted_clients: Vec<String>,
    },
    /// Show a load balancer
    Show {
        name: String,
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Delete a load balancer and wait until it is gone
    Delete {
        name: String,
        #[arg(short, long)]
        region: Option<String>,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create a database instance and wait until it is running
    Create {
        name: String,
        /// Database version, e.g. 19.0.0.0
        #[arg(long)]
        version: String,
        /// SE, EE, EE_HP or EE_EP
        #[arg(long, default_value = "EE")]
        edition: String,
        #[arg(long)]
        shape: String,
        #[arg(long, default_value = "PAAS")]
        level: String,
        #[arg(long, default_value = "HOURLY")]
        subscription_type: String,
        /// Public key file for VM access
        #[arg(long)]
        ssh_key_file: PathBuf,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show a database instance
    Show { name: String },
    /// Delete a database instance and wait until it is gone
    Delete { name: String },
}

#[derive(Subcommand)]
enum AccessRuleCommands {
    /// Create an access rule and wait until it is listed
    Create {
        /// Database instance name
        instance: String,
        name: String,
        /// Source IPs or group, e.g. PUBLIC-INTERNET
        #[arg(long)]
        source: String,
        #[arg(long, default_value = "DB")]
        destination: String,
        #[arg(long)]
        ports: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Create the rule disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Delete an access rule and wait until it is gone
    Delete { instance: String, name: String },
}

#[derive(Subcommand)]
enum SshKeyCommands {
    /// Replace the VM public key of a database instance
    Set {
        /// Database instance name
        instance: String,
        /// Public key file
        #[arg(long)]
        key_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    // Version needs no configuration
    if matches!(cli.command, Commands::Version) {
        println!("opcflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = opcflow_config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");
    let client = Client::new(config.to_client_config())?;

    let region_of = |region: Option<String>| -> anyhow::Result<String> {
        region
            .or_else(|| config.region.clone())
            .context("No region given. Pass --region or set `region` in opc.yaml")
    };

    match cli.command {
        Commands::Lb(cmd) => match cmd {
            LbCommands::Create {
                name,
                region,
                scheme,
                description,
                permitted_clients,
            } => {
                let region = region_of(region)?;
                commands::lb::create(&client, name, region, scheme, description, permitted_clients)
                    .await?;
            }
            LbCommands::Show { name, region } => {
                commands::lb::show(&client, &region_of(region)?, &name).await?;
            }
            LbCommands::Delete { name, region } => {
                commands::lb::delete(&client, &region_of(region)?, &name).await?;
            }
        },
        Commands::Db(cmd) => match cmd {
            DbCommands::Create {
                name,
                version,
                edition,
                shape,
                level,
                subscription_type,
                ssh_key_file,
                description,
            } => {
                let input = opcflow_resources::CreateDatabaseInput {
                    service_name: name,
                    version,
                    edition,
                    level,
                    shape,
                    subscription_type,
                    vm_public_key_text: commands::read_key_file(&ssh_key_file)?,
                    description,
                    parameters: Vec::new(),
                };
                commands::db::create(&client, input).await?;
            }
            DbCommands::Show { name } => commands::db::show(&client, &name).await?,
            DbCommands::Delete { name } => commands::db::delete(&client, &name).await?,
        },
        Commands::AccessRule(cmd) => match cmd {
            AccessRuleCommands::Create {
                instance,
                name,
                source,
                destination,
                ports,
                description,
                disabled,
            } => {
                let input = opcflow_resources::AccessRuleInput {
                    rule_name: name,
                    description,
                    source,
                    destination,
                    ports,
                    status: if disabled {
                        RuleStatus::Disabled
                    } else {
                        RuleStatus::Enabled
                    },
                };
                commands::access_rule::create(&client, &instance, input).await?;
            }
            AccessRuleCommands::Delete { instance, name } => {
                commands::access_rule::delete(&client, &instance, &name).await?;
            }
        },
        Commands::SshKey(SshKeyCommands::Set { instance, key_file }) => {
            let key = commands::read_key_file(&key_file)?;
            commands::ssh_key::set(&client, &instance, &key).await?;
        }
        Commands::Version => unreachable!("Version is handled before config loading"),
    }

    Ok(())
}
