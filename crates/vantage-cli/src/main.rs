//! Vantage CLI - project workspace manager

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use vantage_core::access::{AccessControl, RestAccessControl};
use vantage_core::api::{ProjectBackend, RestBackend};
use vantage_core::config::Config;
use vantage_core::project::Project;
use vantage_core::store::ProjectStore;
use vantage_core::validate;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(author, version, about = "Project workspace manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List all projects
    List,

    /// Show a project by system name
    Show {
        /// System name
        system_name: String,
        /// Look up by record identifier instead
        #[arg(long)]
        id: bool,
    },

    /// Create a new project
    Create {
        /// Display name
        name: String,
        /// System name (derived from the display name when omitted)
        #[arg(short, long)]
        system_name: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
        /// Icon color
        #[arg(long)]
        icon_color: Option<String>,
    },

    /// Update an existing project
    Update {
        /// System name of the project to update
        system_name: String,
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New icon name
        #[arg(long)]
        icon: Option<String>,
        /// New icon color
        #[arg(long)]
        icon_color: Option<String>,
    },

    /// Delete a project
    Delete {
        /// System name
        system_name: String,
    },

    /// Search projects by name prefix
    Search {
        /// Query (case-insensitive prefix)
        query: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Key (e.g. api.base_url)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Key (e.g. api.base_url)
        key: String,
        /// Value
        value: String,
    },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vantage=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Projects { action } => {
            let store = connect_store()?;
            cmd_projects(&store, action, cli.format, cli.quiet).await
        }
        Commands::Config { action } => cmd_config(action, cli.quiet),
        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

fn connect_store() -> anyhow::Result<Arc<ProjectStore>> {
    let config = Config::load()?;
    let mut builder = RestBackend::builder()
        .base_url(&config.api.base_url)
        .timeout_secs(config.api.timeout_secs);
    if let Some(token) = config.api.resolved_token()? {
        builder = builder.token(&token);
    }
    let backend: Arc<dyn ProjectBackend> = Arc::new(builder.build()?);
    Ok(Arc::new(ProjectStore::new(backend)))
}

async fn cmd_projects(
    store: &ProjectStore,
    action: ProjectAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        ProjectAction::List => {
            let snapshot = store.reload().await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
                }
                OutputFormat::Text => {
                    if snapshot.is_empty() {
                        if !quiet {
                            println!("No projects found.");
                        }
                        return Ok(());
                    }
                    for project in snapshot.iter() {
                        print_project_line(project);
                    }
                }
            }
        }

        ProjectAction::Show { system_name, id } => {
            let project = if id {
                store.get_by_id(&system_name).await?
            } else {
                store.get_by_system_name(&system_name).await?
            };
            print_project(&project, format)?;
        }

        ProjectAction::Create {
            name,
            system_name,
            description,
            icon,
            icon_color,
        } => {
            if validate::is_reserved(&name) {
                anyhow::bail!("'{}' is a reserved project name", name);
            }
            let system_name = match system_name {
                Some(explicit) => explicit,
                None => store.derive_system_name(&name).await?,
            };
            let mut draft = store.new_draft();
            draft.project_name = Some(name);
            draft.system_name = Some(system_name);
            draft.description = description;
            draft.icon = icon;
            draft.icon_color = icon_color;

            let saved = store.create(&draft).await?;
            if !quiet {
                println!(
                    "Created project '{}'",
                    saved.project_name.as_deref().unwrap_or("")
                );
            }
            print_project(&saved, format)?;
        }

        ProjectAction::Update {
            system_name,
            name,
            description,
            icon,
            icon_color,
        } => {
            let mut project = store.get_by_system_name(&system_name).await?;
            if let Some(name) = name {
                project.project_name = Some(name);
            }
            if let Some(description) = description {
                project.description = Some(description);
            }
            if let Some(icon) = icon {
                project.icon = Some(icon);
            }
            if let Some(icon_color) = icon_color {
                project.icon_color = Some(icon_color);
            }

            let saved = store.persist(&project).await?;
            store.merge(saved.clone()).await;
            if !quiet {
                println!("Updated project '{}'", system_name);
            }
            print_project(&saved, format)?;
        }

        ProjectAction::Delete { system_name } => {
            let project = store.get_by_system_name(&system_name).await?;
            store.delete(&project).await?;
            store.reload().await;
            if !quiet {
                println!("Deleted project '{}'", system_name);
            }
        }

        ProjectAction::Search { query } => {
            let hits = store.search(&query).await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&hits)?);
                }
                OutputFormat::Text => {
                    if hits.is_empty() {
                        if !quiet {
                            println!("No projects match '{}'.", query);
                        }
                        return Ok(());
                    }
                    for project in &hits {
                        print_project_line(project);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_project_line(project: &Project) {
    println!(
        "{:<24} {:<24} {}",
        project.system_name.as_deref().unwrap_or("-"),
        project.project_name.as_deref().unwrap_or("-"),
        project.description.as_deref().unwrap_or("")
    );
}

fn print_project(project: &Project, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(project)?),
        OutputFormat::Text => {
            println!("Name:        {}", project.project_name.as_deref().unwrap_or("-"));
            println!("System name: {}", project.system_name.as_deref().unwrap_or("-"));
            println!("ID:          {}", project.id.as_deref().unwrap_or("-"));
            println!("Description: {}", project.description.as_deref().unwrap_or("-"));
            if let Some(owner) = &project.owner {
                println!(
                    "Owner:       {}",
                    owner.display_name.as_deref().unwrap_or(&owner.system_name)
                );
            }
            if !project.role_memberships.is_empty() {
                println!("Roles:");
                for membership in &project.role_memberships {
                    println!(
                        "  {:<12} {} users, {} groups",
                        membership.role,
                        membership.users.len(),
                        membership.groups.len()
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Vantage Health Check");
        println!("====================");
        println!();
    }

    let mut all_ok = true;

    match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }

            match config.api.resolved_token()? {
                Some(_) => {
                    if !quiet {
                        let redacted = config.api.redacted_token()?.unwrap_or_default();
                        println!("[OK] API Token: Configured ({})", redacted);
                    }
                }
                None => {
                    if !quiet {
                        warn!("API token not configured");
                        println!("[--] API Token: Not configured");
                        println!("     Set the VANTAGE_API_TOKEN environment variable");
                    }
                }
            }

            if !quiet {
                println!("[OK] API Base URL: {}", config.api.base_url);
            }

            match connect_store() {
                Ok(store) => {
                    let snapshot = store.reload().await;
                    if store.snapshot().is_empty() && snapshot.is_empty() {
                        if !quiet {
                            println!("[--] Server: No projects returned (unreachable or empty)");
                        }
                    } else if !quiet {
                        println!("[OK] Server: {} projects", snapshot.len());
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] Server: {}", e);
                    }
                }
            }

            let access = RestAccessControl::new(
                &config.api.base_url,
                config.api.resolved_token()?,
                config.access.entity_access_enabled,
                config.api.timeout_secs,
            )?;
            match access.allowed_actions().await {
                Ok(actions) => {
                    if !quiet {
                        println!("[OK] Permissions: {} actions granted", actions.actions.len());
                    }
                }
                Err(e) => {
                    if !quiet {
                        println!("[--] Permissions: Could not resolve ({})", e);
                    }
                }
            }
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed.");
        } else {
            println!("Some checks failed.");
        }
    }

    if !all_ok {
        std::process::exit(1);
    }
    Ok(())
}
