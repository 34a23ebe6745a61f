//! ProjectTools CLI
//!
//! Command-line interface for organizing profiles, workspaces and projects.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use projecttools_core::{
    AddProjectOptions, AddWorkspaceOptions, AppPaths, ConfigManager, ConfigStore, InitStatus,
    ListProjectsOptions, ProfileManager, ProjectManager, ProjectScope, ProjectStatus,
    RestoreStatus, WorkspaceManager,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pt")]
#[command(about = "ProjectTools - Organize development work into profiles, workspaces and projects")]
#[command(version)]
struct Cli {
    /// Directory holding config.json (default: $PT_HOME or ~/.projecttools)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file if it does not exist
    Init,

    /// Inspect or change the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Manage workspaces in a profile
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },

    /// Manage projects in a workspace
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show a configuration summary
    Show,

    /// Print the configuration file path
    Path,

    /// Change a setting
    Set {
        #[command(subcommand)]
        setting: Setting,
    },

    /// Restore the configuration from its backup
    Restore,
}

#[derive(Subcommand)]
enum Setting {
    /// Root directory for derived workspace paths
    DefaultPath { path: String },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Create a profile (the first one becomes active)
    Add { name: String },

    /// List profiles
    List,

    /// Make a profile active
    Switch { name: String },

    /// Remove a profile
    Remove { name: String },
}

#[derive(Subcommand)]
enum WorkspaceCommand {
    /// Create a workspace
    Add {
        name: String,

        /// Workspace directory (default: <default path>/<profile>/<name>)
        #[arg(long)]
        path: Option<String>,

        /// Target profile (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// List workspaces
    List {
        /// Include every profile
        #[arg(short, long)]
        all: bool,
    },

    /// Remove a workspace (its directory is kept)
    Remove {
        name: String,

        /// Target profile (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Args)]
struct ScopeArgs {
    /// Workspace holding the project
    #[arg(short, long)]
    workspace: Option<String>,

    /// Target profile (default: active profile)
    #[arg(long)]
    profile: Option<String>,
}

impl From<ScopeArgs> for ProjectScope {
    fn from(args: ScopeArgs) -> Self {
        ProjectScope {
            profile: args.profile,
            workspace: args.workspace,
        }
    }
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Register a project in a workspace
    Add {
        name: String,

        /// Owning workspace
        #[arg(short, long)]
        workspace: String,

        /// Project directory (default: <workspace path>/<name>)
        #[arg(long)]
        path: Option<String>,

        /// Target profile (default: active profile)
        #[arg(long)]
        profile: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Project type, e.g. rust, nodejs
        #[arg(long = "type")]
        kind: Option<String>,

        /// Tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List projects
    List {
        #[arg(short, long)]
        workspace: Option<String>,

        #[arg(long)]
        profile: Option<String>,

        /// Only projects carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Include every profile
        #[arg(short, long)]
        all: bool,
    },

    /// Unregister a project (its directory is kept)
    Remove {
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Add a tag to a project
    Tag {
        name: String,
        tag: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Remove a tag from a project
    Untag {
        name: String,
        tag: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Set project status: active, archived or paused
    Status {
        name: String,
        status: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },
}

/// Managers sharing one config store
struct App {
    config: ConfigManager,
    profiles: ProfileManager,
    workspaces: WorkspaceManager,
    projects: ProjectManager,
}

impl App {
    fn new(paths: AppPaths) -> Self {
        let store = Arc::new(ConfigStore::new(paths));
        Self {
            config: ConfigManager::new(store.clone()),
            profiles: ProfileManager::new(store.clone()),
            workspaces: WorkspaceManager::new(store.clone()),
            projects: ProjectManager::new(store),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = cli.config_dir.map(AppPaths::in_dir).unwrap_or_default();
    tracing::debug!(config = ?paths.config_file(), "Using configuration");
    let app = App::new(paths);

    match cli.command {
        Commands::Init => cmd_init(&app).await,
        Commands::Config { command } => cmd_config(&app, command).await,
        Commands::Profile { command } => cmd_profile(&app, command).await,
        Commands::Workspace { command } => cmd_workspace(&app, command).await,
        Commands::Project { command } => cmd_project(&app, command).await,
    }
}

async fn cmd_init(app: &App) -> Result<()> {
    match app.config.init().await? {
        InitStatus::Created => {
            println!("✓ Created configuration at {}", app.config.config_path().display());
            println!();
            println!("Next: pt profile add <name>");
        }
        InitStatus::Existing => {
            println!("Configuration already exists at {}", app.config.config_path().display());
        }
    }
    Ok(())
}

async fn cmd_config(app: &App, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let summary = app.config.show().await?;
            println!("ProjectTools v{}", summary.app_version);
            println!();
            println!("  Config:         {}", summary.config_path.display());
            println!("  Backup:         {}", summary.backup_path.display());
            println!("  Projects path:  {}", summary.default_projects_path);
            println!(
                "  Active profile: {}",
                summary.active_profile.as_deref().unwrap_or("(none)")
            );
            println!(
                "  Contents:       {} profile(s), {} workspace(s), {} project(s)",
                summary.profiles, summary.workspaces, summary.projects
            );
            if summary.first_time_setup {
                println!();
                println!("First-time setup pending. Start with: pt profile add <name>");
            }
        }
        ConfigCommand::Path => {
            println!("{}", app.config.config_path().display());
        }
        ConfigCommand::Set {
            setting: Setting::DefaultPath { path },
        } => {
            let resolved = app.config.set_default_projects_path(&path).await?;
            println!("✓ Default projects path set to {}", resolved.display());
        }
        ConfigCommand::Restore => match app.config.restore().await? {
            RestoreStatus::Restored => {
                println!("✓ Configuration restored from {}", app.config.backup_path().display())
            }
            RestoreStatus::NoBackup => println!("No backup found."),
        },
    }
    Ok(())
}

async fn cmd_profile(app: &App, command: ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::Add { name } => {
            let outcome = app.profiles.add_profile(&name).await?;
            if let Some(original) = &outcome.normalized_from {
                println!("Note: '{}' was normalized to '{}'", original, outcome.name);
            }
            println!("✓ Profile '{}' created", outcome.name);
            if outcome.is_first {
                println!("  Set as active profile.");
                app.config.complete_first_time_setup().await?;
            }
        }
        ProfileCommand::List => {
            let profiles = app.profiles.list_profiles().await?;
            if profiles.is_empty() {
                println!("No profiles yet. Create one with: pt profile add <name>");
                return Ok(());
            }
            for profile in profiles {
                let marker = if profile.is_active { "*" } else { " " };
                println!(
                    "{} {} ({} workspace(s))",
                    marker,
                    profile.name,
                    profile.workspaces.len()
                );
            }
        }
        ProfileCommand::Switch { name } => {
            let name = app.profiles.switch_profile(&name).await?;
            println!("✓ Switched to profile '{}'", name);
        }
        ProfileCommand::Remove { name } => {
            let outcome = app.profiles.remove_profile(&name).await?;
            println!("✓ Profile '{}' removed", outcome.removed);
            match (outcome.was_active, outcome.new_active) {
                (true, Some(next)) => println!("  '{}' is now the active profile.", next),
                (true, None) => println!("  No profiles remain."),
                _ => {}
            }
        }
    }
    Ok(())
}

async fn cmd_workspace(app: &App, command: WorkspaceCommand) -> Result<()> {
    match command {
        WorkspaceCommand::Add {
            name,
            path,
            profile,
        } => {
            let outcome = app
                .workspaces
                .add_workspace(&name, AddWorkspaceOptions { path, profile })
                .await?;
            if let Some(original) = &outcome.normalized_from {
                println!("Note: '{}' was normalized to '{}'", original, outcome.name);
            }
            println!(
                "✓ Workspace '{}' created in profile '{}'",
                outcome.name, outcome.profile
            );
            println!("  Path: {}", outcome.path.display());
        }
        WorkspaceCommand::List { all } => {
            let listings = app.workspaces.list_workspaces(all).await?;
            if listings.is_empty() {
                println!("No active profile. Create one with: pt profile add <name>");
                return Ok(());
            }
            for listing in listings {
                let marker = if listing.is_active { " (active)" } else { "" };
                println!("{}{}", listing.profile, marker);
                if listing.workspaces.is_empty() {
                    println!("  (no workspaces)");
                }
                for workspace in listing.workspaces {
                    let missing = if workspace.exists().await { "" } else { " (missing)" };
                    println!(
                        "  {:<20} {:>3} project(s)  {}{}",
                        workspace.name,
                        workspace.projects.len(),
                        workspace.path,
                        missing
                    );
                }
            }
        }
        WorkspaceCommand::Remove { name, profile } => {
            let removed = app
                .workspaces
                .remove_workspace(&name, profile.as_deref())
                .await?;
            println!("✓ Workspace '{}' removed", removed.name);
            println!("  Directory left in place: {}", removed.path);
        }
    }
    Ok(())
}

async fn cmd_project(app: &App, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add {
            name,
            workspace,
            path,
            profile,
            description,
            kind,
            tags,
        } => {
            let options = AddProjectOptions {
                workspace,
                path,
                profile,
                description,
                kind,
                tags,
            };
            let outcome = app.projects.add_project(&name, options).await?;
            if let Some(original) = &outcome.normalized_from {
                println!("Note: '{}' was normalized to '{}'", original, outcome.name);
            }
            println!(
                "✓ Project '{}' added to {}/{}",
                outcome.name, outcome.profile, outcome.workspace
            );
            println!("  Path: {}", outcome.path.display());
        }
        ProjectCommand::List {
            workspace,
            profile,
            tag,
            all,
        } => {
            let listings = app
                .projects
                .list_projects(ListProjectsOptions {
                    profile,
                    workspace,
                    tag,
                    all,
                })
                .await?;
            if listings.is_empty() {
                println!("No projects found.");
                return Ok(());
            }
            for listing in listings {
                let project = &listing.project;
                let tags = if project.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", project.tags.join(", "))
                };
                println!(
                    "{}/{}/{}  {} ({}){}",
                    listing.profile,
                    listing.workspace,
                    project.name,
                    project.status,
                    project.kind,
                    tags
                );
                println!("  {}", project.path);
            }
        }
        ProjectCommand::Remove { name, scope } => {
            let removed = app.projects.remove_project(&name, scope.into()).await?;
            println!(
                "✓ Project '{}' removed from {}/{}",
                removed.project.name, removed.profile, removed.workspace
            );
        }
        ProjectCommand::Tag { name, tag, scope } => {
            if app.projects.tag_project(&name, &tag, scope.into()).await? {
                println!("✓ Tagged '{}' with '{}'", name, tag.trim());
            } else {
                println!("'{}' already has tag '{}'", name, tag.trim());
            }
        }
        ProjectCommand::Untag { name, tag, scope } => {
            if app.projects.untag_project(&name, &tag, scope.into()).await? {
                println!("✓ Removed tag '{}' from '{}'", tag.trim(), name);
            } else {
                println!("'{}' has no tag '{}'", name, tag.trim());
            }
        }
        ProjectCommand::Status {
            name,
            status,
            scope,
        } => {
            let status: ProjectStatus = status.parse()?;
            let project = app
                .projects
                .set_project_status(&name, status, scope.into())
                .await?;
            println!("✓ Project '{}' is now {}", project.name, project.status);
        }
    }
    Ok(())
}
