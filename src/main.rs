use anyhow::Result;
use clap::{Parser, Subcommand};
use codesight::commands::validators;
use codesight::utils::exit_codes;
use codesight::{commands::*, config::Settings, constants};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codesight")]
#[command(about = "Analyze the structure, dependencies and components of a web project")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value_t = constants::config::DEFAULT_CONFIG_FILE.to_string())]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a ZIP archive against the upload limits without extracting it
    Validate {
        /// Path to the archive
        zip: PathBuf,
    },

    /// Shallow-clone a git repository into a new project
    Clone {
        /// HTTPS or SSH repository URL
        url: String,

        /// Project id to use (a random one is generated if omitted)
        #[arg(long)]
        project_id: Option<String>,

        /// Access token for private repositories
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Analyze a project and persist the result
    Analyze {
        /// Project id
        #[arg(short, long)]
        project_id: String,

        /// Archive to extract before analysis (defaults to the uploaded archive)
        #[arg(short, long)]
        zip: Option<PathBuf>,

        /// Write the analysis JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Select the files relevant to a feature request
    Context {
        /// Project id of an analyzed project
        #[arg(short, long)]
        project_id: String,

        /// Feature request, e.g. "add a login form"
        #[arg(required = true)]
        request: Vec<String>,

        /// Output the context as JSON instead of a text digest
        #[arg(long)]
        json: bool,
    },

    /// Remove projects, archives and analyses older than the retention age
    Cleanup {
        /// Override the configured retention age
        #[arg(long)]
        max_age_hours: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let payload = exit_codes::payload_for(&err);
        match serde_json::to_string(&payload) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("Error: {err:#}"),
        }
        std::process::exit(exit_codes::exit_code_for(&err));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load_or_default(&cli.config)?.with_env_overrides();
    let context = CommandContext::new(settings);

    match cli.command {
        Commands::Validate { zip } => {
            validators::validate_zip_path(&zip)?;
            ValidateCommand { zip }.execute(&context).await?;
        }
        Commands::Clone {
            url,
            project_id,
            token,
        } => {
            validators::validate_repository_url(&url)?;
            if let Some(id) = &project_id {
                validators::validate_project_id_arg(id)?;
            }
            CloneCommand {
                url,
                project_id,
                token,
            }
            .execute(&context)
            .await?;
        }
        Commands::Analyze {
            project_id,
            zip,
            output,
        } => {
            validators::validate_project_id_arg(&project_id)?;
            if let Some(zip) = &zip {
                validators::validate_zip_path(zip)?;
            }
            AnalyzeCommand {
                project_id,
                zip,
                output,
            }
            .execute(&context)
            .await?;
        }
        Commands::Context {
            project_id,
            request,
            json,
        } => {
            validators::validate_project_id_arg(&project_id)?;
            validators::validate_feature_request(&request)?;
            ContextCommand {
                project_id,
                request,
                json,
            }
            .execute(&context)
            .await?;
        }
        Commands::Cleanup { max_age_hours } => {
            validators::validate_max_age_hours(max_age_hours)?;
            CleanupCommand { max_age_hours }.execute(&context).await?;
        }
    }

    Ok(())
}
