use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "sheet-translator")]
#[command(about = "Submit Excel files to a translation server and follow the job", long_about = None)]
struct Cli {
    /// Translation server base URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Client configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Follow progress over the server's event stream instead of polling
    #[arg(long, global = true)]
    stream: bool,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a spreadsheet and follow the translation until it ends
    Translate(TranslateArgs),
    /// Show the first rows of a spreadsheet as the server reads them
    Preview {
        file: PathBuf,
    },
    /// List past translations
    History,
    /// Delete all translation history on the server
    ClearHistory,
    /// Fetch a translated file
    Download {
        filename: String,
        /// Directory to write into (defaults to the current directory)
        #[arg(long)]
        save_to: Option<PathBuf>,
    },
    /// Inspect or change saved preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args)]
pub struct TranslateArgs {
    pub file: PathBuf,
    /// Source language (defaults to the saved preference)
    #[arg(long)]
    pub source: Option<String>,
    /// First target language, written to column C
    #[arg(long)]
    pub target: Option<String>,
    /// Second target language, written to column D
    #[arg(long)]
    pub target2: Option<String>,
    /// Subject domain hint, e.g. "Restaurant"
    #[arg(long)]
    pub domain: Option<String>,
    /// Save the translated file into this directory
    #[arg(long)]
    pub save_to: Option<PathBuf>,
    /// Open the download link in the browser
    #[arg(long)]
    pub open: bool,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the saved settings as JSON
    Show {
        /// Print the API key unmasked
        #[arg(long)]
        reveal: bool,
    },
    /// Update one or more saved settings
    Set(SettingsUpdate),
}

#[derive(Args)]
pub struct SettingsUpdate {
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub target: Option<String>,
    /// light or dark
    #[arg(long)]
    pub theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.server, cli.stream)?;
    let mut ctx = commands::Context::new(config, cli.yes)?;

    match cli.command {
        Commands::Translate(args) => ctx.translate(args).await?,
        Commands::Preview { file } => ctx.preview(&file).await?,
        Commands::History => ctx.history().await,
        Commands::ClearHistory => ctx.clear_history().await?,
        Commands::Download { filename, save_to } => {
            ctx.download(&filename, save_to.as_deref()).await?
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show { reveal } => ctx.show_settings(reveal)?,
            SettingsAction::Set(update) => ctx.update_settings(update)?,
        },
    }

    Ok(())
}
