use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use negotiation_analysis::connector::api::{Container, ContainerConfig, ConversationStore, Router};
use negotiation_analysis::Commands;

#[derive(Parser)]
#[command(name = "negotiation-analysis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.negotiation-analysis")]
    data_dir: String,

    /// Prompt template file (defaults to prompts/negotiation_analysis.txt)
    #[arg(long, global = true)]
    prompt_path: Option<String>,

    #[arg(long, global = true, value_enum, default_value = "firestore")]
    store: ConversationStore,

    /// Answer with a canned analysis instead of calling Vertex AI
    #[arg(long, global = true)]
    mock_model: bool,

    /// Vertex AI model, e.g. gemini-1.5-pro
    #[arg(long, global = true)]
    model: Option<String>,

    /// Conversation the memory store starts with (repeatable)
    #[arg(long = "seed-conversation", global = true, value_name = "ID")]
    seed_conversations: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data_dir = expand_tilde(&cli.data_dir);

    let container = Container::new(ContainerConfig {
        data_dir,
        prompt_path: cli.prompt_path,
        store: cli.store,
        mock_model: cli.mock_model,
        model: cli.model,
        seed_conversations: cli.seed_conversations,
    })?;

    let output = Router::new(&container).route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
