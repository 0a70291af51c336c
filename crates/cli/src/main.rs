use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::util::taskpilot_home;
use cli::{AppConfig, Command, Session};
use llm::LlmClient;
use std::io::{self, Write};
use std::path::PathBuf;
use todo::{Assistant, TaskStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskpilot")]
#[command(about = "Task manager with natural-language entry and an AI assistant")]
#[command(version)]
struct Cli {
    /// Task file (overrides config and TASKPILOT_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Assistant answer length (overrides MAX_TOKENS and config)
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Assistant sampling temperature (overrides TEMPERATURE and config)
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task: "<text>[, high|normal|low[, school|work|life]]"
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show all tasks
    List,
    /// Show the next 7 days
    Week,
    /// Mark task N done (one-off tasks are deleted)
    Done { number: usize },
    /// Delete every task
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Ask the assistant about your tasks
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Write the tasks as an iCalendar file
    Export {
        /// Output path (default: tasks.ics)
        path: Option<PathBuf>,
    },
}

impl Commands {
    fn into_command(self) -> Command {
        match self {
            Commands::Add { text } => Command::Add(text.join(" ")),
            Commands::List => Command::ShowAll,
            Commands::Week => Command::ShowWeek,
            Commands::Done { number } => Command::Done(Some(number)),
            Commands::Clear { yes } => Command::ClearAll { confirmed: yes },
            Commands::Ask { question } => Command::Ask(question.join(" ")),
            Commands::Export { path } => Command::Export(path),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let home = taskpilot_home();
    let mut config = AppConfig::load(&home)?.with_env(|key| std::env::var(key).ok());
    if let Some(file) = cli.data_file {
        config.data_file = Some(file);
    }
    if cli.no_color {
        config.color = false;
    }
    if let Some(tokens) = cli.max_tokens {
        config.assistant.max_tokens = Some(tokens);
    }
    if let Some(temperature) = cli.temperature {
        config.assistant.temperature = Some(temperature);
    }
    if !config.color {
        colored::control::set_override(false);
    }

    let data_path = config.data_path(&home);
    info!("Using task file {}", data_path.display());
    let store = TaskStore::open(&data_path)?;

    // Без настроенной модели ассистент просто отключается
    let assistant = match LlmClient::from_env() {
        Ok(client) => {
            info!("Assistant provider: {}", client.provider().display_name());
            Some(Assistant::new(client).with_settings(config.generation()))
        }
        Err(e) => {
            info!("Assistant disabled: {}", e);
            None
        }
    };

    let mut session = Session::new(store, assistant);
    let stdin = io::stdin();

    match cli.command {
        Some(command) => {
            let mut out = io::stdout();
            session
                .execute(command.into_command(), &mut stdin.lock(), &mut out)
                .await?;
            out.flush()?;
        }
        None => session.run(stdin.lock(), io::stdout()).await?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}
