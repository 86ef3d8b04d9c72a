//! genesis - terminal client for the Genesis RAG assistant

mod commands;
mod config;
mod ui;
mod utils;

use clap::Parser;
use genesis_api::Backend;
use genesis_core::{
    ConnectivityFlag, ConnectivityProbe, ConversationStore, DerivedViews, MessageDispatcher,
    Reachability, RejectReason, SendOutcome, ViewPolicies,
};
use std::sync::Arc;

/// genesis - chat with the Genesis RAG backend
#[derive(Parser, Debug)]
#[command(name = "genesis")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://localhost:8002)
    #[arg(long)]
    backend_url: Option<String>,

    /// Send a single message, print the answer and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Check backend health and exit
    #[arg(long)]
    health: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

/// Everything one session needs, wired to a single store
struct Session {
    dispatcher: MessageDispatcher,
    probe: ConnectivityProbe,
    backend_url: String,
}

impl Session {
    fn new(cfg: &config::Config) -> Self {
        let backend: Arc<dyn Backend> = Arc::new(cfg.http_backend());
        let flag = ConnectivityFlag::new();
        let dispatcher = MessageDispatcher::new(ConversationStore::new(), backend.clone(), flag.clone())
            .with_user_id(cfg.user_id.clone());
        Self {
            dispatcher,
            probe: ConnectivityProbe::new(backend.clone(), flag),
            backend_url: backend.base_url().to_string(),
        }
    }

    fn views(&self) -> DerivedViews {
        DerivedViews::from_snapshot(&self.dispatcher.store().snapshot(), &ViewPolicies::default())
    }
}

fn init_tracing(verbose: bool, use_tui: bool) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = match std::env::var("GENESIS_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) if verbose => EnvFilter::new("genesis=debug,genesis_core=debug,genesis_api=debug"),
        Err(_) => return Ok(()),
    };

    if use_tui {
        // Writing to the terminal would corrupt the screen
        let path = config::Config::log_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // CLI flag beats GENESIS_BACKEND_URL beats the file
    let cfg = config::Config::load().with_backend_url_override(args.backend_url);

    let use_tui = !args.no_tui
        && cfg.tui
        && args.command.is_none()
        && !args.health
        && std::io::IsTerminal::is_terminal(&std::io::stdout());

    init_tracing(args.verbose, use_tui)?;
    tracing::debug!("Using backend {}", cfg.backend_url);

    let session = Session::new(&cfg);

    if args.health {
        return run_health(&session).await;
    }

    if let Some(message) = args.command {
        return run_command(&session, &message).await;
    }

    if use_tui {
        return ui::run_tui(
            session.dispatcher,
            session.probe,
            session.backend_url,
            cfg.health_interval(),
        )
        .await;
    }

    run_interactive(&session).await
}

async fn run_health(session: &Session) -> anyhow::Result<()> {
    match session.probe.check_health().await {
        Reachability::Reachable => {
            println!("Backend at {} is reachable", session.backend_url);
            Ok(())
        }
        Reachability::Unreachable => {
            eprintln!("Backend at {} is not reachable", session.backend_url);
            std::process::exit(1);
        }
    }
}

async fn run_command(session: &Session, message: &str) -> anyhow::Result<()> {
    println!("genesis> {}", message);
    println!();

    match session.dispatcher.send(message).await {
        SendOutcome::Answered(run) => {
            println!("{}", run.final_response);
            println!();
            print!("{}", utils::format_views(&session.views()));
            Ok(())
        }
        SendOutcome::Failed(kind) => {
            eprintln!("{}", kind.user_message(&session.backend_url));
            std::process::exit(1);
        }
        SendOutcome::Rejected(RejectReason::EmptyInput) => anyhow::bail!("Message is empty"),
        SendOutcome::Rejected(RejectReason::AlreadySending) => {
            anyhow::bail!("Another message is already in flight")
        }
    }
}

async fn run_interactive(session: &Session) -> anyhow::Result<()> {
    use crate::commands::{CommandResult, execute_command};
    use std::io::{self, Write};

    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("genesis ({})", session.backend_url);
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    if session.probe.check_health().await == Reachability::Unreachable {
        eprintln!(
            "Warning: backend not reachable at {}. Use /retry once it is up.",
            session.backend_url
        );
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = execute_command(input) {
            match result {
                CommandResult::Clear => {
                    session.dispatcher.store().clear();
                    println!("Cleared conversation.");
                }
                CommandResult::Retry => match session.probe.retry().await {
                    Reachability::Reachable => println!("Backend is reachable."),
                    Reachability::Unreachable => {
                        println!("Backend still not reachable at {}.", session.backend_url)
                    }
                },
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Exit => break,
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        match session.dispatcher.send(input).await {
            SendOutcome::Answered(run) => {
                println!("\n{}\n", run.final_response);
                print!("{}", utils::format_views(&session.views()));
            }
            SendOutcome::Failed(kind) => {
                eprintln!("\n{}", kind.user_message(&session.backend_url));
            }
            SendOutcome::Rejected(reason) => {
                tracing::debug!("Send rejected: {:?}", reason);
            }
        }
        println!();
    }

    Ok(())
}
