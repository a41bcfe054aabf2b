use clap::{Parser, Subcommand};
use lib::chat::ModelConfig;
use lib::llm::OllamaClient;
use lib::poller::Poller;
use lib::session::ChatSession;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "localchat")]
#[command(about = "Local Chatbot — chat with a locally running Ollama server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the web server (browser UI + JSON API).
    Serve {
        /// Config file path (default: LOCALCHAT_CONFIG_PATH or ~/.localchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 7171)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with the backend in the terminal (no browser needed).
    Chat {
        /// Config file path (default: LOCALCHAT_CONFIG_PATH or ~/.localchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("localchat {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!(
        "starting server on {}:{}",
        config.server.bind,
        config.server.port
    );
    lib::web::run_server(config).await
}

async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, BufRead, Write};

    let config = lib::config::load_config(config_path)?;
    let backend = OllamaClient::new(lib::config::resolve_ollama_base_url(&config));
    let session = Arc::new(ChatSession::new(ModelConfig {
        model_name: lib::config::resolve_default_model(&config).unwrap_or_default(),
        temperature: config.chat.temperature,
        max_tokens: config.chat.max_tokens,
    }));
    let poller = Poller::start(
        session.clone(),
        backend.clone(),
        Duration::from_secs(config.chat.poll_interval_secs.max(1)),
    );

    println!("Local Chatbot (backend: {})", backend.base_url());
    println!("Type a message; /clear resets the conversation, /quit exits.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/quit") {
            break;
        }
        if input.eq_ignore_ascii_case("/clear") {
            session.clear().await;
            println!("(conversation cleared)");
            continue;
        }

        lib::turn::run_turn(session.as_ref(), &backend, input).await;
        let conversation = session.conversation().await;
        if let Some(error) = conversation.error {
            println!("error: {}", error);
        } else if let Some(reply) = conversation.messages.last() {
            println!("{}", reply.content);
        }
    }

    poller.stop();
    Ok(())
}
