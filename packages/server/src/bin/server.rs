//! Multiplayer quiz live-session server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quizhall-server -- --admin-password secret
//! cargo run --bin quizhall-server -- --host 0.0.0.0 --port 3000 --seed games.json
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use quizhall_server::{
    domain::QuizRepository,
    infrastructure::repository::{InMemoryQuizRepository, demo_games, load_seed},
    ui::{AppState, Server, SessionSettings},
    usecase::PhaseTiming,
};
use quizhall_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "quizhall-server")]
#[command(about = "Live-session server for multiplayer quiz games", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Password that grants the admin role
    #[arg(long, env = "QUIZHALL_ADMIN_PASSWORD")]
    admin_password: String,

    /// Seconds between "prepare" and each question
    #[arg(long, default_value = "3")]
    prepare_seconds: u64,

    /// Seconds a question accepts answers
    #[arg(long, default_value = "10")]
    question_seconds: u64,

    /// Seconds the results are shown before the next question
    #[arg(long, default_value = "3")]
    results_seconds: u64,

    /// JSON file with games and questions (built-in demo game if omitted)
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Include the answer key in question payloads
    #[arg(long)]
    reveal_answer_key: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. AppState (registry, membership, orchestrator, usecases)
    // 3. Server

    // 1. Create Repository (in-memory database)
    let games = match &args.seed {
        Some(path) => match load_seed(path) {
            Ok(games) => games,
            Err(e) => {
                tracing::error!("Failed to load seed '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => match demo_games() {
            Ok(games) => games,
            Err(e) => {
                tracing::error!("Failed to load demo games: {}", e);
                std::process::exit(1);
            }
        },
    };
    tracing::info!("Loaded {} game(s)", games.len());
    let repository: Arc<dyn QuizRepository> = Arc::new(InMemoryQuizRepository::new(games));

    // 2. Create AppState
    let settings = SessionSettings {
        admin_password: args.admin_password,
        timing: PhaseTiming::from_secs(
            args.prepare_seconds,
            args.question_seconds,
            args.results_seconds,
        ),
        reveal_answer_key: args.reveal_answer_key,
    };
    let state = Arc::new(AppState::new(repository, Arc::new(SystemClock), settings));

    // 3. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
