use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use hackmatch::client::HackmatchClient;
use hackmatch::config::Config;
use hackmatch::models::{CreateJoinRequestInput, Decision, PartyType};
use hackmatch::{api, db, service::TeamFormation};

#[derive(Parser)]
#[command(name = "hackmatch")]
#[command(about = "Skill-based team formation for hackathons")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the hackmatch server
    Serve {
        /// Port for HTTP API (defaults to HACKMATCH_PORT, then 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check whether a server is answering
    Status,
    /// Show the best counterparts for a participant or team
    Recommend {
        #[arg(long)]
        subject_id: Uuid,
        #[arg(long, value_enum)]
        subject_type: Side,
        /// Number of suggestions (server default when omitted)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Send a join request (participant to team) or an invite (team to participant)
    Request {
        #[arg(long)]
        from: Uuid,
        #[arg(long, value_enum)]
        from_type: Side,
        #[arg(long)]
        to: Uuid,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Accept or reject a pending join request
    Respond {
        request_id: Uuid,
        #[arg(value_enum)]
        decision: Answer,
    },
    /// List a participant's notifications, newest first
    Notifications {
        #[arg(long)]
        recipient: Uuid,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Participant,
    Team,
}

impl From<Side> for PartyType {
    fn from(side: Side) -> Self {
        match side {
            Side::Participant => PartyType::Participant,
            Side::Team => PartyType::Team,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Answer {
    Accept,
    Reject,
}

impl From<Answer> for Decision {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Accept => Decision::Accept,
            Answer::Reject => Decision::Reject,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "hackmatch=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let app = api::create_router_with_config(TeamFormation::new(db), config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("hackmatch server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();
    let client = HackmatchClient::new(config.api_url.clone());

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(&config, port.unwrap_or(config.port)).await?,
        Commands::Status => {
            if client.health().await.unwrap_or(false) {
                println!("hackmatch server is up at {}", config.api_url);
            } else {
                println!("hackmatch server is not reachable at {}", config.api_url);
                std::process::exit(1);
            }
        }
        Commands::Recommend {
            subject_id,
            subject_type,
            k,
        } => {
            let response = client
                .get_recommendations(subject_id, subject_type.into(), k)
                .await?;
            print_json(&response)?;
        }
        Commands::Request {
            from,
            from_type,
            to,
            message,
        } => {
            let created = client
                .create_join_request(&CreateJoinRequestInput {
                    initiator_id: from,
                    initiator_type: from_type.into(),
                    target_id: to,
                    message,
                })
                .await?;
            print_json(&created.request)?;
        }
        Commands::Respond {
            request_id,
            decision,
        } => {
            let resolved = client
                .respond_to_join_request(request_id, decision.into())
                .await?;
            print_json(&resolved.request)?;
        }
        Commands::Notifications { recipient } => {
            let notifications = client.list_notifications(recipient).await?;
            let unread = client.unread_count(recipient).await?;
            println!("{} unread", unread.unread);
            print_json(&notifications)?;
        }
    }

    Ok(())
}
