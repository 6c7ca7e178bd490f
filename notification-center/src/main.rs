//! Notification center terminal host.
//!
//! Mounts the panel against the admin GraphQL endpoint (or a JSON fixture)
//! and drives it from stdin:
//!
//! ```text
//! t <id>   toggle read state      c   mark all as read
//! u        show unread / all      j/k scroll down / up
//! r        refetch now            q   close
//! ```

use anyhow::Context;
use clap::Parser;
use notification_center::app::{FixedAnchor, Message, PanelProps};
use notification_center::constants::panel::DEFAULT_X_OFFSET;
use notification_center::list::{LineWrapMeasurer, Viewport};
use notification_center::terminal::{self, HostCommand};
use notification_center::{i18n, mount, Config};
use admin_query::{GraphqlClient, MemoryQueryService, QueryService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Command-line arguments for the terminal host.
#[derive(Debug, Parser)]
#[command(name = "notification-center", version, about)]
struct Args {
    /// GraphQL endpoint (overrides the configured one)
    #[arg(long)]
    endpoint: Option<String>,

    /// Serve notifications from a JSON snapshot instead of the network
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Poll interval in seconds (overrides the configured one)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Panel width in pixels
    #[arg(long, default_value_t = 560.0)]
    width: f32,

    /// Panel height in pixels
    #[arg(long, default_value_t = 580.0)]
    height: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notification_center=debug".parse()?),
        )
        .init();

    i18n::init_from_desktop();

    let args = Args::parse();
    let mut config = Config::load();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = args.interval_secs {
        config.poll_interval_ms = secs.saturating_mul(1000);
    }
    let config = config.sanitized();

    let service: Arc<dyn QueryService> = match &args.fixture {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading fixture {}", path.display()))?;
            let service = MemoryQueryService::from_json(&json)
                .with_context(|| format!("parsing fixture {}", path.display()))?;
            tracing::info!("Serving notifications from {}", path.display());
            Arc::new(service)
        }
        None => {
            let client = GraphqlClient::new(&config.endpoint)
                .with_context(|| format!("creating client for {}", config.endpoint))?;
            tracing::info!("Querying {}", config.endpoint);
            Arc::new(client)
        }
    };

    let props = PanelProps {
        close: Arc::new(|| tracing::info!("Panel closed")),
        refetch_has_unread_header: Arc::new(|| tracing::info!("Header unread indicator refreshed")),
        has_unread_prop: false,
        anchor: Arc::new(FixedAnchor(DEFAULT_X_OFFSET)),
    };

    tracing::info!("Starting notification center");
    let handle = mount(service, props, &config, LineWrapMeasurer::default());
    handle.send(Message::Resized(Viewport::new(args.width, args.height)));

    let mut views = handle.views();
    let printer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let text = terminal::render(&views.borrow_and_update(), chrono::Utc::now());
            println!("{}", text);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let Some(command) = HostCommand::parse(&line) else {
            eprintln!("unknown command: {}", line.trim());
            continue;
        };
        if command == HostCommand::Quit {
            break;
        }
        match command.into_message(&handle.current()) {
            Some(message) => {
                handle.send(message);
            }
            None => eprintln!("no such notification in view"),
        }
    }

    handle.send(Message::Close);
    handle.wait().await;
    printer.await.context("view printer")?;
    Ok(())
}
