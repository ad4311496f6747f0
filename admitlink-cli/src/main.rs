use admit_client::{
    ChatClient, ClientConfig, ConnectionPool, ConnectionState, HttpApi, SendPolicy,
    SubscriptionStrategy, TypingAnnouncer, WsTransport,
};
use admit_wire::{Role, RoomKey, ServerEvent, Session};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "admitlink-cli")]
#[command(about = "Admitlink Chat Terminal")]
struct Cli {
    /// Base URL of the durable REST API.
    #[arg(long, default_value = "http://localhost:8080/api")]
    api_url: String,
    /// URL of the live socket endpoint.
    #[arg(long, default_value = "ws://localhost:8080/live")]
    live_url: String,
    /// Session bearer token.
    #[arg(long)]
    token: String,
    #[arg(long)]
    user_id: i64,
    #[arg(long, default_value = "Applicant")]
    name: String,
    /// user, admin or reviewer.
    #[arg(long, default_value = "user")]
    role: String,
    /// Counterparty user id (the applicant when running as admin).
    #[arg(long)]
    counterparty: i64,
}

fn parse_role(raw: &str) -> anyhow::Result<Role> {
    match raw {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        "reviewer" => Ok(Role::Reviewer),
        other => anyhow::bail!("unknown role '{}', expected user, admin or reviewer", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let role = parse_role(&cli.role)?;

    info!("=== Admitlink Chat Terminal ===");
    info!("User {} ({}) as {}", cli.user_id, cli.name, role);

    let config = ClientConfig {
        api_url: cli.api_url.clone(),
        live_url: cli.live_url.clone(),
        ..Default::default()
    };
    let session = Session::new(cli.user_id, cli.name.clone(), role, cli.token.clone());

    let pool = ConnectionPool::new(config.clone(), Arc::new(WsTransport));
    let api = Arc::new(HttpApi::new(&config, cli.token.clone())?);
    let (client, mut toasts) = ChatClient::new(
        &pool,
        api,
        session,
        &config,
        SubscriptionStrategy::PerRoom,
        SendPolicy::ConfirmThenDisplay,
    );
    let _ = client.spawn_event_loop();

    // Admin conversations are keyed by the applicant's id on both ends.
    let applicant = if role == Role::User {
        cli.user_id
    } else {
        cli.counterparty
    };
    let room = RoomKey::direct(Role::Admin, applicant);

    loop {
        match client.connection().state() {
            ConnectionState::Open => break,
            ConnectionState::Closed => {
                anyhow::bail!("live connection gave up; check --live-url and retry")
            }
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
    if !client.rooms.join(room.clone()).await {
        warn!("Join for {} was dropped, retry after the connection settles", room);
    }

    let count = client.load_history(&admit_client::HistoryScope::Room(room.clone())).await?;
    info!("Loaded {} messages for {}", count, room);
    for message in client.store.messages(&admit_client::HistoryScope::Room(room.clone())) {
        println!("[{}] {}: {}", message.timestamp.format("%H:%M"), message.sender, message.content);
    }

    let mut events = client.connection().subscribe();
    let me = cli.user_id;
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ServerEvent::Message { message } if message.sender != me => {
                    println!(
                        "[{}] {}: {}",
                        message.timestamp.format("%H:%M"),
                        message.sender,
                        message.content
                    );
                }
                ServerEvent::Typing { user_id, is_typing } if user_id != me && is_typing => {
                    println!("... {} is typing", user_id);
                }
                ServerEvent::Presence { user_id, online } if user_id != me => {
                    println!("* {} is {}", user_id, if online { "online" } else { "offline" });
                }
                _ => {}
            }
        }
    });

    tokio::spawn(async move {
        while let Some(notification) = toasts.recv().await {
            println!("🔔 {}: {}", notification.title, notification.message);
        }
    });

    // Automatic reconnects do not replay join intents; re-issue them when
    // the connection comes back.
    let rejoin_rooms = client.rooms.clone();
    let rejoin_conn = client.connection().clone();
    tokio::spawn(async move {
        let mut was_open = true;
        loop {
            tokio::time::sleep(Duration::from_millis(500)).await;
            match rejoin_conn.state() {
                ConnectionState::Open => {
                    if !was_open {
                        let sent = rejoin_rooms.rejoin_all().await;
                        info!("Rejoined {} room(s) after reconnect", sent);
                    }
                    was_open = true;
                }
                ConnectionState::Closed => {
                    warn!("Live connection closed; restart to reconnect");
                    break;
                }
                _ => was_open = false,
            }
        }
    });

    let announcer = TypingAnnouncer::new(
        client.connection().clone(),
        room.clone(),
        cli.user_id,
        Duration::from_millis(config.typing_quiet_ms),
    );

    info!("Type a message and press enter; Ctrl-D to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        announcer.keystroke().await;
        match client.composer().send(&room, &line, cli.counterparty).await {
            Ok(message) => info!("Sent message {}", message.id),
            Err(e) => warn!("Send failed: {}", e),
        }
    }

    client.connection().disconnect();
    Ok(())
}
