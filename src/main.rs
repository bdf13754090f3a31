use bookmarks_chat::client::Client;
use bookmarks_chat::config::ClientConfig;
use bookmarks_chat::http::UreqHttpClient;
use bookmarks_chat::socket::FeedSocketFactory;
use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

// Interactive chat session against a Bookmarks Forums backend.
//
// Usage:
//   cargo run --bin bmchat -- --user alice
//   cargo run --bin bmchat -- --user alice --host forums.example.com:8080

#[derive(Parser, Debug)]
#[command(name = "bmchat", about = "Bookmarks Forums chat client")]
struct Args {
    /// Username to open the session as
    #[arg(short, long)]
    user: String,

    /// Backend host serving the REST API and the live feed
    #[arg(long, default_value = "localhost:8080")]
    host: String,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    rt.block_on(async {
        let config = ClientConfig::for_host(&args.host);
        let transport_factory = Arc::new(FeedSocketFactory::new(config.feed_url.clone()));
        let http_client = Arc::new(UreqHttpClient::new());
        let client = Client::new(
            args.user.as_str().into(),
            config,
            transport_factory,
            http_client,
        );

        let mut messages = client.event_bus.message.subscribe();
        let printer = tokio::spawn(async move {
            while let Ok(message) = messages.recv().await {
                println!(
                    "[{}] {}: {}",
                    message.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                    message.sender,
                    message.content
                );
            }
        });

        let mut redirects = client.event_bus.error_redirect.subscribe();
        tokio::spawn(async move {
            while let Ok(redirect) = redirects.recv().await {
                error!("{} ({}): {}", redirect.title, redirect.code, redirect.description);
            }
        });

        let mut auth = client.event_bus.auth_required.subscribe();
        tokio::spawn(async move {
            if auth.recv().await.is_ok() {
                error!("Session expired, please log in again.");
            }
        });

        let runner = client.clone();
        tokio::spawn(async move { runner.run().await });

        if let Err(e) = client.load_conversations().await {
            error!("Could not load conversations: {e}");
        }
        print_list(&client).await;

        println!(
            "Commands: /list, /more, /open <id>, /chat <user>, /close, /delete <id>, /yes, /no, /quit."
        );
        println!("Anything else is sent to the open conversation.");

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Ok(Some(line)) = line else { break };
                    if handle_command(&client, line.trim()).await {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        client.disconnect().await;
        printer.abort();
        info!("Session closed.");
    });
}

async fn handle_command(client: &Arc<Client>, line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    let (command, rest) = line
        .split_once(' ')
        .map(|(c, rest)| (c, rest.trim()))
        .unwrap_or((line, ""));
    match (command, rest) {
        ("/quit", _) => return true,
        ("/list", _) => print_list(client).await,
        ("/more", _) => {
            if client.load_conversations().await.is_ok() {
                print_list(client).await;
            }
        }
        ("/open", id) => match id.parse() {
            Ok(id) => {
                if client.open_conversation(id).await.is_ok() {
                    print_transcript(client).await;
                }
            }
            Err(_) => println!("Usage: /open <id>"),
        },
        ("/chat", user) if !user.is_empty() => {
            if client.open_chat_with(user.into()).await.is_ok() {
                print_transcript(client).await;
            }
        }
        ("/chat", _) => println!("Usage: /chat <user>"),
        ("/close", _) => client.close_conversation().await,
        ("/delete", id) => match id.parse() {
            Ok(id) => {
                client.request_delete(id).await;
                println!("Delete conversation {id}? (/yes or /no)");
            }
            Err(_) => println!("Usage: /delete <id>"),
        },
        ("/yes", _) => {
            if client.confirm_pending().await.is_ok() {
                print_list(client).await;
            }
        }
        ("/no", _) => client.cancel_pending().await,
        _ => {
            let _ = client.send_message(line).await;
        }
    }
    false
}

async fn print_list(client: &Arc<Client>) {
    let conversations = client.conversations().await;
    if conversations.is_empty() {
        println!("(no conversations)");
        return;
    }
    let local = client.local().clone();
    for conv in conversations {
        let id = if conv.is_placeholder() {
            "new".to_string()
        } else {
            conv.id.to_string()
        };
        let unread = if conv.unread_count > 0 {
            format!(" ({} unread)", conv.unread_count)
        } else {
            String::new()
        };
        println!("  [{id}] {}{unread}", conv.counterpart_of(&local));
    }
}

async fn print_transcript(client: &Arc<Client>) {
    let Some(conv) = client.active_conversation().await else {
        println!("(no open conversation)");
        return;
    };
    let local = client.local().clone();
    println!("--- {} ---", conv.counterpart_of(&local));
    for message in &conv.messages {
        println!(
            "[{}] {}: {}",
            message.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            message.sender,
            message.content
        );
    }
}
