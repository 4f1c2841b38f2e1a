use clap::Parser;
use dotenvy::dotenv;
use statement_upload::services::notifier::NotificationClient;
use statement_upload::services::uploader::UploadClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload one PDF statement and broadcast its progress.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF statement to upload
    file: PathBuf,

    /// Base URL of the upload server
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Notification socket URL (falls back to WS_URL; no notifications when neither is set)
    #[arg(long)]
    ws_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_statement=info,statement_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ws_url = args
        .ws_url
        .or_else(|| std::env::var("WS_URL").ok())
        .filter(|v| !v.trim().is_empty());

    let mut client = UploadClient::new(&args.server)?;
    info!("📤 Uploading {} to {}", args.file.display(), client.endpoint());

    let notifier = ws_url.map(|url| Arc::new(NotificationClient::new(url)));
    if let Some(notifier) = &notifier {
        // Notifications are best-effort; the upload goes ahead without them
        match notifier.connect().await {
            Ok(()) => client = client.with_notifier(notifier.clone()),
            Err(e) => warn!("Notification socket {} unavailable: {}", notifier.url(), e),
        }
    }

    let result = client.upload_path(&args.file).await;

    if let Some(notifier) = &notifier {
        if let Err(e) = notifier.close().await {
            warn!("Error closing notification socket: {}", e);
        }
    }

    let response = result?;
    info!("{}: {}", response.message, response.filename);
    println!("{}", response.filename);
    Ok(())
}
