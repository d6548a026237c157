use conversation_hub::config::{ConversationConfig, ServerConfig};
use conversation_hub::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server_config = ServerConfig::from_env()?;
    let conversation_config = ConversationConfig::from_env()?;

    eprintln!("💬 Conversation Hub v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Process API: http://{}/api/conversation/process",
        server_config.socket_addr()
    );
    eprintln!("   WebSocket: ws://{}/api/websocket", server_config.socket_addr());
    eprintln!(
        "   Intents: {} configured, {} scripted responses\n",
        conversation_config.intents.len(),
        conversation_config.responses.len()
    );

    let state = AppState::new(conversation_config);
    server::serve(state, server_config).await?;

    Ok(())
}
