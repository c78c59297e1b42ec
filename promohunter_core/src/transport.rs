use crate::chat::{ChatTransport, IncomingMessage};
use crate::error::TransportError;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader as AsyncBufReader, Stdout};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

/// Chat id used for every console message.
pub const CONSOLE_CHAT_ID: i64 = 0;

/// Console chat transport: one message per stdin line, replies on stdout.
pub struct StdioTransport<W = Stdout> {
    rx: mpsc::UnboundedReceiver<String>,
    writer: Mutex<W>,
}

impl StdioTransport<Stdout> {
    /// Start reading stdin in the background.
    pub fn new() -> Self {
        info!("Starting stdio transport");

        let (tx, rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let mut reader = AsyncBufReader::new(stdin);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("EOF reached on stdin");
                        break;
                    }
                    Ok(_) => {
                        if !line.trim().is_empty() {
                            if let Err(e) = tx.send(line.trim().to_string()) {
                                error!("Failed to send line: {}", e);
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Error reading from stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Self::with_parts(rx, tokio::io::stdout())
    }
}

impl Default for StdioTransport<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StdioTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Build from an existing line source and writer.
    pub fn with_parts(rx: mpsc::UnboundedReceiver<String>, writer: W) -> Self {
        Self {
            rx,
            writer: Mutex::new(writer),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    async fn write_block(&self, block: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(block.trim_end().as_bytes()).await?;
        writer.write_all(b"\n\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> ChatTransport for StdioTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &'static str {
        "stdio"
    }

    async fn next_message(&mut self) -> Result<Option<IncomingMessage>, TransportError> {
        Ok(self.rx.recv().await.map(|text| IncomingMessage {
            chat_id: CONSOLE_CHAT_ID,
            user: None,
            text,
        }))
    }

    async fn send_text(&self, _chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.write_block(text).await
    }

    async fn send_photo(&self, _chat_id: i64, url: &str, caption: &str) -> Result<(), TransportError> {
        self.write_block(&format!("🖼️ {}\n{}", url, caption)).await
    }
}
