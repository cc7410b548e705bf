//! Chat client session: handshake, then relay between terminal and server.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
};

use linechat_shared::{line::LineReader, protocol::is_rejection};

use crate::{
    error::ClientError,
    ui::{CHAT_PROMPT, print_incoming},
};

/// Join `host` and `port` into a connectable address, bracketing IPv6 hosts.
pub fn server_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Connect to `addr` and run an interactive session until either side quits.
pub async fn run_client(addr: &str) -> Result<(), ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    tracing::info!("Connected to server {}", addr);

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = LineReader::new(read_half);

    let chatting = Arc::new(AtomicBool::new(false));
    let mut input = spawn_input_thread(chatting.clone());

    let nickname = handshake(&mut reader, &mut write_half, &mut input).await?;
    chatting.store(true, Ordering::Relaxed);
    println!("Connected to chat as {}", nickname);
    println!("Type your messages. Press Ctrl+C to exit.");

    chat(reader, write_half, input).await
}

/// Answer the server's secret and nickname prompts with lines typed by the user.
///
/// Returns the trimmed nickname. A reply carrying the rejection marker ends
/// the handshake with [`ClientError::Rejected`].
pub async fn handshake<R, W>(
    reader: &mut LineReader<R>,
    writer: &mut W,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<String, ClientError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let prompt = reader.next_line().await?.ok_or(ClientError::ServerClosed)?;
    println!("{}", prompt);

    let secret = input.recv().await.ok_or(ClientError::InputClosed)?;
    send_line(writer, &secret).await?;

    let reply = reader.next_line().await?.ok_or(ClientError::ServerClosed)?;
    println!("{}", reply);
    if is_rejection(&reply) {
        return Err(ClientError::Rejected(reply));
    }

    let nickname = input.recv().await.ok_or(ClientError::InputClosed)?;
    send_line(writer, &nickname).await?;

    Ok(nickname.trim().to_string())
}

/// Print every server line and send every non-empty typed line.
///
/// Ends normally when the server closes the connection or the user closes
/// the input (Ctrl+C / Ctrl+D).
pub async fn chat<R, W>(
    mut reader: LineReader<R>,
    mut writer: W,
    mut input: mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            received = reader.next_line() => match received? {
                Some(line) => print_incoming(&line),
                None => {
                    println!("\nServer closed the connection.");
                    return Ok(());
                }
            },
            typed = input.recv() => match typed {
                Some(line) if line.is_empty() => {}
                Some(line) => send_line(&mut writer, &line).await?,
                None => {
                    println!("\nClosing connection...");
                    if let Err(e) = writer.shutdown().await {
                        tracing::debug!("Failed to shut down connection: {}", e);
                    }
                    return Ok(());
                }
            },
        }
    }
}

async fn send_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.flush().await
}

/// Read terminal input on a dedicated thread (rustyline is synchronous).
///
/// The channel closes when the user presses Ctrl+C or Ctrl+D.
fn spawn_input_thread(chatting: Arc<AtomicBool>) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            let in_chat = chatting.load(Ordering::Relaxed);
            let prompt = if in_chat { CHAT_PROMPT } else { "" };
            match rl.readline(prompt) {
                Ok(line) => {
                    if in_chat && !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str()).ok();
                    }
                    if input_tx.send(line).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Received interrupt signal");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
