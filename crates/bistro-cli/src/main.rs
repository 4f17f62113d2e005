//! bistro CLI: terminal client for the Blue Flame Bistro chat assistant

use bistro_engine::{
    ChatMessage, ClientConfig, Conversation, HttpBackend, DEFAULT_TIMEOUT_SECS, ENDPOINT_ENV,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "bistro=info,bistro_engine=info,bistro_tui=info";

/// Terminal client for the Blue Flame Bistro chat assistant
#[derive(Parser, Debug)]
#[command(name = "bistro")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the chat backend
    #[arg(long, env = ENDPOINT_ENV, global = true)]
    backend_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open the interactive chat (default when no command specified)
    Chat,

    /// Send one message and print the reply and its suggestions
    Ask {
        /// Message to send
        message: String,
    },
}

/// Where log output goes.
#[derive(Debug, PartialEq, Eq)]
enum LogSink {
    /// Nothing is logged.
    Off,
    Stderr,
    File(PathBuf),
}

impl LogSink {
    /// The interactive chat owns the terminal, so it only logs to a file.
    fn for_command(command: &Commands, log_file: Option<&Path>) -> Self {
        match (log_file, command) {
            (Some(path), _) => LogSink::File(path.to_path_buf()),
            (None, Commands::Ask { .. }) => LogSink::Stderr,
            (None, Commands::Chat) => LogSink::Off,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let command = cli.command.unwrap_or(Commands::Chat);
    init_logging(&LogSink::for_command(&command, cli.log_file.as_deref()))?;

    let config =
        ClientConfig::resolve(cli.backend_url.as_deref())?.with_timeout_seconds(cli.timeout)?;
    info!(endpoint = %config.endpoint, timeout = config.timeout_seconds, "Configuration resolved");

    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Chat => {
            let backend = HttpBackend::new(&config)?;
            runtime.block_on(bistro_tui::run_tui(backend))
        }
        Commands::Ask { message } => {
            let output = runtime.block_on(cmd_ask(&config, &message))?;
            print!("{output}");
            Ok(())
        }
    }
}

fn init_logging(sink: &LogSink) -> Result<(), Box<dyn Error>> {
    let (writer, ansi) = match sink {
        LogSink::Off => return Ok(()),
        LogSink::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogSink::File(path) => (BoxMakeWriter::new(Mutex::new(open_log_file(path)?)), false),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi),
        )
        .try_init()?;

    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Send one message and return the text to print.
///
/// Delivery problems are not errors here: the fallback assistant text is
/// returned like any other reply.
async fn cmd_ask(config: &ClientConfig, message: &str) -> Result<String, Box<dyn Error>> {
    let mut conversation = Conversation::new(HttpBackend::new(config)?);

    if !conversation.send_message(Some(message)).await {
        return Err("nothing to send: message is empty".into());
    }

    let reply = conversation
        .transcript()
        .last()
        .ok_or("conversation produced no reply")?;
    Ok(format_reply(reply))
}

fn format_reply(message: &ChatMessage) -> String {
    let mut out = format!("{}\n", message.content());
    for suggestion in message.suggestions() {
        out.push_str("  - ");
        out.push_str(suggestion);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_engine::DELIVERY_FAILURE;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_cli_defaults_to_chat() {
        let cli = Cli::try_parse_from(["bistro"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.timeout, 30);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_cli_parses_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "bistro",
            "ask",
            "When do you open?",
            "--backend-url",
            "http://10.0.0.5:8000",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Ask {
                message: "When do you open?".into()
            })
        );
        assert_eq!(cli.backend_url.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(cli.timeout, 5);
    }

    #[test]
    fn test_cli_rejects_bad_timeout() {
        assert!(Cli::try_parse_from(["bistro", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_log_sink_selection() {
        let ask = Commands::Ask {
            message: "hi".into(),
        };
        assert_eq!(LogSink::for_command(&Commands::Chat, None), LogSink::Off);
        assert_eq!(LogSink::for_command(&ask, None), LogSink::Stderr);

        let path = Path::new("/tmp/bistro.log");
        assert_eq!(
            LogSink::for_command(&Commands::Chat, Some(path)),
            LogSink::File(path.to_path_buf())
        );
    }

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("bistro.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn test_format_reply() {
        let message = ChatMessage::assistant_with_suggestions(
            "We open at 11am",
            vec!["View menu".into(), "Book a table".into()],
        );
        assert_eq!(
            format_reply(&message),
            "We open at 11am\n  - View menu\n  - Book a table\n"
        );
        assert_eq!(format_reply(&ChatMessage::assistant("Hi")), "Hi\n");
    }

    /// Read one HTTP request: headers plus a Content-Length body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some((head, body)) = text.split_once("\r\n\r\n") {
                let length = head
                    .lines()
                    .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(str::to_owned))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if body.len() >= length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_ask_prints_reply_and_suggestions() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let body = r#"{"reply":"We open at 11am","suggestions":["View menu"]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });

        let config = ClientConfig::resolve(Some(&format!("http://{addr}"))).unwrap();
        let output = cmd_ask(&config, "When do you open?").await.unwrap();
        assert_eq!(output, "We open at 11am\n  - View menu\n");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/chat "));
        assert!(request.contains(r#""message":"When do you open?""#));
    }

    #[tokio::test]
    async fn test_ask_unreachable_backend_prints_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::resolve(Some(&format!("http://{addr}"))).unwrap();
        let output = cmd_ask(&config, "Hello").await.unwrap();
        assert_eq!(output, format!("{DELIVERY_FAILURE}\n"));
    }

    #[tokio::test]
    async fn test_ask_empty_message_is_error() {
        let config = ClientConfig::default();
        let err = cmd_ask(&config, "   ").await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
