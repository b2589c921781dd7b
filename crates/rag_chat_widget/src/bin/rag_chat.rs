//! rag-chat: terminal frontend for the RAG chat widget.
//! Reads config, sends one question to the configured server, and prints the
//! streamed answer (or triggers a schema refresh) on stdout.

use rag_chat_client::{config, ChatApiClient};
use rag_chat_widget::{ChatWidget, SubmitOutcome};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

struct Args {
    config: Option<PathBuf>,
    mode: Option<String>,
    refresh_schema: bool,
    question: Option<String>,
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Usage: rag-chat [--config <path>] [--mode <name>] [--refresh-schema] [question]");
    process::exit(1);
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        mode: None,
        refresh_schema: false,
        question: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(value) => args.config = Some(PathBuf::from(value)),
                None => usage_error("--config requires a path"),
            },
            "--mode" => match iter.next() {
                Some(value) => args.mode = Some(value),
                None => usage_error("--mode requires a mode name"),
            },
            "--refresh-schema" => args.refresh_schema = true,
            _ if arg.starts_with("--") => {
                usage_error(&format!("unknown option: {}", arg));
            }
            _ => {
                if args.question.is_some() {
                    usage_error(&format!("unexpected extra argument: {}", arg));
                }
                args.question = Some(arg);
            }
        }
    }
    args
}

fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    // 1. --config <path> flag
    if let Some(path) = flag {
        return path;
    }
    // 2. RAG_CHAT_CONFIG env var
    if let Ok(val) = std::env::var("RAG_CHAT_CONFIG") {
        return PathBuf::from(val);
    }
    // 3. Default path (~/.rag-chat/config.yaml)
    config::default_config_path().unwrap_or_else(|| {
        eprintln!("Error: unable to determine config path (set --config or RAG_CHAT_CONFIG)");
        process::exit(1);
    })
}

fn main() {
    let args = parse_args();
    let config_path = resolve_config_path(args.config);

    let cfg = match config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Error: failed to load config from {}: {}",
                config_path.display(),
                e
            );
            process::exit(1);
        }
    };

    let base_url = cfg
        .api
        .base_url
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let timeout = cfg.api.timeout_secs.map(Duration::from_secs);
    let mode = args
        .mode
        .or(cfg.chat.mode)
        .unwrap_or_else(|| "vector".to_string());

    let client = match ChatApiClient::new(&base_url, timeout) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to build client: {}", e);
            process::exit(1);
        }
    };
    let mut widget = ChatWidget::new(client, mode);

    // Run the async submit on a tokio runtime.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    if args.refresh_schema {
        if !widget.can_refresh_schema() {
            eprintln!(
                "Error: schema refresh is only available in {} mode",
                rag_chat_client::SCHEMA_MODE
            );
            process::exit(1);
        }
        match rt.block_on(widget.refresh_schema()) {
            Ok(()) => println!("Schema refreshed."),
            Err(e) => {
                eprintln!("Error: schema refresh failed: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    // Question from the positional argument, else the first stdin line.
    let question = args.question.unwrap_or_else(|| {
        let stdin = io::stdin();
        let mut line = String::new();
        stdin.lock().read_line(&mut line).unwrap_or(0);
        line.trim().to_string()
    });

    if question.trim().is_empty() {
        eprintln!("Error: no question provided");
        process::exit(1);
    }

    widget.set_input(question);
    let outcome = rt.block_on(widget.submit());

    match outcome {
        SubmitOutcome::Completed => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let answer = widget
                .messages()
                .last()
                .map(|message| message.text.as_str())
                .unwrap_or("");
            let _ = writeln!(out, "{}", answer);
        }
        SubmitOutcome::Failed | SubmitOutcome::InvalidMode => {
            eprintln!("Error: {}", widget.error().unwrap_or("submit failed"));
            process::exit(1);
        }
        SubmitOutcome::EmptyInput | SubmitOutcome::InFlight => {
            eprintln!("Error: nothing to submit");
            process::exit(1);
        }
    }
}
