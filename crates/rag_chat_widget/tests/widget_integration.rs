//! Integration tests for the chat widget submit cycle against a scripted
//! in-process HTTP/SSE server. No mocks.

use std::sync::{Arc, Mutex};

use rag_chat_client::ChatApiClient;
use rag_chat_widget::{ChatWidget, Sender, SubmitOutcome};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read one HTTP request (head plus `Content-Length` body) off the socket.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let n = socket.read(&mut tmp).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
        let text = String::from_utf8_lossy(&buf).into_owned();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Spawn a server that answers the k-th connection with the k-th script
/// (repeating the last one), recording every raw request.
fn spawn_scripted_server(scripts: Vec<&'static str>) -> (String, Arc<Mutex<Vec<String>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let requests_clone = Arc::clone(&requests);
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let listener = TcpListener::from_std(listener).unwrap();
        let mut served = 0usize;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let request = read_request(&mut socket).await;
            requests_clone.lock().unwrap().push(request);
            let script = scripts[served.min(scripts.len() - 1)];
            served += 1;
            let _ = socket.write_all(script.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (base_url, requests)
}

/// Extract the JSON body of a recorded request.
fn request_body(raw: &str) -> serde_json::Value {
    let body = raw.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("");
    serde_json::from_str(body).expect("request body should be JSON")
}

const STREAM_HI: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/event-stream\r\n\
Connection: close\r\n\
\r\n\
data: {\"ops\":[{\"op\":\"replace\",\"path\":\"\",\"value\":{\"final_output\":null,\"streamed_output\":[]}}]}\n\n\
data: {\"ops\":[{\"op\":\"replace\",\"path\":\"/final_output\",\"value\":\"Hi\"}]}\n\n\
data: {\"ops\":[{\"op\":\"replace\",\"path\":\"/final_output\",\"value\":\"Hi there!\"}]}\n\n";

const STREAM_42: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/event-stream\r\n\
Connection: close\r\n\
\r\n\
data: {\"ops\":[{\"op\":\"replace\",\"path\":\"\",\"value\":{\"final_output\":\"42\"}}]}\n\n";

const STREAM_PARTIAL_THEN_BAD: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/event-stream\r\n\
Connection: close\r\n\
\r\n\
data: {\"ops\":[{\"op\":\"replace\",\"path\":\"\",\"value\":{\"final_output\":\"partial\"}}]}\n\n\
data: {not json}\n\n";

const SERVER_ERROR: &str = "HTTP/1.1 500 Internal Server Error\r\n\
Content-Length: 8\r\n\
Connection: close\r\n\
\r\n\
overload";

fn widget_for(base_url: &str, mode: &str) -> ChatWidget {
    let client = ChatApiClient::new(base_url, None).expect("client");
    ChatWidget::new(client, mode)
}

#[tokio::test]
async fn hello_vector_scenario_round_trips() {
    let (base_url, requests) = spawn_scripted_server(vec![STREAM_HI]);
    let mut widget = widget_for(&base_url, "vector");

    widget.set_input("Hello");
    let outcome = widget.submit().await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    assert_eq!(widget.messages().len(), 2);
    assert_eq!(widget.messages()[0].sender, Sender::User);
    assert_eq!(widget.messages()[0].text, "Hello");
    assert_eq!(widget.messages()[1].sender, Sender::Bot);
    assert_eq!(widget.messages()[1].text, "Hi there!");
    assert_eq!(widget.input(), "");
    assert!(!widget.is_generating());
    assert!(widget.error().is_none());

    let recorded = requests.lock().unwrap();
    assert_eq!(
        request_body(&recorded[0]),
        serde_json::json!({"question": "Hello", "chat_history": [], "mode": "vector"})
    );
}

#[tokio::test]
async fn submit_with_reports_each_streamed_update() {
    let (base_url, _requests) = spawn_scripted_server(vec![STREAM_HI]);
    let mut widget = widget_for(&base_url, "vector");

    widget.set_input("Hello");
    let mut snapshots = Vec::new();
    let outcome = widget
        .submit_with(|messages| {
            snapshots.push(messages.last().map(|m| m.text.clone()).unwrap_or_default());
        })
        .await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    // One snapshot per patch: the root replace, then each answer refinement.
    assert_eq!(snapshots, vec!["".to_string(), "Hi".to_string(), "Hi there!".to_string()]);
}

#[tokio::test]
async fn submit_appends_exactly_one_user_bot_pair() {
    let (base_url, _requests) = spawn_scripted_server(vec![STREAM_42]);
    let mut widget = widget_for(&base_url, "vector");

    widget.set_input("what is the answer");
    let outcome = widget.submit().await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    let senders: Vec<_> = widget.messages().iter().map(|m| m.sender).collect();
    assert_eq!(senders, vec![Sender::User, Sender::Bot]);
    assert_eq!(widget.messages()[1].text, "42");
    assert!(!widget.is_generating());
}

#[tokio::test]
async fn empty_and_whitespace_input_is_a_no_op() {
    let mut widget = widget_for("http://127.0.0.1:1", "vector");

    assert_eq!(widget.submit().await, SubmitOutcome::EmptyInput);
    assert!(widget.messages().is_empty());

    widget.set_input("   \n ");
    assert_eq!(widget.submit().await, SubmitOutcome::EmptyInput);
    assert!(widget.messages().is_empty());
    assert_eq!(widget.input(), "   \n ");
    assert!(widget.error().is_none());
}

#[tokio::test]
async fn unknown_mode_is_a_typed_recoverable_failure() {
    let mut widget = widget_for("http://127.0.0.1:1", "magic");

    widget.set_input("hi");
    let outcome = widget.submit().await;

    assert_eq!(outcome, SubmitOutcome::InvalidMode);
    assert!(widget.messages().is_empty());
    assert!(!widget.is_generating());
    let error = widget.error().expect("error banner should be set");
    assert!(error.contains("unknown retrieval mode: magic"));
}

#[tokio::test]
async fn mid_stream_failure_keeps_partial_text_and_sets_error() {
    let (base_url, _requests) = spawn_scripted_server(vec![STREAM_PARTIAL_THEN_BAD]);
    let mut widget = widget_for(&base_url, "vector");

    widget.set_input("hi");
    let outcome = widget.submit().await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(widget.messages().len(), 2);
    assert_eq!(widget.messages()[1].text, "partial");
    assert!(!widget.is_generating());
    let error = widget.error().expect("error banner should be set");
    assert!(error.contains("invalid stream chunk"));
}

#[tokio::test]
async fn next_successful_submit_clears_the_error_banner() {
    let (base_url, _requests) = spawn_scripted_server(vec![SERVER_ERROR, STREAM_HI]);
    let mut widget = widget_for(&base_url, "vector");

    widget.set_input("first");
    assert_eq!(widget.submit().await, SubmitOutcome::Failed);
    assert!(widget.error().is_some());

    widget.set_input("second");
    assert_eq!(widget.submit().await, SubmitOutcome::Completed);
    assert!(widget.error().is_none());
    assert_eq!(widget.messages().len(), 4);
    assert_eq!(widget.messages()[3].text, "Hi there!");
}

#[tokio::test]
async fn outgoing_history_never_exceeds_three_turns() {
    let (base_url, requests) = spawn_scripted_server(vec![STREAM_HI]);
    let mut widget = widget_for(&base_url, "vector");

    for question in ["q1", "q2", "q3", "q4", "q5"] {
        widget.set_input(question);
        assert_eq!(widget.submit().await, SubmitOutcome::Completed);
    }

    let recorded = requests.lock().unwrap();
    assert_eq!(recorded.len(), 5);

    let second = request_body(&recorded[1]);
    assert_eq!(second["chat_history"], serde_json::json!([["q1", "Hi there!"]]));

    let fifth = request_body(&recorded[4]);
    assert_eq!(
        fifth["chat_history"],
        serde_json::json!([
            ["q2", "Hi there!"],
            ["q3", "Hi there!"],
            ["q4", "Hi there!"]
        ])
    );
}

#[tokio::test]
async fn transcript_renders_prefixes_and_error_banner() {
    let (base_url, _requests) = spawn_scripted_server(vec![STREAM_HI, SERVER_ERROR]);
    let mut widget = widget_for(&base_url, "vector");

    widget.set_input("Hello");
    widget.submit().await;
    widget.set_input("again");
    widget.submit().await;

    let lines = widget.transcript();
    assert_eq!(lines[0], "[you] Hello");
    assert_eq!(lines[1], "[bot] Hi there!");
    assert_eq!(lines[2], "[you] again");
    assert_eq!(lines[3], "[bot] ");
    assert!(lines[4].starts_with("[error] "));
}
