//! Realtime session protocol tests against a live server.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use tolmach::audio::{decode_wav_bytes, encode_wav};
use tolmach::config::PipelineConfig;
use tolmach::defaults::{FALLBACK_PHRASE, SYNTHESIS_SAMPLE_RATE};
use tolmach::engine::{MockRecognizer, MockSynthesizer, MockTranslator, StageServices};
use tolmach::pipeline::Pipeline;
use tolmach::session::{AppState, TranslationReply, router};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Starts a server on an ephemeral port, returns its address.
async fn spawn_server(
    recognizer: MockRecognizer,
    translator: MockTranslator,
    api_key: Option<&str>,
) -> String {
    let services = StageServices::new(
        Arc::new(recognizer),
        Arc::new(translator),
        Arc::new(MockSynthesizer::new()),
    );
    let state = Arc::new(AppState {
        pipeline: Arc::new(Pipeline::new(services, PipelineConfig::default())),
        api_key: api_key.map(str::to_string),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });

    format!("127.0.0.1:{}", addr.port())
}

async fn connect(addr: &str) -> WsClient {
    let (ws, _response) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    ws
}

async fn next_frame(ws: &mut WsClient) -> Message {
    tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for frame")
        .expect("connection closed unexpectedly")
        .expect("websocket error")
}

/// One 16 kHz chunk of constant samples as WAV bytes.
fn chunk_bytes(value: i16) -> Vec<u8> {
    encode_wav(&[value; 32000], 16000).expect("encode chunk")
}

fn parse_reply(message: Message) -> TranslationReply {
    match message {
        Message::Text(json) => TranslationReply::from_json(&json).expect("reply json"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

fn assert_russian_audio(message: Message) -> usize {
    match message {
        Message::Binary(bytes) => {
            let audio = decode_wav_bytes(&bytes, SYNTHESIS_SAMPLE_RATE).expect("decode reply");
            assert!(!audio.samples.is_empty());
            audio.samples.len()
        }
        other => panic!("expected binary frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chunk_gets_audio_then_text_reply() {
    let addr = spawn_server(
        MockRecognizer::new().with_response("hello"),
        MockTranslator::new().with_mapping("hello", "привет"),
        None,
    )
    .await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(chunk_bytes(100))).await.expect("send");

    assert_russian_audio(next_frame(&mut ws).await);
    let reply = parse_reply(next_frame(&mut ws).await);
    assert_eq!(reply.english_text, "hello");
    assert_eq!(reply.russian_text, "привет");
    assert!(reply.processing_time >= 0.0);
}

#[tokio::test]
async fn test_silent_chunk_gets_fallback_phrase() {
    // Recognizer hears nothing; the session substitutes a fixed phrase.
    let addr = spawn_server(MockRecognizer::new(), MockTranslator::new(), None).await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(chunk_bytes(0))).await.expect("send");

    assert_russian_audio(next_frame(&mut ws).await);
    let reply = parse_reply(next_frame(&mut ws).await);
    assert_eq!(reply.english_text, FALLBACK_PHRASE);
    assert!(!reply.russian_text.is_empty());
}

#[tokio::test]
async fn test_wrong_sample_rate_gets_one_error_frame() {
    let addr = spawn_server(
        MockRecognizer::new().with_response("hello"),
        MockTranslator::new(),
        None,
    )
    .await;
    let mut ws = connect(&addr).await;

    let wrong_rate = encode_wav(&[0; 16000], 8000).expect("encode");
    ws.send(Message::Binary(wrong_rate)).await.expect("send");

    match next_frame(&mut ws).await {
        Message::Text(json) => {
            assert!(
                json.contains("Expected 16000 Hz audio, got 8000 Hz"),
                "unexpected error payload: {json}"
            );
        }
        other => panic!("expected error frame, got {other:?}"),
    }

    // The session survives: a valid chunk still gets its two replies.
    ws.send(Message::Binary(chunk_bytes(100))).await.expect("send");
    assert_russian_audio(next_frame(&mut ws).await);
    let reply = parse_reply(next_frame(&mut ws).await);
    assert_eq!(reply.english_text, "hello");
}

#[tokio::test]
async fn test_back_to_back_chunks_are_not_interleaved() {
    let addr = spawn_server(
        MockRecognizer::new().with_responses(&["first", "second"]),
        MockTranslator::new(),
        None,
    )
    .await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(chunk_bytes(1))).await.expect("send");
    ws.send(Message::Binary(chunk_bytes(2))).await.expect("send");

    // Strict per-chunk ordering: audio then text, twice.
    assert_russian_audio(next_frame(&mut ws).await);
    let first = parse_reply(next_frame(&mut ws).await);
    assert_eq!(first.english_text, "first");

    assert_russian_audio(next_frame(&mut ws).await);
    let second = parse_reply(next_frame(&mut ws).await);
    assert_eq!(second.english_text, "second");
}

#[tokio::test]
async fn test_text_and_empty_frames_are_ignored() {
    let addr = spawn_server(
        MockRecognizer::new().with_response("hello"),
        MockTranslator::new(),
        None,
    )
    .await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not audio".to_string()))
        .await
        .expect("send text");
    ws.send(Message::Binary(Vec::new())).await.expect("send empty");
    ws.send(Message::Binary(chunk_bytes(100))).await.expect("send");

    // The first reply belongs to the real chunk.
    assert_russian_audio(next_frame(&mut ws).await);
    let reply = parse_reply(next_frame(&mut ws).await);
    assert_eq!(reply.english_text, "hello");
}

#[tokio::test]
async fn test_invalid_credential_closes_with_policy_violation() {
    let addr = spawn_server(MockRecognizer::new(), MockTranslator::new(), Some("secret")).await;

    let (mut ws, _response) = connect_async(format!("ws://{addr}/ws?api_key=wrong"))
        .await
        .expect("websocket connect");

    match next_frame(&mut ws).await {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Policy);
            assert_eq!(frame.reason, "policy violation");
        }
        other => panic!("expected policy close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credential_closes_with_policy_violation() {
    let addr = spawn_server(MockRecognizer::new(), MockTranslator::new(), Some("secret")).await;
    let mut ws = connect(&addr).await;

    match next_frame(&mut ws).await {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Policy);
        }
        other => panic!("expected policy close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_valid_credential_is_accepted() {
    let addr = spawn_server(
        MockRecognizer::new().with_response("hello"),
        MockTranslator::new(),
        Some("secret"),
    )
    .await;

    let (mut ws, _response) = connect_async(format!("ws://{addr}/ws?api_key=secret"))
        .await
        .expect("websocket connect");

    ws.send(Message::Binary(chunk_bytes(100))).await.expect("send");
    assert_russian_audio(next_frame(&mut ws).await);
}

#[tokio::test]
async fn test_sessions_share_the_request_counter() {
    let addr = spawn_server(
        MockRecognizer::new().with_response("hello"),
        MockTranslator::new(),
        None,
    )
    .await;

    let mut first = connect(&addr).await;
    first.send(Message::Binary(chunk_bytes(1))).await.expect("send");
    assert_russian_audio(next_frame(&mut first).await);
    let _reply = next_frame(&mut first).await;

    let mut second = connect(&addr).await;
    second.send(Message::Binary(chunk_bytes(2))).await.expect("send");
    assert_russian_audio(next_frame(&mut second).await);
    let _reply = next_frame(&mut second).await;

    let status = http_get(&addr, "/status").await;
    assert!(
        status.contains("\"requests\":2"),
        "expected two requests in {status}"
    );
}

async fn http_get(addr: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read");
    response
}

#[tokio::test]
async fn test_health_endpoint() {
    let addr = spawn_server(MockRecognizer::new(), MockTranslator::new(), None).await;

    let response = http_get(&addr, "/health").await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "got: {response}");
    assert!(response.contains(r#""status":"ok""#));
}

#[tokio::test]
async fn test_status_endpoint_reports_idle_pipeline() {
    let addr = spawn_server(MockRecognizer::new(), MockTranslator::new(), None).await;

    let response = http_get(&addr, "/status").await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "got: {response}");
    assert!(response.contains(r#""running":false"#));
    assert!(response.contains(r#""recognition_queue":0"#));
    assert!(response.contains(r#""translation_queue":0"#));
    assert!(response.contains(r#""synthesis_queue":0"#));
    assert!(response.contains(r#""requests":0"#));
}
