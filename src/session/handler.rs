//! Per-connection session loop.
//!
//! Each connected client gets one session task. Chunks within a session
//! are processed strictly in arrival order; the next frame is not read
//! until the previous chunk's replies have been sent.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};

use crate::audio::{decode_wav_bytes, encode_wav};
use crate::defaults::{FALLBACK_PHRASE, SAMPLE_RATE, SYNTHESIS_SAMPLE_RATE};
use crate::error::{Result, TolmachError};
use crate::session::protocol::{ErrorReply, TranslationReply};
use crate::session::server::AppState;

/// Drives one client session until the connection ends.
///
/// Authentication happens before any exchange: when the server has an api
/// key configured and the client's credential does not match, the socket
/// is closed with code 1008 and nothing else is processed.
pub async fn run_session(mut socket: WebSocket, state: Arc<AppState>, credential: Option<String>) {
    if let Some(expected) = &state.api_key
        && credential.as_deref() != Some(expected.as_str())
    {
        tracing::warn!("session rejected: invalid credential");
        let close = Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: "policy violation".into(),
        }));
        if let Err(error) = socket.send(close).await {
            tracing::debug!(%error, "policy close frame not delivered");
        }
        return;
    }

    tracing::info!("session opened");

    while let Some(message) = socket.recv().await {
        let Ok(message) = message else {
            // Client went away mid-frame.
            break;
        };

        match message {
            Message::Binary(bytes) if !bytes.is_empty() => {
                match translate_chunk(&state, bytes).await {
                    Ok((wav, reply)) => {
                        if send_success(&mut socket, wav, &reply).await.is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "chunk processing failed");
                        if send_error(&mut socket, &error).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Message::Close(_) => break,
            // Text, ping, pong, and empty binary frames are ignored.
            _ => {}
        }
    }

    if let Err(error) = socket.send(Message::Close(None)).await {
        tracing::debug!(%error, "close frame not delivered");
    }
    tracing::info!("session closed");
}

/// Runs one chunk through recognition, translation, and synthesis.
///
/// The stage calls are blocking, so they run off the async executor. A
/// chunk that decodes to silence is substituted with a fixed phrase
/// instead of failing; this keeps conversational demo clients audible.
async fn translate_chunk(
    state: &Arc<AppState>,
    bytes: Vec<u8>,
) -> Result<(Vec<u8>, TranslationReply)> {
    let started = Instant::now();
    let state = state.clone();

    let (wav, english, russian) =
        tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, String, String)> {
            let chunk = decode_wav_bytes(&bytes, SAMPLE_RATE)?;
            let id = state.pipeline.tracker().next();
            let services = state.pipeline.services();

            let mut english = services.recognizer.recognize(&chunk)?.trim().to_string();
            if english.is_empty() {
                tracing::debug!(%id, "empty recognition, substituting fallback phrase");
                english = FALLBACK_PHRASE.to_string();
            }

            let russian = services.translator.translate(&english)?;
            if russian.trim().is_empty() {
                return Err(TolmachError::EmptyTranslation);
            }

            let samples = services.synthesizer.synthesize(&russian)?;
            if samples.is_empty() {
                return Err(TolmachError::EmptySynthesis);
            }

            let wav = encode_wav(&samples, SYNTHESIS_SAMPLE_RATE)?;
            tracing::info!(%id, english = %english, russian = %russian, "chunk translated");
            Ok((wav, english, russian))
        })
        .await
        .map_err(|e| TolmachError::Other(format!("session stage task failed: {e}")))??;

    let reply = TranslationReply {
        english_text: english,
        russian_text: russian,
        processing_time: started.elapsed().as_secs_f64(),
    };
    Ok((wav, reply))
}

/// Sends the audio frame followed by the text frame.
async fn send_success(
    socket: &mut WebSocket,
    wav: Vec<u8>,
    reply: &TranslationReply,
) -> std::result::Result<(), axum::Error> {
    socket.send(Message::Binary(wav)).await?;
    let json = reply.to_json().map_err(axum::Error::new)?;
    socket.send(Message::Text(json)).await
}

/// Sends the single error frame for a failed chunk.
async fn send_error(
    socket: &mut WebSocket,
    error: &TolmachError,
) -> std::result::Result<(), axum::Error> {
    let json = ErrorReply::new(error).to_json().map_err(axum::Error::new)?;
    socket.send(Message::Text(json)).await
}
