//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::event::{dispatch, reply};
use crate::{
    domain::ClientId,
    infrastructure::{
        connection::ConnectionHandle,
        dto::websocket::{ClientConnected, ServerEvent},
    },
    usecase::ConnectedClient,
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
///
/// `clientId` を省略した場合はサーバーが新しい ID を発行する。
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default, rename = "clientId", alias = "client_id")]
    pub client_id: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> ClientId (Domain Model)
    let requested = match query.client_id.filter(|id| !id.trim().is_empty()) {
        None => None,
        Some(raw) => match ClientId::try_from(raw.clone()) {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Invalid clientId format: '{}'", raw);
                return Err(StatusCode::BAD_REQUEST);
            }
        },
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, requested)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// 接続が `close` された場合は Close フレームを送って終了する。
///
/// # Arguments
///
/// * `rx` - Channel receiver for messages addressed to this connection
/// * `sender` - WebSocket sink to send messages to this client
/// * `closer` - Cancelled when the server closes this connection
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    closer: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = closer.cancelled() => {
                    // close 前に積まれたメッセージは送り切る
                    while let Ok(msg) = rx.try_recv() {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Spawns a task that dispatches this connection's inbound messages one at a time.
///
/// 同じ接続からのメッセージは受信順に処理される。
/// `inbound` の送信側がすべて drop されると終了する。
fn dispatch_loop(
    mut inbound: mpsc::UnboundedReceiver<String>,
    state: Arc<AppState>,
    handle: ConnectionHandle,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = inbound.recv().await {
            dispatch(&state, &handle, &text).await;
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, requested: Option<ClientId>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let ConnectedClient { client_id, handle } = state.connect_client_usecase.execute(requested, tx);
    let connection_id = handle.id().clone();

    // 発行（または引き継いだ）クライアント ID を通知
    reply(
        &handle,
        &ServerEvent::ClientConnectedDto(ClientConnected {
            client_id: client_id.to_string(),
        }),
    );

    let mut send_task = pusher_loop(rx, sender, handle.close_signal());

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let dispatch_task = dispatch_loop(inbound_rx, state.clone(), handle.clone());

    let handle_clone = handle.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", handle_clone.id(), e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text: {}", text);
                    if inbound_tx.send(text.to_string()).is_err() {
                        break;
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", handle_clone.id());
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    let recv_finished = tokio::select! {
        _ = &mut recv_task => true,
        _ = &mut send_task => false,
    };
    if recv_finished {
        send_task.abort();
    } else {
        recv_task.abort();
        // 中断が終わると `inbound_tx` が drop され、dispatch_loop が終わる
        let _ = recv_task.await;
    }

    // 受信済みのメッセージを処理し終えてから後片付けする
    if let Err(e) = dispatch_task.await {
        tracing::warn!("Dispatch task of '{}' failed: {}", connection_id, e);
    }

    match state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await
    {
        Some(outcome) => tracing::info!(
            "Client '{}' disconnected ({} topics left)",
            outcome.client_id,
            outcome.left_topics.len()
        ),
        None => tracing::debug!("Connection '{}' was already cleaned up", connection_id),
    }
}
