//! WebSocket feed of study snapshots.
//!
//! Route: `GET /api/study/stream`
//!
//! Sends the current snapshot on connect, then one snapshot per state change.
//! Intermediate snapshots may be coalesced when the client is slow; the last
//! one is always delivered. Client text frames are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::watch;

use crate::domain::study::StudySnapshot;

use super::dto::StudyResponse;
use super::handlers::StudyHandlers;

/// Handle WebSocket upgrade requests for the snapshot stream.
pub async fn study_stream(ws: WebSocketUpgrade, State(handlers): State<StudyHandlers>) -> Response {
    let snapshots = handlers.study().subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, snapshots))
}

async fn handle_socket(socket: WebSocket, mut snapshots: watch::Receiver<StudySnapshot>) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Err(e) = send_snapshot(&mut sender, snapshot).await {
                tracing::debug!("Send error, closing study stream: {}", e);
                break;
            }
            if snapshots.changed().await.is_err() {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::debug!("Client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

async fn send_snapshot(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    snapshot: StudySnapshot,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&StudyResponse::from(snapshot)).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}
