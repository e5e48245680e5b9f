use crate::SignalingService;
use axum::Json;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::IceServerConfig;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(group_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, group_id, service))
}

pub async fn ice_servers_handler(
    State(service): State<SignalingService>,
) -> Json<Vec<IceServerConfig>> {
    Json(service.get_ice_servers())
}

async fn handle_socket(socket: WebSocket, group_id: String, service: SignalingService) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let member_id = service.join(&group_id, tx);
    info!("New WebSocket connection: {} in group {}", member_id, group_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let group_id = group_id.clone();
        let member_id = member_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                let text = match msg {
                    Message::Text(text) => text.as_str().to_owned(),
                    Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!("Non UTF-8 frame from {}", member_id);
                            continue;
                        }
                    },
                    Message::Close(_) => break,
                    _ => continue,
                };

                if let Err(e) = service.forward(&group_id, &member_id, &text) {
                    warn!("Dropped frame from {}: {}", member_id, e);
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.leave(&group_id, &member_id);
    info!("WebSocket disconnected: {}", member_id);
}
