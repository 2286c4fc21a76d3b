//! WebSocket push channel for live inventory events.
//!
//! Each connection registers one subscriber handle under the caller's
//! tenant. Broadcasts queued on the handle are forwarded to the socket; any
//! client text frame is answered with a pong. The handle is unregistered
//! when either side goes away.

use axum::{
  Extension,
  extract::{
    State, WebSocketUpgrade,
    ws::{Message, WebSocket},
  },
  response::Response,
};
use futures::{SinkExt, StreamExt};
use tally_core::{event::SessionMessage, store::InventoryStore, tenant::TenantId};
use tally_live::Subscriber;
use tokio::select;

use crate::AppState;

const WELCOME: &str = "Connected to live inventory updates";
const PONG: &str = "Server alive";

/// `GET /ws`
pub async fn handler<S: InventoryStore + 'static>(
  ws: WebSocketUpgrade,
  State(state): State<AppState<S>>,
  Extension(tenant): Extension<TenantId>,
) -> Response {
  ws.on_upgrade(move |socket| handle_socket(socket, state, tenant))
}

async fn handle_socket<S: InventoryStore>(
  socket: WebSocket,
  state: AppState<S>,
  tenant: TenantId,
) {
  let (subscriber, mut rx) = Subscriber::channel(state.config.subscriber_buffer);
  let id = subscriber.id();
  let registry = state.dispatcher.registry().clone();

  registry.register(tenant, subscriber.clone());
  state.dispatcher.send_direct(
    &subscriber,
    &SessionMessage::ConnectionEstablished { message: WELCOME.into(), store_id: tenant },
  );
  // Only the registry keeps the handle from here on, so a pruned handle
  // closes `rx` and ends the loop below.
  drop(subscriber);

  tracing::info!(%tenant, subscriber = %id, "websocket connected");

  let (mut sender, mut receiver) = socket.split();

  loop {
    select! {
      queued = rx.recv() => {
        let Some(text) = queued else {
          tracing::debug!(%tenant, subscriber = %id, "subscriber dropped by dispatcher");
          break;
        };
        if sender.send(Message::Text(text.into())).await.is_err() {
          break;
        }
      }

      frame = receiver.next() => {
        match frame {
          Some(Ok(Message::Text(_))) => {
            let pong = SessionMessage::Pong { message: PONG.into() };
            let Ok(text) = serde_json::to_string(&pong) else { continue };
            if sender.send(Message::Text(text.into())).await.is_err() {
              break;
            }
          }
          Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
          // Protocol pings are answered by the transport.
          Some(Ok(_)) => {}
        }
      }
    }
  }

  registry.unregister(tenant, id);
  tracing::info!(%tenant, subscriber = %id, "websocket disconnected");
}
