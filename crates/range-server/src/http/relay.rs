use crate::app::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::future::ready;
use futures_util::{SinkExt, StreamExt};
use rendezvous::{relay, RelayFrame, RelayRequest, SessionRegistry};
use std::sync::Arc;

pub(super) async fn relay_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(request): Query<RelayRequest>,
) -> impl IntoResponse {
    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| handle_relay(socket, registry, request))
}

async fn handle_relay(socket: WebSocket, registry: Arc<SessionRegistry>, request: RelayRequest) {
    let (ws_tx, ws_rx) = socket.split();

    let sink = ws_tx.with(|frame: RelayFrame| ready(to_message(frame)));
    let stream = ws_rx
        .take_while(|msg| ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| {
            ready(match msg {
                Ok(Message::Text(text)) => Some(text.as_str().to_owned()),
                _ => None,
            })
        });

    let sink = std::pin::pin!(sink);
    let stream = std::pin::pin!(stream);
    relay(registry, request, sink, stream).await;
}

fn to_message(frame: RelayFrame) -> Result<Message, axum::Error> {
    Ok(match frame {
        RelayFrame::Notice(notice) => Message::Text(notice.to_json().map_err(axum::Error::new)?.into()),
        RelayFrame::Data(text) => Message::Text(text.into()),
        RelayFrame::Close => Message::Close(None),
    })
}
