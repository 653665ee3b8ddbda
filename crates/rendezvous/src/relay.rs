use crate::{Notice, PeerSignal, RelayError, RelayResult, Role, RouteOutcome, SessionRegistry};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Raw connection parameters as supplied by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayRequest {
    /// Rendezvous key; named after the port number peers usually share.
    pub port: Option<String>,
    pub role: Option<String>,
}

/// Validated connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayParams {
    pub key: String,
    pub role: Role,
}

impl RelayParams {
    pub fn parse(key: Option<&str>, role: Option<&str>) -> RelayResult<Self> {
        let key = key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RelayError::MissingKey)?;
        let role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(RelayError::MissingRole)?
            .parse()?;

        Ok(Self {
            key: key.to_string(),
            role,
        })
    }
}

/// Frames the relay emits toward its own peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    Notice(Notice),
    Data(String),
    Close,
}

/// Serve one connection until either side ends it.
///
/// Invalid parameters produce an error notice and a close, and nothing is
/// attached. Otherwise the peer holds its role until the stream ends, the
/// sink fails or another connection evicts it.
pub async fn relay<S, R>(
    registry: Arc<SessionRegistry>,
    request: RelayRequest,
    mut sink: S,
    mut stream: R,
) where
    S: Sink<RelayFrame> + Unpin,
    R: Stream<Item = String> + Unpin,
{
    let params = match RelayParams::parse(request.port.as_deref(), request.role.as_deref()) {
        Ok(params) => params,
        Err(err) => {
            warn!(error = %err, "rejecting relay connection");
            let _ = sink.send(RelayFrame::Notice(Notice::error(err.to_string()))).await;
            let _ = sink.send(RelayFrame::Close).await;
            return;
        }
    };

    let mut attachment = registry.attach(&params.key, params.role);
    let connected = Notice::connected(params.role, &params.key);
    if sink.send(RelayFrame::Notice(connected)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            signal = attachment.recv() => match signal {
                Some(PeerSignal::Data(text)) => {
                    if sink.send(RelayFrame::Data(text)).await.is_err() {
                        break;
                    }
                }
                Some(PeerSignal::Evicted) | None => {
                    info!(key = %params.key, role = %params.role, "closing evicted peer");
                    let _ = sink.send(RelayFrame::Close).await;
                    break;
                }
            },
            inbound = stream.next() => match inbound {
                Some(text) => {
                    if registry.route(&params.key, params.role, text) == RouteOutcome::PeerAbsent
                        && sink.send(RelayFrame::Notice(Notice::waiting())).await.is_err()
                    {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    debug!(key = %params.key, role = %params.role, "relay loop finished");
}
