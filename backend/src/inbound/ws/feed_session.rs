//! Per-connection feed socket handler.
//!
//! Each connection owns one [`ImageFeed`]. Fetches run alongside the
//! heartbeat and client traffic; a `query` message replaces any fetch in
//! flight, and leaving the loop drops it so late results are never applied.
//! The socket pings every 5s and considers a connection idle after 10s
//! without client traffic. Tests shorten these intervals.

use std::future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use futures_util::future::BoxFuture;
use pagination::PageSize;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::{ImageSource, ImageSourceError};
use crate::domain::{FeedImage, FeedQuery, ImageFeed, PendingFetch};
use crate::inbound::ws::messages::{ClientMessage, ServerMessage};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

type FetchResult = (PendingFetch, Result<Vec<FeedImage>, ImageSourceError>);

pub(super) async fn handle_feed_session(
    images: Arc<dyn ImageSource>,
    page_size: PageSize,
    session: Session,
    stream: MessageStream,
) {
    FeedSession::new(images, page_size).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct FeedSession {
    images: Arc<dyn ImageSource>,
    feed: ImageFeed,
    in_flight: Option<BoxFuture<'static, FetchResult>>,
}

impl FeedSession {
    fn new(images: Arc<dyn ImageSource>, page_size: PageSize) -> Self {
        Self {
            images,
            feed: ImageFeed::new(None, page_size),
            in_flight: None,
        }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let fetch = async {
                match self.in_flight.as_mut() {
                    Some(fetch) => fetch.await,
                    None => future::pending().await,
                }
            };
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                (pending, outcome) = fetch => {
                    self.in_flight = None;
                    self.handle_fetch_result(&mut session, pending, outcome).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                Self::log_shutdown_reason(&error);
                let close_action = Self::close_action_for(&error);
                Self::close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(text.as_ref())
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    fn handle_text_message(&mut self, text: &str) -> Result<(), SessionError> {
        let request = match serde_json::from_str::<ClientMessage>(text) {
            Ok(request) => request,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        match request {
            ClientMessage::Query { q } => {
                let changed = self.feed.set_query(FeedQuery::from_optional(q.as_deref()));
                if changed {
                    // Results for the previous query are no longer wanted.
                    self.in_flight = None;
                }
                if changed || self.feed.images().is_empty() {
                    self.start_fetch();
                }
            }
            ClientMessage::NearBottom => self.start_fetch(),
        }
        Ok(())
    }

    /// Claim the next page unless a fetch is running or the feed is exhausted.
    fn start_fetch(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(pending) = self.feed.begin_fetch() else {
            debug!(status = ?self.feed.status(), "ignoring feed signal");
            return;
        };
        let images = Arc::clone(&self.images);
        self.in_flight = Some(Box::pin(async move {
            let outcome = images.fetch_page(pending.request()).await;
            (pending, outcome)
        }));
    }

    async fn handle_fetch_result(
        &mut self,
        session: &mut Session,
        pending: PendingFetch,
        outcome: Result<Vec<FeedImage>, ImageSourceError>,
    ) -> Result<(), SessionError> {
        let update = self.feed.complete(pending, outcome);
        let Some(message) = ServerMessage::from_update(self.feed.query(), update) else {
            return Ok(());
        };
        Self::send_json(session, &message)
            .await
            .map_err(SessionError::Network)
    }

    async fn send_json(session: &mut Session, payload: &ServerMessage) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket payload");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "feed_session_tests.rs"]
mod tests;
