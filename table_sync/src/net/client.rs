//! WebSocket table client.
//!
//! Drives a [`ConnectionManager`] with a real `tokio-tungstenite` socket.
//! All state lives in one task: the caller polls [`TableClient::next_event`]
//! from its event loop (usually inside `tokio::select!` next to input and
//! redraw timers) and pushes frames with the synchronous [`TableClient::send`].

use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use std::{collections::VecDeque, future::Future, pin::Pin};
use tokio::{
    net::TcpStream,
    time::{Sleep, sleep},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

use super::{
    connection::{
        ConnectionManager, ConnectionStatus, Generation, Reconnect, ReconnectPolicy,
        ReconnectTicket,
    },
    messages::{ClientFrame, Outbound, ServerFrame},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ConnectFuture = Pin<Box<dyn Future<Output = Result<WsStream, tungstenite::Error>> + Send>>;

/// Something the event loop has to react to, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    Status(ConnectionStatus),
    Frame(ServerFrame),
}

/// What woke the driver up.
enum Wake {
    Connected(Generation, Result<WsStream, tungstenite::Error>),
    Received(Generation, Option<Result<Message, tungstenite::Error>>),
    TimerFired(ReconnectTicket),
}

/// A resilient connection to the table server.
pub struct TableClient {
    url: String,
    manager: ConnectionManager,
    socket: Option<(Generation, WsStream)>,
    connecting: Option<(Generation, ConnectFuture)>,
    reconnect: Option<(ReconnectTicket, Pin<Box<Sleep>>)>,
    events: VecDeque<ClientEvent>,
}

impl TableClient {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            manager: ConnectionManager::new(policy),
            socket: None,
            connecting: None,
            reconnect: None,
            events: VecDeque::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> &ConnectionStatus {
        self.manager.status()
    }

    /// Open the connection. Progress is reported through
    /// [`Self::next_event`].
    pub fn connect(&mut self) {
        self.reconnect = None;
        if let Some(generation) = self.manager.connect() {
            self.start_connect(generation);
        }
    }

    /// Queue a frame. Dropped without error unless connected; the frame is
    /// written the next time [`Self::next_event`] is polled.
    pub fn send(&mut self, frame: &ClientFrame) -> bool {
        self.manager.send(frame)
    }

    /// Wait for the next connection event.
    ///
    /// Cancel safe: dropping the returned future loses nothing, the pending
    /// connect attempt and reconnect timer live in `self`. Returns `None`
    /// once the client has been shut down. After a terminal connection
    /// failure it never resolves.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            if self.manager.is_torn_down() {
                return None;
            }

            self.flush_outbound().await;
            if !self.events.is_empty() {
                continue;
            }

            let wake = tokio::select! {
                (generation, result) = poll_connect(&mut self.connecting) => {
                    Wake::Connected(generation, result)
                }
                (generation, message) = poll_socket(&mut self.socket) => {
                    Wake::Received(generation, message)
                }
                ticket = poll_timer(&mut self.reconnect) => Wake::TimerFired(ticket),
            };
            self.handle_wake(wake);
        }
    }

    /// Close the socket and make every pending callback a no-op.
    pub async fn shutdown(&mut self) {
        self.manager.shutdown();
        self.connecting = None;
        self.reconnect = None;
        self.events.clear();
        if let Some((_, mut ws)) = self.socket.take() {
            let _ = ws.close(None).await;
        }
    }

    fn start_connect(&mut self, generation: Generation) {
        let url = self.url.clone();
        debug!("connecting to {url}");
        self.connecting = Some((
            generation,
            Box::pin(async move { connect_async(url).await.map(|(ws, _)| ws) }),
        ));
        self.events
            .push_back(ClientEvent::Status(ConnectionStatus::Connecting));
    }

    fn handle_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Connected(generation, Ok(ws)) => {
                self.connecting = None;
                if self.manager.on_open(generation) {
                    self.socket = Some((generation, ws));
                    self.events
                        .push_back(ClientEvent::Status(ConnectionStatus::Connected));
                }
            }
            Wake::Connected(generation, Err(error)) => {
                self.connecting = None;
                debug!("connect failed: {error}");
                self.handle_loss(generation, "Connection Error");
            }
            Wake::Received(generation, Some(Ok(Message::Text(text)))) => {
                if let Some(frame) = self.manager.on_text(generation, text.as_str()) {
                    self.events.push_back(ClientEvent::Frame(frame));
                }
            }
            Wake::Received(generation, Some(Ok(Message::Close(_))) | None) => {
                self.socket = None;
                self.handle_loss(generation, "Disconnected");
            }
            Wake::Received(generation, Some(Err(error))) => {
                self.socket = None;
                warn!("socket error: {error}");
                self.handle_loss(generation, "Connection Error");
            }
            Wake::Received(_, Some(Ok(Message::Binary(_)))) => {
                warn!("dropping unexpected binary frame");
            }
            Wake::Received(_, Some(Ok(_))) => {}
            Wake::TimerFired(ticket) => {
                self.reconnect = None;
                if let Some(generation) = self.manager.on_reconnect_timer(ticket) {
                    self.start_connect(generation);
                }
            }
        }
    }

    fn handle_loss(&mut self, generation: Generation, reason: &str) {
        match self.manager.on_close(generation, reason) {
            Some(Reconnect::After(ticket)) => {
                self.events
                    .push_back(ClientEvent::Status(ConnectionStatus::Disconnected {
                        reason: reason.to_string(),
                    }));
                self.events
                    .push_back(ClientEvent::Status(self.manager.status().clone()));
                self.reconnect = Some((ticket, Box::pin(sleep(ticket.delay))));
            }
            Some(Reconnect::Exhausted) => {
                self.events
                    .push_back(ClientEvent::Status(ConnectionStatus::Failed));
            }
            None => {}
        }
    }

    async fn flush_outbound(&mut self) {
        let Some((generation, ws)) = self.socket.as_mut() else {
            return;
        };
        let generation = *generation;
        let mut failure = None;
        while let Some(text) = self.manager.peek_outbound() {
            let message = Message::Text(text.to_string().into());
            if let Err(error) = ws.feed(message).await {
                failure = Some(error);
                break;
            }
            self.manager.pop_outbound();
        }
        if failure.is_none() {
            if let Err(error) = ws.flush().await {
                failure = Some(error);
            }
        }
        if let Some(error) = failure {
            warn!("failed to write to socket: {error}");
            self.socket = None;
            self.handle_loss(generation, "Connection Error");
        }
    }
}

impl Outbound for TableClient {
    fn send(&mut self, frame: &ClientFrame) -> bool {
        TableClient::send(self, frame)
    }
}

async fn poll_connect(
    slot: &mut Option<(Generation, ConnectFuture)>,
) -> (Generation, Result<WsStream, tungstenite::Error>) {
    match slot {
        Some((generation, attempt)) => (*generation, attempt.await),
        None => std::future::pending().await,
    }
}

async fn poll_socket(
    slot: &mut Option<(Generation, WsStream)>,
) -> (Generation, Option<Result<Message, tungstenite::Error>>) {
    match slot {
        Some((generation, ws)) => (*generation, ws.next().await),
        None => std::future::pending().await,
    }
}

async fn poll_timer(slot: &mut Option<(ReconnectTicket, Pin<Box<Sleep>>)>) -> ReconnectTicket {
    match slot {
        Some((ticket, timer)) => {
            timer.as_mut().await;
            *ticket
        }
        None => std::future::pending().await,
    }
}
