//! WebSocket server and connection handling.

use crate::protocol::{ActionEnvelope, ClientMessage, RoomCreated, RoomId, ServerMessage};
use crate::room::{ConnectionId, GameRoom, Outbox, SessionError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use settlers_core::PlayerId;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Per-connection context, created on connect and dropped on disconnect.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    sender: Outbox,
    room: Option<RoomId>,
    player: Option<PlayerId>,
}

impl Connection {
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.sender.send(msg);
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }
}

/// Owns every live room. Each room sits behind its own lock, so actions in
/// different rooms never wait on each other.
pub struct SessionManager {
    rooms: DashMap<RoomId, Arc<Mutex<GameRoom>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Run `f` with the room locked. The map guard is released before locking.
    fn with_room<T>(
        &self,
        room_id: &str,
        f: impl FnOnce(&mut GameRoom) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let room = self
            .rooms
            .get(room_id)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;
        let mut room = room
            .lock()
            .map_err(|_| SessionError::RoomUnavailable(room_id.to_string()))?;
        f(&mut room)
    }

    fn generate_room_id(&self) -> RoomId {
        loop {
            let mut id = Uuid::new_v4().simple().to_string();
            id.truncate(8);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create a room with a fresh board and a roster built from `names`.
    pub fn create_room(&self, names: Vec<String>) -> Result<RoomCreated, SessionError> {
        let room = GameRoom::new(self.generate_room_id(), names)?;
        let created = room.to_created();

        info!(room = %created.room_id, players = created.players.len(), "Room created");
        self.rooms
            .insert(created.room_id.clone(), Arc::new(Mutex::new(room)));
        Ok(created)
    }

    pub fn connect(&self, sender: Outbox) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            sender,
            room: None,
            player: None,
        }
    }

    /// Attach `conn` to a room and send it the current snapshot.
    pub fn join(
        &self,
        conn: &mut Connection,
        room_id: &str,
        player: Option<PlayerId>,
    ) -> Result<(), SessionError> {
        // Validate the target before giving up the current room
        self.with_room(room_id, |room| match player {
            Some(id) => room.check_player(id),
            None => Ok(()),
        })?;
        if conn.room.as_deref().is_some_and(|current| current != room_id) {
            self.leave(conn)?;
        }

        self.with_room(room_id, |room| {
            room.add_member(conn.id, conn.sender.clone(), player)?;
            room.send_to(
                conn.id,
                ServerMessage::JoinedRoom {
                    room_id: room.id.clone(),
                    player_id: player,
                },
            );
            room.send_to(
                conn.id,
                ServerMessage::GameState {
                    state: Box::new(room.snapshot()),
                },
            );
            Ok(())
        })?;

        info!(room = %room_id, connection = %conn.id, ?player, "Joined room");
        conn.room = Some(room_id.to_string());
        conn.player = player;
        Ok(())
    }

    /// Detach `conn` from its room. The session itself is kept.
    pub fn leave(&self, conn: &mut Connection) -> Result<(), SessionError> {
        let room_id = conn.room.take().ok_or(SessionError::NotInRoom)?;
        conn.player = None;

        match self.with_room(&room_id, |room| Ok(room.remove_member(conn.id))) {
            Ok(_) | Err(SessionError::RoomNotFound(_)) => {
                info!(room = %room_id, connection = %conn.id, "Left room");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Validate and apply an action, then push the new snapshot to the room.
    ///
    /// The broadcast happens while the room is still locked so every member
    /// sees snapshots in the order the actions were accepted.
    pub fn route_action(
        &self,
        conn: &Connection,
        envelope: &ActionEnvelope,
    ) -> Result<(), SessionError> {
        let action = envelope.to_action()?;

        self.with_room(&envelope.room_id, |room| {
            if !room.has_member(conn.id) {
                return Err(SessionError::NotInRoom);
            }
            let events = room.apply_action(conn.id, action)?;
            debug!(
                room = %room.id,
                connection = %conn.id,
                action = action.name(),
                ?events,
                "Action applied"
            );
            room.broadcast_state();
            Ok(())
        })
    }

    /// Tear down a room, telling its members they have left.
    pub fn close_room(&self, room_id: &str) -> Result<(), SessionError> {
        let (_, room) = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;

        if let Ok(room) = room.lock() {
            room.broadcast(ServerMessage::LeftRoom);
        }
        info!(room = %room_id, "Room closed");
        Ok(())
    }

    /// Dispatch a client message. Failures are reported to `conn` only.
    pub fn handle_message(&self, conn: &mut Connection, msg: ClientMessage) {
        let result = match msg {
            ClientMessage::CreateRoom { player_names } => self
                .create_room(player_names)
                .map(|created| conn.send(ServerMessage::RoomCreated(created))),

            ClientMessage::JoinRoom { room_id, player_id } => {
                self.join(conn, &room_id, player_id)
            }

            ClientMessage::LeaveRoom => self
                .leave(conn)
                .map(|()| conn.send(ServerMessage::LeftRoom)),

            ClientMessage::Action(envelope) => self.route_action(conn, &envelope),

            ClientMessage::Ping => {
                conn.send(ServerMessage::Pong);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(connection = %conn.id, error = %e, "Request rejected");
            conn.send(ServerMessage::error(e));
        }
    }

    pub fn disconnect(&self, conn: &mut Connection) {
        if conn.room.is_some() {
            if let Err(e) = self.leave(conn) {
                warn!(connection = %conn.id, error = %e, "Cleanup on disconnect failed");
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, manager: Arc<SessionManager>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Settlers server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, manager).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    manager: Arc<SessionManager>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let mut conn = manager.connect(tx);
    info!(connection = %conn.id, %addr, "New WebSocket connection");

    conn.send(ServerMessage::Welcome {
        connection_id: conn.id,
    });

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode message: {}", e),
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => manager.handle_message(&mut conn, client_msg),
                Err(e) => {
                    warn!(connection = %conn.id, "Invalid message: {}", e);
                    conn.send(ServerMessage::error(format!("Invalid message: {e}")));
                }
            },
            Ok(Message::Close(_)) => {
                info!(connection = %conn.id, "Client closing connection");
                break;
            }
            Ok(Message::Ping(_)) => conn.send(ServerMessage::Pong),
            Err(e) => {
                error!(connection = %conn.id, "WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    manager.disconnect(&mut conn);
    send_task.abort();

    info!(connection = %conn.id, "Connection closed");
    Ok(())
}
