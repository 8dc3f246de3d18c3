//! Game room management.

use chrono::{DateTime, Utc};
use settlers_core::{
    Board, GameAction, GameError, GameEvent, Player, PlayerId, RosterError, SessionState,
    Snapshot, StandardRules,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::{ProtocolError, RoomCreated, RoomId, RoomStatus, RosterEntry, ServerMessage};

/// Identifies one WebSocket connection
pub type ConnectionId = Uuid;

/// Outbound queue of a connection
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("At least 2 players are required, got {0}")]
    InsufficientPlayers(usize),

    #[error("At most 4 players are supported, got {0}")]
    TooManyPlayers(usize),

    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Player {0} is not part of this room")]
    UnknownPlayer(PlayerId),

    #[error("Not in room")]
    NotInRoom,

    #[error("Room {0} is unavailable")]
    RoomUnavailable(RoomId),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<RosterError> for SessionError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::InsufficientPlayers(n) => SessionError::InsufficientPlayers(n),
            RosterError::TooManyPlayers(n) => SessionError::TooManyPlayers(n),
        }
    }
}

/// A connection attached to a room's broadcast group.
#[derive(Debug, Clone)]
struct Member {
    sender: Outbox,
    /// Roster slot this connection acts for; `None` spectates
    player: Option<PlayerId>,
}

/// A room owns one session and the connections watching it.
pub struct GameRoom {
    pub id: RoomId,
    pub created_at: DateTime<Utc>,
    state: SessionState,
    rules: StandardRules,
    members: HashMap<ConnectionId, Member>,
}

impl GameRoom {
    /// Build a room with a freshly generated board.
    pub fn new<I, S>(id: RoomId, names: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_parts(id, names, Board::standard(), StandardRules::new())
    }

    pub fn with_parts<I, S>(
        id: RoomId,
        names: I,
        board: Board,
        rules: StandardRules,
    ) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players = Player::roster(names)?;
        let state = SessionState::new(players, board, &rules);

        Ok(Self {
            id,
            created_at: Utc::now(),
            state,
            rules,
            members: HashMap::new(),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.state
            .players
            .iter()
            .map(|p| RosterEntry {
                id: p.id,
                name: p.name.clone(),
                color: p.color,
            })
            .collect()
    }

    pub fn to_created(&self) -> RoomCreated {
        RoomCreated {
            room_id: self.id.clone(),
            status: RoomStatus::Created,
            created_at: self.created_at,
            players: self.roster(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, conn: ConnectionId) -> bool {
        self.members.contains_key(&conn)
    }

    /// Fails with `UnknownPlayer` unless `id` is on this room's roster
    pub fn check_player(&self, id: PlayerId) -> Result<(), SessionError> {
        match self.state.player(id) {
            Some(_) => Ok(()),
            None => Err(SessionError::UnknownPlayer(id)),
        }
    }

    /// Attach a connection. Rejoining replaces the previous binding.
    pub fn add_member(
        &mut self,
        conn: ConnectionId,
        sender: Outbox,
        player: Option<PlayerId>,
    ) -> Result<(), SessionError> {
        if let Some(id) = player {
            self.check_player(id)?;
        }
        self.members.insert(conn, Member { sender, player });
        Ok(())
    }

    /// Detach a connection. Returns whether it was a member.
    pub fn remove_member(&mut self, conn: ConnectionId) -> bool {
        self.members.remove(&conn).is_some()
    }

    /// Apply an action for the player bound to `conn`.
    ///
    /// Spectators act with the nil id so they fail the turn check like any
    /// other non-active participant.
    pub fn apply_action(
        &mut self,
        conn: ConnectionId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, SessionError> {
        let member = self.members.get(&conn).ok_or(SessionError::NotInRoom)?;
        let player = member.player.unwrap_or_else(Uuid::nil);
        Ok(self.state.apply_action(player, action, &mut self.rules)?)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn send_to(&self, conn: ConnectionId, msg: ServerMessage) {
        if let Some(member) = self.members.get(&conn) {
            let _ = member.sender.send(msg);
        }
    }

    /// Send a message to every member. Closed connections are skipped.
    pub fn broadcast(&self, msg: ServerMessage) {
        for member in self.members.values() {
            let _ = member.sender.send(msg.clone());
        }
    }

    pub fn broadcast_state(&self) {
        self.broadcast(ServerMessage::GameState {
            state: Box::new(self.snapshot()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use settlers_core::{Direction, HexCoord, Placement, PlayerColor, TurnPhase};

    fn room(names: &[&str]) -> GameRoom {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(7));
        GameRoom::with_parts(
            "room0001".to_string(),
            names.iter().copied(),
            board,
            StandardRules::seeded(7),
        )
        .unwrap()
    }

    #[test]
    fn test_create_room() {
        let room = room(&["Alice", "Bob", "Carol"]);
        let roster = room.roster();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].name, "Alice");
        assert_eq!(roster[0].color, PlayerColor::Red);
        assert_eq!(room.member_count(), 0);
        assert_eq!(room.state().turn_phase, TurnPhase::Setup);
    }

    #[test]
    fn test_roster_size_errors() {
        let err = GameRoom::new("r".to_string(), ["Solo"]).err();
        assert_eq!(err, Some(SessionError::InsufficientPlayers(1)));

        let err = GameRoom::new("r".to_string(), ["A", "B", "C", "D", "E"]).err();
        assert_eq!(err, Some(SessionError::TooManyPlayers(5)));
    }

    #[test]
    fn test_add_remove_members() {
        let mut room = room(&["Alice", "Bob"]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = Uuid::new_v4();

        let stranger = Uuid::new_v4();
        assert_eq!(
            room.add_member(conn, tx.clone(), Some(stranger)),
            Err(SessionError::UnknownPlayer(stranger))
        );
        assert!(!room.has_member(conn));

        let alice = room.roster()[0].id;
        room.add_member(conn, tx, Some(alice)).unwrap();
        assert!(room.has_member(conn));

        assert!(room.remove_member(conn));
        assert!(!room.remove_member(conn));
    }

    #[test]
    fn test_spectator_cannot_act() {
        let mut room = room(&["Alice", "Bob"]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = Uuid::new_v4();
        room.add_member(conn, tx, None).unwrap();

        let action =
            GameAction::BuildSettlement(Placement::new(HexCoord::ORIGIN, Direction::SOUTH_WEST));
        assert_eq!(
            room.apply_action(conn, action),
            Err(SessionError::Game(GameError::WrongTurn))
        );
    }

    #[test]
    fn test_broadcast_reaches_every_member() {
        let mut room = room(&["Alice", "Bob"]);
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        room.add_member(Uuid::new_v4(), tx1, None).unwrap();
        room.add_member(Uuid::new_v4(), tx2, None).unwrap();

        room.broadcast_state();
        assert!(matches!(rx1.try_recv(), Ok(ServerMessage::GameState { .. })));
        assert!(matches!(rx2.try_recv(), Ok(ServerMessage::GameState { .. })));
    }
}
