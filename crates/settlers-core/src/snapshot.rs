//! Immutable wire form of a [`SessionState`].
//!
//! A snapshot is always a full replacement of whatever the client held
//! before; there are no partial updates.

use crate::board::{Road, Settlement, Tile};
use crate::game::{SessionState, TurnPhase};
use crate::hex::HexCoord;
use crate::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Everything a client needs to render the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub current_turn_index: usize,
    pub turn_phase: TurnPhase,
    pub setup_waiting_for_road: bool,
    pub robber_pending: bool,
    /// Dice total of the current turn
    pub dice_roll: Option<u8>,
    /// Individual dice of the current turn
    pub dice: Option<(u8, u8)>,
    pub robber_hex: Option<HexCoord>,
    pub is_game_over: bool,
    pub winner: Option<PlayerId>,
    pub board_tiles: Vec<Tile>,
    pub roads: Vec<Road>,
    pub settlements: Vec<Settlement>,
}

impl From<&SessionState> for Snapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            players: state.players.clone(),
            current_turn_index: state.current_turn_index,
            turn_phase: state.turn_phase,
            setup_waiting_for_road: state.awaiting_setup_road(),
            robber_pending: state.robber_pending,
            dice_roll: state.dice_total(),
            dice: state.dice_roll,
            robber_hex: state.board.robber(),
            is_game_over: state.is_game_over(),
            winner: state.winner,
            board_tiles: state.board.tiles().copied().collect(),
            roads: state.board.roads().collect(),
            settlements: state.board.settlements().collect(),
        }
    }
}

impl SessionState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }
}
