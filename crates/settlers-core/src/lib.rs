//! Settlers - session core for a turn-based hex board game
//!
//! This crate provides the authoritative game logic shared by the server:
//! - Hex coordinate system with canonical edge and vertex keys
//! - Board representation with tiles, roads and settlements
//! - Player state and resource management
//! - Turn/phase state machine delegating to a pluggable rule set
//! - Snapshots, the full-state wire form pushed to clients
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for hex tiles, vertices, and edges
//! - [`board`]: Tiles, structures and adjacency queries
//! - [`player`]: Player state and resources
//! - [`game`]: Session state and turn state machine
//! - [`rules`]: The rule collaborator and the standard rules
//! - [`snapshot`]: Serializable view of a session

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod rules;
pub mod snapshot;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{Board, BoardError, BuildingKind, Resource, Road, Settlement, Terrain, Tile};
pub use game::{GameError, SessionState, SetupStep, TurnPhase};
pub use hex::{Direction, EdgeKey, HexCoord, HexError, Placement, VertexKey, HEX_SIZE, MAX_COORD};
pub use player::{Player, PlayerColor, PlayerId, ResourceHand, RosterError};
pub use rules::{RuleError, Rules, StandardRules};
pub use snapshot::Snapshot;
