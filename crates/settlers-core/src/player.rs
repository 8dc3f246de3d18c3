//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with a stable id, color, resources and victory points
//! - ResourceHand for managing resource counts
//! - Building costs
//! - Roster construction for a new session

use crate::board::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable player identifier, survives reconnects
pub type PlayerId = Uuid;

/// Smallest roster that can start a session
pub const MIN_PLAYERS: usize = 2;

/// Largest roster, one per color
pub const MAX_PLAYERS: usize = PlayerColor::PALETTE.len();

/// Player color, assigned in roster order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    White,
    Orange,
}

impl PlayerColor {
    /// Colors in assignment order
    pub const PALETTE: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::White,
        PlayerColor::Orange,
    ];

    /// Get color for a roster position
    pub fn for_index(index: usize) -> Option<Self> {
        Self::PALETTE.get(index).copied()
    }
}

/// A hand of resources. Every resource is always present, zero by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Brick => &mut self.brick,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost (panics if insufficient)
    pub fn subtract(&mut self, cost: &ResourceHand) {
        assert!(self.can_afford(cost), "Cannot afford this cost");
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
    }

    /// Try to subtract, returning false if insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.subtract(cost);
        true
    }

    /// Non-zero entries in resource order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|r| (r, self.get(r)))
            .filter(|(_, n)| *n > 0)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }
}

/// Roster validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("At least 2 players are required, got {0}")]
    InsufficientPlayers(usize),

    #[error("At most 4 players are supported, got {0}")]
    TooManyPlayers(usize),
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name
    pub name: String,
    pub color: PlayerColor,
    /// Current resources
    pub resources: ResourceHand,
    pub victory_points: u32,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: impl Into<String>, color: PlayerColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            resources: ResourceHand::new(),
            victory_points: 0,
        }
    }

    /// Build a roster from display names: fresh ids, colors in palette order
    pub fn roster<I, S>(names: I) -> Result<Vec<Player>, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() < MIN_PLAYERS {
            return Err(RosterError::InsufficientPlayers(names.len()));
        }
        if names.len() > MAX_PLAYERS {
            return Err(RosterError::TooManyPlayers(names.len()));
        }

        Ok(names
            .into_iter()
            .zip(PlayerColor::PALETTE)
            .map(|(name, color)| Player::new(Uuid::new_v4(), name, color))
            .collect())
    }
}
