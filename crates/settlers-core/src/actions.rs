//! Player actions and the events they produce.
//!
//! Actions are what a client asks for; events are what actually happened.
//! An accepted action yields one or more events, a rejected one yields none.

use crate::board::Resource;
use crate::hex::{EdgeKey, HexCoord, Placement, VertexKey};
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Actions a player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameAction {
    /// Roll the dice at the start of a turn
    RollDice,
    /// Pass play to the next player
    EndTurn,
    /// Build a road on an edge
    BuildRoad(Placement),
    /// Build a settlement on a vertex
    BuildSettlement(Placement),
    /// Upgrade an own settlement to a city
    UpgradeCity(Placement),
    /// Move the robber after a 7
    MoveRobber { hex: HexCoord },
}

impl GameAction {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::RollDice => "roll_dice",
            GameAction::EndTurn => "end_turn",
            GameAction::BuildRoad(_) => "build_road",
            GameAction::BuildSettlement(_) => "build_settlement",
            GameAction::UpgradeCity(_) => "upgrade_city",
            GameAction::MoveRobber { .. } => "move_robber",
        }
    }
}

/// Events that occur in the game (for logging and client notifications)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    DiceRolled {
        player: PlayerId,
        dice: (u8, u8),
        total: u8,
    },
    ResourcesProduced {
        player: PlayerId,
        resource: Resource,
        amount: u32,
    },
    RoadBuilt {
        player: PlayerId,
        edge: EdgeKey,
    },
    SettlementBuilt {
        player: PlayerId,
        vertex: VertexKey,
    },
    CityBuilt {
        player: PlayerId,
        vertex: VertexKey,
    },
    RobberMoved {
        player: PlayerId,
        from: Option<HexCoord>,
        to: HexCoord,
    },
    SetupCompleted,
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Direction;

    #[test]
    fn test_action_names_match_wire_tags() {
        let placement = Placement::new(HexCoord::ORIGIN, Direction::EAST);
        let actions = [
            GameAction::RollDice,
            GameAction::EndTurn,
            GameAction::BuildRoad(placement),
            GameAction::BuildSettlement(placement),
            GameAction::UpgradeCity(placement),
            GameAction::MoveRobber { hex: HexCoord::ORIGIN },
        ];
        for action in actions {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json["type"], action.name());
        }
    }

    #[test]
    fn test_build_action_payload_shape() {
        let json = r#"{"type":"build_road","payload":{"hex":{"q":0,"r":0,"s":0},"direction":2}}"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            GameAction::BuildRoad(Placement::new(HexCoord::ORIGIN, Direction::SOUTH_WEST))
        );
    }
}
