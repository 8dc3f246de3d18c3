//! Rule collaborator consulted by the turn state machine.
//!
//! The state machine owns ordering: whose turn it is and which phase allows
//! which action. Everything about *whether a build is allowed here* and *what
//! it costs or yields* lives behind the [`Rules`] trait, so variants can be
//! swapped in without touching the machine.

use crate::actions::GameEvent;
use crate::board::{BuildingKind, Structure};
use crate::game::{SessionState, TurnPhase};
use crate::hex::{EdgeKey, HexCoord, VertexKey};
use crate::player::{costs, PlayerId, ResourceHand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Victory points needed to win
pub const WINNING_VICTORY_POINTS: u32 = 10;

/// Dice total that activates the robber
pub const ROBBER_ROLL: u8 = 7;

/// Kinds of things a player can pay for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Build {
    Road,
    Settlement,
    City,
}

impl Build {
    pub fn cost(self) -> ResourceHand {
        match self {
            Build::Road => costs::road(),
            Build::Settlement => costs::settlement(),
            Build::City => costs::city(),
        }
    }
}

/// Rule violations. The action is rejected and nothing changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Road must connect to your road or settlement")]
    NotConnected,

    #[error("Road must touch the settlement you just placed")]
    DetachedSetupRoad,

    #[error("Too close to another settlement")]
    TooClose,

    #[error("Settlement must be connected to your road")]
    NoRoadAccess,

    #[error("Not enough resources")]
    InsufficientResources,

    #[error("Robber must move to a different tile on the board")]
    InvalidRobberTarget,
}

/// Game rules the state machine delegates to.
///
/// `player` arguments are roster indices into `state.players`.
pub trait Rules {
    /// Order in which roster indices take their setup turns
    fn setup_order(&self, player_count: usize) -> Vec<usize>;

    /// Roll two dice
    fn roll_dice(&mut self) -> (u8, u8);

    /// Whether a dice total activates the robber instead of production
    fn triggers_robber(&self, total: u8) -> bool {
        total == ROBBER_ROLL
    }

    fn check_road(&self, state: &SessionState, player: usize, edge: EdgeKey)
        -> Result<(), RuleError>;

    fn check_settlement(
        &self,
        state: &SessionState,
        player: usize,
        vertex: VertexKey,
    ) -> Result<(), RuleError>;

    fn check_city(&self, state: &SessionState, player: usize, vertex: VertexKey)
        -> Result<(), RuleError>;

    fn check_robber(&self, state: &SessionState, hex: HexCoord) -> Result<(), RuleError>;

    /// Charge for an accepted build. Only called after the matching check passed.
    fn pay_for(&self, state: &mut SessionState, player: usize, build: Build);

    /// Victory points awarded for an accepted build
    fn victory_points_for(&self, build: Build) -> u32;

    /// Hook after a settlement lands on the board
    fn on_settlement_placed(
        &self,
        state: &mut SessionState,
        player: usize,
        vertex: VertexKey,
    ) -> Vec<GameEvent>;

    /// Hand out resources for a non-robber roll
    fn produce(&self, state: &mut SessionState, total: u8) -> Vec<GameEvent>;

    /// The winner, if the game is decided
    fn winner(&self, state: &SessionState) -> Option<PlayerId>;
}

/// The standard base-game rules
#[derive(Debug, Clone)]
pub struct StandardRules {
    rng: StdRng,
}

impl StandardRules {
    /// Rules with dice seeded from entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Rules with deterministic dice
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn charges(state: &SessionState) -> bool {
        state.turn_phase != TurnPhase::Setup
    }

    fn check_affordable(
        state: &SessionState,
        player: usize,
        build: Build,
    ) -> Result<(), RuleError> {
        if Self::charges(state) && !state.players[player].resources.can_afford(&build.cost()) {
            return Err(RuleError::InsufficientResources);
        }
        Ok(())
    }

    /// A road connects through an own building at an endpoint, or through an
    /// own road meeting it at an endpoint not held by an opponent.
    fn road_connects(state: &SessionState, player: usize, edge: EdgeKey) -> bool {
        let color = state.players[player].color;
        edge.endpoints().iter().any(|vertex| match state.board.building_at(vertex) {
            Some(building) => building.owner == color,
            None => vertex
                .touching_edges()
                .iter()
                .any(|e| *e != edge && state.board.road_at(e) == Some(color)),
        })
    }
}

impl Default for StandardRules {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules for StandardRules {
    /// Snake order: 0..n then back n..0
    fn setup_order(&self, player_count: usize) -> Vec<usize> {
        (0..player_count).chain((0..player_count).rev()).collect()
    }

    fn roll_dice(&mut self) -> (u8, u8) {
        (self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }

    fn check_road(
        &self,
        state: &SessionState,
        player: usize,
        edge: EdgeKey,
    ) -> Result<(), RuleError> {
        if state.turn_phase == TurnPhase::Setup {
            return match state.setup_settlement() {
                Some(vertex) if edge.endpoints().contains(&vertex) => Ok(()),
                _ => Err(RuleError::DetachedSetupRoad),
            };
        }

        if !Self::road_connects(state, player, edge) {
            return Err(RuleError::NotConnected);
        }
        Self::check_affordable(state, player, Build::Road)
    }

    fn check_settlement(
        &self,
        state: &SessionState,
        player: usize,
        vertex: VertexKey,
    ) -> Result<(), RuleError> {
        let color = state.players[player].color;
        let nearby = state.board.structures_touching(vertex);

        if nearby.iter().any(|s| matches!(s, Structure::Settlement(_))) {
            return Err(RuleError::TooClose);
        }
        if state.turn_phase == TurnPhase::Setup {
            return Ok(());
        }

        let has_road = nearby
            .iter()
            .any(|s| matches!(s, Structure::Road(road) if road.color == color));
        if !has_road {
            return Err(RuleError::NoRoadAccess);
        }
        Self::check_affordable(state, player, Build::Settlement)
    }

    fn check_city(
        &self,
        state: &SessionState,
        player: usize,
        _vertex: VertexKey,
    ) -> Result<(), RuleError> {
        Self::check_affordable(state, player, Build::City)
    }

    fn check_robber(&self, state: &SessionState, hex: HexCoord) -> Result<(), RuleError> {
        if !state.board.contains(&hex) || state.board.robber() == Some(hex) {
            return Err(RuleError::InvalidRobberTarget);
        }
        Ok(())
    }

    fn pay_for(&self, state: &mut SessionState, player: usize, build: Build) {
        if Self::charges(state) {
            state.players[player].resources.subtract(&build.cost());
        }
    }

    fn victory_points_for(&self, build: Build) -> u32 {
        match build {
            Build::Road => 0,
            // A city replaces a settlement already worth one point
            Build::Settlement | Build::City => 1,
        }
    }

    /// The second settlement of setup yields one of each adjacent resource
    fn on_settlement_placed(
        &self,
        state: &mut SessionState,
        player: usize,
        vertex: VertexKey,
    ) -> Vec<GameEvent> {
        let color = state.players[player].color;
        if state.turn_phase != TurnPhase::Setup || state.board.settlements_of(color).count() != 2 {
            return Vec::new();
        }

        let resources: Vec<_> = vertex
            .touching_hexes()
            .iter()
            .filter_map(|hex| state.board.tile(hex))
            .filter_map(|tile| tile.resource())
            .collect();

        let owner = &mut state.players[player];
        resources
            .into_iter()
            .map(|resource| {
                owner.resources.add(resource, 1);
                GameEvent::ResourcesProduced {
                    player: owner.id,
                    resource,
                    amount: 1,
                }
            })
            .collect()
    }

    fn produce(&self, state: &mut SessionState, total: u8) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for (color, hand) in state.board.production_for_roll(total) {
            let Some(player) = state.players.iter_mut().find(|p| p.color == color) else {
                continue;
            };
            player.resources.add_hand(&hand);
            events.extend(hand.iter().map(|(resource, amount)| GameEvent::ResourcesProduced {
                player: player.id,
                resource,
                amount,
            }));
        }
        events
    }

    fn winner(&self, state: &SessionState) -> Option<PlayerId> {
        let current = state.current_player();
        (current.victory_points >= WINNING_VICTORY_POINTS).then_some(current.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Resource, Tile};
    use crate::hex::Direction;
    use crate::player::Player;

    fn dir(index: u8) -> Direction {
        Direction::new(index).unwrap()
    }

    fn state_in_main_phase() -> SessionState {
        let board = Board::from_tiles(HexCoord::hexagon(1).into_iter().map(|hex| {
            Tile::new_resource(hex, Resource::Brick, 5)
        }));
        let players = Player::roster(["Alice", "Bob"]).unwrap();
        let mut state = SessionState::new(players, board, &StandardRules::seeded(1));
        state.turn_phase = TurnPhase::MainPhase;
        state
    }

    #[test]
    fn test_snake_setup_order() {
        let rules = StandardRules::seeded(0);
        assert_eq!(rules.setup_order(3), vec![0, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn test_dice_in_range_and_seeded() {
        let mut a = StandardRules::seeded(42);
        let mut b = StandardRules::seeded(42);
        for _ in 0..50 {
            let roll = a.roll_dice();
            assert_eq!(roll, b.roll_dice());
            assert!((1..=6).contains(&roll.0) && (1..=6).contains(&roll.1));
        }
    }

    #[test]
    fn test_distance_rule() {
        let mut state = state_in_main_phase();
        state.turn_phase = TurnPhase::Setup;
        let rules = StandardRules::seeded(0);
        state
            .board
            .place_settlement(HexCoord::ORIGIN, dir(0), state.players[1].color, BuildingKind::Settlement)
            .unwrap();

        let neighbour = VertexKey::new(HexCoord::ORIGIN, dir(1));
        assert_eq!(
            rules.check_settlement(&state, 0, neighbour),
            Err(RuleError::TooClose)
        );

        let two_away = VertexKey::new(HexCoord::ORIGIN, dir(2));
        assert_eq!(rules.check_settlement(&state, 0, two_away), Ok(()));
    }

    #[test]
    fn test_main_phase_road_needs_connection_and_resources() {
        let mut state = state_in_main_phase();
        let rules = StandardRules::seeded(0);
        let color = state.players[0].color;
        state
            .board
            .place_settlement(HexCoord::ORIGIN, dir(0), color, BuildingKind::Settlement)
            .unwrap();

        let far = EdgeKey::new(HexCoord::ORIGIN, dir(3));
        assert_eq!(rules.check_road(&state, 0, far), Err(RuleError::NotConnected));

        let attached = EdgeKey::new(HexCoord::ORIGIN, dir(0));
        assert_eq!(
            rules.check_road(&state, 0, attached),
            Err(RuleError::InsufficientResources)
        );

        state.players[0].resources = costs::road();
        assert_eq!(rules.check_road(&state, 0, attached), Ok(()));
    }

    #[test]
    fn test_opponent_settlement_blocks_road_extension() {
        let mut state = state_in_main_phase();
        let rules = StandardRules::seeded(0);
        state.players[0].resources = ResourceHand::with_amounts(5, 5, 5, 5, 5);
        let mine = state.players[0].color;
        let theirs = state.players[1].color;

        // Own road on edge 0 ends at vertex 1, where the opponent has built
        state.board.place_road(HexCoord::ORIGIN, dir(0), mine).unwrap();
        state
            .board
            .place_settlement(HexCoord::ORIGIN, dir(1), theirs, BuildingKind::Settlement)
            .unwrap();

        let through_opponent = EdgeKey::new(HexCoord::ORIGIN, dir(1));
        assert_eq!(
            rules.check_road(&state, 0, through_opponent),
            Err(RuleError::NotConnected)
        );

        let other_end = EdgeKey::new(HexCoord::ORIGIN, dir(5));
        assert_eq!(rules.check_road(&state, 0, other_end), Ok(()));
    }

    #[test]
    fn test_main_phase_settlement_needs_own_road() {
        let mut state = state_in_main_phase();
        let rules = StandardRules::seeded(0);
        state.players[0].resources = costs::settlement();
        let vertex = VertexKey::new(HexCoord::ORIGIN, dir(3));

        assert_eq!(
            rules.check_settlement(&state, 0, vertex),
            Err(RuleError::NoRoadAccess)
        );

        let color = state.players[0].color;
        state.board.place_road(HexCoord::ORIGIN, dir(3), color).unwrap();
        assert_eq!(rules.check_settlement(&state, 0, vertex), Ok(()));
    }

    #[test]
    fn test_robber_target_must_change() {
        let mut state = state_in_main_phase();
        let rules = StandardRules::seeded(0);
        state.board.move_robber(HexCoord::ORIGIN);

        assert_eq!(
            rules.check_robber(&state, HexCoord::ORIGIN),
            Err(RuleError::InvalidRobberTarget)
        );
        assert_eq!(
            rules.check_robber(&state, HexCoord::new(5, -5, 0)),
            Err(RuleError::InvalidRobberTarget)
        );
        assert_eq!(rules.check_robber(&state, HexCoord::new(1, 0, -1)), Ok(()));
    }

    #[test]
    fn test_produce_credits_owner() {
        let mut state = state_in_main_phase();
        let rules = StandardRules::seeded(0);
        let color = state.players[1].color;
        state
            .board
            .place_settlement(HexCoord::ORIGIN, dir(0), color, BuildingKind::Settlement)
            .unwrap();

        let events = rules.produce(&mut state, 5);
        // Vertex 0 of the origin touches three brick tiles
        assert_eq!(state.players[1].resources.brick, 3);
        assert_eq!(events.len(), 1);
        assert!(state.players[0].resources.is_empty());
    }

    #[test]
    fn test_winner_at_ten_points() {
        let mut state = state_in_main_phase();
        let rules = StandardRules::seeded(0);
        state.players[0].victory_points = 9;
        assert_eq!(rules.winner(&state), None);
        state.players[0].victory_points = 10;
        assert_eq!(rules.winner(&state), Some(state.players[0].id));
    }
}
