//! Core game state machine.
//!
//! This module contains the authoritative `SessionState` for one room and the
//! turn/phase machine that decides which actions are legal. Placement and
//! scoring decisions are delegated to a [`Rules`] implementation.
//!
//! Every action is fully validated before anything is mutated, so a rejected
//! action leaves the state exactly as it was.

use crate::actions::{GameAction, GameEvent};
use crate::board::{Board, BoardError, BuildingKind};
use crate::hex::{HexCoord, Placement, VertexKey};
use crate::player::{Player, PlayerId};
use crate::rules::{Build, RuleError, Rules};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Turn phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Initial placement rounds
    Setup,
    /// Before rolling dice at start of turn
    RollDice,
    /// Build, move the robber, end turn
    MainPhase,
    /// A winner has been declared
    GameOver,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Setup => "setup",
            TurnPhase::RollDice => "roll_dice",
            TurnPhase::MainPhase => "main_phase",
            TurnPhase::GameOver => "game_over",
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    AwaitingSettlement,
    AwaitingRoad,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Game is over")]
    GameOver,

    #[error("Not your turn")]
    WrongTurn,

    #[error("Cannot {action} during {phase}")]
    IllegalAction {
        action: &'static str,
        phase: TurnPhase,
    },

    #[error("Cannot {action} until the robber has been moved")]
    RobberPending { action: &'static str },

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// The complete state of one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// The game board
    pub board: Board,
    /// All players, in roster order
    pub players: Vec<Player>,
    /// Index into `players` of who may act
    pub current_turn_index: usize,
    pub turn_phase: TurnPhase,
    /// Only meaningful during setup
    pub setup_step: SetupStep,
    /// Dice rolled this turn, cleared at end of turn
    pub dice_roll: Option<(u8, u8)>,
    /// A robber roll happened and the robber has not moved yet
    pub robber_pending: bool,
    pub winner: Option<PlayerId>,
    setup_queue: Vec<usize>,
    setup_position: usize,
    setup_settlement: Option<VertexKey>,
}

impl SessionState {
    /// Create a new session in setup, with the first queue entry to act.
    ///
    /// `players` is expected to be a validated roster (see [`Player::roster`]).
    pub fn new<R: Rules + ?Sized>(players: Vec<Player>, board: Board, rules: &R) -> Self {
        let setup_queue = rules.setup_order(players.len());
        let current_turn_index = setup_queue.first().copied().unwrap_or(0);

        Self {
            board,
            players,
            current_turn_index,
            turn_phase: TurnPhase::Setup,
            setup_step: SetupStep::AwaitingSettlement,
            dice_roll: None,
            robber_pending: false,
            winner: None,
            setup_queue,
            setup_position: 0,
            setup_settlement: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn_index]
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_game_over(&self) -> bool {
        self.turn_phase == TurnPhase::GameOver
    }

    /// Sum of the current dice, if rolled this turn
    pub fn dice_total(&self) -> Option<u8> {
        self.dice_roll.map(|(a, b)| a + b)
    }

    /// Vertex of the settlement placed earlier in the current setup turn
    pub fn setup_settlement(&self) -> Option<VertexKey> {
        self.setup_settlement
    }

    /// Whether setup is waiting for the active player's road
    pub fn awaiting_setup_road(&self) -> bool {
        self.turn_phase == TurnPhase::Setup && self.setup_step == SetupStep::AwaitingRoad
    }

    /// Get all valid actions for `player` (used for placement hints and bots)
    pub fn valid_actions<R: Rules + ?Sized>(&self, player: PlayerId, rules: &R) -> Vec<GameAction> {
        if self.is_game_over() || self.current_player().id != player {
            return Vec::new();
        }

        let index = self.current_turn_index;
        let color = self.players[index].color;
        let roads = move || {
            self.board
                .edges()
                .into_iter()
                .filter(move |e| self.board.check_road_vacant(e).is_ok())
                .filter(move |e| rules.check_road(self, index, *e).is_ok())
                .map(|e| GameAction::BuildRoad(e.placement()))
        };
        let settlements = move || {
            self.board
                .vertices()
                .into_iter()
                .filter(move |v| self.board.check_vertex_vacant(v).is_ok())
                .filter(move |v| rules.check_settlement(self, index, *v).is_ok())
                .map(|v| GameAction::BuildSettlement(v.placement()))
        };

        let mut actions = Vec::new();
        match (self.turn_phase, self.setup_step) {
            (TurnPhase::Setup, SetupStep::AwaitingSettlement) => actions.extend(settlements()),
            (TurnPhase::Setup, SetupStep::AwaitingRoad) => actions.extend(roads()),
            (TurnPhase::RollDice, _) => actions.push(GameAction::RollDice),
            (TurnPhase::MainPhase, _) if self.robber_pending => {
                actions.extend(
                    self.board
                        .tiles()
                        .filter(|t| rules.check_robber(self, t.hex).is_ok())
                        .map(|t| GameAction::MoveRobber { hex: t.hex }),
                );
            }
            (TurnPhase::MainPhase, _) => {
                actions.push(GameAction::EndTurn);
                actions.extend(roads());
                actions.extend(settlements());
                actions.extend(
                    self.board
                        .settlements_of(color)
                        .filter(|s| self.board.check_upgrade(&s.vertex, color).is_ok())
                        .filter(|s| rules.check_city(self, index, s.vertex).is_ok())
                        .map(|s| GameAction::UpgradeCity(s.vertex.placement())),
                );
            }
            (TurnPhase::GameOver, _) => {}
        }
        actions
    }

    /// Apply an action on behalf of `player`.
    ///
    /// Checks run in a fixed order: game over, then turn, then phase, then
    /// board bounds and occupancy, then rules. Only when all pass is anything
    /// mutated.
    pub fn apply_action<R: Rules + ?Sized>(
        &mut self,
        player: PlayerId,
        action: GameAction,
        rules: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        if self.current_player().id != player {
            return Err(GameError::WrongTurn);
        }

        let mut events = match action {
            GameAction::RollDice => self.roll_dice(action, rules)?,
            GameAction::EndTurn => self.end_turn(action)?,
            GameAction::BuildRoad(placement) => self.build_road(action, placement, &*rules)?,
            GameAction::BuildSettlement(placement) => {
                self.build_settlement(action, placement, &*rules)?
            }
            GameAction::UpgradeCity(placement) => self.upgrade_city(action, placement, &*rules)?,
            GameAction::MoveRobber { hex } => self.move_robber(action, hex, &*rules)?,
        };

        if let Some(winner) = rules.winner(self) {
            self.turn_phase = TurnPhase::GameOver;
            self.winner = Some(winner);
            let victory_points = self.player(winner).map_or(0, |p| p.victory_points);
            events.push(GameEvent::GameWon {
                player: winner,
                victory_points,
            });
        }

        Ok(events)
    }

    fn illegal(&self, action: GameAction) -> GameError {
        GameError::IllegalAction {
            action: action.name(),
            phase: self.turn_phase,
        }
    }

    fn ensure_robber_moved(&self, action: GameAction) -> Result<(), GameError> {
        if self.robber_pending {
            return Err(GameError::RobberPending {
                action: action.name(),
            });
        }
        Ok(())
    }

    // ==================== Dice Rolling ====================

    fn roll_dice<R: Rules + ?Sized>(
        &mut self,
        action: GameAction,
        rules: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.turn_phase != TurnPhase::RollDice {
            return Err(self.illegal(action));
        }

        let dice = rules.roll_dice();
        let total = dice.0 + dice.1;
        self.dice_roll = Some(dice);
        self.turn_phase = TurnPhase::MainPhase;

        let mut events = vec![GameEvent::DiceRolled {
            player: self.current_player().id,
            dice,
            total,
        }];

        if rules.triggers_robber(total) {
            self.robber_pending = true;
        } else {
            events.extend(rules.produce(self, total));
        }
        Ok(events)
    }

    // ==================== Building ====================

    fn build_road<R: Rules + ?Sized>(
        &mut self,
        action: GameAction,
        placement: Placement,
        rules: &R,
    ) -> Result<Vec<GameEvent>, GameError> {
        let in_setup = match (self.turn_phase, self.setup_step) {
            (TurnPhase::Setup, SetupStep::AwaitingRoad) => true,
            (TurnPhase::MainPhase, _) => false,
            _ => return Err(self.illegal(action)),
        };
        self.ensure_robber_moved(action)?;

        let edge = placement.edge();
        let index = self.current_turn_index;
        self.board.check_edge_on_board(&edge)?;
        self.board.check_road_vacant(&edge)?;
        rules.check_road(self, index, edge)?;

        let color = self.players[index].color;
        self.board.place_road(placement.hex, placement.direction, color)?;
        self.award(rules, index, Build::Road);

        let mut events = vec![GameEvent::RoadBuilt {
            player: self.players[index].id,
            edge,
        }];
        if in_setup {
            events.extend(self.advance_setup());
        }
        Ok(events)
    }

    fn build_settlement<R: Rules + ?Sized>(
        &mut self,
        action: GameAction,
        placement: Placement,
        rules: &R,
    ) -> Result<Vec<GameEvent>, GameError> {
        let in_setup = match (self.turn_phase, self.setup_step) {
            (TurnPhase::Setup, SetupStep::AwaitingSettlement) => true,
            (TurnPhase::MainPhase, _) => false,
            _ => return Err(self.illegal(action)),
        };
        self.ensure_robber_moved(action)?;

        let vertex = placement.vertex();
        let index = self.current_turn_index;
        self.board.check_vertex_on_board(&vertex)?;
        self.board.check_vertex_vacant(&vertex)?;
        rules.check_settlement(self, index, vertex)?;

        let color = self.players[index].color;
        self.board.place_settlement(
            placement.hex,
            placement.direction,
            color,
            BuildingKind::Settlement,
        )?;
        self.award(rules, index, Build::Settlement);

        let mut events = vec![GameEvent::SettlementBuilt {
            player: self.players[index].id,
            vertex,
        }];
        events.extend(rules.on_settlement_placed(self, index, vertex));

        if in_setup {
            self.setup_settlement = Some(vertex);
            self.setup_step = SetupStep::AwaitingRoad;
        }
        Ok(events)
    }

    fn upgrade_city<R: Rules + ?Sized>(
        &mut self,
        action: GameAction,
        placement: Placement,
        rules: &R,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.turn_phase != TurnPhase::MainPhase {
            return Err(self.illegal(action));
        }
        self.ensure_robber_moved(action)?;

        let vertex = placement.vertex();
        let index = self.current_turn_index;
        let color = self.players[index].color;
        self.board.check_upgrade(&vertex, color)?;
        rules.check_city(self, index, vertex)?;

        self.board
            .upgrade_to_city(placement.hex, placement.direction, color)?;
        self.award(rules, index, Build::City);

        Ok(vec![GameEvent::CityBuilt {
            player: self.players[index].id,
            vertex,
        }])
    }

    /// Charge for a build and credit its victory points
    fn award<R: Rules + ?Sized>(&mut self, rules: &R, index: usize, build: Build) {
        rules.pay_for(self, index, build);
        self.players[index].victory_points += rules.victory_points_for(build);
    }

    // ==================== Robber ====================

    fn move_robber<R: Rules + ?Sized>(
        &mut self,
        action: GameAction,
        hex: HexCoord,
        rules: &R,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.turn_phase != TurnPhase::MainPhase || !self.robber_pending {
            return Err(self.illegal(action));
        }
        rules.check_robber(self, hex)?;

        let from = self.board.robber();
        self.board.move_robber(hex);
        self.robber_pending = false;

        Ok(vec![GameEvent::RobberMoved {
            player: self.current_player().id,
            from,
            to: hex,
        }])
    }

    // ==================== Turn Management ====================

    fn end_turn(&mut self, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        if self.turn_phase != TurnPhase::MainPhase {
            return Err(self.illegal(action));
        }
        self.ensure_robber_moved(action)?;

        let player = self.current_player().id;
        self.current_turn_index = (self.current_turn_index + 1) % self.player_count();
        self.dice_roll = None;
        self.turn_phase = TurnPhase::RollDice;

        Ok(vec![GameEvent::TurnEnded {
            player,
            next_player: self.current_player().id,
        }])
    }

    /// Move to the next setup queue entry, or out of setup when exhausted
    fn advance_setup(&mut self) -> Vec<GameEvent> {
        self.setup_position += 1;
        self.setup_settlement = None;
        self.setup_step = SetupStep::AwaitingSettlement;

        if let Some(&next) = self.setup_queue.get(self.setup_position) {
            self.current_turn_index = next;
            return Vec::new();
        }

        self.current_turn_index = self.setup_queue.first().copied().unwrap_or(0);
        self.turn_phase = TurnPhase::RollDice;
        vec![GameEvent::SetupCompleted]
    }
}
