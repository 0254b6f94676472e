//! Power tic-tac-toe on topic `ttt`.
//!
//! Each turn starts with an assignment phase that spends the player's power
//! bank on placing pieces or powering them up. Once the bank is empty the
//! player may make one move, combine or attack, or end the turn. Owning
//! all nine cells wins.
//!
//! Actions: `new`, `show`, `move` (payload `<fr> <fc> <tr> <tc>`) and
//! `endturn`. Unknown actions produce no output.

use crate::board::{Cell, GameState, Phase, Player, Pos};
use tessera_core::Command;
use tessera_runtime::{Application, Outbox};
use thiserror::Error;
use tracing::debug;

/// Topic this application handles
pub const TOPIC: &str = "ttt";

/// What a `move` command does, decided by its two coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Same cell, empty: new piece from the bank
    Place,
    /// Same cell, occupied: +1 power from the bank
    PowerUp,
    /// To an adjacent empty cell
    Move,
    /// Into an adjacent own piece
    Combine,
    /// Into an adjacent opponent piece
    Attack,
}

impl Action {
    /// Classify a move by the current player from `from` to `to`
    #[must_use]
    pub fn classify(state: &GameState, from: Pos, to: Pos) -> Self {
        if from == to {
            return if state.board.cell(from).is_empty() {
                Self::Place
            } else {
                Self::PowerUp
            };
        }
        match state.board.cell(to).owner {
            None => Self::Move,
            Some(owner) if owner == state.current => Self::Combine,
            Some(_) => Self::Attack,
        }
    }

    /// Allowed during [`Phase::Assignment`]
    #[must_use]
    pub const fn is_assignment(self) -> bool {
        matches!(self, Self::Place | Self::PowerUp)
    }
}

/// Why a move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    /// A coordinate is off the board
    #[error("coordinate off the board")]
    OutOfBounds,
    /// The action does not belong to the current phase
    #[error("{action:?} not allowed in {phase} phase")]
    WrongPhase {
        /// Attempted action
        action: Action,
        /// Phase at the time
        phase: Phase,
    },
    /// The power bank is empty
    #[error("power bank is empty")]
    BankEmpty,
    /// The source cell belongs to someone else
    #[error("source cell is not owned by the current player")]
    NotOwner,
    /// The source piece has no power left
    #[error("source piece has no power")]
    NoPower,
    /// The target is not one orthogonal step away
    #[error("target is not adjacent")]
    NotAdjacent,
    /// The turn's movement action is used up
    #[error("movement action already taken")]
    MovementTaken,
}

/// Parse `<fr> <fc> <tr> <tc>`; anything after the fourth number is ignored
fn parse_coordinates(payload: &str) -> Option<[i64; 4]> {
    let mut numbers = payload.split_whitespace().map(str::parse::<i64>);
    let mut out = [0; 4];
    for slot in &mut out {
        *slot = numbers.next()?.ok()?;
    }
    Some(out)
}

/// The game as an [`Application`]
#[derive(Debug, Clone, Default)]
pub struct TicTacToe {
    state: GameState,
}

impl TicTacToe {
    /// Game in its initial state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Apply a move by the current player.
    ///
    /// Returns the message describing what happened.
    ///
    /// # Errors
    ///
    /// Returns the reason when the move is not legal; the state is then
    /// unchanged
    pub fn make_move(
        &mut self,
        from: (i64, i64),
        to: (i64, i64),
    ) -> Result<String, MoveRejection> {
        let from = Pos::new(from.0, from.1).ok_or(MoveRejection::OutOfBounds)?;
        let to = Pos::new(to.0, to.1).ok_or(MoveRejection::OutOfBounds)?;
        let action = Action::classify(&self.state, from, to);
        let phase = self.state.phase;

        match phase {
            Phase::Assignment if action.is_assignment() => self.assign(from, action),
            Phase::Movement if !action.is_assignment() => {
                if self.state.movement_taken {
                    return Err(MoveRejection::MovementTaken);
                }
                self.movement(from, to, action)
            }
            _ => Err(MoveRejection::WrongPhase { action, phase }),
        }
    }

    fn assign(&mut self, pos: Pos, action: Action) -> Result<String, MoveRejection> {
        let player = self.state.current;
        let cell = self.state.board.cell(pos);

        if action == Action::PowerUp && cell.owner != Some(player) {
            return Err(MoveRejection::NotOwner);
        }
        if self.state.bank(player) == 0 {
            return Err(MoveRejection::BankEmpty);
        }
        *self.state.bank_mut(player) -= 1;
        let bank = self.state.bank(player);

        let mut message = if action == Action::Place {
            *self.state.board.cell_mut(pos) = Cell::piece(player);
            format!("Placed piece at {pos} (bank: {bank})")
        } else {
            let target = self.state.board.cell_mut(pos);
            target.power += 1;
            format!("Power up: {pos} now has power {} (bank: {bank})", target.power)
        };

        if bank == 0 {
            self.state.phase = Phase::Movement;
            message.push_str(
                " [Assignment complete - you may now move/attack/combine, or end turn]",
            );
        }
        Ok(message)
    }

    fn movement(&mut self, from: Pos, to: Pos, action: Action) -> Result<String, MoveRejection> {
        let player = self.state.current;
        let source = self.state.board.cell(from);
        let target = self.state.board.cell(to);

        if source.owner != Some(player) {
            return Err(MoveRejection::NotOwner);
        }
        if source.power == 0 {
            return Err(MoveRejection::NoPower);
        }
        if !from.is_adjacent(to) {
            return Err(MoveRejection::NotAdjacent);
        }

        let opponent = player.opponent();
        let own_before = self.state.board.count_lines(player);
        let their_before = self.state.board.count_lines(opponent);
        let board = &mut self.state.board;

        let mut message = match action {
            Action::Move => {
                *board.cell_mut(to) = source;
                board.clear(from);
                format!("Move: {from} -> {to}")
            }
            Action::Combine => {
                let power = source.power + target.power;
                board.cell_mut(to).power = power;
                board.clear(from);
                format!("Combine: {from} + {to} -> power {power}")
            }
            Action::Attack => {
                let (attack, defense) = (source.power, target.power);
                board.cell_mut(from).power = 0;
                if attack > defense {
                    let power = attack - defense;
                    *board.cell_mut(to) = Cell {
                        owner: Some(player),
                        power,
                    };
                    format!(
                        "Combat: {from} defeats {to} [{attack} vs {defense}] - Captured with power {power}"
                    )
                } else if attack == defense {
                    board.cell_mut(to).power = 0;
                    format!(
                        "Combat: {from} draws with {to} [{attack} vs {defense}] - Both reduced to power 0"
                    )
                } else {
                    let power = defense - attack;
                    board.cell_mut(to).power = power;
                    format!(
                        "Combat: {from} defeated by {to} [{attack} vs {defense}] - Attacker eliminated, defender at power {power}"
                    )
                }
            }
            Action::Place | Action::PowerUp => {
                return Err(MoveRejection::WrongPhase {
                    action,
                    phase: Phase::Movement,
                });
            }
        };

        let formed = self.state.board.count_lines(player).saturating_sub(own_before);
        let lost = their_before.saturating_sub(self.state.board.count_lines(opponent));
        if formed > 0 {
            message.push_str(&format!(" [Formed {formed} line(s)!]"));
        }
        if lost > 0 {
            message.push_str(&format!(" [Opponent lost {lost} line(s)!]"));
        }

        self.state.movement_taken = true;
        self.state.end_turn();
        Ok(message)
    }

    fn show(&self, outbox: &mut Outbox) {
        let state = &self.state;
        outbox.emit(state.board.flattened());
        outbox.emit(format!("Player 1 (X) Power Bank: {}", state.bank(Player::One)));
        outbox.emit(format!("Player 2 (O) Power Bank: {}", state.bank(Player::Two)));
        outbox.emit(format!("Current Turn: Player {}", state.current.number()));
        outbox.emit(format!("Current Phase: {}", state.phase));
    }

    fn on_move(&mut self, payload: &str, outbox: &mut Outbox) {
        let Some([fr, fc, tr, tc]) = parse_coordinates(payload) else {
            outbox.emit("invalid user action");
            return;
        };
        if self.state.done {
            outbox.emit("Move rejected - game ended");
            return;
        }

        match self.make_move((fr, fc), (tr, tc)) {
            Ok(message) => {
                outbox.emit(message);
                if self.state.done {
                    match self.state.board.winner() {
                        Some(player) => {
                            outbox.emit(format!("Game Over: Player {} wins", player.number()));
                        }
                        None => outbox.emit("Game Over: Tie"),
                    }
                }
                self.show(outbox);
            }
            Err(reason) => {
                debug!(payload, %reason, "Move rejected");
                outbox.emit("Invalid move");
            }
        }
    }

    fn on_end_turn(&mut self, outbox: &mut Outbox) {
        if self.state.done {
            outbox.emit("Turn end rejected - game ended");
        } else if self.state.phase == Phase::Movement {
            self.state.end_turn();
            outbox.emit("Turn ended");
            self.show(outbox);
        } else {
            outbox.emit("Must complete assignment phase first (power bank must be 0)");
        }
    }
}

impl Application for TicTacToe {
    fn topics(&self) -> Vec<String> {
        vec![TOPIC.to_string()]
    }

    fn on_event(&mut self, command: &Command, outbox: &mut Outbox) {
        match command.action() {
            "new" => {
                self.state = GameState::default();
                outbox.emit("new game command processed");
                self.show(outbox);
            }
            "show" => {
                outbox.emit("show command processed");
                self.show(outbox);
            }
            "move" => self.on_move(command.payload(), outbox),
            "endturn" => self.on_end_turn(outbox),
            other => debug!(action = other, "Ignoring unknown action"),
        }
    }
}
