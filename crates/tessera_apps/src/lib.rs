//! TESSERA Apps
//!
//! Applications that run on the TESSERA engine. Everything here is a pure
//! function of the commands it has seen, so logs replay exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod board;
pub mod tictactoe;

pub use board::{Board, Cell, GameState, Phase, Player, Pos, SIZE};
pub use tictactoe::{Action, MoveRejection, TOPIC, TicTacToe};
