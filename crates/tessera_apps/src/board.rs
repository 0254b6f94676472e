//! Board and turn state for power tic-tac-toe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Board edge length
pub const SIZE: usize = 3;

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Player 1, shown as `X`
    One,
    /// Player 2, shown as `O`
    Two,
}

impl Player {
    /// 1 or 2
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Board symbol
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::One => 'X',
            Self::Two => 'O',
        }
    }

    /// The other player
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Board square
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Owning player, if any
    pub owner: Option<Player>,
    /// Piece power. A piece can sit at power 0 after combat.
    pub power: u32,
}

impl Cell {
    /// Fresh piece of power 1
    #[must_use]
    pub const fn piece(owner: Player) -> Self {
        Self {
            owner: Some(owner),
            power: 1,
        }
    }

    /// Whether nobody owns this cell
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.owner.is_none()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            None => f.write_str("."),
            Some(player) if self.power == 1 => write!(f, "{}", player.symbol()),
            Some(player) => write!(f, "{}{}", player.symbol(), self.power),
        }
    }
}

/// Validated board coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    /// Row, 0 at the top
    pub row: usize,
    /// Column, 0 at the left
    pub col: usize,
}

impl Pos {
    /// Coordinate if both parts are on the board
    #[must_use]
    pub fn new(row: i64, col: i64) -> Option<Self> {
        let row = usize::try_from(row).ok().filter(|r| *r < SIZE)?;
        let col = usize::try_from(col).ok().filter(|c| *c < SIZE)?;
        Some(Self { row, col })
    }

    /// Exactly one step up, down, left or right
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Every row, column and diagonal
const LINES: [[(usize, usize); SIZE]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// 3x3 grid of cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; SIZE]; SIZE],
}

impl Board {
    /// Cell at `pos`
    #[must_use]
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos.row][pos.col]
    }

    /// Mutable cell at `pos`
    pub fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.row][pos.col]
    }

    /// Empty the cell at `pos`
    pub fn clear(&mut self, pos: Pos) {
        *self.cell_mut(pos) = Cell::default();
    }

    fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Cells owned by `player`
    #[must_use]
    pub fn owned_by(&self, player: Player) -> usize {
        self.cells()
            .filter(|cell| cell.owner == Some(player))
            .count()
    }

    /// Complete lines held by `player`, diagonals included
    #[must_use]
    pub fn count_lines(&self, player: Player) -> u32 {
        let held = LINES
            .iter()
            .filter(|line| {
                line.iter()
                    .all(|&(row, col)| self.cells[row][col].owner == Some(player))
            })
            .count();
        // At most eight lines exist.
        u32::try_from(held).unwrap_or(u32::MAX)
    }

    /// Player owning every cell
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        [Player::One, Player::Two]
            .into_iter()
            .find(|player| self.owned_by(*player) == SIZE * SIZE)
    }

    /// Row-major rendering with no separators, e.g. `X..O2.....`
    #[must_use]
    pub fn flattened(&self) -> String {
        self.cells().map(ToString::to_string).collect()
    }
}

/// Part of a turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Spending the power bank on placements and power-ups
    #[default]
    Assignment,
    /// One optional move, combine or attack
    Movement,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment => f.write_str("Assignment"),
            Self::Movement => f.write_str("Movement (optional)"),
        }
    }
}

/// Whole game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Board contents
    pub board: Board,
    /// Player to act
    pub current: Player,
    /// Current phase of the turn
    pub phase: Phase,
    /// Set once a player owns the whole board
    pub done: bool,
    /// Movement action used this turn
    pub movement_taken: bool,
    banks: [u32; 2],
    first_turn_done: [bool; 2],
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: Board::default(),
            current: Player::One,
            phase: Phase::Assignment,
            done: false,
            movement_taken: false,
            banks: [1, 1],
            first_turn_done: [false, false],
        }
    }
}

impl GameState {
    /// Power bank of `player`
    #[must_use]
    pub fn bank(&self, player: Player) -> u32 {
        self.banks[player.index()]
    }

    /// Mutable power bank of `player`
    pub fn bank_mut(&mut self, player: Player) -> &mut u32 {
        &mut self.banks[player.index()]
    }

    /// Whether `player` has finished a turn
    #[must_use]
    pub fn first_turn_done(&self, player: Player) -> bool {
        self.first_turn_done[player.index()]
    }

    /// Finish the current turn.
    ///
    /// Ends the game instead if one player holds the whole board. Once both
    /// players have played a turn, the next player's bank grows by one plus
    /// one per line they hold.
    pub fn end_turn(&mut self) {
        if self.board.winner().is_some() {
            self.done = true;
            return;
        }

        self.first_turn_done[self.current.index()] = true;
        self.current = self.current.opponent();

        if self.first_turn_done.iter().all(|done| *done) {
            let bonus = 1 + self.board.count_lines(self.current);
            *self.bank_mut(self.current) += bonus;
        }

        self.phase = Phase::Assignment;
        self.movement_taken = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i64, col: i64) -> Pos {
        Pos::new(row, col).unwrap()
    }

    #[test]
    fn test_pos_bounds() {
        assert!(Pos::new(0, 0).is_some());
        assert!(Pos::new(2, 2).is_some());
        assert!(Pos::new(3, 0).is_none());
        assert!(Pos::new(0, -1).is_none());
        assert_eq!(pos(1, 2).to_string(), "(1,2)");
    }

    #[test]
    fn test_adjacency() {
        assert!(pos(1, 1).is_adjacent(pos(0, 1)));
        assert!(pos(1, 1).is_adjacent(pos(1, 2)));
        assert!(!pos(1, 1).is_adjacent(pos(2, 2)));
        assert!(!pos(1, 1).is_adjacent(pos(1, 1)));
    }

    #[test]
    fn test_cell_rendering() {
        let mut board = Board::default();
        *board.cell_mut(pos(0, 0)) = Cell::piece(Player::One);
        *board.cell_mut(pos(1, 1)) = Cell {
            owner: Some(Player::Two),
            power: 3,
        };
        *board.cell_mut(pos(2, 2)) = Cell {
            owner: Some(Player::One),
            power: 0,
        };
        assert_eq!(board.flattened(), "X...O3...X0");
    }

    #[test]
    fn test_lines_include_diagonals() {
        let mut board = Board::default();
        for (r, c) in [(0, 0), (1, 1), (2, 2), (0, 1), (0, 2)] {
            *board.cell_mut(pos(r, c)) = Cell::piece(Player::Two);
        }
        assert_eq!(board.count_lines(Player::Two), 2);
        assert_eq!(board.count_lines(Player::One), 0);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_winner_owns_every_cell() {
        let mut board = Board::default();
        for r in 0..3 {
            for c in 0..3 {
                *board.cell_mut(pos(r, c)) = Cell::piece(Player::One);
            }
        }
        assert_eq!(board.winner(), Some(Player::One));
        assert_eq!(board.count_lines(Player::One), 8);
    }

    #[test]
    fn test_end_turn_bonus_after_both_first_turns() {
        let mut state = GameState::default();
        *state.bank_mut(Player::One) = 0;

        state.end_turn();
        assert_eq!(state.current, Player::Two);
        assert_eq!(state.bank(Player::Two), 1);

        *state.bank_mut(Player::Two) = 0;
        state.end_turn();
        assert_eq!(state.current, Player::One);
        assert_eq!(state.bank(Player::One), 1);
        assert_eq!(state.phase, Phase::Assignment);
    }

    #[test]
    fn test_end_turn_with_full_board_finishes_game() {
        let mut state = GameState::default();
        for r in 0..3 {
            for c in 0..3 {
                *state.board.cell_mut(pos(r, c)) = Cell::piece(Player::Two);
            }
        }
        state.end_turn();
        assert!(state.done);
        assert_eq!(state.current, Player::One);
    }

    #[test]
    fn test_state_snapshot_roundtrip() {
        let mut state = GameState::default();
        *state.board.cell_mut(pos(0, 1)) = Cell {
            owner: Some(Player::Two),
            power: 4,
        };
        state.phase = Phase::Movement;
        state.end_turn();

        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.board.flattened(), ".O4.......");
        assert!(restored.first_turn_done(Player::One));
    }
}
