//! Game board: a square grid of water, ship parts and shot outcomes.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{BoardError, ShotResult};
use crate::rules::GameRules;
use crate::ship::{Orientation, ShipInfo, Square};

/// Attempts per ship before a random fleet gives up on the current layout.
const PLACEMENT_ATTEMPTS: usize = 100;
/// Fresh layouts tried by [`Board::random_fleet`] before failing.
const FLEET_ATTEMPTS: usize = 20;

/// What occupies a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SquareType {
    #[default]
    Water,
    ShipPart,
    Hit,
    Miss,
}

impl SquareType {
    /// Layout character for this square type.
    pub const fn symbol(self) -> char {
        match self {
            SquareType::Water => '#',
            SquareType::ShipPart => 'B',
            SquareType::Hit => 'O',
            SquareType::Miss => 'X',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' => Some(SquareType::Water),
            'B' => Some(SquareType::ShipPart),
            'O' => Some(SquareType::Hit),
            'X' => Some(SquareType::Miss),
            _ => None,
        }
    }

    /// Ship parts, hit or not.
    pub fn is_ship(self) -> bool {
        matches!(self, SquareType::ShipPart | SquareType::Hit)
    }

    /// Squares already resolved by a shot.
    pub fn is_resolved(self) -> bool {
        matches!(self, SquareType::Hit | SquareType::Miss)
    }
}

/// A `side`×`side` grid stored row-major. Unset squares are water.
///
/// Boards are values: every operation that changes the grid returns a new board
/// and leaves the receiver untouched.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board {
    side: usize,
    squares: Vec<SquareType>,
}

/// Squares of one board grouped by what occupies them, in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub side: usize,
    pub ship_parts: Vec<Square>,
    pub hits: Vec<Square>,
    pub misses: Vec<Square>,
}

impl Board {
    /// A board of `side`×`side` water squares.
    pub fn empty(side: usize) -> Self {
        Board {
            side,
            squares: vec![SquareType::Water; side * side],
        }
    }

    /// Parse a row-major layout string (`#` water, `B` ship part, `O` hit, `X` miss).
    /// The side is the integer square root of the string length.
    pub fn from_layout(layout: &str) -> Result<Self, BoardError> {
        let squares = layout
            .chars()
            .map(|c| {
                SquareType::from_symbol(c)
                    .ok_or_else(|| BoardError::InvalidFormat(format!("unknown square symbol {c:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let len = squares.len();
        if len == 0 {
            return Err(BoardError::InvalidFormat("layout is empty".into()));
        }
        let side = integer_sqrt(len);
        if side * side != len {
            return Err(BoardError::InvalidFormat(format!(
                "length {len} is not a perfect square"
            )));
        }
        Ok(Board { side, squares })
    }

    /// Row-major layout string; the inverse of [`Board::from_layout`].
    pub fn to_layout(&self) -> String {
        self.squares.iter().map(|s| s.symbol()).collect()
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Square type at `square`.
    pub fn get(&self, square: Square) -> Result<SquareType, BoardError> {
        self.index(square).map(|i| self.squares[i])
    }

    fn index(&self, square: Square) -> Result<usize, BoardError> {
        if square.is_within(self.side) {
            Ok(square.row * self.side + square.column)
        } else {
            Err(BoardError::OutOfBounds(square))
        }
    }

    fn square_at(&self, index: usize) -> Square {
        Square::new(index / self.side, index % self.side)
    }

    /// Returns `true` iff every square of `ship` is on the board and water.
    pub fn can_place(&self, ship: &ShipInfo) -> bool {
        self.check_placement(ship).is_ok()
    }

    fn check_placement(&self, ship: &ShipInfo) -> Result<(), BoardError> {
        if !ship.fits(self.side) {
            return Err(BoardError::InvalidShip {
                origin: ship.origin,
                size: ship.size,
            });
        }
        for square in ship.squares() {
            if self.get(square)? != SquareType::Water {
                return Err(BoardError::Overlap(square));
            }
        }
        Ok(())
    }

    /// New board with the squares of `ship` set to ship parts.
    pub fn place_ship(&self, ship: &ShipInfo) -> Result<Self, BoardError> {
        self.check_placement(ship)?;
        let mut next = self.clone();
        for square in ship.squares() {
            let i = next.index(square)?;
            next.squares[i] = SquareType::ShipPart;
        }
        Ok(next)
    }

    /// Place `ships` in order. The first ship that cannot be placed on the
    /// accumulated board aborts the whole operation.
    pub fn place_ships(&self, ships: &[ShipInfo]) -> Result<Self, BoardError> {
        ships
            .iter()
            .try_fold(self.clone(), |board, ship| board.place_ship(ship))
    }

    /// Resolve a shot in place: water becomes a miss, a ship part becomes a hit.
    /// Firing at a square that is already a hit or a miss is rejected.
    pub fn shoot(&mut self, square: Square) -> Result<ShotResult, BoardError> {
        let i = self.index(square)?;
        match self.squares[i] {
            SquareType::Water => {
                self.squares[i] = SquareType::Miss;
                Ok(ShotResult::Miss)
            }
            SquareType::ShipPart => {
                self.squares[i] = SquareType::Hit;
                Ok(ShotResult::Hit)
            }
            SquareType::Hit | SquareType::Miss => Err(BoardError::AlreadyShot(square)),
        }
    }

    /// New board after a shot at `square`.
    pub fn shot_to(&self, square: Square) -> Result<Self, BoardError> {
        let mut next = self.clone();
        next.shoot(square)?;
        Ok(next)
    }

    /// New board after every shot in `squares`; nothing is applied if any shot fails.
    pub fn make_shots(&self, squares: &[Square]) -> Result<Self, BoardError> {
        let mut next = self.clone();
        for &square in squares {
            next.shoot(square)?;
        }
        Ok(next)
    }

    /// Ship size → number of ships of that size.
    ///
    /// Ships are the orthogonally connected groups of ship squares (hit or not),
    /// so ships placed side by side merge into a single, larger group.
    pub fn fleet_composition(&self) -> BTreeMap<usize, usize> {
        let mut seen = vec![false; self.squares.len()];
        let mut composition = BTreeMap::new();
        for start in 0..self.squares.len() {
            if seen[start] || !self.squares[start].is_ship() {
                continue;
            }
            seen[start] = true;
            let mut size = 0;
            let mut stack = vec![start];
            while let Some(i) = stack.pop() {
                size += 1;
                for n in self.neighbours(self.square_at(i)) {
                    let j = n.row * self.side + n.column;
                    if !seen[j] && self.squares[j].is_ship() {
                        seen[j] = true;
                        stack.push(j);
                    }
                }
            }
            *composition.entry(size).or_insert(0) += 1;
        }
        composition
    }

    pub(crate) fn neighbours(&self, square: Square) -> impl Iterator<Item = Square> + '_ {
        let Square { row, column } = square;
        [
            row.checked_sub(1).map(|r| Square::new(r, column)),
            Some(Square::new(row + 1, column)),
            column.checked_sub(1).map(|c| Square::new(row, c)),
            Some(Square::new(row, column + 1)),
        ]
        .into_iter()
        .flatten()
        .filter(move |sq| sq.is_within(self.side))
    }

    /// Returns `true` when the board holds any ship square, hit or not.
    pub fn has_ships(&self) -> bool {
        self.squares.iter().any(|s| s.is_ship())
    }

    /// Every ship part has been hit. A board that never had ships is not destroyed.
    pub fn is_fleet_destroyed(&self) -> bool {
        self.squares.contains(&SquareType::Hit) && !self.squares.contains(&SquareType::ShipPart)
    }

    pub fn is_in_end_game_state(&self) -> bool {
        self.is_fleet_destroyed()
    }

    /// The board as the opponent may see it: un-hit ship parts become water.
    pub fn redacted(&self) -> Self {
        Board {
            side: self.side,
            squares: self
                .squares
                .iter()
                .map(|&s| match s {
                    SquareType::ShipPart => SquareType::Water,
                    other => other,
                })
                .collect(),
        }
    }

    pub fn view(&self) -> BoardView {
        let mut view = BoardView {
            side: self.side,
            ..BoardView::default()
        };
        for (i, &s) in self.squares.iter().enumerate() {
            let square = self.square_at(i);
            match s {
                SquareType::ShipPart => view.ship_parts.push(square),
                SquareType::Hit => view.hits.push(square),
                SquareType::Miss => view.misses.push(square),
                SquareType::Water => {}
            }
        }
        view
    }

    /// Squares not yet shot at.
    pub fn unresolved_squares(&self) -> impl Iterator<Item = Square> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_resolved())
            .map(|(i, _)| self.square_at(i))
    }

    /// Returns `true` if `ship` can be placed without touching any other ship,
    /// keeping every ship a separate group for [`Board::fleet_composition`].
    fn is_clear_around(&self, ship: &ShipInfo) -> bool {
        self.can_place(ship)
            && ship.squares().all(|sq| {
                self.neighbours(sq)
                    .all(|n| self.get(n).map(|s| !s.is_ship()).unwrap_or(true))
            })
    }

    /// Random placement for a ship of `size` that touches no other ship.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        size: usize,
    ) -> Result<ShipInfo, BoardError> {
        if size == 0 || size > self.side {
            return Err(BoardError::InvalidShip {
                origin: Square::new(0, 0),
                size,
            });
        }
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_r, max_c) = match orientation {
                Orientation::Horizontal => (self.side - 1, self.side - size),
                Orientation::Vertical => (self.side - size, self.side - 1),
            };
            let origin = Square::new(rng.random_range(0..=max_r), rng.random_range(0..=max_c));
            let ship = ShipInfo::new(origin, size, orientation);
            if self.is_clear_around(&ship) {
                return Ok(ship);
            }
        }
        Err(BoardError::InvalidShip {
            origin: Square::new(0, 0),
            size,
        })
    }

    /// A random list of ships matching the fleet composition of `rules`, largest
    /// ships first, with no two ships touching.
    pub fn random_fleet<R: Rng>(rng: &mut R, rules: &GameRules) -> Result<Vec<ShipInfo>, BoardError> {
        let mut sizes: Vec<usize> = rules
            .ship_rules
            .fleet_composition
            .iter()
            .flat_map(|(&size, &count)| std::iter::repeat(size).take(count))
            .collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));

        let mut last_err = BoardError::InvalidShip {
            origin: Square::new(0, 0),
            size: 0,
        };
        'layout: for _ in 0..FLEET_ATTEMPTS {
            let mut board = Board::empty(rules.board_side);
            let mut ships = Vec::with_capacity(sizes.len());
            for &size in &sizes {
                let ship = match board.random_placement(rng, size) {
                    Ok(ship) => ship,
                    Err(e) => {
                        last_err = e;
                        continue 'layout;
                    }
                };
                board = board.place_ship(&ship)?;
                ships.push(ship);
            }
            return Ok(ships);
        }
        Err(last_err)
    }
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_layout())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ side: {} }}", self.side)?;
        for row in self.squares.chunks(self.side.max(1)) {
            let line: String = row.iter().map(|s| s.symbol()).collect();
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.to_layout()
    }
}

impl TryFrom<String> for Board {
    type Error = BoardError;

    fn try_from(layout: String) -> Result<Self, Self::Error> {
        Board::from_layout(&layout)
    }
}
