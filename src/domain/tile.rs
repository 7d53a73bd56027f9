/// Tile types and the fixed-size tile grid.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Ground,
    HardBlock,
    Brick,
    Question,          // coin
    QuestionMushroom,
    QuestionFlower,
    QuestionStar,
    QuestionSpent,
    PipeLeft,
    PipeRight,
    PipeTopLeft,
    PipeTopRight,
    FlagPole,
    FlagTop,
    Coral,             // decorative, passable
}

/// What a question block releases when struck from below.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockContent {
    Coin,
    Mushroom,
    FireFlower,
    Star,
}

impl Tile {
    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        !matches!(self, Tile::Empty | Tile::FlagTop | Tile::FlagPole | Tile::Coral)
    }

    /// Touching this tile completes the level.
    pub fn is_flag(self) -> bool {
        matches!(self, Tile::FlagTop | Tile::FlagPole)
    }

    /// Content of an unspent question block.
    pub fn question_content(self) -> Option<BlockContent> {
        match self {
            Tile::Question => Some(BlockContent::Coin),
            Tile::QuestionMushroom => Some(BlockContent::Mushroom),
            Tile::QuestionFlower => Some(BlockContent::FireFlower),
            Tile::QuestionStar => Some(BlockContent::Star),
            _ => None,
        }
    }
}

/// Row-major tile grid. Dimensions are fixed for the lifetime of a level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        TileGrid { width, height, cells: vec![Tile::Empty; width * height] }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    /// Tile at signed cell coordinates. Out of range reads as `Empty`.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 { return Tile::Empty; }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height { return Tile::Empty; }
        self.cells[y * self.width + x]
    }

    /// Write a tile. Out of range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if x < 0 || y < 0 { return; }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = tile;
        }
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_solid()
    }

    /// Iterate non-empty cells as `(x, y, tile)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.cells.iter().enumerate()
            .filter(|(_, t)| **t != Tile::Empty)
            .map(move |(i, t)| (i % self.width, i / self.width, *t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passable_tiles() {
        for t in [Tile::Empty, Tile::FlagTop, Tile::FlagPole, Tile::Coral] {
            assert!(!t.is_solid(), "{t:?} should be passable");
        }
        for t in [Tile::Ground, Tile::Brick, Tile::QuestionSpent, Tile::PipeTopRight] {
            assert!(t.is_solid(), "{t:?} should be solid");
        }
    }

    #[test]
    fn out_of_range_is_empty() {
        let g = TileGrid::new(3, 2);
        assert_eq!(g.get(-1, 0), Tile::Empty);
        assert_eq!(g.get(3, 0), Tile::Empty);
        assert_eq!(g.get(0, 2), Tile::Empty);
        assert!(!g.is_solid(100, 100));
    }

    #[test]
    fn set_and_get() {
        let mut g = TileGrid::new(3, 2);
        g.set(2, 1, Tile::Brick);
        g.set(5, 5, Tile::Ground); // ignored
        assert_eq!(g.get(2, 1), Tile::Brick);
        assert_eq!(g.occupied().count(), 1);
    }

    #[test]
    fn question_contents() {
        assert_eq!(Tile::QuestionStar.question_content(), Some(BlockContent::Star));
        assert_eq!(Tile::QuestionSpent.question_content(), None);
        assert_eq!(Tile::Brick.question_content(), None);
    }
}
