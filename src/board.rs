//! Board topology: point identifiers, adjacency and mill lines.
//!
//! Points are numbered ring-major from the innermost ring outwards. Within a
//! ring numbering starts at the top-left corner and runs clockwise, so even
//! offsets are corners and odd offsets are edge midpoints. Midpoints are the
//! only points connected across rings.
//!
//! A [`Board`] never changes once built. Game states share it behind an
//! [`Arc`] and only track occupancy themselves.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::constants::{
    ID_ALPHABET, MAX_RINGS, MILL_LEN, MILLS_PER_RING, MIN_RINGS, POINTS_PER_RING,
};
use crate::error::MorrisError;

/// A point on the board, represented as an index into the board's point list.
pub type Point = usize;

/// The textual identifier of a point, as used in actions and snapshots.
pub type PointId = Arc<str>;

/// Three points forming a mill.
pub type MillLine = [Point; MILL_LEN];

/// Which lines count as mills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MillLayout {
    /// Only the four sides of every ring.
    #[default]
    Rings,
    /// Ring sides plus the radial lines through edge midpoints of every
    /// three consecutive rings.
    RingsAndSpokes,
}

/// Immutable point graph and mill lines of a morris board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    ids: Vec<PointId>,
    neighbors: Vec<Vec<Point>>,
    lines: Vec<MillLine>,
    index: HashMap<PointId, Point>,
}

impl Board {
    /// Generate a board with `rings` concentric rings.
    ///
    /// # Errors
    /// [`MorrisError::UnsupportedRingCount`] if `rings` is outside
    /// `MIN_RINGS..=MAX_RINGS`.
    pub fn generate(rings: usize, layout: MillLayout) -> Result<Self, MorrisError> {
        if !(MIN_RINGS..=MAX_RINGS).contains(&rings) {
            return Err(MorrisError::UnsupportedRingCount {
                rings,
                min: MIN_RINGS,
                max: MAX_RINGS,
            });
        }
        Ok(Self::build(rings, layout))
    }

    /// Build a board without checking the ring bound.
    pub(crate) fn build(rings: usize, layout: MillLayout) -> Self {
        let mut lines = ring_mills(rings);
        if layout == MillLayout::RingsAndSpokes {
            lines.extend(spoke_mills(rings));
        }
        Self::assemble(
            generate_ids(rings * POINTS_PER_RING),
            ring_neighbors(rings),
            lines,
        )
    }

    /// Rebuild a board from identifiers, per-point neighbor ids and mill lines.
    ///
    /// Used when loading snapshots. Every referenced id must exist and
    /// adjacency must be symmetric.
    pub fn from_parts(
        ids: Vec<PointId>,
        neighbors: Vec<Vec<PointId>>,
        lines: Vec<[PointId; MILL_LEN]>,
    ) -> Result<Self, MorrisError> {
        if ids.is_empty() {
            return Err(MorrisError::InvalidSnapshot("board has no points".into()));
        }
        if ids.len() != neighbors.len() {
            return Err(MorrisError::InvalidSnapshot(format!(
                "{} points but {} neighbor lists",
                ids.len(),
                neighbors.len()
            )));
        }

        let index: HashMap<PointId, Point> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        if index.len() != ids.len() {
            return Err(MorrisError::InvalidSnapshot("duplicate point id".into()));
        }

        let lookup = |id: &PointId| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| MorrisError::UnknownPoint(id.to_string()))
        };

        let neighbors = neighbors
            .iter()
            .map(|around| around.iter().map(lookup).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;

        for (pt, around) in neighbors.iter().enumerate() {
            if let Some(&other) = around.iter().find(|&&n| !neighbors[n].contains(&pt)) {
                return Err(MorrisError::InvalidSnapshot(format!(
                    "adjacency between `{}` and `{}` is one-sided",
                    ids[pt], ids[other]
                )));
            }
        }

        let lines = lines
            .iter()
            .map(|line| {
                Ok([lookup(&line[0])?, lookup(&line[1])?, lookup(&line[2])?])
            })
            .collect::<Result<Vec<_>, MorrisError>>()?;

        Ok(Self::assemble(ids, neighbors, lines))
    }

    fn assemble(ids: Vec<PointId>, neighbors: Vec<Vec<Point>>, lines: Vec<MillLine>) -> Self {
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            ids,
            neighbors,
            lines,
            index,
        }
    }

    /// Number of points on the board.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of complete rings.
    pub fn rings(&self) -> usize {
        self.ids.len() / POINTS_PER_RING
    }

    /// All points in board order.
    pub fn points(&self) -> Range<Point> {
        0..self.ids.len()
    }

    /// Identifier of a point.
    pub fn id(&self, pt: Point) -> &PointId {
        &self.ids[pt]
    }

    /// All identifiers in board order.
    pub fn ids(&self) -> &[PointId] {
        &self.ids
    }

    /// Look up a point by identifier.
    pub fn parse_id(&self, id: &str) -> Option<Point> {
        self.index.get(id).copied()
    }

    pub fn neighbors(&self, pt: Point) -> &[Point] {
        &self.neighbors[pt]
    }

    pub fn is_neighbor(&self, from: Point, to: Point) -> bool {
        self.neighbors[from].contains(&to)
    }

    /// Mill lines in generation order.
    pub fn lines(&self) -> &[MillLine] {
        &self.lines
    }
}

/// Build `count` identifiers: `a..z`, then `aa..zz`, then `aaa..zzz`.
fn generate_ids(count: usize) -> Vec<PointId> {
    let wrap = ID_ALPHABET.len();
    (0..count)
        .map(|i| {
            let letter = ID_ALPHABET[i % wrap] as char;
            PointId::from(letter.to_string().repeat(i / wrap + 1))
        })
        .collect()
}

/// Same-ring neighbors first, then the inner and outer midpoint links.
fn ring_neighbors(rings: usize) -> Vec<Vec<Point>> {
    let count = rings * POINTS_PER_RING;
    let mut neighbors: Vec<Vec<Point>> = (0..count)
        .map(|i| match i % POINTS_PER_RING {
            0 => vec![i + 1, i + POINTS_PER_RING - 1],
            offset if offset == POINTS_PER_RING - 1 => vec![i - 1, i + 1 - POINTS_PER_RING],
            _ => vec![i - 1, i + 1],
        })
        .collect();

    for (i, around) in neighbors.iter_mut().enumerate() {
        if i % 2 == 0 {
            continue;
        }
        let ring = i / POINTS_PER_RING;
        if ring > 0 {
            around.push(i - POINTS_PER_RING);
        }
        if ring + 1 < rings {
            around.push(i + POINTS_PER_RING);
        }
    }
    neighbors
}

/// The four sides of each ring; the last side wraps back to the ring's first point.
fn ring_mills(rings: usize) -> Vec<MillLine> {
    let mut lines = Vec::with_capacity(rings * MILLS_PER_RING);
    for ring in 0..rings {
        let base = ring * POINTS_PER_RING;
        for side in 0..MILLS_PER_RING {
            let start = 2 * side;
            lines.push([
                base + start,
                base + start + 1,
                base + (start + 2) % POINTS_PER_RING,
            ]);
        }
    }
    lines
}

/// Radial lines through matching midpoints of three consecutive rings.
fn spoke_mills(rings: usize) -> Vec<MillLine> {
    let mut lines = Vec::new();
    for inner in 0..rings.saturating_sub(MILL_LEN - 1) {
        for slot in (1..POINTS_PER_RING).step_by(2) {
            let pt = inner * POINTS_PER_RING + slot;
            lines.push([pt, pt + POINTS_PER_RING, pt + 2 * POINTS_PER_RING]);
        }
    }
    lines
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pt in self.points() {
            write!(f, "{}:", self.ids[pt])?;
            for &n in &self.neighbors[pt] {
                write!(f, " {}", self.ids[n])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
