//! Hex coordinate system using cube coordinates (q, r, s).
//!
//! This module provides the foundational coordinate types for the board:
//! - `HexCoord`: Identifies individual hex tiles
//! - `Direction`: One of the six edges or six vertices of a tile, clockwise from east
//! - `EdgeKey`: Canonical identifier of an edge, where roads are placed
//! - `VertexKey`: Canonical identifier of a vertex, where settlements and cities are placed
//!
//! The layout is pointy-top with screen y growing downward. Edge `d` sits at
//! `60·d` degrees from the tile center and vertex `d` at `60·d − 30` degrees,
//! so edge `d` joins vertex `d` and vertex `d + 1`.
//!
//! An edge can be named from two tiles and a vertex from three. Keys fold every
//! such name onto the smallest `(q, r, s, direction)` reference, so equality of
//! keys is equality of the physical edge or vertex.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Pixel radius of a tile, center to vertex.
pub const HEX_SIZE: f64 = 60.0;

/// Largest magnitude accepted for any cube component. Keeps neighbour and
/// key arithmetic well inside `i32`.
pub const MAX_COORD: i32 = 1024;

/// Errors raised when building coordinates from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("cube coordinates must sum to zero, got ({q}, {r}, {s})")]
    InvalidCube { q: i32, r: i32, s: i32 },

    #[error("cube coordinates must be within ±1024, got ({q}, {r}, {s})")]
    OutOfRange { q: i32, r: i32, s: i32 },

    #[error("direction must be between 0 and 5, got {0}")]
    InvalidDirection(u8),
}

/// Direction of an edge or vertex relative to a tile.
///
/// `0` is due east and indices increase clockwise in 60 degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Direction(u8);

impl Direction {
    /// All six directions in clockwise order starting from east
    pub const ALL: [Direction; 6] = [
        Direction(0),
        Direction(1),
        Direction(2),
        Direction(3),
        Direction(4),
        Direction(5),
    ];

    pub const EAST: Direction = Direction(0);
    pub const SOUTH_EAST: Direction = Direction(1);
    pub const SOUTH_WEST: Direction = Direction(2);
    pub const WEST: Direction = Direction(3);
    pub const NORTH_WEST: Direction = Direction(4);
    pub const NORTH_EAST: Direction = Direction(5);

    /// Create a direction from its index, `None` if out of range
    pub const fn new(index: u8) -> Option<Self> {
        if index < 6 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Rotate clockwise by `steps` sixths of a turn
    pub const fn rotate(self, steps: u8) -> Self {
        Self((self.0 + steps % 6) % 6)
    }

    /// The direction pointing the other way
    pub const fn opposite(self) -> Self {
        self.rotate(3)
    }

    /// The previous direction counter-clockwise
    pub const fn previous(self) -> Self {
        self.rotate(5)
    }

    /// Cube offset to the neighbouring tile across edge `self`
    pub const fn offset(self) -> HexCoord {
        match self.0 {
            0 => HexCoord::from_axial(1, 0),
            1 => HexCoord::from_axial(0, 1),
            2 => HexCoord::from_axial(-1, 1),
            3 => HexCoord::from_axial(-1, 0),
            4 => HexCoord::from_axial(0, -1),
            _ => HexCoord::from_axial(1, -1),
        }
    }

    /// Angle of the edge midpoint, in degrees
    pub fn edge_angle(self) -> f64 {
        60.0 * f64::from(self.0)
    }

    /// Angle of the vertex, in degrees
    pub fn vertex_angle(self) -> f64 {
        60.0 * f64::from(self.0) - 30.0
    }
}

impl TryFrom<u8> for Direction {
    type Error = HexError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index).ok_or(HexError::InvalidDirection(index))
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction.0
    }
}

/// Cube coordinate for the hex grid.
///
/// `q` grows going east, `r` grows going south-east and `s` closes the
/// triple so that `q + r + s == 0`. Ordering is lexicographic on `(q, r, s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CubeTriple")]
pub struct HexCoord {
    q: i32,
    r: i32,
    s: i32,
}

#[derive(Deserialize)]
struct CubeTriple {
    q: i32,
    r: i32,
    s: i32,
}

impl TryFrom<CubeTriple> for HexCoord {
    type Error = HexError;

    fn try_from(raw: CubeTriple) -> Result<Self, Self::Error> {
        Self::try_new(raw.q, raw.r, raw.s)
    }
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0, s: 0 };

    /// Create a hex coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `q + r + s != 0` or a component exceeds [`MAX_COORD`].
    /// Use [`HexCoord::try_new`] for untrusted input.
    pub fn new(q: i32, r: i32, s: i32) -> Self {
        match Self::try_new(q, r, s) {
            Ok(hex) => hex,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a hex coordinate, rejecting out-of-range triples and triples
    /// that do not sum to zero
    pub fn try_new(q: i32, r: i32, s: i32) -> Result<Self, HexError> {
        if [q, r, s].iter().any(|c| c.unsigned_abs() > MAX_COORD.unsigned_abs()) {
            return Err(HexError::OutOfRange { q, r, s });
        }
        if q + r + s != 0 {
            return Err(HexError::InvalidCube { q, r, s });
        }
        Ok(Self { q, r, s })
    }

    /// Create from the two axial components; `s` is derived
    pub const fn from_axial(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    pub const fn q(&self) -> i32 {
        self.q
    }

    pub const fn r(&self) -> i32 {
        self.r
    }

    pub const fn s(&self) -> i32 {
        self.s
    }

    /// The neighbouring hex across edge `direction`
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        *self + direction.offset()
    }

    /// The six neighbouring hexes in clockwise order starting from east
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let diff = *self - *other;
        (diff.q.unsigned_abs() + diff.r.unsigned_abs() + diff.s.unsigned_abs()) / 2
    }

    /// Get all six vertices of this hex, indexed by direction
    pub fn vertices(&self) -> [VertexKey; 6] {
        Direction::ALL.map(|dir| VertexKey::new(*self, dir))
    }

    /// Get all six edges of this hex, indexed by direction
    pub fn edges(&self) -> [EdgeKey; 6] {
        Direction::ALL.map(|dir| EdgeKey::new(*self, dir))
    }

    /// Convert to pixel coordinates (center of hex) for a given hex size
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let q = f64::from(self.q);
        let r = f64::from(self.r);
        let x = hex_size * 3.0_f64.sqrt() * (q + r / 2.0);
        let y = hex_size * 1.5 * r;
        (x, y)
    }

    /// Convert to plane coordinates using [`HEX_SIZE`]
    pub fn to_plane(&self) -> (f64, f64) {
        self.to_pixel(HEX_SIZE)
    }

    /// All hexes within `radius` steps of the origin, ordered by `q` then `r`
    pub fn hexagon(radius: i32) -> Vec<HexCoord> {
        let mut hexes = Vec::new();
        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                hexes.push(HexCoord::from_axial(q, r));
            }
        }
        hexes
    }
}

impl Default for HexCoord {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Add for HexCoord {
    type Output = HexCoord;

    fn add(self, other: HexCoord) -> HexCoord {
        HexCoord {
            q: self.q + other.q,
            r: self.r + other.r,
            s: self.s + other.s,
        }
    }
}

impl Sub for HexCoord {
    type Output = HexCoord;

    fn sub(self, other: HexCoord) -> HexCoord {
        HexCoord {
            q: self.q - other.q,
            r: self.r - other.r,
            s: self.s - other.s,
        }
    }
}

/// A raw `(hex, direction)` reference to an edge or vertex, as a client names it.
///
/// Several placements can denote the same edge or vertex; convert with
/// [`Placement::edge`] or [`Placement::vertex`] before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub hex: HexCoord,
    pub direction: Direction,
}

impl Placement {
    pub const fn new(hex: HexCoord, direction: Direction) -> Self {
        Self { hex, direction }
    }

    pub fn edge(self) -> EdgeKey {
        EdgeKey::new(self.hex, self.direction)
    }

    pub fn vertex(self) -> VertexKey {
        VertexKey::new(self.hex, self.direction)
    }
}

/// Canonical edge key for `(hex, direction)`
pub fn edge_key(hex: HexCoord, direction: Direction) -> EdgeKey {
    EdgeKey::new(hex, direction)
}

/// Canonical vertex key for `(hex, direction)`
pub fn vertex_key(hex: HexCoord, direction: Direction) -> VertexKey {
    VertexKey::new(hex, direction)
}

/// Edge key - identifies a side of a hex where roads are built.
///
/// Each edge is shared by two hexes: `(h, d)` and `(h + offset(d), d + 3)`.
/// The key always holds the smaller of the two references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Placement")]
pub struct EdgeKey {
    hex: HexCoord,
    direction: Direction,
}

impl From<Placement> for EdgeKey {
    fn from(placement: Placement) -> Self {
        placement.edge()
    }
}

impl EdgeKey {
    /// Create an edge key (always canonical)
    pub fn new(hex: HexCoord, direction: Direction) -> Self {
        let [a, b] = Self::references_of(hex, direction);
        let raw = |p: Placement| Self {
            hex: p.hex,
            direction: p.direction,
        };
        raw(a).min(raw(b))
    }

    fn references_of(hex: HexCoord, direction: Direction) -> [Placement; 2] {
        [
            Placement::new(hex, direction),
            Placement::new(hex.neighbor(direction), direction.opposite()),
        ]
    }

    pub fn hex(&self) -> HexCoord {
        self.hex
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The canonical reference as a placement
    pub fn placement(&self) -> Placement {
        Placement::new(self.hex, self.direction)
    }

    /// Every `(hex, direction)` pair naming this edge
    pub fn references(&self) -> [Placement; 2] {
        Self::references_of(self.hex, self.direction)
    }

    /// Get the 2 hexes that share this edge
    pub fn touching_hexes(&self) -> [HexCoord; 2] {
        [self.hex, self.hex.neighbor(self.direction)]
    }

    /// Get the 2 vertices at the endpoints of this edge
    pub fn endpoints(&self) -> [VertexKey; 2] {
        [
            VertexKey::new(self.hex, self.direction),
            VertexKey::new(self.hex, self.direction.rotate(1)),
        ]
    }

    /// Get edges that share a vertex with this edge
    pub fn adjacent_edges(&self) -> Vec<EdgeKey> {
        let mut adjacent = HashSet::new();
        for vertex in self.endpoints() {
            for edge in vertex.touching_edges() {
                if edge != *self {
                    adjacent.insert(edge);
                }
            }
        }
        let mut adjacent: Vec<EdgeKey> = adjacent.into_iter().collect();
        adjacent.sort();
        adjacent
    }

    /// Convert to pixel coordinates (midpoint of edge)
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let (cx, cy) = self.hex.to_pixel(hex_size);
        let inner_radius = 3.0_f64.sqrt() / 2.0 * hex_size;
        let angle = self.direction.edge_angle().to_radians();
        (cx + inner_radius * angle.cos(), cy + inner_radius * angle.sin())
    }
}

/// Vertex key - identifies a corner where up to three hexes meet.
///
/// The vertex `(h, d)` is also `(h + offset(d - 1), d + 2)` and
/// `(h + offset(d), d + 4)`. The key always holds the smallest of the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Placement")]
pub struct VertexKey {
    hex: HexCoord,
    direction: Direction,
}

impl From<Placement> for VertexKey {
    fn from(placement: Placement) -> Self {
        placement.vertex()
    }
}

impl VertexKey {
    /// Create a vertex key (always canonical)
    pub fn new(hex: HexCoord, direction: Direction) -> Self {
        let [a, b, c] = Self::references_of(hex, direction);
        let raw = |p: Placement| Self {
            hex: p.hex,
            direction: p.direction,
        };
        raw(a).min(raw(b)).min(raw(c))
    }

    fn references_of(hex: HexCoord, direction: Direction) -> [Placement; 3] {
        [
            Placement::new(hex, direction),
            Placement::new(hex.neighbor(direction.previous()), direction.rotate(2)),
            Placement::new(hex.neighbor(direction), direction.rotate(4)),
        ]
    }

    pub fn hex(&self) -> HexCoord {
        self.hex
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The canonical reference as a placement
    pub fn placement(&self) -> Placement {
        Placement::new(self.hex, self.direction)
    }

    /// Every `(hex, direction)` pair naming this vertex
    pub fn references(&self) -> [Placement; 3] {
        Self::references_of(self.hex, self.direction)
    }

    /// Get the 3 hexes that touch this vertex
    pub fn touching_hexes(&self) -> [HexCoord; 3] {
        self.references().map(|p| p.hex)
    }

    /// Get the 3 edges that meet at this vertex
    pub fn touching_edges(&self) -> [EdgeKey; 3] {
        let d = self.direction;
        [
            EdgeKey::new(self.hex, d.previous()),
            EdgeKey::new(self.hex, d),
            // The edge between the two neighbouring tiles
            EdgeKey::new(self.hex.neighbor(d.previous()), d.rotate(1)),
        ]
    }

    /// Get the 3 vertices one edge away (for the distance rule)
    pub fn adjacent_vertices(&self) -> [VertexKey; 3] {
        self.touching_edges().map(|edge| {
            let [a, b] = edge.endpoints();
            if a == *self {
                b
            } else {
                a
            }
        })
    }

    /// Convert to pixel coordinates
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let (cx, cy) = self.hex.to_pixel(hex_size);
        let angle = self.direction.vertex_angle().to_radians();
        (cx + hex_size * angle.cos(), cy + hex_size * angle.sin())
    }
}
