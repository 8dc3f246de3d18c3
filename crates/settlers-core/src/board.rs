//! Game board representation: tiles, roads, settlements and the robber.
//!
//! This module contains:
//! - Resource and terrain types
//! - Tile generation for the standard 19 tile board
//! - Road and settlement storage keyed by canonical edges and vertices
//! - Adjacency queries used by the rule layer
//!
//! Every placement goes through [`EdgeKey`] / [`VertexKey`], so a structure
//! built from one tile is visible from every tile sharing the edge or vertex.

use crate::hex::{Direction, EdgeKey, HexCoord, VertexKey};
use crate::player::{PlayerColor, ResourceHand};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// The five tradeable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// What a tile is made of. Desert is the only terrain without a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
    Desert,
}

impl Terrain {
    /// The resource this terrain produces, if any
    pub fn resource(self) -> Option<Resource> {
        match self {
            Terrain::Wood => Some(Resource::Wood),
            Terrain::Brick => Some(Resource::Brick),
            Terrain::Sheep => Some(Resource::Sheep),
            Terrain::Wheat => Some(Resource::Wheat),
            Terrain::Ore => Some(Resource::Ore),
            Terrain::Desert => None,
        }
    }
}

impl From<Resource> for Terrain {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Wood => Terrain::Wood,
            Resource::Brick => Terrain::Brick,
            Resource::Sheep => Terrain::Sheep,
            Resource::Wheat => Terrain::Wheat,
            Resource::Ore => Terrain::Ore,
        }
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub hex: HexCoord,
    /// Terrain, serialized under the `resource` field
    #[serde(rename = "resource")]
    pub terrain: Terrain,
    /// Dice number that triggers production (2-12, None for the desert)
    pub number: Option<u8>,
}

impl Tile {
    /// Create a new resource tile
    pub fn new_resource(hex: HexCoord, resource: Resource, number: u8) -> Self {
        Self {
            hex,
            terrain: resource.into(),
            number: Some(number),
        }
    }

    /// Create a desert tile
    pub fn desert(hex: HexCoord) -> Self {
        Self {
            hex,
            terrain: Terrain::Desert,
            number: None,
        }
    }

    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }
}

/// Settlement or city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Settlement,
    City,
}

/// What's built on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: PlayerColor,
    pub kind: BuildingKind,
}

impl Building {
    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

/// A road as reported to clients: the canonical edge and its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    #[serde(flatten)]
    pub edge: EdgeKey,
    pub color: PlayerColor,
}

/// A settlement or city as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    #[serde(flatten)]
    pub vertex: VertexKey,
    pub owner: PlayerColor,
    #[serde(rename = "type")]
    pub kind: BuildingKind,
}

/// Anything that can be looked up for adjacency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardKey {
    Edge(EdgeKey),
    Vertex(VertexKey),
}

impl From<EdgeKey> for BoardKey {
    fn from(edge: EdgeKey) -> Self {
        BoardKey::Edge(edge)
    }
}

impl From<VertexKey> for BoardKey {
    fn from(vertex: VertexKey) -> Self {
        BoardKey::Vertex(vertex)
    }
}

/// A structure found next to an edge or vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    Road(Road),
    Settlement(Settlement),
}

impl Structure {
    pub fn owner(&self) -> PlayerColor {
        match self {
            Structure::Road(road) => road.color,
            Structure::Settlement(settlement) => settlement.owner,
        }
    }
}

/// Board mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("That spot is already occupied")]
    Occupied,

    #[error("No settlement at that spot")]
    NotFound,

    #[error("That settlement belongs to another player")]
    Ownership,

    #[error("That settlement is already a city")]
    AlreadyUpgraded,

    #[error("That spot is not on the board")]
    OffBoard,
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    /// All tiles indexed by coordinate
    tiles: BTreeMap<HexCoord, Tile>,
    /// Roads on canonical edges
    roads: BTreeMap<EdgeKey, PlayerColor>,
    /// Buildings on canonical vertices
    buildings: BTreeMap<VertexKey, Building>,
    /// Current robber location
    robber: Option<HexCoord>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board from explicit tiles. The robber starts on the first desert.
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        let tiles: BTreeMap<HexCoord, Tile> = tiles.into_iter().map(|t| (t.hex, t)).collect();
        let robber = tiles
            .values()
            .find(|t| t.terrain == Terrain::Desert)
            .map(|t| t.hex);
        Self {
            tiles,
            robber,
            ..Self::default()
        }
    }

    /// Create the standard board layout with randomized tiles and numbers
    pub fn standard() -> Self {
        let mut rng = rand::thread_rng();
        Self::standard_with_rng(&mut rng)
    }

    /// Create the standard board layout with a provided RNG
    /// This allows for deterministic board generation when needed
    pub fn standard_with_rng<R: Rng>(rng: &mut R) -> Self {
        let coords = HexCoord::hexagon(2);

        // 4 wood, 4 sheep, 4 wheat, 3 brick, 3 ore, 1 desert
        let mut terrains: Vec<Terrain> = [
            (Terrain::Wood, 4),
            (Terrain::Sheep, 4),
            (Terrain::Wheat, 4),
            (Terrain::Brick, 3),
            (Terrain::Ore, 3),
            (Terrain::Desert, 1),
        ]
        .into_iter()
        .flat_map(|(terrain, count)| std::iter::repeat(terrain).take(count))
        .collect();
        terrains.shuffle(rng);

        let numbers: Vec<u8> = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

        let productive: Vec<HexCoord> = coords
            .iter()
            .zip(&terrains)
            .filter(|(_, terrain)| **terrain != Terrain::Desert)
            .map(|(hex, _)| *hex)
            .collect();
        let numbers = assign_numbers_avoiding_adjacent_68(&productive, &numbers, rng);
        let mut numbers = productive.iter().copied().zip(numbers).collect::<HashMap<_, _>>();

        let tiles = coords.iter().zip(terrains).map(|(hex, terrain)| Tile {
            hex: *hex,
            terrain,
            number: numbers.remove(hex),
        });
        Self::from_tiles(tiles)
    }

    // ==================== Query Methods ====================

    /// Get a tile by coordinate
    pub fn tile(&self, hex: &HexCoord) -> Option<&Tile> {
        self.tiles.get(hex)
    }

    /// All tiles ordered by coordinate
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn contains(&self, hex: &HexCoord) -> bool {
        self.tiles.contains_key(hex)
    }

    /// Every edge of every tile, deduplicated
    pub fn edges(&self) -> BTreeSet<EdgeKey> {
        self.tiles.keys().flat_map(|hex| hex.edges()).collect()
    }

    /// Every vertex of every tile, deduplicated
    pub fn vertices(&self) -> BTreeSet<VertexKey> {
        self.tiles.keys().flat_map(|hex| hex.vertices()).collect()
    }

    /// Owner of the road on an edge, if any
    pub fn road_at(&self, edge: &EdgeKey) -> Option<PlayerColor> {
        self.roads.get(edge).copied()
    }

    /// Building on a vertex, if any
    pub fn building_at(&self, vertex: &VertexKey) -> Option<Building> {
        self.buildings.get(vertex).copied()
    }

    /// All roads ordered by edge key
    pub fn roads(&self) -> impl Iterator<Item = Road> + '_ {
        self.roads
            .iter()
            .map(|(edge, color)| Road { edge: *edge, color: *color })
    }

    /// All settlements and cities ordered by vertex key
    pub fn settlements(&self) -> impl Iterator<Item = Settlement> + '_ {
        self.buildings.iter().map(|(vertex, building)| Settlement {
            vertex: *vertex,
            owner: building.owner,
            kind: building.kind,
        })
    }

    /// Settlements and cities owned by one color
    pub fn settlements_of(&self, color: PlayerColor) -> impl Iterator<Item = Settlement> + '_ {
        self.settlements().filter(move |s| s.owner == color)
    }

    /// Get the robber's current location
    pub fn robber(&self) -> Option<HexCoord> {
        self.robber
    }

    /// Structures next to an edge or vertex.
    ///
    /// For an edge: buildings on both endpoints and roads on the four adjacent
    /// edges. For a vertex: roads on its three edges and buildings on the three
    /// neighbouring vertices.
    pub fn structures_touching(&self, key: impl Into<BoardKey>) -> Vec<Structure> {
        let mut found = Vec::new();
        match key.into() {
            BoardKey::Edge(edge) => {
                for vertex in edge.endpoints() {
                    found.extend(self.settlement_structure(vertex));
                }
                for adjacent in edge.adjacent_edges() {
                    found.extend(self.road_structure(adjacent));
                }
            }
            BoardKey::Vertex(vertex) => {
                for edge in vertex.touching_edges() {
                    found.extend(self.road_structure(edge));
                }
                for adjacent in vertex.adjacent_vertices() {
                    found.extend(self.settlement_structure(adjacent));
                }
            }
        }
        found
    }

    fn road_structure(&self, edge: EdgeKey) -> Option<Structure> {
        self.road_at(&edge)
            .map(|color| Structure::Road(Road { edge, color }))
    }

    fn settlement_structure(&self, vertex: VertexKey) -> Option<Structure> {
        self.building_at(&vertex).map(|b| {
            Structure::Settlement(Settlement {
                vertex,
                owner: b.owner,
                kind: b.kind,
            })
        })
    }

    // ==================== Validation Methods ====================

    /// Fails with `Occupied` if a road already sits on the edge
    /// Fails with `OffBoard` unless the edge borders at least one tile
    pub fn check_edge_on_board(&self, edge: &EdgeKey) -> Result<(), BoardError> {
        if edge.touching_hexes().iter().any(|hex| self.contains(hex)) {
            Ok(())
        } else {
            Err(BoardError::OffBoard)
        }
    }

    /// Fails with `OffBoard` unless the vertex is a corner of at least one tile
    pub fn check_vertex_on_board(&self, vertex: &VertexKey) -> Result<(), BoardError> {
        if vertex.touching_hexes().iter().any(|hex| self.contains(hex)) {
            Ok(())
        } else {
            Err(BoardError::OffBoard)
        }
    }

    pub fn check_road_vacant(&self, edge: &EdgeKey) -> Result<(), BoardError> {
        if self.roads.contains_key(edge) {
            return Err(BoardError::Occupied);
        }
        Ok(())
    }

    /// Fails with `Occupied` if anything is built on the vertex
    pub fn check_vertex_vacant(&self, vertex: &VertexKey) -> Result<(), BoardError> {
        if self.buildings.contains_key(vertex) {
            return Err(BoardError::Occupied);
        }
        Ok(())
    }

    /// Checks that `owner` holds a plain settlement on the vertex
    pub fn check_upgrade(&self, vertex: &VertexKey, owner: PlayerColor) -> Result<(), BoardError> {
        let building = self.buildings.get(vertex).ok_or(BoardError::NotFound)?;
        if building.owner != owner {
            return Err(BoardError::Ownership);
        }
        if building.kind == BuildingKind::City {
            return Err(BoardError::AlreadyUpgraded);
        }
        Ok(())
    }

    // ==================== Mutation Methods ====================

    /// Place a road on the edge `(hex, direction)`
    pub fn place_road(
        &mut self,
        hex: HexCoord,
        direction: Direction,
        color: PlayerColor,
    ) -> Result<EdgeKey, BoardError> {
        let edge = EdgeKey::new(hex, direction);
        self.check_road_vacant(&edge)?;
        self.roads.insert(edge, color);
        Ok(edge)
    }

    /// Place a settlement or city on the vertex `(hex, direction)`
    pub fn place_settlement(
        &mut self,
        hex: HexCoord,
        direction: Direction,
        owner: PlayerColor,
        kind: BuildingKind,
    ) -> Result<VertexKey, BoardError> {
        let vertex = VertexKey::new(hex, direction);
        self.check_vertex_vacant(&vertex)?;
        self.buildings.insert(vertex, Building { owner, kind });
        Ok(vertex)
    }

    /// Upgrade the settlement on `(hex, direction)` to a city in place
    pub fn upgrade_to_city(
        &mut self,
        hex: HexCoord,
        direction: Direction,
        owner: PlayerColor,
    ) -> Result<VertexKey, BoardError> {
        let vertex = VertexKey::new(hex, direction);
        self.check_upgrade(&vertex, owner)?;
        if let Some(building) = self.buildings.get_mut(&vertex) {
            building.kind = BuildingKind::City;
        }
        Ok(vertex)
    }

    /// Move the robber to a new location
    pub fn move_robber(&mut self, hex: HexCoord) {
        self.robber = Some(hex);
    }

    // ==================== Resource Distribution ====================

    /// Calculate resources produced for a dice roll, per color.
    ///
    /// The robber's tile and the desert produce nothing; cities yield two.
    pub fn production_for_roll(&self, roll: u8) -> BTreeMap<PlayerColor, ResourceHand> {
        let mut distribution: BTreeMap<PlayerColor, ResourceHand> = BTreeMap::new();

        for tile in self.tiles.values() {
            if tile.number != Some(roll) || self.robber == Some(tile.hex) {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };

            for vertex in tile.hex.vertices() {
                if let Some(building) = self.building_at(&vertex) {
                    distribution
                        .entry(building.owner)
                        .or_default()
                        .add(resource, building.resource_multiplier());
                }
            }
        }

        distribution
    }
}

/// Shuffle numbers onto `coords` while trying to keep 6 and 8 apart
fn assign_numbers_avoiding_adjacent_68<R: Rng>(
    coords: &[HexCoord],
    numbers: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    const MAX_ATTEMPTS: usize = 100;

    let mut shuffled = numbers.to_vec();
    for _ in 0..MAX_ATTEMPTS {
        shuffled.shuffle(rng);
        if is_valid_number_placement(coords, &shuffled) {
            break;
        }
    }
    shuffled
}

/// Check if a number placement is valid (no adjacent 6 and 8)
fn is_valid_number_placement(coords: &[HexCoord], numbers: &[u8]) -> bool {
    let hot = |n: u8| n == 6 || n == 8;
    let by_coord: HashMap<HexCoord, u8> = coords.iter().copied().zip(numbers.iter().copied()).collect();

    by_coord.iter().all(|(hex, &number)| {
        !hot(number)
            || hex
                .neighbors()
                .iter()
                .all(|n| by_coord.get(n).map_or(true, |&other| !hot(other)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dir(index: u8) -> Direction {
        Direction::new(index).unwrap()
    }

    fn origin_board() -> Board {
        Board::from_tiles(HexCoord::hexagon(1).into_iter().map(|hex| {
            if hex == HexCoord::ORIGIN {
                Tile::new_resource(hex, Resource::Wheat, 6)
            } else {
                Tile::new_resource(hex, Resource::Ore, 9)
            }
        }))
    }

    #[test]
    fn test_standard_board_has_19_tiles() {
        let board = Board::standard();
        assert_eq!(board.tiles().count(), 19);
    }

    #[test]
    fn test_robber_starts_on_desert() {
        let board = Board::standard();
        let robber = board.robber().unwrap();
        assert_eq!(board.tile(&robber).unwrap().terrain, Terrain::Desert);
        assert!(board.tile(&robber).unwrap().number.is_none());
    }

    #[test]
    fn test_standard_board_has_correct_terrain_counts() {
        let board = Board::standard();
        let count = |terrain| board.tiles().filter(|t| t.terrain == terrain).count();

        assert_eq!(count(Terrain::Wood), 4);
        assert_eq!(count(Terrain::Sheep), 4);
        assert_eq!(count(Terrain::Wheat), 4);
        assert_eq!(count(Terrain::Brick), 3);
        assert_eq!(count(Terrain::Ore), 3);
        assert_eq!(count(Terrain::Desert), 1);
    }

    #[test]
    fn test_standard_board_has_correct_number_distribution() {
        let board = Board::standard();
        let mut numbers: Vec<u8> = board.tiles().filter_map(|t| t.number).collect();
        numbers.sort_unstable();
        assert_eq!(
            numbers,
            vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12]
        );
    }

    #[test]
    fn test_no_adjacent_6_and_8() {
        for seed in 0..10 {
            let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(seed));
            let numbers: HashMap<HexCoord, u8> =
                board.tiles().filter_map(|t| t.number.map(|n| (t.hex, n))).collect();
            let productive: Vec<HexCoord> = numbers.keys().copied().collect();
            let ordered: Vec<u8> = productive.iter().map(|h| numbers[h]).collect();
            assert!(is_valid_number_placement(&productive, &ordered), "seed {seed}");
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = Board::standard_with_rng(&mut StdRng::seed_from_u64(7));
        let b = Board::standard_with_rng(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_standard_board_edge_and_vertex_counts() {
        let board = Board::standard();
        assert_eq!(board.edges().len(), 72);
        assert_eq!(board.vertices().len(), 54);
    }

    #[test]
    fn test_road_occupied_from_neighbouring_tile() {
        let mut board = origin_board();
        board
            .place_road(HexCoord::ORIGIN, dir(2), PlayerColor::Red)
            .unwrap();

        // Edge 2 of the origin is edge 5 of its south-west neighbour
        let result = board.place_road(HexCoord::new(-1, 1, 0), dir(5), PlayerColor::Blue);
        assert_eq!(result, Err(BoardError::Occupied));
        assert_eq!(board.roads().count(), 1);
    }

    #[test]
    fn test_settlement_occupied_from_any_tile() {
        let mut board = origin_board();
        board
            .place_settlement(HexCoord::ORIGIN, dir(1), PlayerColor::Red, BuildingKind::Settlement)
            .unwrap();

        for (hex, d) in [(HexCoord::new(1, 0, -1), 3), (HexCoord::new(0, 1, -1), 5)] {
            let result =
                board.place_settlement(hex, dir(d), PlayerColor::Blue, BuildingKind::Settlement);
            assert_eq!(result, Err(BoardError::Occupied));
        }
    }

    #[test]
    fn test_city_upgrade_errors() {
        let mut board = origin_board();
        let hex = HexCoord::ORIGIN;

        assert_eq!(
            board.upgrade_to_city(hex, dir(0), PlayerColor::Red),
            Err(BoardError::NotFound)
        );

        board
            .place_settlement(hex, dir(0), PlayerColor::Red, BuildingKind::Settlement)
            .unwrap();
        assert_eq!(
            board.upgrade_to_city(hex, dir(0), PlayerColor::Blue),
            Err(BoardError::Ownership)
        );

        assert!(board.upgrade_to_city(hex, dir(0), PlayerColor::Red).is_ok());
        assert_eq!(
            board.upgrade_to_city(hex, dir(0), PlayerColor::Red),
            Err(BoardError::AlreadyUpgraded)
        );

        let vertex = VertexKey::new(hex, dir(0));
        assert_eq!(board.building_at(&vertex).unwrap().kind, BuildingKind::City);
    }

    #[test]
    fn test_structures_touching_vertex() {
        let mut board = origin_board();
        let vertex = VertexKey::new(HexCoord::ORIGIN, dir(2));
        assert!(board.structures_touching(vertex).is_empty());

        // A road on one of its edges and a settlement one edge away
        board.place_road(HexCoord::ORIGIN, dir(2), PlayerColor::Red).unwrap();
        board
            .place_settlement(HexCoord::ORIGIN, dir(3), PlayerColor::Blue, BuildingKind::Settlement)
            .unwrap();

        let found = board.structures_touching(vertex);
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|s| matches!(s, Structure::Road(r) if r.color == PlayerColor::Red)));
        assert!(found
            .iter()
            .any(|s| matches!(s, Structure::Settlement(b) if b.owner == PlayerColor::Blue)));
    }

    #[test]
    fn test_structures_touching_edge() {
        let mut board = origin_board();
        let edge = EdgeKey::new(HexCoord::ORIGIN, dir(0));

        board
            .place_settlement(HexCoord::ORIGIN, dir(0), PlayerColor::Red, BuildingKind::Settlement)
            .unwrap();
        board.place_road(HexCoord::ORIGIN, dir(1), PlayerColor::Red).unwrap();
        // Not adjacent to edge 0
        board.place_road(HexCoord::ORIGIN, dir(3), PlayerColor::Blue).unwrap();

        let found = board.structures_touching(edge);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.owner() == PlayerColor::Red));
    }

    #[test]
    fn test_resource_distribution() {
        let mut board = origin_board();
        board
            .place_settlement(HexCoord::ORIGIN, dir(0), PlayerColor::Red, BuildingKind::Settlement)
            .unwrap();

        let distribution = board.production_for_roll(6);
        assert_eq!(distribution[&PlayerColor::Red].get(Resource::Wheat), 1);

        // Vertex 0 also touches two ore tiles numbered 9
        let distribution = board.production_for_roll(9);
        assert_eq!(distribution[&PlayerColor::Red].get(Resource::Ore), 2);
    }

    #[test]
    fn test_city_gives_double_resources() {
        let mut board = origin_board();
        board
            .place_settlement(HexCoord::ORIGIN, dir(0), PlayerColor::Red, BuildingKind::Settlement)
            .unwrap();
        board.upgrade_to_city(HexCoord::ORIGIN, dir(0), PlayerColor::Red).unwrap();

        let distribution = board.production_for_roll(6);
        assert_eq!(distribution[&PlayerColor::Red].get(Resource::Wheat), 2);
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = origin_board();
        board
            .place_settlement(HexCoord::ORIGIN, dir(0), PlayerColor::Red, BuildingKind::Settlement)
            .unwrap();
        assert!(board.production_for_roll(6).contains_key(&PlayerColor::Red));

        board.move_robber(HexCoord::ORIGIN);
        assert!(board.production_for_roll(6).is_empty());
    }

    #[test]
    fn test_tile_serializes_resource_field() {
        let tile = Tile::desert(HexCoord::ORIGIN);
        let json = serde_json::to_value(tile).unwrap();
        assert_eq!(json["resource"], "desert");
        assert!(json["number"].is_null());
    }
}
