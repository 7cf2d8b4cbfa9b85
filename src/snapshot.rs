//! JSON snapshot boundary for [`GameState`].
//!
//! The wire shape keeps the point graph as an object keyed by point id, in
//! board order:
//!
//! ```json
//! {
//!   "phase": 1,
//!   "turn": { "count": 0, "player": "a", "type": "regular" },
//!   "remainingMen": { "a": 6, "b": 6 },
//!   "stateGraph": { "a": { "neighbors": ["b", "h"] }, "...": {} },
//!   "mills": [{ "points": ["a", "b", "c"] }],
//!   "nextMoves": ["a", "b"]
//! }
//! ```
//!
//! Loading a snapshot rebuilds the board from the graph, checks it and
//! recomputes `nextMoves` instead of trusting the supplied value.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Board, PointId};
use crate::constants::MILL_LEN;
use crate::error::MorrisError;
use crate::moves::NextMoves;
use crate::state::{GameState, Mill, Phase, PerPlayer, Player, Turn};

/// Serialized form of a [`GameState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateRepr {
    pub phase: Phase,
    pub turn: Turn,
    pub remaining_men: PerPlayer<u32>,
    #[serde(with = "ordered_map")]
    pub state_graph: Vec<(PointId, PointRepr)>,
    pub mills: Vec<MillRepr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_moves: Option<NextMoves>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRepr {
    pub neighbors: Vec<PointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MillRepr {
    pub points: [PointId; MILL_LEN],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<Player>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub active: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<GameState> for GameStateRepr {
    fn from(state: GameState) -> Self {
        let board = &state.board;
        let state_graph = board
            .points()
            .map(|pt| {
                let neighbors = board.neighbors(pt).iter().map(|&n| board.id(n).clone()).collect();
                let point = PointRepr {
                    neighbors,
                    occupancy: state.occupancy[pt],
                };
                (board.id(pt).clone(), point)
            })
            .collect();
        let mills = state
            .mills
            .iter()
            .map(|mill| MillRepr {
                points: mill.points.map(|pt| board.id(pt).clone()),
                occupancy: mill.occupancy,
                active: mill.active,
            })
            .collect();

        Self {
            phase: state.phase,
            turn: state.turn,
            remaining_men: state.remaining_men,
            state_graph,
            mills,
            winner: state.winner,
            next_moves: Some(state.next_moves),
        }
    }
}

impl TryFrom<GameStateRepr> for GameState {
    type Error = MorrisError;

    fn try_from(repr: GameStateRepr) -> Result<Self, Self::Error> {
        let (ids, points): (Vec<PointId>, Vec<PointRepr>) = repr.state_graph.into_iter().unzip();
        let occupancy: Vec<Option<Player>> = points.iter().map(|p| p.occupancy).collect();
        let neighbors = points.into_iter().map(|p| p.neighbors).collect();
        let lines = repr.mills.iter().map(|m| m.points.clone()).collect();
        let board = Board::from_parts(ids, neighbors, lines)?;

        let mills = repr
            .mills
            .iter()
            .zip(board.lines())
            .enumerate()
            .map(|(i, (mill, &points))| {
                if mill.active && mill.occupancy.is_none() {
                    return Err(MorrisError::MillInvariant { mill: i });
                }
                let first = occupancy[points[0]];
                let standing = first.filter(|_| points.iter().all(|&p| occupancy[p] == first));
                if mill.occupancy != standing {
                    return Err(MorrisError::InvalidSnapshot(format!(
                        "mill {i} occupancy does not match its points"
                    )));
                }
                Ok(Mill {
                    points,
                    occupancy: mill.occupancy,
                    active: mill.active,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let state = GameState {
            board: Arc::new(board),
            phase: repr.phase,
            turn: repr.turn,
            occupancy,
            mills,
            remaining_men: repr.remaining_men,
            winner: repr.winner,
            next_moves: NextMoves::Points(Vec::new()),
        };
        Ok(state.refreshed())
    }
}

/// Serialize a `Vec<(K, V)>` as a map, keeping entry order both ways.
pub(crate) mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<K, V, S>(entries: &Vec<(K, V)>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<Vec<(K, V)>, D::Error>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Vec<(K, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
