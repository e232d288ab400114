//! Shortest paths through the solved graph and their decoding.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use itertools::Itertools;
use petgraph::EdgeType;

use crate::error::{DecodeError, GraphError};
use crate::graph::{EdgeId, PuzzleGraph, VertexId, Weight};

/// The boundary between the path decoder and whatever finds shortest paths.
pub trait ShortestPathEngine {
    /// The edges of a minimum total weight path from `source` to `target`, in order, or [`None`] if there is no path at all.
    ///
    /// Edge weights are only available through `weight`, which fails for edges whose weight has not been resolved.
    /// Among several minimal paths, implementations must pick the same one every time.
    fn shortest_path<Ty, F>(&self, graph: &PuzzleGraph<Ty>, source: VertexId, target: VertexId, weight: F) -> Result<Option<Vec<EdgeId>>, GraphError>
    where
        Ty: EdgeType,
        F: Fn(EdgeId) -> Result<Weight, GraphError>;
}

/// Dijkstra's algorithm over (total weight, vertex sequence).
///
/// The frontier is ordered first by total weight and then by the sequence of [`VertexId`]s visited,
/// so the first time the target is settled we hold the lightest path and, among equally light paths, the lexicographically smallest one.
/// Weights are non-negative, so every vertex only needs to be settled once.
#[derive(Copy, Clone, Debug, Default)]
pub struct LexicographicDijkstra;

impl ShortestPathEngine for LexicographicDijkstra {
    fn shortest_path<Ty, F>(&self, graph: &PuzzleGraph<Ty>, source: VertexId, target: VertexId, weight: F) -> Result<Option<Vec<EdgeId>>, GraphError>
    where
        Ty: EdgeType,
        F: Fn(EdgeId) -> Result<Weight, GraphError>,
    {
        let mut settled = BTreeSet::new();
        let mut frontier = BinaryHeap::new();
        frontier.push(Reverse((0u64, vec![source], Vec::new())));

        while let Some(Reverse((total, vertices, edges))) = frontier.pop() {
            let Some(&here) = vertices.last() else {
                continue;
            };
            if !settled.insert(here) {
                continue;
            }
            if here == target {
                return Ok(Some(edges));
            }

            for (next, edge) in graph.neighbors(here)? {
                if settled.contains(&next) {
                    continue;
                }

                let mut next_vertices = vertices.clone();
                next_vertices.push(next);
                let mut next_edges = edges.clone();
                next_edges.push(edge);
                frontier.push(Reverse((total + u64::from(weight(edge)?), next_vertices, next_edges)));
            }
        }

        Ok(None)
    }
}

/// A path through a fully weighted graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Path {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    weights: Vec<Weight>,
}

impl Path {
    fn from_edges<Ty: EdgeType>(graph: &PuzzleGraph<Ty>, source: VertexId, edges: Vec<EdgeId>) -> Result<Self, GraphError> {
        let mut vertices = Vec::with_capacity(edges.len() + 1);
        vertices.push(source);
        let mut weights = Vec::with_capacity(edges.len());

        let mut here = source;
        for id in &edges {
            let edge = graph.edge(*id)?;
            here = edge.opposite(here);
            vertices.push(here);
            weights.push(graph.edge_weight(*id)?);
        }

        Ok(Self { vertices, edges, weights })
    }

    /// Every vertex on the path, source first.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Every edge on the path, in the order travelled.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// The weight of every edge on the path, in the order travelled.
    pub fn weights(&self) -> &[Weight] {
        &self.weights
    }

    /// The sum of all edge weights on the path.
    pub fn total(&self) -> u64 {
        self.weights.iter().map(|weight| u64::from(*weight)).sum()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether source and target coincide.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// A fixed map from edge weight to output symbol.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WeightTable(BTreeMap<Weight, char>);

impl WeightTable {
    /// 1 = A, 2 = B, ..., 26 = Z.
    pub fn alphabet() -> Self {
        ('A'..='Z')
            .enumerate()
            .map(|(index, letter)| (index as Weight + 1, letter))
            .collect()
    }

    /// The symbol for `weight`.
    pub fn get(&self, weight: Weight) -> Option<char> {
        self.0.get(&weight).copied()
    }
}

impl FromIterator<(Weight, char)> for WeightTable {
    fn from_iter<T: IntoIterator<Item = (Weight, char)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The shortest path from `source` to `target` in a fully weighted `graph`, as found by `engine`.
///
/// Fails with [`DecodeError::NoPath`] if the two are disconnected, and with [`DecodeError::Graph`] if either vertex is
/// unknown or a weight the search needed is unresolved.
pub fn shortest_path<Ty, P>(graph: &PuzzleGraph<Ty>, source: VertexId, target: VertexId, engine: &P) -> Result<Path, DecodeError>
where
    Ty: EdgeType,
    P: ShortestPathEngine,
{
    for endpoint in [source, target] {
        if !graph.contains_vertex(endpoint) {
            return Err(GraphError::UnknownVertex(endpoint).into());
        }
    }

    let edges = engine.shortest_path(graph, source, target, |edge| graph.edge_weight(edge))?
        .ok_or(DecodeError::NoPath { start: source, end: target })?;

    Ok(Path::from_edges(graph, source, edges)?)
}

/// Translate every edge weight on `path` into a symbol using `table`, in path order.
pub fn decode(path: &Path, table: &WeightTable) -> Result<String, DecodeError> {
    path.edges.iter()
        .zip(path.weights.iter())
        .map(|(edge, weight)| table.get(*weight)
            .ok_or(DecodeError::UnmappedWeight { edge: *edge, weight: *weight }))
        .collect::<Result<String, _>>()
}

/// Render the vertices of `path` as `a-b-c`.
pub fn describe(path: &Path) -> String {
    path.vertices.iter().join("-")
}

#[cfg(test)]
mod tests {
    use petgraph::algo::all_simple_paths;
    use petgraph::Directed;

    use crate::graph::{EdgeAttributes, VertexAttributes};

    use super::*;

    fn weighted<Ty: EdgeType>(vertices: u32, edges: &[(u32, u32, Weight)]) -> PuzzleGraph<Ty> {
        let mut graph = PuzzleGraph::new();
        for id in 0..vertices {
            graph.add_vertex(VertexId(id), VertexAttributes::default()).unwrap();
        }
        for (a, b, weight) in edges {
            let id = graph.add_edge(VertexId(*a), VertexId(*b), EdgeAttributes::default()).unwrap();
            graph.set_edge_weight(id, *weight).unwrap();
        }

        graph
    }

    fn ids(raw: &[u32]) -> Vec<VertexId> {
        raw.iter().map(|id| VertexId(*id)).collect_vec()
    }

    #[test]
    fn lightest_not_shortest() {
        let graph: PuzzleGraph = weighted(4, &[(0, 1, 10), (1, 3, 10), (0, 2, 1), (2, 1, 1), (2, 3, 30)]);
        let path = shortest_path(&graph, VertexId(0), VertexId(3), &LexicographicDijkstra).unwrap();
        assert_eq!(path.vertices(), ids(&[0, 2, 1, 3]).as_slice());
        assert_eq!(path.total(), 12);
        assert_eq!(path.weights(), &[1, 1, 10]);
    }

    #[test]
    fn ties_break_on_vertex_order() {
        // 0-2-3 and 0-1-3 both weigh 4
        let graph: PuzzleGraph = weighted(4, &[(0, 2, 2), (2, 3, 2), (0, 1, 2), (1, 3, 2)]);
        let path = shortest_path(&graph, VertexId(0), VertexId(3), &LexicographicDijkstra).unwrap();
        assert_eq!(path.vertices(), ids(&[0, 1, 3]).as_slice());

        // fewer edges do not matter, 0-1-3 still sorts before 0-3
        let graph: PuzzleGraph = weighted(4, &[(0, 2, 2), (2, 3, 2), (0, 1, 2), (1, 3, 2), (0, 3, 4)]);
        let path = shortest_path(&graph, VertexId(0), VertexId(3), &LexicographicDijkstra).unwrap();
        assert_eq!(path.vertices(), ids(&[0, 1, 3]).as_slice());
    }

    #[test]
    fn respects_direction() {
        let graph: PuzzleGraph<Directed> = weighted(3, &[(0, 1, 1), (2, 1, 1), (0, 2, 5)]);
        let path = shortest_path(&graph, VertexId(0), VertexId(2), &LexicographicDijkstra).unwrap();
        assert_eq!(path.vertices(), ids(&[0, 2]).as_slice());
        assert_eq!(
            shortest_path(&graph, VertexId(2), VertexId(0), &LexicographicDijkstra),
            Err(DecodeError::NoPath { start: VertexId(2), end: VertexId(0) })
        );
    }

    #[test]
    fn disconnected_and_unknown() {
        let graph: PuzzleGraph = weighted(4, &[(0, 1, 1), (2, 3, 1)]);
        assert_eq!(
            shortest_path(&graph, VertexId(0), VertexId(3), &LexicographicDijkstra),
            Err(DecodeError::NoPath { start: VertexId(0), end: VertexId(3) })
        );
        assert_eq!(
            shortest_path(&graph, VertexId(0), VertexId(9), &LexicographicDijkstra),
            Err(DecodeError::Graph(GraphError::UnknownVertex(VertexId(9))))
        );
    }

    #[test]
    fn unresolved_weights() {
        let mut graph: PuzzleGraph = PuzzleGraph::new();
        for id in 0..2 {
            graph.add_vertex(VertexId(id), VertexAttributes::default()).unwrap();
        }
        let edge = graph.add_edge(VertexId(0), VertexId(1), EdgeAttributes::default()).unwrap();
        assert_eq!(
            shortest_path(&graph, VertexId(0), VertexId(1), &LexicographicDijkstra),
            Err(DecodeError::Graph(GraphError::UnresolvedWeight(edge)))
        );
    }

    #[test]
    fn optimal_against_every_simple_path() {
        let graph: PuzzleGraph = weighted(6, &[
            (0, 1, 7), (0, 2, 9), (0, 5, 14), (1, 2, 10), (1, 3, 15),
            (2, 3, 11), (2, 5, 2), (3, 4, 6), (4, 5, 9),
        ]);
        let path = shortest_path(&graph, VertexId(0), VertexId(4), &LexicographicDijkstra).unwrap();

        let totals = all_simple_paths::<Vec<VertexId>, _>(graph.topology(), VertexId(0), VertexId(4), 0, None)
            .map(|vertices| vertices.iter()
                .tuple_windows()
                .map(|(a, b)| u64::from(graph.edge_weight(graph.find_edge(*a, *b).unwrap()).unwrap()))
                .sum::<u64>())
            .collect_vec();

        assert!(!totals.is_empty());
        assert!(totals.iter().all(|total| path.total() <= *total));
        assert_eq!(path.total(), 20);
        assert_eq!(describe(&path), "0-2-5-4");
    }

    #[test]
    fn decoding() {
        let graph: PuzzleGraph = weighted(4, &[(0, 1, 1), (1, 2, 3), (2, 3, 2)]);
        let path = shortest_path(&graph, VertexId(0), VertexId(3), &LexicographicDijkstra).unwrap();
        let table = WeightTable::from_iter([(1, 'X'), (2, 'Y'), (3, 'Z')]);

        let decoded = decode(&path, &table).unwrap();
        assert_eq!(decoded.chars().count(), path.len());
        assert_eq!(decoded, "XZY");

        let partial = WeightTable::from_iter([(1, 'X'), (2, 'Y')]);
        assert_eq!(decode(&path, &partial), Err(DecodeError::UnmappedWeight { edge: EdgeId(1), weight: 3 }));
    }

    #[test]
    fn alphabet() {
        let table = WeightTable::alphabet();
        assert_eq!(table.get(1), Some('A'));
        assert_eq!(table.get(26), Some('Z'));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(27), None);
    }
}
