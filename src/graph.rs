//! The puzzle graph: fixed topology plus one weight slot per edge.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use petgraph::graphmap::GraphMap;
use petgraph::{Direction, EdgeType, Undirected};

use crate::error::GraphError;

/// Edge weights are non-negative by construction.
pub type Weight = u32;

/// Identifier of a vertex as it appears in the puzzle.
///
/// Ordering on this type is the secondary ordering used to break ties between shortest paths.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VertexId(pub u32);

impl Display for VertexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an edge; the index at which it was inserted into its [`PuzzleGraph`].
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId(pub usize);

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static data attached to a vertex.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VertexAttributes {
    /// A display label, e.g. the clue printed on the puzzle.
    pub label: Option<String>,
}

/// Static data attached to an edge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeAttributes {
    /// A weight already printed on the puzzle.
    pub hint: Option<Weight>,
}

impl EdgeAttributes {
    /// Attributes of an edge whose weight is given up front.
    pub fn given(weight: Weight) -> Self {
        Self { hint: Some(weight) }
    }
}

/// A vertex together with its attributes. Immutable once added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vertex {
    pub(crate) id: VertexId,
    pub(crate) attributes: VertexAttributes,
}

impl Vertex {
    /// This vertex's id.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Label and other static data.
    pub fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }
}

/// An edge of the puzzle. Its weight stays [`None`] until the solver writes it back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) from: VertexId,
    pub(crate) to: VertexId,
    pub(crate) hint: Option<Weight>,
    pub(crate) weight: Option<Weight>,
}

impl Edge {
    /// This edge's id.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Endpoints in the order the edge was added; for directed graphs this is the direction of travel.
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.from, self.to)
    }

    /// The weight printed on the puzzle, if any.
    pub fn hint(&self) -> Option<Weight> {
        self.hint
    }

    /// The solved weight, or [`None`] while it is still unknown.
    pub fn weight(&self) -> Option<Weight> {
        self.weight
    }

    /// The endpoint of this edge which is not `vertex`.
    pub fn opposite(&self, vertex: VertexId) -> VertexId {
        if self.from == vertex { self.to } else { self.from }
    }
}

/// The fixed topology of a puzzle, plus one weight slot per edge.
///
/// Directedness is chosen by `Ty` in the same way as for [`petgraph::graphmap::GraphMap`];
/// use [`Undirected`] (the default) or [`petgraph::Directed`].
/// Parallel edges are not allowed.
#[derive(Clone, Debug)]
pub struct PuzzleGraph<Ty: EdgeType = Undirected> {
    topology: GraphMap<VertexId, EdgeId, Ty>,
    vertices: BTreeMap<VertexId, Vertex>,
    edges: Vec<Edge>,
}

impl<Ty: EdgeType> Default for PuzzleGraph<Ty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ty: EdgeType> PuzzleGraph<Ty> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty graph with room for `nodes` vertices and `edges` edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            topology: GraphMap::with_capacity(nodes, edges),
            vertices: BTreeMap::new(),
            edges: Vec::with_capacity(edges),
        }
    }

    /// Whether edges of this graph have a direction.
    #[inline]
    pub fn is_directed(&self) -> bool {
        Ty::is_directed()
    }

    /// Add a vertex, failing with [`GraphError::DuplicateVertex`] if `id` is taken.
    pub fn add_vertex(&mut self, id: VertexId, attributes: VertexAttributes) -> Result<(), GraphError> {
        if self.vertices.contains_key(&id) {
            return Err(GraphError::DuplicateVertex(id));
        }

        self.topology.add_node(id);
        self.vertices.insert(id, Vertex { id, attributes });
        Ok(())
    }

    /// Add an edge between two existing vertices and return its id.
    ///
    /// Fails with [`GraphError::UnknownVertex`] if either endpoint is missing and with [`GraphError::DuplicateEdge`] if the two are already connected.
    /// For undirected graphs, `a-b` and `b-a` are the same edge.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, attributes: EdgeAttributes) -> Result<EdgeId, GraphError> {
        for endpoint in [from, to] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(GraphError::UnknownVertex(endpoint));
            }
        }

        if self.topology.contains_edge(from, to) {
            return Err(GraphError::DuplicateEdge { from, to });
        }

        let id = EdgeId(self.edges.len());
        self.topology.add_edge(from, to, id);
        self.edges.push(Edge {
            id,
            from,
            to,
            hint: attributes.hint,
            weight: None,
        });

        Ok(id)
    }

    /// Number of vertices.
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `id` was added.
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Look up a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// All vertices, ordered by id.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Look up an edge, failing with [`GraphError::UnknownEdge`].
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, GraphError> {
        self.edges.get(id.0).ok_or(GraphError::UnknownEdge(id))
    }

    /// All edges, ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// The edge leading from `from` to `to` (in either direction for undirected graphs).
    pub fn find_edge(&self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        self.topology.edge_weight(from, to).copied()
    }

    /// Every edge incident to `vertex`, sorted by id. For directed graphs both incoming and outgoing edges count.
    pub fn adjacent_edges(&self, vertex: VertexId) -> Result<Vec<EdgeId>, GraphError> {
        if !self.vertices.contains_key(&vertex) {
            return Err(GraphError::UnknownVertex(vertex));
        }

        let mut incident = self.topology.edges(vertex)
            .map(|(_, _, e)| *e)
            .collect_vec();

        if Ty::is_directed() {
            incident.extend(self.topology.neighbors_directed(vertex, Direction::Incoming)
                .filter_map(|other| self.topology.edge_weight(other, vertex).copied()));
        }

        incident.sort();
        incident.dedup();
        Ok(incident)
    }

    /// Vertices reachable from `vertex` over a single edge, with the edge used, in insertion order.
    pub fn neighbors(&self, vertex: VertexId) -> Result<Vec<(VertexId, EdgeId)>, GraphError> {
        if !self.vertices.contains_key(&vertex) {
            return Err(GraphError::UnknownVertex(vertex));
        }

        Ok(self.topology.edges(vertex)
            .map(|(_, other, e)| (other, *e))
            .collect_vec())
    }

    /// Resolve the weight of an edge. Every edge may be resolved exactly once.
    pub fn set_edge_weight(&mut self, id: EdgeId, value: Weight) -> Result<(), GraphError> {
        let edge = self.edges.get_mut(id.0).ok_or(GraphError::UnknownEdge(id))?;
        if edge.weight.is_some() {
            return Err(GraphError::WeightAlreadyResolved(id));
        }

        edge.weight = Some(value);
        Ok(())
    }

    /// The solved weight of an edge, failing with [`GraphError::UnresolvedWeight`] before solving.
    pub fn edge_weight(&self, id: EdgeId) -> Result<Weight, GraphError> {
        self.edge(id)?.weight.ok_or(GraphError::UnresolvedWeight(id))
    }

    /// Whether every edge has a resolved weight.
    pub fn is_fully_weighted(&self) -> bool {
        self.edges.iter().all(|e| e.weight.is_some())
    }

    /// Read-only view of the underlying petgraph topology, whose edge weights are [`EdgeId`]s.
    pub fn topology(&self) -> &GraphMap<VertexId, EdgeId, Ty> {
        &self.topology
    }
}

impl<Ty: EdgeType> Display for PuzzleGraph<Ty> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joiner = if Ty::is_directed() { "->" } else { "-" };
        for edge in &self.edges {
            match edge.weight {
                Some(weight) => writeln!(f, "{}{}{}: {}", edge.from, joiner, edge.to, weight)?,
                None => writeln!(f, "{}{}{}: ?", edge.from, joiner, edge.to)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use petgraph::Directed;

    use super::*;

    fn path_graph<Ty: EdgeType>() -> PuzzleGraph<Ty> {
        let mut graph = PuzzleGraph::new();
        for id in 0..4 {
            graph.add_vertex(VertexId(id), VertexAttributes::default()).unwrap();
        }
        for (a, b) in [(0, 1), (1, 2), (2, 3)] {
            graph.add_edge(VertexId(a), VertexId(b), EdgeAttributes::default()).unwrap();
        }

        graph
    }

    #[test]
    fn duplicate_vertex() {
        let mut graph: PuzzleGraph = path_graph();
        assert_eq!(
            graph.add_vertex(VertexId(2), VertexAttributes::default()),
            Err(GraphError::DuplicateVertex(VertexId(2)))
        );
    }

    #[test]
    fn unknown_endpoint() {
        let mut graph: PuzzleGraph = path_graph();
        assert_eq!(
            graph.add_edge(VertexId(0), VertexId(9), EdgeAttributes::default()),
            Err(GraphError::UnknownVertex(VertexId(9)))
        );
    }

    #[test]
    fn duplicate_edge_undirected() {
        let mut graph: PuzzleGraph = path_graph();
        assert_eq!(
            graph.add_edge(VertexId(1), VertexId(0), EdgeAttributes::default()),
            Err(GraphError::DuplicateEdge { from: VertexId(1), to: VertexId(0) })
        );
    }

    #[test]
    fn reverse_edge_directed() {
        let mut graph: PuzzleGraph<Directed> = path_graph();
        assert_eq!(graph.add_edge(VertexId(1), VertexId(0), EdgeAttributes::default()), Ok(EdgeId(3)));
        assert_eq!(graph.adjacent_edges(VertexId(1)).unwrap(), vec![EdgeId(0), EdgeId(1), EdgeId(3)]);
        assert_eq!(graph.neighbors(VertexId(1)).unwrap(), vec![(VertexId(2), EdgeId(1)), (VertexId(0), EdgeId(3))]);
    }

    #[test]
    fn adjacency() {
        let graph: PuzzleGraph = path_graph();
        assert_eq!(graph.adjacent_edges(VertexId(1)).unwrap(), vec![EdgeId(0), EdgeId(1)]);
        assert_eq!(graph.adjacent_edges(VertexId(3)).unwrap(), vec![EdgeId(2)]);
        assert_eq!(graph.adjacent_edges(VertexId(7)), Err(GraphError::UnknownVertex(VertexId(7))));
        assert_eq!(graph.find_edge(VertexId(2), VertexId(1)), Some(EdgeId(1)));
        assert_eq!(graph.find_edge(VertexId(0), VertexId(3)), None);
    }

    #[test]
    fn weight_is_written_once() {
        let mut graph: PuzzleGraph = path_graph();
        assert_eq!(graph.edge_weight(EdgeId(1)), Err(GraphError::UnresolvedWeight(EdgeId(1))));

        graph.set_edge_weight(EdgeId(1), 5).unwrap();
        assert_eq!(graph.edge_weight(EdgeId(1)), Ok(5));
        assert_eq!(graph.set_edge_weight(EdgeId(1), 6), Err(GraphError::WeightAlreadyResolved(EdgeId(1))));
        assert_eq!(graph.set_edge_weight(EdgeId(8), 6), Err(GraphError::UnknownEdge(EdgeId(8))));
        assert!(!graph.is_fully_weighted());

        assert_eq!(format!("{}", graph), "0-1: ?
1-2: 5
2-3: ?
");
    }
}
