//! Directed multigraph used by link associations and skeletons
//!
//! Nodes and edges live in generation-checked arenas, so a handle stays valid
//! until its own element is removed and a stale handle simply resolves to
//! `None`. Iteration follows insertion order, which keeps wire encodings and
//! traversals deterministic.
//!
//! Equality is structural: two graphs compare equal when there is an
//! isomorphism between them that preserves node payloads, edge payloads and
//! edge multiplicity. Handle numbering plays no part.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct RawHandle {
    index: u32,
    generation: u32,
}

/// Handle to a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(RawHandle);

/// Handle to a graph edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(RawHandle);

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    order: Vec<RawHandle>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    fn insert(&mut self, value: T) -> RawHandle {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                RawHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                RawHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.order.push(handle);
        handle
    }

    fn remove(&mut self, handle: RawHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.order.retain(|h| *h != handle);
        Some(value)
    }

    fn get(&self, handle: RawHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    fn get_mut(&mut self, handle: RawHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.order.clear();
    }
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    value: N,
    outgoing: Vec<EdgeId>,
    incoming: Vec<EdgeId>,
}

/// A directed edge and its payload
#[derive(Debug, Clone)]
pub struct Edge<E> {
    from: NodeId,
    to: NodeId,
    value: E,
}

impl<E> Edge<E> {
    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn value(&self) -> &E {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut E {
        &mut self.value
    }
}

/// One step of a depth-first walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfsStep {
    /// Node the walk came from, `None` for the start node
    pub parent: Option<NodeId>,
    /// Edge followed to reach `node`
    pub edge: Option<EdgeId>,
    pub node: NodeId,
}

/// Directed multigraph with node payloads `N` and edge payloads `E`
#[derive(Clone)]
pub struct Graph<N, E> {
    nodes: Arena<NodeEntry<N>>,
    edges: Arena<Edge<E>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self {
            nodes: Arena::default(),
            edges: Arena::default(),
        }
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_node(&mut self, value: N) -> NodeId {
        NodeId(self.nodes.insert(NodeEntry {
            value,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }))
    }

    /// Remove a node together with every edge touching it
    pub fn remove_node(&mut self, id: NodeId) -> Option<N> {
        let entry = self.nodes.get(id.0)?;
        let incident: Vec<EdgeId> = entry
            .outgoing
            .iter()
            .chain(entry.incoming.iter())
            .copied()
            .collect();
        for edge in incident {
            self.remove_edge(edge);
        }
        self.nodes.remove(id.0).map(|entry| entry.value)
    }

    /// Connect two existing nodes. Returns `None` if either handle is stale.
    pub fn create_edge(&mut self, from: NodeId, to: NodeId, value: E) -> Option<EdgeId> {
        if self.nodes.get(from.0).is_none() || self.nodes.get(to.0).is_none() {
            return None;
        }
        let id = EdgeId(self.edges.insert(Edge { from, to, value }));
        if let Some(entry) = self.nodes.get_mut(from.0) {
            entry.outgoing.push(id);
        }
        if let Some(entry) = self.nodes.get_mut(to.0) {
            entry.incoming.push(id);
        }
        Some(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<E> {
        let edge = self.edges.remove(id.0)?;
        if let Some(entry) = self.nodes.get_mut(edge.from.0) {
            entry.outgoing.retain(|e| *e != id);
        }
        if let Some(entry) = self.nodes.get_mut(edge.to.0) {
            entry.incoming.retain(|e| *e != id);
        }
        Some(edge.value)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(id.0).map(|entry| &entry.value)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(id.0).map(|entry| &mut entry.value)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.edges.get(id.0)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge<E>> {
        self.edges.get_mut(id.0)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Node handles in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.order.iter().map(|h| NodeId(*h))
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.node_ids()
            .filter_map(move |id| self.node(id).map(|value| (id, value)))
    }

    /// Mutable access to every node payload
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut N> + '_ {
        self.nodes
            .slots
            .iter_mut()
            .filter_map(|slot| slot.value.as_mut().map(|entry| &mut entry.value))
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<E>)> + '_ {
        self.edges
            .order
            .iter()
            .filter_map(move |h| self.edges.get(*h).map(|edge| (EdgeId(*h), edge)))
    }

    /// Outgoing edges of `id` in insertion order
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, &Edge<E>)> + '_ {
        self.incident(id, |entry| &entry.outgoing)
    }

    /// Incoming edges of `id` in insertion order
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, &Edge<E>)> + '_ {
        self.incident(id, |entry| &entry.incoming)
    }

    fn incident<'a>(
        &'a self,
        id: NodeId,
        pick: fn(&NodeEntry<N>) -> &Vec<EdgeId>,
    ) -> impl Iterator<Item = (EdgeId, &'a Edge<E>)> + 'a {
        self.nodes
            .get(id.0)
            .map(|entry| pick(entry).as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |e| self.edges.get(e.0).map(|edge| (*e, edge)))
    }

    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(id).map(|(_, edge)| edge.to)
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.nodes.get(id.0).map_or(0, |entry| entry.outgoing.len())
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.nodes.get(id.0).map_or(0, |entry| entry.incoming.len())
    }

    /// Preorder depth-first walk along out-edges, each node visited once
    pub fn depth_first_from(&self, origin: NodeId) -> Vec<DfsStep> {
        let mut steps = Vec::new();
        if !self.contains_node(origin) {
            return steps;
        }
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![DfsStep {
            parent: None,
            edge: None,
            node: origin,
        }];
        while let Some(step) = stack.pop() {
            if !visited.insert(step.node) {
                continue;
            }
            steps.push(step);
            let children: Vec<DfsStep> = self
                .out_edges(step.node)
                .map(|(edge_id, edge)| DfsStep {
                    parent: Some(step.node),
                    edge: Some(edge_id),
                    node: edge.to,
                })
                .collect();
            stack.extend(children.into_iter().rev());
        }
        steps
    }

    /// The unique in-degree-0 node, if there is exactly one
    fn single_source(&self) -> Option<NodeId> {
        let mut sources = self.node_ids().filter(|id| self.in_degree(*id) == 0);
        let source = sources.next()?;
        match sources.next() {
            Some(_) => None,
            None => Some(source),
        }
    }

    fn reaches_all_from(&self, origin: NodeId) -> bool {
        self.depth_first_from(origin).len() == self.node_count()
    }

    /// Center of a pure out-star: one node with an edge to every other node
    /// and nothing else.
    pub fn topology_star_center(&self) -> Option<NodeId> {
        let n = self.node_count();
        if n == 0 || self.edge_count() != n - 1 {
            return None;
        }
        let center = self.single_source()?;
        if self.out_degree(center) != n - 1 {
            return None;
        }
        let leaves_ok = self
            .node_ids()
            .filter(|id| *id != center)
            .all(|id| self.in_degree(id) == 1 && self.out_degree(id) == 0);
        leaves_ok.then_some(center)
    }

    /// Origin of a single simple directed chain
    pub fn topology_chain_origin(&self) -> Option<NodeId> {
        let n = self.node_count();
        if n == 0 || self.edge_count() != n - 1 {
            return None;
        }
        let degrees_ok = self
            .node_ids()
            .all(|id| self.in_degree(id) <= 1 && self.out_degree(id) <= 1);
        if !degrees_ok {
            return None;
        }
        let origin = self.single_source()?;
        self.reaches_all_from(origin).then_some(origin)
    }

    /// Origin leaf of a trunk tree: a simple path leaving the origin that
    /// opens into an out-tree, with every node reachable from the origin.
    pub fn topology_trunk_tree_origin(&self) -> Option<NodeId> {
        let n = self.node_count();
        if n == 0 || self.edge_count() != n - 1 {
            return None;
        }
        let origin = self.single_source()?;
        if self.out_degree(origin) > 1 {
            return None;
        }
        let in_ok = self
            .node_ids()
            .filter(|id| *id != origin)
            .all(|id| self.in_degree(id) == 1);
        if !in_ok {
            return None;
        }
        self.reaches_all_from(origin).then_some(origin)
    }
}

impl<N: Clone, E: Clone> Graph<N, E> {
    /// Split into connected components.
    ///
    /// Nodes are grouped by reachability ignoring edge direction; edges keep
    /// their direction inside each component. Isolated nodes come out as
    /// singleton graphs. Components are ordered by their earliest node.
    pub fn split_strong_components(&self) -> Vec<Graph<N, E>> {
        let mut component_of: HashMap<NodeId, usize> = HashMap::new();
        let mut count = 0;

        for start in self.node_ids() {
            if component_of.contains_key(&start) {
                continue;
            }
            let mut queue = VecDeque::from([start]);
            component_of.insert(start, count);
            while let Some(node) = queue.pop_front() {
                let neighbours: Vec<NodeId> = self
                    .out_edges(node)
                    .map(|(_, e)| e.to)
                    .chain(self.in_edges(node).map(|(_, e)| e.from))
                    .collect();
                for next in neighbours {
                    if let std::collections::hash_map::Entry::Vacant(slot) =
                        component_of.entry(next)
                    {
                        slot.insert(count);
                        queue.push_back(next);
                    }
                }
            }
            count += 1;
        }

        let mut components: Vec<Graph<N, E>> = (0..count).map(|_| Graph::new()).collect();
        let mut mapped: HashMap<NodeId, NodeId> = HashMap::new();
        for (id, value) in self.nodes() {
            let component = component_of[&id];
            mapped.insert(id, components[component].create_node(value.clone()));
        }
        for (_, edge) in self.edges() {
            let component = component_of[&edge.from];
            components[component].create_edge(
                mapped[&edge.from],
                mapped[&edge.to],
                edge.value.clone(),
            );
        }
        components
    }
}

impl<N: PartialEq, E: PartialEq> Graph<N, E> {
    fn edge_payloads_between(&self, from: NodeId, to: NodeId) -> Vec<&E> {
        self.out_edges(from)
            .filter(|(_, edge)| edge.to == to)
            .map(|(_, edge)| &edge.value)
            .collect()
    }

    fn same_edges(&self, a: (NodeId, NodeId), other: &Self, b: (NodeId, NodeId)) -> bool {
        let mine = self.edge_payloads_between(a.0, a.1);
        let theirs = other.edge_payloads_between(b.0, b.1);
        if mine.len() != theirs.len() {
            return false;
        }
        let mut used = vec![false; theirs.len()];
        mine.iter().all(|value| {
            match (0..theirs.len()).find(|&j| !used[j] && theirs[j] == *value) {
                Some(j) => {
                    used[j] = true;
                    true
                }
                None => false,
            }
        })
    }

    fn extend_mapping(
        &self,
        other: &Self,
        mine: &[NodeId],
        theirs: &[NodeId],
        mapping: &mut Vec<usize>,
        used: &mut [bool],
    ) -> bool {
        let i = mapping.len();
        if i == mine.len() {
            return true;
        }
        let a = mine[i];
        for j in 0..theirs.len() {
            let b = theirs[j];
            if used[j]
                || self.node(a) != other.node(b)
                || self.in_degree(a) != other.in_degree(b)
                || self.out_degree(a) != other.out_degree(b)
            {
                continue;
            }
            let consistent = (0..=i).all(|k| {
                let (ak, bk) = if k == i {
                    (a, b)
                } else {
                    (mine[k], theirs[mapping[k]])
                };
                self.same_edges((a, ak), other, (b, bk))
                    && self.same_edges((ak, a), other, (bk, b))
            });
            if !consistent {
                continue;
            }
            used[j] = true;
            mapping.push(j);
            if self.extend_mapping(other, mine, theirs, mapping, used) {
                return true;
            }
            mapping.pop();
            used[j] = false;
        }
        false
    }

    /// True when an isomorphism preserving all payloads exists
    pub fn is_isomorphic(&self, other: &Self) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let mine: Vec<NodeId> = self.node_ids().collect();
        let theirs: Vec<NodeId> = other.node_ids().collect();
        let mut mapping = Vec::with_capacity(mine.len());
        let mut used = vec![false; theirs.len()];
        self.extend_mapping(other, &mine, &theirs, &mut mapping, &mut used)
    }
}

impl<N: PartialEq, E: PartialEq> PartialEq for Graph<N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.is_isomorphic(other)
    }
}

impl<N: fmt::Debug, E: fmt::Debug> fmt::Debug for Graph<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index: HashMap<NodeId, usize> =
            self.node_ids().enumerate().map(|(i, id)| (id, i)).collect();
        f.debug_struct("Graph")
            .field("nodes", &self.nodes().map(|(_, v)| v).collect::<Vec<_>>())
            .field(
                "edges",
                &self
                    .edges()
                    .map(|(_, e)| (index[&e.from], index[&e.to], &e.value))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
