//! Association messages
//!
//! ```text
//! /tuio2/ala  s_id0 ... s_idN
//! /tuio2/coa  s_id slot s_id0 ... s_idN
//! /tuio2/lia  s_id physical (s_id l_id)*
//! /tuio2/lla  s_id physical (s_id l_id)*
//! /tuio2/lta  s_id physical (s_id l_id | true idx s_id l_id)*
//! ```
//!
//! `l_id` packs the output port of the source in the upper 16 bits and the
//! input port of the target in the lower 16. The link graphs hold session ids
//! as node payloads; the node at the center (star) or origin (chain, tree)
//! always carries the message's own session id.

use std::fmt;

use rosc::OscType;

use crate::codec::{uint_arg, ArgReader, OscCodec};
use crate::error::Topology;
use crate::graph::{Graph, NodeId};
use crate::ids::SessionId;
use crate::messages::skeleton::{decode_tree, encode_tree};
use crate::messages::traits::{impl_session_id, HasSessionId};
use crate::{Error, Result};

/// Output and input port of one link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinkPorts {
    pub output: u16,
    pub input: u16,
}

impl LinkPorts {
    pub fn new(output: u16, input: u16) -> Self {
        Self { output, input }
    }

    pub fn packed(&self) -> u32 {
        ((self.output as u32) << 16) | self.input as u32
    }

    pub fn unpack(packed: u32) -> Self {
        Self {
            output: (packed >> 16) as u16,
            input: (packed & 0xffff) as u16,
        }
    }
}

impl fmt::Display for LinkPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.output, self.input)
    }
}

pub type LinkGraph = Graph<SessionId, LinkPorts>;

fn read_link(r: &mut ArgReader<'_>) -> Option<(SessionId, LinkPorts)> {
    Some((r.uint()?, LinkPorts::unpack(r.uint()?)))
}

fn push_link(args: &mut Vec<OscType>, session_id: SessionId, ports: Option<&LinkPorts>) {
    args.push(uint_arg(session_id));
    args.push(uint_arg(ports.map_or(0, LinkPorts::packed)));
}

/// `/tuio2/ala`: sessions currently taking part in associations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliveAssociation {
    pub session_ids: Vec<SessionId>,
}

impl AliveAssociation {
    pub fn new(session_ids: Vec<SessionId>) -> Self {
        Self { session_ids }
    }
}

impl OscCodec for AliveAssociation {
    const PATH: &'static str = "/tuio2/ala";

    fn to_args(&self) -> Vec<OscType> {
        self.session_ids.iter().map(|id| uint_arg(*id)).collect()
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        ArgReader::new(args).rest_uints().map(Self::new)
    }
}

impl fmt::Display for AliveAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", Self::PATH, self.session_ids)
    }
}

/// `/tuio2/coa`: a container session and the sessions it holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerAssociation {
    pub session_id: SessionId,
    pub slot: u32,
    pub contained: Vec<SessionId>,
}

impl ContainerAssociation {
    pub fn new(session_id: SessionId, slot: u32, contained: Vec<SessionId>) -> Self {
        Self {
            session_id,
            slot,
            contained,
        }
    }
}

impl OscCodec for ContainerAssociation {
    const PATH: &'static str = "/tuio2/coa";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id), uint_arg(self.slot)];
        args.extend(self.contained.iter().map(|id| uint_arg(*id)));
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        Some(Self {
            session_id: r.uint()?,
            slot: r.uint()?,
            contained: r.rest_uints()?,
        })
    }
}

impl fmt::Display for ContainerAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} slot={} contains={:?}",
            Self::PATH,
            self.session_id,
            self.slot,
            self.contained
        )
    }
}

impl_session_id!(ContainerAssociation);

/// Shared state of the graph-carrying associations
#[derive(Debug, Clone, Default)]
struct LinkState {
    session_id: SessionId,
    physical: bool,
    graph: LinkGraph,
    /// Center or origin of `graph`, `None` exactly when the graph is empty
    anchor: Option<NodeId>,
}

impl LinkState {
    fn new(session_id: SessionId, physical: bool) -> Self {
        Self {
            session_id,
            physical,
            ..Default::default()
        }
    }

    /// Validate `graph` with `detect` and take it over, stamping the session
    /// id onto its anchor node.
    ///
    /// A lone node without links carries nothing beyond the header, so it is
    /// stored as the empty graph it decodes back to.
    fn replace(
        &mut self,
        mut graph: LinkGraph,
        detect: fn(&LinkGraph) -> Option<NodeId>,
        topology: Topology,
    ) -> Result<()> {
        if graph.edge_count() == 0 && graph.node_count() <= 1 {
            self.clear();
            return Ok(());
        }
        let anchor = detect(&graph).ok_or(Error::Topology(topology))?;
        if let Some(value) = graph.node_mut(anchor) {
            *value = self.session_id;
        }
        self.graph = graph;
        self.anchor = Some(anchor);
        Ok(())
    }

    fn set_session_id(&mut self, id: SessionId) {
        self.session_id = id;
        if let Some(value) = self.anchor.and_then(|a| self.graph.node_mut(a)) {
            *value = id;
        }
    }

    fn clear(&mut self) {
        self.graph.clear();
        self.anchor = None;
    }

    fn header(&self) -> Vec<OscType> {
        vec![uint_arg(self.session_id), OscType::Bool(self.physical)]
    }

    fn same(&self, other: &Self) -> bool {
        self.session_id == other.session_id
            && self.physical == other.physical
            && self.graph == other.graph
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, path: &str) -> fmt::Result {
        write!(
            f,
            "{} s_id={} physical={} nodes={} links={}",
            path,
            self.session_id,
            self.physical,
            self.graph.node_count(),
            self.graph.edge_count()
        )
    }
}

/// Read the `s_id physical` header shared by all link messages
fn read_header(r: &mut ArgReader<'_>) -> Option<LinkState> {
    Some(LinkState::new(r.uint()?, r.bool()?))
}

macro_rules! link_accessors {
    ($name:ident) => {
        impl $name {
            pub fn physical(&self) -> bool {
                self.state.physical
            }

            pub fn set_physical(&mut self, physical: bool) {
                self.state.physical = physical;
            }

            pub fn graph(&self) -> &LinkGraph {
                &self.state.graph
            }

            pub fn clear_graph(&mut self) {
                self.state.clear();
            }
        }

        impl HasSessionId for $name {
            fn session_id(&self) -> SessionId {
                self.state.session_id
            }

            fn set_session_id(&mut self, id: SessionId) {
                self.state.set_session_id(id);
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.state.same(&other.state)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.state.describe(f, Self::PATH)
            }
        }
    };
}

/// `/tuio2/lia`: links from one session to many, as an out-star
#[derive(Debug, Clone, Default)]
pub struct LinkAssociation {
    state: LinkState,
}

link_accessors!(LinkAssociation);

impl LinkAssociation {
    pub fn new(session_id: SessionId, physical: bool) -> Self {
        Self {
            state: LinkState::new(session_id, physical),
        }
    }

    /// Replace the link graph. It must be empty or an out-star; the center
    /// takes this message's session id. On error the current graph is kept.
    pub fn set_link_graph(&mut self, graph: LinkGraph) -> Result<()> {
        self.state
            .replace(graph, LinkGraph::topology_star_center, Topology::Star)
    }

    pub fn center(&self) -> Option<NodeId> {
        self.state.anchor
    }

    /// Linked session ids with their ports, in link order
    pub fn links(&self) -> Vec<(SessionId, LinkPorts)> {
        let Some(center) = self.state.anchor else {
            return Vec::new();
        };
        let graph = &self.state.graph;
        graph
            .out_edges(center)
            .filter_map(|(_, edge)| Some((*graph.node(edge.to())?, *edge.value())))
            .collect()
    }
}

impl OscCodec for LinkAssociation {
    const PATH: &'static str = "/tuio2/lia";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = self.state.header();
        for (session_id, ports) in self.links() {
            push_link(&mut args, session_id, Some(&ports));
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let mut state = read_header(&mut r)?;
        let mut graph = LinkGraph::new();
        if !r.is_empty() {
            let center = graph.create_node(state.session_id);
            while !r.is_empty() {
                let (session_id, ports) = read_link(&mut r)?;
                let leaf = graph.create_node(session_id);
                graph.create_edge(center, leaf, ports)?;
            }
        }
        state
            .replace(graph, LinkGraph::topology_star_center, Topology::Star)
            .ok()?;
        Some(Self { state })
    }
}

/// `/tuio2/lla`: a chain of linked sessions starting at this one
#[derive(Debug, Clone, Default)]
pub struct LinkedListAssociation {
    state: LinkState,
}

link_accessors!(LinkedListAssociation);

impl LinkedListAssociation {
    pub fn new(session_id: SessionId, physical: bool) -> Self {
        Self {
            state: LinkState::new(session_id, physical),
        }
    }

    /// Replace the chain. It must be empty or a single simple directed chain;
    /// the origin takes this message's session id.
    pub fn set_list_graph(&mut self, graph: LinkGraph) -> Result<()> {
        self.state
            .replace(graph, LinkGraph::topology_chain_origin, Topology::Chain)
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.state.anchor
    }

    /// Session ids in chain order, origin first
    pub fn chain(&self) -> Vec<SessionId> {
        let Some(origin) = self.state.anchor else {
            return Vec::new();
        };
        let graph = &self.state.graph;
        graph
            .depth_first_from(origin)
            .iter()
            .filter_map(|step| graph.node(step.node).copied())
            .collect()
    }
}

impl OscCodec for LinkedListAssociation {
    const PATH: &'static str = "/tuio2/lla";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = self.state.header();
        if let Some(origin) = self.state.anchor {
            encode_tree(&self.state.graph, origin, false, &mut args, |args, id, ports| {
                push_link(args, *id, ports)
            });
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let mut state = read_header(&mut r)?;
        let mut graph = LinkGraph::new();
        if !r.is_empty() {
            let mut previous = graph.create_node(state.session_id);
            while !r.is_empty() {
                let (session_id, ports) = read_link(&mut r)?;
                let next = graph.create_node(session_id);
                graph.create_edge(previous, next, ports)?;
                previous = next;
            }
        }
        state
            .replace(graph, LinkGraph::topology_chain_origin, Topology::Chain)
            .ok()?;
        Some(Self { state })
    }
}

/// `/tuio2/lta`: a trunk tree of linked sessions rooted at this one
#[derive(Debug, Clone, Default)]
pub struct LinkedTreeAssociation {
    state: LinkState,
}

link_accessors!(LinkedTreeAssociation);

impl LinkedTreeAssociation {
    pub fn new(session_id: SessionId, physical: bool) -> Self {
        Self {
            state: LinkState::new(session_id, physical),
        }
    }

    /// Replace the tree. It must be empty or a trunk tree; the origin takes
    /// this message's session id.
    pub fn set_tree_graph(&mut self, graph: LinkGraph) -> Result<()> {
        self.state.replace(
            graph,
            LinkGraph::topology_trunk_tree_origin,
            Topology::TrunkTree,
        )
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.state.anchor
    }
}

impl OscCodec for LinkedTreeAssociation {
    const PATH: &'static str = "/tuio2/lta";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = self.state.header();
        if let Some(origin) = self.state.anchor {
            encode_tree(&self.state.graph, origin, false, &mut args, |args, id, ports| {
                push_link(args, *id, ports)
            });
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let mut state = read_header(&mut r)?;
        let graph = if r.is_empty() {
            LinkGraph::new()
        } else {
            decode_tree(&mut r, state.session_id, read_link)?
        };
        state
            .replace(
                graph,
                LinkGraph::topology_trunk_tree_origin,
                Topology::TrunkTree,
            )
            .ok()?;
        Some(Self { state })
    }
}
