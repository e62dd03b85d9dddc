//! Skeleton geometry and the depth-first tree layout it shares with linked
//! tree associations.
//!
//! A tree is written depth-first from its origin. Each node entry follows
//! its parent directly; when the walk jumps back up the tree, a `true`
//! separator and the parent's entry index precede the next entry.
//!
//! ```text
//! /tuio2/skg  s_id x0 y0 x1 y1 ... [true idx xK yK ...]
//! /tuio2/s3d  s_id x0 y0 z0 x1 y1 z1 ... [true idx xK yK zK ...]
//! ```

use std::collections::HashMap;
use std::fmt;

use rosc::OscType;

use crate::codec::{uint_arg, ArgReader, OscCodec};
use crate::error::Topology;
use crate::geometry::{Point2, Point3};
use crate::graph::{Graph, NodeId};
use crate::ids::SessionId;
use crate::messages::traits::{
    move_points, pitch_point, roll_point, rotate_points, scale_points, HasSessionId, Movable2d,
    Movable3d, Rotatable2d, Rotatable3d, Scalable2d, Scalable3d,
};
use crate::{Error, Result};

/// Write the tree below `origin` depth-first. With `include_origin` false
/// the origin is implied by the message and occupies entry index 0 without
/// being written.
pub(crate) fn encode_tree<N, E>(
    graph: &Graph<N, E>,
    origin: NodeId,
    include_origin: bool,
    args: &mut Vec<OscType>,
    mut entry: impl FnMut(&mut Vec<OscType>, &N, Option<&E>),
) {
    let steps = graph.depth_first_from(origin);
    let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(steps.len());
    let mut previous: Option<NodeId> = None;
    for (i, step) in steps.iter().enumerate() {
        index.insert(step.node, i);
        if let (Some(parent), Some(prev)) = (step.parent, previous) {
            if parent != prev {
                args.push(OscType::Bool(true));
                args.push(uint_arg(index[&parent] as u32));
            }
        }
        previous = Some(step.node);
        if step.parent.is_none() && !include_origin {
            continue;
        }
        let Some(value) = graph.node(step.node) else {
            continue;
        };
        let edge = step.edge.and_then(|e| graph.edge(e)).map(|e| e.value());
        entry(args, value, edge);
    }
}

/// Inverse of [`encode_tree`]: `origin` is entry 0, every further entry is
/// attached to the previous one unless a separator names another parent.
pub(crate) fn decode_tree<N, E>(
    r: &mut ArgReader<'_>,
    origin: N,
    mut entry: impl FnMut(&mut ArgReader<'_>) -> Option<(N, E)>,
) -> Option<Graph<N, E>> {
    let mut graph = Graph::new();
    let mut entries = vec![graph.create_node(origin)];
    let mut parent = 0;
    while !r.is_empty() {
        if r.separator() {
            parent = r.uint()? as usize;
            if parent >= entries.len() {
                return None;
            }
        }
        let (value, edge) = entry(r)?;
        let node = graph.create_node(value);
        graph.create_edge(entries[parent], node, edge)?;
        entries.push(node);
        parent = entries.len() - 1;
    }
    Some(graph)
}

/// Node payload of a skeleton: a 2D or 3D joint position
pub trait SkeletonPoint: Copy + PartialEq + fmt::Debug + fmt::Display + Default {
    const PATH: &'static str;

    fn push_args(&self, args: &mut Vec<OscType>);

    fn read(r: &mut ArgReader<'_>) -> Option<Self>;
}

impl SkeletonPoint for Point2 {
    const PATH: &'static str = "/tuio2/skg";

    fn push_args(&self, args: &mut Vec<OscType>) {
        args.push(OscType::Float(self.x));
        args.push(OscType::Float(self.y));
    }

    fn read(r: &mut ArgReader<'_>) -> Option<Self> {
        Some(Point2::new(r.float()?, r.float()?))
    }
}

impl SkeletonPoint for Point3 {
    const PATH: &'static str = "/tuio2/s3d";

    fn push_args(&self, args: &mut Vec<OscType>) {
        args.extend([self.x, self.y, self.z].map(OscType::Float));
    }

    fn read(r: &mut ArgReader<'_>) -> Option<Self> {
        Some(Point3::new(r.float()?, r.float()?, r.float()?))
    }
}

pub type SkeletonGraph<P> = Graph<P, ()>;

/// Skeleton geometry: joints connected as a trunk tree
#[derive(Debug, Clone, Default)]
pub struct Skeleton<P: SkeletonPoint> {
    pub session_id: SessionId,
    graph: SkeletonGraph<P>,
    origin: Option<NodeId>,
}

pub type Skeleton2d = Skeleton<Point2>;
pub type Skeleton3d = Skeleton<Point3>;

impl<P: SkeletonPoint> Skeleton<P> {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            graph: Graph::new(),
            origin: None,
        }
    }

    pub fn with_graph(session_id: SessionId, graph: SkeletonGraph<P>) -> Result<Self> {
        let mut skeleton = Self::new(session_id);
        skeleton.set_graph(graph)?;
        Ok(skeleton)
    }

    /// Replace the joint graph. A graph that is not a trunk tree is rejected
    /// and the current graph is kept.
    pub fn set_graph(&mut self, graph: SkeletonGraph<P>) -> Result<()> {
        let origin = if graph.is_empty() {
            None
        } else {
            Some(
                graph
                    .topology_trunk_tree_origin()
                    .ok_or(Error::Topology(Topology::TrunkTree))?,
            )
        };
        self.graph = graph;
        self.origin = origin;
        Ok(())
    }

    pub fn graph(&self) -> &SkeletonGraph<P> {
        &self.graph
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    pub fn clear_graph(&mut self) {
        self.graph.clear();
        self.origin = None;
    }

    /// Joint positions in wire order
    pub fn joints(&self) -> Vec<P> {
        let Some(origin) = self.origin else {
            return Vec::new();
        };
        self.graph
            .depth_first_from(origin)
            .iter()
            .filter_map(|step| self.graph.node(step.node).copied())
            .collect()
    }
}

impl<P: SkeletonPoint> PartialEq for Skeleton<P> {
    fn eq(&self, other: &Self) -> bool {
        self.session_id == other.session_id && self.graph == other.graph
    }
}

impl<P: SkeletonPoint> HasSessionId for Skeleton<P> {
    fn session_id(&self) -> SessionId {
        self.session_id
    }

    fn set_session_id(&mut self, id: SessionId) {
        self.session_id = id;
    }
}

impl<P: SkeletonPoint> OscCodec for Skeleton<P> {
    const PATH: &'static str = P::PATH;

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        if let Some(origin) = self.origin {
            encode_tree(&self.graph, origin, true, &mut args, |args, point, _| {
                point.push_args(args)
            });
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        if r.is_empty() {
            return Some(Self::new(session_id));
        }
        let origin = P::read(&mut r)?;
        let graph = decode_tree(&mut r, origin, |r| Some((P::read(r)?, ())))?;
        Self::with_graph(session_id, graph).ok()
    }
}

impl<P: SkeletonPoint> fmt::Display for Skeleton<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} joints={} bones={}",
            Self::PATH,
            self.session_id,
            self.graph.node_count(),
            self.graph.edge_count()
        )
    }
}

impl Movable2d for Skeleton2d {
    fn move_x(&mut self, dx: f32) {
        move_points(self.graph.nodes_mut(), dx, 0.0);
    }

    fn move_y(&mut self, dy: f32) {
        move_points(self.graph.nodes_mut(), 0.0, dy);
    }
}

impl Scalable2d for Skeleton2d {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        scale_points(self.graph.nodes_mut(), factor, center_x, 1.0, 0.0);
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        scale_points(self.graph.nodes_mut(), 1.0, 0.0, factor, center_y);
    }
}

impl Rotatable2d for Skeleton2d {
    fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32) {
        rotate_points(self.graph.nodes_mut(), angle, center_x, center_y);
    }
}

impl Movable2d for Skeleton3d {
    fn move_x(&mut self, dx: f32) {
        for p in self.graph.nodes_mut() {
            p.x += dx;
        }
    }

    fn move_y(&mut self, dy: f32) {
        for p in self.graph.nodes_mut() {
            p.y += dy;
        }
    }
}

impl Movable3d for Skeleton3d {
    fn move_z(&mut self, dz: f32) {
        for p in self.graph.nodes_mut() {
            p.z += dz;
        }
    }
}

impl Scalable2d for Skeleton3d {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        for p in self.graph.nodes_mut() {
            p.x = crate::geometry::scale_about(p.x, factor, center_x);
        }
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        for p in self.graph.nodes_mut() {
            p.y = crate::geometry::scale_about(p.y, factor, center_y);
        }
    }
}

impl Scalable3d for Skeleton3d {
    fn scale_z(&mut self, factor: f32, center_z: f32) {
        for p in self.graph.nodes_mut() {
            p.z = crate::geometry::scale_about(p.z, factor, center_z);
        }
    }
}

impl Rotatable2d for Skeleton3d {
    fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32) {
        for p in self.graph.nodes_mut() {
            (p.x, p.y) = crate::geometry::rotate_about(p.x, p.y, angle, center_x, center_y);
        }
    }
}

impl Rotatable3d for Skeleton3d {
    fn pitch(&mut self, angle: f32, center: Point3) {
        for p in self.graph.nodes_mut() {
            pitch_point(p, angle, center);
        }
    }

    fn roll(&mut self, angle: f32, center: Point3) {
        for p in self.graph.nodes_mut() {
            roll_point(p, angle, center);
        }
    }
}
