use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use log::{debug, warn};

use super::layered::LayeredEngine;
use super::types::{LayoutGeometry, LayoutRequest, NodeGeometry, Point};
use super::LayoutEngine;
use crate::ir::Direction;

/// Node placement and edge routing through dagre. If dagre loses any node
/// the whole request goes to [`LayeredEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreEngine;

impl LayoutEngine for DagreEngine {
    fn compute_layout(&self, request: &LayoutRequest) -> LayoutGeometry {
        if request.nodes.is_empty() {
            return LayeredEngine.compute_layout(request);
        }
        match assign_positions_dagre(request) {
            Some(geometry) => geometry,
            None => {
                warn!("dagre did not place every class, using the layered engine");
                LayeredEngine.compute_layout(request)
            }
        }
    }
}

fn node_id(idx: usize) -> String {
    format!("n{idx}")
}

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopDown => "tb",
        Direction::LeftRight => "lr",
    }
}

fn assign_positions_dagre(request: &LayoutRequest) -> Option<LayoutGeometry> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(dagre_rankdir(request.direction).to_string());
    graph_config.nodesep = Some(request.node_spacing);
    graph_config.ranksep = Some(request.rank_spacing);
    graph_config.marginx = Some(0.0);
    graph_config.marginy = Some(0.0);
    dagre_graph.set_graph(graph_config);

    for (idx, size) in request.nodes.iter().enumerate() {
        let mut node = DagreNode::default();
        node.width = size.width;
        node.height = size.height;
        dagre_graph.set_node(node_id(idx), Some(node));
    }

    let count = request.nodes.len();
    for &(from, to) in &request.edges {
        // Self-loops have no route to lay out.
        if from == to || from >= count || to >= count {
            continue;
        }
        let from = node_id(from);
        let to = node_id(to);
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&from, &to, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut nodes = Vec::with_capacity(count);
    for (idx, size) in request.nodes.iter().enumerate() {
        let id = node_id(idx);
        let dagre_node = dagre_graph.node(&id)?;
        let center = Point::new(dagre_node.x, dagre_node.y);
        if !center.is_finite() {
            debug!("dagre produced a non-finite center for {id}");
            return None;
        }
        nodes.push(NodeGeometry {
            center,
            width: size.width,
            height: size.height,
        });
    }
    let edges = request
        .edges
        .iter()
        .map(|&(from, to)| edge_bends(&dagre_graph, from, to, count))
        .collect();
    Some(LayoutGeometry { nodes, edges })
}

/// Interior points of the route dagre computed for `from -> to`. The first
/// and last points sit on the node boundaries and are dropped.
fn edge_bends(
    dagre_graph: &DagreGraph<DagreConfig, DagreNode, DagreEdge>,
    from: usize,
    to: usize,
    count: usize,
) -> Vec<Point> {
    if from == to || from >= count || to >= count {
        return Vec::new();
    }
    let Some(points) = dagre_graph
        .edge(&node_id(from), &node_id(to), None)
        .and_then(|edge| edge.points.as_ref())
    else {
        return Vec::new();
    };
    if points.len() <= 2 {
        return Vec::new();
    }
    points[1..points.len() - 1]
        .iter()
        .map(|point| Point::new(point.x, point.y))
        .filter(|point| point.is_finite())
        .collect()
}
