use log::debug;

use super::ranking::{compute_ranks, order_rank_nodes};
use super::types::{LayoutGeometry, LayoutRequest, NodeGeometry, Point};
use super::LayoutEngine;
use crate::ir::Direction;

/// Built-in rank/row placement. Deterministic for a fixed request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredEngine;

impl LayoutEngine for LayeredEngine {
    fn compute_layout(&self, request: &LayoutRequest) -> LayoutGeometry {
        let count = request.nodes.len();
        if count == 0 {
            return LayoutGeometry {
                nodes: Vec::new(),
                edges: vec![Vec::new(); request.edges.len()],
            };
        }

        let ranks = compute_ranks(count, &request.edges);
        let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;
        let mut rank_nodes: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
        for (idx, &rank) in ranks.iter().enumerate() {
            rank_nodes[rank].push(idx);
        }
        order_rank_nodes(&mut rank_nodes, &request.edges, count, request.order_passes);

        // Main axis runs along ranks, cross axis along a rank.
        let (main_size, cross_size): (Vec<f32>, Vec<f32>) = request
            .nodes
            .iter()
            .map(|size| match request.direction {
                Direction::TopDown => (size.height, size.width),
                Direction::LeftRight => (size.width, size.height),
            })
            .unzip();

        let mut rank_main = Vec::with_capacity(rank_count);
        let mut cursor = 0.0f32;
        for bucket in &rank_nodes {
            let thickness = bucket.iter().map(|&idx| main_size[idx]).fold(0.0, f32::max);
            rank_main.push(cursor + thickness / 2.0);
            cursor += thickness + request.rank_spacing;
        }

        let rank_extent: Vec<f32> = rank_nodes
            .iter()
            .map(|bucket| {
                let sizes: f32 = bucket.iter().map(|&idx| cross_size[idx]).sum();
                sizes + request.node_spacing * bucket.len().saturating_sub(1) as f32
            })
            .collect();
        let widest = rank_extent.iter().copied().fold(0.0, f32::max);

        let mut cross = vec![0.0f32; count];
        for (bucket, extent) in rank_nodes.iter().zip(&rank_extent) {
            let mut offset = (widest - extent) / 2.0;
            for &idx in bucket {
                cross[idx] = offset + cross_size[idx] / 2.0;
                offset += cross_size[idx] + request.node_spacing;
            }
        }

        let place = |cross: f32, main: f32| match request.direction {
            Direction::TopDown => Point::new(cross, main),
            Direction::LeftRight => Point::new(main, cross),
        };

        let nodes = request
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, size)| NodeGeometry {
                center: place(cross[idx], rank_main[ranks[idx]]),
                width: size.width,
                height: size.height,
            })
            .collect();

        let edges = request
            .edges
            .iter()
            .map(|&(from, to)| {
                if from == to || from >= count || to >= count {
                    return Vec::new();
                }
                let (r_from, r_to) = (ranks[from], ranks[to]);
                let span = r_from.abs_diff(r_to);
                if span <= 1 {
                    return Vec::new();
                }
                (1..span)
                    .map(|step| {
                        let t = step as f32 / span as f32;
                        let rank = if r_to > r_from { r_from + step } else { r_from - step };
                        let c = cross[from] + (cross[to] - cross[from]) * t;
                        place(c, rank_main[rank])
                    })
                    .collect()
            })
            .collect();

        debug!("layered layout: {count} nodes on {rank_count} ranks");
        LayoutGeometry { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::NodeSize;

    fn request(nodes: usize, edges: Vec<(usize, usize)>, direction: Direction) -> LayoutRequest {
        LayoutRequest {
            nodes: vec![
                NodeSize {
                    width: 40.0,
                    height: 20.0,
                };
                nodes
            ],
            edges,
            direction,
            node_spacing: 50.0,
            rank_spacing: 50.0,
            order_passes: 4,
        }
    }

    #[test]
    fn ranks_stack_top_down() {
        let geometry = LayeredEngine.compute_layout(&request(3, vec![(0, 1), (1, 2)], Direction::TopDown));
        let ys: Vec<f32> = geometry.nodes.iter().map(|n| n.center.y).collect();
        assert_eq!(ys, vec![10.0, 80.0, 150.0]);
        assert!(geometry.nodes.iter().all(|n| n.center.x == 20.0));
        assert_eq!(geometry.edges, vec![Vec::<Point>::new(), Vec::new()]);
    }

    #[test]
    fn siblings_do_not_overlap() {
        let geometry = LayeredEngine.compute_layout(&request(3, vec![(0, 1), (0, 2)], Direction::TopDown));
        let a = geometry.nodes[1].rect();
        let b = geometry.nodes[2].rect();
        assert!(a.right() < b.left() || b.right() < a.left());
        assert_eq!(a.center.y, b.center.y);
    }

    #[test]
    fn long_edges_get_bend_points_on_skipped_ranks() {
        let geometry =
            LayeredEngine.compute_layout(&request(3, vec![(0, 1), (1, 2), (0, 2)], Direction::LeftRight));
        assert_eq!(geometry.edges[2].len(), 1);
        assert_eq!(geometry.edges[2][0].x, geometry.nodes[1].center.x);
    }

    #[test]
    fn empty_request_is_empty_geometry() {
        let geometry = LayeredEngine.compute_layout(&request(0, Vec::new(), Direction::TopDown));
        assert!(geometry.nodes.is_empty());
        assert!(geometry.edges.is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let req = request(5, vec![(0, 1), (0, 2), (2, 3), (1, 3), (4, 0)], Direction::TopDown);
        assert_eq!(LayeredEngine.compute_layout(&req), LayeredEngine.compute_layout(&req));
    }
}
