use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Longest-path ranks in declaration order. Cycles are broken by promoting
/// the earliest remaining node to a source; its incoming edges become
/// back-edges and do not push ranks.
pub(super) fn compute_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indeg: Vec<usize> = vec![0; node_count];

    for &(from, to) in edges {
        if from == to || from >= node_count || to >= node_count {
            continue;
        }
        adj[from].push(to);
        indeg[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..node_count)
        .filter(|&idx| indeg[idx] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(node_count);
    let mut processed = vec![false; node_count];
    loop {
        while let Some(Reverse(idx)) = ready.pop() {
            if processed[idx] {
                continue;
            }
            order.push(idx);
            processed[idx] = true;
            for &next in &adj[idx] {
                if processed[next] {
                    continue;
                }
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() >= node_count {
            break;
        }

        // Cycle: restart from the earliest declared node still pending.
        match (0..node_count).find(|&idx| !processed[idx]) {
            Some(idx) => ready.push(Reverse(idx)),
            None => break,
        }
    }

    let mut order_index = vec![0; node_count];
    for (pos, &idx) in order.iter().enumerate() {
        order_index[idx] = pos;
    }

    let mut ranks = vec![0usize; node_count];
    for &node in &order {
        let rank = ranks[node];
        for &next in &adj[node] {
            if order_index[next] <= order_index[node] {
                continue;
            }
            ranks[next] = ranks[next].max(rank + 1);
        }
    }

    ranks
}

/// Reorders each rank by the median position of its neighbors, sweeping
/// down then up `passes` times.
pub(super) fn order_rank_nodes(
    rank_nodes: &mut [Vec<usize>],
    edges: &[(usize, usize)],
    node_count: usize,
    passes: usize,
) {
    if rank_nodes.len() <= 1 {
        return;
    }
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        if from == to || from >= node_count || to >= node_count {
            continue;
        }
        outgoing[from].push(to);
        incoming[to].push(from);
    }

    let mut positions = vec![0usize; node_count];
    update_positions(rank_nodes, &mut positions);

    for _ in 0..passes.max(1) {
        for rank in 1..rank_nodes.len() {
            if rank_nodes[rank].len() > 1 {
                sort_bucket(&mut rank_nodes[rank], &incoming, &positions);
                update_positions(rank_nodes, &mut positions);
            }
        }
        for rank in (0..rank_nodes.len() - 1).rev() {
            if rank_nodes[rank].len() > 1 {
                sort_bucket(&mut rank_nodes[rank], &outgoing, &positions);
                update_positions(rank_nodes, &mut positions);
            }
        }
    }
}

fn update_positions(rank_nodes: &[Vec<usize>], positions: &mut [usize]) {
    for bucket in rank_nodes {
        for (pos, &idx) in bucket.iter().enumerate() {
            positions[idx] = pos;
        }
    }
}

fn sort_bucket(bucket: &mut [usize], neighbors: &[Vec<usize>], positions: &[usize]) {
    let mut keyed: Vec<(usize, f32)> = bucket
        .iter()
        .map(|&idx| (idx, median_position(idx, neighbors, positions)))
        .collect();
    // Ties keep the previous order.
    keyed.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| positions[a.0].cmp(&positions[b.0]))
            .then_with(|| a.0.cmp(&b.0))
    });
    for (slot, (idx, _)) in bucket.iter_mut().zip(keyed) {
        *slot = idx;
    }
}

pub(super) fn median_position(node: usize, neighbors: &[Vec<usize>], positions: &[usize]) -> f32 {
    let list = &neighbors[node];
    if list.is_empty() {
        return positions[node] as f32;
    }
    let mut values: Vec<f32> = list.iter().map(|&n| positions[n] as f32).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}
