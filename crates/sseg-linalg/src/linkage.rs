// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Matrix, SegError};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

/// One agglomeration step. Ids `>= n_leaves` name earlier merges
/// (`n_leaves + merge index`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    /// Leaves under the merged node.
    pub size: usize,
}

/// Binary merge tree over `n_leaves` observations with `n_leaves - 1` merges.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct LinkageTree {
    pub n_leaves: usize,
    pub merges: Vec<Merge>,
}

/// Flat-cluster cut criterion.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Criterion {
    /// Cut every subtree whose largest merge distance is `<= t`.
    #[default]
    Distance,
    /// Produce at most `floor(t)` clusters with the smallest possible cut.
    MaxClust,
}

impl LinkageTree {
    /// Builds a tree from explicit merges, checking that every child exists
    /// before it is used and is used at most once.
    pub fn from_merges(n_leaves: usize, merges: Vec<Merge>) -> Result<Self, SegError> {
        if n_leaves == 0 {
            return Err(SegError::invalid_input("linkage tree requires at least one leaf"));
        }
        if merges.len() + 1 != n_leaves {
            return Err(SegError::invalid_input(format!(
                "linkage tree over {n_leaves} leaves needs {} merges; got {}",
                n_leaves - 1,
                merges.len()
            )));
        }
        let mut used = vec![false; 2 * n_leaves - 1];
        for (idx, merge) in merges.iter().enumerate() {
            let created = n_leaves + idx;
            for child in [merge.left, merge.right] {
                if child >= created || used[child] {
                    return Err(SegError::invalid_input(format!(
                        "merge {idx} references invalid or reused node {child}"
                    )));
                }
                used[child] = true;
            }
            if !merge.distance.is_finite() || merge.distance < 0.0 {
                return Err(SegError::invalid_input(format!(
                    "merge {idx} has invalid distance {}",
                    merge.distance
                )));
            }
        }
        Ok(Self { n_leaves, merges })
    }

    pub fn max_distance(&self) -> f64 {
        self.merges.iter().map(|m| m.distance).fold(0.0, f64::max)
    }

    fn root(&self) -> usize {
        2 * self.n_leaves - 2
    }

    fn children(&self, node: usize) -> Option<(usize, usize)> {
        node.checked_sub(self.n_leaves)
            .map(|idx| (self.merges[idx].left, self.merges[idx].right))
    }

    /// Largest merge distance inside each merged node's subtree.
    fn subtree_max_distances(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.merges.len());
        for merge in &self.merges {
            let mut value = merge.distance;
            for child in [merge.left, merge.right] {
                if let Some(idx) = child.checked_sub(self.n_leaves) {
                    value = value.max(out[idx]);
                }
            }
            out.push(value);
        }
        out
    }

    fn cut(&self, max_dist: &[f64], t: f64) -> Vec<usize> {
        let mut labels = vec![0usize; self.n_leaves];
        let mut next = 0;
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            match self.children(node) {
                Some((left, right)) if max_dist[node - self.n_leaves] > t => {
                    stack.push(right);
                    stack.push(left);
                }
                _ => {
                    self.assign_subtree(node, next, &mut labels);
                    next += 1;
                }
            }
        }
        labels
    }

    fn assign_subtree(&self, node: usize, label: usize, labels: &mut [usize]) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match self.children(current) {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => labels[current] = label,
            }
        }
    }

    fn cluster_count(&self, max_dist: &[f64], t: f64) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            match self.children(node) {
                Some((left, right)) if max_dist[node - self.n_leaves] > t => {
                    stack.push(right);
                    stack.push(left);
                }
                _ => count += 1,
            }
        }
        count
    }

    /// Flat cluster labels (0-based, numbered in left-first traversal order).
    pub fn fcluster(&self, t: f64, criterion: Criterion) -> Result<Vec<usize>, SegError> {
        if !t.is_finite() || t < 0.0 {
            return Err(SegError::invalid_input(format!(
                "cluster threshold must be finite and >= 0; got {t}"
            )));
        }
        if self.n_leaves == 1 {
            return Ok(vec![0]);
        }
        let max_dist = self.subtree_max_distances();
        match criterion {
            Criterion::Distance => Ok(self.cut(&max_dist, t)),
            Criterion::MaxClust => {
                let k = (t.floor() as usize).max(1);
                if k >= self.n_leaves {
                    return Ok(self.cut(&max_dist, -1.0));
                }
                let mut thresholds = max_dist.clone();
                thresholds.sort_by(f64::total_cmp);
                thresholds.dedup();
                let idx = thresholds
                    .partition_point(|&th| self.cluster_count(&max_dist, th) > k)
                    .min(thresholds.len() - 1);
                Ok(self.cut(&max_dist, thresholds[idx]))
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct WardCandidate {
    distance: f64,
    a: usize,
    b: usize,
}

impl PartialEq for WardCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WardCandidate {}

impl PartialOrd for WardCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WardCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the closest pair first.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.a.cmp(&self.a))
            .then_with(|| other.b.cmp(&self.b))
    }
}

fn ward_distance(size_a: usize, centroid_a: &[f64], size_b: usize, centroid_b: &[f64]) -> f64 {
    let (na, nb) = (size_a as f64, size_b as f64);
    let sq: f64 = centroid_a
        .iter()
        .zip(centroid_b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    (2.0 * na * nb / (na + nb) * sq).sqrt()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn adjacency(data: &Matrix, connectivity: Option<&Matrix>) -> Result<Vec<BTreeSet<usize>>, SegError> {
    let n = data.rows();
    let Some(conn) = connectivity else {
        return Ok((0..n)
            .map(|i| (0..n).filter(|&j| j != i).collect())
            .collect());
    };
    if !conn.is_square() || conn.rows() != n {
        return Err(SegError::invalid_input(format!(
            "ward connectivity must be {n}x{n}; got {}x{}",
            conn.rows(),
            conn.cols()
        )));
    }
    let mut adj = vec![BTreeSet::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if conn.get(i, j) != 0.0 || conn.get(j, i) != 0.0 {
                adj[i].insert(j);
                adj[j].insert(i);
            }
        }
    }
    bridge_components(data, &mut adj);
    Ok(adj)
}

/// Links every pair of connected components at their closest pair of points.
fn bridge_components(data: &Matrix, adj: &mut [BTreeSet<usize>]) {
    let n = adj.len();
    let mut component = vec![usize::MAX; n];
    let mut members: Vec<Vec<usize>> = vec![];
    for start in 0..n {
        if component[start] != usize::MAX {
            continue;
        }
        let id = members.len();
        let mut group = vec![];
        let mut stack = vec![start];
        component[start] = id;
        while let Some(node) = stack.pop() {
            group.push(node);
            for &next in &adj[node] {
                if component[next] == usize::MAX {
                    component[next] = id;
                    stack.push(next);
                }
            }
        }
        group.sort_unstable();
        members.push(group);
    }

    for i in 0..members.len() {
        for j in 0..i {
            let mut best = (f64::INFINITY, members[i][0], members[j][0]);
            for &p in &members[i] {
                for &q in &members[j] {
                    let d = squared_distance(data.row(p), data.row(q));
                    if d < best.0 {
                        best = (d, p, q);
                    }
                }
            }
            adj[best.1].insert(best.2);
            adj[best.2].insert(best.1);
        }
    }
}

/// Ward agglomeration of the rows of `data`.
///
/// With `connectivity`, only pairs linked by a non-zero off-diagonal entry
/// (or by a bridge between disconnected components) may merge, so an all-zero
/// matrix behaves like the unconstrained tree. Merge distance is
/// `sqrt(2 na nb / (na + nb)) * |ca - cb|`.
pub fn ward_tree(data: &Matrix, connectivity: Option<&Matrix>) -> Result<LinkageTree, SegError> {
    let n = data.rows();
    if n == 0 {
        return Err(SegError::invalid_input("ward linkage requires at least one observation"));
    }
    if !data.all_finite() {
        return Err(SegError::numerical_issue("ward linkage input contains non-finite values"));
    }

    let mut adj = adjacency(data, connectivity)?;
    adj.resize(2 * n - 1, BTreeSet::new());
    let mut centroids: Vec<Vec<f64>> = (0..n).map(|r| data.row(r).to_vec()).collect();
    let mut sizes = vec![1usize; n];
    let mut alive = vec![true; n];

    let mut heap = BinaryHeap::new();
    for a in 0..n {
        for &b in adj[a].range((a + 1)..) {
            heap.push(WardCandidate {
                distance: ward_distance(1, &centroids[a], 1, &centroids[b]),
                a,
                b,
            });
        }
    }

    let mut merges = Vec::with_capacity(n - 1);
    while merges.len() + 1 < n {
        let Some(candidate) = heap.pop() else {
            return Err(SegError::numerical_issue(format!(
                "ward linkage stalled after {} of {} merges",
                merges.len(),
                n - 1
            )));
        };
        let (a, b) = (candidate.a, candidate.b);
        if !alive[a] || !alive[b] {
            continue;
        }

        let node = n + merges.len();
        let size = sizes[a] + sizes[b];
        let (wa, wb) = (sizes[a] as f64 / size as f64, sizes[b] as f64 / size as f64);
        let centroid: Vec<f64> = centroids[a]
            .iter()
            .zip(&centroids[b])
            .map(|(x, y)| wa * x + wb * y)
            .collect();
        alive[a] = false;
        alive[b] = false;
        merges.push(Merge {
            left: a,
            right: b,
            distance: candidate.distance,
            size,
        });

        let neighbours: BTreeSet<usize> = adj[a]
            .union(&adj[b])
            .copied()
            .filter(|&x| x != a && x != b && alive[x])
            .collect();
        for &x in &neighbours {
            adj[x].remove(&a);
            adj[x].remove(&b);
            adj[x].insert(node);
            heap.push(WardCandidate {
                distance: ward_distance(size, &centroid, sizes[x], &centroids[x]),
                a: x.min(node),
                b: x.max(node),
            });
        }
        adj[a].clear();
        adj[b].clear();
        adj[node] = neighbours;
        centroids.push(centroid);
        sizes.push(size);
        alive.push(true);
    }

    Ok(LinkageTree { n_leaves: n, merges })
}
