//! One-to-one pairing between two families of rectangles.
//!
//! Used where each element of one family belongs to at most one element of
//! the other: part counts to part images, step numbers to diagrams. A cost
//! matrix is built with [`pairing_cost`] and solved with the Hungarian
//! algorithm ([`min_cost_assignment`]). Pairs whose cost is infinite are
//! never reported.

use crate::geometry::{euclidean_distance, Rect};
use serde::{Deserialize, Serialize};

/// Weights of the pairing cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Weight of the position term
    pub position_weight: f64,
    /// Weight of the distance term
    pub distance_weight: f64,
    /// Distance (points) at which the position score drops to 1/e
    pub position_decay: f64,
    /// Rectangle distance (points) at which the distance score reaches zero
    pub max_distance: f64,
    /// Pairs scoring below this are invalid
    pub min_pair_score: f64,
    /// Reject pairs whose connecting line crosses a divider
    pub respect_dividers: bool,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            position_weight: 0.5,
            distance_weight: 0.5,
            position_decay: 60.0,
            max_distance: 250.0,
            min_pair_score: 0.05,
            respect_dividers: true,
        }
    }
}

impl PairingConfig {
    /// Set the distance at which the distance score reaches zero.
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the decay length of the position score.
    pub fn with_position_decay(mut self, decay: f64) -> Self {
        self.position_decay = decay;
        self
    }

    /// Enable or disable the divider check.
    pub fn with_respect_dividers(mut self, respect: bool) -> Self {
        self.respect_dividers = respect;
        self
    }
}

/// Whether the segment between the two centers passes through a divider
/// that lies outside both rectangles.
pub fn crosses_divider(a: &Rect, b: &Rect, dividers: &[Rect]) -> bool {
    let (ca, cb) = (a.center(), b.center());
    dividers
        .iter()
        .filter(|d| !a.contains(d) && !b.contains(d))
        .any(|d| d.intersects_segment(&ca, &cb))
}

/// Cost of pairing `marker` with `target`: lower is better, infinite when
/// the pair is not allowed.
///
/// The score rewards a marker sitting near the target's top-left corner
/// (exponential decay of the center-to-corner distance) and a marker close
/// to the target's rectangle (linear falloff to zero at `max_distance`).
pub fn pairing_cost(marker: &Rect, target: &Rect, dividers: &[Rect], config: &PairingConfig) -> f64 {
    if config.respect_dividers && crosses_divider(marker, target, dividers) {
        return f64::INFINITY;
    }
    let corner_distance = euclidean_distance(&marker.center(), &target.top_left());
    let position_score = if config.position_decay > 0.0 {
        (-corner_distance / config.position_decay).exp()
    } else {
        0.0
    };
    let distance_score = if config.max_distance > 0.0 {
        (1.0 - marker.distance_to(target) / config.max_distance).max(0.0)
    } else {
        0.0
    };
    let weight = config.position_weight + config.distance_weight;
    let score = if weight > 0.0 {
        (config.position_weight * position_score + config.distance_weight * distance_score) / weight
    } else {
        0.0
    };
    if score < config.min_pair_score {
        return f64::INFINITY;
    }
    -score
}

/// Pair markers with targets. Returns `(marker, target)` index pairs sorted
/// by marker index.
pub fn pair(markers: &[Rect], targets: &[Rect], dividers: &[Rect], config: &PairingConfig) -> Vec<(usize, usize)> {
    let costs: Vec<Vec<f64>> = markers
        .iter()
        .map(|m| targets.iter().map(|t| pairing_cost(m, t, dividers, config)).collect())
        .collect();
    min_cost_assignment(&costs)
}

/// Minimum-cost one-to-one assignment over an `n x m` cost matrix.
///
/// Every row is matched when `n <= m` (every column otherwise), except that
/// pairs with an infinite cost are dropped from the output. Returns
/// `(row, column)` pairs sorted by row.
///
/// ```
/// use instruction_oxide::pairing::min_cost_assignment;
///
/// let costs = vec![
///     vec![4.0, 1.0, 6.0],
///     vec![2.0, 0.0, 5.0],
/// ];
/// assert_eq!(min_cost_assignment(&costs), vec![(0, 1), (1, 0)]);
/// ```
pub fn min_cost_assignment(costs: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let n = costs.len();
    let m = costs.first().map_or(0, Vec::len);
    if n == 0 || m == 0 {
        return Vec::new();
    }

    // Finite stand-in for forbidden pairs, dominating any sum of real costs.
    let finite_max = costs
        .iter()
        .flatten()
        .filter(|c| c.is_finite())
        .fold(0.0_f64, |acc, c| acc.max(c.abs()));
    let forbidden = (finite_max + 1.0) * (n.max(m) as f64 + 1.0) * 2.0;
    let cost_at = |r: usize, c: usize| -> f64 {
        let v = costs[r].get(c).copied().unwrap_or(f64::INFINITY);
        if v.is_finite() {
            v
        } else {
            forbidden
        }
    };

    let transposed = n > m;
    let (rows, cols) = if transposed { (m, n) } else { (n, m) };
    let matrix = |r: usize, c: usize| if transposed { cost_at(c, r) } else { cost_at(r, c) };

    let assignment = hungarian(rows, cols, matrix);

    let mut pairs: Vec<(usize, usize)> = assignment
        .into_iter()
        .enumerate()
        .filter_map(|(r, c)| c.map(|c| if transposed { (c, r) } else { (r, c) }))
        .filter(|&(r, c)| costs[r].get(c).is_some_and(|v| v.is_finite()))
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Shortest augmenting path Hungarian algorithm with potentials for
/// `rows <= cols`. Returns the column of each row.
fn hungarian(rows: usize, cols: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<Option<usize>> {
    // 1-based: index 0 of `col_owner` is the virtual column of the row being
    // inserted.
    let mut u = vec![0.0; rows + 1];
    let mut v = vec![0.0; cols + 1];
    let mut col_owner = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];

    for i in 1..=rows {
        col_owner[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; cols + 1];
        let mut used = vec![false; cols + 1];
        loop {
            used[j0] = true;
            let i0 = col_owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=cols {
                if used[j] {
                    continue;
                }
                let cur = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=cols {
                if used[j] {
                    u[col_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if col_owner[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            col_owner[j0] = col_owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![None; rows];
    for j in 1..=cols {
        if col_owner[j] > 0 {
            assignment[col_owner[j] - 1] = Some(j - 1);
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_beats_greedy() {
        // Greedy would take (0, 0) at cost 1 and then (1, 1) at cost 10.
        let costs = vec![vec![1.0, 2.0], vec![2.0, 10.0]];
        assert_eq!(min_cost_assignment(&costs), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_more_rows_than_columns() {
        let costs = vec![vec![5.0], vec![1.0], vec![3.0]];
        assert_eq!(min_cost_assignment(&costs), vec![(1, 0)]);
    }

    #[test]
    fn test_infinite_pairs_are_dropped() {
        let inf = f64::INFINITY;
        let costs = vec![vec![inf, inf], vec![-1.0, -2.0]];
        assert_eq!(min_cost_assignment(&costs), vec![(1, 1)]);
    }

    #[test]
    fn test_infinite_costs_do_not_displace_valid_pairs() {
        let inf = f64::INFINITY;
        let costs = vec![vec![-1.0, inf], vec![-5.0, -0.5]];
        assert_eq!(min_cost_assignment(&costs), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_empty() {
        assert!(min_cost_assignment(&[]).is_empty());
        assert!(min_cost_assignment(&[vec![]]).is_empty());
    }

    #[test]
    fn test_divider_blocks_pair() {
        let marker = Rect::new(10.0, 10.0, 20.0, 20.0);
        let near = Rect::new(40.0, 10.0, 80.0, 50.0);
        let divider = Rect::new(30.0, 0.0, 30.5, 100.0);
        assert!(crosses_divider(&marker, &near, &[divider]));
        let cost = pairing_cost(&marker, &near, &[divider], &PairingConfig::default());
        assert!(cost.is_infinite());

        // A divider drawn inside the target does not count.
        let inner = Rect::new(50.0, 20.0, 50.5, 40.0);
        assert!(!crosses_divider(&marker, &near, &[inner]));
    }

    #[test]
    fn test_marker_at_top_left_is_preferred() {
        let config = PairingConfig::default();
        let marker = Rect::new(10.0, 10.0, 20.0, 20.0);
        let below_right = Rect::new(22.0, 22.0, 100.0, 100.0);
        let far_left = Rect::new(-200.0, 150.0, -100.0, 250.0);
        let good = pairing_cost(&marker, &below_right, &[], &config);
        let bad = pairing_cost(&marker, &far_left, &[], &config);
        assert!(good < bad, "{good} vs {bad}");
    }
}
