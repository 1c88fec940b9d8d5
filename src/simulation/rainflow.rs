//! # Rainflow Cycle Counting
//!
//! Three-point rainflow counting (ASTM E1049-85) of a load signal:
//!
//! 1. Reduce the signal to its reversals (local peaks and valleys)
//! 2. Extract full and half cycles with the three-point range comparison
//! 3. Optionally bin cycle ranges into `nbins` equal-width amplitude bins
//!
//! Binning rounds each range up to the upper edge of its bin, with bin width
//! `(max - min) / nbins` of the raw signal.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// A counted load cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub range: f64,
    pub mean: f64,
    /// 1.0 for a full cycle, 0.5 for a half cycle
    pub count: f64,
    pub start: usize,
    pub end: usize,
}

impl Cycle {
    fn between(a: (usize, f64), b: (usize, f64), count: f64) -> Self {
        Self {
            range: (a.1 - b.1).abs(),
            mean: 0.5 * (a.1 + b.1),
            count,
            start: a.0,
            end: b.0,
        }
    }
}

/// Reversal points `(index, value)` of `series`, always including the first
/// sample and, from three samples on, the last. Repeated values are collapsed.
///
/// A two-sample series reduces to its first point, so it carries no cycle.
pub fn reversals(series: &[f64]) -> Vec<(usize, f64)> {
    if series.len() < 2 {
        return Vec::new();
    }

    let mut points = vec![(0, series[0])];
    if series.len() == 2 {
        return points;
    }
    let mut x = series[1];
    let mut x_index = 1;
    let mut d_last = x - series[0];

    for (index, &x_next) in series.iter().enumerate().skip(2) {
        if x_next == x {
            continue;
        }
        let d_next = x_next - x;
        if d_last * d_next < 0.0 {
            points.push((x_index, x));
        }
        x = x_next;
        x_index = index;
        d_last = d_next;
    }

    let last = series.len() - 1;
    points.push((last, series[last]));
    points
}

/// Full and half cycles of `series`
pub fn extract_cycles(series: &[f64]) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let mut stack: VecDeque<(usize, f64)> = VecDeque::new();

    for point in reversals(series) {
        stack.push_back(point);
        while stack.len() >= 3 {
            let n = stack.len();
            let x1 = stack[n - 3].1;
            let x2 = stack[n - 2].1;
            let x3 = stack[n - 1].1;
            let range_x = (x3 - x2).abs();
            let range_y = (x2 - x1).abs();

            if range_x < range_y {
                break;
            } else if n == 3 {
                // Y contains the starting point: half cycle
                cycles.push(Cycle::between(stack[0], stack[1], 0.5));
                stack.pop_front();
            } else {
                cycles.push(Cycle::between(stack[n - 3], stack[n - 2], 1.0));
                let last = stack[n - 1];
                stack.truncate(n - 3);
                stack.push_back(last);
            }
        }
    }

    // Residue counts as half cycles
    while stack.len() > 1 {
        cycles.push(Cycle::between(stack[0], stack[1], 0.5));
        stack.pop_front();
    }

    cycles
}

/// Cycle counts per binned range, sorted by range.
///
/// Returns `(bin_range, count)` pairs. Bins between zero and the largest
/// occupied bin are present even when empty.
pub fn count_cycles(series: &[f64], nbins: usize) -> Vec<(f64, f64)> {
    let cycles = extract_cycles(series);
    if cycles.is_empty() || nbins == 0 {
        return Vec::new();
    }

    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let bin_size = (max - min) / nbins as f64;
    if bin_size <= 0.0 {
        // Flat signal: every cycle has zero range
        let total = cycles.iter().map(|c| c.count).sum();
        return vec![(0.0, total)];
    }

    let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
    let mut n_max = 0;
    for cycle in &cycles {
        // Float error can push the largest range just past the last bin
        let n = ((cycle.range / bin_size).ceil() as usize).min(nbins);
        *counts.entry(n).or_insert(0.0) += cycle.count;
        n_max = n_max.max(n);
    }
    for n in 1..n_max {
        counts.entry(n).or_insert(0.0);
    }

    counts
        .into_iter()
        .map(|(n, count)| (n as f64 * bin_size, count))
        .collect()
}

/// Σ count × binned range: the fatigue load of `series`
pub fn weighted_range_sum(series: &[f64], nbins: usize) -> f64 {
    count_cycles(series, nbins)
        .iter()
        .map(|(range, count)| range * count)
        .sum()
}
