use std::cell::{Cell, RefCell};

use fabrica_core::GenRng;

/// Bin-selection strategy for distribution fields.
///
/// A distribution picks one bin index per emission; the bin itself is an
/// ordinary field producer.
#[derive(Debug, Clone)]
pub enum Distribution {
    /// Truncated standard normal mapped onto the bin range.
    Normal,
    /// Uniform pick across bins.
    Uniform,
    /// Normalized weights, one per bin.
    Weighted { weights: Vec<f64> },
    /// Target shares with per-bin counters tracking the remaining share.
    Percent {
        weights: Vec<f64>,
        state: PercentState,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PercentState {
    counts: RefCell<Vec<i64>>,
    total: Cell<i64>,
}

impl Distribution {
    /// Build a distribution by name; unknown names fall back to uniform.
    pub fn from_name(name: &str, weights: Vec<f64>) -> Distribution {
        match name {
            "normal" => Distribution::Normal,
            "weighted" => Distribution::Weighted { weights },
            "percent" => Distribution::Percent {
                weights,
                state: PercentState::default(),
            },
            _ => Distribution::Uniform,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Distribution::Normal => "normal",
            Distribution::Uniform => "uniform",
            Distribution::Weighted { .. } => "weighted",
            Distribution::Percent { .. } => "percent",
        }
    }

    /// Whether bins of `domain` (a field kind tag) are valid for this
    /// distribution.
    pub fn compatible_domain(&self, domain: &str) -> bool {
        match self {
            Distribution::Normal => matches!(domain, "integer" | "decimal"),
            _ => true,
        }
    }

    pub fn supports_multiple_domains(&self) -> bool {
        !matches!(self, Distribution::Normal)
    }

    /// Select a bin index among `bins`.
    pub fn pick_bin(&self, bins: usize, rng: &mut GenRng) -> usize {
        match self {
            Distribution::Normal => {
                let z = rng.normal();
                let idx = (((z + 3.0) / 6.0) * bins as f64).floor() as i64;
                idx.clamp(0, bins as i64 - 1) as usize
            }
            Distribution::Uniform => rng.int_n(bins as i64) as usize,
            Distribution::Weighted { weights } => {
                let sum: f64 = weights.iter().take(bins).sum();
                if sum <= 0.0 {
                    return rng.int_n(bins as i64) as usize;
                }
                let mut draw = rng.float01() * sum;
                for (idx, weight) in weights.iter().take(bins).enumerate() {
                    draw -= weight;
                    if draw < 0.0 {
                        return idx;
                    }
                }
                bins - 1
            }
            Distribution::Percent { weights, state } => {
                let mut counts = state.counts.borrow_mut();
                if counts.len() != bins {
                    counts.resize(bins, 0);
                }
                let total = state.total.get();
                let sum: f64 = weights.iter().take(bins).sum();
                for idx in 0..bins {
                    let target = if sum > 0.0 {
                        weights.get(idx).copied().unwrap_or(0.0) / sum
                    } else {
                        1.0 / bins as f64
                    };
                    if (counts[idx] as f64) / (total.max(1) as f64) < target {
                        counts[idx] += 1;
                        state.total.set(total + 1);
                        return idx;
                    }
                }
                // rounding left every bin at or over target
                let idx = rng.int_n(bins as i64) as usize;
                counts[idx] += 1;
                state.total.set(total + 1);
                idx
            }
        }
    }
}
