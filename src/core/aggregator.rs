//! Element aggregator
//!
//! Tallies weighted element occurrences over the four pillars and
//! normalizes them into a distribution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{AggregationMode, Element, FourPillars};

/// Weight of each pillar stem
pub const STEM_WEIGHT: f64 = 1.0;
/// Weight of each pillar branch
pub const BRANCH_WEIGHT: f64 = 0.5;

/// Normalized element weights plus the raw tallies they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDistribution {
    /// Share of each element, rounded to 2 decimals
    pub weights: BTreeMap<Element, f64>,
    /// Unnormalized tallies
    pub tallies: BTreeMap<Element, f64>,
    /// Sum of the tallies
    pub total: f64,
}

impl ElementDistribution {
    /// Build from raw tallies, one slot per element in enumeration order
    pub fn from_tallies(raw: [f64; 5]) -> Self {
        let total: f64 = raw.iter().sum();
        let mut weights = BTreeMap::new();
        let mut tallies = BTreeMap::new();
        for element in Element::ALL {
            let tally = raw[element.index()];
            let share = if total > 0.0 { tally / total } else { 0.0 };
            weights.insert(element, round2(share));
            tallies.insert(element, tally);
        }
        Self {
            weights,
            tallies,
            total,
        }
    }

    pub fn weight(&self, element: Element) -> f64 {
        self.weights.get(&element).copied().unwrap_or(0.0)
    }

    pub fn tally(&self, element: Element) -> f64 {
        self.tallies.get(&element).copied().unwrap_or(0.0)
    }

    /// Sum of the rounded weights
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Elements by descending weight; ties keep enumeration order
    pub fn ranking(&self) -> Vec<Element> {
        let mut ranked = Element::ALL.to_vec();
        // sort_by is stable
        ranked.sort_by(|a, b| {
            self.weight(*b)
                .partial_cmp(&self.weight(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Largest and smallest rounded weight
    pub fn weight_extremes(&self) -> (f64, f64) {
        let values = Element::ALL.map(|e| self.weight(e));
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        (max, min)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Tally the elements of four pillars
pub fn aggregate(pillars: &FourPillars, mode: AggregationMode) -> ElementDistribution {
    let mut raw = [0.0_f64; 5];
    for (_, pillar) in pillars.entries() {
        raw[pillar.stem.element().index()] += STEM_WEIGHT;
        if mode == AggregationMode::StemsAndBranches {
            raw[pillar.branch.element().index()] += BRANCH_WEIGHT;
        }
    }
    let distribution = ElementDistribution::from_tallies(raw);
    tracing::debug!(?mode, total = distribution.total, "Aggregated elements");
    distribution
}
