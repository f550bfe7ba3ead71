//! Pattern classifier
//!
//! Picks the dominant element from a distribution and scans every unordered
//! pair of pillars for stem and branch relations.
//!
//! # Relation tables
//!
//! | Relation           | Kind        | Entries |
//! |--------------------|-------------|---------|
//! | 천간합 (stem combination) | symmetric   | 5  |
//! | 천간충 (stem conflict)    | directional | 10 |
//! | 지지육합 (branch combination) | symmetric | 6 |
//! | 지지육충 (branch clash)   | symmetric   | 6  |
//!
//! Pairs are not restricted to adjacent pillars: year/hour is checked the
//! same as year/month. A directional relation only hits when the earlier
//! pillar holds the first stem of the table entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregator::ElementDistribution;
use super::models::{Branch, Element, FourPillars, PillarPosition, Stem};

// =============================================================================
// Tables
// =============================================================================

/// 甲己합토, 乙庚합금, 丙辛합수, 丁壬합목, 戊癸합화
const STEM_COMBINATIONS: [(Stem, Stem, Element); 5] = [
    (Stem::Gap, Stem::Gi, Element::Earth),
    (Stem::Eul, Stem::Gyeong, Element::Metal),
    (Stem::Byeong, Stem::Sin, Element::Water),
    (Stem::Jeong, Stem::Im, Element::Wood),
    (Stem::Mu, Stem::Gye, Element::Fire),
];

/// (attacker, target)
const STEM_CONFLICTS: [(Stem, Stem); 10] = [
    (Stem::Gap, Stem::Gyeong),
    (Stem::Eul, Stem::Sin),
    (Stem::Byeong, Stem::Im),
    (Stem::Jeong, Stem::Gye),
    (Stem::Mu, Stem::Gap),
    (Stem::Gi, Stem::Eul),
    (Stem::Gyeong, Stem::Byeong),
    (Stem::Sin, Stem::Jeong),
    (Stem::Im, Stem::Mu),
    (Stem::Gye, Stem::Gi),
];

const BRANCH_COMBINATIONS: [(Branch, Branch, Element); 6] = [
    (Branch::Ja, Branch::Chuk, Element::Earth),  // 子丑
    (Branch::In, Branch::Hae, Element::Wood),    // 寅亥
    (Branch::Myo, Branch::Sul, Element::Fire),   // 卯戌
    (Branch::Jin, Branch::Yu, Element::Metal),   // 辰酉
    (Branch::Sa, Branch::Sin, Element::Water),   // 巳申
    (Branch::O, Branch::Mi, Element::Fire),      // 午未
];

const BRANCH_CLASHES: [(Branch, Branch); 6] = [
    (Branch::Ja, Branch::O),    // 子午
    (Branch::Chuk, Branch::Mi), // 丑未
    (Branch::In, Branch::Sin),  // 寅申
    (Branch::Myo, Branch::Yu),  // 卯酉
    (Branch::Jin, Branch::Sul), // 辰戌
    (Branch::Sa, Branch::Hae),  // 巳亥
];

/// Element two stems transform into when they combine
pub fn stem_combination(a: Stem, b: Stem) -> Option<Element> {
    STEM_COMBINATIONS
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, element)| *element)
}

/// True when `attacker` (earlier pillar) strikes `target` (later pillar)
pub fn is_stem_conflict(attacker: Stem, target: Stem) -> bool {
    STEM_CONFLICTS.contains(&(attacker, target))
}

pub fn branch_combination(a: Branch, b: Branch) -> Option<Element> {
    BRANCH_COMBINATIONS
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, element)| *element)
}

pub fn is_branch_clash(a: Branch, b: Branch) -> bool {
    BRANCH_CLASHES
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}

// =============================================================================
// Findings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemCombination {
    pub positions: (PillarPosition, PillarPosition),
    pub stems: (Stem, Stem),
    pub transforms_to: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemConflict {
    pub positions: (PillarPosition, PillarPosition),
    pub attacker: Stem,
    pub target: Stem,
    /// Elements of (attacker, target)
    pub elements: (Element, Element),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCombination {
    pub positions: (PillarPosition, PillarPosition),
    pub branches: (Branch, Branch),
    pub transforms_to: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchClash {
    pub positions: (PillarPosition, PillarPosition),
    pub branches: (Branch, Branch),
}

/// All relations found among the four pillars
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFindings {
    pub stem_combinations: Vec<StemCombination>,
    pub stem_conflicts: Vec<StemConflict>,
    pub branch_combinations: Vec<BranchCombination>,
    pub branch_clashes: Vec<BranchClash>,
}

impl PatternFindings {
    pub fn is_empty(&self) -> bool {
        self.stem_combinations.is_empty()
            && self.stem_conflicts.is_empty()
            && self.branch_combinations.is_empty()
            && self.branch_clashes.is_empty()
    }

    pub fn count(&self) -> usize {
        self.stem_combinations.len()
            + self.stem_conflicts.len()
            + self.branch_combinations.len()
            + self.branch_clashes.len()
    }
}

/// Scan all six unordered pillar pairs
pub fn find_patterns(pillars: &FourPillars) -> PatternFindings {
    let entries = pillars.entries();
    let mut findings = PatternFindings::default();

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (pos_a, a) = entries[i];
            let (pos_b, b) = entries[j];
            let positions = (pos_a, pos_b);

            if let Some(element) = stem_combination(a.stem, b.stem) {
                findings.stem_combinations.push(StemCombination {
                    positions,
                    stems: (a.stem, b.stem),
                    transforms_to: element,
                });
            }
            if is_stem_conflict(a.stem, b.stem) {
                findings.stem_conflicts.push(StemConflict {
                    positions,
                    attacker: a.stem,
                    target: b.stem,
                    elements: (a.element, b.element),
                });
            }
            if let Some(element) = branch_combination(a.branch, b.branch) {
                findings.branch_combinations.push(BranchCombination {
                    positions,
                    branches: (a.branch, b.branch),
                    transforms_to: element,
                });
            }
            if is_branch_clash(a.branch, b.branch) {
                findings.branch_clashes.push(BranchClash {
                    positions,
                    branches: (a.branch, b.branch),
                });
            }
        }
    }

    findings
}

// =============================================================================
// Harmony tally
// =============================================================================

/// Combinations counted by the element they transform into.
///
/// Stem and branch combinations feed the same counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HarmonyTally {
    counts: BTreeMap<Element, usize>,
}

impl Default for HarmonyTally {
    fn default() -> Self {
        Self {
            counts: Element::ALL.into_iter().map(|e| (e, 0)).collect(),
        }
    }
}

impl HarmonyTally {
    pub fn from_findings(findings: &PatternFindings) -> Self {
        let mut tally = Self::default();
        let transforms = findings
            .stem_combinations
            .iter()
            .map(|hit| hit.transforms_to)
            .chain(findings.branch_combinations.iter().map(|hit| hit.transforms_to));
        for element in transforms {
            *tally.counts.entry(element).or_insert(0) += 1;
        }
        tally
    }

    pub fn count(&self, element: Element) -> usize {
        self.counts.get(&element).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Element with the most combinations; ties go to enumeration order.
    /// None when nothing combines.
    pub fn leading(&self) -> Option<Element> {
        let mut best: Option<(Element, usize)> = None;
        for element in Element::ALL {
            let count = self.count(element);
            if count > 0 && best.map_or(true, |(_, top)| count > top) {
                best = Some((element, count));
            }
        }
        best.map(|(element, _)| element)
    }

    /// Non-zero counters in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Element, usize)> + '_ {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(element, count)| (*element, *count))
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Dominant element plus pattern findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub dominant: Element,
    pub ranking: Vec<Element>,
    pub distribution: ElementDistribution,
    pub findings: PatternFindings,
    pub harmony: HarmonyTally,
    /// The pillars the findings were read from
    pub pillars: FourPillars,
}

/// Highest-weight element; ties go to the earlier element in enumeration order
pub fn dominant_element(distribution: &ElementDistribution) -> Element {
    distribution
        .ranking()
        .first()
        .copied()
        .unwrap_or(Element::Wood)
}

pub fn classify(distribution: &ElementDistribution, pillars: &FourPillars) -> Classification {
    let ranking = distribution.ranking();
    let dominant = ranking.first().copied().unwrap_or(Element::Wood);
    let findings = find_patterns(pillars);
    let harmony = HarmonyTally::from_findings(&findings);
    tracing::debug!(
        dominant = %dominant,
        patterns = findings.count(),
        harmonies = harmony.total(),
        "Classified pillars"
    );
    Classification {
        dominant,
        ranking,
        distribution: distribution.clone(),
        findings,
        harmony,
        pillars: *pillars,
    }
}
