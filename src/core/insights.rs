//! Derived figures: fortune, timing, longevity
//!
//! Everything here is a function of the pillars and the element
//! distribution. The per-element reference data lives in one static
//! [`ElementProfile`] table so the renderer's basic-info section and the
//! insight figures read from the same source.

use serde::{Deserialize, Serialize};

use super::aggregator::ElementDistribution;
use super::classifier::dominant_element;
use super::models::{Element, FourPillars, Stem};

/// Static reference data for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementProfile {
    pub element: Element,
    /// Display name, e.g. 목(木)
    pub name: &'static str,
    pub nature: &'static str,
    pub characteristics: &'static str,
    pub direction: &'static str,
    pub season: &'static str,
    pub color: &'static str,
    pub fortune_type: &'static str,
    pub fortune_season: &'static str,
    pub life_period: &'static str,
    pub time_of_day: &'static str,
    pub organs: [&'static str; 2],
    pub health_advice: &'static str,
}

const PROFILES: [ElementProfile; 5] = [
    ElementProfile {
        element: Element::Wood,
        name: "목(木)",
        nature: "봄의 기운",
        characteristics: "성장과 발전",
        direction: "동쪽",
        season: "봄",
        color: "청색/녹색",
        fortune_type: "창의적 재물",
        fortune_season: "봄철",
        life_period: "20-30대",
        time_of_day: "아침",
        organs: ["간", "담낭"],
        health_advice: "간과 담낭 건강에 특히 주의하세요. 스트레스 관리가 중요합니다.",
    },
    ElementProfile {
        element: Element::Fire,
        name: "화(火)",
        nature: "여름의 기운",
        characteristics: "열정과 확장",
        direction: "남쪽",
        season: "여름",
        color: "적색/주황색",
        fortune_type: "열정적 재물",
        fortune_season: "여름철",
        life_period: "30-40대",
        time_of_day: "낮",
        organs: ["심장", "소장"],
        health_advice: "심장과 소장 건강에 주의하세요. 과도한 열정을 조절하세요.",
    },
    ElementProfile {
        element: Element::Earth,
        name: "토(土)",
        nature: "중앙의 기운",
        characteristics: "안정과 조화",
        direction: "중앙",
        season: "사계절",
        color: "황색/갈색",
        fortune_type: "안정적 재물",
        fortune_season: "사계절",
        life_period: "40-50대",
        time_of_day: "하루종일",
        organs: ["위", "비장"],
        health_advice: "위와 비장 건강에 주의하세요. 규칙적인 식사가 중요합니다.",
    },
    ElementProfile {
        element: Element::Metal,
        name: "금(金)",
        nature: "가을의 기운",
        characteristics: "결실과 정의",
        direction: "서쪽",
        season: "가을",
        color: "백색/은색",
        fortune_type: "체계적 재물",
        fortune_season: "가을철",
        life_period: "50-60대",
        time_of_day: "저녁",
        organs: ["폐", "대장"],
        health_advice: "폐와 대장 건강에 주의하세요. 호흡 운동이 도움이 됩니다.",
    },
    ElementProfile {
        element: Element::Water,
        name: "수(水)",
        nature: "겨울의 기운",
        characteristics: "지혜와 통찰",
        direction: "북쪽",
        season: "겨울",
        color: "흑색/청색",
        fortune_type: "지적 재물",
        fortune_season: "겨울철",
        life_period: "60-70대",
        time_of_day: "밤",
        organs: ["신장", "방광"],
        health_advice: "신장과 방광 건강에 주의하세요. 충분한 수분 섭취가 중요합니다.",
    },
];

impl ElementProfile {
    pub fn of(element: Element) -> &'static ElementProfile {
        &PROFILES[element.index()]
    }

    fn of_stem(stem: Stem) -> &'static ElementProfile {
        Self::of(stem.element())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortuneInsight {
    /// e.g. 체계적 재물
    pub kind: String,
    /// Dominant share of the raw tally, 0-100
    pub strength: f64,
    /// Season keyed by the year stem
    pub season: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingInsight {
    /// Ten-year band keyed by the year stem
    pub major: String,
    /// Seasons keyed by the month and day stems
    pub minor: String,
    /// Time of day keyed by the hour stem
    pub daily: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongevityInsight {
    pub age: u32,
    /// 100 minus the weight spread
    pub balance: f64,
    pub health: String,
    pub organs: Vec<String>,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub fortune: FortuneInsight,
    pub timing: TimingInsight,
    pub longevity: LongevityInsight,
}

impl Insights {
    pub fn derive(pillars: &FourPillars, distribution: &ElementDistribution) -> Self {
        let dominant = dominant_element(distribution);
        Self {
            fortune: fortune(pillars, distribution, dominant),
            timing: timing(pillars),
            longevity: longevity(distribution, dominant),
        }
    }
}

fn fortune(pillars: &FourPillars, distribution: &ElementDistribution, dominant: Element) -> FortuneInsight {
    let (max, _) = distribution.weight_extremes();
    let sum = distribution.sum();
    let strength = if sum > 0.0 { max / sum * 100.0 } else { 0.0 };
    FortuneInsight {
        kind: ElementProfile::of(dominant).fortune_type.to_string(),
        strength,
        season: ElementProfile::of_stem(pillars.year.stem).fortune_season.to_string(),
    }
}

fn timing(pillars: &FourPillars) -> TimingInsight {
    TimingInsight {
        major: ElementProfile::of_stem(pillars.year.stem).life_period.to_string(),
        minor: format!(
            "{}, {}",
            ElementProfile::of_stem(pillars.month.stem).season,
            ElementProfile::of_stem(pillars.day.stem).season
        ),
        daily: ElementProfile::of_stem(pillars.hour.stem).time_of_day.to_string(),
    }
}

/// Spread of the rounded weights as a percentage of their sum.
///
/// Computed from the 2-decimal weights, not the raw tallies, so a share
/// sitting on a band edge lands where the displayed percentages put it.
pub fn spread(distribution: &ElementDistribution) -> f64 {
    let sum = distribution.sum();
    if sum <= 0.0 {
        return 0.0;
    }
    let (max, min) = distribution.weight_extremes();
    (max - min) / sum * 100.0
}

/// Base age 80 adjusted by how lopsided the tallies are
pub fn estimated_age(spread: f64) -> u32 {
    if spread > 70.0 {
        70
    } else if spread > 50.0 {
        75
    } else if spread < 20.0 {
        85
    } else {
        80
    }
}

fn longevity(distribution: &ElementDistribution, dominant: Element) -> LongevityInsight {
    let spread = spread(distribution);
    let balance = 100.0 - spread;
    let profile = ElementProfile::of(dominant);

    let suffix = if balance < 50.0 {
        "오행의 균형이 많이 깨져있어 전반적인 건강 관리가 필요합니다."
    } else if balance < 70.0 {
        "약간의 불균형이 있으니 건강에 더욱 신경 쓰세요."
    } else {
        "오행의 균형이 잘 잡혀있어 건강한 생활이 가능합니다."
    };

    LongevityInsight {
        age: estimated_age(spread),
        balance,
        health: if spread < 50.0 { "양호" } else { "주의 필요" }.to_string(),
        organs: profile.organs.iter().map(|o| o.to_string()).collect(),
        advice: format!("{} {}", profile.health_advice, suffix),
    }
}
