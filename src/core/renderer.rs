//! Narrative renderer
//!
//! Turns a [`Classification`] into named text sections. Content-backed
//! sections read the element's entry from the content table; when the
//! table is not ready they carry a placeholder instead, so rendering
//! itself cannot fail. Life-stage sections are composed from the pillars
//! and only pick up an extra content line when the table is ready.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::classifier::{Classification, HarmonyTally, PatternFindings};
use super::content::{ContentState, ElementContent, Fragment, LifeStages};
use super::insights::{ElementProfile, Insights};
use super::life_stages::{life_stage_fortunes, LifeStage};
use super::models::Element;

/// Shown while the content table is uninitialized or loading
pub const LOADING_PLACEHOLDER: &str = "패턴 데이터를 불러오는 중입니다...";
/// Shown when the content table failed to load
pub const FAILED_PLACEHOLDER: &str = "패턴 데이터를 불러오지 못했습니다. 잠시 후 다시 시도해 주세요.";

/// Narrative sections in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    BasicInfo,
    Personality,
    Career,
    Health,
    Relationships,
    Wealth,
    Luck,
    Advice,
    EarlyLife,
    YouthLife,
    MiddleLife,
    MatureLife,
    ElderLife,
    Patterns,
    Fortune,
    Timing,
    Longevity,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::BasicInfo => "기본 정보",
            Section::Personality => "성격",
            Section::Career => "직업운",
            Section::Health => "건강운",
            Section::Relationships => "대인관계",
            Section::Wealth => "재물운",
            Section::Luck => "행운",
            Section::Advice => "조언",
            Section::EarlyLife => "초년운 (0~15세)",
            Section::YouthLife => "청년운 (16~30세)",
            Section::MiddleLife => "중년운 (31~45세)",
            Section::MatureLife => "장년운 (46~60세)",
            Section::ElderLife => "노년운 (61세 이후)",
            Section::Patterns => "천간·지지 관계",
            Section::Fortune => "천복",
            Section::Timing => "천시",
            Section::Longevity => "천수",
        }
    }
}

/// Rendered text keyed by section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Narrative {
    sections: BTreeMap<Section, String>,
}

impl Narrative {
    pub fn get(&self, section: Section) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    pub fn insert(&mut self, section: Section, text: impl Into<String>) {
        self.sections.insert(section, text.into());
    }

    /// Sections in display order
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.sections.iter().map(|(s, t)| (*s, t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Append the fortune, timing and longevity sections
    pub fn with_insights(mut self, insights: &Insights) -> Self {
        self.insert(
            Section::Fortune,
            format!(
                "유형: {}\n강도: {:.1}%\n시기: {}",
                insights.fortune.kind, insights.fortune.strength, insights.fortune.season
            ),
        );
        self.insert(
            Section::Timing,
            format!(
                "주요 시기: {}\n부가 시기: {}\n일일 시기: {}",
                insights.timing.major, insights.timing.minor, insights.timing.daily
            ),
        );
        self.insert(
            Section::Longevity,
            format!(
                "예상 수명: {}세\n오행 균형도: {:.1}\n건강 상태: {}\n주의 장기: {}\n{}",
                insights.longevity.age,
                insights.longevity.balance,
                insights.longevity.health,
                insights.longevity.organs.join(", "),
                insights.longevity.advice
            ),
        );
        self
    }
}

/// Render every section for a classification
pub fn render(classification: &Classification, content: &ContentState) -> Narrative {
    let dominant = classification.dominant;
    let mut narrative = Narrative::default();

    narrative.insert(Section::BasicInfo, basic_info(dominant));

    let entry = content.table().and_then(|table| table.get(dominant));
    let placeholder = match content {
        ContentState::Failed(_) => FAILED_PLACEHOLDER,
        _ => LOADING_PLACEHOLDER,
    };
    let stage_extras = entry.map(|entry| &entry.life_stages);
    for (stage, fortune) in life_stage_fortunes(&classification.pillars) {
        let text = match stage_extras.map(|stages| stage_extra(stages, stage)) {
            Some(extra) if !extra.is_empty() => format!("{}\n{}", fortune, extra),
            _ => fortune,
        };
        narrative.insert(stage.section(), text);
    }

    match entry {
        Some(entry) => render_content(&mut narrative, entry),
        None => {
            if content.is_ready() {
                tracing::warn!(element = %dominant, "Content table has no entry for element");
            }
            for section in content_sections() {
                narrative.insert(section, placeholder);
            }
        }
    }

    let mut patterns = pattern_summary(&classification.findings);
    if let Some(line) = harmony_summary(&classification.harmony) {
        patterns.push('\n');
        patterns.push_str(&line);
    }
    narrative.insert(Section::Patterns, patterns);
    tracing::debug!(
        dominant = %dominant,
        content = content.label(),
        sections = narrative.len(),
        "Rendered narrative"
    );
    narrative
}

fn content_sections() -> impl Iterator<Item = Section> {
    [
        Section::Personality,
        Section::Career,
        Section::Health,
        Section::Relationships,
        Section::Wealth,
        Section::Luck,
        Section::Advice,
    ]
    .into_iter()
}

fn render_content(narrative: &mut Narrative, entry: &ElementContent) {
    narrative.insert(Section::Personality, fragment_text(&entry.personality, "적합한 분야"));
    narrative.insert(Section::Career, fragment_text(&entry.career, "적합한 직업군"));
    narrative.insert(Section::Health, fragment_text(&entry.health, "추천"));
    narrative.insert(Section::Relationships, fragment_text(&entry.relationships, "어울리는 상대"));
    narrative.insert(Section::Wealth, fragment_text(&entry.wealth, "유망 분야"));
    narrative.insert(Section::Luck, fragment_text(&entry.luck, "행운의 색과 숫자"));
    narrative.insert(Section::Advice, fragment_text(&entry.advice, "참고"));
}

fn stage_extra(stages: &LifeStages, stage: LifeStage) -> &str {
    match stage {
        LifeStage::Early => &stages.early,
        LifeStage::Youth => &stages.youth,
        LifeStage::Middle => &stages.middle,
        LifeStage::Mature => &stages.mature,
        LifeStage::Elder => &stages.elder,
    }
}

fn fragment_text(fragment: &Fragment, suitable_label: &str) -> String {
    let mut lines = vec![fragment.core.clone()];
    if let Some(strength) = &fragment.strength {
        lines.push(format!("강점: {}", strength));
    }
    if let Some(weakness) = &fragment.weakness {
        lines.push(format!("약점: {}", weakness));
    }
    if !fragment.suitable.is_empty() {
        lines.push(format!("{}: {}", suitable_label, fragment.suitable.join(", ")));
    }
    if let Some(advice) = &fragment.advice {
        lines.push(format!("조언: {}", advice));
    }
    lines.join("\n")
}

/// Basic-info paragraph from the built-in element profile
pub fn basic_info(element: Element) -> String {
    let info = ElementProfile::of(element);
    format!(
        "당신의 사주는 {}가 가장 강한 형상입니다.\n\
         {}이 두드러지며, {}의 기운이 강합니다.\n\
         방위로는 {}이 길방이며, {}에 기운이 가장 왕성합니다.\n\
         {}계열이 당신의 행운의 색이 됩니다.",
        info.name, info.nature, info.characteristics, info.direction, info.season, info.color
    )
}

/// Combination counts per element, or `None` when nothing combined
pub fn harmony_summary(harmony: &HarmonyTally) -> Option<String> {
    let leading = harmony.leading()?;
    let counts: Vec<String> = harmony
        .iter()
        .map(|(element, count)| format!("{}합 {}", element.korean(), count))
        .collect();
    Some(format!("합 기운: {} (중심: {})", counts.join(" · "), leading))
}

/// One line per pattern hit
pub fn pattern_summary(findings: &PatternFindings) -> String {
    if findings.is_empty() {
        return "특별한 합충 관계가 없습니다.".to_string();
    }

    let mut lines = Vec::with_capacity(findings.count());
    for hit in &findings.stem_combinations {
        lines.push(format!(
            "천간합: {}{} ({}·{}) → {}",
            hit.stems.0,
            hit.stems.1,
            hit.positions.0.label(),
            hit.positions.1.label(),
            hit.transforms_to
        ));
    }
    for hit in &findings.stem_conflicts {
        lines.push(format!(
            "천간충: {}{} ({}·{}) {}{}충",
            hit.attacker,
            hit.target,
            hit.positions.0.label(),
            hit.positions.1.label(),
            hit.elements.0.korean(),
            hit.elements.1.korean()
        ));
    }
    for hit in &findings.branch_combinations {
        lines.push(format!(
            "지지합: {}{} ({}·{}) → {}",
            hit.branches.0,
            hit.branches.1,
            hit.positions.0.label(),
            hit.positions.1.label(),
            hit.transforms_to
        ));
    }
    for hit in &findings.branch_clashes {
        lines.push(format!(
            "지지충: {}{} ({}·{})",
            hit.branches.0,
            hit.branches.1,
            hit.positions.0.label(),
            hit.positions.1.label()
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::aggregate;
    use crate::core::classifier::classify;
    use crate::core::content::ContentStore;
    use crate::core::models::{AggregationMode, Branch, FourPillars, Pillar, Stem};

    fn golden_classification() -> Classification {
        let pillars = FourPillars {
            year: Pillar::new(Stem::Gyeong, Branch::O),
            month: Pillar::new(Stem::Gyeong, Branch::O),
            day: Pillar::new(Stem::Eul, Branch::Sa),
            hour: Pillar::new(Stem::Sin, Branch::Mi),
        };
        let dist = aggregate(&pillars, AggregationMode::StemsAndBranches);
        classify(&dist, &pillars)
    }

    #[test]
    fn test_ready_content_renders_all_sections() {
        let store = ContentStore::embedded().unwrap();
        let narrative = render(&golden_classification(), store.state());
        assert_eq!(narrative.len(), 14);
        let early = narrative.get(Section::EarlyLife).unwrap();
        assert!(early.starts_with("정확한 판단력과 분석력이 돋보입니다."));
        assert!(early.lines().count() >= 2);
        assert!(narrative
            .get(Section::Personality)
            .unwrap()
            .contains("결실과 정의"));
        assert!(narrative.get(Section::Career).unwrap().contains("금융"));
        assert!(narrative
            .iter()
            .all(|(_, text)| text != LOADING_PLACEHOLDER));
    }

    #[test]
    fn test_loading_renders_placeholder() {
        let narrative = render(&golden_classification(), &ContentState::Loading);
        assert_eq!(narrative.get(Section::Personality), Some(LOADING_PLACEHOLDER));
        // Basic info, life stages and patterns never depend on content
        assert_eq!(
            narrative.get(Section::EarlyLife),
            Some(
                "정확한 판단력과 분석력이 돋보입니다. 열정적 추진력과 카리스마가 빛납니다. \
                 섬세한 감각이 더해져 더욱 빛을 발합니다."
            )
        );
        assert!(narrative
            .get(Section::ElderLife)
            .unwrap()
            .starts_with("전문적 지식으로 후학을 양성합니다."));
        assert!(narrative.get(Section::BasicInfo).unwrap().contains("금(金)"));
        assert!(narrative.get(Section::Patterns).unwrap().contains("천간합"));
    }

    #[test]
    fn test_uninitialized_renders_loading_placeholder() {
        let narrative = render(&golden_classification(), &ContentState::Uninitialized);
        assert_eq!(narrative.get(Section::Career), Some(LOADING_PLACEHOLDER));
    }

    #[test]
    fn test_failed_renders_failure_placeholder() {
        let state = ContentState::Failed("timeout".to_string());
        let narrative = render(&golden_classification(), &state);
        assert_eq!(narrative.get(Section::Wealth), Some(FAILED_PLACEHOLDER));
    }

    #[test]
    fn test_pattern_summary_lines() {
        let summary = pattern_summary(&golden_classification().findings);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "천간합: 庚乙 (년주·일주) → 金");
        assert_eq!(lines[2], "천간충: 乙辛 (일주·시주) 목금충");
        assert_eq!(lines[3], "지지합: 午未 (년주·시주) → 火");
    }

    #[test]
    fn test_empty_findings_summary() {
        assert_eq!(
            pattern_summary(&PatternFindings::default()),
            "특별한 합충 관계가 없습니다."
        );
    }

    #[test]
    fn test_harmony_line_follows_pattern_hits() {
        let narrative = render(&golden_classification(), &ContentState::Loading);
        let patterns = narrative.get(Section::Patterns).unwrap();
        assert_eq!(
            patterns.lines().last(),
            Some("합 기운: 화합 2 · 금합 2 (중심: 火)")
        );
    }

    #[test]
    fn test_no_harmony_line_without_combinations() {
        assert_eq!(harmony_summary(&HarmonyTally::default()), None);
    }

    #[test]
    fn test_narrative_json_keys() {
        let narrative = render(&golden_classification(), &ContentState::Loading);
        let json = serde_json::to_value(&narrative).unwrap();
        assert!(json.get("basic_info").is_some());
        assert!(json.get("early_life").is_some());
    }
}
