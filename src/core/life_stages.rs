//! Life-stage fortunes
//!
//! Each of the five age bands gets a sentence built from three pillar
//! symbols:
//! - the year stem picks the band-specific base sentence
//! - the year branch adds a trait sentence
//! - the day stem adds the closing influence clause
//!
//! The tables are built in, so these sections never wait on the content
//! table.

use serde::{Deserialize, Serialize};

use super::models::{Branch, FourPillars, Stem};
use super::renderer::Section;

/// Age bands, youngest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Early,
    Youth,
    Middle,
    Mature,
    Elder,
}

impl LifeStage {
    pub const ALL: [LifeStage; 5] = [
        LifeStage::Early,
        LifeStage::Youth,
        LifeStage::Middle,
        LifeStage::Mature,
        LifeStage::Elder,
    ];

    pub fn section(&self) -> Section {
        match self {
            LifeStage::Early => Section::EarlyLife,
            LifeStage::Youth => Section::YouthLife,
            LifeStage::Middle => Section::MiddleLife,
            LifeStage::Mature => Section::MatureLife,
            LifeStage::Elder => Section::ElderLife,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Year stem -> sentence per band (early, youth, middle, mature, elder)
const STEM_STAGES: [[&str; 5]; 10] = [
    // 甲
    [
        "창의력과 학습능력이 뛰어나며, 예술적 재능이 일찍 발현됩니다.",
        "독창적인 아이디어로 주목받으며, 새로운 도전에서 성공합니다.",
        "창의적 리더십이 빛을 발하며, 사업적 성과를 이룹니다.",
        "경험을 바탕으로 한 혁신으로 큰 성과를 이룹니다.",
        "지혜로운 조언자로서 후배들에게 영감을 줍니다.",
    ],
    // 乙
    [
        "섬세한 감성과 예술적 감각이 돋보입니다.",
        "유연한 사고로 다양한 기회를 포착합니다.",
        "안정적인 성장과 함께 창의적 성과를 이룹니다.",
        "균형 잡힌 판단으로 성공적인 결실을 맺습니다.",
        "풍부한 경험을 바탕으로 후학을 양성합니다.",
    ],
    // 丙
    [
        "활발한 성격으로 리더십이 일찍 발현됩니다.",
        "열정적인 도전정신으로 목표를 달성합니다.",
        "강력한 추진력으로 큰 성과를 이룹니다.",
        "카리스마 있는 리더로서 조직을 이끕니다.",
        "존경받는 원로로서 영향력을 발휘합니다.",
    ],
    // 丁
    [
        "따뜻한 마음과 친화력이 돋보입니다.",
        "사교성과 리더십으로 주목받습니다.",
        "감성적 리더십으로 조직을 화합시킵니다.",
        "원숙한 통찰력으로 성과를 이룹니다.",
        "따뜻한 조언자로서 후배들을 이끕니다.",
    ],
    // 戊
    [
        "안정적인 성장과 학습능력을 보입니다.",
        "신중한 판단력으로 기회를 포착합니다.",
        "견실한 성과와 안정적 성장을 이룹니다.",
        "믿음직한 리더로서 조직을 이끕니다.",
        "신뢰받는 조언자로서 역할을 합니다.",
    ],
    // 己
    [
        "차분한 성격과 높은 집중력을 보입니다.",
        "꾸준한 노력으로 성과를 이룹니다.",
        "안정적인 성장과 발전을 이룹니다.",
        "신중한 판단으로 성공을 이끕니다.",
        "지혜로운 조언으로 후배를 이끕니다.",
    ],
    // 庚
    [
        "정확한 판단력과 분석력이 돋보입니다.",
        "체계적인 접근으로 목표를 달성합니다.",
        "전문성을 바탕으로 성과를 이룹니다.",
        "정확한 통찰력으로 조직을 이끕니다.",
        "전문적 지식으로 후학을 양성합니다.",
    ],
    // 辛
    [
        "예리한 직관력과 분석력을 보입니다.",
        "전문성을 바탕으로 성장합니다.",
        "혁신적 접근으로 성과를 이룹니다.",
        "탁월한 판단력으로 성공을 이끕니다.",
        "날카로운 통찰력으로 조언합니다.",
    ],
    // 壬
    [
        "뛰어난 지적 능력과 창의성을 보입니다.",
        "혁신적 사고로 기회를 창출합니다.",
        "독창적 접근으로 성과를 이룹니다.",
        "지혜로운 판단으로 조직을 이끕니다.",
        "깊은 통찰력으로 후배를 지도합니다.",
    ],
    // 癸
    [
        "깊이 있는 사고력과 학습능력을 보입니다.",
        "지적 탐구로 성장을 이룹니다.",
        "심도 있는 전문성으로 인정받습니다.",
        "깊은 지혜로 성공을 이끕니다.",
        "풍부한 지혜로 후학을 양성합니다.",
    ],
];

/// Year branch -> trait sentence, 子 through 亥
const BRANCH_TRAITS: [&str; 12] = [
    "지적 성장과 학문적 성취가 두드러집니다.",
    "안정적인 성장과 꾸준한 발전이 예상됩니다.",
    "도전정신과 진취적 기상이 빛을 발합니다.",
    "창의력과 예술적 재능이 개화합니다.",
    "전략적 사고와 리더십이 발휘됩니다.",
    "통찰력과 결단력이 돋보입니다.",
    "열정적 추진력과 카리스마가 빛납니다.",
    "조화로운 인간관계와 협력이 중요합니다.",
    "논리적 사고와 실행력이 강점입니다.",
    "정확한 판단력과 세심함이 빛납니다.",
    "책임감과 신뢰성이 인정받습니다.",
    "창의적 사고와 혁신성이 두각을 나타냅니다.",
];

/// Day stem -> influence clause, 甲 through 癸
const DAY_INFLUENCES: [&str; 10] = [
    "창의적 재능이 더해져",
    "섬세한 감각이 더해져",
    "적극적 추진력이 더해져",
    "따뜻한 리더십이 더해져",
    "안정적 기반이 더해져",
    "신중한 판단력이 더해져",
    "체계적 능력이 더해져",
    "예리한 통찰력이 더해져",
    "혁신적 사고가 더해져",
    "지혜로운 판단이 더해져",
];

// =============================================================================
// Composition
// =============================================================================

/// Fortune sentence for one band from explicit symbols
pub fn stage_fortune(
    year_stem: Stem,
    year_branch: Branch,
    day_stem: Stem,
    stage: LifeStage,
) -> String {
    format!(
        "{} {} {} 더욱 빛을 발합니다.",
        STEM_STAGES[year_stem.index()][stage.index()],
        BRANCH_TRAITS[year_branch.index()],
        DAY_INFLUENCES[day_stem.index()]
    )
}

/// All five bands for a set of pillars, youngest first
pub fn life_stage_fortunes(pillars: &FourPillars) -> [(LifeStage, String); 5] {
    LifeStage::ALL.map(|stage| {
        (
            stage,
            stage_fortune(pillars.year.stem, pillars.year.branch, pillars.day.stem, stage),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Pillar;

    fn golden() -> FourPillars {
        FourPillars {
            year: Pillar::new(Stem::Gyeong, Branch::O),
            month: Pillar::new(Stem::Gyeong, Branch::O),
            day: Pillar::new(Stem::Eul, Branch::Sa),
            hour: Pillar::new(Stem::Sin, Branch::Mi),
        }
    }

    #[test]
    fn test_golden_early_stage() {
        assert_eq!(
            stage_fortune(Stem::Gyeong, Branch::O, Stem::Eul, LifeStage::Early),
            "정확한 판단력과 분석력이 돋보입니다. 열정적 추진력과 카리스마가 빛납니다. \
             섬세한 감각이 더해져 더욱 빛을 발합니다."
        );
    }

    #[test]
    fn test_only_year_and_day_pillars_matter() {
        let mut other = golden();
        other.month = Pillar::new(Stem::Gap, Branch::Ja);
        other.hour = Pillar::new(Stem::Gye, Branch::Hae);
        assert_eq!(life_stage_fortunes(&golden()), life_stage_fortunes(&other));

        other.day = Pillar::new(Stem::Im, Branch::Ja);
        let (_, elder) = &life_stage_fortunes(&other)[4];
        assert!(elder.starts_with("전문적 지식으로 후학을 양성합니다."));
        assert!(elder.contains("혁신적 사고가 더해져"));
    }

    #[test]
    fn test_stages_in_band_order() {
        let fortunes = life_stage_fortunes(&golden());
        let stages: Vec<LifeStage> = fortunes.iter().map(|(stage, _)| *stage).collect();
        assert_eq!(stages, LifeStage::ALL.to_vec());
        assert!(fortunes[2].1.starts_with("전문성을 바탕으로 성과를 이룹니다."));
    }

    #[test]
    fn test_stage_sections() {
        let sections: Vec<Section> = LifeStage::ALL.iter().map(LifeStage::section).collect();
        assert_eq!(
            sections,
            vec![
                Section::EarlyLife,
                Section::YouthLife,
                Section::MiddleLife,
                Section::MatureLife,
                Section::ElderLife,
            ]
        );
    }
}
