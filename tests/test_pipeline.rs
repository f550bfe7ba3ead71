//! End-to-end pipeline tests
//!
//! Known birth moments through normalize -> encode -> aggregate -> classify
//! -> render, checked against hand-computed pillars.

use saju::{
    aggregate, classify, encode, normalize, AggregationMode, BirthForm, Branch, CalendarType,
    ContentState, ContentStore, Element, HourInput, PillarPosition, SajuConfig, SajuEngine,
    SajuError, Section, Stem, YearLimits,
};

fn engine() -> SajuEngine {
    SajuEngine::new(SajuConfig::default(), ContentStore::embedded().unwrap())
}

fn pillars_of(year: i32, month: u32, day: u32, hour: u8) -> saju::FourPillars {
    let moment = normalize(
        year,
        month,
        day,
        &HourInput::from(hour),
        CalendarType::Solar,
        YearLimits::default(),
    )
    .unwrap();
    encode(&moment)
}

#[test]
fn test_golden_reading() {
    let reading = engine()
        .calculate(&BirthForm::new(1990, 5, 15, 14u8).with_name("홍길동"))
        .unwrap();

    assert_eq!(reading.pillars.year.to_string(), "庚午");
    assert_eq!(reading.pillars.month.to_string(), "庚午");
    assert_eq!(reading.pillars.day.to_string(), "乙巳");
    assert_eq!(reading.pillars.hour.to_string(), "辛未");

    let dist = &reading.classification.distribution;
    assert_eq!(dist.weight(Element::Metal), 0.5);
    assert_eq!(dist.weight(Element::Fire), 0.25);
    assert_eq!(reading.classification.dominant, Element::Metal);

    let findings = &reading.classification.findings;
    assert_eq!(findings.stem_combinations.len(), 2);
    assert_eq!(findings.stem_conflicts.len(), 1);
    assert_eq!(findings.branch_combinations.len(), 2);
    assert!(findings.branch_clashes.is_empty());

    assert_eq!(reading.insights.fortune.kind, "체계적 재물");
    assert!(reading
        .narrative
        .get(Section::BasicInfo)
        .unwrap()
        .contains("서쪽"));
}

#[test]
fn test_epoch_and_neighbours() {
    assert_eq!(pillars_of(1900, 1, 1, 0).day.to_string(), "己亥");
    assert_eq!(pillars_of(1900, 1, 2, 0).day.to_string(), "庚子");
    assert_eq!(pillars_of(1900, 1, 11, 0).day.to_string(), "己酉");
}

#[test]
fn test_year_1900_pillar() {
    let pillars = pillars_of(1900, 6, 1, 12);
    assert_eq!(pillars.year.stem, Stem::Gyeong);
    assert_eq!(pillars.year.branch, Branch::Ja);
}

#[test]
fn test_midnight_block_shared_by_23_and_0() {
    let late = pillars_of(2000, 1, 1, 23);
    let early = pillars_of(2000, 1, 1, 0);
    assert_eq!(late.hour, early.hour);
    assert_ne!(pillars_of(2000, 1, 1, 22).hour, late.hour);
}

#[test]
fn test_traditional_hour_matches_clock_hour() {
    let engine = engine();
    let named = engine
        .pillars_for(&BirthForm::new(1990, 5, 15, "未時"))
        .unwrap();
    let clock = engine.pillars_for(&BirthForm::new(1990, 5, 15, 14u8)).unwrap();
    assert_eq!(named, clock);
}

#[test]
fn test_validation_errors_abort() {
    let engine = engine();
    let cases = [
        BirthForm::new(2023, 2, 29, 0u8),
        BirthForm::new(1899, 12, 31, 0u8),
        BirthForm::new(2000, 1, 1, 24u8),
        BirthForm::new(2000, 1, 1, "abc"),
    ];
    for form in &cases {
        let err = engine.calculate(form).unwrap_err();
        assert!(err.is_validation(), "{} should be a validation error", err);
    }
}

#[test]
fn test_lunar_flag_is_carried_not_converted() {
    let engine = engine();
    let solar = engine.calculate(&BirthForm::new(1990, 5, 15, 14u8)).unwrap();
    let lunar = engine
        .calculate(&BirthForm::new(1990, 5, 15, 14u8).with_lunar(true))
        .unwrap();
    assert!(lunar.moment.is_lunar());
    assert_eq!(solar.pillars, lunar.pillars);
}

#[test]
fn test_render_while_loading() {
    let pillars = pillars_of(1990, 5, 15, 14);
    let dist = aggregate(&pillars, AggregationMode::StemsAndBranches);
    let classification = classify(&dist, &pillars);
    let narrative = saju::render(&classification, &ContentState::Loading);
    assert_eq!(
        narrative.get(Section::Career),
        Some(saju::renderer::LOADING_PLACEHOLDER)
    );
}

#[test]
fn test_require_content_when_not_loaded() {
    let store = ContentStore::new();
    assert!(matches!(store.require(), Err(SajuError::MissingContent { .. })));
}

#[test]
fn test_stem_conflict_positions() {
    let pillars = pillars_of(1990, 5, 15, 14);
    let dist = aggregate(&pillars, AggregationMode::StemsAndBranches);
    let conflict = &classify(&dist, &pillars).findings.stem_conflicts[0];
    assert_eq!(conflict.positions, (PillarPosition::Day, PillarPosition::Hour));
}
