//! Core data models for saju
//!
//! This module contains the closed symbol sets of the sexagenary calendar
//! (stems, branches, elements), the pillar value types built from them, and
//! the runtime configuration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::{Result, SajuError};

// =============================================================================
// Element
// =============================================================================

/// One of the five elements.
///
/// Declaration order is the fixed enumeration order used for tie-breaking:
/// wood, fire, earth, metal, water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// All elements in enumeration order
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// Position in the enumeration order (0-4)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Element at an enumeration index, wrapping modulo 5
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 5]
    }

    /// Hanja symbol (木, 火, 土, 金, 水)
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// Korean reading (목, 화, 토, 금, 수)
    pub fn korean(&self) -> &'static str {
        match self {
            Element::Wood => "목",
            Element::Fire => "화",
            Element::Earth => "토",
            Element::Metal => "금",
            Element::Water => "수",
        }
    }

    /// Lowercase English name, also used as a CSS-style class name
    pub fn english(&self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| s == e.symbol() || s == e.korean() || s.eq_ignore_ascii_case(e.english()))
            .ok_or_else(|| format!("unknown element '{}'", s))
    }
}

// =============================================================================
// Stem
// =============================================================================

/// One of the ten heavenly stems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stem {
    Gap,
    Eul,
    Byeong,
    Jeong,
    Mu,
    Gi,
    Gyeong,
    Sin,
    Im,
    Gye,
}

const STEM_SYMBOLS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const STEM_KOREAN: [&str; 10] = ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"];

impl Stem {
    /// All stems in cycle order
    pub const ALL: [Stem; 10] = [
        Stem::Gap,
        Stem::Eul,
        Stem::Byeong,
        Stem::Jeong,
        Stem::Mu,
        Stem::Gi,
        Stem::Gyeong,
        Stem::Sin,
        Stem::Im,
        Stem::Gye,
    ];

    /// Cycle position (0-9)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Stem at a cycle position; negative positions wrap
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(10) as usize]
    }

    /// Stems map pairwise onto the elements in cycle order
    pub fn element(&self) -> Element {
        Element::from_index(self.index() / 2)
    }

    pub fn symbol(&self) -> &'static str {
        STEM_SYMBOLS[self.index()]
    }

    pub fn korean(&self) -> &'static str {
        STEM_KOREAN[self.index()]
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Stem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|stem| s == stem.symbol() || s == stem.korean())
            .ok_or_else(|| format!("unknown stem '{}'", s))
    }
}

// =============================================================================
// Branch
// =============================================================================

/// One of the twelve earthly branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    Ja,
    Chuk,
    In,
    Myo,
    Jin,
    Sa,
    O,
    Mi,
    Sin,
    Yu,
    Sul,
    Hae,
}

const BRANCH_SYMBOLS: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const BRANCH_KOREAN: [&str; 12] = [
    "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
];

/// Traditional branch-element assignment. Irregular, so it is data.
const BRANCH_ELEMENTS: [Element; 12] = [
    Element::Water, // 子
    Element::Earth, // 丑
    Element::Wood,  // 寅
    Element::Wood,  // 卯
    Element::Earth, // 辰
    Element::Fire,  // 巳
    Element::Fire,  // 午
    Element::Earth, // 未
    Element::Metal, // 申
    Element::Metal, // 酉
    Element::Earth, // 戌
    Element::Water, // 亥
];

impl Branch {
    /// All branches in cycle order
    pub const ALL: [Branch; 12] = [
        Branch::Ja,
        Branch::Chuk,
        Branch::In,
        Branch::Myo,
        Branch::Jin,
        Branch::Sa,
        Branch::O,
        Branch::Mi,
        Branch::Sin,
        Branch::Yu,
        Branch::Sul,
        Branch::Hae,
    ];

    /// Cycle position (0-11)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Branch at a cycle position; negative positions wrap
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    pub fn element(&self) -> Element {
        BRANCH_ELEMENTS[self.index()]
    }

    pub fn symbol(&self) -> &'static str {
        BRANCH_SYMBOLS[self.index()]
    }

    pub fn korean(&self) -> &'static str {
        BRANCH_KOREAN[self.index()]
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Branch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|branch| s == branch.symbol() || s == branch.korean())
            .ok_or_else(|| format!("unknown branch '{}'", s))
    }
}

// Symbols travel as their hanja strings on the wire.

fn serialize_symbol<S: Serializer>(symbol: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(symbol)
}

fn deserialize_symbol<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_symbol(self.symbol(), serializer)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_symbol(deserializer)
    }
}

impl Serialize for Stem {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_symbol(self.symbol(), serializer)
    }
}

impl<'de> Deserialize<'de> for Stem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_symbol(deserializer)
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_symbol(self.symbol(), serializer)
    }
}

impl<'de> Deserialize<'de> for Branch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_symbol(deserializer)
    }
}

// =============================================================================
// Pillars
// =============================================================================

/// Which of the four pillars a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarPosition {
    Year,
    Month,
    Day,
    Hour,
}

impl PillarPosition {
    pub const ALL: [PillarPosition; 4] = [
        PillarPosition::Year,
        PillarPosition::Month,
        PillarPosition::Day,
        PillarPosition::Hour,
    ];

    /// Korean label (년주, 월주, 일주, 시주)
    pub fn label(&self) -> &'static str {
        match self {
            PillarPosition::Year => "년주",
            PillarPosition::Month => "월주",
            PillarPosition::Day => "일주",
            PillarPosition::Hour => "시주",
        }
    }
}

/// A (stem, branch, element) triple. The element always follows the stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PillarRepr")]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
    pub element: Element,
}

/// Wire form accepted when reading a pillar; any supplied element is ignored.
#[derive(Deserialize)]
struct PillarRepr {
    stem: Stem,
    branch: Branch,
}

impl From<PillarRepr> for Pillar {
    fn from(repr: PillarRepr) -> Self {
        Pillar::new(repr.stem, repr.branch)
    }
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self {
            stem,
            branch,
            element: stem.element(),
        }
    }

    /// Position in the 60-term sexagenary cycle (0 = 甲子).
    ///
    /// Only meaningful for pairs of equal parity, which is every pair the
    /// encoder produces.
    pub fn cycle_index(&self) -> usize {
        let stem = self.stem.index() as i64;
        let branch = self.branch.index() as i64;
        (6 * stem - 5 * branch).rem_euclid(60) as usize
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

/// The year, month, day and hour pillars of one birth moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
}

impl FourPillars {
    /// Get the pillar at a position
    pub fn get(&self, position: PillarPosition) -> Pillar {
        match position {
            PillarPosition::Year => self.year,
            PillarPosition::Month => self.month,
            PillarPosition::Day => self.day,
            PillarPosition::Hour => self.hour,
        }
    }

    /// Pillars in year, month, day, hour order
    pub fn entries(&self) -> [(PillarPosition, Pillar); 4] {
        PillarPosition::ALL.map(|position| (position, self.get(position)))
    }
}

impl fmt::Display for FourPillars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

// =============================================================================
// Form enums
// =============================================================================

/// Calendar the birth date was given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarType {
    #[default]
    Solar,
    Lunar,
}

impl CalendarType {
    pub fn from_lunar_flag(is_lunar: bool) -> Self {
        if is_lunar {
            CalendarType::Lunar
        } else {
            CalendarType::Solar
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "m", alias = "남", alias = "남성")]
    Male,
    #[serde(alias = "f", alias = "여", alias = "여성")]
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "남성",
            Gender::Female => "여성",
        }
    }
}

impl FromStr for Gender {
    type Err = SajuError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "남" | "남성" => Ok(Gender::Male),
            "female" | "f" | "여" | "여성" => Ok(Gender::Female),
            _ => Err(SajuError::InvalidGender {
                value: s.to_string(),
            }),
        }
    }
}

/// Which symbols contribute to the element distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Stems only, one point each
    StemsOnly,
    /// Stems at one point plus branches at half a point
    #[default]
    StemsAndBranches,
}

// =============================================================================
// Configuration
// =============================================================================

/// Earliest birth year any configuration may accept
pub const MIN_SUPPORTED_YEAR: i32 = 1900;

/// Default config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = ".saju_config.json";

/// Configuration loaded from .saju_config.json
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SajuConfig {
    /// Earliest accepted birth year
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Latest accepted birth year (None = unbounded)
    #[serde(default)]
    pub max_year: Option<i32>,
    /// Element aggregation mode
    #[serde(default)]
    pub aggregation: AggregationMode,
    /// Narrative content JSON (None = built-in content)
    #[serde(default)]
    pub content_path: Option<PathBuf>,
    /// Bind address for the HTTP backend
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
    /// Backend base URL for remote calculation
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Remote request timeout in seconds
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,
}

fn default_min_year() -> i32 {
    MIN_SUPPORTED_YEAR
}

fn default_server_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_remote_timeout() -> u64 {
    10
}

impl Default for SajuConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: None,
            aggregation: AggregationMode::default(),
            content_path: None,
            server_addr: default_server_addr(),
            remote_url: None,
            remote_timeout_secs: default_remote_timeout(),
        }
    }
}

impl SajuConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SajuConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load configuration.
    ///
    /// Order: explicit path, `./.saju_config.json`, `<config dir>/saju/config.json`,
    /// then defaults. An explicit path that fails to load is an error; the
    /// implicit locations fall back silently.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("saju").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                match Self::from_file(&candidate) {
                    Ok(config) => {
                        tracing::debug!(path = %candidate.display(), "Loaded config");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %candidate.display(), error = %e, "Ignoring unreadable config");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Apply SAJU_* environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("SAJU_CONTENT_PATH") {
            self.content_path = Some(PathBuf::from(path));
        }
        if let Ok(addr) = std::env::var("SAJU_SERVER_ADDR") {
            self.server_addr = addr;
        }
        if let Ok(url) = std::env::var("SAJU_REMOTE_URL") {
            self.remote_url = Some(url);
        }
        self
    }

    /// Check field consistency
    pub fn validate(&self) -> Result<()> {
        if self.min_year < MIN_SUPPORTED_YEAR {
            return Err(SajuError::invalid_config(format!(
                "min_year {} is before {}",
                self.min_year, MIN_SUPPORTED_YEAR
            )));
        }
        if let Some(max) = self.max_year {
            if max < self.min_year {
                return Err(SajuError::invalid_config(format!(
                    "max_year {} is before min_year {}",
                    max, self.min_year
                )));
            }
        }
        if self.remote_timeout_secs == 0 {
            return Err(SajuError::invalid_config("remote_timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Year bounds for the normalizer
    pub fn year_limits(&self) -> YearLimits {
        YearLimits {
            min: self.min_year,
            max: self.max_year,
        }
    }

    /// Builder pattern: set explicit maximum year
    pub fn with_max_year(mut self, max_year: i32) -> Self {
        self.max_year = Some(max_year);
        self
    }

    /// Builder pattern: set aggregation mode
    pub fn with_aggregation(mut self, mode: AggregationMode) -> Self {
        self.aggregation = mode;
        self
    }

    /// Builder pattern: set content path
    pub fn with_content_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_path = Some(path.into());
        self
    }
}

/// Accepted birth-year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearLimits {
    pub min: i32,
    pub max: Option<i32>,
}

impl Default for YearLimits {
    fn default() -> Self {
        Self {
            min: default_min_year(),
            max: None,
        }
    }
}

impl YearLimits {
    /// The stricter 1900..=2100 range
    pub fn strict() -> Self {
        Self {
            min: 1900,
            max: Some(2100),
        }
    }

    /// Lower bound actually enforced; never earlier than 1900
    pub fn effective_min(&self) -> i32 {
        self.min.max(MIN_SUPPORTED_YEAR)
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.effective_min() && self.max.map_or(true, |max| year <= max)
    }
}
