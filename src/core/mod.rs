//! Core module for saju
//!
//! The pure calculation pipeline. Nothing here performs network I/O; file
//! access is limited to config discovery, content loading and export.
//!
//! # Architecture
//!
//! - `models`: Closed symbol sets (Stem, Branch, Element), pillars, config
//! - `error`: Error types using thiserror
//! - `normalizer`: Form values -> validated BirthMoment
//! - `encoder`: BirthMoment -> FourPillars
//! - `aggregator`: FourPillars -> ElementDistribution
//! - `classifier`: Dominant element and stem/branch relations
//! - `insights`: Fortune, timing and longevity figures
//! - `life_stages`: Per-band fortunes from the year and day pillars
//! - `content`: Narrative content tables and their load state
//! - `renderer`: Classification -> Narrative sections
//! - `engine`: SajuEngine orchestration
//! - `serialization`: Text, Markdown and JSON writers

pub mod models;
pub mod error;
pub mod normalizer;
pub mod encoder;
pub mod aggregator;
pub mod classifier;
pub mod insights;
pub mod life_stages;
pub mod content;
pub mod renderer;
pub mod engine;
pub mod serialization;

// Re-export commonly used types
pub use models::{
    AggregationMode, Branch, CalendarType, Element, FourPillars, Gender, Pillar, PillarPosition,
    SajuConfig, Stem, YearLimits,
};
pub use error::{Result, ResultExt, SajuError};
pub use normalizer::{normalize, BirthMoment, HourInput};
pub use encoder::encode;
pub use aggregator::{aggregate, ElementDistribution};
pub use classifier::{classify, Classification, HarmonyTally, PatternFindings};
pub use insights::{ElementProfile, Insights};
pub use life_stages::{life_stage_fortunes, stage_fortune, LifeStage};
pub use content::{ContentSource, ContentState, ContentStore, ContentTable, EmbeddedSource, FileSource};
pub use renderer::{render, Narrative, Section};
pub use engine::{BirthForm, FormValue, Profile, Reading, SajuEngine};
pub use serialization::{export_filename, write_reading, OutputFormat, ReadingSerializer};
