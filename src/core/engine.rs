//! SajuEngine - the orchestrator
//!
//! Chains normalizer -> encoder -> aggregator -> classifier -> renderer with
//! explicit arguments. The engine holds only the configuration and the
//! content store; every submission is computed from scratch.

use serde::{Deserialize, Serialize};

use super::aggregator::aggregate;
use super::classifier::{classify, Classification};
use super::content::{ContentSource, ContentStore, EmbeddedSource, FileSource};
use super::encoder::encode;
use super::error::{Result, SajuError};
use super::insights::Insights;
use super::models::{CalendarType, FourPillars, Gender, SajuConfig};
use super::normalizer::{normalize, parse_field, BirthMoment, HourInput};
use super::renderer::{render, Narrative};

/// A numeric form field as submitted: JSON number or text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(i64),
    Text(String),
}

impl FormValue {
    fn parse<T>(field: &'static str, value: Option<&FormValue>) -> Result<T>
    where
        T: std::str::FromStr + TryFrom<i64>,
    {
        match value {
            None => Err(SajuError::MissingField { field }),
            Some(FormValue::Number(n)) => T::try_from(*n).map_err(|_| SajuError::InvalidNumber {
                field,
                value: n.to_string(),
            }),
            Some(FormValue::Text(text)) => parse_field(field, text),
        }
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        FormValue::Number(n)
    }
}

/// Birth details as submitted by a form or API client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<FormValue>,
    #[serde(default)]
    pub birth_month: Option<FormValue>,
    #[serde(default)]
    pub birth_day: Option<FormValue>,
    #[serde(default)]
    pub birth_hour: Option<HourInput>,
    #[serde(default)]
    pub is_lunar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl BirthForm {
    /// Form with numeric date fields
    pub fn new(year: i32, month: u32, day: u32, hour: impl Into<HourInput>) -> Self {
        Self {
            birth_year: Some(FormValue::Number(year as i64)),
            birth_month: Some(FormValue::Number(month as i64)),
            birth_day: Some(FormValue::Number(day as i64)),
            birth_hour: Some(hour.into()),
            ..Self::default()
        }
    }

    /// Builder pattern: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder pattern: mark the date as lunar
    pub fn with_lunar(mut self, is_lunar: bool) -> Self {
        self.is_lunar = is_lunar;
        self
    }

    /// Builder pattern: set gender text
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Builder pattern: set location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn parsed_gender(&self) -> Result<Option<Gender>> {
        match self.gender.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some),
        }
    }
}

/// Who the reading is for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub gender: Option<Gender>,
    pub location: Option<String>,
}

/// Everything computed for one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub profile: Profile,
    pub moment: BirthMoment,
    pub pillars: FourPillars,
    pub classification: Classification,
    pub insights: Insights,
    pub narrative: Narrative,
}

/// The calculation pipeline plus its configuration and content.
#[derive(Debug, Clone, Default)]
pub struct SajuEngine {
    config: SajuConfig,
    content: ContentStore,
}

impl SajuEngine {
    /// Create an engine with an explicit content store
    pub fn new(config: SajuConfig, content: ContentStore) -> Self {
        Self { config, content }
    }

    /// Create an engine and load content from the configured source.
    ///
    /// A failed load leaves the store `Failed`; narrative sections then render
    /// the failure placeholder.
    pub fn from_config(config: SajuConfig) -> Self {
        let mut content = ContentStore::new();
        let source: Box<dyn ContentSource> = match &config.content_path {
            Some(path) => Box::new(FileSource::new(path)),
            None => Box::new(EmbeddedSource),
        };
        // Failure is recorded in the store state
        let _ = content.load_from(source.as_ref());
        Self::new(config, content)
    }

    pub fn config(&self) -> &SajuConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ContentStore {
        &mut self.content
    }

    /// Validate a form into a birth moment
    pub fn moment_for(&self, form: &BirthForm) -> Result<BirthMoment> {
        let year: i32 = FormValue::parse("birthYear", form.birth_year.as_ref())?;
        let month: u32 = FormValue::parse("birthMonth", form.birth_month.as_ref())?;
        let day: u32 = FormValue::parse("birthDay", form.birth_day.as_ref())?;
        let hour = form
            .birth_hour
            .as_ref()
            .ok_or(SajuError::MissingField { field: "birthHour" })?;
        normalize(
            year,
            month,
            day,
            hour,
            CalendarType::from_lunar_flag(form.is_lunar),
            self.config.year_limits(),
        )
    }

    /// Validate and encode, without classification or narrative
    pub fn pillars_for(&self, form: &BirthForm) -> Result<FourPillars> {
        Ok(encode(&self.moment_for(form)?))
    }

    pub fn classify(&self, pillars: &FourPillars) -> Classification {
        let distribution = aggregate(pillars, self.config.aggregation);
        classify(&distribution, pillars)
    }

    /// Narrative sections for already-encoded pillars
    pub fn analyze(&self, pillars: &FourPillars) -> Narrative {
        let classification = self.classify(pillars);
        let insights = Insights::derive(pillars, &classification.distribution);
        render(&classification, self.content.state()).with_insights(&insights)
    }

    /// Full pipeline for one submission
    pub fn calculate(&self, form: &BirthForm) -> Result<Reading> {
        let gender = form.parsed_gender()?;
        let moment = self.moment_for(form)?;
        let pillars = encode(&moment);
        let classification = self.classify(&pillars);
        let insights = Insights::derive(&pillars, &classification.distribution);
        let narrative = render(&classification, self.content.state()).with_insights(&insights);

        tracing::info!(
            name = %form.name,
            pillars = %pillars,
            dominant = %classification.dominant,
            "Calculated reading"
        );

        Ok(Reading {
            profile: Profile {
                name: form.name.trim().to_string(),
                gender,
                location: form
                    .location
                    .as_deref()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
            },
            moment,
            pillars,
            classification,
            insights,
            narrative,
        })
    }
}
