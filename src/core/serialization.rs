//! Serialization module for saju
//!
//! Output writers for a [`Reading`]:
//! - Text (default, terminal)
//! - Markdown
//! - JSON (the full reading, machine readable)

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::engine::Reading;
use super::error::Result;
use super::models::Element;

/// Output format for a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }

    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Some(OutputFormat::Text),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn serializer(&self) -> Box<dyn ReadingSerializer> {
        match self {
            OutputFormat::Text => Box::new(TextSerializer),
            OutputFormat::Markdown => Box::new(MarkdownSerializer),
            OutputFormat::Json => Box::new(JsonSerializer),
        }
    }
}

/// Trait for reading serializers
pub trait ReadingSerializer: Send + Sync {
    fn serialize(&self, reading: &Reading) -> Result<String>;

    /// Get the file extension for this format
    fn extension(&self) -> &'static str;
}

fn distribution_line(reading: &Reading) -> String {
    Element::ALL
        .iter()
        .map(|e| {
            format!(
                "{} {:.0}%",
                element_label(*e),
                reading.classification.distribution.weight(*e) * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join(" · ")
}

/// e.g. 금(金)
fn element_label(element: Element) -> String {
    format!("{}({})", element.korean(), element.symbol())
}

fn profile_line(reading: &Reading) -> String {
    let mut parts = Vec::new();
    let moment = reading.moment;
    parts.push(format!(
        "{:04}년 {}월 {}일 {}시 ({})",
        moment.year(),
        moment.month(),
        moment.day(),
        moment.hour(),
        if moment.is_lunar() { "음력" } else { "양력" }
    ));
    if let Some(gender) = reading.profile.gender {
        parts.push(gender.label().to_string());
    }
    if let Some(location) = &reading.profile.location {
        parts.push(location.clone());
    }
    parts.join(" / ")
}

/// Plain text for terminals
pub struct TextSerializer;

impl ReadingSerializer for TextSerializer {
    fn serialize(&self, reading: &Reading) -> Result<String> {
        let mut output = String::new();
        let name = if reading.profile.name.is_empty() {
            "사주 분석"
        } else {
            reading.profile.name.as_str()
        };
        output.push_str(&format!("{}\n{}\n\n", name, profile_line(reading)));

        for (position, pillar) in reading.pillars.entries() {
            output.push_str(&format!(
                "{}  {}  ({})\n",
                position.label(),
                pillar,
                element_label(pillar.element)
            ));
        }
        output.push_str(&format!("\n오행 분포: {}\n", distribution_line(reading)));
        output.push_str(&format!(
            "주도 오행: {}\n",
            element_label(reading.classification.dominant)
        ));

        for (section, text) in reading.narrative.iter() {
            output.push_str(&format!("\n[{}]\n{}\n", section.title(), text));
        }
        Ok(output)
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

/// Markdown document
pub struct MarkdownSerializer;

impl ReadingSerializer for MarkdownSerializer {
    fn serialize(&self, reading: &Reading) -> Result<String> {
        let mut output = String::new();
        let name = if reading.profile.name.is_empty() {
            "사주 분석".to_string()
        } else {
            format!("{}님의 사주 분석", reading.profile.name)
        };
        output.push_str(&format!("# {}\n\n{}\n\n", name, profile_line(reading)));

        output.push_str("| 구분 | 천간 | 지지 | 오행 |\n|---|---|---|---|\n");
        for (position, pillar) in reading.pillars.entries() {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                position.label(),
                pillar.stem,
                pillar.branch,
                element_label(pillar.element)
            ));
        }
        output.push_str(&format!("\n**오행 분포**: {}\n", distribution_line(reading)));

        for (section, text) in reading.narrative.iter() {
            output.push_str(&format!("\n## {}\n\n", section.title()));
            for line in text.lines() {
                output.push_str(line);
                output.push_str("  \n");
            }
        }
        Ok(output)
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

/// Full reading as pretty JSON
pub struct JsonSerializer;

impl ReadingSerializer for JsonSerializer {
    fn serialize(&self, reading: &Reading) -> Result<String> {
        Ok(serde_json::to_string_pretty(reading)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Default export file name: `{name}_사주분석.{ext}`
pub fn export_filename(name: &str, format: OutputFormat) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    let stem = if cleaned.is_empty() { "이름없음" } else { cleaned.as_str() };
    format!("{}_사주분석.{}", stem, format.extension())
}

/// Serialize a reading and write it to a file
pub fn write_reading(reading: &Reading, format: OutputFormat, path: &Path) -> Result<()> {
    let output = format.serializer().serialize(reading)?;
    std::fs::write(path, output)?;
    tracing::info!(path = %path.display(), format = format.extension(), "Exported reading");
    Ok(())
}
