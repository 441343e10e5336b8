//! Rule-based extraction of personalization attributes from user text.
//!
//! The extractor is an ordered table of (matcher, setter) rules. Every rule is
//! evaluated independently against each message, so one message may fill
//! several fields. This is a fixed pattern table, not language understanding:
//! anything the patterns do not literally match is ignored.

use crate::error::MemoryError;
use crate::profile::{Dinacharya, ProfileRecord};
use log::debug;
use regex::{Regex, RegexBuilder};

/// Writes the values a matcher produced into a profile fragment.
pub type FieldSetter = fn(&mut ProfileRecord, Vec<String>);

/// How a rule finds values in a message.
#[derive(Debug, Clone)]
enum Matcher {
    /// First capture group (or the whole match) of a case-insensitive pattern.
    Capture(Regex),
    /// Every keyword found as a case-insensitive substring, in table order.
    Keywords(Vec<String>),
    /// A capture that only applies when the text also contains `gate`.
    Gated { gate: String, capture: Regex },
}

impl Matcher {
    /// Values found in `text`, or `None` when the matcher does not apply.
    fn values(&self, text: &str) -> Option<Vec<String>> {
        match self {
            Matcher::Capture(regex) => first_capture(regex, text).map(|value| vec![value]),
            Matcher::Keywords(keywords) => {
                let lowered = text.to_lowercase();
                let found: Vec<String> = keywords
                    .iter()
                    .filter(|keyword| lowered.contains(keyword.as_str()))
                    .cloned()
                    .collect();
                (!found.is_empty()).then_some(found)
            }
            Matcher::Gated { gate, capture } => {
                if !text.to_lowercase().contains(gate.as_str()) {
                    return None;
                }
                first_capture(capture, text).map(|value| vec![value])
            }
        }
    }
}

fn first_capture(regex: &Regex, text: &str) -> Option<String> {
    let captures = regex.captures(text)?;
    captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|found| found.as_str().to_string())
}

fn compile(pattern: &str) -> Result<Regex, MemoryError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| MemoryError::Regex(err.to_string()))
}

/// A single named entry in the extraction table.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    name: String,
    matcher: Matcher,
    setter: FieldSetter,
}

impl ExtractionRule {
    /// Rule driven by a case-insensitive capture pattern.
    pub fn capture(
        name: impl Into<String>,
        pattern: &str,
        setter: FieldSetter,
    ) -> Result<Self, MemoryError> {
        Ok(Self {
            name: name.into(),
            matcher: Matcher::Capture(compile(pattern)?),
            setter,
        })
    }

    /// Rule driven by a keyword scan. Keywords are compared lowercase.
    pub fn keywords<I, S>(name: impl Into<String>, keywords: I, setter: FieldSetter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            matcher: Matcher::Keywords(
                keywords
                    .into_iter()
                    .map(|keyword| keyword.as_ref().to_lowercase())
                    .collect(),
            ),
            setter,
        }
    }

    /// Rule whose capture pattern only applies when `gate` is present.
    pub fn gated(
        name: impl Into<String>,
        gate: &str,
        pattern: &str,
        setter: FieldSetter,
    ) -> Result<Self, MemoryError> {
        Ok(Self {
            name: name.into(),
            matcher: Matcher::Gated {
                gate: gate.to_lowercase(),
                capture: compile(pattern)?,
            },
            setter,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the rule, returning whether it fired.
    fn apply(&self, text: &str, fragment: &mut ProfileRecord) -> bool {
        match self.matcher.values(text) {
            Some(values) => {
                (self.setter)(fragment, values);
                true
            }
            None => false,
        }
    }
}

/// Stateless extractor over an ordered rule table.
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: Vec<ExtractionRule>,
}

impl Extractor {
    /// Extractor with the built-in wellness rules.
    pub fn new() -> Result<Self, MemoryError> {
        Ok(Self::with_rules(default_rules()?))
    }

    /// Extractor with a caller-supplied table, evaluated in order.
    pub fn with_rules(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Derive a profile fragment from one user message. A message matching no
    /// rule yields an empty fragment.
    pub fn extract(&self, text: &str) -> ProfileRecord {
        let mut fragment = ProfileRecord::default();
        for rule in &self.rules {
            if rule.apply(text, &mut fragment) {
                debug!("extraction rule fired (rule={})", rule.name);
            }
        }
        fragment
    }
}

/// The built-in table, in evaluation order.
pub fn default_rules() -> Result<Vec<ExtractionRule>, MemoryError> {
    Ok(vec![
        ExtractionRule::capture(
            "dosha",
            r"(?:my dosha is|i am|i have|i'm)\s+(vata|pitta|kapha)",
            set_dosha,
        )?,
        ExtractionRule::capture(
            "prakruti",
            r"(?:my prakruti is|my constitution is)\s+((?:vata|pitta|kapha)(?:-(?:vata|pitta|kapha))?)",
            set_prakruti,
        )?,
        ExtractionRule::keywords("diet", ["vegetarian", "vegan", "sattvic"], set_diet),
        ExtractionRule::capture(
            "conditions",
            r"(?:i have|i suffer from|i experience)\s+([^.!?]+)",
            set_conditions,
        )?,
        ExtractionRule::capture(
            "agni",
            r"(?:my agni is|digestive fire is)\s+(strong|weak|variable|irregular)",
            set_agni,
        )?,
        ExtractionRule::gated(
            "wake_time",
            "wake up",
            r"(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)",
            set_wake_time,
        )?,
    ])
}

fn first_value(values: Vec<String>) -> Option<String> {
    values.into_iter().next()
}

fn set_dosha(fragment: &mut ProfileRecord, values: Vec<String>) {
    if let Some(value) = first_value(values) {
        fragment.preferences.dosha = Some(value.to_lowercase());
    }
}

fn set_prakruti(fragment: &mut ProfileRecord, values: Vec<String>) {
    if let Some(value) = first_value(values) {
        fragment.preferences.prakruti = Some(value.to_lowercase());
    }
}

/// Replaces the whole diet list with this message's keywords.
fn set_diet(fragment: &mut ProfileRecord, values: Vec<String>) {
    fragment.preferences.diet = Some(values);
}

fn set_conditions(fragment: &mut ProfileRecord, values: Vec<String>) {
    let Some(value) = first_value(values) else {
        return;
    };
    let condition = value.trim();
    if !condition.is_empty() {
        fragment.health_data.conditions = Some(vec![condition.to_string()]);
    }
}

fn set_agni(fragment: &mut ProfileRecord, values: Vec<String>) {
    if let Some(value) = first_value(values) {
        fragment.health_data.agni = Some(value.to_lowercase());
    }
}

/// Stores the matched text verbatim; no 12/24-hour normalization.
fn set_wake_time(fragment: &mut ProfileRecord, values: Vec<String>) {
    if let Some(value) = first_value(values) {
        fragment.preferences.dinacharya = Some(Dinacharya {
            wake_time: Some(value),
            ..Dinacharya::default()
        });
    }
}
