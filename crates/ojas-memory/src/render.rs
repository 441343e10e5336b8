//! Prompt digest of the personalization record.

use crate::profile::ProfileRecord;

/// First line of every digest.
pub const CONTEXT_HEADER: &str = "User Context:";

/// Render the record as a fixed-order, line-oriented digest for a system
/// prompt. Absent or empty attributes produce no line.
pub fn render_context(profile: &ProfileRecord) -> String {
    let mut lines = vec![CONTEXT_HEADER.to_string()];
    let preferences = &profile.preferences;
    let health = &profile.health_data;

    if let Some(dosha) = preferences.dosha.as_deref().filter(|dosha| !dosha.is_empty()) {
        lines.push(format!("- Dosha: {dosha}"));
    }
    push_list(&mut lines, "Diet", preferences.diet.as_deref());
    push_list(&mut lines, "Allergies", preferences.allergies.as_deref());
    push_list(&mut lines, "Health conditions", health.conditions.as_deref());
    if let Some(metrics) = &health.last_reported {
        for (metric, value) in metrics {
            lines.push(format!("- {metric}: {value}"));
        }
    }
    lines.join("\n")
}

fn push_list(lines: &mut Vec<String>, label: &str, values: Option<&[String]>) {
    match values {
        Some(values) if !values.is_empty() => {
            lines.push(format!("- {label}: {}", values.join(", ")));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{CONTEXT_HEADER, render_context};
    use crate::profile::{HealthData, Preferences, ProfileRecord};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn empty_record_renders_header_only() {
        assert_eq!(render_context(&ProfileRecord::default()), CONTEXT_HEADER);
    }

    #[test]
    fn renders_sections_in_fixed_order() {
        let profile = ProfileRecord {
            preferences: Preferences {
                dosha: Some("pitta".to_string()),
                diet: Some(vec!["vegan".to_string(), "sattvic".to_string()]),
                allergies: Some(vec!["peanuts".to_string()]),
                prakruti: Some("vata-pitta".to_string()),
                ..Preferences::default()
            },
            health_data: HealthData {
                conditions: Some(vec!["joint pain".to_string()]),
                last_reported: Some(BTreeMap::from([
                    ("sleep".to_string(), 7.5),
                    ("energy".to_string(), 6.0),
                ])),
                agni: Some("weak".to_string()),
                ..HealthData::default()
            },
        };

        let expected = "User Context:\n\
                        - Dosha: pitta\n\
                        - Diet: vegan, sattvic\n\
                        - Allergies: peanuts\n\
                        - Health conditions: joint pain\n\
                        - energy: 6\n\
                        - sleep: 7.5";
        assert_eq!(render_context(&profile), expected);
    }

    #[test]
    fn empty_lists_are_omitted() {
        let profile = ProfileRecord {
            preferences: Preferences {
                diet: Some(Vec::new()),
                dosha: Some(String::new()),
                ..Preferences::default()
            },
            health_data: HealthData {
                last_reported: Some(BTreeMap::new()),
                ..HealthData::default()
            },
        };
        assert_eq!(render_context(&profile), CONTEXT_HEADER);
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut profile = ProfileRecord::default();
        profile.health_data.conditions = Some(vec!["acidity".to_string()]);
        let before = profile.clone();
        let first = render_context(&profile);
        let second = render_context(&profile);
        assert_eq!(first, second);
        assert_eq!(profile, before);
    }
}
