//! Personalization record derived from conversation and its merge rules.
//!
//! A [`ProfileRecord`] has two groups, `preferences` and `healthData`. Merging
//! a fragment is shallow and one level deep per group: every key the fragment
//! sets replaces the previous value for that key (lists and nested objects are
//! replaced wholesale), and keys the fragment leaves unset are untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Merged personalization attributes for the current user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileRecord {
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default, rename = "healthData")]
    pub health_data: HealthData,
}

impl ProfileRecord {
    /// Merge a fragment into this record, group by group.
    pub fn merge(&mut self, fragment: ProfileRecord) {
        self.preferences.merge(fragment.preferences);
        self.health_data.merge(fragment.health_data);
    }

    /// True when neither group carries any key.
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && self.health_data.is_empty()
    }
}

/// Stated preferences and constitution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prakruti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_goals: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinacharya: Option<Dinacharya>,
    /// Any other string-keyed preference.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Preferences {
    fn merge(&mut self, fragment: Preferences) {
        let Preferences {
            dosha,
            prakruti,
            diet,
            allergies,
            health_goals,
            dinacharya,
            extra,
        } = fragment;
        replace_if_set(&mut self.dosha, dosha);
        replace_if_set(&mut self.prakruti, prakruti);
        replace_if_set(&mut self.diet, diet);
        replace_if_set(&mut self.allergies, allergies);
        replace_if_set(&mut self.health_goals, health_goals);
        replace_if_set(&mut self.dinacharya, dinacharya);
        self.extra.extend(extra);
    }

    pub fn is_empty(&self) -> bool {
        self.dosha.is_none()
            && self.prakruti.is_none()
            && self.diet.is_none()
            && self.allergies.is_none()
            && self.health_goals.is_none()
            && self.dinacharya.is_none()
            && self.extra.is_empty()
    }
}

/// Daily-routine attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dinacharya {
    /// Wake time exactly as the user wrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Reported health state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    /// Latest numeric metrics, e.g. sleep, stress, digestion, energy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reported: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agni: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl HealthData {
    fn merge(&mut self, fragment: HealthData) {
        let HealthData {
            last_reported,
            conditions,
            medications,
            agni,
            extra,
        } = fragment;
        replace_if_set(&mut self.last_reported, last_reported);
        replace_if_set(&mut self.conditions, conditions);
        replace_if_set(&mut self.medications, medications);
        replace_if_set(&mut self.agni, agni);
        self.extra.extend(extra);
    }

    pub fn is_empty(&self) -> bool {
        self.last_reported.is_none()
            && self.conditions.is_none()
            && self.medications.is_none()
            && self.agni.is_none()
            && self.extra.is_empty()
    }
}

fn replace_if_set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
