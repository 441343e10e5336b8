//! Onboarding profile edited wholesale by the profile form.

use serde::{Deserialize, Serialize};

/// Explicit onboarding data, stored independently of the conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub primary_dosha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_dosha: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub health_conditions: Vec<String>,
    #[serde(default)]
    pub daily_routine: DailyRoutine,
    #[serde(default)]
    pub preferences: ProfileSettings,
}

/// Self-reported daily schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyRoutine {
    #[serde(default)]
    pub wake_up_time: String,
    #[serde(default)]
    pub bed_time: String,
    #[serde(default)]
    pub meditation_time: String,
}

/// App settings stored with the profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            notifications: default_notifications(),
            dark_mode: false,
            language: default_language(),
        }
    }
}

fn default_notifications() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::UserProfile;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn profile_uses_camel_case_and_defaults() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Asha",
            "email": "asha@example.com",
            "primaryDosha": "vata",
            "dailyRoutine": { "wakeUpTime": "06:00" }
        }))
        .expect("profile");

        assert_eq!(profile.secondary_dosha, None);
        assert_eq!(profile.daily_routine.wake_up_time, "06:00");
        assert_eq!(profile.daily_routine.bed_time, "");
        assert!(profile.preferences.notifications);
        assert_eq!(profile.preferences.language, "en");

        let value = serde_json::to_value(&profile).expect("serialize");
        assert_eq!(value["primaryDosha"], json!("vata"));
        assert_eq!(value["preferences"]["darkMode"], json!(false));
    }
}
