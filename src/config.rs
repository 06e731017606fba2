use crate::models::AnalyticsFilter;
use serde::Serialize;
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    Icon,
    #[default]
    Swatch,
}

/// Switches for the dashboard page. Rendered into the page and served from
/// `/api/config`.
#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub dark_mode: bool,
    pub goal_tracking: bool,
    pub analytics_filter: bool,
    pub badge_style: BadgeStyle,
    pub default_filter: AnalyticsFilter,
    pub allow_guest: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            goal_tracking: true,
            analytics_filter: true,
            badge_style: BadgeStyle::Swatch,
            default_filter: AnalyticsFilter::Build,
            allow_guest: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub ui: UiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = UiConfig::default();
        let flag = |key: &str, default: bool| lookup(key).and_then(|v| parse_flag(&v)).unwrap_or(default);

        let ui = UiConfig {
            dark_mode: flag("HABIT_DARK_MODE", defaults.dark_mode),
            goal_tracking: flag("HABIT_GOAL_TRACKING", defaults.goal_tracking),
            analytics_filter: flag("HABIT_ANALYTICS_FILTER", defaults.analytics_filter),
            allow_guest: flag("HABIT_ALLOW_GUEST", defaults.allow_guest),
            badge_style: match lookup("HABIT_BADGE_STYLE").as_deref().map(str::trim) {
                Some("icon") => BadgeStyle::Icon,
                Some("swatch") => BadgeStyle::Swatch,
                _ => defaults.badge_style,
            },
            default_filter: lookup("HABIT_DEFAULT_FILTER")
                .and_then(|v| AnalyticsFilter::parse(&v))
                .unwrap_or(defaults.default_filter),
        };

        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8080),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/habits.json")),
            ui,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
