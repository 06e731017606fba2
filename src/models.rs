use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_BUILD_GOAL: u32 = 31;
pub const DEFAULT_BREAK_GOAL: u32 = 4;
pub const MAX_GOAL: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    Build,
    Break,
}

impl HabitType {
    pub fn default_goal(self) -> u32 {
        match self {
            HabitType::Build => DEFAULT_BUILD_GOAL,
            HabitType::Break => DEFAULT_BREAK_GOAL,
        }
    }

    pub fn default_icon(self) -> &'static str {
        match self {
            HabitType::Build => "\u{1F331}",
            HabitType::Break => "\u{1F480}",
        }
    }
}

/// Persisted shape of a habit. Field names match the stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDocument {
    pub title: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub completed_dates: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    #[serde(flatten)]
    pub doc: HabitDocument,
}

impl Habit {
    pub fn new(id: impl Into<String>, doc: HabitDocument) -> Self {
        Self { id: id.into(), doc }
    }

    pub fn title(&self) -> &str {
        &self.doc.title
    }

    pub fn habit_type(&self) -> HabitType {
        self.doc.habit_type
    }

    pub fn is_marked(&self, date_key: &str) -> bool {
        self.doc.completed_dates.get(date_key).copied().unwrap_or(false)
    }

    /// Build habits succeed on marked days, break habits on unmarked ones.
    pub fn succeeded_on(&self, date_key: &str) -> bool {
        match self.habit_type() {
            HabitType::Build => self.is_marked(date_key),
            HabitType::Break => !self.is_marked(date_key),
        }
    }

    pub fn completed_count(&self) -> u32 {
        self.doc.completed_dates.values().filter(|marked| **marked).count() as u32
    }

    /// Stored goal, or the month length when none was saved.
    pub fn goal_or(&self, days_in_month: u32) -> u32 {
        match self.doc.goal {
            Some(goal) if goal > 0 => goal,
            _ => days_in_month,
        }
    }

    pub fn score(&self, days_in_month: u32) -> u32 {
        let completed = self.completed_count();
        match self.habit_type() {
            HabitType::Build => completed,
            HabitType::Break => self.goal_or(days_in_month).saturating_sub(completed),
        }
    }

    pub fn progress_percent(&self, days_in_month: u32) -> u32 {
        percent(self.score(days_in_month), self.goal_or(days_in_month)).min(100)
    }
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole` is 0.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsFilter {
    #[default]
    Build,
    Break,
    All,
}

impl AnalyticsFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "build" => Some(Self::Build),
            "break" => Some(Self::Break),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn includes(self, habit_type: HabitType) -> bool {
        match self {
            AnalyticsFilter::Build => habit_type == HabitType::Build,
            AnalyticsFilter::Break => habit_type == HabitType::Break,
            AnalyticsFilter::All => true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub goal: Option<u32>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    pub title: Option<String>,
    pub goal: Option<u32>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
    /// The browser's local date, `YYYY-MM-DD`.
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
    pub filter: Option<String>,
    pub today: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub habit: Habit,
    pub outcome: crate::grid::ToggleOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: crate::auth::User,
}
