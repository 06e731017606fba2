use crate::calendar::{self, DayCell, MonthCursor};
use crate::models::{Habit, HabitType};
use crate::stats::habit_color;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Marked,
    Cleared,
    Locked,
}

/// Flips `date_key` in the completion map. Dates after `today` are locked and
/// leave the map untouched.
pub fn toggle_date(
    completed: &mut BTreeMap<String, bool>,
    date: NaiveDate,
    today: NaiveDate,
) -> ToggleOutcome {
    if date > today {
        return ToggleOutcome::Locked;
    }
    let key = calendar::date_key(date);
    if completed.remove(&key).unwrap_or(false) {
        ToggleOutcome::Cleared
    } else {
        completed.insert(key, true);
        ToggleOutcome::Marked
    }
}

/// Trimmed title, or `None` when nothing is left.
pub fn normalize_title(raw: &str) -> Option<String> {
    let title = raw.trim();
    (!title.is_empty()).then(|| title.to_string())
}

#[derive(Debug, Serialize)]
pub struct GridCell {
    pub date_key: String,
    pub marked: bool,
    pub locked: bool,
}

#[derive(Debug, Serialize)]
pub struct GridRow {
    pub habit_id: String,
    pub title: String,
    pub icon: Option<String>,
    pub color: String,
    pub score: u32,
    pub goal: u32,
    pub progress_percent: u32,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Serialize)]
pub struct GridSection {
    pub title: String,
    pub habit_type: HabitType,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Serialize)]
pub struct MonthNav {
    pub key: String,
    pub name: String,
    pub year: i32,
    pub prev: String,
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct GridView {
    pub month: MonthNav,
    pub today: String,
    pub days_in_month: u32,
    pub days: Vec<DayCell>,
    pub sections: Vec<GridSection>,
    /// Column to centre on render; set only when the month contains today.
    pub scroll_anchor: Option<usize>,
    pub habit_count: usize,
}

pub fn build_grid_at(today: NaiveDate, habits: &[Habit], month: MonthCursor) -> GridView {
    let days = calendar::month_days(month, today);
    let days_in_month = month.days_in_month();
    let today_key = calendar::date_key(today);

    let sections = [
        (HabitType::Build, "Build Habits"),
        (HabitType::Break, "Break Habits"),
    ]
    .into_iter()
    .filter_map(|(habit_type, title)| {
        let rows: Vec<GridRow> = habits
            .iter()
            .filter(|h| h.habit_type() == habit_type)
            .map(|habit| grid_row(habit, habits, &days, &today_key, days_in_month))
            .collect();
        (!rows.is_empty()).then(|| GridSection {
            title: title.to_string(),
            habit_type,
            rows,
        })
    })
    .collect();

    GridView {
        month: MonthNav {
            key: month.key(),
            name: month.month_name(),
            year: month.year(),
            prev: month.prev().key(),
            next: month.next().key(),
        },
        scroll_anchor: days.iter().position(|d| d.is_today),
        today: today_key,
        days_in_month,
        days,
        sections,
        habit_count: habits.len(),
    }
}

fn grid_row(
    habit: &Habit,
    all: &[Habit],
    days: &[DayCell],
    today_key: &str,
    days_in_month: u32,
) -> GridRow {
    GridRow {
        habit_id: habit.id.clone(),
        title: habit.title().to_string(),
        icon: habit.doc.icon.clone(),
        color: habit_color(habit, all).to_string(),
        score: habit.score(days_in_month),
        goal: habit.goal_or(days_in_month),
        progress_percent: habit.progress_percent(days_in_month),
        cells: days
            .iter()
            .map(|d| GridCell {
                marked: habit.is_marked(&d.date_key),
                locked: d.date_key.as_str() > today_key,
                date_key: d.date_key.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitDocument;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str, habit_type: HabitType, marks: &[&str]) -> Habit {
        Habit::new(
            id,
            HabitDocument {
                title: id.to_string(),
                habit_type,
                goal: Some(10),
                icon: None,
                created_at: 0,
                completed_dates: marks.iter().map(|k| (k.to_string(), true)).collect(),
            },
        )
    }

    #[test]
    fn toggle_twice_restores_original_map() {
        let today = date(2026, 10, 18);
        let mut completed: BTreeMap<String, bool> =
            [("2026-10-01".to_string(), true)].into_iter().collect();
        let original = completed.clone();

        assert_eq!(toggle_date(&mut completed, date(2026, 10, 5), today), ToggleOutcome::Marked);
        assert!(completed.contains_key("2026-10-05"));
        assert_eq!(toggle_date(&mut completed, date(2026, 10, 5), today), ToggleOutcome::Cleared);
        assert_eq!(completed, original);
    }

    #[test]
    fn toggle_today_is_allowed() {
        let today = date(2026, 10, 18);
        let mut completed = BTreeMap::new();
        assert_eq!(toggle_date(&mut completed, today, today), ToggleOutcome::Marked);
        assert_eq!(completed.get("2026-10-18"), Some(&true));
    }

    #[test]
    fn toggle_future_date_is_locked() {
        let today = date(2026, 10, 18);
        let mut completed: BTreeMap<String, bool> =
            [("2026-10-01".to_string(), true)].into_iter().collect();
        let original = completed.clone();

        assert_eq!(toggle_date(&mut completed, date(2026, 10, 19), today), ToggleOutcome::Locked);
        assert_eq!(completed, original);
    }

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Read 30 mins "), Some("Read 30 mins".to_string()));
        assert_eq!(normalize_title("   "), None);
    }

    #[test]
    fn grid_splits_sections_and_locks_future_cells() {
        let today = date(2026, 10, 18);
        let habits = vec![
            habit("read", HabitType::Build, &["2026-10-18"]),
            habit("walk", HabitType::Build, &[]),
        ];
        let view = build_grid_at(today, &habits, MonthCursor::containing(today));

        assert_eq!(view.sections.len(), 1, "empty break section is omitted");
        assert_eq!(view.sections[0].title, "Build Habits");
        assert_eq!(view.scroll_anchor, Some(17));
        assert_eq!(view.month.prev, "2026-09");
        assert_eq!(view.month.next, "2026-11");

        let row = &view.sections[0].rows[0];
        assert_eq!(row.cells.len(), 31);
        assert!(row.cells[17].marked);
        assert!(!row.cells[17].locked);
        assert!(row.cells[18].locked);
        assert_eq!(row.score, 1);
        assert_eq!(row.progress_percent, 10);
    }

    #[test]
    fn grid_for_other_month_has_no_anchor() {
        let today = date(2026, 10, 18);
        let habits = vec![habit("sugar", HabitType::Break, &[])];
        let view = build_grid_at(today, &habits, MonthCursor::new(2026, 9).unwrap());

        assert_eq!(view.scroll_anchor, None);
        assert_eq!(view.sections[0].habit_type, HabitType::Break);
        assert!(view.sections[0].rows[0].cells.iter().all(|c| !c.locked));
    }

    #[test]
    fn grid_view_serializes_with_day_cells() {
        let today = date(2026, 10, 18);
        let habits = vec![habit("read", HabitType::Build, &["2026-10-18"])];
        let view = build_grid_at(today, &habits, MonthCursor::containing(today));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["days"][17]["date_key"], "2026-10-18");
        assert_eq!(json["days"][17]["is_today"], true);
        assert_eq!(json["sections"][0]["rows"][0]["cells"][17]["marked"], true);
        assert_eq!(json["scroll_anchor"], 17);
    }
}
