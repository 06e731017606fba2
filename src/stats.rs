use crate::calendar::{self, DayCell, MonthCursor};
use crate::models::{AnalyticsFilter, Habit, HabitType, percent};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const POSITIVE_COLORS: [&str; 6] = ["#10b981", "#06b6d4", "#3b82f6", "#84cc16", "#14b8a6", "#6366f1"];
const NEGATIVE_COLORS: [&str; 6] = ["#f43f5e", "#ef4444", "#f97316", "#d946ef", "#e11d48", "#db2777"];
const WEEKDAY_ORDER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalRow {
    pub habit_id: String,
    pub name: String,
    pub habit_type: HabitType,
    pub goal: u32,
    pub actual: u32,
    pub percent: u32,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendPoint {
    pub day: u32,
    pub date_key: String,
    pub label: String,
    pub count: u32,
    pub percent: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendSeries {
    pub habit_id: String,
    pub title: String,
    pub habit_type: HabitType,
    pub color: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeekdayPoint {
    pub weekday: String,
    pub opportunities: u32,
    pub successes: u32,
    pub percent: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodaySnapshot {
    pub date_key: String,
    pub done: u32,
    pub remaining: u32,
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub month: String,
    pub days_in_month: u32,
    pub filter: AnalyticsFilter,
    pub goals: Vec<GoalRow>,
    pub trend: Vec<TrendSeries>,
    pub weekdays: Vec<WeekdayPoint>,
    pub today: TodaySnapshot,
}

pub fn build_stats_at(
    today: NaiveDate,
    habits: &[Habit],
    month: MonthCursor,
    filter: AnalyticsFilter,
) -> StatsResponse {
    let days = calendar::month_days(month, today);
    let days_in_month = month.days_in_month();
    let today_key = calendar::date_key(today);
    let filtered: Vec<&Habit> = habits.iter().filter(|h| filter.includes(h.habit_type())).collect();

    // Keys are canonical, so string order is date order.
    let elapsed: Vec<&DayCell> = days.iter().filter(|d| d.date_key <= today_key).collect();

    let goals = filtered
        .iter()
        .map(|habit| GoalRow {
            habit_id: habit.id.clone(),
            name: habit.title().to_string(),
            habit_type: habit.habit_type(),
            goal: habit.goal_or(days_in_month),
            actual: habit.score(days_in_month),
            percent: habit.progress_percent(days_in_month),
            color: habit_color(habit, habits).to_string(),
        })
        .collect();

    let trend = filtered
        .iter()
        .map(|habit| trend_series(habit, habits, month, &elapsed))
        .collect();

    StatsResponse {
        month: month.key(),
        days_in_month,
        filter,
        goals,
        trend,
        weekdays: weekday_consistency(&filtered, &elapsed),
        today: today_snapshot(habits, &filtered, filter, &today_key),
    }
}

fn trend_series(habit: &Habit, all: &[Habit], month: MonthCursor, elapsed: &[&DayCell]) -> TrendSeries {
    let mut running = 0u32;
    let points = elapsed
        .iter()
        .map(|cell| {
            if habit.succeeded_on(&cell.date_key) {
                running += 1;
            }
            let label = NaiveDate::from_ymd_opt(month.year(), month.month(), cell.day)
                .map(calendar::short_label)
                .unwrap_or_else(|| cell.date_key.clone());
            TrendPoint {
                day: cell.day,
                date_key: cell.date_key.clone(),
                label,
                count: running,
                percent: percent(running, cell.day),
            }
        })
        .collect();

    TrendSeries {
        habit_id: habit.id.clone(),
        title: habit.title().to_string(),
        habit_type: habit.habit_type(),
        color: habit_color(habit, all).to_string(),
        points,
    }
}

fn weekday_consistency(filtered: &[&Habit], elapsed: &[&DayCell]) -> Vec<WeekdayPoint> {
    let mut opportunities = [0u32; 7];
    let mut successes = [0u32; 7];

    for cell in elapsed {
        let Some(date) = calendar::parse_date_key(&cell.date_key) else {
            continue;
        };
        let slot = weekday_slot(date);
        opportunities[slot] += filtered.len() as u32;
        successes[slot] += filtered
            .iter()
            .filter(|habit| habit.succeeded_on(&cell.date_key))
            .count() as u32;
    }

    WEEKDAY_ORDER
        .iter()
        .enumerate()
        .map(|(slot, name)| WeekdayPoint {
            weekday: name.to_string(),
            opportunities: opportunities[slot],
            successes: successes[slot],
            percent: percent(successes[slot], opportunities[slot]),
        })
        .collect()
}

/// With the `all` filter only build habits count toward today's success, so
/// untouched break habits do not inflate the figure.
fn today_snapshot(
    habits: &[Habit],
    filtered: &[&Habit],
    filter: AnalyticsFilter,
    today_key: &str,
) -> TodaySnapshot {
    let eligible: Vec<&Habit> = match filter {
        AnalyticsFilter::All => habits
            .iter()
            .filter(|h| h.habit_type() == HabitType::Build)
            .collect(),
        _ => filtered.to_vec(),
    };
    let done = eligible.iter().filter(|h| h.succeeded_on(today_key)).count() as u32;
    let total = eligible.len() as u32;

    TodaySnapshot {
        date_key: today_key.to_string(),
        done,
        remaining: total.saturating_sub(done),
        total,
    }
}

/// Palette colour by position among habits of the same type.
pub fn habit_color(habit: &Habit, all: &[Habit]) -> &'static str {
    let palette: &[&'static str] = match habit.habit_type() {
        HabitType::Build => &POSITIVE_COLORS,
        HabitType::Break => &NEGATIVE_COLORS,
    };
    let index = all
        .iter()
        .filter(|h| h.habit_type() == habit.habit_type())
        .position(|h| h.id == habit.id)
        .unwrap_or(0);
    palette[index % palette.len()]
}

/// Weekday a date falls on, in the radar's order.
fn weekday_slot(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitDocument;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str, habit_type: HabitType, goal: Option<u32>, marks: &[&str]) -> Habit {
        Habit::new(
            id,
            HabitDocument {
                title: format!("habit {id}"),
                habit_type,
                goal,
                icon: None,
                created_at: 0,
                completed_dates: marks.iter().map(|k| (k.to_string(), true)).collect(),
            },
        )
    }

    #[test]
    fn trend_reports_cumulative_percent_of_elapsed_days() {
        let september = MonthCursor::new(2026, 9).unwrap();
        let habits = vec![habit(
            "run",
            HabitType::Build,
            Some(10),
            &["2026-09-02", "2026-09-05", "2026-09-09"],
        )];

        let stats = build_stats_at(date(2026, 9, 10), &habits, september, AnalyticsFilter::Build);
        let series = &stats.trend[0];
        assert_eq!(series.points.len(), 10);
        let last = series.points.last().unwrap();
        assert_eq!(last.day, 10);
        assert_eq!(last.count, 3);
        assert_eq!(last.percent, 30);
        assert_eq!(series.points[0].label, "Sep 1");
        assert!(series.points.windows(2).all(|w| w[0].count <= w[1].count));
    }

    #[test]
    fn trend_covers_whole_month_once_it_has_passed() {
        let august = MonthCursor::new(2026, 8).unwrap();
        let habits = vec![habit("a", HabitType::Build, None, &[])];
        let stats = build_stats_at(date(2026, 10, 18), &habits, august, AnalyticsFilter::Build);
        assert_eq!(stats.trend[0].points.len(), 31);

        let future = MonthCursor::new(2026, 11).unwrap();
        let stats = build_stats_at(date(2026, 10, 18), &habits, future, AnalyticsFilter::Build);
        assert!(stats.trend[0].points.is_empty());
    }

    #[test]
    fn break_trend_counts_clean_days() {
        let september = MonthCursor::new(2026, 9).unwrap();
        let habits = vec![habit("smoke", HabitType::Break, Some(4), &["2026-09-03"])];
        let stats = build_stats_at(date(2026, 9, 4), &habits, september, AnalyticsFilter::Break);
        let counts: Vec<u32> = stats.trend[0].points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 2, 2, 3]);
    }

    #[test]
    fn goal_rows_follow_filter_and_score_rules() {
        let september = MonthCursor::new(2026, 9).unwrap();
        let habits = vec![
            habit("read", HabitType::Build, Some(10), &["2026-09-01"]),
            habit("sugar", HabitType::Break, Some(4), &["2026-09-01", "2026-09-02"]),
        ];

        let stats = build_stats_at(date(2026, 9, 30), &habits, september, AnalyticsFilter::Break);
        assert_eq!(stats.goals.len(), 1);
        assert_eq!(stats.goals[0].actual, 2);
        assert_eq!(stats.goals[0].percent, 50);
        assert_eq!(stats.goals[0].color, NEGATIVE_COLORS[0]);

        let all = build_stats_at(date(2026, 9, 30), &habits, september, AnalyticsFilter::All);
        assert_eq!(all.goals.len(), 2);
        assert_eq!(all.goals[0].percent, 10);
    }

    #[test]
    fn weekday_without_elapsed_days_is_zero() {
        // 2026-10-01 is a Thursday; by the 2nd only Thu and Fri have occurred.
        let october = MonthCursor::new(2026, 10).unwrap();
        let habits = vec![habit("a", HabitType::Build, None, &["2026-10-01"])];
        let stats = build_stats_at(date(2026, 10, 2), &habits, october, AnalyticsFilter::Build);

        let by_name = |name: &str| stats.weekdays.iter().find(|w| w.weekday == name).unwrap();
        assert_eq!(stats.weekdays.len(), 7);
        assert_eq!(stats.weekdays[0].weekday, "Sun");
        assert_eq!(by_name("Thu").percent, 100);
        assert_eq!(by_name("Fri").percent, 0);
        assert_eq!(by_name("Fri").opportunities, 1);
        assert_eq!(by_name("Mon").opportunities, 0);
        assert_eq!(by_name("Mon").percent, 0);
    }

    #[test]
    fn weekday_with_no_habits_has_no_opportunities() {
        let october = MonthCursor::new(2026, 10).unwrap();
        let stats = build_stats_at(date(2026, 10, 18), &[], october, AnalyticsFilter::All);
        assert!(stats.weekdays.iter().all(|w| w.opportunities == 0 && w.percent == 0));
        assert_eq!(stats.today.total, 0);
    }

    #[test]
    fn today_snapshot_with_all_filter_counts_build_habits_only() {
        let october = MonthCursor::new(2026, 10).unwrap();
        let today = date(2026, 10, 18);
        let habits = vec![
            habit("read", HabitType::Build, None, &["2026-10-18"]),
            habit("walk", HabitType::Build, None, &[]),
            habit("sugar", HabitType::Break, None, &[]),
        ];

        let all = build_stats_at(today, &habits, october, AnalyticsFilter::All);
        assert_eq!((all.today.done, all.today.remaining, all.today.total), (1, 1, 2));

        let breaks = build_stats_at(today, &habits, october, AnalyticsFilter::Break);
        assert_eq!((breaks.today.done, breaks.today.total), (1, 1));
    }

    #[test]
    fn colors_are_assigned_per_type() {
        let habits = vec![
            habit("a", HabitType::Build, None, &[]),
            habit("b", HabitType::Break, None, &[]),
            habit("c", HabitType::Build, None, &[]),
        ];
        assert_eq!(habit_color(&habits[0], &habits), POSITIVE_COLORS[0]);
        assert_eq!(habit_color(&habits[1], &habits), NEGATIVE_COLORS[0]);
        assert_eq!(habit_color(&habits[2], &habits), POSITIVE_COLORS[1]);
    }

    #[test]
    fn weekday_slot_matches_radar_order() {
        assert_eq!(WEEKDAY_ORDER[weekday_slot(date(2026, 10, 18))], "Sun");
        assert_eq!(WEEKDAY_ORDER[weekday_slot(date(2026, 10, 1))], "Thu");
    }
}
