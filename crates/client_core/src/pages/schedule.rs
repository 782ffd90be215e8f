use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};
use shared::protocol::Schedule;

use super::PageState;
use crate::resources::ScheduleApi;

/// A cell in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub day: u32,
    pub has_schedule: bool,
    pub is_selected: bool,
    pub is_today: bool,
}

/// Month calendar of schedules with a selectable day.
pub struct SchedulePage {
    api: ScheduleApi,
    pub state: PageState<Vec<Schedule>>,
    month: NaiveDate,
    today: NaiveDate,
    selected_day: Option<u32>,
}

impl SchedulePage {
    pub fn new(api: ScheduleApi, today: NaiveDate) -> Self {
        Self {
            api,
            state: PageState::Idle,
            month: first_of_month(today),
            today,
            selected_day: Some(today.day()),
        }
    }

    pub async fn load(&mut self) {
        self.state.start_loading();
        let result = self.api.list().await;
        self.state.finish("schedules", result);
    }

    /// First day of the displayed month.
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn show_month(&mut self, year: i32, month: u32) -> bool {
        match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(first) => {
                self.month = first;
                true
            }
            None => false,
        }
    }

    pub fn prev_month(&mut self) {
        if let Some(prev) = self.month.checked_sub_months(Months::new(1)) {
            self.month = prev;
        }
    }

    pub fn next_month(&mut self) {
        if let Some(next) = self.month.checked_add_months(Months::new(1)) {
            self.month = next;
        }
    }

    pub fn select_day(&mut self, day: u32) {
        self.selected_day = (1..=self.days_in_month()).contains(&day).then_some(day);
    }

    pub fn clear_selection(&mut self) {
        self.selected_day = None;
    }

    pub fn selected_day(&self) -> Option<u32> {
        self.selected_day
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.month)
    }

    /// Blank cells before day 1 in a Sunday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        self.month.weekday().num_days_from_sunday()
    }

    pub fn in_month(&self) -> Vec<&Schedule> {
        let Some(schedules) = self.state.data() else {
            return Vec::new();
        };
        schedules
            .iter()
            .filter(|s| {
                s.starts_at().is_some_and(|start| {
                    start.year() == self.month.year() && start.month() == self.month.month()
                })
            })
            .collect()
    }

    pub fn days_with_schedules(&self) -> BTreeSet<u32> {
        self.in_month()
            .into_iter()
            .filter_map(|s| s.starts_at().map(|start| start.day()))
            .collect()
    }

    pub fn selected_schedules(&self) -> Vec<&Schedule> {
        let Some(day) = self.selected_day else {
            return Vec::new();
        };
        self.in_month()
            .into_iter()
            .filter(|s| s.starts_at().is_some_and(|start| start.day() == day))
            .collect()
    }

    pub fn grid(&self) -> Vec<CalendarDay> {
        let busy = self.days_with_schedules();
        (1..=self.days_in_month())
            .map(|day| CalendarDay {
                day,
                has_schedule: busy.contains(&day),
                is_selected: self.selected_day == Some(day),
                is_today: self.month.year() == self.today.year()
                    && self.month.month() == self.today.month()
                    && day == self.today.day(),
            })
            .collect()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
