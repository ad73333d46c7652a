//! Weekly and monthly aggregation of activity totals for charts.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::activity::types::ActivityHistoryEntry;
use crate::metrics::calculator::round_half_up;
use crate::metrics::zones::ZoneCounts;

/// History length above which bins switch from weeks to months.
pub const MONTHLY_THRESHOLD_DAYS: u32 = 366;

/// History length below which weekly labels show the full range.
const RANGE_LABEL_THRESHOLD_DAYS: u32 = 120;

/// Size of one bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// ISO week (Monday to Sunday)
    Week,
    /// Calendar month
    Month,
}

impl Granularity {
    /// Months once the requested history exceeds a year.
    pub fn for_history(history_days: u32) -> Self {
        if history_days > MONTHLY_THRESHOLD_DAYS {
            Granularity::Month
        } else {
            Granularity::Week
        }
    }

    fn key(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Granularity::Week => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Granularity::Month => (date.year(), date.month()),
        }
    }
}

/// Summed TSS and hours for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TssBin {
    pub label: String,
    pub total_tss: u32,
    pub total_hours: f64,
}

/// Hours per zone for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBin {
    pub label: String,
    pub hours: Vec<f64>,
}

/// Bins plus the chart legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binned<T> {
    pub bins: Vec<T>,
    pub legend: String,
}

/// Which zone family a zone bin reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Heart,
    Power,
}

/// Groups dated items into consecutive periods.
#[derive(Debug, Clone, Copy)]
pub struct PeriodBinner {
    granularity: Granularity,
    history_days: u32,
}

/// A finished period: first and last item dates and the folded value.
struct Period<A> {
    first: NaiveDate,
    last: NaiveDate,
    value: A,
}

impl PeriodBinner {
    /// Binner whose granularity follows the requested history length.
    pub fn for_history(history_days: u32) -> Self {
        Self {
            granularity: Granularity::for_history(history_days),
            history_days,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Fold items (sorted ascending by date) into one value per period.
    ///
    /// A period closes when the next item falls in a different week or month;
    /// the last period is closed after the final item.
    fn periods<T, A: Default>(
        &self,
        items: &[T],
        date_of: impl Fn(&T) -> NaiveDate,
        mut fold: impl FnMut(&mut A, &T),
    ) -> Vec<Period<A>> {
        let mut periods: Vec<Period<A>> = Vec::new();

        for item in items {
            let date = date_of(item);
            let same_period = periods
                .last()
                .is_some_and(|p| self.granularity.key(p.first) == self.granularity.key(date));
            if !same_period {
                periods.push(Period {
                    first: date,
                    last: date,
                    value: A::default(),
                });
            }
            if let Some(current) = periods.last_mut() {
                current.last = date;
                fold(&mut current.value, item);
            }
        }

        periods
    }

    fn label(&self, first: NaiveDate, last: NaiveDate) -> String {
        match self.granularity {
            Granularity::Month => first.format("%b '%y").to_string(),
            Granularity::Week if self.history_days < RANGE_LABEL_THRESHOLD_DAYS => {
                format!("{} - {}", first.format("%-d %b"), last.format("%-d %b"))
            }
            Granularity::Week => first.format("%-d %b").to_string(),
        }
    }

    fn legend<A>(&self, periods: &[Period<A>]) -> String {
        match (self.granularity, periods.last()) {
            (Granularity::Month, _) => "By Month".to_string(),
            (Granularity::Week, Some(last)) => {
                let week = last.first.iso_week();
                format!("By week number: Series ending wk{}, {}", week.week(), week.year())
            }
            (Granularity::Week, None) => "By week number".to_string(),
        }
    }

    /// TSS and duration per period.
    pub fn tss_by_period(&self, entries: &[ActivityHistoryEntry]) -> Binned<TssBin> {
        let mut sorted: Vec<&ActivityHistoryEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.start_time());

        let periods = self.periods(
            &sorted,
            |e: &&ActivityHistoryEntry| e.start_time().date_naive(),
            |acc: &mut (u32, u64), e: &&ActivityHistoryEntry| {
                acc.0 += e.effective_tss();
                acc.1 += e.summary.duration_secs as u64;
            },
        );

        Binned {
            legend: self.legend(&periods),
            bins: periods
                .iter()
                .map(|p| TssBin {
                    label: self.label(p.first, p.last),
                    total_tss: p.value.0,
                    total_hours: round_half_up(p.value.1 as f64 / 3600.0, 2),
                })
                .collect(),
        }
    }

    /// Hours per heart rate or power zone per period.
    pub fn zones_by_period(&self, zones: &[(NaiveDate, ZoneCounts)], kind: ZoneKind) -> Binned<ZoneBin> {
        let mut sorted: Vec<&(NaiveDate, ZoneCounts)> = zones.iter().collect();
        sorted.sort_by_key(|(date, _)| *date);

        let periods = self.periods(
            &sorted,
            |item: &&(NaiveDate, ZoneCounts)| item.0,
            |acc: &mut ZoneCounts, item: &&(NaiveDate, ZoneCounts)| acc.accumulate(&item.1),
        );

        Binned {
            legend: self.legend(&periods),
            bins: periods
                .iter()
                .map(|p| {
                    let seconds: &[u32] = match kind {
                        ZoneKind::Heart => &p.value.heart,
                        ZoneKind::Power => &p.value.power,
                    };
                    ZoneBin {
                        label: self.label(p.first, p.last),
                        hours: seconds
                            .iter()
                            .map(|&s| round_half_up(s as f64 / 3600.0, 2))
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}
