//! Décision de démarrage automatique au boot.
//!
//! Les jours « tardifs » (vendredi et samedi par défaut) n'ont pas d'heure de
//! coucher : la radio démarre dès l'heure de réveil passée. Les autres jours,
//! elle ne démarre qu'entre le réveil et le coucher, bornes exclues.

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::error::{RadioError, Result};

pub const DEFAULT_WAKE_HOUR: u32 = 8;
pub const DEFAULT_WEEKDAY_BEDTIME_HOUR: u32 = 23;
pub const DEFAULT_LATE_DAYS: [Weekday; 2] = [Weekday::Fri, Weekday::Sat];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGate {
    wake: NaiveTime,
    bedtime: NaiveTime,
    late_days: Vec<Weekday>,
}

impl Default for ScheduleGate {
    fn default() -> Self {
        Self {
            wake: NaiveTime::MIN + chrono::Duration::hours(DEFAULT_WAKE_HOUR as i64),
            bedtime: NaiveTime::MIN + chrono::Duration::hours(DEFAULT_WEEKDAY_BEDTIME_HOUR as i64),
            late_days: DEFAULT_LATE_DAYS.to_vec(),
        }
    }
}

impl ScheduleGate {
    /// Seuils à l'heure pile ; les heures doivent être dans `0..24`.
    pub fn new(wake_hour: u32, weekday_bedtime_hour: u32) -> Result<Self> {
        Ok(Self {
            wake: hour(wake_hour)?,
            bedtime: hour(weekday_bedtime_hour)?,
            late_days: DEFAULT_LATE_DAYS.to_vec(),
        })
    }

    pub fn with_late_days(mut self, late_days: impl IntoIterator<Item = Weekday>) -> Self {
        self.late_days = late_days.into_iter().collect();
        self
    }

    pub fn wake_hour(&self) -> u32 {
        self.wake.hour()
    }

    pub fn late_days(&self) -> &[Weekday] {
        &self.late_days
    }

    pub fn permits(&self, now: NaiveDateTime) -> bool {
        let time = now.time();
        if self.late_days.contains(&now.weekday()) {
            time >= self.wake
        } else {
            self.wake < time && time < self.bedtime
        }
    }

    /// [`ScheduleGate::permits`] à l'heure locale courante.
    pub fn permits_now(&self) -> bool {
        let now = Local::now().naive_local();
        let permitted = self.permits(now);
        tracing::info!(now=%now.format("%a %H:%M"), permitted, "Schedule check");
        permitted
    }
}

fn hour(value: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(value, 0, 0)
        .ok_or_else(|| RadioError::InvalidSchedule(format!("hour {} out of range", value)))
}

/// Analyse un nom de jour (`fri`, `Friday`, ...).
pub fn parse_weekday(name: &str) -> Result<Weekday> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| RadioError::InvalidSchedule(format!("unknown day '{}'", name)))
}

/// Heure affichée sur l'écran de veille : `8am`, `12pm`, `11pm`...
pub fn format_hour(hour: u32) -> String {
    let suffix = if hour % 24 < 12 { "am" } else { "pm" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}{}", display, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-01-03 est un mercredi, 2024-01-06 un samedi
    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_weekday_window() {
        let gate = ScheduleGate::new(8, 23).unwrap();
        assert!(gate.permits(at(3, 9, 0)));
        assert!(!gate.permits(at(3, 23, 30)));
        assert!(!gate.permits(at(3, 7, 59)));
    }

    #[test]
    fn test_weekday_bounds_are_strict() {
        let gate = ScheduleGate::new(8, 23).unwrap();
        assert!(!gate.permits(at(3, 8, 0)));
        assert!(gate.permits(at(3, 8, 1)));
        assert!(!gate.permits(at(3, 23, 0)));
    }

    #[test]
    fn test_late_days_have_no_bedtime() {
        let gate = ScheduleGate::new(8, 23).unwrap();
        assert!(gate.permits(at(6, 9, 0)));
        assert!(gate.permits(at(6, 23, 30)));
        assert!(gate.permits(at(5, 8, 0)));
        assert!(!gate.permits(at(6, 7, 0)));
    }

    #[test]
    fn test_custom_late_days() {
        let gate = ScheduleGate::new(8, 23)
            .unwrap()
            .with_late_days([Weekday::Wed]);
        assert!(gate.permits(at(3, 23, 30)));
        assert!(!gate.permits(at(6, 23, 30)));
    }

    #[test]
    fn test_invalid_hours() {
        assert!(matches!(
            ScheduleGate::new(24, 23),
            Err(RadioError::InvalidSchedule(_))
        ));
        assert_eq!(ScheduleGate::default(), ScheduleGate::new(8, 23).unwrap());
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("fri").unwrap(), Weekday::Fri);
        assert_eq!(parse_weekday("Saturday").unwrap(), Weekday::Sat);
        assert!(parse_weekday("someday").is_err());
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(8), "8am");
        assert_eq!(format_hour(0), "12am");
        assert_eq!(format_hour(12), "12pm");
        assert_eq!(format_hour(23), "11pm");
    }
}
