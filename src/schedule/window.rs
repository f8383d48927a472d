use crate::{error::AppError, time::MINUTES_PER_DAY, utils::minutes_to_hhmm};
use chrono::{NaiveTime, Timelike};
use std::fmt::Display;

/// Daily activation window, bounds in minutes since midnight. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    start: u16,
    end: u16,
}

impl ScheduleWindow {
    pub fn new(start: u16, end: u16) -> Result<Self, AppError> {
        check_minute(start)?;
        check_minute(end)?;
        Ok(Self { start, end })
    }

    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start: minute_of(start), end: minute_of(end) }
    }

    /// Parses `"HH:MM"` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        Ok(Self::from_times(parse_hhmm(start)?, parse_hhmm(end)?))
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Window crosses midnight (e.g. 20:30 to 09:30).
    pub fn is_wrapping(&self) -> bool {
        self.start > self.end
    }

    pub fn is_within(&self, now_minutes: u16) -> Result<bool, AppError> {
        check_minute(now_minutes)?;
        Ok(if self.start <= self.end {
            now_minutes >= self.start && now_minutes <= self.end
        } else {
            now_minutes >= self.start || now_minutes <= self.end
        })
    }

    /// Minutes until the verdict of `is_within` flips. A window covering the
    /// whole day never flips and reports a full day.
    pub fn minutes_until_change(&self, now_minutes: u16) -> Result<u16, AppError> {
        if (self.end + 1) % MINUTES_PER_DAY == self.start {
            check_minute(now_minutes)?;
            return Ok(MINUTES_PER_DAY);
        }
        let target = if self.is_within(now_minutes)? { (self.end + 1) % MINUTES_PER_DAY } else { self.start };
        let diff = (target as i32 - now_minutes as i32).rem_euclid(MINUTES_PER_DAY as i32) as u16;
        Ok(if diff == 0 { MINUTES_PER_DAY } else { diff })
    }
}

impl Display for ScheduleWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", minutes_to_hhmm(self.start), minutes_to_hhmm(self.end))
    }
}

/// Decides whether mock injection should be active at `now_minutes`.
pub fn is_active(window: &ScheduleWindow, now_minutes: u16) -> Result<bool, AppError> {
    window.is_within(now_minutes)
}

pub fn minute_of(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| AppError::Config(format!("invalid time of day '{}': {}", value, e)))
}

fn check_minute(minute: u16) -> Result<(), AppError> {
    if minute >= MINUTES_PER_DAY {
        return Err(AppError::InvalidArgument(format!("minute of day {} out of range [0, 1440)", minute)));
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn normal_window_matches_closed_interval() {
        let win = ScheduleWindow::new(360, 480).unwrap(); // 06:00 to 08:00
        for now in 0..MINUTES_PER_DAY {
            assert_eq!(win.is_within(now).unwrap(), (360..=480).contains(&now), "minute {}", now);
        }
    }

    #[test]
    fn wrapping_window_boundaries() {
        let win = ScheduleWindow::parse("20:30", "09:30").unwrap();
        assert!(win.is_wrapping());
        assert!(is_active(&win, 1230).unwrap());
        assert!(is_active(&win, 0).unwrap());
        assert!(is_active(&win, 570).unwrap());
        assert!(!is_active(&win, 571).unwrap());
        assert!(!is_active(&win, 1229).unwrap());
        assert!(is_active(&win, 1439).unwrap());
    }

    #[test]
    fn bounds_always_active() {
        let pairs = [
            (0, 0),
            (0, 1439),
            (1439, 0),
            (1439, 1439),
            (1, 1438),
            (1438, 1),
            (360, 480),
            (1230, 570),
            (720, 719),
            (600, 601),
        ];
        for (start, end) in pairs {
            let win = ScheduleWindow::new(start, end).unwrap();
            assert!(is_active(&win, start).unwrap(), "{} start", win);
            assert!(is_active(&win, end).unwrap(), "{} end", win);
            for now in 0..MINUTES_PER_DAY {
                let expected = if start <= end { start <= now && now <= end } else { now >= start || now <= end };
                assert_eq!(is_active(&win, now).unwrap(), expected, "{} at minute {}", win, now);
            }
        }
    }

    #[test]
    fn single_minute_window() {
        let win = ScheduleWindow::new(700, 700).unwrap();
        assert!(win.is_within(700).unwrap());
        assert!(!win.is_within(699).unwrap());
        assert!(!win.is_within(701).unwrap());
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(matches!(ScheduleWindow::new(1440, 10), Err(AppError::InvalidArgument(_))));
        assert!(matches!(ScheduleWindow::new(10, 2000), Err(AppError::InvalidArgument(_))));
        let win = ScheduleWindow::new(0, 10).unwrap();
        assert!(matches!(win.is_within(1440), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(ScheduleWindow::parse("25:00", "09:30"), Err(AppError::Config(_))));
        assert!(matches!(ScheduleWindow::parse("20:30", "soon"), Err(AppError::Config(_))));
    }

    #[test]
    fn display_as_hhmm() {
        let win = ScheduleWindow::parse("20:30", "09:30").unwrap();
        assert_eq!(win.to_string(), "20:30-09:30");
        assert_eq!((win.start(), win.end()), (1230, 570));
    }

    #[test]
    fn minutes_until_change() {
        let win = ScheduleWindow::parse("20:30", "09:30").unwrap();
        assert_eq!(win.minutes_until_change(1229).unwrap(), 1);
        assert_eq!(win.minutes_until_change(1230).unwrap(), 1440 - 1230 + 571);
        assert_eq!(win.minutes_until_change(570).unwrap(), 1);
        assert_eq!(win.minutes_until_change(571).unwrap(), 1230 - 571);

        let all_day = ScheduleWindow::new(0, 1439).unwrap();
        assert_eq!(all_day.minutes_until_change(100).unwrap(), 1440);
    }
}
