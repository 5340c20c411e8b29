//! In-process daily job scheduler.
//!
//! Jobs are polled, not woken: the caller invokes [`DailyScheduler::run_pending`]
//! periodically and every job whose time has come runs, one after another.
//! A job that missed several days runs once and moves on to its next slot.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use futures::future::BoxFuture;

use crate::error::ScheduleError;

pub type Job = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct ScheduledJob {
    at:       NaiveTime,
    next_run: NaiveDateTime,
    job:      Job,
}

#[derive(Default)]
pub struct DailyScheduler {
    jobs: Vec<ScheduledJob>,
}

impl DailyScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `job` to run every day at `time` (`HH:MM`, local clock).
    pub fn every_day_at(&mut self, time: &str, job: Job) -> Result<(), ScheduleError> {
        self.every_day_at_from(time, job, Local::now().naive_local())
    }

    fn every_day_at_from(
        &mut self,
        time: &str,
        job:  Job,
        now:  NaiveDateTime,
    ) -> Result<(), ScheduleError> {
        let at = parse_time_of_day(time)?;
        let next_run = next_after(at, now);
        tracing::debug!(time, next_run = %next_run, "daily job registered");
        self.jobs.push(ScheduledJob { at, next_run, job });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Earliest upcoming run across all jobs.
    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(|j| j.next_run).min()
    }

    pub async fn run_pending(&mut self) -> usize {
        self.run_pending_at(Local::now().naive_local()).await
    }

    /// Runs every job due at `now` and returns how many ran.
    pub async fn run_pending_at(&mut self, now: NaiveDateTime) -> usize {
        let mut ran = 0;
        for entry in self.jobs.iter_mut().filter(|j| j.next_run <= now) {
            tracing::debug!(at = %entry.at.format("%H:%M"), "running scheduled job");
            (entry.job)().await;
            entry.next_run = next_after(entry.at, now);
            ran += 1;
        }
        ran
    }
}

/// Accepts exactly `HH:MM` with a 24-hour clock.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ScheduleError> {
    let well_formed = s.len() == 5
        && s.as_bytes()[2] == b':'
        && s.bytes().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed {
        return Err(ScheduleError::InvalidTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ScheduleError::InvalidTime(s.to_string()))
}

/// First occurrence of `at` strictly after `now`.
fn next_after(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now { today } else { today + Duration::days(1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use chrono::NaiveDate;
    use futures::FutureExt;

    fn dt(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn counting_job(counter: &Arc<AtomicUsize>) -> Job {
        let counter = Arc::clone(counter);
        Box::new(move || {
            let counter = Arc::clone(&counter);
            async move { counter.fetch_add(1, Ordering::SeqCst); }.boxed()
        })
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["9:00", "25:00", "09:60", "0900", "09:00:00", "ab:cd", ""] {
            assert!(parse_time_of_day(bad).is_err(), "{bad} should be rejected");
        }
        assert_eq!(parse_time_of_day("23:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn first_run_is_today_when_still_ahead_else_tomorrow() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = DailyScheduler::new();

        scheduler.every_day_at_from("18:00", counting_job(&counter), dt(19, 10, 0)).unwrap();
        assert_eq!(scheduler.next_run(), Some(dt(19, 18, 0)));

        let mut late = DailyScheduler::new();
        late.every_day_at_from("09:00", counting_job(&counter), dt(19, 9, 0)).unwrap();
        assert_eq!(late.next_run(), Some(dt(20, 9, 0)));
    }

    #[tokio::test]
    async fn due_jobs_run_once_and_reschedule_to_tomorrow() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = DailyScheduler::new();
        scheduler.every_day_at_from("09:00", counting_job(&counter), dt(19, 8, 0)).unwrap();
        scheduler.every_day_at_from("18:00", counting_job(&counter), dt(19, 8, 0)).unwrap();

        assert_eq!(scheduler.run_pending_at(dt(19, 8, 59)).await, 0);
        assert_eq!(scheduler.run_pending_at(dt(19, 9, 0)).await, 1);
        assert_eq!(scheduler.run_pending_at(dt(19, 9, 1)).await, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.next_run(), Some(dt(19, 18, 0)));
    }

    #[tokio::test]
    async fn missed_days_are_not_caught_up() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = DailyScheduler::new();
        scheduler.every_day_at_from("09:00", counting_job(&counter), dt(10, 8, 0)).unwrap();

        // Three days late: one run, then the next future slot.
        assert_eq!(scheduler.run_pending_at(dt(13, 12, 0)).await, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.next_run(), Some(dt(14, 9, 0)));
    }
}
