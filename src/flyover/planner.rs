use chrono::{DateTime, NaiveTime, Utc};

use crate::calendar::{CalendarSink, Deduplicator, ExistingEvent, NewEvent, Reminder};
use crate::flyover::error::FlyoverError;
use crate::flyover::outcome::{DayOutcome, DayPlan, DayReport, RunReport};
use crate::predict::{
    find_pass_events, visible_pass, DayWindowBuilder, Ephemeris, Location, PredictError,
};

/// Per-run settings of the planner.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub horizon_days: u32,
    pub min_elevation_deg: f64,
    pub bed_time: NaiveTime,
    pub event_title: String,
    pub calendar_id: String,
    pub max_results: u32,
    pub reminders: Vec<Reminder>,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            horizon_days: 10,
            min_elevation_deg: 30.0,
            bed_time: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or(NaiveTime::MIN),
            event_title: "ISS Fly-over".to_string(),
            calendar_id: "primary".to_string(),
            max_results: 20,
            reminders: vec![Reminder::popup(30), Reminder::popup(10)],
        }
    }
}

/// Walks the horizon one night at a time.
pub struct Planner<'a> {
    ephemeris: &'a dyn Ephemeris,
    location: Location,
    settings: &'a PlanSettings,
}

impl<'a> Planner<'a> {
    pub fn new(
        ephemeris: &'a dyn Ephemeris,
        location: Location,
        settings: &'a PlanSettings,
    ) -> Self {
        Self {
            ephemeris,
            location,
            settings,
        }
    }

    /// Compute the plan of the next `days` nights without touching any
    /// calendar. Exactly `days` entries are returned.
    pub fn plan(&self, now: DateTime<Utc>, days: u32) -> Vec<Result<DayPlan, FlyoverError>> {
        match DayWindowBuilder::new(self.ephemeris, &self.location, now, self.settings.bed_time) {
            Ok(builder) => (0..days).map(|day| self.plan_day(&builder, day)).collect(),
            Err(e) => {
                log::error!("No day windows: {}", e);
                (0..days)
                    .map(|_| Err(FlyoverError::DataUnavailable(anchor_failure(&e))))
                    .collect()
            }
        }
    }

    /// Full pipeline. Fails only when the baseline of existing events
    /// cannot be fetched; every per-day failure ends up in the report.
    pub fn run(
        &self,
        sink: &dyn CalendarSink,
        now: DateTime<Utc>,
    ) -> Result<RunReport, FlyoverError> {
        let existing = sink.list_upcoming_events(
            &self.settings.calendar_id,
            now,
            self.settings.max_results,
        )?;
        log::info!("{} upcoming events on the calendar", existing.len());

        let mut report = RunReport::default();
        let plans = self.plan(now, self.settings.horizon_days);
        for (day, plan) in (0u32..).zip(plans) {
            let report_day = match plan {
                Ok(plan) => {
                    let outcome = self.reconcile(sink, &existing, &plan);
                    DayReport {
                        day,
                        plan: Some(plan),
                        outcome,
                    }
                }
                Err(e) => {
                    log::error!("Day {}: {}", day, e);
                    DayReport {
                        day,
                        plan: None,
                        outcome: DayOutcome::DataUnavailable {
                            reason: e.to_string(),
                        },
                    }
                }
            };
            log::info!("Day {}: {}", day, report_day.outcome.label());
            log::info!("{}", "-".repeat(30));
            report.days.push(report_day);
        }

        log::info!("Run finished: {}", report.summary());
        Ok(report)
    }

    fn plan_day(&self, builder: &DayWindowBuilder, day: u32) -> Result<DayPlan, FlyoverError> {
        let window = builder.window(day).map_err(FlyoverError::DataUnavailable)?;
        log::info!("Sunset: {}", window.start);
        log::info!("Bedtime: {}", window.end);

        let events = find_pass_events(
            self.ephemeris,
            &self.location,
            &window,
            self.settings.min_elevation_deg,
        )
        .map_err(FlyoverError::DataUnavailable)?;

        let visible = visible_pass(&events);
        if let Some(pass) = &visible {
            let length = (pass.end - pass.start).to_std().unwrap_or_default();
            log::info!(
                "Visible {} pass at {} ({})",
                self.ephemeris.satellite_name(),
                pass.start,
                humantime::format_duration(length)
            );
        }

        Ok(DayPlan {
            day,
            window,
            events,
            visible,
        })
    }

    fn reconcile(
        &self,
        sink: &dyn CalendarSink,
        existing: &[ExistingEvent],
        plan: &DayPlan,
    ) -> DayOutcome {
        let Some(pass) = plan.visible else {
            return DayOutcome::NoVisiblePass;
        };

        let dedup = Deduplicator::new(&self.settings.event_title, existing);
        if let Some(recorded) = dedup.find(&pass) {
            log::info!("  ---> Already have it ({})", recorded.id);
            return DayOutcome::AlreadyRecorded {
                pass,
                event_id: recorded.id.clone(),
            };
        }

        log::info!("Creating event for {}", pass.start);
        let event = NewEvent {
            title: self.settings.event_title.clone(),
            start: pass.start,
            end: pass.end,
            reminders: self.settings.reminders.clone(),
        };
        match sink.insert_event(&self.settings.calendar_id, &event) {
            Ok(event) => DayOutcome::Inserted { pass, event },
            Err(e) => {
                log::error!("Failed to create event for {}: {}", pass.start, e);
                DayOutcome::InsertFailed {
                    pass,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Per-day copy of the error that kept the first sunset from being found.
fn anchor_failure(err: &PredictError) -> PredictError {
    match err {
        PredictError::NoSunset { start, end } => PredictError::NoSunset {
            start: start.clone(),
            end: end.clone(),
        },
        other => PredictError::InvalidWindow(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarError, InsertedEvent};
    use crate::predict::{DiscreteEvent, PassEventKind, SunEvent};
    use chrono::{Datelike, Duration, FixedOffset, TimeZone, Timelike};
    use chrono_tz::Tz;
    use std::cell::RefCell;

    const HONOLULU: Tz = chrono_tz::Pacific::Honolulu;

    fn maui() -> Location {
        Location::new(20.7644, -156.4450, 500.0, HONOLULU)
    }

    fn local(day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        HONOLULU
            .with_ymd_and_hms(2024, 6, day, h, m, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Fake provider: a sunset at 17:50 local every day, scripted passes,
    /// and days on which satellite queries fail.
    #[derive(Default)]
    struct FakeSky {
        passes: Vec<DiscreteEvent>,
        sunlit: Vec<DateTime<Utc>>,
        failing_days: Vec<u32>,
        no_sunset: bool,
    }

    impl FakeSky {
        fn with_pass(
            mut self,
            rise: DateTime<Utc>,
            culminate: DateTime<Utc>,
            set: DateTime<Utc>,
            sunlit: bool,
        ) -> Self {
            for (at, kind) in [
                (rise, PassEventKind::Rise),
                (culminate, PassEventKind::Culminate),
                (set, PassEventKind::Set),
            ] {
                self.passes.push(DiscreteEvent { at, kind });
                if sunlit {
                    self.sunlit.push(at);
                }
            }
            self
        }
    }

    impl Ephemeris for FakeSky {
        fn satellite_name(&self) -> &str {
            "ISS (ZARYA)"
        }

        fn sun_events(
            &self,
            _location: &Location,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<SunEvent>, PredictError> {
            if self.no_sunset {
                return Ok(Vec::new());
            }
            Ok((1..=30)
                .map(|d| SunEvent {
                    at: local(d, 17, 50, 0),
                    rising: false,
                })
                .filter(|e| e.at >= start && e.at <= end)
                .collect())
        }

        fn satellite_events(
            &self,
            _location: &Location,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            _min_elevation_deg: f64,
        ) -> Result<Vec<DiscreteEvent>, PredictError> {
            let day = start.with_timezone(&HONOLULU).day();
            if self.failing_days.contains(&day) {
                return Err(PredictError::Propagation("elements too old".into()));
            }
            Ok(self
                .passes
                .iter()
                .copied()
                .filter(|e| e.at >= start && e.at <= end)
                .collect())
        }

        fn is_sunlit(&self, at: DateTime<Utc>) -> Result<bool, PredictError> {
            Ok(self.sunlit.contains(&at))
        }
    }

    /// In-memory calendar recording every insert.
    #[derive(Default)]
    struct FakeCalendar {
        existing: RefCell<Vec<ExistingEvent>>,
        inserted: RefCell<Vec<NewEvent>>,
        fail_list: bool,
        fail_insert: bool,
    }

    impl FakeCalendar {
        /// Make the next run see what this one inserted.
        fn persist(&self) {
            let inserted = self.inserted.borrow();
            let mut existing = self.existing.borrow_mut();
            for (i, e) in inserted.iter().enumerate() {
                existing.push(ExistingEvent {
                    id: format!("saved-{}", i),
                    title: e.title.clone(),
                    start: e.start.fixed_offset(),
                });
            }
        }
    }

    impl CalendarSink for FakeCalendar {
        fn list_upcoming_events(
            &self,
            _calendar_id: &str,
            _not_before: DateTime<Utc>,
            _max_results: u32,
        ) -> Result<Vec<ExistingEvent>, CalendarError> {
            if self.fail_list {
                return Err(CalendarError::Api {
                    status: 401,
                    body: "invalid credentials".into(),
                });
            }
            Ok(self.existing.borrow().clone())
        }

        fn insert_event(
            &self,
            _calendar_id: &str,
            event: &NewEvent,
        ) -> Result<InsertedEvent, CalendarError> {
            if self.fail_insert {
                return Err(CalendarError::Api {
                    status: 503,
                    body: "backend error".into(),
                });
            }
            self.inserted.borrow_mut().push(event.clone());
            Ok(InsertedEvent {
                id: format!("new-{}", self.inserted.borrow().len()),
                html_link: None,
            })
        }
    }

    fn settings(horizon_days: u32) -> PlanSettings {
        PlanSettings {
            horizon_days,
            ..PlanSettings::default()
        }
    }

    fn now() -> DateTime<Utc> {
        local(1, 9, 0, 0)
    }

    fn scenario_sky() -> FakeSky {
        FakeSky::default().with_pass(
            local(1, 18, 2, 37),
            local(1, 18, 5, 10),
            local(1, 18, 8, 44),
            true,
        )
    }

    #[test]
    fn one_report_per_day_of_the_horizon() {
        let sky = FakeSky::default();
        for horizon in [1, 3, 10] {
            let settings = settings(horizon);
            let report = Planner::new(&sky, maui(), &settings)
                .run(&FakeCalendar::default(), now())
                .unwrap();
            assert_eq!(report.days.len(), horizon as usize);
            assert_eq!(report.no_visible_pass(), horizon as usize);
        }
    }

    #[test]
    fn sunlit_triple_is_inserted_at_minute_resolution() {
        let sky = scenario_sky();
        let settings = settings(1);
        let calendar = FakeCalendar::default();
        let report = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap();

        assert_eq!(report.inserted(), 1);
        let inserted = calendar.inserted.borrow();
        assert_eq!(inserted.len(), 1);
        let event = &inserted[0];
        assert_eq!(event.title, "ISS Fly-over");
        let hms = |t: &DateTime<Tz>| (t.hour(), t.minute(), t.second());
        assert_eq!(hms(&event.start), (18, 2, 0));
        assert_eq!(hms(&event.end), (18, 8, 0));
        assert_eq!(event.timezone(), "Pacific/Honolulu");
        assert_eq!(event.reminders, vec![Reminder::popup(30), Reminder::popup(10)]);
    }

    #[test]
    fn eclipsed_triple_is_never_inserted() {
        let sky = FakeSky::default().with_pass(
            local(1, 20, 2, 37),
            local(1, 20, 5, 10),
            local(1, 20, 8, 44),
            false,
        );
        let settings = settings(1);
        let calendar = FakeCalendar::default();
        let planner = Planner::new(&sky, maui(), &settings);

        for _ in 0..2 {
            let report = planner.run(&calendar, now()).unwrap();
            assert_eq!(report.inserted(), 0);
            assert_eq!(report.days[0].outcome, DayOutcome::NoVisiblePass);
        }
        assert!(calendar.inserted.borrow().is_empty());
    }

    #[test]
    fn partial_pass_yields_nothing_and_no_error() {
        let mut sky = scenario_sky();
        sky.passes.pop();
        let settings = settings(1);
        let calendar = FakeCalendar::default();
        let report = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap();

        let plan = report.days[0].plan.as_ref().unwrap();
        assert_eq!(plan.events.len(), 2);
        assert_eq!(plan.visible, None);
        assert_eq!(report.days[0].outcome, DayOutcome::NoVisiblePass);
        assert!(calendar.inserted.borrow().is_empty());
    }

    #[test]
    fn second_run_finds_the_first_runs_event() {
        let sky = scenario_sky();
        let settings = settings(1);
        let calendar = FakeCalendar::default();
        let planner = Planner::new(&sky, maui(), &settings);

        assert_eq!(planner.run(&calendar, now()).unwrap().inserted(), 1);
        calendar.persist();

        let second = planner.run(&calendar, now()).unwrap();
        assert_eq!(second.inserted(), 0);
        assert!(matches!(
            second.days[0].outcome,
            DayOutcome::AlreadyRecorded { ref event_id, .. } if event_id == "saved-0"
        ));
        assert_eq!(calendar.inserted.borrow().len(), 1);
    }

    #[test]
    fn recorded_event_in_another_offset_is_recognised() {
        let sky = scenario_sky();
        let settings = settings(1);
        // 18:02 HST == 04:02 UTC next day, stored with a +00:00 offset
        let utc = FixedOffset::east_opt(0).unwrap();
        let calendar = FakeCalendar {
            existing: RefCell::new(vec![ExistingEvent {
                id: "elsewhere".into(),
                title: "ISS Fly-over".into(),
                start: utc.with_ymd_and_hms(2024, 6, 2, 4, 2, 0).unwrap(),
            }]),
            ..FakeCalendar::default()
        };
        let report = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap();
        assert_eq!(report.inserted(), 0);
        assert_eq!(report.already_recorded(), 1);
    }

    #[test]
    fn failing_day_does_not_stop_later_days() {
        let mut sky = FakeSky::default().with_pass(
            local(3, 18, 30, 5),
            local(3, 18, 33, 0),
            local(3, 18, 36, 59),
            true,
        );
        sky.failing_days = vec![1, 2];
        let settings = settings(3);
        let calendar = FakeCalendar::default();
        let report = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap();

        assert_eq!(report.days.len(), 3);
        assert!(matches!(report.days[0].outcome, DayOutcome::DataUnavailable { .. }));
        assert!(matches!(report.days[1].outcome, DayOutcome::DataUnavailable { .. }));
        assert!(matches!(report.days[2].outcome, DayOutcome::Inserted { .. }));
        assert_eq!(calendar.inserted.borrow().len(), 1);
    }

    #[test]
    fn missing_sunset_marks_every_day_unavailable() {
        let sky = FakeSky {
            no_sunset: true,
            ..scenario_sky()
        };
        let settings = settings(4);
        let report = Planner::new(&sky, maui(), &settings)
            .run(&FakeCalendar::default(), now())
            .unwrap();
        assert_eq!(report.days.len(), 4);
        assert_eq!(report.data_unavailable(), 4);

        let plans = Planner::new(&sky, maui(), &settings).plan(now(), 4);
        assert!(plans.iter().all(|p| matches!(
            p,
            Err(FlyoverError::DataUnavailable(PredictError::NoSunset { .. }))
        )));
    }

    #[test]
    fn daytime_pass_is_not_taken_when_sunset_is_after_bedtime() {
        // Bedtime 17:30 is already past at the 17:50 sunset; the sunlit pass
        // the next morning must not count as a flyover of that night.
        let sky = FakeSky::default().with_pass(
            local(2, 10, 0, 5),
            local(2, 10, 3, 0),
            local(2, 10, 6, 40),
            true,
        );
        let settings = PlanSettings {
            horizon_days: 1,
            bed_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            ..PlanSettings::default()
        };
        let calendar = FakeCalendar::default();
        let report = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap();

        let plan = report.days[0].plan.as_ref().unwrap();
        assert_eq!(plan.window.start, plan.window.end);
        assert!(plan.events.is_empty());
        assert_eq!(report.days[0].outcome, DayOutcome::NoVisiblePass);
        assert!(calendar.inserted.borrow().is_empty());
    }

    #[test]
    fn baseline_fetch_failure_aborts_the_run() {
        let sky = scenario_sky();
        let settings = settings(2);
        let calendar = FakeCalendar {
            fail_list: true,
            ..FakeCalendar::default()
        };
        let err = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap_err();
        assert!(matches!(err, FlyoverError::SinkFailure(_)));
    }

    #[test]
    fn insert_failure_is_reported_per_day() {
        let sky = scenario_sky();
        let settings = settings(2);
        let calendar = FakeCalendar {
            fail_insert: true,
            ..FakeCalendar::default()
        };
        let report = Planner::new(&sky, maui(), &settings)
            .run(&calendar, now())
            .unwrap();
        assert_eq!(report.days.len(), 2);
        assert!(matches!(report.days[0].outcome, DayOutcome::InsertFailed { .. }));
        assert_eq!(report.days[1].outcome, DayOutcome::NoVisiblePass);
    }

    #[test]
    fn passes_outside_the_evening_window_are_ignored() {
        // Before sunset and after bedtime on the same day.
        let sky = FakeSky::default()
            .with_pass(local(1, 17, 0, 0), local(1, 17, 3, 0), local(1, 17, 6, 0), true)
            .with_pass(
                local(1, 23, 40, 0),
                local(1, 23, 43, 0),
                local(1, 23, 46, 0),
                true,
            );
        let settings = settings(1);
        let report = Planner::new(&sky, maui(), &settings)
            .run(&FakeCalendar::default(), now())
            .unwrap();
        assert_eq!(report.days[0].outcome, DayOutcome::NoVisiblePass);
        assert!(report.days[0].plan.as_ref().unwrap().events.is_empty());
    }

    #[test]
    fn plan_without_calendar_returns_requested_days() {
        let sky = scenario_sky();
        let settings = settings(10);
        let plans = Planner::new(&sky, maui(), &settings).plan(now(), 5);
        assert_eq!(plans.len(), 5);
        let first = plans[0].as_ref().unwrap();
        assert!(first.visible.is_some());
        let second = plans[1].as_ref().unwrap();
        assert_eq!(first.window.start + Duration::days(1), second.window.start);
    }
}
