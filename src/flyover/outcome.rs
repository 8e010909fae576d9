use serde::Serialize;
use utoipa::ToSchema;

use crate::calendar::InsertedEvent;
use crate::predict::{DayWindow, PassEvent, VisiblePass};

/// Everything computed for one night before the calendar is consulted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayPlan {
    pub day: u32,
    pub window: DayWindow,
    pub events: Vec<PassEvent>,
    pub visible: Option<VisiblePass>,
}

/// What happened to one day of the horizon.
#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    NoVisiblePass,
    AlreadyRecorded { pass: VisiblePass, event_id: String },
    Inserted { pass: VisiblePass, event: InsertedEvent },
    DataUnavailable { reason: String },
    /// Left for the next run to pick up again.
    InsertFailed { pass: VisiblePass, reason: String },
}

impl DayOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DayOutcome::NoVisiblePass => "no visible pass",
            DayOutcome::AlreadyRecorded { .. } => "already recorded",
            DayOutcome::Inserted { .. } => "inserted",
            DayOutcome::DataUnavailable { .. } => "data unavailable",
            DayOutcome::InsertFailed { .. } => "insert failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DayReport {
    pub day: u32,
    pub plan: Option<DayPlan>,
    pub outcome: DayOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub days: Vec<DayReport>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&DayOutcome) -> bool) -> usize {
        self.days.iter().filter(|d| pred(&d.outcome)).count()
    }

    pub fn inserted(&self) -> usize {
        self.count(|o| matches!(o, DayOutcome::Inserted { .. }))
    }

    pub fn already_recorded(&self) -> usize {
        self.count(|o| matches!(o, DayOutcome::AlreadyRecorded { .. }))
    }

    pub fn no_visible_pass(&self) -> usize {
        self.count(|o| matches!(o, DayOutcome::NoVisiblePass))
    }

    pub fn data_unavailable(&self) -> usize {
        self.count(|o| matches!(o, DayOutcome::DataUnavailable { .. }))
    }

    pub fn insert_failed(&self) -> usize {
        self.count(|o| matches!(o, DayOutcome::InsertFailed { .. }))
    }

    pub fn summary(&self) -> String {
        format!(
            "{} inserted, {} already recorded, {} no visible pass, {} data unavailable, {} insert failed",
            self.inserted(),
            self.already_recorded(),
            self.no_visible_pass(),
            self.data_unavailable(),
            self.insert_failed()
        )
    }
}
