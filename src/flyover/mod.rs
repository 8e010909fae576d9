mod error;
mod outcome;
mod planner;

pub use error::FlyoverError;
pub use outcome::{DayOutcome, DayPlan, DayReport, RunReport};
pub use planner::{PlanSettings, Planner};
