mod catalog;
mod ephemeris;
mod error;
mod location;
mod pass_finder;
mod propagation;
mod search;
mod sun;
mod types;
mod visibility;
mod window;

pub use catalog::{Catalog, CatalogSource};
pub use ephemeris::{Ephemeris, Sgp4Ephemeris};
pub use error::PredictError;
pub use location::Location;
pub use pass_finder::find_pass_events;
pub use propagation::{satellite_look_angles, LookAngles};
pub use types::{DayWindow, DiscreteEvent, PassEvent, PassEventKind, SunEvent, VisiblePass};
pub use visibility::{truncate_to_minute, visible_pass};
pub use window::DayWindowBuilder;
