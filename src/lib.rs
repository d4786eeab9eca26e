pub mod error;
pub mod timetable;

pub use timetable::{Timetable, TripStopTime};

pub mod label;

pub use label::{Bag, Label};

pub mod round;
pub mod search;

pub use search::{run_mcraptor, SearchResult, SearchState};

pub mod journey;

pub use journey::{reconstruct_journeys, Journey, JourneyError, Leg};

pub mod range;

pub use range::run_range_mcraptor;

#[cfg(feature = "parallel-range")]
pub use range::run_range_mcraptor_parallel;

pub mod gtfs;
pub mod fare;
pub mod persist;
pub mod utils;
