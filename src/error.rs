// Error types for the planner. Each stage of the pipeline (ingestion,
// search, persistence) gets its own enum; `PlannerError` is the top-level
// error the CLI and library entry points surface.

#[derive(thiserror::Error, Debug)]
pub enum TimetableError {
    #[error("stop {0} is not part of any station")]
    OrphanStop(Box<str>),
    #[error("route {0} has no trips")]
    EmptyRoute(Box<str>),
    #[error("trip {trip} has non-monotonic stop times at stop_order {stop_order}")]
    NonMonotonicTrip { trip: Box<str>, stop_order: usize },
    #[error("route {route} is not FIFO: trip {later} departs before trip {earlier} at stop_order {stop_order}")]
    NotFifo { route: Box<str>, earlier: Box<str>, later: Box<str>, stop_order: usize },
    #[error("duplicate stop id: {0}")]
    DuplicateStop(Box<str>),
    #[error("duplicate station id: {0}")]
    DuplicateStation(Box<str>),
    #[error("unknown station reference: {0}")]
    UnknownStation(Box<str>),
    #[error("unknown stop reference: {0}")]
    UnknownStop(Box<str>),
}

#[derive(thiserror::Error, Debug)]
pub enum GtfsError {
    #[error("failed to read GTFS feed: {0}")]
    Read(#[from] gtfs_structures::Error),
    #[error("stop_time for trip {0} is missing arrival or departure time")]
    MissingStopTime(Box<str>),
    #[error("malformed HH:MM:SS time: {0}")]
    BadTime(Box<str>),
    #[error(transparent)]
    Timetable(#[from] TimetableError),
}

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timetable snapshot not found: {path}")]
    ResourceMissing { path: Box<str> },
    #[error("failed to encode timetable snapshot: {0}")]
    Encode(Box<bincode::ErrorKind>),
    #[error("failed to decode timetable snapshot: {0}")]
    Decode(Box<bincode::ErrorKind>),
}

#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown origin stop")]
    UnknownOrigin,
    #[error("unknown destination stop")]
    UnknownDestination,
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
    #[error(transparent)]
    Timetable(#[from] TimetableError),
    #[error(transparent)]
    Gtfs(#[from] GtfsError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
