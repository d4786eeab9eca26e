// Timetable persistence: a byte-for-byte round trip via serde + bincode.
// `bincode` is the compact binary codec idiomatic alongside serde for
// this kind of whole-struct snapshot.

use std::fs;
use std::path::Path;

use crate::error::PersistError;
use crate::timetable::Timetable;

const SNAPSHOT_FILE: &str = "timetable.bin";

pub fn write_timetable(dir: &Path, tt: &Timetable) -> Result<(), PersistError> {
    fs::create_dir_all(dir)?;
    let bytes = bincode::serialize(tt).map_err(PersistError::Encode)?;
    fs::write(dir.join(SNAPSHOT_FILE), bytes)?;
    Ok(())
}

pub fn read_timetable(dir: &Path) -> Result<Timetable, PersistError> {
    let path = dir.join(SNAPSHOT_FILE);
    if !path.exists() {
        return Err(PersistError::ResourceMissing { path: path.to_string_lossy().into_owned().into_boxed_str() });
    }
    let bytes = fs::read(&path)?;
    let tt = bincode::deserialize(&bytes).map_err(PersistError::Decode)?;
    Ok(tt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{build_timetable, Fare, RawStation, RawStop, RawTimetable, RawTrip, RawTripStopTime};

    fn sample_timetable() -> Timetable {
        build_timetable(RawTimetable {
            stations: vec![RawStation { id: "A".into(), name: "Alpha".into() }],
            stops: vec![RawStop { id: "A1".into(), name: "Alpha".into(), station_id: "A".into() }],
            trips: vec![],
            transfers: vec![],
        })
        .unwrap()
    }

    #[test]
    fn round_trips_through_a_temp_directory() {
        let dir = std::env::temp_dir().join(format!("mc-transit-planner-test-{}", std::process::id()));
        let tt = sample_timetable();

        write_timetable(&dir, &tt).unwrap();
        let restored = read_timetable(&dir).unwrap();

        assert_eq!(restored.num_stations(), tt.num_stations());
        assert_eq!(restored.num_stops(), tt.num_stops());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_snapshot_is_reported_as_resource_missing() {
        let dir = std::env::temp_dir().join(format!("mc-transit-planner-missing-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let err = read_timetable(&dir).unwrap_err();
        assert!(matches!(err, PersistError::ResourceMissing { .. }));
    }
}
