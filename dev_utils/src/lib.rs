// Synthetic benchmark fixture, shared by the benches and (if ever needed)
// examples. Builds a timetable directly through `RawTimetable`, since a
// hand-built fixture is enough to exercise the round loop and range driver
// without shipping a GTFS feed file.

use mc_transit_planner::timetable::{
    build_timetable, Fare, RawStation, RawStop, RawTimetable, RawTrip, RawTripStopTime, StationIdx, Timestamp,
};
use mc_transit_planner::Timetable;

const DAY_START: Timestamp = 6 * 3600;
const DAY_END: Timestamp = 22 * 3600;
const HEADWAY: Timestamp = 10 * 60;

/// Two routes crossing at a hub station ("Hub"), each stopping at three
/// outlying stations, with a transfer available at the hub. Enough trips
/// run across the service day to make round-scanning and range-query
/// reuse representative of a real feed.
pub fn build_example_timetable() -> Timetable {
    let stations = vec![
        RawStation { id: "north".into(), name: "North Terminal".into() },
        RawStation { id: "hub".into(), name: "Hub".into() },
        RawStation { id: "south".into(), name: "South Terminal".into() },
        RawStation { id: "east".into(), name: "East Terminal".into() },
        RawStation { id: "west".into(), name: "West Terminal".into() },
    ];
    let stops = vec![
        RawStop { id: "north-ns".into(), name: "North Terminal".into(), station_id: "north".into() },
        RawStop { id: "hub-ns".into(), name: "Hub".into(), station_id: "hub".into() },
        RawStop { id: "south-ns".into(), name: "South Terminal".into(), station_id: "south".into() },
        RawStop { id: "east-ew".into(), name: "East Terminal".into(), station_id: "east".into() },
        RawStop { id: "hub-ew".into(), name: "Hub".into(), station_id: "hub".into() },
        RawStop { id: "west-ew".into(), name: "West Terminal".into(), station_id: "west".into() },
    ];

    let mut trips = Vec::new();
    let mut dep = DAY_START;
    let mut trip_id = 0usize;
    while dep < DAY_END {
        trips.push(ns_trip(trip_id, dep));
        trip_id += 1;
        trips.push(ew_trip(trip_id, dep));
        trip_id += 1;
        dep += HEADWAY;
    }

    let transfers = vec![
        mc_transit_planner::timetable::RawTransfer { from_stop_id: "hub-ns".into(), to_stop_id: "hub-ew".into(), layover: 120 },
        mc_transit_planner::timetable::RawTransfer { from_stop_id: "hub-ew".into(), to_stop_id: "hub-ns".into(), layover: 120 },
    ];

    build_timetable(RawTimetable { stations, stops, trips, transfers }).expect("synthetic fixture is well-formed")
}

fn ns_trip(idx: usize, dep: Timestamp) -> RawTrip {
    RawTrip {
        id: format!("ns-{idx}"),
        headsign: Some("South Terminal".into()),
        hint: 0,
        stop_times: vec![
            RawTripStopTime { stop_id: "north-ns".into(), arrival: dep, departure: dep, fare: Fare(1.0) },
            RawTripStopTime { stop_id: "hub-ns".into(), arrival: dep + 600, departure: dep + 660, fare: Fare(1.0) },
            RawTripStopTime { stop_id: "south-ns".into(), arrival: dep + 1200, departure: dep + 1200, fare: Fare(1.0) },
        ],
    }
}

fn ew_trip(idx: usize, dep: Timestamp) -> RawTrip {
    RawTrip {
        id: format!("ew-{idx}"),
        headsign: Some("West Terminal".into()),
        hint: 0,
        stop_times: vec![
            RawTripStopTime { stop_id: "east-ew".into(), arrival: dep, departure: dep, fare: Fare(1.0) },
            RawTripStopTime { stop_id: "hub-ew".into(), arrival: dep + 500, departure: dep + 560, fare: Fare(1.0) },
            RawTripStopTime { stop_id: "west-ew".into(), arrival: dep + 1100, departure: dep + 1100, fare: Fare(1.0) },
        ],
    }
}

pub fn get_example_origin(tt: &Timetable) -> StationIdx {
    tt.station_idx("north").expect("fixture always has a North Terminal station")
}

pub fn get_example_destination(tt: &Timetable) -> StationIdx {
    tt.station_idx("west").expect("fixture always has a West Terminal station")
}

pub fn get_example_start_time() -> Timestamp {
    8 * 3600 + 30 * 60
}

pub fn get_example_window() -> (Timestamp, Timestamp) {
    (8 * 3600, 10 * 3600)
}

pub fn get_example_rounds() -> usize {
    5
}

pub fn get_example_scenario() -> (Timetable, StationIdx, Timestamp, StationIdx) {
    let tt = build_example_timetable();
    let origin = get_example_origin(&tt);
    let start_time = get_example_start_time();
    let destination = get_example_destination(&tt);
    (tt, origin, start_time, destination)
}
