// Range-query driver: runs McRAPTOR once per candidate departure within a
// window, descending chronologically and reusing each search's final bag
// to seed the next, earlier one.

use std::collections::HashMap;

use crate::error::PlannerError;
use crate::journey::{reconstruct_journeys, Journey, JourneyError};
use crate::search::{run_mcraptor, SearchState};
use crate::timetable::{StationIdx, Timestamp, Timetable};

/// Runs McRAPTOR once per distinct candidate departure time in `window`,
/// descending chronologically so each search can seed the next with the
/// previous one's final bag. Returns, per destination station id, the
/// deduplicated union of Pareto-optimal journeys found across all
/// departures.
pub fn run_range_mcraptor(tt: &Timetable, origin: StationIdx, window: (Timestamp, Timestamp), k_max: usize) -> Result<HashMap<Box<str>, Vec<Journey>>, PlannerError> {
    if origin as usize >= tt.num_stations() {
        return Err(PlannerError::UnknownOrigin);
    }

    let mut departures = candidate_departures(tt, origin, window);
    departures.reverse(); // descending: each search seeds the next earlier one

    let mut results: HashMap<Box<str>, Vec<Journey>> = HashMap::new();
    let mut seed: Option<SearchState> = None;

    for (i, &t_dep) in departures.iter().enumerate() {
        log::info!("range query: processing departure {}/{} ({t_dep})", i + 1, departures.len());

        let search = run_mcraptor(tt, origin, t_dep, k_max, seed.as_ref())?;
        collect_journeys(tt, &search, origin, &mut results)?;
        seed = Some(search.state);
    }

    Ok(results)
}

fn candidate_departures(tt: &Timetable, origin: StationIdx, window: (Timestamp, Timestamp)) -> Vec<Timestamp> {
    let origin_stops = tt.stops_of(origin);
    let mut departures: Vec<Timestamp> = tt.trip_stop_times_in_range(origin_stops, window).into_iter().map(|st| st.departure).collect();
    departures.sort_unstable();
    departures.dedup();
    departures
}

fn collect_journeys(tt: &Timetable, search: &crate::search::SearchResult, origin: StationIdx, results: &mut HashMap<Box<str>, Vec<Journey>>) -> Result<(), PlannerError> {
    for (destination, station) in tt.stations() {
        if destination == origin {
            continue;
        }
        match reconstruct_journeys(tt, search, destination) {
            Ok(journeys) => {
                let entry = results.entry(station.id.clone()).or_default();
                for journey in journeys {
                    if !entry.iter().any(|existing| journeys_equal(existing, &journey)) {
                        entry.push(journey);
                    }
                }
            }
            Err(JourneyError::NoJourneyFound) => {}
            Err(e) => return Err(PlannerError::InternalInconsistency(e.to_string())),
        }
    }
    Ok(())
}

fn journeys_equal(a: &Journey, b: &Journey) -> bool {
    a.departure_time == b.departure_time
        && a.arrival_time == b.arrival_time
        && a.num_transfers == b.num_transfers
        && a.fare == b.fare
        && a.legs.len() == b.legs.len()
        && a.legs.iter().zip(b.legs.iter()).all(|(x, y)| {
            x.route == y.route && x.from_stop == y.from_stop && x.to_stop == y.to_stop && x.departure == y.departure && x.arrival == y.arrival
        })
}

/// Feature-gated alternative that processes departures in parallel instead
/// of chronologically seeding each search from the last. Trades the
/// rRAPTOR reuse optimization for independent, embarrassingly-parallel
/// searches (spec's concurrency note, option (a): simplicity over a
/// strict-ordering seed-sharing scheme across workers — see DESIGN.md).
#[cfg(feature = "parallel-range")]
pub fn run_range_mcraptor_parallel(tt: &Timetable, origin: StationIdx, window: (Timestamp, Timestamp), k_max: usize) -> Result<HashMap<Box<str>, Vec<Journey>>, PlannerError> {
    use rayon::prelude::*;

    if origin as usize >= tt.num_stations() {
        return Err(PlannerError::UnknownOrigin);
    }

    let departures = candidate_departures(tt, origin, window);

    let per_departure: Vec<HashMap<Box<str>, Vec<Journey>>> = departures
        .into_par_iter()
        .map(|t_dep| -> Result<_, PlannerError> {
            let search = run_mcraptor(tt, origin, t_dep, k_max, None)?;
            let mut found = HashMap::new();
            collect_journeys(tt, &search, origin, &mut found)?;
            Ok(found)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut results: HashMap<Box<str>, Vec<Journey>> = HashMap::new();
    for found in per_departure {
        for (destination, journeys) in found {
            let entry = results.entry(destination).or_default();
            for journey in journeys {
                if !entry.iter().any(|existing| journeys_equal(existing, &journey)) {
                    entry.push(journey);
                }
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{build_timetable, Fare, RawStation, RawStop, RawTimetable, RawTrip, RawTripStopTime};

    fn two_departures_line() -> Timetable {
        let stations = vec![
            RawStation { id: "A".into(), name: "Alpha".into() },
            RawStation { id: "B".into(), name: "Beta".into() },
        ];
        let stops = vec![
            RawStop { id: "A1".into(), name: "Alpha".into(), station_id: "A".into() },
            RawStop { id: "B1".into(), name: "Beta".into(), station_id: "B".into() },
        ];
        let trip = |id: &str, dep: Timestamp| RawTrip {
            id: id.to_string(),
            headsign: None,
            hint: 0,
            stop_times: vec![
                RawTripStopTime { stop_id: "A1".into(), arrival: dep, departure: dep, fare: Fare::ZERO },
                RawTripStopTime { stop_id: "B1".into(), arrival: dep + 300, departure: dep + 300, fare: Fare::ZERO },
            ],
        };
        build_timetable(RawTimetable {
            stations,
            stops,
            trips: vec![trip("early", 0), trip("late", 600)],
            transfers: vec![],
        })
        .unwrap()
    }

    #[test]
    fn finds_journeys_for_every_departure_in_window() {
        let tt = two_departures_line();
        let results = run_range_mcraptor(&tt, 0, (0, 600), 5).unwrap();
        let beta = results.get("B").unwrap();
        assert_eq!(beta.len(), 2);
    }
}
