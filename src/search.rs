// Round-loop search driver: seeds the origin, runs rounds until the round
// budget is spent or no stop is marked, and hands back every round's bags
// for journey reconstruction. Generalizes a `for k in 1..K` marked-stop
// fixed-point loop from a single scalar result to the full per-round bag
// history a Pareto search needs.

use crate::error::PlannerError;
use crate::label::{Bag, Label};
use crate::round::run_round;
use crate::timetable::{StationIdx, Timestamp, Timetable};
use crate::utils::is_zero;

/// Everything a range query needs to seed the next (earlier-departure)
/// search, per the rRAPTOR reuse trick.
#[derive(Clone)]
pub struct SearchState {
    rounds: Vec<Vec<Bag>>,
}

impl SearchState {
    pub fn final_bags(&self) -> &[Bag] {
        self.rounds.last().expect("a search always runs at least round 0")
    }

    /// Every round's bags, indexed `[k][stop]`, for backward reconstruction
    /// to recurse into the specific round a label was produced in.
    pub fn rounds(&self) -> &[Vec<Bag>] {
        &self.rounds
    }
}

pub struct SearchResult {
    pub origin: StationIdx,
    pub departure: Timestamp,
    pub state: SearchState,
}

/// Runs McRAPTOR from `origin` departing at `t_dep`, for up to `k_max`
/// rounds (trips). `seed`, when given, is a previous (later-departure)
/// search's result: its final bag is merged in as a passive pruning
/// threshold, never marked, so it only tightens dominance checks without
/// re-triggering route scans of its own — the monotonicity that makes
/// rRAPTOR's range-query reuse sound.
pub fn run_mcraptor(tt: &Timetable, origin: StationIdx, t_dep: Timestamp, k_max: usize, seed: Option<&SearchState>) -> Result<SearchResult, PlannerError> {
    if origin as usize >= tt.num_stations() {
        return Err(PlannerError::UnknownOrigin);
    }

    let num_stops = tt.num_stops();
    let mut round0 = vec![Bag::new(); num_stops];
    let mut marked = vec![false; num_stops];

    for &stop in tt.stops_of(origin) {
        if round0[stop as usize].add(Label::origin(stop, t_dep)) {
            marked[stop as usize] = true;
        }
    }

    if let Some(seed) = seed {
        for (stop, bag) in seed.final_bags().iter().enumerate() {
            round0[stop].merge(bag);
        }
    }

    let mut rounds = vec![round0];

    for _ in 1..=k_max {
        if is_zero(&marked) {
            break;
        }
        let mut this_round = rounds.last().unwrap().clone();
        marked = run_round(tt, &marked, rounds.last().unwrap(), &mut this_round);
        rounds.push(this_round);
    }

    Ok(SearchResult { origin, departure: t_dep, state: SearchState { rounds } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{build_timetable, Fare, RawStation, RawStop, RawTimetable, RawTrip, RawTripStopTime};

    fn line_of_three() -> Timetable {
        let stations = vec![
            RawStation { id: "A".into(), name: "Alpha".into() },
            RawStation { id: "B".into(), name: "Beta".into() },
            RawStation { id: "C".into(), name: "Gamma".into() },
        ];
        let stops = vec![
            RawStop { id: "A1".into(), name: "Alpha".into(), station_id: "A".into() },
            RawStop { id: "B1".into(), name: "Beta".into(), station_id: "B".into() },
            RawStop { id: "C1".into(), name: "Gamma".into(), station_id: "C".into() },
        ];
        let trips = vec![RawTrip {
            id: "T1".into(),
            headsign: None,
            hint: 0,
            stop_times: vec![
                RawTripStopTime { stop_id: "A1".into(), arrival: 0, departure: 0, fare: Fare::ZERO },
                RawTripStopTime { stop_id: "B1".into(), arrival: 300, departure: 300, fare: Fare(1.0) },
                RawTripStopTime { stop_id: "C1".into(), arrival: 600, departure: 600, fare: Fare(1.0) },
            ],
        }];
        build_timetable(RawTimetable { stations, stops, trips, transfers: vec![] }).unwrap()
    }

    #[test]
    fn reaches_destination_in_one_round() {
        let tt = line_of_three();
        let result = run_mcraptor(&tt, 0, 0, 5, None).unwrap();
        let dest_bag = &result.state.final_bags()[2];
        assert!(!dest_bag.is_empty());
        assert_eq!(dest_bag.as_slice()[0].num_trips, 1);
    }

    #[test]
    fn rejects_unknown_origin() {
        let tt = line_of_three();
        let err = run_mcraptor(&tt, 99, 0, 5, None).unwrap_err();
        assert!(matches!(err, PlannerError::UnknownOrigin));
    }
}
