// A single McRAPTOR round: route collection, route scan, transfer
// relaxation. Generalizes a scalar `tau`/`tau_star` array and a single
// "current boarding" scan loop to per-stop Pareto `Bag`s and a Pareto set
// of on-board boardings per route.

use crate::label::{Bag, Label, LabelRef};
use crate::timetable::{Route, RouteIdx, StopIdx, Timestamp, Timetable, TripIdx};

/// A trip currently being ridden while scanning a route, kept alongside
/// others that are Pareto-optimal on `(trip_order, fare, num_trips)`.
///
/// Trips on a route are FIFO (invariant enforced at ingestion), so an
/// earlier-or-equal trip index can never arrive later at any downstream
/// stop than a later trip index. That makes `trip_order` a valid stand-in
/// for arrival time when comparing on-board candidates, without tracking
/// the full future arrival-time vector of each trip.
#[derive(Clone, Copy)]
struct OnboardEntry {
    trip: TripIdx,
    trip_order: usize,
    boarding_stop: StopIdx,
    fare: crate::timetable::Fare,
    num_trips: u16,
}

impl OnboardEntry {
    fn dominates(&self, other: &OnboardEntry) -> bool {
        self.trip_order <= other.trip_order && self.fare <= other.fare && self.num_trips <= other.num_trips
    }
}

/// Phase 1: for every route serving a marked stop, the earliest
/// (lowest-index) marked stop on that route.
fn collect_routes_to_scan(tt: &Timetable, marked_stops: &[bool]) -> Vec<Option<usize>> {
    let mut earliest: Vec<Option<usize>> = vec![None; tt.num_routes()];
    for stop in marked_stops.iter().enumerate().filter_map(|(i, &m)| m.then_some(i as StopIdx)) {
        for &route in tt.routes_serving(stop) {
            if let Some(pos) = tt.stop_index_in_route(route, stop) {
                let slot = &mut earliest[route as usize];
                *slot = Some(slot.map_or(pos, |existing| existing.min(pos)));
            }
        }
    }
    earliest
}

/// Earliest trip on `route` departing `stop_order` at or after
/// `not_before`, found by binary search: FIFO guarantees trips sorted by
/// departure at stop 0 stay sorted at every later stop.
fn earliest_boardable_trip(tt: &Timetable, route: &Route, stop_order: usize, not_before: Timestamp) -> Option<(usize, TripIdx)> {
    let trips = &route.trips;
    let mut lo = 0usize;
    let mut hi = trips.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        let departure = tt.stop_time_at(trips[mid], stop_order).departure;
        if departure < not_before {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    (lo < trips.len()).then(|| (lo, trips[lo]))
}

/// Phase 2: scan every route collected in phase 1, alighting before
/// boarding at each stop. `prev_round` is the best bag known going into
/// this round (B_{k-1}); `this_round` accumulates this round's
/// improvements (B_k). Returns the stops newly marked by route scanning.
fn scan_routes(tt: &Timetable, marked_stops: &[bool], prev_round: &[Bag], this_round: &mut [Bag]) -> Vec<bool> {
    let mut newly_marked = vec![false; tt.num_stops()];

    for (route_idx, earliest_order) in collect_routes_to_scan(tt, marked_stops)
        .into_iter()
        .enumerate()
        .filter_map(|(i, o)| o.map(|order| (i as RouteIdx, order)))
    {
        let route = tt.route(route_idx);
        let mut onboard: Vec<OnboardEntry> = Vec::new();

        for (stop_order, &stop) in route.stops.iter().enumerate().skip(earliest_order) {
            // a) Alight: every on-board candidate may improve the bag at this stop.
            for entry in &onboard {
                let stop_time = tt.stop_time_at(entry.trip, stop_order);
                let label = Label {
                    arrival: stop_time.arrival,
                    fare: entry.fare + stop_time.fare,
                    num_trips: entry.num_trips,
                    reference: LabelRef::TripRef { trip: entry.trip, boarding_stop: entry.boarding_stop, alight_stop: stop },
                };
                let dominated = prev_round[stop as usize]
                    .as_slice()
                    .iter()
                    .chain(this_round[stop as usize].as_slice())
                    .any(|existing| existing.dominates(&label));
                if !dominated && this_round[stop as usize].add(label) {
                    newly_marked[stop as usize] = true;
                }
            }

            // b) Board: every label reachable from the previous round at this
            // stop may start (or restart onto) a trip on this route.
            for source in prev_round[stop as usize].as_slice() {
                if let Some((trip_order, trip)) = earliest_boardable_trip(tt, route, stop_order, source.arrival) {
                    let candidate = OnboardEntry {
                        trip,
                        trip_order,
                        boarding_stop: stop,
                        fare: source.fare,
                        num_trips: source.num_trips + 1,
                    };
                    if !onboard.iter().any(|existing| existing.dominates(&candidate)) {
                        onboard.retain(|existing| !candidate.dominates(existing));
                        onboard.push(candidate);
                    }
                }
            }
        }
    }

    newly_marked
}

/// Phase 3: relax intra-station transfers out of every stop newly marked
/// by the route scan. One hop only — footpaths never chain; intra-station
/// transfers are the only kind this planner models.
fn relax_transfers(tt: &Timetable, newly_marked: &[bool], this_round: &mut [Bag]) -> Vec<bool> {
    let mut marked = newly_marked.to_vec();
    let snapshot: Vec<Bag> = this_round.to_vec();

    for stop in 0..tt.num_stops() {
        if !newly_marked[stop] {
            continue;
        }
        for transfer in tt.transfers_from(stop as StopIdx) {
            for label in snapshot[stop].as_slice() {
                let relaxed = Label {
                    arrival: label.arrival.saturating_add(transfer.layover),
                    fare: label.fare,
                    num_trips: label.num_trips,
                    reference: LabelRef::TransferRef { from_stop: stop as StopIdx, to_stop: transfer.to_stop },
                };
                if this_round[transfer.to_stop as usize].add(relaxed) {
                    marked[transfer.to_stop as usize] = true;
                }
            }
        }
    }
    marked
}

/// Runs one full McRAPTOR round and returns the stops marked for the next
/// round.
pub fn run_round(tt: &Timetable, marked_stops: &[bool], prev_round: &[Bag], this_round: &mut [Bag]) -> Vec<bool> {
    let newly_marked = scan_routes(tt, marked_stops, prev_round, this_round);
    relax_transfers(tt, &newly_marked, this_round)
}
