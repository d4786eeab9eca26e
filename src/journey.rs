// Backward reconstruction of concrete journeys from a finished search.
// Generalizes a single `tau_star` pointer-array backward walk to Pareto
// bags keyed by `LabelRef`, keeping the same `MAX_LEGS` infinite-loop
// guard idiom.

use serde::Serialize;

use crate::label::{Bag, Label, LabelRef};
use crate::search::SearchResult;
use crate::timetable::{Fare, RouteIdx, StationIdx, StopIdx, Timestamp, Timetable, TripIdx};

const MAX_LEGS: usize = 100;

#[derive(thiserror::Error, Debug)]
pub enum JourneyError {
    #[error("no journey found to the requested destination")]
    NoJourneyFound,
    #[error("infinite loop in journey reconstruction")]
    InfiniteLoop,
    #[error("journey reconstruction could not find a matching precursor label")]
    BrokenChain,
}

#[derive(Debug, Clone)]
pub struct Leg {
    pub route: Option<RouteIdx>,
    pub trip: Option<TripIdx>,
    pub from_stop: StopIdx,
    pub to_stop: StopIdx,
    pub departure: Timestamp,
    pub arrival: Timestamp,
}

#[derive(Debug, Clone)]
pub struct Journey {
    pub legs: Vec<Leg>,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub total_duration: Timestamp,
    pub num_transfers: u16,
    pub fare: Fare,
}

#[derive(Debug, Serialize)]
pub struct LegSerialized {
    pub route_id: String,
    pub from_stop: String,
    pub to_stop: String,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct JourneySerialized {
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub total_duration: Timestamp,
    pub num_transfers: u16,
    pub legs: Vec<LegSerialized>,
}

impl Journey {
    pub fn serialize(&self, tt: &Timetable) -> JourneySerialized {
        JourneySerialized {
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            total_duration: self.total_duration,
            num_transfers: self.num_transfers,
            legs: self
                .legs
                .iter()
                .map(|leg| LegSerialized {
                    route_id: leg.route.map_or_else(|| "transfer".to_string(), |r| tt.route(r).id.to_string()),
                    from_stop: tt.stop(leg.from_stop).id.to_string(),
                    to_stop: tt.stop(leg.to_stop).id.to_string(),
                    departure_time: leg.departure,
                    arrival_time: leg.arrival,
                })
                .collect(),
        }
    }
}

/// Finds a label at `stop` matching the criteria a backward step expects:
/// an exact `(num_trips, fare)` class and an arrival no later than the
/// connection being reconstructed. Because a `Bag` is Pareto-minimal, at
/// most one label per distinct `(fare, num_trips)` pair can coexist at a
/// stop, so ties (multiple candidates satisfying the arrival bound) are
/// vanishingly rare in practice; the first match is taken rather than
/// building out a dedicated tie-break pass.
fn find_precursor<'a>(bags: &'a [Bag], stop: StopIdx, num_trips: u16, fare: Fare, not_after: Timestamp) -> Option<&'a Label> {
    bags[stop as usize]
        .as_slice()
        .iter()
        .find(|label| label.num_trips == num_trips && label.fare == fare && label.arrival <= not_after)
}

/// Walks a label back to its origin, one leg per step. `rounds` is the full
/// per-round bag history; `round_idx` is the round the label currently under
/// consideration was produced in. A `TripRef` step was produced by boarding
/// against the *previous* round's bag (`B_{k-1}`), so it recurses into
/// `rounds[round_idx - 1]`; a `TransferRef` step was relaxed within the same
/// round's bag, so it stays at `rounds[round_idx]`. Searching only the final
/// round's bag for every step (as if `B_{k-1}` and `B_k` always agreed) would
/// risk splicing in a label from the wrong round whenever a stop is reached
/// at the same `num_trips` in more than one round.
fn walk_back(tt: &Timetable, rounds: &[Vec<Bag>], round_idx: usize, label: &Label) -> Result<Vec<Leg>, JourneyError> {
    let mut legs = Vec::new();
    let mut current = label.clone();
    let mut k = round_idx;
    let mut num_legs = 0usize;

    loop {
        match current.reference {
            LabelRef::Origin(_) => break,
            LabelRef::TripRef { trip, boarding_stop, alight_stop } => {
                let route = tt.trip(trip).route;
                let board_order = tt.stop_index_in_route(route, boarding_stop).ok_or(JourneyError::BrokenChain)?;
                let alight_order = tt.stop_index_in_route(route, alight_stop).ok_or(JourneyError::BrokenChain)?;
                let board_time = tt.stop_time_at(trip, board_order);
                let alight_time = tt.stop_time_at(trip, alight_order);

                legs.push(Leg {
                    route: Some(route),
                    trip: Some(trip),
                    from_stop: boarding_stop,
                    to_stop: alight_stop,
                    departure: board_time.departure,
                    arrival: alight_time.arrival,
                });

                let prev_fare = Fare(current.fare.0 - alight_time.fare.0);
                let prev_num_trips = current.num_trips - 1;
                k = k.checked_sub(1).ok_or(JourneyError::BrokenChain)?;
                current = find_precursor(&rounds[k], boarding_stop, prev_num_trips, prev_fare, board_time.departure)
                    .ok_or(JourneyError::BrokenChain)?
                    .clone();
            }
            LabelRef::TransferRef { from_stop, to_stop } => {
                let layover = tt
                    .transfers_from(from_stop)
                    .iter()
                    .find(|t| t.to_stop == to_stop)
                    .map(|t| t.layover)
                    .ok_or(JourneyError::BrokenChain)?;

                legs.push(Leg {
                    route: None,
                    trip: None,
                    from_stop,
                    to_stop,
                    departure: current.arrival.saturating_sub(layover),
                    arrival: current.arrival,
                });

                let not_after = current.arrival.saturating_sub(layover);
                current = find_precursor(&rounds[k], from_stop, current.num_trips, current.fare, not_after)
                    .ok_or(JourneyError::BrokenChain)?
                    .clone();
            }
        }

        num_legs += 1;
        if num_legs > MAX_LEGS {
            return Err(JourneyError::InfiniteLoop);
        }
    }

    legs.reverse();
    Ok(legs)
}

fn finish(label: &Label, legs: Vec<Leg>) -> Journey {
    let departure_time = legs.first().map_or(label.arrival, |leg| leg.departure);
    let arrival_time = legs.last().map_or(label.arrival, |leg| leg.arrival);
    let num_transfers = legs.iter().filter(|leg| leg.route.is_some()).count().saturating_sub(1) as u16;
    Journey {
        legs,
        departure_time,
        arrival_time,
        total_duration: arrival_time.saturating_sub(departure_time),
        num_transfers,
        fare: label.fare,
    }
}

/// Reconstructs every Pareto-optimal journey from the search's origin to
/// any stop in `destination`, merging the destination station's stops
/// into one Pareto front first.
pub fn reconstruct_journeys(tt: &Timetable, result: &SearchResult, destination: StationIdx) -> Result<Vec<Journey>, JourneyError> {
    let rounds = result.state.rounds();
    let final_round_idx = rounds.len() - 1;
    let final_bags = &rounds[final_round_idx];
    let mut merged = Bag::new();
    for &stop in tt.stops_of(destination) {
        merged.merge(&final_bags[stop as usize]);
    }

    if merged.is_empty() {
        return Err(JourneyError::NoJourneyFound);
    }

    merged
        .as_slice()
        .iter()
        .map(|label| walk_back(tt, rounds, final_round_idx, label).map(|legs| finish(label, legs)))
        .collect()
}
