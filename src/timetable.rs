// The immutable timetable: stations, stops, routes and trips, laid out as
// owned arrays cross-referenced by integer index rather than shared
// pointers, built via a `build_timetable` entry point fed by whichever
// ingestion collaborator (GTFS feed, test fixture) produced the `Raw*`
// records below.

use std::collections::HashMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::TimetableError;

pub type Timestamp = u32;
pub type StationIdx = u32;
pub type StopIdx = u32;
pub type TripIdx = u32;
pub type RouteIdx = u32;

/// Fare amount. Wrapped rather than a bare `f32` so labels can order and
/// deduplicate on it; fares are always derived from quantized fare rules, so
/// NaN never occurs in practice and `total_cmp` gives us a real total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fare(pub f32);

impl Fare {
    pub const ZERO: Fare = Fare(0.0);
}

impl Eq for Fare {}

impl PartialOrd for Fare {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fare {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Fare {
    type Output = Fare;
    fn add(self, rhs: Fare) -> Fare {
        Fare(self.0 + rhs.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: Box<str>,
    pub name: Box<str>,
    pub stops: Vec<StopIdx>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: Box<str>,
    pub name: Box<str>,
    pub station: StationIdx,
    pub routes: Vec<RouteIdx>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Box<str>,
    pub route: RouteIdx,
    pub headsign: Option<Box<str>>,
    /// Fare-rule lookup key. Not present in GTFS; derived at ingestion time
    /// (see `gtfs::derive_hint`).
    pub hint: i32,
    pub stop_times_start: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TripStopTime {
    pub trip: TripIdx,
    pub seq: u32,
    pub stop: StopIdx,
    pub arrival: Timestamp,
    pub departure: Timestamp,
    pub fare: Fare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Box<str>,
    /// Ordered stop pattern shared by every trip on this route.
    pub stops: Vec<StopIdx>,
    /// Trips on this route, sorted by departure time at `stops[0]`.
    pub trips: Vec<TripIdx>,
}

impl Route {
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transfer {
    pub from_stop: StopIdx,
    pub to_stop: StopIdx,
    pub layover: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    stations: Vec<Station>,
    stops: Vec<Stop>,
    routes: Vec<Route>,
    trips: Vec<Trip>,
    trip_stop_times: Vec<TripStopTime>,
    transfers: Vec<Transfer>,
    /// CSR-style offsets into `transfers`, indexed by `StopIdx`; length is
    /// `stops.len() + 1`.
    transfer_index: Vec<u32>,
    station_index: HashMap<Box<str>, StationIdx>,
    stop_index: HashMap<Box<str>, StopIdx>,
}

impl Timetable {
    pub fn station(&self, id: StationIdx) -> &Station {
        &self.stations[id as usize]
    }

    pub fn stations(&self) -> impl Iterator<Item = (StationIdx, &Station)> {
        self.stations.iter().enumerate().map(|(i, s)| (i as StationIdx, s))
    }

    pub fn station_idx(&self, id: &str) -> Option<StationIdx> {
        self.station_index.get(id).copied()
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn stop(&self, id: StopIdx) -> &Stop {
        &self.stops[id as usize]
    }

    pub fn stop_idx(&self, id: &str) -> Option<StopIdx> {
        self.stop_index.get(id).copied()
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn stops_of(&self, station: StationIdx) -> &[StopIdx] {
        &self.station(station).stops
    }

    pub fn routes_serving(&self, stop: StopIdx) -> &[RouteIdx] {
        &self.stop(stop).routes
    }

    pub fn route(&self, id: RouteIdx) -> &Route {
        &self.routes[id as usize]
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn trip(&self, id: TripIdx) -> &Trip {
        &self.trips[id as usize]
    }

    pub fn stop_index_in_route(&self, route: RouteIdx, stop: StopIdx) -> Option<usize> {
        self.route(route).stops.iter().position(|&s| s == stop)
    }

    /// The stop-times of a trip, in stop order.
    pub fn trip_stop_times(&self, trip: TripIdx) -> &[TripStopTime] {
        let t = self.trip(trip);
        let len = self.route(t.route).num_stops();
        &self.trip_stop_times[t.stop_times_start..t.stop_times_start + len]
    }

    pub fn stop_time_at(&self, trip: TripIdx, idx: usize) -> &TripStopTime {
        &self.trip_stop_times(trip)[idx]
    }

    pub fn transfers_from(&self, stop: StopIdx) -> &[Transfer] {
        let start = self.transfer_index[stop as usize] as usize;
        let end = self.transfer_index[stop as usize + 1] as usize;
        &self.transfers[start..end]
    }

    /// All stop-times departing any of `stops` within `window` (inclusive),
    /// used by the range driver to enumerate candidate departures. A plain
    /// scan is fine at the scale this planner targets; a real-time feed
    /// would index stop-times by stop instead.
    pub fn trip_stop_times_in_range(&self, stops: &[StopIdx], window: (Timestamp, Timestamp)) -> Vec<&TripStopTime> {
        let (from, to) = window;
        self.trip_stop_times
            .iter()
            .filter(|st| stops.contains(&st.stop) && st.departure >= from && st.departure <= to)
            .collect()
    }

    /// Recomputes every stop-time's fare via `hook`. Run once, after
    /// construction, so the hook can see the fully assembled timetable
    /// (trip/stop/route lookups) while computing each charge.
    pub fn apply_fare_hook(&mut self, hook: &crate::fare::FareHook) {
        let new_fares: Vec<Fare> = {
            let this: &Timetable = self;
            this.trip_stop_times
                .iter()
                .map(|st| hook(&this.trips[st.trip as usize], &this.stops[st.stop as usize], this))
                .collect()
        };
        for (st, fare) in self.trip_stop_times.iter_mut().zip(new_fares) {
            st.fare = fare;
        }
    }
}

// --- Ingestion-facing raw records -----------------------------------------
//
// Intermediate, GTFS-agnostic records. `gtfs.rs` builds these from a
// `gtfs_structures::Gtfs` feed; tests build them directly to exercise the
// planner without a feed fixture.

#[derive(Debug, Clone)]
pub struct RawStation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RawStop {
    pub id: String,
    pub name: String,
    pub station_id: String,
}

#[derive(Debug, Clone)]
pub struct RawTripStopTime {
    pub stop_id: String,
    pub arrival: Timestamp,
    pub departure: Timestamp,
    pub fare: Fare,
}

#[derive(Debug, Clone)]
pub struct RawTrip {
    pub id: String,
    pub headsign: Option<String>,
    pub hint: i32,
    pub stop_times: Vec<RawTripStopTime>,
}

#[derive(Debug, Clone)]
pub struct RawTransfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub layover: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct RawTimetable {
    pub stations: Vec<RawStation>,
    pub stops: Vec<RawStop>,
    pub trips: Vec<RawTrip>,
    pub transfers: Vec<RawTransfer>,
}

/// Validates and compiles a `RawTimetable` into the arena-backed
/// `Timetable`, grouping trips into routes by identical ordered stop
/// pattern.
pub fn build_timetable(raw: RawTimetable) -> Result<Timetable, TimetableError> {
    let mut station_index = HashMap::with_capacity(raw.stations.len());
    let mut stations = Vec::with_capacity(raw.stations.len());
    for s in &raw.stations {
        let id: Box<str> = s.id.as_str().into();
        if station_index.insert(id.clone(), stations.len() as StationIdx).is_some() {
            return Err(TimetableError::DuplicateStation(id));
        }
        stations.push(Station { id, name: s.name.as_str().into(), stops: Vec::new() });
    }

    let mut stop_index = HashMap::with_capacity(raw.stops.len());
    let mut stops = Vec::with_capacity(raw.stops.len());
    for s in &raw.stops {
        let id: Box<str> = s.id.as_str().into();
        let station = *station_index
            .get(s.station_id.as_str())
            .ok_or_else(|| TimetableError::UnknownStation(s.station_id.as_str().into()))?;
        if stop_index.insert(id.clone(), stops.len() as StopIdx).is_some() {
            return Err(TimetableError::DuplicateStop(id));
        }
        let stop_idx = stops.len() as StopIdx;
        stations[station as usize].stops.push(stop_idx);
        stops.push(Stop { id, name: s.name.as_str().into(), station, routes: Vec::new() });
    }

    let resolve_stop = |id: &str| -> Result<StopIdx, TimetableError> {
        stop_index.get(id).copied().ok_or_else(|| TimetableError::UnknownStop(id.into()))
    };

    // Group trips by their ordered stop-id pattern.
    let mut route_of_pattern: HashMap<Vec<StopIdx>, usize> = HashMap::new();
    let mut route_trips: Vec<Vec<&RawTrip>> = Vec::new();
    let mut route_patterns: Vec<Vec<StopIdx>> = Vec::new();

    for trip in &raw.trips {
        if trip.stop_times.is_empty() {
            return Err(TimetableError::EmptyRoute(trip.id.as_str().into()));
        }
        let mut prev_departure = None;
        let mut pattern = Vec::with_capacity(trip.stop_times.len());
        for st in &trip.stop_times {
            if st.arrival > st.departure {
                return Err(TimetableError::NonMonotonicTrip {
                    trip: trip.id.as_str().into(),
                    stop_order: pattern.len(),
                });
            }
            if let Some(prev) = prev_departure {
                if st.arrival < prev {
                    return Err(TimetableError::NonMonotonicTrip {
                        trip: trip.id.as_str().into(),
                        stop_order: pattern.len(),
                    });
                }
            }
            prev_departure = Some(st.departure);
            pattern.push(resolve_stop(&st.stop_id)?);
        }

        let route_idx = *route_of_pattern.entry(pattern.clone()).or_insert_with(|| {
            route_trips.push(Vec::new());
            route_patterns.push(pattern.clone());
            route_trips.len() - 1
        });
        route_trips[route_idx].push(trip);
    }

    // Assemble the trip-stop-time arena and route/trip arrays.
    let mut routes = Vec::with_capacity(route_trips.len());
    let mut trips = Vec::with_capacity(raw.trips.len());
    let mut trip_stop_times = Vec::new();

    for (route_idx, trips_in_route) in route_trips.into_iter().enumerate() {
        let pattern = &route_patterns[route_idx];
        let mut ordered: Vec<&RawTrip> = trips_in_route;
        ordered.sort_unstable_by_key(|t| t.stop_times[0].departure);

        // FIFO / non-overtaking: trips sorted by departure at stop 0 must
        // also be sorted (non-decreasing) at every later stop.
        for window in ordered.windows(2) {
            let (earlier, later) = (window[0], window[1]);
            for (i, (e, l)) in earlier.stop_times.iter().zip(later.stop_times.iter()).enumerate() {
                if l.departure < e.departure {
                    return Err(TimetableError::NotFifo {
                        route: format!("route#{route_idx}").into(),
                        earlier: earlier.id.as_str().into(),
                        later: later.id.as_str().into(),
                        stop_order: i,
                    });
                }
            }
        }

        let mut trip_idxs = Vec::with_capacity(ordered.len());
        for raw_trip in ordered {
            let trip_idx = trips.len() as TripIdx;
            let stop_times_start = trip_stop_times.len();
            for (seq, st) in raw_trip.stop_times.iter().enumerate() {
                trip_stop_times.push(TripStopTime {
                    trip: trip_idx,
                    seq: seq as u32,
                    stop: pattern[seq],
                    arrival: st.arrival,
                    departure: st.departure,
                    fare: st.fare,
                });
            }
            trips.push(Trip {
                id: raw_trip.id.as_str().into(),
                route: route_idx as RouteIdx,
                headsign: raw_trip.headsign.as_deref().map(Into::into),
                hint: raw_trip.hint,
                stop_times_start,
            });
            trip_idxs.push(trip_idx);
        }

        for &stop in pattern.iter() {
            stops[stop as usize].routes.push(route_idx as RouteIdx);
        }

        routes.push(Route {
            id: format!("route#{route_idx}").into(),
            stops: pattern.clone(),
            trips: trip_idxs,
        });
    }

    // Transfers, grouped into a CSR layout by `from_stop`.
    let mut transfers = Vec::with_capacity(raw.transfers.len());
    for t in &raw.transfers {
        transfers.push(Transfer {
            from_stop: resolve_stop(&t.from_stop_id)?,
            to_stop: resolve_stop(&t.to_stop_id)?,
            layover: t.layover,
        });
    }
    transfers.sort_unstable_by_key(|t| t.from_stop);

    let mut transfer_index = vec![0u32; stops.len() + 1];
    for t in &transfers {
        transfer_index[t.from_stop as usize + 1] += 1;
    }
    for i in 1..transfer_index.len() {
        transfer_index[i] += transfer_index[i - 1];
    }

    Ok(Timetable {
        stations,
        stops,
        routes,
        trips,
        trip_stop_times,
        transfers,
        transfer_index,
        station_index,
        stop_index,
    })
}
