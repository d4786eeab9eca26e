// Builds a Timetable from a GTFS feed: filters trips by agency and
// service calendar, splits stops from their parent stations, and
// generates intra-station transfers. `gtfs_structures`'s `Calendar`/
// `Trip`/`Stop` types already parse dates, booleans and HH:MM:SS times,
// so day-of-week filtering is a plain `chrono::Datelike::weekday()` match.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use gtfs_structures::Gtfs;

use crate::error::GtfsError;
use crate::fare::FareHook;
use crate::timetable::{
    build_timetable as compile_timetable, RawStation, RawStop, RawTimetable, RawTrip, RawTripStopTime, Timestamp, Timetable,
};

fn calendar_runs_on(calendar: &gtfs_structures::Calendar, date: NaiveDate) -> bool {
    if date < calendar.start_date || date > calendar.end_date {
        return false;
    }
    match date.weekday() {
        Weekday::Mon => calendar.monday,
        Weekday::Tue => calendar.tuesday,
        Weekday::Wed => calendar.wednesday,
        Weekday::Thu => calendar.thursday,
        Weekday::Fri => calendar.friday,
        Weekday::Sat => calendar.saturday,
        Weekday::Sun => calendar.sunday,
    }
}

/// Builds a `Timetable` from `gtfs`, keeping only trips of `agencies` that
/// run on `service_date`, with a flat `transfer_cost` applied between every
/// pair of platforms sharing a station. `fare_hook`, if given, is applied
/// once the timetable is fully assembled (see `Timetable::apply_fare_hook`).
pub fn build_timetable(
    gtfs: &Gtfs,
    service_date: NaiveDate,
    agencies: &[String],
    transfer_cost: Timestamp,
    fare_hook: Option<&FareHook>,
) -> Result<Timetable, GtfsError> {
    log::info!("building timetable for {service_date} from {} GTFS trips", gtfs.trips.len());

    let agency_names: HashSet<&str> = agencies.iter().map(String::as_str).collect();
    let agency_ids: HashSet<&str> = gtfs
        .agencies
        .iter()
        .filter(|a| agency_names.contains(a.name.as_str()))
        .filter_map(|a| a.id.as_deref())
        .collect();

    let route_ids: HashSet<&str> = gtfs
        .routes
        .values()
        .filter(|r| r.agency_id.as_deref().is_some_and(|id| agency_ids.contains(id)))
        .map(|r| r.route_id.as_str())
        .collect();

    let accepted_trips: Vec<&gtfs_structures::Trip> = gtfs
        .trips
        .values()
        .filter(|trip| route_ids.contains(trip.route_id.as_str()))
        .filter(|trip| {
            gtfs.calendar.get(&trip.service_id).is_some_and(|calendar| calendar_runs_on(calendar, service_date))
        })
        .collect();

    if accepted_trips.is_empty() {
        log::warn!("no trips matched agencies {agencies:?} on {service_date}");
    }

    // Stops referenced by an accepted trip, plus their parent stations.
    let mut used_stop_ids: HashSet<&str> = HashSet::new();
    for trip in &accepted_trips {
        for st in &trip.stop_times {
            used_stop_ids.insert(st.stop.id.as_str());
        }
    }
    let mut used_station_ids: HashSet<&str> = HashSet::new();
    for &id in &used_stop_ids {
        if let Some(stop) = gtfs.stops.get(id) {
            if let Some(parent) = stop.parent_station.as_deref() {
                used_station_ids.insert(parent);
            }
        }
    }

    let mut stations = Vec::new();
    for id in &used_station_ids {
        let gtfs_stop = gtfs.stops.get(*id).ok_or_else(|| GtfsError::MissingStopTime((*id).into()))?;
        stations.push(RawStation { id: (*id).to_string(), name: gtfs_stop.name.clone().unwrap_or_default() });
    }

    let mut stops = Vec::new();
    for &id in &used_stop_ids {
        let gtfs_stop = gtfs.stops.get(id).expect("collected from accepted trips");
        let Some(parent) = gtfs_stop.parent_station.as_deref() else {
            // A parent-less stop used directly by a trip has no station of
            // its own in this model; skip it rather than fabricate one.
            log::warn!("stop {id} has no parent_station, skipping (not part of any station)");
            continue;
        };
        stops.push(RawStop { id: id.to_string(), name: gtfs_stop.name.clone().unwrap_or_default(), station_id: parent.to_string() });
    }

    let mut trips = Vec::with_capacity(accepted_trips.len());
    for trip in &accepted_trips {
        let mut stop_times: Vec<_> = trip.stop_times.iter().collect();
        stop_times.sort_unstable_by_key(|st| st.stop_sequence);

        let mut raw_stop_times = Vec::with_capacity(stop_times.len());
        for st in stop_times {
            let arrival = st.arrival_time.ok_or_else(|| GtfsError::MissingStopTime(trip.id.as_str().into()))?;
            let departure = st.departure_time.ok_or_else(|| GtfsError::MissingStopTime(trip.id.as_str().into()))?;
            if !used_stop_ids.contains(st.stop.id.as_str()) {
                continue;
            }
            if gtfs.stops[st.stop.id.as_str()].parent_station.is_none() {
                continue;
            }
            raw_stop_times.push(RawTripStopTime { stop_id: st.stop.id.clone(), arrival, departure, fare: crate::timetable::Fare::ZERO });
        }
        if raw_stop_times.len() < 2 {
            continue;
        }

        trips.push(RawTrip {
            id: trip.id.clone(),
            headsign: trip.trip_headsign.clone(),
            // GTFS carries no column for this hint; a real feed never
            // triggers the ICD fare rule unless something downstream
            // annotates the trip afterward. See DESIGN.md.
            hint: 0,
            stop_times: raw_stop_times,
        });
    }

    let mut transfers = Vec::new();
    for station in &stations {
        let station_stops: Vec<&RawStop> = stops.iter().filter(|s| s.station_id == station.id).collect();
        for &from in &station_stops {
            for &to in &station_stops {
                if from.id != to.id {
                    transfers.push(crate::timetable::RawTransfer {
                        from_stop_id: from.id.clone(),
                        to_stop_id: to.id.clone(),
                        layover: transfer_cost,
                    });
                }
            }
        }
    }

    let mut timetable = compile_timetable(RawTimetable { stations, stops, trips, transfers })?;

    if let Some(hook) = fare_hook {
        timetable.apply_fare_hook(hook);
    }

    log::info!(
        "timetable built: {} stations, {} stops, {} routes, {} trips",
        timetable.num_stations(),
        timetable.num_stops(),
        timetable.num_routes(),
        accepted_trips.len()
    );

    Ok(timetable)
}
