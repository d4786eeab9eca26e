// Fare supplement hook: a pluggable rule invoked per stop-time during
// ingestion, plus the reference "ICD fare" rule: a flat intercity-direct
// surcharge keyed off a trip's fare-rule hint.

use crate::timetable::{Fare, Stop, Timetable, Trip};

pub type FareHook = dyn Fn(&Trip, &Stop, &Timetable) -> Fare + Send + Sync;

const ICD_FARE: Fare = Fare(1.67);

/// ICD (intercity-direct) supplement: applies a flat surcharge to trips
/// whose `hint` falls in 900..=1099, charged only at the Schiphol Airport
/// end for even hints and the Rotterdam Centraal end for odd hints. The
/// even/odd split and the two station names are reference-rule constants,
/// not configurable.
pub fn icd_fare_hook(trip: &Trip, stop: &Stop, tt: &Timetable) -> Fare {
    if !(900..=1099).contains(&trip.hint) {
        return Fare::ZERO;
    }

    let station_name = &*tt.station(stop.station).name;
    let applies = if trip.hint % 2 == 0 { station_name == "Schiphol Airport" } else { station_name == "Rotterdam Centraal" };

    if applies {
        ICD_FARE
    } else {
        Fare::ZERO
    }
}
