// Multi-criteria labels and the Pareto-minimal bag that holds them.
// Generalizes a two-criterion (arrival_time, cost) label/bag pair to three
// criteria (arrival, fare, num_trips) and keeps a pointer back to how the
// label was reached instead of a single boarding record.

use crate::timetable::{Fare, StopIdx, Timestamp, TripIdx};

/// How a label's stop was reached, for backward journey reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRef {
    Origin(StopIdx),
    TripRef { trip: TripIdx, boarding_stop: StopIdx, alight_stop: StopIdx },
    TransferRef { from_stop: StopIdx, to_stop: StopIdx },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub arrival: Timestamp,
    pub fare: Fare,
    pub num_trips: u16,
    pub reference: LabelRef,
}

impl Label {
    pub fn origin(stop: StopIdx, departure: Timestamp) -> Self {
        Label { arrival: departure, fare: Fare::ZERO, num_trips: 0, reference: LabelRef::Origin(stop) }
    }

    /// Weak Pareto dominance: true if `self` is no worse than `other` on
    /// every criterion.
    pub fn dominates(&self, other: &Label) -> bool {
        self.arrival <= other.arrival && self.fare <= other.fare && self.num_trips <= other.num_trips
    }
}

/// A Pareto-minimal set of labels for a single stop and round.
#[derive(Debug, Clone, Default)]
pub struct Bag {
    pub labels: Vec<Label>,
}

impl Bag {
    pub const fn new() -> Self {
        Bag { labels: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.labels
    }

    /// Inserts `label`, dropping whatever it dominates. Returns whether the
    /// bag changed, so callers can use it as the "marked" signal.
    pub fn add(&mut self, label: Label) -> bool {
        if self.labels.iter().any(|existing| existing.dominates(&label)) {
            return false;
        }
        self.labels.retain(|existing| !label.dominates(existing));
        self.labels.push(label);
        true
    }

    pub fn merge(&mut self, other: &Bag) -> bool {
        let mut changed = false;
        for label in &other.labels {
            changed |= self.add(label.clone());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(arrival: Timestamp, fare: f32, num_trips: u16) -> Label {
        Label { arrival, fare: Fare(fare), num_trips, reference: LabelRef::Origin(0) }
    }

    #[test]
    fn keeps_non_dominated_labels() {
        let mut bag = Bag::new();
        assert!(bag.add(label(100, 2.0, 1)));
        assert!(bag.add(label(90, 3.0, 1)));
        assert_eq!(bag.as_slice().len(), 2);
    }

    #[test]
    fn drops_dominated_labels() {
        let mut bag = Bag::new();
        bag.add(label(100, 2.0, 1));
        assert!(bag.add(label(90, 1.0, 1)));
        assert_eq!(bag.as_slice().len(), 1);
        assert_eq!(bag.as_slice()[0].arrival, 90);
    }

    #[test]
    fn rejects_dominated_incoming_label() {
        let mut bag = Bag::new();
        bag.add(label(90, 1.0, 1));
        assert!(!bag.add(label(100, 2.0, 2)));
        assert_eq!(bag.as_slice().len(), 1);
    }
}
