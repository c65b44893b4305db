use std::collections::HashMap;

use chrono::NaiveDate;

use crate::data::records::MovementRecord;

/// Chronological replay order over a borrowed record set.
///
/// Single pass; call [`build_timeline`] again to restart.
#[derive(Debug)]
pub struct Timeline<'a> {
    order: std::vec::IntoIter<&'a MovementRecord>,
}

impl<'a> Iterator for Timeline<'a> {
    type Item = &'a MovementRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.order.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for Timeline<'_> {}

/// Sort ascending by start date. Ties keep input order.
pub fn build_timeline(records: &[MovementRecord]) -> Timeline<'_> {
    let mut order: Vec<&MovementRecord> = records.iter().collect();
    order.sort_by_key(|r| r.start_date);
    Timeline {
        order: order.into_iter(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub location_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// How a timeline record relates to what is already known about its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind<'s> {
    /// First sighting of the entity.
    Placement,
    /// Movement from the entity's previous location.
    Transition { from: &'s str },
}

impl EntryKind<'_> {
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

/// Last known placement per entity. Keys are unique entity ids.
#[derive(Clone, Debug, Default)]
pub struct EntityState {
    last: HashMap<String, Placement>,
}

impl EntityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record of an entity seen before is a transition, open-ended spans included.
    pub fn classify(&self, rec: &MovementRecord) -> EntryKind<'_> {
        match self.last.get(&rec.entity_id) {
            Some(prev) => EntryKind::Transition {
                from: &prev.location_name,
            },
            None => EntryKind::Placement,
        }
    }

    /// Overwrite the entity's placement with `rec`.
    pub fn record(&mut self, rec: &MovementRecord) -> Option<Placement> {
        self.last.insert(
            rec.entity_id.clone(),
            Placement {
                location_name: rec.location_name.clone(),
                start_date: rec.start_date,
                end_date: rec.end_date,
            },
        )
    }

    pub fn get(&self, entity_id: &str) -> Option<&Placement> {
        self.last.get(entity_id)
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
