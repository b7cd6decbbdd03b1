//! Turns the rows of an entity-to-shows outer join into one summary per
//! entity, splitting its shows into past and upcoming ones.
//!
//! The same code serves venues (whose shows name artists) and artists
//! (whose shows name venues); a [`Role`] picks the field names the
//! counterpart is reported under.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use time::Date;

use crate::dates::format_date;
use crate::model::Id;

/// A record that show rows are grouped under.
pub trait Entity {
    fn id(&self) -> Id;
}

/// The names the counterpart of a show is reported under.
#[derive(Debug, PartialEq, Eq)]
pub struct Role {
    pub counterpart_id: &'static str,
    pub counterpart_name: &'static str,
    pub counterpart_image_link: &'static str,
}

/// Venue summaries list the artists playing there.
pub const VENUE: Role = Role {
    counterpart_id: "artist_id",
    counterpart_name: "artist_name",
    counterpart_image_link: "artist_image_link",
};

/// Artist summaries list the venues they play at.
pub const ARTIST: Role = Role {
    counterpart_id: "venue_id",
    counterpart_name: "venue_name",
    counterpart_image_link: "venue_image_link",
};

/// One row of an entity outer-joined with its shows and their
/// counterparts. All the show fields are `None` when the entity has no
/// shows.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedRow<E> {
    pub entity: E,
    pub counterpart_id: Option<Id>,
    pub counterpart_name: Option<String>,
    pub counterpart_image_link: Option<String>,
    pub start_time: Option<Date>,
}

impl<E> JoinedRow<E> {
    /// A row for an entity without any shows.
    pub fn without_show(entity: E) -> Self {
        JoinedRow {
            entity,
            counterpart_id: None,
            counterpart_name: None,
            counterpart_image_link: None,
            start_time: None,
        }
    }
}

/// A show as seen from one side of it.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowEntry {
    role: &'static Role,
    pub counterpart_id: Option<Id>,
    pub counterpart_name: Option<String>,
    pub counterpart_image_link: Option<String>,
    pub start_time: Date,
}

impl Serialize for ShowEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(self.role.counterpart_id, &self.counterpart_id)?;
        map.serialize_entry(self.role.counterpart_name, &self.counterpart_name)?;
        map.serialize_entry(self.role.counterpart_image_link, &self.counterpart_image_link)?;
        map.serialize_entry("start_time", &format_date(self.start_time))?;
        map.end()
    }
}

/// An entity with its shows split around a date.
#[derive(Clone, Debug, Serialize)]
pub struct Summary<E> {
    #[serde(flatten)]
    pub entity: E,
    pub past_shows: Vec<ShowEntry>,
    pub upcoming_shows: Vec<ShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Default)]
struct Tally {
    past: Vec<ShowEntry>,
    upcoming: Vec<ShowEntry>,
}

impl Tally {
    fn into_summary<E>(self, entity: E) -> Summary<E> {
        Summary {
            entity,
            past_shows_count: self.past.len(),
            upcoming_shows_count: self.upcoming.len(),
            past_shows: self.past,
            upcoming_shows: self.upcoming,
        }
    }
}

/// Groups `rows` by entity ID and summarizes each group, in ascending ID
/// order. Shows before `today` are past; shows on or after it are
/// upcoming.
///
/// A row without a start time clears whatever its group has collected
/// so far.
pub fn aggregate<E: Entity>(
    rows: Vec<JoinedRow<E>>,
    role: &'static Role,
    today: Date,
) -> Vec<Summary<E>> {
    let mut groups: BTreeMap<Id, Vec<JoinedRow<E>>> = BTreeMap::new();

    for row in rows {
        groups.entry(row.entity.id()).or_default().push(row);
    }

    let mut summaries = Vec::with_capacity(groups.len());

    for (_, group) in groups {
        let mut entity = None;
        let mut tally = Tally::default();

        for row in group {
            let JoinedRow {
                entity: row_entity,
                counterpart_id,
                counterpart_name,
                counterpart_image_link,
                start_time,
            } = row;

            entity.get_or_insert(row_entity);

            let start_time = match start_time {
                Some(start_time) => start_time,
                None => {
                    tally = Tally::default();
                    continue;
                }
            };

            let entry = ShowEntry {
                role,
                counterpart_id,
                counterpart_name,
                counterpart_image_link,
                start_time,
            };

            if start_time < today {
                tally.past.push(entry);
            } else {
                tally.upcoming.push(entry);
            }
        }

        if let Some(entity) = entity {
            summaries.push(tally.into_summary(entity));
        }
    }

    summaries
}

/// Picks the summary for `id` out of `summaries`, if there is one.
pub fn find_summary<E: Entity>(summaries: Vec<Summary<E>>, id: Id) -> Option<Summary<E>> {
    summaries.into_iter().find(|summary| summary.entity.id() == id)
}
