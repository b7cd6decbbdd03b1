use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{ready, BoxFuture};
use futures::FutureExt;
use time::Date;

use crate::aggregation::JoinedRow;
use crate::errors::BackendError;
use crate::listing::{AreaRow, SearchHit};
use crate::model::{
    Artist, ArtistEntry, ArtistSubmission, Id, NewShow, Show, ShowListing, Venue,
    VenueSubmission,
};

/// Keeps everything in memory. Behaves like `PgDb` as far as the routes
/// can tell.
#[derive(Default)]
pub struct MockDb {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    venues: BTreeMap<Id, Venue>,
    artists: BTreeMap<Id, Artist>,
    shows: BTreeMap<Id, Show>,
    last_venue_id: Id,
    last_artist_id: Id,
    last_show_id: Id,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    // Every write leaves `State` consistent, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn upcoming_shows(&self, today: Date, matches: impl Fn(&Show) -> bool) -> i64 {
        self.shows
            .values()
            .filter(|show| matches(show) && show.start_time >= today)
            .count() as i64
    }

    fn shows_sorted(&self, matches: impl Fn(&Show) -> bool) -> Vec<&Show> {
        let mut shows: Vec<&Show> = self.shows.values().filter(|show| matches(show)).collect();
        shows.sort_by_key(|show| (show.start_time, show.id));
        shows
    }
}

fn contains_ignoring_case(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.trim().to_lowercase())
}

fn by_name(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
    hits.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    hits
}

impl super::Db for MockDb {
    fn venue_areas(&self, today: Date) -> BoxFuture<Result<Vec<AreaRow>, BackendError>> {
        let state = self.read();

        let rows = state
            .venues
            .values()
            .map(|venue| AreaRow {
                id: venue.id,
                name: venue.name.clone(),
                city: venue.city.clone(),
                state: venue.state.clone(),
                num_upcoming_shows: state.upcoming_shows(today, |s| s.venue_id == venue.id),
            })
            .collect();

        ready(Ok(rows)).boxed()
    }

    fn search_venues(
        &self,
        term: String,
        today: Date,
    ) -> BoxFuture<Result<Vec<SearchHit>, BackendError>> {
        let state = self.read();

        let hits = state
            .venues
            .values()
            .filter(|venue| contains_ignoring_case(&venue.name, &term))
            .map(|venue| SearchHit {
                id: venue.id,
                name: venue.name.clone(),
                num_upcoming_shows: state.upcoming_shows(today, |s| s.venue_id == venue.id),
            })
            .collect();

        ready(Ok(by_name(hits))).boxed()
    }

    fn venue_show_rows(&self, id: Id) -> BoxFuture<Result<Vec<JoinedRow<Venue>>, BackendError>> {
        let state = self.read();

        let rows = match state.venues.get(&id) {
            None => vec![],
            Some(venue) => {
                let shows = state.shows_sorted(|s| s.venue_id == id);

                if shows.is_empty() {
                    vec![JoinedRow::without_show(venue.clone())]
                } else {
                    shows
                        .into_iter()
                        .map(|show| {
                            let artist = state.artists.get(&show.artist_id);

                            JoinedRow {
                                entity: venue.clone(),
                                counterpart_id: Some(show.artist_id),
                                counterpart_name: artist.map(|a| a.name.clone()),
                                counterpart_image_link: artist.and_then(|a| a.image_link.clone()),
                                start_time: Some(show.start_time),
                            }
                        })
                        .collect()
                }
            }
        };

        ready(Ok(rows)).boxed()
    }

    fn insert_venue(&self, submission: VenueSubmission) -> BoxFuture<Result<Id, BackendError>> {
        let mut state = self.write();

        state.last_venue_id += 1;
        let id = state.last_venue_id;
        state.venues.insert(id, submission.into_venue(id));

        ready(Ok(id)).boxed()
    }

    fn update_venue(
        &self,
        id: Id,
        submission: VenueSubmission,
    ) -> BoxFuture<Result<(), BackendError>> {
        let mut state = self.write();

        let result = match state.venues.get_mut(&id) {
            Some(venue) => {
                *venue = submission.into_venue(id);
                Ok(())
            }
            None => Err(BackendError::NonExistentVenue(id)),
        };

        ready(result).boxed()
    }

    fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BackendError>> {
        let mut state = self.write();

        let result = if !state.venues.contains_key(&id) {
            Err(BackendError::NonExistentVenue(id))
        } else if state.shows.values().any(|s| s.venue_id == id) {
            Err(BackendError::VenueHasShows(id))
        } else {
            state.venues.remove(&id);
            Ok(())
        };

        ready(result).boxed()
    }

    fn artists(&self) -> BoxFuture<Result<Vec<ArtistEntry>, BackendError>> {
        let artists = self
            .read()
            .artists
            .values()
            .map(|artist| ArtistEntry {
                id: artist.id,
                name: artist.name.clone(),
            })
            .collect();

        ready(Ok(artists)).boxed()
    }

    fn search_artists(
        &self,
        term: String,
        today: Date,
    ) -> BoxFuture<Result<Vec<SearchHit>, BackendError>> {
        let state = self.read();

        let hits = state
            .artists
            .values()
            .filter(|artist| contains_ignoring_case(&artist.name, &term))
            .map(|artist| SearchHit {
                id: artist.id,
                name: artist.name.clone(),
                num_upcoming_shows: state.upcoming_shows(today, |s| s.artist_id == artist.id),
            })
            .collect();

        ready(Ok(by_name(hits))).boxed()
    }

    fn artist_show_rows(
        &self,
        id: Id,
    ) -> BoxFuture<Result<Vec<JoinedRow<Artist>>, BackendError>> {
        let state = self.read();

        let rows = match state.artists.get(&id) {
            None => vec![],
            Some(artist) => {
                let shows = state.shows_sorted(|s| s.artist_id == id);

                if shows.is_empty() {
                    vec![JoinedRow::without_show(artist.clone())]
                } else {
                    shows
                        .into_iter()
                        .map(|show| {
                            let venue = state.venues.get(&show.venue_id);

                            JoinedRow {
                                entity: artist.clone(),
                                counterpart_id: Some(show.venue_id),
                                counterpart_name: venue.map(|v| v.name.clone()),
                                counterpart_image_link: venue.and_then(|v| v.image_link.clone()),
                                start_time: Some(show.start_time),
                            }
                        })
                        .collect()
                }
            }
        };

        ready(Ok(rows)).boxed()
    }

    fn insert_artist(&self, submission: ArtistSubmission) -> BoxFuture<Result<Id, BackendError>> {
        let mut state = self.write();

        state.last_artist_id += 1;
        let id = state.last_artist_id;
        state.artists.insert(id, submission.into_artist(id));

        ready(Ok(id)).boxed()
    }

    fn update_artist(
        &self,
        id: Id,
        submission: ArtistSubmission,
    ) -> BoxFuture<Result<(), BackendError>> {
        let mut state = self.write();

        let result = match state.artists.get_mut(&id) {
            Some(artist) => {
                *artist = submission.into_artist(id);
                Ok(())
            }
            None => Err(BackendError::NonExistentArtist(id)),
        };

        ready(result).boxed()
    }

    fn delete_artist(&self, id: Id) -> BoxFuture<Result<(), BackendError>> {
        let mut state = self.write();

        let result = if !state.artists.contains_key(&id) {
            Err(BackendError::NonExistentArtist(id))
        } else if state.shows.values().any(|s| s.artist_id == id) {
            Err(BackendError::ArtistHasShows(id))
        } else {
            state.artists.remove(&id);
            Ok(())
        };

        ready(result).boxed()
    }

    fn shows(&self) -> BoxFuture<Result<Vec<ShowListing>, BackendError>> {
        let state = self.read();

        let shows = state
            .shows_sorted(|_| true)
            .into_iter()
            .filter_map(|show| {
                let venue = state.venues.get(&show.venue_id)?;
                let artist = state.artists.get(&show.artist_id)?;

                Some(ShowListing {
                    venue_id: venue.id,
                    venue_name: venue.name.clone(),
                    artist_id: artist.id,
                    artist_name: artist.name.clone(),
                    artist_image_link: artist.image_link.clone(),
                    start_time: show.start_time,
                })
            })
            .collect();

        ready(Ok(shows)).boxed()
    }

    fn insert_show(&self, show: NewShow) -> BoxFuture<Result<Id, BackendError>> {
        let mut state = self.write();

        let result = if !state.venues.contains_key(&show.venue_id) {
            Err(BackendError::UnknownVenue(show.venue_id))
        } else if !state.artists.contains_key(&show.artist_id) {
            Err(BackendError::UnknownArtist(show.artist_id))
        } else {
            state.last_show_id += 1;
            let id = state.last_show_id;
            state.shows.insert(id, show.into_show(id));
            Ok(id)
        };

        ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use time::Date;

    use super::MockDb;
    use crate::db::Db;
    use crate::errors::BackendError;
    use crate::model::{NewShow, VenueSubmission};

    fn venue(name: &str) -> VenueSubmission {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "city": "San Francisco",
            "state": "CA",
            "address": "1015 Folsom Street",
        }))
        .unwrap()
    }

    #[test]
    fn venue_without_shows_has_one_empty_row() {
        let db = MockDb::new();
        let id = block_on(db.insert_venue(venue("The Musical Hop"))).unwrap();

        let rows = block_on(db.venue_show_rows(id)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity.name, "The Musical Hop");
        assert_eq!(rows[0].start_time, None);
        assert!(block_on(db.venue_show_rows(id + 1)).unwrap().is_empty());
    }

    #[test]
    fn a_panic_while_locked_does_not_break_later_calls() {
        let db = MockDb::new();
        block_on(db.insert_venue(venue("The Musical Hop"))).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = db.state.write().unwrap();
            panic!("poison the lock");
        }));
        assert!(result.is_err());
        assert!(db.state.is_poisoned());

        let id = block_on(db.insert_venue(venue("The Dueling Pianos Bar"))).unwrap();

        assert_eq!(id, 2);
        let today = Date::try_from_ymd(2021, 4, 10).unwrap();
        assert_eq!(block_on(db.venue_areas(today)).unwrap().len(), 2);
    }

    #[test]
    fn shows_need_registered_venues() {
        let db = MockDb::new();
        let show = NewShow {
            venue_id: 1,
            artist_id: 1,
            start_time: Date::try_from_ymd(2030, 1, 1).unwrap(),
        };

        assert!(matches!(
            block_on(db.insert_show(show)),
            Err(BackendError::UnknownVenue(1))
        ));
    }
}
