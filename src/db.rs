use futures::future::BoxFuture;
use time::Date;

use crate::aggregation::JoinedRow;
use crate::errors::BackendError;
use crate::listing::{AreaRow, SearchHit};
use crate::model::{
    Artist, ArtistEntry, ArtistSubmission, Id, NewShow, ShowListing, Venue, VenueSubmission,
};

pub mod mock;

/// Every query the routes need.
pub trait Db {
    fn venue_areas(&self, today: Date) -> BoxFuture<Result<Vec<AreaRow>, BackendError>>;

    fn search_venues(
        &self,
        term: String,
        today: Date,
    ) -> BoxFuture<Result<Vec<SearchHit>, BackendError>>;

    /// Returns one row per show at the venue, or a single row without a
    /// show if there are none. Returns nothing if the venue doesn't exist.
    fn venue_show_rows(&self, id: Id) -> BoxFuture<Result<Vec<JoinedRow<Venue>>, BackendError>>;

    fn insert_venue(&self, submission: VenueSubmission) -> BoxFuture<Result<Id, BackendError>>;

    fn update_venue(
        &self,
        id: Id,
        submission: VenueSubmission,
    ) -> BoxFuture<Result<(), BackendError>>;

    fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BackendError>>;

    fn artists(&self) -> BoxFuture<Result<Vec<ArtistEntry>, BackendError>>;

    fn search_artists(
        &self,
        term: String,
        today: Date,
    ) -> BoxFuture<Result<Vec<SearchHit>, BackendError>>;

    /// The artist counterpart of `venue_show_rows`.
    fn artist_show_rows(&self, id: Id)
        -> BoxFuture<Result<Vec<JoinedRow<Artist>>, BackendError>>;

    fn insert_artist(&self, submission: ArtistSubmission) -> BoxFuture<Result<Id, BackendError>>;

    fn update_artist(
        &self,
        id: Id,
        submission: ArtistSubmission,
    ) -> BoxFuture<Result<(), BackendError>>;

    fn delete_artist(&self, id: Id) -> BoxFuture<Result<(), BackendError>>;

    fn shows(&self) -> BoxFuture<Result<Vec<ShowListing>, BackendError>>;

    fn insert_show(&self, show: NewShow) -> BoxFuture<Result<Id, BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::postgres::{PgPool, PgRow};
    use sqlx::FromRow;
    use time::Date;

    use crate::aggregation::JoinedRow;
    use crate::errors::BackendError;
    use crate::listing::{like_pattern, AreaRow, SearchHit};
    use crate::model::{
        Artist, ArtistEntry, ArtistSubmission, Id, NewShow, ShowListing, Venue, VenueSubmission,
    };

    const SHOWS_VENUE_CONSTRAINT: &str = "shows_venue_id_fkey";
    const SHOWS_ARTIST_CONSTRAINT: &str = "shows_artist_id_fkey";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn venue_areas(&self, today: Date) -> BoxFuture<Result<Vec<AreaRow>, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, AreaRow>(include_str!("queries/venue_areas.sql"));

                let rows = query
                    .bind(today)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(rows)
            }
            .boxed()
        }

        fn search_venues(
            &self,
            term: String,
            today: Date,
        ) -> BoxFuture<Result<Vec<SearchHit>, BackendError>> {
            async move {
                let query =
                    sqlx::query_as::<_, SearchHit>(include_str!("queries/search_venues.sql"));

                let hits = query
                    .bind(like_pattern(&term))
                    .bind(today)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(hits)
            }
            .boxed()
        }

        fn venue_show_rows(
            &self,
            id: Id,
        ) -> BoxFuture<Result<Vec<JoinedRow<Venue>>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/venue_show_rows.sql"));

                let rows = query
                    .bind(id)
                    .try_map(joined_row::<Venue>)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(rows)
            }
            .boxed()
        }

        fn insert_venue(&self, submission: VenueSubmission) -> BoxFuture<Result<Id, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_venue.sql"));

                let (id,): (Id,) = query
                    .bind(submission.name)
                    .bind(submission.city)
                    .bind(submission.state)
                    .bind(submission.address)
                    .bind(submission.phone)
                    .bind(submission.genres)
                    .bind(submission.image_link.map(String::from))
                    .bind(submission.facebook_link.map(String::from))
                    .bind(submission.website.map(String::from))
                    .bind(submission.seeking_talent)
                    .bind(submission.seeking_description)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn update_venue(
            &self,
            id: Id,
            submission: VenueSubmission,
        ) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/update_venue.sql"));

                let count = query
                    .bind(id)
                    .bind(submission.name)
                    .bind(submission.city)
                    .bind(submission.state)
                    .bind(submission.address)
                    .bind(submission.phone)
                    .bind(submission.genres)
                    .bind(submission.image_link.map(String::from))
                    .bind(submission.facebook_link.map(String::from))
                    .bind(submission.website.map(String::from))
                    .bind(submission.seeking_talent)
                    .bind(submission.seeking_description)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentVenue(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/delete_venue.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        if violates(&e, SHOWS_VENUE_CONSTRAINT) {
                            BackendError::VenueHasShows(id)
                        } else {
                            map_sqlx_error(e)
                        }
                    })?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentVenue(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn artists(&self) -> BoxFuture<Result<Vec<ArtistEntry>, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, ArtistEntry>(include_str!("queries/artists.sql"));

                let artists = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

                Ok(artists)
            }
            .boxed()
        }

        fn search_artists(
            &self,
            term: String,
            today: Date,
        ) -> BoxFuture<Result<Vec<SearchHit>, BackendError>> {
            async move {
                let query =
                    sqlx::query_as::<_, SearchHit>(include_str!("queries/search_artists.sql"));

                let hits = query
                    .bind(like_pattern(&term))
                    .bind(today)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(hits)
            }
            .boxed()
        }

        fn artist_show_rows(
            &self,
            id: Id,
        ) -> BoxFuture<Result<Vec<JoinedRow<Artist>>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/artist_show_rows.sql"));

                let rows = query
                    .bind(id)
                    .try_map(joined_row::<Artist>)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(rows)
            }
            .boxed()
        }

        fn insert_artist(
            &self,
            submission: ArtistSubmission,
        ) -> BoxFuture<Result<Id, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_artist.sql"));

                let (id,): (Id,) = query
                    .bind(submission.name)
                    .bind(submission.city)
                    .bind(submission.state)
                    .bind(submission.phone)
                    .bind(submission.genres)
                    .bind(submission.image_link.map(String::from))
                    .bind(submission.facebook_link.map(String::from))
                    .bind(submission.website.map(String::from))
                    .bind(submission.seeking_venue)
                    .bind(submission.seeking_description)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn update_artist(
            &self,
            id: Id,
            submission: ArtistSubmission,
        ) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/update_artist.sql"));

                let count = query
                    .bind(id)
                    .bind(submission.name)
                    .bind(submission.city)
                    .bind(submission.state)
                    .bind(submission.phone)
                    .bind(submission.genres)
                    .bind(submission.image_link.map(String::from))
                    .bind(submission.facebook_link.map(String::from))
                    .bind(submission.website.map(String::from))
                    .bind(submission.seeking_venue)
                    .bind(submission.seeking_description)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentArtist(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn delete_artist(&self, id: Id) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/delete_artist.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        if violates(&e, SHOWS_ARTIST_CONSTRAINT) {
                            BackendError::ArtistHasShows(id)
                        } else {
                            map_sqlx_error(e)
                        }
                    })?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentArtist(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn shows(&self) -> BoxFuture<Result<Vec<ShowListing>, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, ShowListing>(include_str!("queries/shows.sql"));

                let shows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_show(&self, show: NewShow) -> BoxFuture<Result<Id, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert_show.sql"));

                let (id,): (Id,) = query
                    .bind(show.venue_id)
                    .bind(show.artist_id)
                    .bind(show.start_time)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| {
                        if violates(&e, SHOWS_VENUE_CONSTRAINT) {
                            BackendError::UnknownVenue(show.venue_id)
                        } else if violates(&e, SHOWS_ARTIST_CONSTRAINT) {
                            BackendError::UnknownArtist(show.artist_id)
                        } else {
                            map_sqlx_error(e)
                        }
                    })?;

                Ok(id)
            }
            .boxed()
        }
    }

    fn joined_row<E>(row: PgRow) -> Result<JoinedRow<E>, sqlx::Error>
    where E: for<'r> FromRow<'r, PgRow> {
        Ok(JoinedRow {
            entity: E::from_row(&row)?,
            counterpart_id: try_get(&row, "counterpart_id")?,
            counterpart_name: try_get(&row, "counterpart_name")?,
            counterpart_image_link: try_get(&row, "counterpart_image_link")?,
            start_time: try_get(&row, "start_time")?,
        })
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::Row;

        row.try_get(column)
    }

    fn violates(error: &sqlx::Error, constraint: &str) -> bool {
        match error {
            sqlx::Error::Database(e) => e.constraint() == Some(constraint),
            _ => false,
        }
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source: error }
    }
}
