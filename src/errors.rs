use thiserror::Error;

use crate::model::Id;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a submission without a required field.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Represents a submitted field longer than its column allows.
    #[error("Field {field} is longer than {limit} characters")]
    FieldTooLong { field: &'static str, limit: usize },

    /// Represents a date that could not be read.
    #[error("Malformed date: {input:?}")]
    MalformedDate { input: String },

    /// Represents an attempt to modify a venue that doesn't exist.
    #[error("No venue with ID {0}")]
    NonExistentVenue(Id),

    /// Represents an attempt to modify an artist that doesn't exist.
    #[error("No artist with ID {0}")]
    NonExistentArtist(Id),

    /// Represents an attempt to delete a venue with scheduled shows.
    #[error("Venue {0} still has shows")]
    VenueHasShows(Id),

    /// Represents an attempt to delete an artist with scheduled shows.
    #[error("Artist {0} still has shows")]
    ArtistHasShows(Id),

    /// Represents a show referring to a venue that isn't registered.
    #[error("Venue {0} is not registered")]
    UnknownVenue(Id),

    /// Represents a show referring to an artist that isn't registered.
    #[error("Artist {0} is not registered")]
    UnknownArtist(Id),

    /// Represents an offset from UTC outside a single day.
    #[error("Invalid UTC offset: {0} minutes")]
    InvalidUtcOffset(i32),
}
