use serde::{Deserialize, Serialize};
use time::Date;
use url::Url;

use crate::aggregation::Entity;
use crate::dates;
use crate::errors::BackendError;
use crate::normalization;

/// An ID in the database.
pub type Id = i32;

// Column widths in the migrations.
const PLACE_LIMIT: usize = 120;
const PHONE_LIMIT: usize = 20;
const TEXT_LIMIT: usize = 500;

/// A place that hosts shows.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Venue {
    pub id: Id,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl Entity for Venue {
    fn id(&self) -> Id {
        self.id
    }
}

/// A performer who plays shows.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Artist {
    pub id: Id,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl Entity for Artist {
    fn id(&self) -> Id {
        self.id
    }
}

/// An artist booked at a venue on a date.
#[derive(Clone, Debug, PartialEq)]
pub struct Show {
    pub id: Id,
    pub venue_id: Id,
    pub artist_id: Id,
    pub start_time: Date,
}

/// A show with the names of the venue and artist involved.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct ShowListing {
    pub venue_id: Id,
    pub venue_name: String,
    pub artist_id: Id,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(serialize_with = "dates::serialize")]
    pub start_time: Date,
}

/// The bare minimum needed to list an artist.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct ArtistEntry {
    pub id: Id,
    pub name: String,
}

/// The user-submitted fields of a venue.
#[derive(Clone, Debug, Deserialize)]
pub struct VenueSubmission {
    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) name: String,

    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) city: String,

    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) state: String,

    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) address: String,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub(crate) phone: Option<String>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_genres")]
    pub(crate) genres: Vec<String>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_link")]
    pub(crate) image_link: Option<Url>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_link")]
    pub(crate) facebook_link: Option<Url>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_link")]
    pub(crate) website: Option<Url>,

    #[serde(default)]
    pub(crate) seeking_talent: bool,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub(crate) seeking_description: Option<String>,
}

impl VenueSubmission {
    pub fn validate(&self) -> Result<(), BackendError> {
        require("name", &self.name)?;
        require("city", &self.city)?;
        require("state", &self.state)?;
        require("address", &self.address)?;

        limit("city", Some(self.city.as_str()), PLACE_LIMIT)?;
        limit("state", Some(self.state.as_str()), PLACE_LIMIT)?;
        limit("address", Some(self.address.as_str()), PLACE_LIMIT)?;
        limit("phone", self.phone.as_deref(), PHONE_LIMIT)?;
        limit("image_link", self.image_link.as_ref().map(Url::as_str), TEXT_LIMIT)?;
        limit("facebook_link", self.facebook_link.as_ref().map(Url::as_str), TEXT_LIMIT)?;
        limit("website", self.website.as_ref().map(Url::as_str), TEXT_LIMIT)?;
        limit("seeking_description", self.seeking_description.as_deref(), TEXT_LIMIT)
    }

    /// Builds the record this submission describes.
    pub fn into_venue(self, id: Id) -> Venue {
        Venue {
            id,
            name: self.name,
            city: self.city,
            state: self.state,
            address: self.address,
            phone: self.phone,
            genres: self.genres,
            image_link: self.image_link.map(String::from),
            facebook_link: self.facebook_link.map(String::from),
            website: self.website.map(String::from),
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description,
        }
    }
}

/// The user-submitted fields of an artist.
#[derive(Clone, Debug, Deserialize)]
pub struct ArtistSubmission {
    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) name: String,

    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) city: String,

    #[serde(deserialize_with = "normalization::deserialize")]
    pub(crate) state: String,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub(crate) phone: Option<String>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_genres")]
    pub(crate) genres: Vec<String>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_link")]
    pub(crate) image_link: Option<Url>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_link")]
    pub(crate) facebook_link: Option<Url>,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_link")]
    pub(crate) website: Option<Url>,

    #[serde(default)]
    pub(crate) seeking_venue: bool,

    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub(crate) seeking_description: Option<String>,
}

impl ArtistSubmission {
    pub fn validate(&self) -> Result<(), BackendError> {
        require("name", &self.name)?;
        require("city", &self.city)?;
        require("state", &self.state)?;

        limit("city", Some(self.city.as_str()), PLACE_LIMIT)?;
        limit("state", Some(self.state.as_str()), PLACE_LIMIT)?;
        limit("phone", self.phone.as_deref(), PHONE_LIMIT)?;
        limit("image_link", self.image_link.as_ref().map(Url::as_str), TEXT_LIMIT)?;
        limit("facebook_link", self.facebook_link.as_ref().map(Url::as_str), TEXT_LIMIT)?;
        limit("website", self.website.as_ref().map(Url::as_str), TEXT_LIMIT)?;
        limit("seeking_description", self.seeking_description.as_deref(), TEXT_LIMIT)
    }

    /// Builds the record this submission describes.
    pub fn into_artist(self, id: Id) -> Artist {
        Artist {
            id,
            name: self.name,
            city: self.city,
            state: self.state,
            phone: self.phone,
            genres: self.genres,
            image_link: self.image_link.map(String::from),
            facebook_link: self.facebook_link.map(String::from),
            website: self.website.map(String::from),
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description,
        }
    }
}

/// A request to book an artist at a venue.
#[derive(Clone, Debug, Deserialize)]
pub struct ShowSubmission {
    pub(crate) venue_id: Id,
    pub(crate) artist_id: Id,
    pub(crate) start_time: String,
}

impl ShowSubmission {
    /// Checks the submission and returns the show it asks for.
    pub fn parse(self) -> Result<NewShow, BackendError> {
        let start_time = dates::parse_submitted_date(&self.start_time)?;

        Ok(NewShow {
            venue_id: self.venue_id,
            artist_id: self.artist_id,
            start_time,
        })
    }
}

/// A show that hasn't been saved yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewShow {
    pub venue_id: Id,
    pub artist_id: Id,
    pub start_time: Date,
}

impl NewShow {
    pub fn into_show(self, id: Id) -> Show {
        Show {
            id,
            venue_id: self.venue_id,
            artist_id: self.artist_id,
            start_time: self.start_time,
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), BackendError> {
    if value.is_empty() {
        Err(BackendError::MissingField(field))
    } else {
        Ok(())
    }
}

fn limit(field: &'static str, value: Option<&str>, limit: usize) -> Result<(), BackendError> {
    match value {
        Some(value) if value.chars().count() > limit => {
            Err(BackendError::FieldTooLong { field, limit })
        }
        _ => Ok(()),
    }
}
