use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;
use crate::model::Id;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

/// What the request was trying to do.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Context {
    Areas,
    SearchVenues { search_term: String },
    RetrieveVenue { id: Id },
    CreateVenue,
    UpdateVenue { id: Id },
    DeleteVenue { id: Id },
    Artists,
    SearchArtists { search_term: String },
    RetrieveArtist { id: Id },
    CreateArtist,
    UpdateArtist { id: Id },
    DeleteArtist { id: Id },
    Shows,
    CreateShow,
}

impl Context {
    pub fn areas() -> Context {
        Context::Areas
    }

    pub fn search_venues(search_term: String) -> Context {
        Context::SearchVenues { search_term }
    }

    pub fn retrieve_venue(id: Id) -> Context {
        Context::RetrieveVenue { id }
    }

    pub fn create_venue() -> Context {
        Context::CreateVenue
    }

    pub fn update_venue(id: Id) -> Context {
        Context::UpdateVenue { id }
    }

    pub fn delete_venue(id: Id) -> Context {
        Context::DeleteVenue { id }
    }

    pub fn artists() -> Context {
        Context::Artists
    }

    pub fn search_artists(search_term: String) -> Context {
        Context::SearchArtists { search_term }
    }

    pub fn retrieve_artist(id: Id) -> Context {
        Context::RetrieveArtist { id }
    }

    pub fn create_artist() -> Context {
        Context::CreateArtist
    }

    pub fn update_artist(id: Id) -> Context {
        Context::UpdateArtist { id }
    }

    pub fn delete_artist(id: Id) -> Context {
        Context::DeleteArtist { id }
    }

    pub fn shows() -> Context {
        Context::Shows
    }

    pub fn create_show() -> Context {
        Context::CreateShow
    }
}
