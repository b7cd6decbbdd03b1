use std::sync::Arc;

use log::{debug, error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The largest request body to accept. Submissions are small JSON
/// documents.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            debug!(logger, "Request refused"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        MissingField(..) | FieldTooLong { .. } | MalformedDate { .. } => StatusCode::BAD_REQUEST,
        UnknownVenue(..) | UnknownArtist(..) => StatusCode::BAD_REQUEST,
        NonExistentVenue(..) | NonExistentArtist(..) => StatusCode::NOT_FOUND,
        VenueHasShows(..) | ArtistHasShows(..) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Every route served on the main port, with errors rendered as JSON.
pub fn api(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + Send + Sync + 'static
{
    let logger = environment.logger.clone();

    make_areas_route(environment.clone())
        .or(make_venue_search_route(environment.clone()))
        .or(make_venue_retrieve_route(environment.clone()))
        .or(make_venue_create_route(environment.clone()))
        .or(make_venue_update_route(environment.clone()))
        .or(make_venue_delete_route(environment.clone()))
        .or(make_artists_route(environment.clone()))
        .or(make_artist_search_route(environment.clone()))
        .or(make_artist_retrieve_route(environment.clone()))
        .or(make_artist_create_route(environment.clone()))
        .or(make_artist_update_route(environment.clone()))
        .or(make_artist_delete_route(environment.clone()))
        .or(make_shows_route(environment.clone()))
        .or(make_show_create_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, delete, get as g, path as p, path::param as par, post, put};

    use super::{handlers, query as q, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::model::{ArtistSubmission, Id, ShowSubmission, VenueSubmission};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone());

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_areas_route => areas, rt; p("venues"), end(), g());
    route!(make_venue_search_route => search_venues, rt; p("venues"), p("search"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<q::SearchQuery>());
    route!(make_venue_retrieve_route => retrieve_venue, rt; p("venues"), par::<Id>(), end(), g());
    route!(make_venue_create_route => create_venue, rt; p("venues"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<VenueSubmission>());
    route!(make_venue_update_route => update_venue, rt; p("venues"), par::<Id>(), end(), put(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<VenueSubmission>());
    route!(make_venue_delete_route => delete_venue, rt; p("venues"), par::<Id>(), end(), delete());
    route!(make_artists_route => artists, rt; p("artists"), end(), g());
    route!(make_artist_search_route => search_artists, rt; p("artists"), p("search"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<q::SearchQuery>());
    route!(make_artist_retrieve_route => retrieve_artist, rt; p("artists"), par::<Id>(), end(), g());
    route!(make_artist_create_route => create_artist, rt; p("artists"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<ArtistSubmission>());
    route!(make_artist_update_route => update_artist, rt; p("artists"), par::<Id>(), end(), put(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<ArtistSubmission>());
    route!(make_artist_delete_route => delete_artist, rt; p("artists"), par::<Id>(), end(), delete());
    route!(make_shows_route => shows, rt; p("shows"), end(), g());
    route!(make_show_create_route => create_show, rt; p("shows"), end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<ShowSubmission>());
}

#[cfg(test)]
mod tests {
    use warp::http::StatusCode;

    use super::status_code_for;
    use crate::errors::BackendError;

    #[test]
    fn client_errors_are_not_server_errors() {
        assert_eq!(status_code_for(&BackendError::MissingField("name")), StatusCode::BAD_REQUEST);
        assert_eq!(status_code_for(&BackendError::UnknownArtist(3)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_code_for(&BackendError::FieldTooLong { field: "phone", limit: 20 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_code_for(&BackendError::NonExistentVenue(3)), StatusCode::NOT_FOUND);
        assert_eq!(status_code_for(&BackendError::ArtistHasShows(3)), StatusCode::CONFLICT);
        assert_eq!(
            status_code_for(&BackendError::InvalidUtcOffset(2000)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
