use std::time::{Duration, Instant};

use log::{debug, info};
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::aggregation::{aggregate, find_summary, ARTIST, VENUE};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::listing::{group_by_area, search_results};
use crate::model::{ArtistSubmission, Id, ShowSubmission, VenueSubmission};
use crate::routes::{
    query::SearchQuery,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn areas(environment: Environment) -> RouteResult {
    timed! {
        let rows = environment
            .db
            .venue_areas(environment.today())
            .await
            .map_err(|e: BackendError| Rejection::new(Context::areas(), e))?;

        json(&group_by_area(rows))
    }
}

pub async fn search_venues(environment: Environment, query: SearchQuery) -> RouteResult {
    timed! {
        let SearchQuery { search_term } = query;
        let context = Context::search_venues(search_term.clone());

        let hits = environment
            .db
            .search_venues(search_term, environment.today())
            .await
            .map_err(|e: BackendError| Rejection::new(context, e))?;

        json(&search_results(hits))
    }
}

pub async fn retrieve_venue(environment: Environment, id: Id) -> RouteResult {
    timed! {
        let rows = environment
            .db
            .venue_show_rows(id)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::retrieve_venue(id), e))?;

        let summaries = aggregate(rows, &VENUE, environment.today());

        match find_summary(summaries, id) {
            Some(summary) => with_status(json(&summary), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn create_venue(environment: Environment, submission: VenueSubmission) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create_venue(), e);
        submission.validate().map_err(error_handler)?;

        debug!(environment.logger, "Creating venue..."; "name" => &submission.name);
        let id = environment.db.insert_venue(submission).await.map_err(error_handler)?;
        info!(environment.logger, "Created venue"; "id" => id);

        with_header(
            with_status(json(&SuccessResponse::Created { id }), StatusCode::CREATED),
            "location",
            environment.urls.venue(id).as_str(),
        )
    }
}

pub async fn update_venue(
    environment: Environment,
    id: Id,
    submission: VenueSubmission,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::update_venue(id), e);
        submission.validate().map_err(error_handler)?;

        environment.db.update_venue(id, submission).await.map_err(error_handler)?;
        debug!(environment.logger, "Updated venue"; "id" => id);

        StatusCode::NO_CONTENT
    }
}

pub async fn delete_venue(environment: Environment, id: Id) -> RouteResult {
    timed! {
        environment
            .db
            .delete_venue(id)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::delete_venue(id), e))?;
        info!(environment.logger, "Deleted venue"; "id" => id);

        StatusCode::NO_CONTENT
    }
}

pub async fn artists(environment: Environment) -> RouteResult {
    timed! {
        let artists = environment
            .db
            .artists()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::artists(), e))?;

        json(&artists)
    }
}

pub async fn search_artists(environment: Environment, query: SearchQuery) -> RouteResult {
    timed! {
        let SearchQuery { search_term } = query;
        let context = Context::search_artists(search_term.clone());

        let hits = environment
            .db
            .search_artists(search_term, environment.today())
            .await
            .map_err(|e: BackendError| Rejection::new(context, e))?;

        json(&search_results(hits))
    }
}

pub async fn retrieve_artist(environment: Environment, id: Id) -> RouteResult {
    timed! {
        let rows = environment
            .db
            .artist_show_rows(id)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::retrieve_artist(id), e))?;

        let summaries = aggregate(rows, &ARTIST, environment.today());

        match find_summary(summaries, id) {
            Some(summary) => with_status(json(&summary), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn create_artist(environment: Environment, submission: ArtistSubmission) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create_artist(), e);
        submission.validate().map_err(error_handler)?;

        debug!(environment.logger, "Creating artist..."; "name" => &submission.name);
        let id = environment.db.insert_artist(submission).await.map_err(error_handler)?;
        info!(environment.logger, "Created artist"; "id" => id);

        with_header(
            with_status(json(&SuccessResponse::Created { id }), StatusCode::CREATED),
            "location",
            environment.urls.artist(id).as_str(),
        )
    }
}

pub async fn update_artist(
    environment: Environment,
    id: Id,
    submission: ArtistSubmission,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::update_artist(id), e);
        submission.validate().map_err(error_handler)?;

        environment.db.update_artist(id, submission).await.map_err(error_handler)?;
        debug!(environment.logger, "Updated artist"; "id" => id);

        StatusCode::NO_CONTENT
    }
}

pub async fn delete_artist(environment: Environment, id: Id) -> RouteResult {
    timed! {
        environment
            .db
            .delete_artist(id)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::delete_artist(id), e))?;
        info!(environment.logger, "Deleted artist"; "id" => id);

        StatusCode::NO_CONTENT
    }
}

pub async fn shows(environment: Environment) -> RouteResult {
    timed! {
        let shows = environment
            .db
            .shows()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::shows(), e))?;

        json(&shows)
    }
}

pub async fn create_show(environment: Environment, submission: ShowSubmission) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create_show(), e);
        let show = submission.parse().map_err(error_handler)?;

        let id = environment.db.insert_show(show).await.map_err(error_handler)?;
        info!(environment.logger, "Booked show"; "id" => id, "venue_id" => show.venue_id, "artist_id" => show.artist_id);

        with_status(json(&SuccessResponse::Created { id }), StatusCode::CREATED)
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
