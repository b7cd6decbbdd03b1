use std::sync::Arc;

use lazy_static::lazy_static;
use serde::Deserialize;
use serde_json::{json, Value};
use time::Date;
use warp::http::StatusCode;
use warp::test::RequestBuilder;
use warp::Filter;

use booking::db::mock::MockDb;
use booking::environment::{fixed_clock, Environment};
use booking::routes;
use booking::urls::Urls;

lazy_static! {
    static ref TODAY: Date = Date::try_from_ymd(2021, 4, 10).unwrap();
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreationResponse {
    id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorResponse {
    action: String,
    id: Option<i32>,
    search_term: Option<String>,
    message: String,
}

fn make_api(
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + 'static {
    let environment = Environment::new(
        Arc::new(log::null_logger()),
        Arc::new(MockDb::new()),
        Arc::new(Urls::new("https://www.example.com/booking")),
        fixed_clock(*TODAY),
    );

    routes::api(environment)
}

fn venue(name: &str, city: &str, state: &str) -> Value {
    json!({
        "name": name,
        "city": city,
        "state": state,
        "address": "1015 Folsom Street",
        "phone": "123-123-1234",
        "genres": ["Jazz", "Reggae", "Swing"],
        "image_link": "https://images.example.com/hop.jpg",
        "seeking_talent": true,
        "seeking_description": "We are on the lookout for a local artist.",
    })
}

fn artist(name: &str) -> Value {
    json!({
        "name": name,
        "city": "San Francisco",
        "state": "CA",
        "genres": ["Rock n Roll"],
        "image_link": "https://images.example.com/petals.jpg",
    })
}

fn post(path: &str, body: &Value) -> RequestBuilder {
    warp::test::request().method("POST").path(path).json(body)
}

async fn create<F>(api: &F, path: &str, body: &Value) -> i32
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let response = post(path, body).reply(api).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", path);

    serde_json::from_slice::<CreationResponse>(response.body())
        .expect("parse creation response")
        .id
}

async fn get_json<F>(api: &F, path: &str) -> (StatusCode, Value)
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let response = warp::test::request().path(path).reply(api).await;
    let body = serde_json::from_slice(response.body()).unwrap_or(Value::Null);

    (response.status(), body)
}

fn parse_error(body: &[u8]) -> ErrorResponse {
    serde_json::from_slice(body).expect("parse error response")
}

#[tokio::test]
async fn venues_can_be_created_updated_and_deleted() {
    let api = make_api();

    let response = post("/venues", &venue("The Musical Hop", "San Francisco", "CA"))
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("server-timing"));
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://www.example.com/booking/venues/1"
    );

    let id = serde_json::from_slice::<CreationResponse>(response.body())
        .unwrap()
        .id;

    let (status, body) = get_json(&api, &format!("/venues/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "The Musical Hop");
    assert_eq!(body["genres"], json!(["Jazz", "Reggae", "Swing"]));
    assert_eq!(body["seeking_talent"], true);
    assert_eq!(body["past_shows"], json!([]));
    assert_eq!(body["upcoming_shows"], json!([]));
    assert_eq!(body["past_shows_count"], 0);
    assert_eq!(body["upcoming_shows_count"], 0);

    let response = warp::test::request()
        .method("PUT")
        .path(&format!("/venues/{}", id))
        .json(&venue("  The Musical Hop Annex ", "Oakland", "CA"))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, body) = get_json(&api, &format!("/venues/{}", id)).await;
    assert_eq!(body["name"], "The Musical Hop Annex");
    assert_eq!(body["city"], "Oakland");

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/venues/{}", id))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&api, &format!("/venues/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_required_fields_are_refused() {
    let api = make_api();

    let response = post("/venues", &venue("   ", "San Francisco", "CA"))
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = parse_error(response.body());
    assert_eq!(error.action, "create_venue");
    assert_eq!(error.message, "Missing required field: name");

    let (_, body) = get_json(&api, "/venues").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn modifying_unknown_entities_is_not_found() {
    let api = make_api();

    let response = warp::test::request()
        .method("PUT")
        .path("/artists/7")
        .json(&artist("Guns N Petals"))
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = parse_error(response.body());
    assert_eq!(error.action, "update_artist");
    assert_eq!(error.id, Some(7));

    let response = warp::test::request()
        .method("DELETE")
        .path("/venues/7")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_error(response.body()).action, "delete_venue");

    let (status, _) = get_json(&api, "/artists/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shows_are_split_around_today() {
    let api = make_api();

    let venue_id = create(&api, "/venues", &venue("The Musical Hop", "San Francisco", "CA")).await;
    let artist_id = create(&api, "/artists", &artist("Guns N Petals")).await;

    for start_time in &["2019-05-21T21:30:00.000Z", "2035-04-01T20:00:00", "2021-04-10"] {
        create(
            &api,
            "/shows",
            &json!({
                "venue_id": venue_id,
                "artist_id": artist_id,
                "start_time": start_time,
            }),
        )
        .await;
    }

    let (status, body) = get_json(&api, &format!("/venues/{}", venue_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["past_shows_count"], 1);
    assert_eq!(body["upcoming_shows_count"], 2);
    assert_eq!(
        body["past_shows"],
        json!([{
            "artist_id": artist_id,
            "artist_name": "Guns N Petals",
            "artist_image_link": "https://images.example.com/petals.jpg",
            "start_time": "05/21/2019",
        }])
    );
    assert_eq!(body["upcoming_shows"][0]["start_time"], "04/10/2021");
    assert_eq!(body["upcoming_shows"][1]["start_time"], "04/01/2035");

    let (_, body) = get_json(&api, &format!("/artists/{}", artist_id)).await;
    assert_eq!(body["name"], "Guns N Petals");
    assert_eq!(body["past_shows"][0]["venue_id"], venue_id);
    assert_eq!(body["past_shows"][0]["venue_name"], "The Musical Hop");
    assert_eq!(body["upcoming_shows_count"], 2);

    let (_, body) = get_json(&api, "/shows").await;
    let shows = body.as_array().expect("shows are a list");
    assert_eq!(shows.len(), 3);
    assert_eq!(shows[0]["venue_name"], "The Musical Hop");
    assert_eq!(shows[0]["artist_name"], "Guns N Petals");
    assert_eq!(shows[0]["start_time"], "05/21/2019");
    assert_eq!(shows[2]["start_time"], "04/01/2035");
}

#[tokio::test]
async fn shows_need_registered_venues_and_artists() {
    let api = make_api();

    let venue_id = create(&api, "/venues", &venue("The Musical Hop", "San Francisco", "CA")).await;

    let response = post(
        "/shows",
        &json!({"venue_id": venue_id, "artist_id": 42, "start_time": "2035-04-01"}),
    )
    .reply(&api)
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = parse_error(response.body());
    assert_eq!(error.action, "create_show");
    assert_eq!(error.message, "Artist 42 is not registered");

    let artist_id = create(&api, "/artists", &artist("Guns N Petals")).await;

    let response = post(
        "/shows",
        &json!({"venue_id": venue_id, "artist_id": artist_id, "start_time": "someday"}),
    )
    .reply(&api)
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_error(response.body()).message,
        "Malformed date: \"someday\""
    );

    let (_, body) = get_json(&api, "/shows").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn booked_venues_and_artists_cannot_be_deleted() {
    let api = make_api();

    let venue_id = create(&api, "/venues", &venue("The Musical Hop", "San Francisco", "CA")).await;
    let artist_id = create(&api, "/artists", &artist("Guns N Petals")).await;
    create(
        &api,
        "/shows",
        &json!({"venue_id": venue_id, "artist_id": artist_id, "start_time": "2035-04-01"}),
    )
    .await;

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/venues/{}", venue_id))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/artists/{}", artist_id))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(parse_error(response.body()).action, "delete_artist");

    let (status, _) = get_json(&api, &format!("/venues/{}", venue_id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn venues_are_listed_by_area() {
    let api = make_api();

    let hop = create(&api, "/venues", &venue("The Musical Hop", "San Francisco", "CA")).await;
    let pianos = create(&api, "/venues", &venue("The Dueling Pianos Bar", "New York", "NY")).await;
    let park = create(&api, "/venues", &venue("Park Square Live Music & Coffee", "San Francisco", "CA")).await;
    let artist_id = create(&api, "/artists", &artist("Guns N Petals")).await;

    for start_time in &["2019-06-15", "2035-04-08"] {
        create(
            &api,
            "/shows",
            &json!({"venue_id": park, "artist_id": artist_id, "start_time": start_time}),
        )
        .await;
    }

    let (status, body) = get_json(&api, "/venues").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {
                "city": "San Francisco",
                "state": "CA",
                "venues": [
                    {"id": hop, "name": "The Musical Hop", "num_upcoming_shows": 0},
                    {"id": park, "name": "Park Square Live Music & Coffee", "num_upcoming_shows": 1},
                ],
            },
            {
                "city": "New York",
                "state": "NY",
                "venues": [
                    {"id": pianos, "name": "The Dueling Pianos Bar", "num_upcoming_shows": 0},
                ],
            },
        ])
    );
}

#[tokio::test]
async fn searches_ignore_case() {
    let api = make_api();

    create(&api, "/venues", &venue("The Musical Hop", "San Francisco", "CA")).await;
    create(&api, "/venues", &venue("Park Square Live Music & Coffee", "San Francisco", "CA")).await;
    create(&api, "/artists", &artist("Guns N Petals")).await;
    create(&api, "/artists", &artist("Matt Quevedo")).await;

    let response = post("/venues/search", &json!({"search_term": "music"}))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 2);

    let response = post("/venues/search", &json!({"search_term": "Hop"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "The Musical Hop");

    let response = post("/artists/search", &json!({"search_term": "A"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 2);

    let response = post("/artists/search", &json!({"search_term": "zzz"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, json!({"count": 0, "data": []}));
}

#[tokio::test]
async fn searches_match_accented_names_however_they_are_composed() {
    let api = make_api();

    let cafe = create(&api, "/venues", &venue("Caf\u{e9} Blue", "Paris", "IDF")).await;
    create(&api, "/venues", &venue("Cafeteria", "Paris", "IDF")).await;
    create(&api, "/artists", &artist("Beyonce\u{301}")).await;

    for term in &["Caf\u{e9}", "caf\u{e9}", "Cafe\u{301}", " CAF\u{c9} "] {
        let response = post("/venues/search", &json!({ "search_term": term }))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["count"], 1, "searching for {:?}", term);
        assert_eq!(body["data"][0]["id"], cafe);
    }

    let response = post("/artists/search", &json!({"search_term": "Beyonc\u{e9}"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn search_terms_are_matched_literally() {
    let api = make_api();

    let discount = create(&api, "/venues", &venue("50% Off Lounge", "Austin", "TX")).await;
    create(&api, "/venues", &venue("5000 Club", "Austin", "TX")).await;
    let underscore = create(&api, "/venues", &venue("Under_Score", "Austin", "TX")).await;
    create(&api, "/venues", &venue("Underground", "Austin", "TX")).await;

    let response = post("/venues/search", &json!({"search_term": "0%"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], discount);

    let response = post("/venues/search", &json!({"search_term": "r_s"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], underscore);

    let response = post("/venues/search", &json!({"search_term": "%"}))
        .reply(&api)
        .await;
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn overlong_fields_are_refused() {
    let api = make_api();

    let mut submission = venue("The Musical Hop", "San Francisco", "CA");
    submission["phone"] = json!("+1 (555) 123-4567 ext. 12345");

    let response = post("/venues", &submission).reply(&api).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = parse_error(response.body());
    assert_eq!(error.action, "create_venue");
    assert_eq!(error.message, "Field phone is longer than 20 characters");
}

#[tokio::test]
async fn artists_are_listed_briefly() {
    let api = make_api();

    let first = create(&api, "/artists", &artist("Guns N Petals")).await;
    let second = create(&api, "/artists", &artist("The Wild Sax Band")).await;

    let (status, body) = get_json(&api, "/artists").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": first, "name": "Guns N Petals"},
            {"id": second, "name": "The Wild Sax Band"},
        ])
    );
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let api = make_api();

    let (status, _) = get_json(&api, "/performers").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
