use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Id;

/// A venue as listed under its area.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VenueEntry {
    pub id: Id,
    pub name: String,
    pub num_upcoming_shows: i64,
}

/// A venue together with where it is.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct AreaRow {
    pub id: Id,
    pub name: String,
    pub city: String,
    pub state: String,
    pub num_upcoming_shows: i64,
}

/// All the venues in one city.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueEntry>,
}

/// A name search hit.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct SearchHit {
    pub id: Id,
    pub name: String,
    pub num_upcoming_shows: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<SearchHit>,
}

/// Groups venues by city and state, ordering areas by city and then
/// state, both descending. Venues keep their relative order.
pub fn group_by_area(rows: Vec<AreaRow>) -> Vec<Area> {
    let mut areas: BTreeMap<(String, String), Vec<VenueEntry>> = BTreeMap::new();

    for AreaRow {
        id,
        name,
        city,
        state,
        num_upcoming_shows,
    } in rows
    {
        areas.entry((city, state)).or_default().push(VenueEntry {
            id,
            name,
            num_upcoming_shows,
        });
    }

    areas
        .into_iter()
        .rev()
        .map(|((city, state), venues)| Area {
            city,
            state,
            venues,
        })
        .collect()
}

pub fn search_results(hits: Vec<SearchHit>) -> SearchResults {
    SearchResults {
        count: hits.len(),
        data: hits,
    }
}

/// Escapes the `LIKE` metacharacters in `term` and wraps it for a
/// substring match.
///
/// ```
/// use booking::listing::like_pattern;
/// assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');

    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}
