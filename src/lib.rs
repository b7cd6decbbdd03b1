pub mod aggregation;
pub mod config;
pub mod dates;
pub mod db;
pub mod environment;
pub mod errors;
pub mod listing;
pub mod model;
pub mod normalization;
pub mod routes;
pub mod urls;
