// Argo CD Querier - library root for the binary and tests

pub mod auth;
pub mod config;
pub mod converters;
pub mod error;
pub mod http_client;
pub mod middleware;
pub mod models;
pub mod querier;
pub mod routes;
