//! Movie review API: a catalogue of movies, user accounts and the reviews
//! users write about movies, served over HTTP with axum.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schemas;
pub mod services;

mod openapi_tests;
mod test_utils;
