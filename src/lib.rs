//! HTTP transport for a DynamoDB client.
//!
//! [`http::Http`] is the capability the request layer depends on: a GET that
//! returns raw bytes and a POST that returns a decoded JSON object.
//! [`http::HttpClient`] implements it over a shared reqwest client, reporting
//! failures through [`error::Error`].

pub mod config;
pub mod error;
pub mod http;

pub use error::{Error, Result};
