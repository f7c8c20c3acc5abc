//! Client core for Emoti Gauge: survey authoring, publishing, answering and
//! result viewing against the Emoti Gauge REST API.

pub mod auth;
pub mod commands;
pub mod draft;
pub mod gateway;
pub mod logging;
pub mod render;
pub mod response;
pub mod routes;
pub mod settings;
pub mod storage;
pub mod survey;
pub mod util;
