// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod daily_log;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod provider;
pub mod retention;
pub mod routes;
pub mod sampler;
pub mod schema;
