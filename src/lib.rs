pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod content;
pub mod impact;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod workers;
