pub mod csrf;
pub mod error;
pub mod flash;
pub mod format;
pub mod lookup;
pub mod markdown;
pub mod params;
pub mod router;
pub mod routes;
pub mod setup;
pub mod shutdown;
pub mod state;
pub mod views;
