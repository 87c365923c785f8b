//! Configuration: environment-driven settings for the server and database.

mod settings;

pub use settings::{
    Settings, DEFAULT_BODY_LIMIT, DEFAULT_DATABASE_URL, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_PORT,
};
