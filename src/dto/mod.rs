pub mod auth;
pub mod categories;
pub mod products;
pub mod profile;
pub mod stats;
pub mod sync;
