pub mod credentials;
pub mod db_connect;
pub mod favorites;
pub mod schema;
pub mod service;

pub use credentials::CredentialStore;
pub use favorites::FavoriteStore;

use surrealdb::{Surreal, engine::any::Any};

/// Handle to the SurrealDB datastore.
///
/// `Surreal<Any>` is a cheap, cloneable client multiplexing one connection,
/// so a single instance is shared by every store.
pub struct Database {
    client: Surreal<Any>,
}
