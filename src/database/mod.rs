//! PostgreSQL connection handling for the relational history store.

pub mod pool;

pub use pool::{create_pool, run_migrations, Database, DatabaseError, MIGRATOR};
