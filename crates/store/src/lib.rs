//! Persistence for authorize actions and the records they depend on.
//!
//! The saga only talks to the traits in [`store`]; the in-memory
//! implementations back tests and the default server wiring, the
//! PostgreSQL action repository backs production deployments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryActionRepository, InMemoryOrganizationRepository, InMemoryTransactionRepository,
};
pub use postgres::PostgresActionRepository;
pub use query::ActionQuery;
pub use store::{ActionRepository, OrganizationRepository, TransactionRepository};
