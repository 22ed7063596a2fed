//! Remote store module
//!
//! Provides the `RemoteStore` abstraction over a managed table store plus
//! object storage, and its Supabase REST implementation.

mod remote_store;
mod supabase_client;

pub use remote_store::{Direction, Query, RemoteStore, Row, StoreError, StoreResult};
pub use supabase_client::SupabaseClient;
