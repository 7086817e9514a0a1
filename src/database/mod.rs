pub mod store;

pub use store::{Collection, JsonStore, StagedWrite, StoreError};
