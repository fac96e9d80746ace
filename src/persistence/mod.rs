pub mod files;
pub mod store;

pub use files::{init_local_dir, resolve_data_dir};
pub use store::LocalStore;
