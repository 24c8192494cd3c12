pub mod backend;

pub use backend::{error_detail, BackendClient};
