pub mod player_search;
pub mod status;

pub use player_search::{PlayerSearch, SearchDebouncer, SearchResults};
pub use status::{router as status_router, StatusServer, StatusState};
