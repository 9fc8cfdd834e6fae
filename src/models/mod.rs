mod country;
mod status;
pub use country::*;
pub use status::*;

use crate::refresh_service::RefreshService;
use crate::storage::{CountryStorage, StatusStorage};
use std::path::PathBuf;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub countries: CountryStorage,
    pub status: StatusStorage,
    pub refresher: RefreshService,
    pub cache_dir: PathBuf,
}

impl AppState {
    pub fn new(
        countries: CountryStorage,
        status: StatusStorage,
        refresher: RefreshService,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            countries,
            status,
            refresher,
            cache_dir,
        }
    }
}
