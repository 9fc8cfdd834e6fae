mod country;
pub mod query;
mod status;

pub use country::CountryStorage;
pub use status::StatusStorage;
