mod countries;
mod status;
pub use countries::*;
pub use status::*;
