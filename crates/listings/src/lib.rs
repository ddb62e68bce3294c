//! Listing and company lookup collaborators.
//!
//! The agent consumes these through narrow traits so the real dataset
//! (an external database in production) stays out of the core. The
//! in-memory sample store ships enough data to run the whole agent
//! offline, mirroring the categories and countries the production
//! dataset carries.

pub mod companies;
pub mod store;

pub use companies::CompanyDirectory;
pub use store::{FALLBACK_CATEGORIES, FALLBACK_COUNTRIES, ListingStore, SampleListingStore};
