//! User profile persistence and the onboarding character state machine.
//!
//! Profile data is a per-user bag of typed items (skills, role,
//! location, experience). The four onboarding characters are derived
//! views over those items, recomputed on demand and never stored.

pub mod character;
pub mod item;
pub mod memory;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use character::{CharacterStatus, Stage, character_status};
pub use item::{CompletenessSummary, ItemType, ProfileItem};
pub use memory::InMemoryProfileStore;
pub use store::ProfileStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProfileStore;
