pub mod catalogue;
pub mod types;

pub use catalogue::{Catalogue, Overrides, FALLBACK_SELECTION};
pub use types::{Profile, ProfileKind};
