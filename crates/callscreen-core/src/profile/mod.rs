//! Profile documents: a settings snapshot plus the collaborator data needed
//! to drive the engine without a host platform.

mod parser;
mod schema;

pub use parser::{Profile, ProfileError};
pub use schema::validate_profile_schema;
