/*!
Shared error types (spec §7).
*/

pub mod err;

pub use err::{JudgedError, LocationContext};
