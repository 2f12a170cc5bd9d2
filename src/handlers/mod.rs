// handlers/mod.rs - handler tiers
//
// Public (no session) → Protected (admin session, enforced by the access gate).
// The gate runs as a router layer; handlers in `protected` read the
// `StudioUser` extension it leaves behind.

pub mod protected;
pub mod public;

pub use protected::*;
pub use public::*;
