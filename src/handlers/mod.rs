// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token resolved to an Identity)

pub mod protected;
pub mod public;
