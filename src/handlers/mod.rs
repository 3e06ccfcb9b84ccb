// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT + live account) → Elevated (super-admin tenant)

pub mod elevated;
pub mod protected;
pub mod public;
