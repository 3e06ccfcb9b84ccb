// handlers/elevated/mod.rs - Elevated handlers (super-admin tenant required)
//
// Same authentication as the protected tier; the tenant service additionally
// requires the caller's tenant to carry the super-admin flag.

pub mod tenants;

pub use tenants::*;
