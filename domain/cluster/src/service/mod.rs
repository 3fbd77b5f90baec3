pub mod gpu_accounting;
pub mod hostlist;
mod identity;

#[rustfmt::skip]
pub use identity::IdentityService;

#[cfg(feature = "mock")]
pub use identity::MockIdentityService;
