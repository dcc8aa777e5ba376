//! Capability checks for protected resources.
//!
//! The bridge does not prompt for permissions itself; the environment supplies
//! an oracle answering granted/denied for each capability.

/// A protected resource the caller may need access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Camera,
}

/// Boolean permission gate supplied by the environment.
pub trait PermissionOracle: Send + Sync {
    fn is_granted(&self, capability: Capability) -> bool;
}

/// Grants every capability. Useful for hosts that resolve permissions before
/// commands ever reach the bridge.
pub struct GrantAll;

impl PermissionOracle for GrantAll {
    fn is_granted(&self, _capability: Capability) -> bool {
        true
    }
}

/// Denies every capability.
pub struct DenyAll;

impl PermissionOracle for DenyAll {
    fn is_granted(&self, _capability: Capability) -> bool {
        false
    }
}
