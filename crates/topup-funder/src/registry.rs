//! # Root Registry and Root of Trust
//!
//! The funding service never stores an allowlist. It holds a handle to
//! an external [`RootRegistry`] that publishes the current Merkle root,
//! and [`RootOfTrust`] checks every caller-supplied root against it.
//!
//! ## Security Invariant
//!
//! The registered root is fetched fresh on every check and never cached.
//! A root rotation at the registry takes effect on the very next `fund`
//! call; proofs built against the previous root are rejected from then on.

use std::sync::Arc;

use parking_lot::RwLock;
use topup_core::{Address, Bytes32};
use topup_crypto::roots_equal;

use crate::error::{RegistryError, RootError};

/// Source of the authoritative allowlist root.
///
/// ## Security Invariant
///
/// `current_root()` must return the value the registry holds at the time
/// of the call. Adapters that cache must not serve a root the registry
/// has since replaced.
pub trait RootRegistry {
    /// The registry's address. A zero address is refused at construction.
    fn address(&self) -> Address;

    /// The root currently published by the registry.
    fn current_root(&self) -> Result<Bytes32, RegistryError>;
}

impl<T: RootRegistry + ?Sized> RootRegistry for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn current_root(&self) -> Result<Bytes32, RegistryError> {
        (**self).current_root()
    }
}

impl<T: RootRegistry + ?Sized> RootRegistry for &T {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn current_root(&self) -> Result<Bytes32, RegistryError> {
        (**self).current_root()
    }
}

/// In-process registry holding a single rotatable root.
///
/// Shared through an [`Arc`] so the registry operator can rotate the root
/// while a service holds the same handle.
#[derive(Debug)]
pub struct StaticRootRegistry {
    address: Address,
    root: RwLock<Bytes32>,
}

impl StaticRootRegistry {
    /// Create a registry at `address` publishing `root`.
    pub fn new(address: Address, root: Bytes32) -> Self {
        Self {
            address,
            root: RwLock::new(root),
        }
    }

    /// Replace the published root.
    pub fn set_root(&self, root: Bytes32) {
        let previous = std::mem::replace(&mut *self.root.write(), root);
        tracing::info!(
            registry = %self.address,
            previous = %previous,
            current = %root,
            "registry root rotated"
        );
    }
}

impl RootRegistry for StaticRootRegistry {
    fn address(&self) -> Address {
        self.address
    }

    fn current_root(&self) -> Result<Bytes32, RegistryError> {
        Ok(*self.root.read())
    }
}

/// Checks caller-supplied roots against the registry.
#[derive(Debug)]
pub struct RootOfTrust<R> {
    registry: R,
}

impl<R: RootRegistry> RootOfTrust<R> {
    /// Wrap a registry. The zero-address check belongs to the service
    /// constructor.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// The registry's address.
    pub fn registry_address(&self) -> Address {
        self.registry.address()
    }

    /// The registry's current root.
    pub fn current_root(&self) -> Result<Bytes32, RegistryError> {
        self.registry.current_root()
    }

    /// Accept `supplied` only if it equals the registry's current root.
    pub fn check_root(&self, supplied: &Bytes32) -> Result<(), RootError> {
        let registered = self.registry.current_root()?;
        if roots_equal(supplied, &registered) {
            Ok(())
        } else {
            tracing::debug!(
                supplied = %supplied,
                registered = %registered,
                "supplied root does not match registry"
            );
            Err(RootError::Invalid {
                supplied: *supplied,
                registered,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DownRegistry;

    impl RootRegistry for DownRegistry {
        fn address(&self) -> Address {
            Address::from_low_u64(9)
        }

        fn current_root(&self) -> Result<Bytes32, RegistryError> {
            Err(RegistryError::Unavailable {
                registry: self.address(),
                reason: "node offline".to_string(),
            })
        }
    }

    fn root(n: u8) -> Bytes32 {
        Bytes32::new([n; 32])
    }

    #[test]
    fn accepts_current_root() {
        let trust = RootOfTrust::new(StaticRootRegistry::new(Address::from_low_u64(1), root(1)));
        assert!(trust.check_root(&root(1)).is_ok());
    }

    #[test]
    fn rejects_other_root() {
        let trust = RootOfTrust::new(StaticRootRegistry::new(Address::from_low_u64(1), root(1)));
        let err = trust.check_root(&root(2)).unwrap_err();
        assert_eq!(
            err,
            RootError::Invalid {
                supplied: root(2),
                registered: root(1),
            }
        );
    }

    #[test]
    fn rotation_is_seen_immediately() {
        let registry = Arc::new(StaticRootRegistry::new(Address::from_low_u64(1), root(1)));
        let trust = RootOfTrust::new(Arc::clone(&registry));
        assert!(trust.check_root(&root(1)).is_ok());

        registry.set_root(root(2));
        assert!(trust.check_root(&root(1)).is_err());
        assert!(trust.check_root(&root(2)).is_ok());
        assert_eq!(trust.current_root().unwrap(), root(2));
    }

    #[test]
    fn registry_failure_propagates() {
        let trust = RootOfTrust::new(DownRegistry);
        let err = trust.check_root(&root(1)).unwrap_err();
        assert!(matches!(err, RootError::Registry(_)));
    }

    #[test]
    fn zero_root_is_not_special() {
        let trust = RootOfTrust::new(StaticRootRegistry::new(
            Address::from_low_u64(1),
            Bytes32::ZERO,
        ));
        assert!(trust.check_root(&Bytes32::ZERO).is_ok());
        assert!(trust.check_root(&root(1)).is_err());
    }
}
