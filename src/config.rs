//! Provider-wide constants.
//!
//! The provider has no runtime configuration source: everything that
//! identifies it to the host library and to the kernel driver is fixed at
//! build time.

/// Provider name published in the registration descriptor.
pub const PROVIDER_NAME: &str = "ntrdma";

/// Prefix of the kernel device name (`ntrdma_<n>`).
pub const IBDEV_PREFIX: &str = "ntrdma_";

/// Sysfs attribute holding the kernel device name.
pub const IBDEV_ATTR: &str = "ibdev";

/// Size of the buffer the `ibdev` attribute is read into.
pub const IBDEV_ATTR_MAX: usize = 32;

/// The only kernel ABI version this provider speaks.
pub const NTRDMA_ABI_VERSION: u32 = 1;

/// Maximum number of providers the process-wide registry holds.
pub const MAX_PROVIDERS: usize = 16;
