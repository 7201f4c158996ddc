//! Provider registration.
//!
//! A provider publishes one immutable [`VerbsDeviceOps`] descriptor. The
//! host library keeps registered descriptors in a [`ProviderRegistry`] and,
//! for every enumerated node, picks the first one whose ABI range and
//! matcher accept it.

use alloc::boxed::Box;
use alloc::sync::Arc;

use arrayvec::ArrayVec;
use axerrno::{AxResult, ax_err};
use spin::{Once, RwLock};

use crate::config::{MAX_PROVIDERS, NTRDMA_ABI_VERSION, PROVIDER_NAME};
use crate::context::VerbsContext;
use crate::device::VerbsDevice;
use crate::matcher::ntrdma_device_match;
use crate::registry::devices;
use crate::sysfs::SysfsDevice;
use crate::transport::{CmdFd, UverbsTransport};

/// Registration descriptor: name, accepted kernel ABI range and lifecycle
/// functions.
///
/// The host library checks the ABI range and calls `match_device` before
/// it ever calls `alloc_device` or `alloc_context`.
pub struct VerbsDeviceOps {
    pub name: &'static str,
    pub match_min_abi_version: u32,
    pub match_max_abi_version: u32,
    pub match_device: fn(&SysfsDevice) -> bool,
    pub alloc_device: fn(&SysfsDevice) -> AxResult<Arc<VerbsDevice>>,
    pub uninit_device: fn(Arc<VerbsDevice>),
    pub alloc_context:
        fn(&Arc<VerbsDevice>, Arc<dyn UverbsTransport>, CmdFd) -> AxResult<Box<VerbsContext>>,
    pub free_context: fn(Box<VerbsContext>),
}

impl VerbsDeviceOps {
    /// Checks a node's kernel ABI version against the accepted range.
    #[inline]
    pub fn accepts_abi(&self, abi_ver: u32) -> bool {
        (self.match_min_abi_version..=self.match_max_abi_version).contains(&abi_ver)
    }
}

impl core::fmt::Debug for VerbsDeviceOps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VerbsDeviceOps")
            .field("name", &self.name)
            .field("match_min_abi_version", &self.match_min_abi_version)
            .field("match_max_abi_version", &self.match_max_abi_version)
            .finish_non_exhaustive()
    }
}

fn ntrdma_alloc_device(sysfs_dev: &SysfsDevice) -> AxResult<Arc<VerbsDevice>> {
    devices().alloc_device(sysfs_dev)
}

fn ntrdma_uninit_device(ibdev: Arc<VerbsDevice>) {
    if devices().uninit_device(&ibdev).is_err() {
        trace!("ntrdma: uninit of unknown device {:?}", ibdev.id());
    }
}

fn ntrdma_alloc_context(
    ibdev: &Arc<VerbsDevice>,
    transport: Arc<dyn UverbsTransport>,
    cmd_fd: CmdFd,
) -> AxResult<Box<VerbsContext>> {
    devices().alloc_context(ibdev, transport, cmd_fd)
}

fn ntrdma_free_context(ctx: Box<VerbsContext>) {
    drop(ctx);
}

/// The NTRDMA registration descriptor.
pub static NTRDMA_DEV_OPS: VerbsDeviceOps = VerbsDeviceOps {
    name: PROVIDER_NAME,
    match_min_abi_version: NTRDMA_ABI_VERSION,
    match_max_abi_version: NTRDMA_ABI_VERSION,
    match_device: ntrdma_device_match,
    alloc_device: ntrdma_alloc_device,
    uninit_device: ntrdma_uninit_device,
    alloc_context: ntrdma_alloc_context,
    free_context: ntrdma_free_context,
};

/// Registered provider descriptors, in registration order.
pub struct ProviderRegistry {
    providers: RwLock<ArrayVec<&'static VerbsDeviceOps, MAX_PROVIDERS>>,
}

impl ProviderRegistry {
    pub const fn new() -> Self {
        Self {
            providers: RwLock::new(ArrayVec::new_const()),
        }
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// - [`AxError::AlreadyExists`](axerrno::AxError::AlreadyExists) if a
    ///   provider with the same name is registered.
    /// - [`AxError::NoMemory`](axerrno::AxError::NoMemory) if the registry
    ///   is full.
    pub fn register(&self, ops: &'static VerbsDeviceOps) -> AxResult {
        let mut providers = self.providers.write();

        if providers.iter().any(|p| p.name == ops.name) {
            return ax_err!(AlreadyExists, "provider already registered");
        }
        if providers.try_push(ops).is_err() {
            return ax_err!(NoMemory, "provider registry full");
        }

        debug!(
            "registered verbs provider {} (abi {}..={})",
            ops.name, ops.match_min_abi_version, ops.match_max_abi_version
        );
        Ok(())
    }

    /// Finds the provider that drives `sysfs_dev`.
    pub fn find(&self, sysfs_dev: &SysfsDevice) -> Option<&'static VerbsDeviceOps> {
        self.providers
            .read()
            .iter()
            .copied()
            .find(|ops| ops.accepts_abi(sysfs_dev.abi_ver) && (ops.match_device)(sysfs_dev))
    }

    /// Gets a registered provider by name.
    pub fn get(&self, name: &str) -> Option<&'static VerbsDeviceOps> {
        self.providers.read().iter().copied().find(|ops| ops.name == name)
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static PROVIDERS: ProviderRegistry = ProviderRegistry::new();
static REGISTERED: Once<AxResult> = Once::new();

/// The process-wide provider registry.
pub fn providers() -> &'static ProviderRegistry {
    &PROVIDERS
}

/// Registers the NTRDMA provider with the process-wide registry.
///
/// Call once at library startup. Later calls return the first call's
/// outcome without registering again.
pub fn register_driver() -> AxResult {
    *REGISTERED.call_once(|| PROVIDERS.register(&NTRDMA_DEV_OPS))
}
