//! Device table mapping generic device handles to provider records.
//!
//! The host library only ever hands the provider back a [`VerbsDevice`].
//! The table resolves its [`DeviceId`] to the [`NtrdmaDevice`] allocated
//! for it, and owns that record until `uninit_device`.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use axerrno::{AxError, AxResult};
use spin::RwLock;

use crate::config::PROVIDER_NAME;
use crate::context::VerbsContext;
use crate::device::{DeviceId, DeviceStats, NtrdmaDevice, VerbsDevice};
use crate::record::try_new_box;
use crate::sysfs::SysfsDevice;
use crate::transport::{CmdFd, UverbsTransport};

/// Table of live NTRDMA device records.
///
/// # Concurrency
///
/// Lookups take the read lock only long enough to clone what they need, so
/// a context handshake never runs under the table lock.
pub struct DeviceTable {
    devices: RwLock<BTreeMap<DeviceId, Box<NtrdmaDevice>>>,
    next_id: AtomicUsize,
}

impl DeviceTable {
    /// Creates a new empty device table.
    pub const fn new() -> Self {
        Self {
            devices: RwLock::new(BTreeMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    fn next_device_id(&self) -> DeviceId {
        DeviceId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates the provider record for a matched node and returns the
    /// generic device the host library keeps.
    ///
    /// # Errors
    ///
    /// [`AxError::NoMemory`] if the device names or the record cannot be
    /// allocated. Nothing is left allocated on failure. The `Arc` handles and
    /// the table slot use the infallible allocator and abort on exhaustion.
    pub fn alloc_device(&self, sysfs_dev: &SysfsDevice) -> AxResult<Arc<VerbsDevice>> {
        let id = self.next_device_id();
        let ibdev = Arc::new(VerbsDevice::new(id, PROVIDER_NAME, sysfs_dev)?);
        let dev = try_new_box(NtrdmaDevice::new(Arc::clone(&ibdev)))?;

        self.devices.write().insert(id, dev);
        debug!("ntrdma: allocated device {:?} for {}", id, sysfs_dev.sysfs_name);

        Ok(ibdev)
    }

    /// Releases the provider record behind `ibdev`.
    ///
    /// # Errors
    ///
    /// [`AxError::NotFound`] if the device is not in this table.
    pub fn uninit_device(&self, ibdev: &VerbsDevice) -> AxResult {
        let dev = self
            .devices
            .write()
            .remove(&ibdev.id())
            .ok_or(AxError::NotFound)?;

        debug!(
            "ntrdma: released device {:?} ({} contexts still open)",
            ibdev.id(),
            dev.stats().outstanding()
        );
        Ok(())
    }

    /// Opens a context on `ibdev` over the borrowed command fd.
    ///
    /// # Errors
    ///
    /// - [`AxError::NotFound`] if `ibdev` has no record in this table.
    /// - [`AxError::NoMemory`] if the context record cannot be allocated.
    /// - Whatever the transport reports if the kernel rejects the handshake.
    pub fn alloc_context(
        &self,
        ibdev: &Arc<VerbsDevice>,
        transport: Arc<dyn UverbsTransport>,
        cmd_fd: CmdFd,
    ) -> AxResult<Box<VerbsContext>> {
        let stats = self.stats(ibdev.id()).ok_or(AxError::NotFound)?;
        VerbsContext::open(ibdev, stats, transport, cmd_fd)
    }

    /// Gets the context statistics of a device.
    pub fn stats(&self, id: DeviceId) -> Option<Arc<DeviceStats>> {
        self.devices.read().get(&id).map(|dev| Arc::clone(dev.stats()))
    }

    /// Checks whether a device record is live.
    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.read().contains_key(&id)
    }

    /// Lists all live device IDs.
    pub fn list_devices(&self) -> Vec<DeviceId> {
        self.devices.read().keys().copied().collect()
    }

    /// Gets the number of live device records.
    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

static DEVICES: DeviceTable = DeviceTable::new();

/// The process-wide table behind the registered lifecycle functions.
pub fn devices() -> &'static DeviceTable {
    &DEVICES
}
