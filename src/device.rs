//! Device records.
//!
//! The host library sees a [`VerbsDevice`]; the provider keeps its own
//! [`NtrdmaDevice`] next to it and finds it again through the
//! [`DeviceId`] the generic device carries (see [`crate::DeviceTable`]).

use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use axerrno::AxResult;

use crate::record::try_clone_str;
use crate::sysfs::SysfsDevice;

/// Handle linking a generic device to the provider's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub usize);

/// Generic device object handed to the host library.
#[derive(Debug)]
pub struct VerbsDevice {
    id: DeviceId,
    provider: &'static str,
    sysfs_name: String,
    ibdev_path: String,
    abi_ver: u32,
}

impl VerbsDevice {
    /// Copies the identity of `sysfs_dev`.
    ///
    /// # Errors
    ///
    /// [`AxError::NoMemory`](axerrno::AxError::NoMemory) if the names cannot
    /// be copied.
    pub fn new(id: DeviceId, provider: &'static str, sysfs_dev: &SysfsDevice) -> AxResult<Self> {
        Ok(Self {
            id,
            provider,
            sysfs_name: try_clone_str(&sysfs_dev.sysfs_name)?,
            ibdev_path: try_clone_str(&sysfs_dev.ibdev_path)?,
            abi_ver: sysfs_dev.abi_ver,
        })
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Name of the provider that allocated this device.
    #[inline]
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    #[inline]
    pub fn sysfs_name(&self) -> &str {
        &self.sysfs_name
    }

    #[inline]
    pub fn ibdev_path(&self) -> &str {
        &self.ibdev_path
    }

    #[inline]
    pub fn abi_ver(&self) -> u32 {
        self.abi_ver
    }
}

/// Context accounting for one device.
#[derive(Debug, Default)]
pub struct DeviceStats {
    /// Context records allocated, including ones later rolled back.
    pub contexts_allocated: AtomicU64,
    /// Context records released.
    pub contexts_released: AtomicU64,
    /// Handshakes the kernel driver rejected.
    pub handshake_failures: AtomicU64,
    contexts_live: AtomicU64,
}

impl DeviceStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_alloc(&self) {
        self.contexts_allocated.fetch_add(1, Ordering::Relaxed);
        self.contexts_live.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_release(&self) {
        self.contexts_live.fetch_sub(1, Ordering::Relaxed);
        self.contexts_released.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_handshake_failure(&self) {
        self.handshake_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn allocated(&self) -> u64 {
        self.contexts_allocated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn released(&self) -> u64 {
        self.contexts_released.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handshake_failures(&self) -> u64 {
        self.handshake_failures.load(Ordering::Relaxed)
    }

    /// Context records currently alive.
    ///
    /// Tracked separately from the two totals, which other threads may move
    /// between loads. Every release follows its own allocation, so this never
    /// drops below zero.
    #[inline]
    pub fn outstanding(&self) -> u64 {
        self.contexts_live.load(Ordering::Relaxed)
    }
}

/// Provider-private device record.
#[derive(Debug)]
pub struct NtrdmaDevice {
    ibdev: Arc<VerbsDevice>,
    stats: Arc<DeviceStats>,
}

impl NtrdmaDevice {
    pub fn new(ibdev: Arc<VerbsDevice>) -> Self {
        Self {
            ibdev,
            stats: Arc::new(DeviceStats::new()),
        }
    }

    /// The generic device this record backs.
    #[inline]
    pub fn ibdev(&self) -> &Arc<VerbsDevice> {
        &self.ibdev
    }

    #[inline]
    pub fn stats(&self) -> &Arc<DeviceStats> {
        &self.stats
    }
}
