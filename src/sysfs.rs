//! Kernel-exposed device nodes and their attribute store.

use alloc::string::String;
use alloc::sync::Arc;

use arrayvec::ArrayString;
use axerrno::{AxError, AxResult};

/// Read access to a device node's named attributes.
pub trait AttrStore: Send + Sync {
    /// Reads attribute `name` into `buf` and returns the number of bytes
    /// the attribute produced.
    ///
    /// A return value of `buf.len()` or more means the value did not fit.
    fn read_attr(&self, name: &str, buf: &mut [u8]) -> AxResult<usize>;
}

/// A uverbs device node as enumerated by the host library.
pub struct SysfsDevice {
    /// Node name, e.g. `uverbs0`.
    pub sysfs_name: String,
    /// Path of the matching infiniband device directory.
    pub ibdev_path: String,
    /// Kernel ABI version advertised by the node.
    pub abi_ver: u32,
    attrs: Arc<dyn AttrStore>,
}

impl SysfsDevice {
    pub fn new(
        sysfs_name: impl Into<String>,
        ibdev_path: impl Into<String>,
        abi_ver: u32,
        attrs: Arc<dyn AttrStore>,
    ) -> Self {
        Self {
            sysfs_name: sysfs_name.into(),
            ibdev_path: ibdev_path.into(),
            abi_ver,
            attrs,
        }
    }

    /// Reads attribute `name` into a buffer of `N` bytes.
    ///
    /// A single trailing newline is stripped. Values that fill the whole
    /// buffer are reported as [`AxError::InvalidData`]: the read may have
    /// been truncated, and a truncated name must not be mistaken for a
    /// shorter one.
    pub fn read_attr<const N: usize>(&self, name: &str) -> AxResult<ArrayString<N>> {
        let mut buf = [0u8; N];
        let len = self.attrs.read_attr(name, &mut buf)?;
        if len >= N {
            return Err(AxError::InvalidData);
        }

        let mut value = &buf[..len];
        if let Some((b'\n', rest)) = value.split_last() {
            value = rest;
        }

        let value = core::str::from_utf8(value).map_err(|_| AxError::InvalidData)?;
        ArrayString::from(value).map_err(|_| AxError::InvalidData)
    }
}

impl core::fmt::Debug for SysfsDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SysfsDevice")
            .field("sysfs_name", &self.sysfs_name)
            .field("ibdev_path", &self.ibdev_path)
            .field("abi_ver", &self.abi_ver)
            .finish()
    }
}
