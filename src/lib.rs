#![no_std]

//! # NTRDMA Userspace Verbs Provider
//!
//! This crate is the userspace provider for NTRDMA devices (RDMA over a
//! PCIe non-transparent bridge). It plugs into a host verbs library and
//! covers device discovery and the context lifecycle. It is designed for
//! `no_std` environments and uses the `alloc` crate for dynamic memory
//! allocation.
//!
//! ## Architecture
//!
//! ### Discovery
//! - [`ntrdma_device_match`]: decides whether a sysfs node is an NTRDMA device
//! - [`VerbsDeviceOps`]: the registration descriptor ([`NTRDMA_DEV_OPS`])
//! - [`ProviderRegistry`]: registered descriptors; [`register_driver`] adds ours
//!
//! ### Records
//! - [`VerbsDevice`]: generic device handle the host library keeps
//! - [`NtrdmaDevice`]: provider record behind it, owned by a [`DeviceTable`]
//! - [`VerbsContext`]: one per opened command fd, with its bound operation table
//!
//! ### Kernel Interface
//! - [`UverbsTransport`]: the host library's uverbs command layer
//! - [`abi`]: the `GET_CONTEXT` command and response
//!
//! ## Example
//!
//! ```rust,ignore
//! use ntrdma::{providers, register_driver, CmdFd};
//!
//! register_driver()?;
//!
//! for node in sysfs_nodes {
//!     let Some(ops) = providers().find(&node) else { continue };
//!
//!     let ibdev = (ops.alloc_device)(&node)?;
//!     let ctx = (ops.alloc_context)(&ibdev, transport.clone(), CmdFd(fd))?;
//!
//!     let attr = ctx.ops().query_device(&ctx)?;
//!
//!     (ops.free_context)(ctx);
//!     (ops.uninit_device)(ibdev);
//! }
//! ```

extern crate alloc;
#[macro_use]
extern crate log;

pub mod abi;
mod config;
mod context;
mod device;
mod matcher;
mod ops;
mod provider;
mod record;
mod registry;
mod sysfs;
mod transport;
pub mod verbs;

#[cfg(test)]
mod mock;

pub use config::{
    IBDEV_ATTR, IBDEV_ATTR_MAX, IBDEV_PREFIX, MAX_PROVIDERS, NTRDMA_ABI_VERSION, PROVIDER_NAME,
};
pub use context::VerbsContext;
pub use device::{DeviceId, DeviceStats, NtrdmaDevice, VerbsDevice};
pub use matcher::{ibdev_index, ntrdma_device_match};
pub use ops::{Capability, NTRDMA_VERBS, NtrdmaVerbs, VerbsOps};
pub use provider::{NTRDMA_DEV_OPS, ProviderRegistry, VerbsDeviceOps, providers, register_driver};
pub use registry::{DeviceTable, devices};
pub use sysfs::{AttrStore, SysfsDevice};
pub use transport::{CmdFd, UverbsTransport};
