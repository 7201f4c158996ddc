//! Verbs contexts: one per opened uverbs command fd.
//!
//! A context is built in three steps: its storage is allocated, the kernel
//! driver is asked for a context with the `GET_CONTEXT` command, and the
//! operation table is bound. A context that fails any step is released
//! before the error reaches the caller, so only fully bound contexts are
//! ever observable.

use alloc::boxed::Box;
use alloc::sync::Arc;

use axerrno::AxResult;

use crate::abi::{GET_CONTEXT_RESP_SIZE, GetContextCmd, GetContextResp};
use crate::device::{DeviceStats, VerbsDevice};
use crate::ops::{Capability, NTRDMA_VERBS, VerbsOps};
use crate::record::{init_box, try_new_uninit};
use crate::transport::{CmdFd, UverbsTransport};

/// A userspace handle bound to one open command fd.
pub struct VerbsContext {
    cmd_fd: CmdFd,
    device: Arc<VerbsDevice>,
    transport: Arc<dyn UverbsTransport>,
    resp: GetContextResp,
    ops: &'static dyn VerbsOps,
    stats: Arc<DeviceStats>,
}

impl VerbsContext {
    /// Performs the context handshake on `cmd_fd` and returns the bound
    /// context.
    ///
    /// The fd is borrowed: it is neither closed here nor when the context
    /// is dropped.
    pub(crate) fn open(
        device: &Arc<VerbsDevice>,
        stats: Arc<DeviceStats>,
        transport: Arc<dyn UverbsTransport>,
        cmd_fd: CmdFd,
    ) -> AxResult<Box<Self>> {
        let slot = try_new_uninit::<Self>()?;
        stats.record_alloc();

        let resp = match get_context(transport.as_ref(), cmd_fd) {
            Ok(resp) => resp,
            Err(err) => {
                drop(slot);
                stats.record_release();
                stats.record_handshake_failure();
                trace!("ntrdma: get_context on fd {} failed: {:?}", cmd_fd.raw(), err);
                return Err(err);
            }
        };

        trace!(
            "ntrdma: context on fd {}: async_fd {} comp_vectors {}",
            cmd_fd.raw(),
            resp.async_fd,
            resp.num_comp_vectors
        );

        Ok(init_box(
            slot,
            Self {
                cmd_fd,
                device: Arc::clone(device),
                transport,
                resp,
                ops: &NTRDMA_VERBS,
                stats,
            },
        ))
    }

    /// The borrowed command fd.
    #[inline]
    pub fn cmd_fd(&self) -> CmdFd {
        self.cmd_fd
    }

    /// The device this context was opened on.
    #[inline]
    pub fn device(&self) -> &Arc<VerbsDevice> {
        &self.device
    }

    #[inline]
    pub fn transport(&self) -> &dyn UverbsTransport {
        self.transport.as_ref()
    }

    /// The bound operation table.
    #[inline]
    pub fn ops(&self) -> &'static dyn VerbsOps {
        self.ops
    }

    #[inline]
    pub fn capabilities(&self) -> &'static [Capability] {
        self.ops.capabilities()
    }

    /// Asynchronous event fd returned by the kernel.
    #[inline]
    pub fn async_fd(&self) -> u32 {
        self.resp.async_fd
    }

    #[inline]
    pub fn num_comp_vectors(&self) -> u32 {
        self.resp.num_comp_vectors
    }
}

impl Drop for VerbsContext {
    fn drop(&mut self) {
        self.stats.record_release();
        trace!("ntrdma: context on fd {} released", self.cmd_fd.raw());
    }
}

impl core::fmt::Debug for VerbsContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VerbsContext")
            .field("cmd_fd", &self.cmd_fd)
            .field("device", &self.device.id())
            .field("async_fd", &self.resp.async_fd)
            .field("num_comp_vectors", &self.resp.num_comp_vectors)
            .finish()
    }
}

/// Exchanges `GET_CONTEXT` with the kernel driver.
fn get_context(transport: &dyn UverbsTransport, cmd_fd: CmdFd) -> AxResult<GetContextResp> {
    let cmd = GetContextCmd::new().to_bytes();
    let mut resp = [0u8; GET_CONTEXT_RESP_SIZE];
    transport.write(cmd_fd, &cmd, &mut resp)?;
    Ok(GetContextResp::from_bytes(&resp))
}
