//! Seam between the provider and the host library's uverbs command layer.
//!
//! The host library owns the command fd and the wire encoding of every
//! command except `GET_CONTEXT`, whose request and response the provider
//! builds itself (see [`crate::abi`]). Everything else goes through the
//! typed command helpers below.

use axerrno::AxResult;

use crate::verbs::{
    AhAttr, AhHandle, CqHandle, CqInit, DeviceAttr, MrHandle, MrRegion, PdHandle, PortAttr,
    QpAttr, QpAttrMask, QpHandle, QpInit, RecvWr, SendWr, WorkCompletion,
};

/// Open uverbs command file descriptor.
///
/// Borrowed from the host library for the lifetime of a context; the
/// provider never closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CmdFd(pub i32);

impl CmdFd {
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Host library command transport.
///
/// Every call is synchronous: it blocks until the kernel driver answers or
/// the transport fails.
pub trait UverbsTransport: Send + Sync {
    /// Generic command primitive: writes `cmd` to `fd` and fills `resp` with
    /// the kernel's answer.
    ///
    /// The transport patches the response address into the command before
    /// issuing it.
    fn write(&self, fd: CmdFd, cmd: &[u8], resp: &mut [u8]) -> AxResult;

    fn query_device(&self, fd: CmdFd) -> AxResult<DeviceAttr>;

    fn query_port(&self, fd: CmdFd, port_num: u8) -> AxResult<PortAttr>;

    fn alloc_pd(&self, fd: CmdFd) -> AxResult<PdHandle>;

    fn dealloc_pd(&self, fd: CmdFd, pd: PdHandle) -> AxResult;

    fn reg_mr(&self, fd: CmdFd, pd: PdHandle, region: &MrRegion) -> AxResult<MrHandle>;

    fn dereg_mr(&self, fd: CmdFd, mr: MrHandle) -> AxResult;

    fn create_cq(&self, fd: CmdFd, init: &CqInit) -> AxResult<CqHandle>;

    /// Fills `wc` from the front and returns the number of entries written.
    fn poll_cq(&self, fd: CmdFd, cq: CqHandle, wc: &mut [WorkCompletion]) -> AxResult<usize>;

    fn destroy_cq(&self, fd: CmdFd, cq: CqHandle) -> AxResult;

    fn create_qp(&self, fd: CmdFd, init: &QpInit) -> AxResult<QpHandle>;

    fn modify_qp(&self, fd: CmdFd, qp: QpHandle, attr: &QpAttr, mask: QpAttrMask) -> AxResult;

    fn query_qp(&self, fd: CmdFd, qp: QpHandle, mask: QpAttrMask) -> AxResult<QpAttr>;

    fn destroy_qp(&self, fd: CmdFd, qp: QpHandle) -> AxResult;

    fn post_send(&self, fd: CmdFd, qp: QpHandle, wrs: &[SendWr]) -> AxResult;

    fn post_recv(&self, fd: CmdFd, qp: QpHandle, wrs: &[RecvWr]) -> AxResult;

    fn create_ah(&self, fd: CmdFd, pd: PdHandle, attr: &AhAttr) -> AxResult<AhHandle>;

    fn destroy_ah(&self, fd: CmdFd, ah: AhHandle) -> AxResult;

    fn req_notify_cq(&self, fd: CmdFd, cq: CqHandle, solicited_only: bool) -> AxResult;
}
