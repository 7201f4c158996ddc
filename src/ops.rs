//! The verbs operation table bound into every context.
//!
//! [`VerbsOps`] has one method per capability the host library dispatches
//! to a provider. A context owns exactly one implementation, installed
//! when the context is built and never replaced.

use axerrno::AxResult;

use crate::context::VerbsContext;
use crate::verbs::{
    AhAttr, AhHandle, CqHandle, CqInit, DeviceAttr, MrHandle, MrRegion, PdHandle, PortAttr,
    QpAttr, QpAttrMask, QpHandle, QpInit, RecvWr, SendWr, WorkCompletion,
};

/// Named capability slots of the operation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    QueryDevice,
    QueryPort,
    AllocPd,
    DeallocPd,
    RegMr,
    DeregMr,
    CreateCq,
    PollCq,
    DestroyCq,
    CreateQp,
    ModifyQp,
    DestroyQp,
    QueryQp,
    PostSend,
    PostRecv,
    CreateAh,
    DestroyAh,
    ReqNotifyCq,
}

impl Capability {
    /// Every slot, in table order.
    pub const ALL: [Capability; 18] = [
        Capability::QueryDevice,
        Capability::QueryPort,
        Capability::AllocPd,
        Capability::DeallocPd,
        Capability::RegMr,
        Capability::DeregMr,
        Capability::CreateCq,
        Capability::PollCq,
        Capability::DestroyCq,
        Capability::CreateQp,
        Capability::ModifyQp,
        Capability::DestroyQp,
        Capability::QueryQp,
        Capability::PostSend,
        Capability::PostRecv,
        Capability::CreateAh,
        Capability::DestroyAh,
        Capability::ReqNotifyCq,
    ];

    /// Slot name as the host library spells it.
    pub const fn name(self) -> &'static str {
        match self {
            Capability::QueryDevice => "query_device",
            Capability::QueryPort => "query_port",
            Capability::AllocPd => "alloc_pd",
            Capability::DeallocPd => "dealloc_pd",
            Capability::RegMr => "reg_mr",
            Capability::DeregMr => "dereg_mr",
            Capability::CreateCq => "create_cq",
            Capability::PollCq => "poll_cq",
            Capability::DestroyCq => "destroy_cq",
            Capability::CreateQp => "create_qp",
            Capability::ModifyQp => "modify_qp",
            Capability::DestroyQp => "destroy_qp",
            Capability::QueryQp => "query_qp",
            Capability::PostSend => "post_send",
            Capability::PostRecv => "post_recv",
            Capability::CreateAh => "create_ah",
            Capability::DestroyAh => "destroy_ah",
            Capability::ReqNotifyCq => "req_notify_cq",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider operation table.
///
/// Every method receives the context it is dispatched through, which
/// carries the command fd and the host transport.
pub trait VerbsOps: Send + Sync {
    /// Slots this table binds.
    fn capabilities(&self) -> &'static [Capability];

    fn query_device(&self, ctx: &VerbsContext) -> AxResult<DeviceAttr>;

    fn query_port(&self, ctx: &VerbsContext, port_num: u8) -> AxResult<PortAttr>;

    fn alloc_pd(&self, ctx: &VerbsContext) -> AxResult<PdHandle>;

    fn dealloc_pd(&self, ctx: &VerbsContext, pd: PdHandle) -> AxResult;

    fn reg_mr(&self, ctx: &VerbsContext, pd: PdHandle, region: &MrRegion) -> AxResult<MrHandle>;

    fn dereg_mr(&self, ctx: &VerbsContext, mr: MrHandle) -> AxResult;

    fn create_cq(&self, ctx: &VerbsContext, init: &CqInit) -> AxResult<CqHandle>;

    fn poll_cq(&self, ctx: &VerbsContext, cq: CqHandle, wc: &mut [WorkCompletion])
    -> AxResult<usize>;

    fn destroy_cq(&self, ctx: &VerbsContext, cq: CqHandle) -> AxResult;

    fn create_qp(&self, ctx: &VerbsContext, init: &QpInit) -> AxResult<QpHandle>;

    fn modify_qp(&self, ctx: &VerbsContext, qp: QpHandle, attr: &QpAttr, mask: QpAttrMask)
    -> AxResult;

    fn destroy_qp(&self, ctx: &VerbsContext, qp: QpHandle) -> AxResult;

    fn query_qp(&self, ctx: &VerbsContext, qp: QpHandle, mask: QpAttrMask) -> AxResult<QpAttr>;

    fn post_send(&self, ctx: &VerbsContext, qp: QpHandle, wrs: &[SendWr]) -> AxResult;

    fn post_recv(&self, ctx: &VerbsContext, qp: QpHandle, wrs: &[RecvWr]) -> AxResult;

    fn create_ah(&self, ctx: &VerbsContext, pd: PdHandle, attr: &AhAttr) -> AxResult<AhHandle>;

    fn destroy_ah(&self, ctx: &VerbsContext, ah: AhHandle) -> AxResult;

    fn req_notify_cq(&self, ctx: &VerbsContext, cq: CqHandle, solicited_only: bool) -> AxResult;
}

/// NTRDMA operation table.
///
/// The NTRDMA data path lives in the kernel driver, so every slot is a
/// uverbs command over the context's fd.
#[derive(Debug, Default, Clone, Copy)]
pub struct NtrdmaVerbs;

/// The single table instance every NTRDMA context binds.
pub static NTRDMA_VERBS: NtrdmaVerbs = NtrdmaVerbs;

impl VerbsOps for NtrdmaVerbs {
    fn capabilities(&self) -> &'static [Capability] {
        &Capability::ALL
    }

    fn query_device(&self, ctx: &VerbsContext) -> AxResult<DeviceAttr> {
        ctx.transport().query_device(ctx.cmd_fd())
    }

    fn query_port(&self, ctx: &VerbsContext, port_num: u8) -> AxResult<PortAttr> {
        ctx.transport().query_port(ctx.cmd_fd(), port_num)
    }

    fn alloc_pd(&self, ctx: &VerbsContext) -> AxResult<PdHandle> {
        ctx.transport().alloc_pd(ctx.cmd_fd())
    }

    fn dealloc_pd(&self, ctx: &VerbsContext, pd: PdHandle) -> AxResult {
        ctx.transport().dealloc_pd(ctx.cmd_fd(), pd)
    }

    fn reg_mr(&self, ctx: &VerbsContext, pd: PdHandle, region: &MrRegion) -> AxResult<MrHandle> {
        trace!("ntrdma: reg_mr addr {:#x} len {:#x}", region.addr, region.length);
        ctx.transport().reg_mr(ctx.cmd_fd(), pd, region)
    }

    fn dereg_mr(&self, ctx: &VerbsContext, mr: MrHandle) -> AxResult {
        ctx.transport().dereg_mr(ctx.cmd_fd(), mr)
    }

    fn create_cq(&self, ctx: &VerbsContext, init: &CqInit) -> AxResult<CqHandle> {
        ctx.transport().create_cq(ctx.cmd_fd(), init)
    }

    fn poll_cq(
        &self,
        ctx: &VerbsContext,
        cq: CqHandle,
        wc: &mut [WorkCompletion],
    ) -> AxResult<usize> {
        if wc.is_empty() {
            return Ok(0);
        }
        ctx.transport().poll_cq(ctx.cmd_fd(), cq, wc)
    }

    fn destroy_cq(&self, ctx: &VerbsContext, cq: CqHandle) -> AxResult {
        ctx.transport().destroy_cq(ctx.cmd_fd(), cq)
    }

    fn create_qp(&self, ctx: &VerbsContext, init: &QpInit) -> AxResult<QpHandle> {
        ctx.transport().create_qp(ctx.cmd_fd(), init)
    }

    fn modify_qp(
        &self,
        ctx: &VerbsContext,
        qp: QpHandle,
        attr: &QpAttr,
        mask: QpAttrMask,
    ) -> AxResult {
        trace!("ntrdma: modify_qp {} mask {:#x}", qp.qp_num, mask.0);
        ctx.transport().modify_qp(ctx.cmd_fd(), qp, attr, mask)
    }

    fn destroy_qp(&self, ctx: &VerbsContext, qp: QpHandle) -> AxResult {
        ctx.transport().destroy_qp(ctx.cmd_fd(), qp)
    }

    fn query_qp(&self, ctx: &VerbsContext, qp: QpHandle, mask: QpAttrMask) -> AxResult<QpAttr> {
        ctx.transport().query_qp(ctx.cmd_fd(), qp, mask)
    }

    fn post_send(&self, ctx: &VerbsContext, qp: QpHandle, wrs: &[SendWr]) -> AxResult {
        if wrs.is_empty() {
            return Ok(());
        }
        ctx.transport().post_send(ctx.cmd_fd(), qp, wrs)
    }

    fn post_recv(&self, ctx: &VerbsContext, qp: QpHandle, wrs: &[RecvWr]) -> AxResult {
        if wrs.is_empty() {
            return Ok(());
        }
        ctx.transport().post_recv(ctx.cmd_fd(), qp, wrs)
    }

    fn create_ah(&self, ctx: &VerbsContext, pd: PdHandle, attr: &AhAttr) -> AxResult<AhHandle> {
        ctx.transport().create_ah(ctx.cmd_fd(), pd, attr)
    }

    fn destroy_ah(&self, ctx: &VerbsContext, ah: AhHandle) -> AxResult {
        ctx.transport().destroy_ah(ctx.cmd_fd(), ah)
    }

    fn req_notify_cq(&self, ctx: &VerbsContext, cq: CqHandle, solicited_only: bool) -> AxResult {
        ctx.transport().req_notify_cq(ctx.cmd_fd(), cq, solicited_only)
    }
}
