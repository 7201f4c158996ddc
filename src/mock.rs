//! Mock attribute store and kernel transport for unit tests.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use axerrno::{AxError, AxResult};
use spin::Mutex;

use crate::abi::{GET_CONTEXT_CMD_SIZE, GET_CONTEXT_RESP_SIZE, GetContextCmd, GetContextResp};
use crate::ops::Capability;
use crate::sysfs::{AttrStore, SysfsDevice};
use crate::transport::{CmdFd, UverbsTransport};
use crate::verbs::*;

pub struct MockAttrs {
    attrs: BTreeMap<String, Vec<u8>>,
    fail: bool,
}

impl MockAttrs {
    pub fn device(name: &str, value: &str) -> SysfsDevice {
        Self::device_raw(name, value.as_bytes())
    }

    pub fn device_raw(name: &str, value: &[u8]) -> SysfsDevice {
        let mut attrs = BTreeMap::new();
        attrs.insert(String::from(name), value.to_vec());
        Self::wrap(Self { attrs, fail: false })
    }

    pub fn failing() -> SysfsDevice {
        Self::wrap(Self {
            attrs: BTreeMap::new(),
            fail: true,
        })
    }

    fn wrap(store: Self) -> SysfsDevice {
        SysfsDevice::new("uverbs0", "/sys/class/infiniband/test", 1, Arc::new(store))
    }
}

impl AttrStore for MockAttrs {
    fn read_attr(&self, name: &str, buf: &mut [u8]) -> AxResult<usize> {
        if self.fail {
            return Err(AxError::Io);
        }
        let value = self.attrs.get(name).ok_or(AxError::NotFound)?;
        let len = value.len().min(buf.len());
        buf[..len].copy_from_slice(&value[..len]);
        Ok(value.len())
    }
}

pub struct MockTransport {
    handshake_error: Option<AxError>,
    handshakes: AtomicUsize,
    last_get_context: Mutex<Option<(CmdFd, GetContextCmd)>>,
    calls: Mutex<Vec<(CmdFd, Capability)>>,
}

impl MockTransport {
    pub const ASYNC_FD: u32 = 9;
    pub const COMP_VECTORS: u32 = 2;

    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            handshake_error: None,
            handshakes: AtomicUsize::new(0),
            last_get_context: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: AxError) -> Arc<Self> {
        Arc::new(Self {
            handshake_error: Some(err),
            handshakes: AtomicUsize::new(0),
            last_get_context: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn last_get_context(&self) -> Option<(CmdFd, GetContextCmd)> {
        *self.last_get_context.lock()
    }

    pub fn calls(&self) -> Vec<(CmdFd, Capability)> {
        self.calls.lock().clone()
    }

    fn record(&self, fd: CmdFd, cap: Capability) {
        self.calls.lock().push((fd, cap));
    }
}

impl UverbsTransport for MockTransport {
    fn write(&self, fd: CmdFd, cmd: &[u8], resp: &mut [u8]) -> AxResult {
        self.handshakes.fetch_add(1, Ordering::SeqCst);

        let cmd: &[u8; GET_CONTEXT_CMD_SIZE] = cmd.try_into().map_err(|_| AxError::InvalidInput)?;
        *self.last_get_context.lock() = Some((fd, GetContextCmd::from_bytes(cmd)));

        if let Some(err) = self.handshake_error {
            return Err(err);
        }
        if resp.len() != GET_CONTEXT_RESP_SIZE {
            return Err(AxError::InvalidInput);
        }
        let answer = GetContextResp {
            async_fd: Self::ASYNC_FD,
            num_comp_vectors: Self::COMP_VECTORS,
        };
        resp.copy_from_slice(&answer.to_bytes());
        Ok(())
    }

    fn query_device(&self, fd: CmdFd) -> AxResult<DeviceAttr> {
        self.record(fd, Capability::QueryDevice);
        Ok(DeviceAttr {
            max_qp: 64,
            phys_port_cnt: 1,
            ..Default::default()
        })
    }

    fn query_port(&self, fd: CmdFd, _port_num: u8) -> AxResult<PortAttr> {
        self.record(fd, Capability::QueryPort);
        Ok(PortAttr {
            state: PortState::Active,
            ..Default::default()
        })
    }

    fn alloc_pd(&self, fd: CmdFd) -> AxResult<PdHandle> {
        self.record(fd, Capability::AllocPd);
        Ok(PdHandle(1))
    }

    fn dealloc_pd(&self, fd: CmdFd, _pd: PdHandle) -> AxResult {
        self.record(fd, Capability::DeallocPd);
        Ok(())
    }

    fn reg_mr(&self, fd: CmdFd, _pd: PdHandle, _region: &MrRegion) -> AxResult<MrHandle> {
        self.record(fd, Capability::RegMr);
        Ok(MrHandle { handle: 1, lkey: 0x100, rkey: 0x200 })
    }

    fn dereg_mr(&self, fd: CmdFd, _mr: MrHandle) -> AxResult {
        self.record(fd, Capability::DeregMr);
        Ok(())
    }

    fn create_cq(&self, fd: CmdFd, _init: &CqInit) -> AxResult<CqHandle> {
        self.record(fd, Capability::CreateCq);
        Ok(CqHandle(1))
    }

    fn poll_cq(&self, fd: CmdFd, _cq: CqHandle, wc: &mut [WorkCompletion]) -> AxResult<usize> {
        self.record(fd, Capability::PollCq);
        wc[0] = WorkCompletion {
            wr_id: 42,
            ..Default::default()
        };
        Ok(1)
    }

    fn destroy_cq(&self, fd: CmdFd, _cq: CqHandle) -> AxResult {
        self.record(fd, Capability::DestroyCq);
        Ok(())
    }

    fn create_qp(&self, fd: CmdFd, _init: &QpInit) -> AxResult<QpHandle> {
        self.record(fd, Capability::CreateQp);
        Ok(QpHandle { handle: 1, qp_num: 0x11 })
    }

    fn modify_qp(&self, fd: CmdFd, _qp: QpHandle, _attr: &QpAttr, _mask: QpAttrMask) -> AxResult {
        self.record(fd, Capability::ModifyQp);
        Ok(())
    }

    fn query_qp(&self, fd: CmdFd, _qp: QpHandle, _mask: QpAttrMask) -> AxResult<QpAttr> {
        self.record(fd, Capability::QueryQp);
        Ok(QpAttr::default())
    }

    fn destroy_qp(&self, fd: CmdFd, _qp: QpHandle) -> AxResult {
        self.record(fd, Capability::DestroyQp);
        Ok(())
    }

    fn post_send(&self, fd: CmdFd, _qp: QpHandle, _wrs: &[SendWr]) -> AxResult {
        self.record(fd, Capability::PostSend);
        Ok(())
    }

    fn post_recv(&self, fd: CmdFd, _qp: QpHandle, _wrs: &[RecvWr]) -> AxResult {
        self.record(fd, Capability::PostRecv);
        Ok(())
    }

    fn create_ah(&self, fd: CmdFd, _pd: PdHandle, _attr: &AhAttr) -> AxResult<AhHandle> {
        self.record(fd, Capability::CreateAh);
        Ok(AhHandle(1))
    }

    fn destroy_ah(&self, fd: CmdFd, _ah: AhHandle) -> AxResult {
        self.record(fd, Capability::DestroyAh);
        Ok(())
    }

    fn req_notify_cq(&self, fd: CmdFd, _cq: CqHandle, _solicited_only: bool) -> AxResult {
        self.record(fd, Capability::ReqNotifyCq);
        Ok(())
    }
}
