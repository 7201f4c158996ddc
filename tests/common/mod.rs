#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axerrno::{AxError, AxResult};
use ntrdma::abi::{GET_CONTEXT_CMD_SIZE, GET_CONTEXT_RESP_SIZE, GetContextCmd, GetContextResp};
use ntrdma::verbs::*;
use ntrdma::{AttrStore, Capability, CmdFd, SysfsDevice, UverbsTransport};

pub struct FakeAttrs(HashMap<String, String>);

impl AttrStore for FakeAttrs {
    fn read_attr(&self, name: &str, buf: &mut [u8]) -> AxResult<usize> {
        let value = self.0.get(name).ok_or(AxError::NotFound)?.as_bytes();
        let len = value.len().min(buf.len());
        buf[..len].copy_from_slice(&value[..len]);
        Ok(value.len())
    }
}

/// Builds a uverbs node whose `ibdev` attribute reads `ibdev` plus the
/// usual sysfs newline.
pub fn node(uverbs: &str, ibdev: &str, abi_ver: u32) -> SysfsDevice {
    let mut attrs = HashMap::new();
    attrs.insert("ibdev".to_string(), format!("{ibdev}\n"));
    SysfsDevice::new(
        uverbs,
        format!("/sys/class/infiniband/{ibdev}"),
        abi_ver,
        Arc::new(FakeAttrs(attrs)),
    )
}

/// Kernel stand-in. Its handshake path never allocates, so it can run
/// inside an allocation-tracking window.
pub struct FakeKernel {
    reject: Option<AxError>,
    handshakes: AtomicUsize,
    calls: Mutex<Vec<(CmdFd, Capability)>>,
}

impl FakeKernel {
    pub const ASYNC_FD: u32 = 11;
    pub const COMP_VECTORS: u32 = 4;

    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reject: None,
            handshakes: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(err: AxError) -> Arc<Self> {
        Arc::new(Self {
            reject: Some(err),
            handshakes: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(CmdFd, Capability)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, fd: CmdFd, cap: Capability) {
        self.calls.lock().unwrap().push((fd, cap));
    }
}

impl UverbsTransport for FakeKernel {
    fn write(&self, _fd: CmdFd, cmd: &[u8], resp: &mut [u8]) -> AxResult {
        self.handshakes.fetch_add(1, Ordering::SeqCst);

        let cmd: &[u8; GET_CONTEXT_CMD_SIZE] = cmd.try_into().map_err(|_| AxError::InvalidInput)?;
        let cmd = GetContextCmd::from_bytes(cmd);
        if cmd.hdr.in_words as usize * 4 != GET_CONTEXT_CMD_SIZE
            || cmd.hdr.out_words as usize * 4 != resp.len()
            || resp.len() != GET_CONTEXT_RESP_SIZE
        {
            return Err(AxError::InvalidInput);
        }
        if let Some(err) = self.reject {
            return Err(err);
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
            vendor_id: 0x1092,
            max_qp: 256,
            phys_port_cnt: 1,
            ..Default::default()
        })
    }

    fn query_port(&self, fd: CmdFd, port_num: u8) -> AxResult<PortAttr> {
        self.record(fd, Capability::QueryPort);
        if port_num != 1 {
            return Err(AxError::InvalidInput);
        }
        Ok(PortAttr {
            state: PortState::Active,
            active_mtu: Mtu::Mtu4096,
            ..Default::default()
        })
    }

    fn alloc_pd(&self, fd: CmdFd) -> AxResult<PdHandle> {
        self.record(fd, Capability::AllocPd);
        Ok(PdHandle(3))
    }

    fn dealloc_pd(&self, fd: CmdFd, _pd: PdHandle) -> AxResult {
        self.record(fd, Capability::DeallocPd);
        Ok(())
    }

    fn reg_mr(&self, fd: CmdFd, _pd: PdHandle, _region: &MrRegion) -> AxResult<MrHandle> {
        self.record(fd, Capability::RegMr);
        Ok(MrHandle { handle: 5, lkey: 0x500, rkey: 0x501 })
    }

    fn dereg_mr(&self, fd: CmdFd, _mr: MrHandle) -> AxResult {
        self.record(fd, Capability::DeregMr);
        Ok(())
    }

    fn create_cq(&self, fd: CmdFd, _init: &CqInit) -> AxResult<CqHandle> {
        self.record(fd, Capability::CreateCq);
        Ok(CqHandle(7))
    }

    fn poll_cq(&self, fd: CmdFd, _cq: CqHandle, wc: &mut [WorkCompletion]) -> AxResult<usize> {
        self.record(fd, Capability::PollCq);
        wc[0] = WorkCompletion {
            wr_id: 0xabc,
            opcode: WcOpcode::Send,
            byte_len: 64,
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
        Ok(QpHandle { handle: 9, qp_num: 0x42 })
    }

    fn modify_qp(&self, fd: CmdFd, _qp: QpHandle, _attr: &QpAttr, _mask: QpAttrMask) -> AxResult {
        self.record(fd, Capability::ModifyQp);
        Ok(())
    }

    fn query_qp(&self, fd: CmdFd, _qp: QpHandle, _mask: QpAttrMask) -> AxResult<QpAttr> {
        self.record(fd, Capability::QueryQp);
        Ok(QpAttr {
            qp_state: QpState::Init,
            ..Default::default()
        })
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
        Ok(AhHandle(2))
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
