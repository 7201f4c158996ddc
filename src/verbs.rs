//! Verbs data model exchanged through the operation table.
//!
//! Handles are opaque kernel object handles returned by the uverbs commands.
//! Attribute structures carry only the fields the NTRDMA driver consumes.

use alloc::vec::Vec;

/// Protection domain handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdHandle(pub u32);

/// Memory region handle and its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MrHandle {
    pub handle: u32,
    pub lkey: u32,
    pub rkey: u32,
}

/// Completion queue handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CqHandle(pub u32);

/// Queue pair handle and its queue pair number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QpHandle {
    pub handle: u32,
    pub qp_num: u32,
}

/// Address handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AhHandle(pub u32);

/// Device capabilities reported by `query_device`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAttr {
    pub fw_ver: u64,
    pub node_guid: u64,
    pub sys_image_guid: u64,
    pub max_mr_size: u64,
    pub vendor_id: u32,
    pub vendor_part_id: u32,
    pub hw_ver: u32,
    pub max_qp: u32,
    pub max_qp_wr: u32,
    pub max_sge: u32,
    pub max_cq: u32,
    pub max_cqe: u32,
    pub max_mr: u32,
    pub max_pd: u32,
    pub max_ah: u32,
    pub phys_port_cnt: u8,
}

/// Path MTU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mtu {
    Mtu256,
    Mtu512,
    #[default]
    Mtu1024,
    Mtu2048,
    Mtu4096,
}

impl Mtu {
    /// MTU in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Mtu::Mtu256 => 256,
            Mtu::Mtu512 => 512,
            Mtu::Mtu1024 => 1024,
            Mtu::Mtu2048 => 2048,
            Mtu::Mtu4096 => 4096,
        }
    }
}

/// Logical port state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    #[default]
    Nop,
    Down,
    Init,
    Armed,
    Active,
    ActiveDefer,
}

/// Port attributes reported by `query_port`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PortAttr {
    pub state: PortState,
    pub max_mtu: Mtu,
    pub active_mtu: Mtu,
    pub gid_tbl_len: u32,
    pub port_cap_flags: u32,
    pub max_msg_sz: u32,
    pub lid: u16,
    pub sm_lid: u16,
}

/// Memory and queue pair access rights.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccessFlags(pub u32);

impl AccessFlags {
    pub const LOCAL_WRITE: Self = Self(1 << 0);
    pub const REMOTE_WRITE: Self = Self(1 << 1);
    pub const REMOTE_READ: Self = Self(1 << 2);
    pub const REMOTE_ATOMIC: Self = Self(1 << 3);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for AccessFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Memory to register: a userspace range and the I/O virtual address the
/// device uses for it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MrRegion {
    pub addr: u64,
    pub length: u64,
    pub hca_va: u64,
    pub access: AccessFlags,
}

/// Completion queue creation parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CqInit {
    pub cqe: u32,
    pub comp_vector: u32,
}

/// Transport service type of a queue pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QpType {
    #[default]
    Rc,
    Uc,
    Ud,
}

/// Queue pair work queue sizes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QpCap {
    pub max_send_wr: u32,
    pub max_recv_wr: u32,
    pub max_send_sge: u32,
    pub max_recv_sge: u32,
    pub max_inline_data: u32,
}

/// Queue pair creation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QpInit {
    pub pd: PdHandle,
    pub send_cq: CqHandle,
    pub recv_cq: CqHandle,
    pub qp_type: QpType,
    pub cap: QpCap,
    pub sq_sig_all: bool,
}

/// Queue pair state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QpState {
    #[default]
    Reset,
    Init,
    Rtr,
    Rts,
    Sqd,
    Sqe,
    Err,
}

/// Global routing header fields of an address vector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRoute {
    pub dgid: [u8; 16],
    pub flow_label: u32,
    pub sgid_index: u8,
    pub hop_limit: u8,
    pub traffic_class: u8,
}

/// Address vector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AhAttr {
    pub grh: Option<GlobalRoute>,
    pub dlid: u16,
    pub sl: u8,
    pub src_path_bits: u8,
    pub static_rate: u8,
    pub port_num: u8,
}

/// Queue pair attributes for `modify_qp` / `query_qp`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QpAttr {
    pub qp_state: QpState,
    pub cur_qp_state: QpState,
    pub path_mtu: Mtu,
    pub qp_access_flags: AccessFlags,
    pub ah_attr: AhAttr,
    pub cap: QpCap,
    pub qkey: u32,
    pub rq_psn: u32,
    pub sq_psn: u32,
    pub dest_qp_num: u32,
    pub pkey_index: u16,
    pub port_num: u8,
    pub max_rd_atomic: u8,
    pub max_dest_rd_atomic: u8,
    pub min_rnr_timer: u8,
    pub timeout: u8,
    pub retry_cnt: u8,
    pub rnr_retry: u8,
}

/// Selects which [`QpAttr`] fields a `modify_qp` / `query_qp` call touches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QpAttrMask(pub u32);

impl QpAttrMask {
    pub const STATE: Self = Self(1 << 0);
    pub const CUR_STATE: Self = Self(1 << 1);
    pub const ACCESS_FLAGS: Self = Self(1 << 3);
    pub const PKEY_INDEX: Self = Self(1 << 4);
    pub const PORT: Self = Self(1 << 5);
    pub const QKEY: Self = Self(1 << 6);
    pub const AV: Self = Self(1 << 7);
    pub const PATH_MTU: Self = Self(1 << 8);
    pub const TIMEOUT: Self = Self(1 << 9);
    pub const RETRY_CNT: Self = Self(1 << 10);
    pub const RNR_RETRY: Self = Self(1 << 11);
    pub const RQ_PSN: Self = Self(1 << 12);
    pub const MAX_QP_RD_ATOMIC: Self = Self(1 << 13);
    pub const MIN_RNR_TIMER: Self = Self(1 << 15);
    pub const SQ_PSN: Self = Self(1 << 16);
    pub const MAX_DEST_RD_ATOMIC: Self = Self(1 << 17);
    pub const CAP: Self = Self(1 << 19);
    pub const DEST_QPN: Self = Self(1 << 20);

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for QpAttrMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Scatter/gather element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sge {
    pub addr: u64,
    pub length: u32,
    pub lkey: u32,
}

/// Send work request opcode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WrOpcode {
    #[default]
    Send,
    SendWithImm,
    RdmaWrite,
    RdmaWriteWithImm,
    RdmaRead,
}

/// Send work request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SendWr {
    pub wr_id: u64,
    pub opcode: WrOpcode,
    pub sg_list: Vec<Sge>,
    pub send_flags: u32,
    pub imm_data: u32,
    pub remote_addr: u64,
    pub rkey: u32,
}

impl SendWr {
    pub const SIGNALED: u32 = 1 << 1;
    pub const SOLICITED: u32 = 1 << 2;
    pub const INLINE: u32 = 1 << 3;
}

/// Receive work request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecvWr {
    pub wr_id: u64,
    pub sg_list: Vec<Sge>,
}

/// Work completion status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WcStatus {
    #[default]
    Success,
    LocLenErr,
    LocQpOpErr,
    LocProtErr,
    WrFlushErr,
    RemAccessErr,
    RemOpErr,
    RetryExcErr,
    GeneralErr,
}

/// Work completion opcode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WcOpcode {
    #[default]
    Send,
    RdmaWrite,
    RdmaRead,
    Recv,
    RecvRdmaWithImm,
}

/// Work completion entry filled in by `poll_cq`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkCompletion {
    pub wr_id: u64,
    pub status: WcStatus,
    pub opcode: WcOpcode,
    pub byte_len: u32,
    pub qp_num: u32,
    pub imm_data: Option<u32>,
}
