//! Kernel/userspace command ABI for the context handshake.
//!
//! These structures travel over the uverbs command fd and must match the
//! kernel driver byte for byte. They are encoded in native byte order, the
//! same order the kernel reads them in.

use core::mem::size_of;

/// Command number of `GET_CONTEXT` in the uverbs command space.
pub const UVERBS_CMD_GET_CONTEXT: u32 = 0;

/// Common header preceding every uverbs write command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct UverbsCmdHdr {
    /// Command number.
    pub command: u32,
    /// Command length in 32-bit words, header included.
    pub in_words: u16,
    /// Response length in 32-bit words.
    pub out_words: u16,
}

/// `GET_CONTEXT` request.
///
/// `response` is the userspace address the kernel writes the response to.
/// It is filled in by the host transport, never by the provider.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct GetContextCmd {
    pub hdr: UverbsCmdHdr,
    pub response: u64,
}

/// `GET_CONTEXT` response.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct GetContextResp {
    /// File descriptor for asynchronous events.
    pub async_fd: u32,
    /// Number of completion vectors the device exposes.
    pub num_comp_vectors: u32,
}

pub const GET_CONTEXT_CMD_SIZE: usize = size_of::<GetContextCmd>();
pub const GET_CONTEXT_RESP_SIZE: usize = size_of::<GetContextResp>();

const _: () = assert!(GET_CONTEXT_CMD_SIZE == 16);
const _: () = assert!(GET_CONTEXT_RESP_SIZE == 8);

impl GetContextCmd {
    /// Builds a request whose header describes this command and a response
    /// of [`GET_CONTEXT_RESP_SIZE`] bytes.
    pub const fn new() -> Self {
        Self {
            hdr: UverbsCmdHdr {
                command: UVERBS_CMD_GET_CONTEXT,
                in_words: (GET_CONTEXT_CMD_SIZE / 4) as u16,
                out_words: (GET_CONTEXT_RESP_SIZE / 4) as u16,
            },
            response: 0,
        }
    }

    /// Encodes the request in wire layout.
    pub fn to_bytes(&self) -> [u8; GET_CONTEXT_CMD_SIZE] {
        let mut buf = [0u8; GET_CONTEXT_CMD_SIZE];
        buf[0..4].copy_from_slice(&self.hdr.command.to_ne_bytes());
        buf[4..6].copy_from_slice(&self.hdr.in_words.to_ne_bytes());
        buf[6..8].copy_from_slice(&self.hdr.out_words.to_ne_bytes());
        buf[8..16].copy_from_slice(&self.response.to_ne_bytes());
        buf
    }

    /// Decodes a request from wire layout.
    pub fn from_bytes(buf: &[u8; GET_CONTEXT_CMD_SIZE]) -> Self {
        Self {
            hdr: UverbsCmdHdr {
                command: u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]),
                in_words: u16::from_ne_bytes([buf[4], buf[5]]),
                out_words: u16::from_ne_bytes([buf[6], buf[7]]),
            },
            response: u64::from_ne_bytes([
                buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
            ]),
        }
    }
}

impl GetContextResp {
    pub fn to_bytes(&self) -> [u8; GET_CONTEXT_RESP_SIZE] {
        let mut buf = [0u8; GET_CONTEXT_RESP_SIZE];
        buf[0..4].copy_from_slice(&self.async_fd.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.num_comp_vectors.to_ne_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; GET_CONTEXT_RESP_SIZE]) -> Self {
        Self {
            async_fd: u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]),
            num_comp_vectors: u32::from_ne_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }
}
