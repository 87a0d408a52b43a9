//! Shared fixtures for the lookup integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use mslsad::{ContextHandle, RpcTransport, TransportError};
use std::io;
use tokio::sync::Mutex;

/// Policy handle from a captured `LsarOpenPolicy2` exchange
pub const POLICY_HANDLE: &str = "000000008e3039708fdd9f488f9665426d0d9c57";

/// `LsarLookupNames` request for "Administrator" at the workstation level
pub const ADMINISTRATOR_REQUEST: &str = "000000008e3039708fdd9f488f9665426d0d9c57\
    01000000010000001a001a00000002000d000000000000000d000000\
    410064006d0069006e006900730074007200610074006f007200\
    000000000000000000000100000000000000";

/// Response to [`ADMINISTRATOR_REQUEST`]: one domain, RID 500, fully mapped
pub const ADMINISTRATOR_RESPONSE: &str = "00000200010000000400020020000000010000001a001c00080002000c000200\
    0e000000000000000d0000005700310030002d0045004e0054002d005800360034002d00550000000400000001040000\
    0000000515000000a43cb4affe0503bd73de0f35\
    01000000100002000100000001000000f401000000000000\
    0100000000000000";

/// Same domain, four translated entries: RIDs 500, 1001 and 501 mapped, the
/// last one unknown, status `STATUS_SOME_NOT_MAPPED`
pub const PARTIAL_RESPONSE: &str = "00000200010000000400020020000000010000001a001c00080002000c000200\
    0e000000000000000d0000005700310030002d0045004e0054002d005800360034002d00550000000400000001040000\
    0000000515000000a43cb4affe0503bd73de0f35\
    04000000100002000400000001000000f40100000000000001000000e90300000000000001000000f501000000000000\
    0800000000000000ffffffff\
    0300000007010000";

pub const DOMAIN_SID: &str = "S-1-5-21-2947824804-3171091966-890232435";

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn policy_handle() -> ContextHandle {
    POLICY_HANDLE.parse().unwrap()
}

pub fn stub(hex_str: &str) -> Bytes {
    Bytes::from(hex::decode(hex_str).unwrap())
}

/// Transport that records each request and answers with a canned stub
pub struct MockTransport {
    reply: Result<Bytes, String>,
    calls: Mutex<Vec<(u16, Bytes)>>,
}

impl MockTransport {
    pub fn replying(reply: Bytes) -> Self {
        Self {
            reply: Ok(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<(u16, Bytes)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes, TransportError> {
        self.calls.lock().await.push((opnum, stub_data));
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(Box::new(io::Error::new(io::ErrorKind::ConnectionReset, message.clone()))),
        }
    }
}
