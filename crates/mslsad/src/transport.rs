//! The RPC channel the lookups run over
//!
//! Binding, authentication and the policy handle are set up elsewhere; this
//! layer only needs a way to send one request stub for an operation number
//! and receive the response stub.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Failure reported by the underlying channel, passed through unchanged
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// A bound connection to the `lsarpc` interface
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send the NDR stub for `opnum` and return the response stub
    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes, TransportError> {
        (**self).call(opnum, stub_data).await
    }
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for &T {
    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes, TransportError> {
        (**self).call(opnum, stub_data).await
    }
}
