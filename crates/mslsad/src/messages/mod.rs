//! Request and response stubs for the lookup operations
//!
//! Each message owns one [`NdrCursor`] for the whole stub, so alignment and
//! referent IDs run across all of its parameters.

mod lookup_names;
mod lookup_sids;

pub use lookup_names::{LookupNamesRequest, LookupNamesResponse};
pub use lookup_sids::{LookupSidsRequest, LookupSidsResponse};

use midl_ndr::{Bytes, BytesMut, NdrContext, NdrCursor};

fn encode_stub<F>(write: F) -> midl_ndr::Result<Bytes>
where
    F: FnOnce(&mut BytesMut, &NdrContext, &mut NdrCursor) -> midl_ndr::Result<()>,
{
    let ctx = NdrContext::new();
    let mut buf = BytesMut::new();
    let mut cursor = NdrCursor::new();
    write(&mut buf, &ctx, &mut cursor)?;
    Ok(buf.freeze())
}

fn decode_stub<T, F>(stub: &[u8], read: F) -> midl_ndr::Result<T>
where
    F: FnOnce(&mut &[u8], &NdrContext, &mut NdrCursor) -> midl_ndr::Result<T>,
{
    let ctx = NdrContext::new();
    let mut reader = stub;
    let mut cursor = NdrCursor::new();
    read(&mut reader, &ctx, &mut cursor)
}
