//! NDR primitive type implementations
//!
//! NDR primitive types and their encodings:
//!
//! | MIDL Type     | Rust Type | Size | Alignment |
//! |---------------|-----------|------|-----------|
//! | boolean       | bool      | 1    | 1         |
//! | byte/char     | u8        | 1    | 1         |
//! | small         | i8        | 1    | 1         |
//! | short         | i16       | 2    | 2         |
//! | long/int      | i32       | 4    | 4         |
//! | hyper         | i64       | 8    | 8         |
//! | unsigned short| u16       | 2    | 2         |
//! | unsigned long | u32       | 4    | 4         |
//! | unsigned hyper| u64       | 8    | 8         |
//! | wchar_t       | u16       | 2    | 2         |
//! | enum          | u16       | 2    | 2         |
//! | NTSTATUS      | u32       | 4    | 4         |
//!
//! Alignment is the natural size, relative to the start of the stub.

use crate::{NdrContext, NdrCursor, NdrDecode, NdrEncode, Result};
use bytes::{Buf, BufMut};

// Macro to implement NdrEncode/NdrDecode for primitive types
macro_rules! impl_ndr_primitive {
    ($ty:ty, $size:expr, $put:ident, $get:ident) => {
        impl NdrEncode for $ty {
            fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
                cursor.write_align(buf, $size);
                ctx.$put(buf, *self);
                cursor.advance($size);
                Ok(())
            }

            fn ndr_align() -> usize {
                $size
            }
        }

        impl NdrDecode for $ty {
            fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
                cursor.read_align(buf, $size, $size)?;
                let value = ctx.$get(buf);
                cursor.advance($size);
                Ok(value)
            }

            fn ndr_align() -> usize {
                $size
            }
        }
    };
}

impl_ndr_primitive!(u8, 1, put_u8, get_u8);
impl_ndr_primitive!(i8, 1, put_i8, get_i8);
impl_ndr_primitive!(u16, 2, put_u16, get_u16);
impl_ndr_primitive!(i16, 2, put_i16, get_i16);
impl_ndr_primitive!(u32, 4, put_u32, get_u32);
impl_ndr_primitive!(i32, 4, put_i32, get_i32);
impl_ndr_primitive!(u64, 8, put_u64, get_u64);
impl_ndr_primitive!(i64, 8, put_i64, get_i64);

/// NDR boolean - encoded as a single byte (0x00 = false, 0x01 = true)
impl NdrEncode for bool {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, _ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        buf.put_u8(u8::from(*self));
        cursor.advance(1);
        Ok(())
    }
}

impl NdrDecode for bool {
    fn ndr_decode<B: Buf>(buf: &mut B, _ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        cursor.read_align(buf, 1, 1)?;
        let value = buf.get_u8();
        cursor.advance(1);
        Ok(value != 0)
    }
}
