//! Wire representation of values crossing the native boundary.
//!
//! Scalars travel as C scalars, booleans as `i32` (non-zero is true),
//! strings as NUL-terminated UTF-8 buffers, byte vectors as a pointer and
//! length, and other structs or vectors as JSON text in a string buffer.
//! Buffers returned to the host are allocated here and released through
//! [`rsbind_free_str`] or [`rsbind_free_bytes`].

use crate::error::{RegistryError, RegistryResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::{CStr, CString, c_char};

/// A value with a fixed C representation
pub trait WireValue: Sized {
    /// The C type carried across the boundary
    type Wire: Copy;

    fn to_wire(self) -> Self::Wire;

    fn from_wire(wire: Self::Wire) -> Self;
}

impl WireValue for bool {
    type Wire = i32;

    fn to_wire(self) -> i32 {
        i32::from(self)
    }

    fn from_wire(wire: i32) -> Self {
        wire > 0
    }
}

macro_rules! identity_wire {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireValue for $ty {
                type Wire = $ty;

                fn to_wire(self) -> $ty {
                    self
                }

                fn from_wire(wire: $ty) -> Self {
                    wire
                }
            }
        )*
    };
}

identity_wire!(i8, i16, i32, i64, f32, f64);

/// Owned NUL-terminated string handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireString(CString);

impl WireString {
    /// Copy `value` into a wire buffer
    pub fn new(value: &str) -> RegistryResult<Self> {
        CString::new(value)
            .map(Self)
            .map_err(|e| RegistryError::InvalidString(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from a `&str`.
        self.0.to_str().unwrap_or_default()
    }

    /// Give up ownership; the host releases the buffer with [`rsbind_free_str`]
    pub fn into_raw(self) -> *mut c_char {
        self.0.into_raw()
    }

    /// Reclaim a buffer produced by [`into_raw`](Self::into_raw)
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, come from `into_raw`, and not have been
    /// reclaimed or freed already.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        unsafe { Self(CString::from_raw(ptr)) }
    }
}

/// Borrow a host-owned string argument
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated buffer that stays valid
/// for `'a`.
pub unsafe fn borrow_str<'a>(ptr: *const c_char) -> RegistryResult<&'a str> {
    if ptr.is_null() {
        return Err(RegistryError::InvalidString("null pointer".to_string()));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| RegistryError::InvalidString(e.to_string()))
}

/// Encode `value` as a JSON wire string
pub fn to_wire_json<T: Serialize + ?Sized>(value: &T) -> RegistryResult<WireString> {
    let json = serde_json::to_string(value)?;
    WireString::new(&json)
}

/// Decode a JSON wire string
///
/// # Safety
///
/// Same contract as [`borrow_str`].
pub unsafe fn from_wire_json<T: DeserializeOwned>(ptr: *const c_char) -> RegistryResult<T> {
    let json = unsafe { borrow_str(ptr)? };
    Ok(serde_json::from_str(json)?)
}

/// Byte vector crossing the C ABI
///
/// Built by [`WireBytes::new`] when native code returns bytes, or by the
/// host when it passes bytes in.
#[repr(C)]
#[derive(Debug)]
pub struct WireBytes {
    pub ptr: *mut i8,
    pub len: i32,
}

impl WireBytes {
    /// Hand `bytes` to the host, which releases them with [`rsbind_free_bytes`]
    pub fn new(bytes: Vec<u8>) -> RegistryResult<Self> {
        let len = i32::try_from(bytes.len()).map_err(|_| RegistryError::BufferTooLarge(bytes.len()))?;
        let ptr = Box::into_raw(bytes.into_boxed_slice()).cast::<i8>();
        Ok(Self { ptr, len })
    }

    /// Borrow the bytes of a host-owned buffer
    ///
    /// # Safety
    ///
    /// Unless `ptr` is null or `len` is not positive, `ptr` must point to
    /// `len` readable bytes that stay valid for `'a`.
    pub unsafe fn as_slice<'a>(&self) -> &'a [u8] {
        if self.ptr.is_null() || self.len <= 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.ptr.cast::<u8>(), self.len as usize) }
    }
}

/// Exported name of [`rsbind_free_str`], as called by generated Swift
pub const FREE_STRING_SYMBOL: &str = "rsbind_free_str";

/// Exported name of [`rsbind_free_bytes`], as called by generated Swift
pub const FREE_BYTES_SYMBOL: &str = "rsbind_free_bytes";

/// Release a string returned to the host
///
/// # Safety
///
/// `ptr` must be null or a pointer obtained from [`WireString::into_raw`]
/// that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rsbind_free_str(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe { drop(WireString::from_raw(ptr)) };
    }
}

/// Release a byte buffer returned to the host
///
/// # Safety
///
/// `bytes` must be null or come from [`WireBytes::new`] and not have been
/// freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rsbind_free_bytes(bytes: WireBytes) {
    if bytes.ptr.is_null() || bytes.len < 0 {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(bytes.ptr.cast::<u8>(), bytes.len as usize);
    unsafe { drop(Box::from_raw(slice)) };
}
