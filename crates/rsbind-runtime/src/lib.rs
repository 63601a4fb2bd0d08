//! rsbind-runtime - Native-side support for generated bindings
//!
//! The host side of a binding keeps callbacks in a registry keyed by an
//! integer handle and exchanges values in a small wire vocabulary. This
//! crate is the Rust counterpart:
//! - [`CallbackRegistry`] holds host callbacks behind numeric handles
//! - [`WireValue`] maps scalars to their wire representation
//! - [`WireString`] owns the NUL-terminated strings handed to the host
//! - [`WireBytes`] carries byte vectors without a JSON detour
//! - [`to_wire_json`] / [`from_wire_json`] carry structs and vectors as JSON

mod error;
mod registry;
mod wire;

pub use error::{RegistryError, RegistryResult};
pub use registry::{CallbackRegistry, GlobalRegistry};
pub use wire::{
    FREE_BYTES_SYMBOL, FREE_STRING_SYMBOL, WireBytes, WireString, WireValue, borrow_str,
    from_wire_json, rsbind_free_bytes, rsbind_free_str, to_wire_json,
};
