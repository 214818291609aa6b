//! FFI interface for host interop
//!
//! Provides C-compatible functions for parsing pasted embeds and normalizing
//! stored block attributes. Attributes cross the boundary as JSON.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde_json::{Map, Value};

use crate::integrations::Integration;

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_embed_result
#[repr(C)]
pub struct EmbedResultFFI {
    /// JSON-serialized attributes (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Parse pasted embed text into normalized attributes.
///
/// # Arguments
/// * `integration` - Integration name, e.g. "opentable" (null-terminated)
/// * `text_ptr` - Pointer to the pasted text (UTF-8, not necessarily null-terminated)
/// * `text_len` - Length of the text in bytes
///
/// # Returns
/// EmbedResultFFI with json_ptr set on success. When the text does not match
/// the integration's embed shape, error_ptr is set to "no match".
///
/// # Safety
/// - `integration` must be a valid null-terminated C string
/// - `text_ptr` must point to valid memory of at least `text_len` bytes
/// - Caller must free the result via `free_embed_result`
#[no_mangle]
pub unsafe extern "C" fn embed_parse_ffi(
    integration: *const c_char,
    text_ptr: *const c_char,
    text_len: usize,
) -> EmbedResultFFI {
    let integration = match read_integration(integration) {
        Ok(i) => i,
        Err(message) => return make_error_result(&message),
    };

    let text = if text_ptr.is_null() || text_len == 0 {
        ""
    } else {
        let slice = std::slice::from_raw_parts(text_ptr as *const u8, text_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in embed text"),
        }
    };

    match integration.parse_embed(text) {
        Ok(attributes) => make_json_result(&attributes),
        Err(e) => make_error_result(&e.to_string()),
    }
}

/// Normalize stored attributes against the integration's schema.
///
/// Never fails for well-formed arguments: invalid JSON or a non-object is
/// treated as empty and every attribute gets its default.
///
/// # Safety
/// - `integration` and `attributes_json` must be valid null-terminated C strings
/// - Caller must free the result via `free_embed_result`
#[no_mangle]
pub unsafe extern "C" fn embed_validate_ffi(
    integration: *const c_char,
    attributes_json: *const c_char,
) -> EmbedResultFFI {
    let integration = match read_integration(integration) {
        Ok(i) => i,
        Err(message) => return make_error_result(&message),
    };

    let stored = if attributes_json.is_null() {
        Value::Null
    } else {
        match CStr::from_ptr(attributes_json).to_str() {
            Ok(s) => serde_json::from_str(s).unwrap_or(Value::Null),
            Err(_) => return make_error_result("Invalid UTF-8 in attributes JSON"),
        }
    };

    make_json_result(&integration.normalize(&stored))
}

/// Free an EmbedResultFFI returned by this library
///
/// # Safety
/// - `result` must have been returned by `embed_parse_ffi` or `embed_validate_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_embed_result(result: EmbedResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

unsafe fn read_integration(name: *const c_char) -> Result<Integration, String> {
    if name.is_null() {
        return Err("Integration name is null".to_string());
    }
    let name = CStr::from_ptr(name)
        .to_str()
        .map_err(|_| "Invalid UTF-8 in integration name".to_string())?;
    name.parse::<Integration>().map_err(|e| e.to_string())
}

fn make_json_result(attributes: &Map<String, Value>) -> EmbedResultFFI {
    match serde_json::to_string(attributes) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => EmbedResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

fn make_error_result(message: &str) -> EmbedResultFFI {
    let error = CString::new(message.replace('\0', ""))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut());
    EmbedResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error,
    }
}
