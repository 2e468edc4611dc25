//! C ABI for external trace producers (feature `capi`).
//!
//! The producer hands over a [`TopLevel`] table describing every function and
//! block, receives an opaque reducer handle, and reduces paths to owned C
//! strings. Every failure returns NULL; a returned string must be released
//! with [`tracefold_string_free`]. See `include/tracefold.h` for the matching
//! declarations.

use std::ffi::{c_char, c_int, CString};
use std::ptr;
use std::slice;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::program::{BlockId, FunId, Program};
use crate::reduce::PathReducer;

/// Maximum length of a function name in a [`CfgEntry`], including the NUL.
pub const FUN_NAME_LEN: usize = 256;

/// One function of the external program table.
#[repr(C)]
pub struct CfgEntry {
    /// Name of the function, NUL-terminated within `FUN_NAME_LEN` bytes.
    pub function_name: [c_char; FUN_NAME_LEN],
    /// Id of the entry block.
    pub entry: c_int,
    /// Id of the exit block. Retained for ABI compatibility; exits are
    /// derived from blocks without successors.
    pub exit: c_int,
}

/// One block of the external program table, indexed by block id.
#[repr(C)]
pub struct BlockEntry {
    /// Id of the function called from this block, or -1 if it is not a call
    /// site.
    pub calls: c_int,
    /// Number of successors.
    pub successor_size: c_int,
    /// Successor block ids.
    pub successors: *const c_int,
}

/// The external whole-program representation.
#[repr(C)]
pub struct TopLevel {
    /// Size of `cfg_arr`.
    pub cfg_size: c_int,
    /// Function table.
    pub cfg_arr: *const CfgEntry,
    /// Size of `block_arr`.
    pub block_size: c_int,
    /// Block table, indexed by block id.
    pub block_arr: *const BlockEntry,
}

fn name_of(entry: &CfgEntry) -> String {
    let bytes: Vec<u8> = entry
        .function_name
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Walks each function's blocks from its entry and feeds the builder.
///
/// # Safety
/// `top` must describe valid `cfg_arr`/`block_arr` slices whose successor
/// pointers are live for the duration of the call.
unsafe fn build_program(top: &TopLevel) -> Option<Program> {
    if top.cfg_size < 0 || top.block_size < 0 {
        return None;
    }
    if top.cfg_arr.is_null() || (top.block_arr.is_null() && top.block_size > 0) {
        return None;
    }
    let cfgs = slice::from_raw_parts(top.cfg_arr, top.cfg_size as usize);
    let blocks = if top.block_size == 0 {
        &[]
    } else {
        slice::from_raw_parts(top.block_arr, top.block_size as usize)
    };

    let mut builder = Program::builder();
    // Declare every function first so call marks can target later ones.
    for entry in cfgs {
        builder.add_function(name_of(entry));
    }
    for (fun, cfg) in cfgs.iter().enumerate() {
        let fun = fun as FunId;
        let mut to_visit = vec![cfg.entry];
        let mut visited = FxHashSet::default();
        while let Some(id) = to_visit.pop() {
            if id < 0 || id as usize >= blocks.len() {
                return None;
            }
            if !visited.insert(id) {
                continue;
            }
            let entry = &blocks[id as usize];
            builder.add_block(fun, id as BlockId);
            if entry.calls >= 0 {
                builder.mark_call(id as BlockId, entry.calls as FunId);
            }
            if entry.successor_size < 0 {
                return None;
            }
            if entry.successor_size > 0 {
                if entry.successors.is_null() {
                    return None;
                }
                let successors =
                    slice::from_raw_parts(entry.successors, entry.successor_size as usize);
                for &succ in successors {
                    if succ < 0 {
                        return None;
                    }
                    builder.add_successor(id as BlockId, succ as BlockId);
                    to_visit.push(succ);
                }
            }
        }
    }
    builder.build().ok()
}

/// Builds a reducer for the given program table and fold bound.
///
/// Returns NULL if `top_level` is NULL, `k` is negative, or the table is
/// structurally invalid. The handle must be released with
/// [`tracefold_free`].
///
/// # Safety
/// `top_level`, when non-NULL, must point to a valid [`TopLevel`] whose
/// arrays and successor pointers are live for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn tracefold_new(top_level: *const TopLevel, k: c_int) -> *mut PathReducer {
    let Some(top) = top_level.as_ref() else {
        return ptr::null_mut();
    };
    if k < 0 {
        return ptr::null_mut();
    }
    match build_program(top) {
        Some(program) => Box::into_raw(Box::new(PathReducer::new(Arc::new(program), k as usize))),
        None => ptr::null_mut(),
    }
}

/// Releases a reducer returned by [`tracefold_new`]. NULL is ignored.
///
/// # Safety
/// `reducer` must be NULL or a pointer returned by [`tracefold_new`] that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn tracefold_free(reducer: *mut PathReducer) {
    if !reducer.is_null() {
        drop(Box::from_raw(reducer));
    }
}

/// Reduces a raw path and returns the reduced text as an owned C string.
///
/// Returns NULL on any precondition violation (NULL handle, negative size or
/// ids, malformed path). Ownership of the returned string transfers to the
/// caller, who must release it with [`tracefold_string_free`].
///
/// # Safety
/// `reducer` must be a live handle from [`tracefold_new`]; `path`, when
/// `path_size > 0`, must point to `path_size` readable block ids.
#[no_mangle]
pub unsafe extern "C" fn tracefold_reduce(
    reducer: *const PathReducer,
    path: *const c_int,
    path_size: c_int,
    entry_fun: c_int,
) -> *mut c_char {
    let Some(reducer) = reducer.as_ref() else {
        return ptr::null_mut();
    };
    if path_size < 0 || entry_fun < 0 || (path.is_null() && path_size > 0) {
        return ptr::null_mut();
    }
    let raw = if path_size == 0 {
        &[]
    } else {
        slice::from_raw_parts(path, path_size as usize)
    };
    let mut ids = Vec::with_capacity(raw.len());
    for &block in raw {
        if block < 0 {
            return ptr::null_mut();
        }
        ids.push(block as BlockId);
    }
    match reducer.reduce(&ids, entry_fun as FunId) {
        Ok(text) => match CString::new(text) {
            Ok(text) => text.into_raw(),
            Err(_) => ptr::null_mut(),
        },
        Err(_) => ptr::null_mut(),
    }
}

/// Releases a string returned by [`tracefold_reduce`]. NULL is ignored.
///
/// # Safety
/// `text` must be NULL or a pointer returned by [`tracefold_reduce`] that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn tracefold_string_free(text: *mut c_char) {
    if !text.is_null() {
        drop(CString::from_raw(text));
    }
}
