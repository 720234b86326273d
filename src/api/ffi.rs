//! C-compatible API for the web layer.
//!
//! Ownership rules: an engine handle comes from `hearth_engine_open` and must
//! be released with `hearth_engine_close`. Every string returned by this module
//! is owned by the caller and must be released with `hearth_free_str`.
//! Functions returning `u32` return an `ErrorCode`; the message for the last
//! failure on the calling thread is available from `hearth_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use crate::common::config::AppCfg;
use crate::common::error::{ErrorCode, HearthError};
use crate::data::domain::FeatureRecord;
use crate::lifecycle::RetrainOutcome;

use super::engine::Engine;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(msg: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg));
}

fn fail(err: &HearthError) -> u32 {
    set_last_error(err.to_string());
    err.code() as u32
}

fn internal(msg: &str) -> u32 {
    set_last_error(msg.to_string());
    ErrorCode::Internal as u32
}

/// Borrow a C string as UTF-8, or `None` for null pointers.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<std::borrow::Cow<'a, str>> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy())
    }
}

/// ABI version to coordinate with the web layer.
#[no_mangle]
pub extern "C" fn hearth_api_version() -> u32 {
    1
}

/// Open an engine rooted at `data_root`, or configured from the environment
/// when `data_root` is null. Loads any persisted model.
#[no_mangle]
pub extern "C" fn hearth_engine_open(data_root: *const c_char) -> *mut Engine {
    let cfg = AppCfg::load();
    let cfg = match unsafe { read_str(data_root) } {
        Some(root) => cfg.with_data_root(root.into_owned()),
        None => cfg,
    };
    crate::common::log::init(&cfg);
    Box::into_raw(Box::new(Engine::open(cfg)))
}

/// Release an engine handle.
#[no_mangle]
pub extern "C" fn hearth_engine_close(engine: *mut Engine) {
    if engine.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(engine));
    }
}

/// Predict the price of one listing given as a JSON object.
#[no_mangle]
pub extern "C" fn hearth_predict(
    engine: *const Engine,
    record_json: *const c_char,
    out_price: *mut f64,
) -> u32 {
    if engine.is_null() || out_price.is_null() {
        return internal("null engine or output pointer");
    }
    let Some(json) = (unsafe { read_str(record_json) }) else {
        return internal("null record");
    };
    let record: FeatureRecord = match serde_json::from_str(&json) {
        Ok(record) => record,
        Err(e) => {
            return fail(&HearthError::encoding("record", e.to_string()));
        }
    };

    let engine = unsafe { &*engine };
    match engine.predict(&record) {
        Ok(price) => {
            unsafe { *out_price = price };
            ErrorCode::Ok as u32
        }
        Err(err) => fail(&err),
    }
}

/// Retrain from a CSV file. `actor` is recorded in the retrain history.
#[no_mangle]
pub extern "C" fn hearth_retrain(
    engine: *const Engine,
    csv_path: *const c_char,
    actor: *const c_char,
) -> u32 {
    if engine.is_null() {
        return internal("null engine");
    }
    let (Some(path), Some(actor)) = (unsafe { read_str(csv_path) }, unsafe { read_str(actor) })
    else {
        return internal("null path or actor");
    };

    let engine = unsafe { &*engine };
    match engine.retrain_path(&actor, Path::new(path.as_ref())) {
        RetrainOutcome::Success(_) => ErrorCode::Ok as u32,
        RetrainOutcome::Failed { error, .. } => fail(&error),
    }
}

/// Retrain history as a JSON array, newest first (caller must free).
#[no_mangle]
pub extern "C" fn hearth_retrain_history(engine: *const Engine) -> *const c_char {
    if engine.is_null() {
        internal("null engine");
        return std::ptr::null();
    }
    let engine = unsafe { &*engine };
    let json = engine
        .history()
        .and_then(|h| serde_json::to_string(&h).map_err(HearthError::internal));
    match json {
        Ok(json) => string_to_raw(json),
        Err(err) => {
            fail(&err);
            std::ptr::null()
        }
    }
}

/// Message for the last failure on this thread, or null (caller must free).
#[no_mangle]
pub extern "C" fn hearth_last_error() -> *const c_char {
    match LAST_ERROR.with(|slot| slot.borrow().clone()) {
        Some(msg) => string_to_raw(msg),
        None => std::ptr::null(),
    }
}

/// Free strings allocated by Rust.
#[no_mangle]
pub extern "C" fn hearth_free_str(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(ptr as *mut c_char);
    }
}

fn string_to_raw(s: String) -> *const c_char {
    match CString::new(s) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => std::ptr::null(),
    }
}
