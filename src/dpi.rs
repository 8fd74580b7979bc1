use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use env_logger::Builder;
use log::{error, info, LevelFilter};
use toml::Table;

use crate::aim::request::Request;
use crate::base::behavior::*;
use crate::frontend::ExternalWrapper;
use crate::memsys::FifoMemorySystem;
use crate::sim::config::{Config, MemConfig};

/// Completion hook handed in by the host: (address, operation id, source id).
/// Runs inside `aim_tick_rs` and must not call back into this interface.
pub type DoneFn = extern "C" fn(addr: i64, type_id: i32, source_id: i32);

struct Context {
    memory: Arc<RwLock<FifoMemorySystem>>,
    wrapper: ExternalWrapper<FifoMemorySystem>,
}

/// Global singleton to keep the memory system alive across independent host calls.
static CELL: RwLock<Option<Context>> = RwLock::new(None);

fn with_context<R>(f: impl FnOnce(&mut Context) -> R) -> R {
    let mut context_guard = CELL.write().expect("AiM context lock poisoned");
    let context = context_guard.as_mut().expect("AiM context not initialized!");
    f(context)
}

fn mem_config_from(path: &Path) -> anyhow::Result<MemConfig> {
    let toml_string = crate::ui::read_toml(path)?;
    let table: Table = toml::from_str(&toml_string)?;
    let config = MemConfig::from_section(table.get("mem"))?;
    config.validate()?;
    Ok(config)
}

fn completion(done: Option<DoneFn>) -> impl Fn(&Request) + Send + Sync + 'static {
    move |req: &Request| {
        if let Some(done) = done {
            done(req.addr, req.type_id(), req.source_id);
        }
    }
}

#[no_mangle]
/// Entry point for the host.  Must be called once before any other `aim_*` call.
/// Returns 0 on success, -1 if the config could not be loaded or the context already exists.
///
/// # Safety
/// `config_path` must be null or point to a NUL-terminated string.  Null selects `config.toml`.
pub unsafe extern "C" fn aim_wrapper_init_rs(config_path: *const c_char) -> i32 {
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .try_init();

    let path = if config_path.is_null() {
        PathBuf::from("config.toml")
    } else {
        // SAFETY: precondition of function guarantees this is valid
        match unsafe { CStr::from_ptr(config_path) }.to_str() {
            Ok(s) => PathBuf::from(s),
            Err(err) => {
                error!("config path is not valid UTF-8: {}", err);
                return -1;
            }
        }
    };

    let mem_config = match mem_config_from(&path) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load {}: {:#}", path.display(), err);
            return -1;
        }
    };

    let mut context = CELL.write().expect("AiM context lock poisoned");
    if context.is_some() {
        error!("AiM context already initialized!");
        return -1;
    }
    let memory = Arc::new(RwLock::new(FifoMemorySystem::new(mem_config)));
    *context = Some(Context {
        wrapper: ExternalWrapper::new(Arc::clone(&memory)),
        memory,
    });
    info!("AiM wrapper initialized from {}", path.display());
    0
}

#[no_mangle]
/// Submit a plain request.  Returns 1 if accepted, 0 if rejected.
pub extern "C" fn aim_send_request_rs(type_id: i32, addr: i64, source_id: i32, done: Option<DoneFn>) -> u8 {
    with_context(|c| c.wrapper.inject_request_id(type_id, addr, source_id, completion(done))) as u8
}

#[no_mangle]
/// Submit a compute request.  Ids that are not compute operations, including unknown ones, go
/// out as plain requests.  Returns 1 if accepted, 0 if rejected.
pub extern "C" fn aim_send_compute_request_rs(type_id: i32, addr: i64, done: Option<DoneFn>) -> u8 {
    with_context(|c| c.wrapper.inject_compute_request_id(type_id, addr, completion(done))) as u8
}

#[no_mangle]
/// Advance the memory system by one cycle, firing completion hooks of retired requests.
pub extern "C" fn aim_tick_rs() {
    with_context(|c| c.memory.write().expect("memory lock poisoned").tick_one());
}

#[no_mangle]
/// 1 when nothing is queued or in flight.
pub extern "C" fn aim_idle_rs() -> u8 {
    with_context(|c| c.memory.read().expect("memory lock poisoned").is_idle()) as u8
}

#[no_mangle]
/// Drop the context so `aim_wrapper_init_rs` can be called again.
pub extern "C" fn aim_wrapper_shutdown_rs() {
    *CELL.write().expect("AiM context lock poisoned") = None;
}
