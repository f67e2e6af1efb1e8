// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bindings via JNI.
//
// The host application loads this library and calls the static natives of
// `org.labelbridge.LabelBridgeModule`. `nativeInit` captures the JavaVM, the
// application context and the host event emitter, then builds the process
// bridge. Vendor SDK classes are called directly; the print service's AIDL
// callback stubs must be Java classes, so the host ships thin glue classes
// under `org.labelbridge` that forward every callback to
// `nativeServiceCallback` (see `callback_wire` for the encoding).

#![cfg(target_os = "android")]

mod host;
mod label_printer;
mod print_service;

use std::path::PathBuf;
use std::sync::{Arc, Once, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{jboolean, jint, jstring, JNI_FALSE, JNI_TRUE};
use jni::{AttachGuard, JNIEnv, JavaVM};
use tracing::{debug, error, info, warn};

use labelbridge_core::config::BridgeConfig;
use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::events::EventSink;
use labelbridge_print::ThreadScheduler;

use crate::callback_wire;
use crate::facade::PrinterBridge;
use crate::logging;
use crate::platform::{self, PlatformServices};

pub use host::{ContentImageResolver, ReactEventSink};
pub use label_printer::JniLabelPrinterSdk;
pub use print_service::JniPrintServiceSdk;

static JVM: OnceLock<JavaVM> = OnceLock::new();
static CONTEXT: OnceLock<GlobalRef> = OnceLock::new();
static EMITTER: OnceLock<GlobalRef> = OnceLock::new();
static BRIDGE: OnceLock<PrinterBridge> = OnceLock::new();
static NDK_CONTEXT: Once = Once::new();

// ---------------------------------------------------------------------------
// JNI helpers
// ---------------------------------------------------------------------------

/// Attach the current thread to the captured JavaVM.
///
/// Threads the JVM already knows (binder threads, the host's module thread)
/// are left attached when the guard drops; our own delay threads detach.
fn jni_env() -> Result<AttachGuard<'static>> {
    let vm = JVM.get().ok_or(LabelBridgeError::PlatformUnavailable)?;
    vm.attach_current_thread()
        .map_err(|e| LabelBridgeError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Run `f` with a JNI environment, clearing any Java exception it leaves
/// pending so the next call starts clean.
fn with_env<T>(f: impl FnOnce(&mut JNIEnv<'static>) -> Result<T>) -> Result<T> {
    let mut env = jni_env()?;
    let outcome = f(&mut env);
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    outcome
}

/// The application `Context` registered with `ndk-context` in `nativeInit`.
fn context() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(LabelBridgeError::Bridge(
            "Android context is null; nativeInit has not run".into(),
        ));
    }
    // SAFETY: the pointer is the global reference held in `CONTEXT`, which
    // lives for the rest of the process.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map any `jni::errors::Error` into `LabelBridgeError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> LabelBridgeError {
    LabelBridgeError::Bridge(format!("{context}: {e}"))
}

fn call_object<'local>(
    env: &mut JNIEnv<'local>,
    obj: &JObject<'_>,
    name: &str,
    sig: &str,
) -> Result<JObject<'local>> {
    env.call_method(obj, name, sig, &[])
        .and_then(|value| value.l())
        .map_err(|e| jni_err(name, e))
}

fn call_void(
    env: &mut JNIEnv<'_>,
    obj: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<()> {
    env.call_method(obj, name, sig, args)
        .map(drop)
        .map_err(|e| jni_err(name, e))
}

fn call_int(env: &mut JNIEnv<'_>, obj: &JObject<'_>, name: &str) -> Result<i32> {
    env.call_method(obj, name, "()I", &[])
        .and_then(|value| value.i())
        .map_err(|e| jni_err(name, e))
}

/// Read a Java string, treating `null` as empty.
fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<String> {
    if obj.is_null() {
        return Ok(String::new());
    }
    let string = JString::from(obj);
    env.get_string(&string)
        .map(String::from)
        .map_err(|e| jni_err("get_string", e))
}

/// Absolute path of a `java.io.File`, or `None` for `null`.
fn file_path(env: &mut JNIEnv<'_>, file: JObject<'_>) -> Result<Option<String>> {
    if file.is_null() {
        return Ok(None);
    }
    let path = call_object(env, &file, "getAbsolutePath", "()Ljava/lang/String;")?;
    java_string(env, path).map(Some)
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Android collaborator set. Requires `nativeInit` to have run.
pub fn services() -> Result<PlatformServices> {
    let (context_ref, cache_dir, files_dir) = with_env(|env| {
        let context = context()?;
        let context_ref = env
            .new_global_ref(&context)
            .map_err(|e| jni_err("new_global_ref(context)", e))?;

        // Staged images must be readable by the print service app: external
        // cache first, internal cache when external storage is unmounted.
        let external = call_object(env, &context, "getExternalCacheDir", "()Ljava/io/File;")?;
        let cache_dir = match file_path(env, external)? {
            Some(path) => path,
            None => {
                let internal = call_object(env, &context, "getCacheDir", "()Ljava/io/File;")?;
                file_path(env, internal)?.unwrap_or_default()
            }
        };

        let files = env
            .call_method(
                &context,
                "getExternalFilesDir",
                "(Ljava/lang/String;)Ljava/io/File;",
                &[JValue::Object(&JObject::null())],
            )
            .and_then(|value| value.l())
            .map_err(|e| jni_err("getExternalFilesDir", e))?;
        let files_dir = file_path(env, files)?;

        Ok((context_ref, cache_dir, files_dir))
    })?;

    let mut sinks: Vec<Arc<dyn EventSink>> = Vec::new();
    match EMITTER.get() {
        Some(emitter) => sinks.push(Arc::new(ReactEventSink::new(emitter.clone()))),
        None => warn!("no host event emitter; events are only logged"),
    }

    Ok(PlatformServices {
        label_printer: Arc::new(JniLabelPrinterSdk),
        print_service: Arc::new(JniPrintServiceSdk::new(context_ref.clone())),
        resolver: Box::new(ContentImageResolver::new(context_ref)),
        cache_dir: PathBuf::from(cache_dir),
        files_dir,
        sinks,
        scheduler: Arc::new(ThreadScheduler),
    })
}

// ---------------------------------------------------------------------------
// Entry points: org.labelbridge.LabelBridgeModule
// ---------------------------------------------------------------------------

fn init(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    emitter: &JObject<'_>,
    config_path: &JString<'_>,
) -> Result<()> {
    if BRIDGE.get().is_some() {
        debug!("labelbridge already initialised");
        return Ok(());
    }

    let vm = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;
    let context = env
        .new_global_ref(context)
        .map_err(|e| jni_err("new_global_ref(context)", e))?;

    NDK_CONTEXT.call_once(|| {
        // SAFETY: both pointers are valid for the rest of the process: the VM
        // never unloads and the context global ref is parked in `CONTEXT`.
        unsafe {
            ndk_context::initialize_android_context(
                vm.get_java_vm_pointer().cast(),
                context.as_obj().as_raw().cast(),
            );
        }
    });
    let _ = JVM.set(vm);
    let _ = CONTEXT.set(context);

    if !emitter.is_null() {
        let emitter = env
            .new_global_ref(emitter)
            .map_err(|e| jni_err("new_global_ref(emitter)", e))?;
        let _ = EMITTER.set(emitter);
    }

    let path = rust_string(env, config_path);
    let config = if path.is_empty() {
        BridgeConfig::default()
    } else {
        BridgeConfig::load_or_default(&path)
    };

    let bridge = PrinterBridge::from_config(&config, platform::platform_services()?);
    let _ = BRIDGE.set(bridge);
    info!("labelbridge initialised");
    Ok(())
}

fn bridge() -> Option<&'static PrinterBridge> {
    let bridge = BRIDGE.get();
    if bridge.is_none() {
        warn!("labelbridge called before nativeInit");
    }
    bridge
}

fn rust_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> String {
    if value.is_null() {
        return String::new();
    }
    env.get_string(value).map(String::from).unwrap_or_default()
}

fn to_jstring(env: &mut JNIEnv<'_>, value: &str) -> jstring {
    env.new_string(value)
        .map(JString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
    emitter: JObject<'local>,
    config_path: JString<'local>,
) -> jboolean {
    logging::init();
    match init(&mut env, &context, &emitter, &config_path) {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            error!(error = %e, "labelbridge initialisation failed");
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeScan<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    let printers = bridge().map(PrinterBridge::scan).unwrap_or_default();
    to_jstring(&mut env, &printers)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeCheckInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    address: JString<'local>,
    model: JString<'local>,
) {
    let address = rust_string(&mut env, &address);
    let model = rust_string(&mut env, &model);
    if let Some(bridge) = bridge() {
        bridge.check_init(&address, &model);
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativePrintUris<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    uris: JString<'local>,
) {
    let uris = rust_string(&mut env, &uris);
    if let Some(bridge) = bridge() {
        bridge.print_uris(&uris);
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeConfigure<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    if let Some(bridge) = bridge() {
        bridge.configure();
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeGetStatus<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    let status = bridge().map(PrinterBridge::status).unwrap_or_default();
    to_jstring(&mut env, &status)
}

/// Register an `org.labelbridge.StatusListener` (`void onStatus(String)`),
/// replacing the previously bound one.
#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeBind<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    listener: JObject<'local>,
) {
    let Some(bridge) = bridge() else { return };
    if listener.is_null() {
        warn!("nativeBind called with a null listener");
        return;
    }
    let listener = match env.new_global_ref(&listener) {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, "could not retain status listener");
            return;
        }
    };

    bridge.bind(Arc::new(move |status: &str| {
        let delivered = with_env(|env| {
            let text = env
                .new_string(status)
                .map_err(|e| jni_err("new_string(status)", e))?;
            call_void(
                env,
                listener.as_obj(),
                "onStatus",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&text)],
            )
        });
        if let Err(e) = delivered {
            warn!(error = %e, "status listener call failed");
        }
    }));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeUnbind<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    if let Some(bridge) = bridge() {
        bridge.unbind();
    }
}

/// Vendor callback forwarded by the print-service glue. Returns the reply
/// text, or `null` for void callbacks.
#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeServiceCallback<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    kind: JString<'local>,
    first: jint,
    second: jint,
    text: JString<'local>,
) -> jstring {
    let kind = rust_string(&mut env, &kind);
    let text = rust_string(&mut env, &text);
    let Some(callback) = callback_wire::decode(&kind, first, second, text) else {
        warn!(%kind, "unknown print service callback");
        return std::ptr::null_mut();
    };
    let Some(bridge) = bridge() else {
        return std::ptr::null_mut();
    };

    match callback_wire::encode_reply(&bridge.handle_callback(callback)) {
        Some(reply) => to_jstring(&mut env, &reply),
        None => std::ptr::null_mut(),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_labelbridge_LabelBridgeModule_nativeShutdown<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    if let Some(bridge) = bridge() {
        bridge.shutdown();
    }
}
