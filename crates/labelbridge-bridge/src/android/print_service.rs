// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-service SDK over JNI.
//
// `PrintingSdk` bootstraps the service and loads recent printers; `IntentAPI`
// holds the print session. Both report back through AIDL stubs, which the
// host supplies as glue classes forwarding to `nativeServiceCallback`:
//
//   org.labelbridge.SdkServiceCallback      printingsdk.IServiceCallback
//   org.labelbridge.RecentPrintersListener  printingsdk.ISetupPrinterListener
//   org.labelbridge.ServiceCallbackStub     intentapi.IServiceCallback.Stub
//   org.labelbridge.PrintCallbackStub       intentapi.IPrintCallback.Stub
//   org.labelbridge.PrintServiceGlue        selectOption(PrintHandOption, int)

use std::sync::{Mutex, MutexGuard, PoisonError};

use jni::JNIEnv;
use jni::objects::{GlobalRef, JObject, JValue};
use tracing::{debug, info};

use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::types::PaperGeometry;
use labelbridge_print::PrintServiceSdk;
use labelbridge_print::sdk::{ServiceOption, ServicePrinter};

use super::{call_int, call_object, call_void, java_string, jni_err, with_env};

const PRINTING_SDK: &str = "com/dynamixsoftware/printingsdk/PrintingSdk";
const INTENT_API: &str = "com/dynamixsoftware/intentapi/IntentAPI";

const SDK_CALLBACK_GLUE: &str = "org/labelbridge/SdkServiceCallback";
const RECENT_PRINTERS_GLUE: &str = "org/labelbridge/RecentPrintersListener";
const SERVICE_CALLBACK_GLUE: &str = "org/labelbridge/ServiceCallbackStub";
const PRINT_CALLBACK_GLUE: &str = "org/labelbridge/PrintCallbackStub";
const OPTION_GLUE: &str = "org/labelbridge/PrintServiceGlue";

const SERVICE_CALLBACK_SIG: &str = "(Lcom/dynamixsoftware/intentapi/IServiceCallback;)V";
const PRINT_CALLBACK_SIG: &str = "(Lcom/dynamixsoftware/intentapi/IPrintCallback;)V";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn service_err(e: LabelBridgeError) -> LabelBridgeError {
    match e {
        LabelBridgeError::PlatformUnavailable => e,
        other => LabelBridgeError::PrintService(other.to_string()),
    }
}

fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Items of a `java.util.List`.
fn list_items<'local>(
    env: &mut JNIEnv<'local>,
    list: &JObject<'_>,
) -> Result<Vec<JObject<'local>>> {
    if list.is_null() {
        return Ok(Vec::new());
    }
    let size = call_int(env, list, "size")?;
    let mut items = Vec::with_capacity(non_negative(size) as usize);
    for i in 0..size {
        let item = env
            .call_method(list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(i)])
            .and_then(|value| value.l())
            .map_err(|e| jni_err("List.get", e))?;
        items.push(item);
    }
    Ok(items)
}

fn display_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<String> {
    if obj.is_null() {
        return Ok(String::new());
    }
    let text = call_object(env, &obj, "toString", "()Ljava/lang/String;")?;
    java_string(env, text)
}

/// Print-service binding. Session handles are created lazily by the
/// bootstrap calls and held as global references.
pub struct JniPrintServiceSdk {
    context: GlobalRef,
    printing_sdk: Mutex<Option<GlobalRef>>,
    intent_api: Mutex<Option<GlobalRef>>,
    /// Java option list from the last `image_options` call.
    options: Mutex<Option<GlobalRef>>,
}

impl JniPrintServiceSdk {
    pub fn new(context: GlobalRef) -> Self {
        Self {
            context,
            printing_sdk: Mutex::new(None),
            intent_api: Mutex::new(None),
            options: Mutex::new(None),
        }
    }

    fn printing_sdk(&self) -> Result<GlobalRef> {
        lock(&self.printing_sdk)
            .clone()
            .ok_or_else(|| LabelBridgeError::PrintService("printing SDK not started".into()))
    }

    fn intent_api(&self) -> Result<GlobalRef> {
        lock(&self.intent_api)
            .clone()
            .ok_or_else(|| LabelBridgeError::PrintService("print session not running".into()))
    }

    /// Call a void `IntentAPI` method taking one object argument.
    fn on_session(&self, method: &str, sig: &str, arg: Option<&str>) -> Result<()> {
        let api = self.intent_api()?;
        with_env(|env| {
            let arg = match arg {
                Some(class) => env
                    .new_object(class, "()V", &[])
                    .map_err(|e| jni_err(class, e))?,
                None => JObject::null(),
            };
            call_void(env, api.as_obj(), method, sig, &[JValue::Object(&arg)])
        })
        .map_err(service_err)
    }
}

impl PrintServiceSdk for JniPrintServiceSdk {
    fn start_sdk(&self) -> Result<()> {
        let sdk = with_env(|env| {
            let sdk = env
                .new_object(
                    PRINTING_SDK,
                    "(Landroid/content/Context;)V",
                    &[JValue::Object(self.context.as_obj())],
                )
                .map_err(|e| jni_err("new PrintingSdk", e))?;
            let callback = env
                .new_object(SDK_CALLBACK_GLUE, "()V", &[])
                .map_err(|e| jni_err("new SdkServiceCallback", e))?;
            call_void(
                env,
                &sdk,
                "startService",
                "(Lcom/dynamixsoftware/printingsdk/IServiceCallback;)V",
                &[JValue::Object(&callback)],
            )?;
            env.new_global_ref(&sdk)
                .map_err(|e| jni_err("new_global_ref(PrintingSdk)", e))
        })
        .map_err(service_err)?;

        *lock(&self.printing_sdk) = Some(sdk);
        info!("printing SDK service starting");
        Ok(())
    }

    fn init_recent_printers(&self) -> Result<()> {
        let sdk = self.printing_sdk()?;
        with_env(|env| {
            let listener = env
                .new_object(RECENT_PRINTERS_GLUE, "()V", &[])
                .map_err(|e| jni_err("new RecentPrintersListener", e))?;
            call_void(
                env,
                sdk.as_obj(),
                "initRecentPrinters",
                "(Lcom/dynamixsoftware/printingsdk/ISetupPrinterListener;)V",
                &[JValue::Object(&listener)],
            )
        })
        .map_err(service_err)
    }

    fn run_service(&self) -> Result<()> {
        let api = with_env(|env| {
            let api = env
                .new_object(
                    INTENT_API,
                    "(Landroid/content/Context;)V",
                    &[JValue::Object(self.context.as_obj())],
                )
                .map_err(|e| jni_err("new IntentAPI", e))?;
            let callback = env
                .new_object(SERVICE_CALLBACK_GLUE, "()V", &[])
                .map_err(|e| jni_err("new ServiceCallbackStub", e))?;
            call_void(
                env,
                &api,
                "runService",
                SERVICE_CALLBACK_SIG,
                &[JValue::Object(&callback)],
            )?;
            env.new_global_ref(&api)
                .map_err(|e| jni_err("new_global_ref(IntentAPI)", e))
        })
        .map_err(service_err)?;

        *lock(&self.intent_api) = Some(api);
        debug!("print session requested");
        Ok(())
    }

    fn register_print_callbacks(&self) -> Result<()> {
        self.on_session("setPrintCallback", PRINT_CALLBACK_SIG, Some(PRINT_CALLBACK_GLUE))
    }

    fn current_printer(&self) -> Result<Option<ServicePrinter>> {
        let api = self.intent_api()?;
        with_env(|env| {
            let printer = call_object(
                env,
                api.as_obj(),
                "getCurrentPrinter",
                "()Lcom/dynamixsoftware/intentapi/IPrinterInfo;",
            )?;
            if printer.is_null() {
                return Ok(None);
            }

            let name = call_object(env, &printer, "getName", "()Ljava/lang/String;")?;
            let name = java_string(env, name)?;
            let context = call_object(
                env,
                &printer,
                "getPrinterContext",
                "()Lcom/dynamixsoftware/intentapi/IPrinterContext;",
            )?;
            let geometry = PaperGeometry {
                width: non_negative(call_int(env, &context, "getPaperWidth")?),
                height: non_negative(call_int(env, &context, "getPaperHeight")?),
                h_dpi: non_negative(call_int(env, &context, "getHResolution")?),
                v_dpi: non_negative(call_int(env, &context, "getVResolution")?),
            };
            Ok(Some(ServicePrinter { name, geometry }))
        })
        .map_err(service_err)
    }

    fn image_options(&self) -> Result<Vec<ServiceOption>> {
        let api = self.intent_api()?;
        let (list, options) = with_env(|env| {
            let list = call_object(env, api.as_obj(), "getImagesOptions", "()Ljava/util/List;")?;
            let mut options = Vec::new();
            for option in list_items(env, &list)? {
                let id = call_object(env, &option, "getId", "()Ljava/lang/String;")?;
                let id = java_string(env, id)?;
                let choices = call_object(env, &option, "getValuesList", "()Ljava/util/List;")?;
                let mut values = Vec::new();
                for choice in list_items(env, &choices)? {
                    values.push(display_string(env, choice)?);
                }
                options.push(ServiceOption {
                    id,
                    values,
                    value: None,
                });
            }
            let list = env
                .new_global_ref(&list)
                .map_err(|e| jni_err("new_global_ref(options)", e))?;
            Ok((list, options))
        })
        .map_err(service_err)?;

        *lock(&self.options) = Some(list);
        Ok(options)
    }

    fn set_image_options(&self, options: &[ServiceOption]) -> Result<()> {
        let api = self.intent_api()?;
        let list = lock(&self.options)
            .clone()
            .ok_or_else(|| LabelBridgeError::PrintService("image options not loaded".into()))?;

        with_env(|env| {
            for java_option in list_items(env, list.as_obj())? {
                let id = call_object(env, &java_option, "getId", "()Ljava/lang/String;")?;
                let id = java_string(env, id)?;
                let Some(option) = options.iter().find(|o| o.id == id) else {
                    continue;
                };
                let Some(index) = option
                    .value
                    .as_ref()
                    .and_then(|chosen| option.values.iter().position(|v| v == chosen))
                else {
                    continue;
                };
                let index = i32::try_from(index).unwrap_or(0);
                env.call_static_method(
                    OPTION_GLUE,
                    "selectOption",
                    "(Lcom/dynamixsoftware/intentapi/PrintHandOption;I)V",
                    &[JValue::Object(&java_option), JValue::Int(index)],
                )
                .map_err(|e| jni_err("selectOption", e))?;
            }
            call_void(
                env,
                api.as_obj(),
                "setImagesOptions",
                "(Ljava/util/List;)V",
                &[JValue::Object(list.as_obj())],
            )
        })
        .map_err(service_err)
    }

    fn print_uri(&self, title: &str, mime_type: &str, uri: &str) -> Result<()> {
        let api = self.intent_api()?;
        with_env(|env| {
            let j_title = env
                .new_string(title)
                .map_err(|e| jni_err("new_string(title)", e))?;
            let j_mime = env
                .new_string(mime_type)
                .map_err(|e| jni_err("new_string(mime)", e))?;
            let j_uri = env
                .new_string(uri)
                .map_err(|e| jni_err("new_string(uri)", e))?;
            let uri_obj = env
                .call_static_method(
                    "android/net/Uri",
                    "parse",
                    "(Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(&j_uri)],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err("Uri.parse", e))?;
            call_void(
                env,
                api.as_obj(),
                "print",
                "(Ljava/lang/String;Ljava/lang/String;Landroid/net/Uri;)V",
                &[
                    JValue::Object(&j_title),
                    JValue::Object(&j_mime),
                    JValue::Object(&uri_obj),
                ],
            )
        })
        .map_err(service_err)
    }

    fn setup_current_printer(&self) -> Result<()> {
        let api = self.intent_api()?;
        with_env(|env| call_void(env, api.as_obj(), "setupCurrentPrinter", "()V", &[]))
            .map_err(service_err)
    }

    fn stop_service(&self) -> Result<()> {
        self.on_session("stopService", SERVICE_CALLBACK_SIG, None)
    }

    fn clear_service_callbacks(&self) -> Result<()> {
        self.on_session("setServiceCallback", SERVICE_CALLBACK_SIG, None)
    }

    /// Last teardown step: also releases the session handle.
    fn clear_print_callbacks(&self) -> Result<()> {
        let cleared = self.on_session("setPrintCallback", PRINT_CALLBACK_SIG, None);
        *lock(&self.intent_api) = None;
        *lock(&self.options) = None;
        cleared
    }
}
