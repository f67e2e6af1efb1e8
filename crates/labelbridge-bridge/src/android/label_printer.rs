// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brother label printer SDK over JNI: network discovery through the
// p-touch `Printer` finder, printing through the lmprinter channel/driver API.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use jni::JNIEnv;
use jni::objects::{GlobalRef, JObject, JObjectArray, JValue};
use jni::sys::jsize;
use tracing::{debug, warn};

use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::types::{DiscoveredPrinter, LabelPrintSettings};
use labelbridge_print::{LabelPrinterDriver, LabelPrinterSdk};

use super::{call_object, call_void, java_string, jni_err, with_env};

const NET_FINDER: &str = "com/brother/ptouch/sdk/Printer";
const CHANNEL: &str = "com/brother/sdk/lmprinter/Channel";
const DRIVER_GENERATOR: &str = "com/brother/sdk/lmprinter/PrinterDriverGenerator";
const PRINTER_MODEL: &str = "com/brother/sdk/lmprinter/PrinterModel";
const QL_SETTINGS: &str = "com/brother/sdk/lmprinter/setting/QLPrintSettings";
const ORIENTATION: &str = "com/brother/sdk/lmprinter/setting/PrintImageSettings$Orientation";
const LABEL_SIZE: &str = "com/brother/sdk/lmprinter/setting/QLPrintSettings$LabelSize";

/// Error code name the SDK reports on success.
const NO_ERROR: &str = "NoError";

/// Label printer SDK binding.
#[derive(Debug, Default)]
pub struct JniLabelPrinterSdk;

fn string_field(env: &mut JNIEnv<'_>, obj: &JObject<'_>, name: &str) -> Result<String> {
    let value = env
        .get_field(obj, name, "Ljava/lang/String;")
        .and_then(|value| value.l())
        .map_err(|e| jni_err(name, e))?;
    java_string(env, value)
}

/// `name()` of the enum behind `obj.getCode()`.
fn error_code(env: &mut JNIEnv<'_>, error: &JObject<'_>, code_class: &str) -> Result<String> {
    let code = call_object(env, error, "getCode", &format!("()L{code_class};"))?;
    let name = call_object(env, &code, "name", "()Ljava/lang/String;")?;
    java_string(env, name)
}

fn enum_constant<'local>(
    env: &mut JNIEnv<'local>,
    class: &str,
    name: &str,
) -> Result<JObject<'local>> {
    env.get_static_field(class, name, format!("L{class};"))
        .and_then(|value| value.l())
        .map_err(|e| jni_err(name, e))
}

impl LabelPrinterSdk for JniLabelPrinterSdk {
    fn discover(&self, models: &[String]) -> Result<Vec<DiscoveredPrinter>> {
        with_env(|env| {
            let finder = env
                .new_object(NET_FINDER, "()V", &[])
                .map_err(|e| jni_err("new Printer", e))?;

            let string_class = env
                .find_class("java/lang/String")
                .map_err(|e| jni_err("find_class(String)", e))?;
            let j_models = env
                .new_object_array(models.len() as jsize, &string_class, JObject::null())
                .map_err(|e| jni_err("new_object_array(models)", e))?;
            for (i, model) in models.iter().enumerate() {
                let j_model = env
                    .new_string(model)
                    .map_err(|e| jni_err("new_string(model)", e))?;
                env.set_object_array_element(&j_models, i as jsize, j_model)
                    .map_err(|e| jni_err("set_object_array_element", e))?;
            }

            let found = env
                .call_method(
                    &finder,
                    "getNetPrinters",
                    "([Ljava/lang/String;)[Lcom/brother/ptouch/sdk/NetPrinter;",
                    &[JValue::Object(&j_models)],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err("getNetPrinters", e))?;
            if found.is_null() {
                return Ok(Vec::new());
            }

            let found = JObjectArray::from(found);
            let len = env
                .get_array_length(&found)
                .map_err(|e| jni_err("get_array_length", e))?;
            let mut printers = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
            for i in 0..len {
                let printer = env
                    .get_object_array_element(&found, i)
                    .map_err(|e| jni_err("get_object_array_element", e))?;
                printers.push(DiscoveredPrinter {
                    model: string_field(env, &printer, "modelName")?,
                    address: string_field(env, &printer, "ipAddress")?,
                });
            }
            debug!(count = printers.len(), "network printers found");
            Ok(printers)
        })
        .map_err(|e| LabelBridgeError::Discovery(e.to_string()))
    }

    fn open_wifi_channel(&self, address: &str) -> Result<Box<dyn LabelPrinterDriver>> {
        let driver = with_env(|env| {
            let j_address = env
                .new_string(address)
                .map_err(|e| jni_err("new_string(address)", e))?;
            let channel = env
                .call_static_method(
                    CHANNEL,
                    "newWifiChannel",
                    "(Ljava/lang/String;)Lcom/brother/sdk/lmprinter/Channel;",
                    &[JValue::Object(&j_address)],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err("Channel.newWifiChannel", e))?;

            let result = env
                .call_static_method(
                    DRIVER_GENERATOR,
                    "openChannel",
                    "(Lcom/brother/sdk/lmprinter/Channel;)Lcom/brother/sdk/lmprinter/PrinterDriverGenerateResult;",
                    &[JValue::Object(&channel)],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err("PrinterDriverGenerator.openChannel", e))?;

            let error = call_object(
                env,
                &result,
                "getError",
                "()Lcom/brother/sdk/lmprinter/OpenChannelError;",
            )?;
            let code = error_code(
                env,
                &error,
                "com/brother/sdk/lmprinter/OpenChannelError$ErrorCode",
            )?;
            if code != NO_ERROR {
                return Err(LabelBridgeError::ChannelOpen(code));
            }

            let driver = call_object(
                env,
                &result,
                "getDriver",
                "()Lcom/brother/sdk/lmprinter/PrinterDriver;",
            )?;
            env.new_global_ref(driver)
                .map_err(|e| jni_err("new_global_ref(driver)", e))
        })?;

        Ok(Box::new(JniLabelDriver { driver }))
    }
}

/// A `PrinterDriver` bound to one open Wi-Fi channel.
struct JniLabelDriver {
    driver: GlobalRef,
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| LabelBridgeError::ImageEncode(e.to_string()))?;
    Ok(bytes)
}

/// Decode PNG bytes into an `android.graphics.Bitmap`.
fn to_bitmap<'local>(env: &mut JNIEnv<'local>, png: &[u8]) -> Result<JObject<'local>> {
    let len = i32::try_from(png.len())
        .map_err(|_| LabelBridgeError::ImageEncode("label image too large".into()))?;
    let array = env
        .byte_array_from_slice(png)
        .map_err(|e| jni_err("byte_array_from_slice", e))?;
    let bitmap = env
        .call_static_method(
            "android/graphics/BitmapFactory",
            "decodeByteArray",
            "([BII)Landroid/graphics/Bitmap;",
            &[JValue::Object(&array), JValue::Int(0), JValue::Int(len)],
        )
        .and_then(|value| value.l())
        .map_err(|e| jni_err("BitmapFactory.decodeByteArray", e))?;
    if bitmap.is_null() {
        return Err(LabelBridgeError::ImageEncode(
            "BitmapFactory could not decode label image".into(),
        ));
    }
    Ok(bitmap)
}

/// Build `QLPrintSettings` for one job.
fn ql_settings<'local>(
    env: &mut JNIEnv<'local>,
    settings: &LabelPrintSettings,
) -> Result<JObject<'local>> {
    let model = enum_constant(env, PRINTER_MODEL, settings.model.driver_name())?;
    let ql = env
        .new_object(
            QL_SETTINGS,
            "(Lcom/brother/sdk/lmprinter/PrinterModel;)V",
            &[JValue::Object(&model)],
        )
        .map_err(|e| jni_err("new QLPrintSettings", e))?;

    let orientation = enum_constant(env, ORIENTATION, settings.orientation.driver_name())?;
    call_void(
        env,
        &ql,
        "setPrintOrientation",
        &format!("(L{ORIENTATION};)V"),
        &[JValue::Object(&orientation)],
    )?;

    let label_size = enum_constant(env, LABEL_SIZE, settings.label_size.driver_name())?;
    call_void(
        env,
        &ql,
        "setLabelSize",
        &format!("(L{LABEL_SIZE};)V"),
        &[JValue::Object(&label_size)],
    )?;

    call_void(
        env,
        &ql,
        "setAutoCut",
        "(Z)V",
        &[JValue::Bool(settings.auto_cut.into())],
    )?;

    if let Some(work_path) = &settings.work_path {
        let j_path = env
            .new_string(work_path)
            .map_err(|e| jni_err("new_string(work_path)", e))?;
        call_void(
            env,
            &ql,
            "setWorkPath",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_path)],
        )?;
    }
    Ok(ql)
}

impl LabelPrinterDriver for JniLabelDriver {
    fn print_image(&mut self, image: &DynamicImage, settings: &LabelPrintSettings) -> Result<()> {
        let png = encode_png(image)?;
        with_env(|env| {
            let bitmap = to_bitmap(env, &png)?;
            let ql = ql_settings(env, settings)?;
            let error = env
                .call_method(
                    self.driver.as_obj(),
                    "printImage",
                    "(Landroid/graphics/Bitmap;Lcom/brother/sdk/lmprinter/setting/PrintImageSettings;)Lcom/brother/sdk/lmprinter/PrintError;",
                    &[JValue::Object(&bitmap), JValue::Object(&ql)],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err("printImage", e))?;

            let code = error_code(env, &error, "com/brother/sdk/lmprinter/PrintError$ErrorCode")?;
            if code == NO_ERROR {
                Ok(())
            } else {
                Err(LabelBridgeError::PrintImage(code))
            }
        })
    }

    fn close_channel(&mut self) {
        let closed = with_env(|env| {
            call_void(env, self.driver.as_obj(), "closeChannel", "()V", &[])
        });
        if let Err(e) = closed {
            warn!(error = %e, "failed to close printer channel");
        }
    }
}
