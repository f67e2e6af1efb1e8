// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host runtime adapters: outbound events and `content://` image loading.

use image::DynamicImage;
use jni::objects::{GlobalRef, JByteArray, JValue};
use tracing::{debug, warn};

use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::events::{BridgeEvent, EventSink};

use crate::resolver::{FileImageResolver, ImageResolver};

use super::{call_object, call_void, jni_err, with_env};

/// Forwards bridge events to the host's device event emitter
/// (`void emit(String name, String payloadJson)`).
pub struct ReactEventSink {
    emitter: GlobalRef,
}

impl ReactEventSink {
    pub fn new(emitter: GlobalRef) -> Self {
        Self { emitter }
    }
}

impl EventSink for ReactEventSink {
    fn emit(&self, event: &BridgeEvent) {
        let payload = match event.payload_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(event = event.name(), error = %e, "unserialisable bridge event");
                return;
            }
        };

        let sent = with_env(|env| {
            let name = env
                .new_string(event.name())
                .map_err(|e| jni_err("new_string(event)", e))?;
            let payload = env
                .new_string(&payload)
                .map_err(|e| jni_err("new_string(payload)", e))?;
            call_void(
                env,
                self.emitter.as_obj(),
                "emit",
                "(Ljava/lang/String;Ljava/lang/String;)V",
                &[JValue::Object(&name), JValue::Object(&payload)],
            )
        });
        if let Err(e) = sent {
            warn!(event = event.name(), error = %e, "host event emit failed");
        }
    }
}

/// Resolves `content://` URIs through the `ContentResolver`; file URIs and
/// paths go to [`FileImageResolver`].
pub struct ContentImageResolver {
    context: GlobalRef,
}

impl ContentImageResolver {
    pub fn new(context: GlobalRef) -> Self {
        Self { context }
    }

    /// Read every byte behind a content URI.
    fn read_content(&self, uri: &str) -> Result<Vec<u8>> {
        with_env(|env| {
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

            let resolver = call_object(
                env,
                self.context.as_obj(),
                "getContentResolver",
                "()Landroid/content/ContentResolver;",
            )?;
            let input = env
                .call_method(
                    &resolver,
                    "openInputStream",
                    "(Landroid/net/Uri;)Ljava/io/InputStream;",
                    &[JValue::Object(&uri_obj)],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err("openInputStream", e))?;
            if input.is_null() {
                return Err(LabelBridgeError::Bridge(format!(
                    "ContentResolver returned no stream for {uri}"
                )));
            }

            let sink = env
                .new_object("java/io/ByteArrayOutputStream", "()V", &[])
                .map_err(|e| jni_err("new ByteArrayOutputStream", e))?;
            let buffer = env
                .new_byte_array(8192)
                .map_err(|e| jni_err("new_byte_array", e))?;

            loop {
                let read = env
                    .call_method(&input, "read", "([B)I", &[JValue::Object(&buffer)])
                    .and_then(|value| value.i())
                    .map_err(|e| jni_err("InputStream.read", e))?;
                if read < 0 {
                    break;
                }
                call_void(
                    env,
                    &sink,
                    "write",
                    "([BII)V",
                    &[JValue::Object(&buffer), JValue::Int(0), JValue::Int(read)],
                )?;
            }
            call_void(env, &input, "close", "()V", &[])?;

            let bytes = call_object(env, &sink, "toByteArray", "()[B")?;
            let bytes = JByteArray::from(bytes);
            env.convert_byte_array(&bytes)
                .map_err(|e| jni_err("convert_byte_array", e))
        })
    }
}

impl ImageResolver for ContentImageResolver {
    fn resolve(&self, uri: &str) -> Result<DynamicImage> {
        if FileImageResolver::local_path(uri).is_some() {
            return FileImageResolver.resolve(uri);
        }

        let bytes = self
            .read_content(uri)
            .map_err(|e| LabelBridgeError::ImageResolve {
                uri: uri.to_owned(),
                reason: e.to_string(),
            })?;
        debug!(uri, bytes = bytes.len(), "content URI read");

        image::load_from_memory(&bytes).map_err(|e| LabelBridgeError::ImageResolve {
            uri: uri.to_owned(),
            reason: e.to_string(),
        })
    }
}
