// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution of host-supplied image URIs to in-memory images.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, instrument};

use labelbridge_core::error::{LabelBridgeError, Result};

/// Turns a URI handed over by the host into a decoded image.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, uri: &str) -> Result<DynamicImage>;
}

/// Resolves `file://` URIs and plain filesystem paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageResolver;

impl FileImageResolver {
    /// Filesystem path for `uri`, or `None` for other schemes.
    pub fn local_path(uri: &str) -> Option<&Path> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Some(Path::new(path));
        }
        if uri.contains("://") {
            return None;
        }
        Some(Path::new(uri))
    }
}

impl ImageResolver for FileImageResolver {
    #[instrument(skip(self))]
    fn resolve(&self, uri: &str) -> Result<DynamicImage> {
        let path = Self::local_path(uri).ok_or_else(|| LabelBridgeError::ImageResolve {
            uri: uri.to_owned(),
            reason: "unsupported URI scheme".into(),
        })?;

        let image = image::open(path).map_err(|e| LabelBridgeError::ImageResolve {
            uri: uri.to_owned(),
            reason: e.to_string(),
        })?;
        debug!(width = image.width(), height = image.height(), "image resolved");
        Ok(image)
    }
}
