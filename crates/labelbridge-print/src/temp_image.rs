// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporary JPEG files handed to the print service by URI.
//
// The print service only accepts file locations, so every label image is
// written out before it is queued. Files are never removed here; the platform
// cache directory they live in is reclaimed by the OS.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, instrument};

use labelbridge_core::error::{LabelBridgeError, Result};

/// Writes label images as JPEG files under a cache subdirectory.
#[derive(Debug, Clone)]
pub struct TempImageStore {
    dir: PathBuf,
    quality: u8,
}

impl TempImageStore {
    /// Store files in `cache_dir/subdir` at the given JPEG quality (1-100).
    pub fn new(cache_dir: impl AsRef<Path>, subdir: &str, quality: u8) -> Self {
        Self {
            dir: cache_dir.as_ref().join(subdir),
            quality: quality.clamp(1, 100),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode `image` to a new `image<index>_<random>.jpg` file and return
    /// its path.
    #[instrument(skip(self, image), fields(dir = %self.dir.display()))]
    pub fn persist(&self, image: &DynamicImage, index: usize) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let (file, path) = tempfile::Builder::new()
            .prefix(&format!("image{index}_"))
            .suffix(".jpg")
            .tempfile_in(&self.dir)?
            .keep()
            .map_err(|e| LabelBridgeError::Io(e.error))?;

        let mut writer = BufWriter::new(file);
        // JPEG has no alpha channel.
        image
            .to_rgb8()
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, self.quality))
            .map_err(|e| LabelBridgeError::ImageEncode(e.to_string()))?;
        writer.flush()?;

        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "label image written"
        );
        Ok(path)
    }

    /// Encode `image` and return a `file://` URI for it.
    pub fn persist_uri(&self, image: &DynamicImage, index: usize) -> Result<String> {
        self.persist(image, index).map(|path| file_uri(&path))
    }
}

/// `file://` URI for an absolute path.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
