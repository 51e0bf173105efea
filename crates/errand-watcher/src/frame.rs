//! Screenshot capture and decoding.
//!
//! Screenshots are taken by running the configured capture command through
//! the command gateway (so it is subject to the same policy as every other
//! command) into a fixed temporary path, then read back, decoded into an
//! RGBA buffer for diffing, and base64-encoded for transport to the oracle.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

use errand_gateway::Gateway;
use errand_types::{ErrandError, TaskContext};

/// A decoded screenshot: pixel buffer plus the transport-encoded original.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    /// Raw PNG bytes as read from disk.
    pub png: Vec<u8>,
    /// Base64 of `png`, handed to the oracle.
    pub encoded: String,
}

impl Frame {
    /// Capture a screenshot to `path` via the gateway and decode it.
    ///
    /// The gateway result itself is not trusted to signal success; the file
    /// is the source of truth. A missing or undecodable file is a transient
    /// capture failure.
    pub async fn capture(
        gateway: &Gateway,
        ctx: &TaskContext,
        cmd_template: &str,
        path: &Path,
    ) -> Result<Self, ErrandError> {
        let cmd = cmd_template.replace("{path}", &path.to_string_lossy());
        let result = gateway.run(&cmd, ctx).await;
        if !result.success {
            tracing::debug!(stderr = %result.stderr, "capture command reported failure");
        }

        let png = std::fs::read(path).map_err(|e| {
            ErrandError::WatcherError(format!(
                "screenshot not found at {}: {e}",
                path.display()
            ))
        })?;

        Self::decode(png)
    }

    /// Decode PNG bytes into a frame.
    pub fn decode(png: Vec<u8>) -> Result<Self, ErrandError> {
        let img = image::load_from_memory(&png)
            .map_err(|e| ErrandError::WatcherError(format!("failed to decode screenshot: {e}")))?
            .to_rgba8();

        let (width, height) = img.dimensions();
        let encoded = B64.encode(&png);

        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
            png,
            encoded,
        })
    }
}

/// Delete a temp screenshot, tolerating a file that is already gone.
pub fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp screenshot");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_png {
    use std::io::Cursor;

    /// Encode a solid-color RGBA image as PNG bytes.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encoding should work");
        bytes
    }

    /// Encode an image where the first `n` pixels (row-major) are `changed`
    /// and the rest are `base`.
    pub fn with_changed_pixels(
        width: u32,
        height: u32,
        base: [u8; 4],
        changed: [u8; 4],
        n: u32,
    ) -> Vec<u8> {
        let mut img = image::RgbaImage::from_pixel(width, height, image::Rgba(base));
        for idx in 0..n {
            let x = idx % width;
            let y = idx / width;
            img.put_pixel(x, y, image::Rgba(changed));
        }
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encoding should work");
        bytes
    }
}
