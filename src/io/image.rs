use crate::core::framebuffer::FrameBuffer;
use crate::error::{RenderError, Result};
use chrono::Local;
use image::RgbaImage;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes a resolved framebuffer to a PNG file, creating parent directories.
pub fn save_framebuffer_png<P: AsRef<Path>>(framebuffer: &FrameBuffer, path: P) -> Result<()> {
    save_rgba_png(
        &framebuffer.to_rgba8(),
        framebuffer.width,
        framebuffer.height,
        path,
    )
}

/// Saves a tightly packed RGBA8 buffer, top row first.
pub fn save_rgba_png<P: AsRef<Path>>(pixels: &[u8], width: usize, height: usize, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let img = RgbaImage::from_raw(width as u32, height as u32, pixels.to_vec()).ok_or_else(|| {
        RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("pixel buffer does not match {width}x{height}"),
        ))
    })?;

    img.save(path).map_err(|source| RenderError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved image to {path:?}");
    Ok(())
}

/// `dir/screenshot_YYYYmmdd_HHMMSS.png` for the current local time.
pub fn screenshot_path<P: AsRef<Path>>(dir: P) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.as_ref().join(format!("screenshot_{stamp}.png"))
}
