//! Writing exported images to disk.

use std::path::{Path, PathBuf};

use card_renderer::export::ExportedImage;

/// Resolve where `image` should be written.
///
/// No target means the image's own file name in the working directory; an
/// existing directory receives the image's file name; anything else is
/// used as the file path.
#[must_use]
pub fn resolve_output(image: &ExportedImage, target: Option<&Path>) -> PathBuf {
    match target {
        None => PathBuf::from(&image.filename),
        Some(dir) if dir.is_dir() => dir.join(&image.filename),
        Some(path) => path.to_path_buf(),
    }
}

/// Write `image` and return the path written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_image(image: &ExportedImage, target: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = resolve_output(image, target);
    std::fs::write(&path, &image.bytes)?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), image.bytes.len());
    Ok(path)
}
