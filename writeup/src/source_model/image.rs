//! Image references for embedded raster images

/// Raster image formats accepted by embed spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `.png`
    Png,
    /// `.jpg`, `.jpeg`
    Jpeg,
    /// `.gif`
    Gif,
    /// `.bmp`
    Bmp,
    /// `.webp`
    Webp,
    /// `.ico`
    Ico,
}

impl ImageFormat {
    /// Determine format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "webp" => Some(ImageFormat::Webp),
            "ico" => Some(ImageFormat::Ico),
            _ => None,
        }
    }
}

/// An `<img>` reference to an image file; the image itself is not inlined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Path as written in the source, used as the `src` attribute
    pub src: String,

    /// Image format
    pub format: ImageFormat,

    /// Pixel size (width, height), when the image header could be read
    pub size: Option<(usize, usize)>,
}

impl ImageReference {
    /// Create a reference, reading the pixel size from the image header
    ///
    /// # Returns
    /// * `Ok(ImageReference)` - Reference with its pixel size
    /// * `Err((ImageReference, imagesize::ImageError))` - Reference without size, and why
    pub fn from_bytes(
        src: String,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<Self, (Self, imagesize::ImageError)> {
        match imagesize::blob_size(bytes) {
            Ok(size) => Ok(Self {
                src,
                format,
                size: Some((size.width, size.height)),
            }),
            Err(e) => Err((
                Self {
                    src,
                    format,
                    size: None,
                },
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("svg"), None);
        assert_eq!(ImageFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_unreadable_header_keeps_reference() {
        let (image, _) =
            ImageReference::from_bytes("a.png".to_string(), ImageFormat::Png, b"not an image")
                .unwrap_err();
        assert_eq!(image.src, "a.png");
        assert_eq!(image.size, None);
    }
}
