use std::path::Path;

use image::DynamicImage;

use crate::geometry::ImageSpec;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// A decoded bitmap ready for editing.
pub struct SourceImage {
    image: DynamicImage,
    spec: ImageSpec,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Result<Self, LoadError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(LoadError::Empty { width, height });
        }
        Ok(Self {
            image,
            spec: ImageSpec::new(width, height),
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source = Self::new(image::open(path)?)?;
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            source.spec.natural_width,
            source.spec.natural_height
        );
        Ok(source)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Self::new(image::load_from_memory(bytes)?)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn spec(&self) -> ImageSpec {
        self.spec
    }
}
