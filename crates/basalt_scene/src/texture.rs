//! Live texture resources
//!
//! A texture's pixel storage is shared behind a lock so a deferred image
//! load can replace the 1x1 placeholder in place while the texture is
//! already attached to materials and in use.

use core::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::math::Vec2;

/// Texture coordinate wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

impl WrapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapMode::Repeat => "repeat",
            WrapMode::ClampToEdge => "clamp-to-edge",
            WrapMode::MirroredRepeat => "mirrored-repeat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "repeat" => Some(WrapMode::Repeat),
            "clamp-to-edge" => Some(WrapMode::ClampToEdge),
            "mirrored-repeat" => Some(WrapMode::MirroredRepeat),
            _ => None,
        }
    }
}

/// Texture sampling filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Nearest => "nearest",
            FilterMode::Linear => "linear",
            FilterMode::NearestMipmapNearest => "nearest-mipmap-nearest",
            FilterMode::NearestMipmapLinear => "nearest-mipmap-linear",
            FilterMode::LinearMipmapNearest => "linear-mipmap-nearest",
            FilterMode::LinearMipmapLinear => "linear-mipmap-linear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "nearest" => Some(FilterMode::Nearest),
            "linear" => Some(FilterMode::Linear),
            "nearest-mipmap-nearest" => Some(FilterMode::NearestMipmapNearest),
            "nearest-mipmap-linear" => Some(FilterMode::NearestMipmapLinear),
            "linear-mipmap-nearest" => Some(FilterMode::LinearMipmapNearest),
            "linear-mipmap-linear" => Some(FilterMode::LinearMipmapLinear),
            _ => None,
        }
    }
}

/// Pixel layout of the decoded image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureFormat {
    #[default]
    Rgba,
    Rgb,
    Luminance,
    LuminanceAlpha,
    Depth,
}

impl TextureFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextureFormat::Rgba => "rgba",
            TextureFormat::Rgb => "rgb",
            TextureFormat::Luminance => "luminance",
            TextureFormat::LuminanceAlpha => "luminance-alpha",
            TextureFormat::Depth => "depth",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rgba" => Some(TextureFormat::Rgba),
            "rgb" => Some(TextureFormat::Rgb),
            "luminance" => Some(TextureFormat::Luminance),
            "luminance-alpha" => Some(TextureFormat::LuminanceAlpha),
            "depth" => Some(TextureFormat::Depth),
            _ => None,
        }
    }
}

/// Color space the image data is encoded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    #[default]
    Srgb,
    Linear,
    None,
}

impl ColorSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSpace::Srgb => "srgb",
            ColorSpace::Linear => "linear",
            ColorSpace::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "srgb" => Some(ColorSpace::Srgb),
            "linear" => Some(ColorSpace::Linear),
            "none" => Some(ColorSpace::None),
            _ => None,
        }
    }
}

/// Where the image bytes come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// Remote raster image addressed by locator.
    Url(String),
    /// Canvas-backed raster carried inline as base64 bytes.
    Inline { mime: String, data: String },
    /// Ordered 6-face cube payload (+x, -x, +y, -y, +z, -z).
    Cube(Vec<ImageSource>),
}

impl ImageSource {
    pub fn is_cube(&self) -> bool {
        matches!(self, ImageSource::Cube(_))
    }
}

/// Decoded RGBA8 pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// 1x1 opaque white placeholder used until a deferred load settles.
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255, 255, 255, 255],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.width == 1 && self.height == 1
    }
}

/// Shared, in-place-updatable pixel storage.
#[derive(Clone)]
pub struct ImageHandle(Arc<RwLock<ImageData>>);

impl ImageHandle {
    pub fn placeholder() -> Self {
        Self(Arc::new(RwLock::new(ImageData::placeholder())))
    }

    pub fn replace(&self, data: ImageData) {
        *self.0.write() = data;
    }

    pub fn width(&self) -> u32 {
        self.0.read().width
    }

    pub fn height(&self) -> u32 {
        self.0.read().height
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.read().is_placeholder()
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, ImageData> {
        self.0.read()
    }

    /// True when both handles point at the same pixel storage.
    pub fn shares_storage(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        f.debug_struct("ImageHandle")
            .field("width", &data.width)
            .field("height", &data.height)
            .finish()
    }
}

/// Materialized pixel storage, single or per-face.
#[derive(Clone, Debug)]
pub enum ImagePayload {
    Single(ImageHandle),
    Cube(Vec<ImageHandle>),
}

impl ImagePayload {
    fn for_source(source: &ImageSource) -> Self {
        match source {
            ImageSource::Cube(faces) => {
                ImagePayload::Cube(faces.iter().map(|_| ImageHandle::placeholder()).collect())
            }
            _ => ImagePayload::Single(ImageHandle::placeholder()),
        }
    }
}

/// A live texture resource.
#[derive(Clone, Debug)]
pub struct Texture {
    pub name: String,
    pub source: ImageSource,
    pub payload: ImagePayload,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub format: TextureFormat,
    pub color_space: ColorSpace,
    pub anisotropy: u32,
    pub offset: Vec2,
    pub repeat: Vec2,
    pub center: Vec2,
    pub rotation: f32,
    pub flip_y: bool,
    pub premultiply_alpha: bool,
    pub generate_mipmaps: bool,
}

impl Texture {
    pub fn new(source: ImageSource) -> Self {
        let payload = ImagePayload::for_source(&source);
        Self {
            name: String::new(),
            source,
            payload,
            wrap_s: WrapMode::default(),
            wrap_t: WrapMode::default(),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::LinearMipmapLinear,
            format: TextureFormat::default(),
            color_space: ColorSpace::default(),
            anisotropy: 1,
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            center: Vec2::ZERO,
            rotation: 0.0,
            flip_y: true,
            premultiply_alpha: false,
            generate_mipmaps: true,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(ImageSource::Url(url.into()))
    }

    pub fn is_cube(&self) -> bool {
        self.source.is_cube()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_replaced_in_place() {
        let tex = Texture::from_url("skin.png");
        let clone = tex.clone();
        let handle = match &tex.payload {
            ImagePayload::Single(h) => h.clone(),
            ImagePayload::Cube(_) => panic!("not a cube"),
        };
        assert!(handle.is_placeholder());

        handle.replace(ImageData {
            width: 4,
            height: 2,
            pixels: vec![0; 32],
        });

        // The clone shares the storage, so it sees the update too.
        match &clone.payload {
            ImagePayload::Single(h) => {
                assert_eq!(h.width(), 4);
                assert!(h.shares_storage(&handle));
            }
            ImagePayload::Cube(_) => panic!("not a cube"),
        }
    }

    #[test]
    fn test_cube_payload_has_six_faces() {
        let faces = (0..6)
            .map(|i| ImageSource::Url(format!("face{}.png", i)))
            .collect();
        let tex = Texture::new(ImageSource::Cube(faces));
        match &tex.payload {
            ImagePayload::Cube(handles) => assert_eq!(handles.len(), 6),
            ImagePayload::Single(_) => panic!("expected cube payload"),
        }
    }
}
