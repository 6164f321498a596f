//! Texture codec
//!
//! The stored image payload is discriminated by shape: a locator string
//! (remote raster), an inline base64 object (canvas-backed raster), or an
//! ordered 6-element array (cube). Decoding is synchronous and returns a
//! texture that is usable immediately with placeholder pixels; the real
//! image is fetched as a pending operation and swapped in when it lands.

use std::sync::Arc;

use base64::Engine as _;
use futures_util::future::join_all;
use serde_json::Value;

use basalt_scene::{
    ColorSpace, FilterMode, ImageData, ImagePayload, ImageSource, Texture, TextureFormat, Vec2,
    WrapMode,
};

use crate::context::{AssetSource, ResolveContext};
use crate::error::AssetError;
use crate::record::Record;

const KIND_TEXTURE: &str = "Texture";
const KIND_CANVAS: &str = "CanvasTexture";
const KIND_CUBE: &str = "CubeTexture";

/// True when `kind` names one of the texture record variants.
pub fn is_texture_kind(kind: &str) -> bool {
    matches!(kind, KIND_TEXTURE | KIND_CANVAS | KIND_CUBE)
}

fn kind_for(source: &ImageSource) -> &'static str {
    match source {
        ImageSource::Url(_) => KIND_TEXTURE,
        ImageSource::Inline { .. } => KIND_CANVAS,
        ImageSource::Cube(_) => KIND_CUBE,
    }
}

fn image_value(source: &ImageSource) -> Value {
    match source {
        ImageSource::Url(url) => Value::String(url.clone()),
        ImageSource::Inline { mime, data } => serde_json::json!({ "mime": mime, "data": data }),
        ImageSource::Cube(faces) => Value::Array(faces.iter().map(image_value).collect()),
    }
}

fn image_source(value: &Value) -> Option<ImageSource> {
    match value {
        Value::String(url) => Some(ImageSource::Url(url.clone())),
        Value::Object(obj) => Some(ImageSource::Inline {
            mime: obj.get("mime")?.as_str()?.to_string(),
            data: obj.get("data")?.as_str()?.to_string(),
        }),
        Value::Array(faces) => {
            if faces.len() != 6 {
                return None;
            }
            let parsed: Option<Vec<ImageSource>> = faces.iter().map(image_source).collect();
            let parsed = parsed?;
            // Faces are rasters; a cube of cubes is malformed.
            if parsed.iter().any(ImageSource::is_cube) {
                return None;
            }
            Some(ImageSource::Cube(parsed))
        }
        _ => None,
    }
}

/// Encode a texture as an inline resource sub-record.
pub fn encode(texture: &Texture) -> Record {
    let mut rec = Record::new(kind_for(&texture.source), basalt_scene::Token::generate());
    rec.insert("name", texture.name.clone());
    rec.insert("image", image_value(&texture.source));
    rec.insert("wrapS", texture.wrap_s.as_str());
    rec.insert("wrapT", texture.wrap_t.as_str());
    rec.insert("magFilter", texture.mag_filter.as_str());
    rec.insert("minFilter", texture.min_filter.as_str());
    rec.insert("format", texture.format.as_str());
    rec.insert("colorSpace", texture.color_space.as_str());
    rec.insert("anisotropy", texture.anisotropy);
    rec.insert_vec2("offset", texture.offset);
    rec.insert_vec2("repeat", texture.repeat);
    rec.insert_vec2("center", texture.center);
    rec.insert("rotation", texture.rotation);
    rec.insert("flipY", texture.flip_y);
    rec.insert("premultiplyAlpha", texture.premultiply_alpha);
    rec.insert("generateMipmaps", texture.generate_mipmaps);
    rec
}

/// Decode a texture sub-record. Returns immediately; the image payload is
/// queued on the context and materialized after the synchronous walk.
pub fn decode(record: &Record, ctx: &mut ResolveContext) -> Option<Texture> {
    let source = match record.get("image").and_then(image_source) {
        Some(source) => source,
        None => {
            log::warn!(
                "texture record '{}' has a missing or malformed image payload",
                record.token
            );
            return None;
        }
    };

    let mut texture = Texture::new(source.clone());
    if let Some(name) = record.str_field("name") {
        texture.name = name.to_string();
    }
    if let Some(w) = record.str_field("wrapS").and_then(WrapMode::parse) {
        texture.wrap_s = w;
    }
    if let Some(w) = record.str_field("wrapT").and_then(WrapMode::parse) {
        texture.wrap_t = w;
    }
    if let Some(f) = record.str_field("magFilter").and_then(FilterMode::parse) {
        texture.mag_filter = f;
    }
    if let Some(f) = record.str_field("minFilter").and_then(FilterMode::parse) {
        texture.min_filter = f;
    }
    if let Some(f) = record.str_field("format").and_then(TextureFormat::parse) {
        texture.format = f;
    }
    if let Some(c) = record.str_field("colorSpace").and_then(ColorSpace::parse) {
        texture.color_space = c;
    }
    if let Some(a) = record.u32_field("anisotropy") {
        texture.anisotropy = a;
    }
    texture.offset = record.vec2_field("offset").unwrap_or(Vec2::ZERO);
    texture.repeat = record.vec2_field("repeat").unwrap_or(Vec2::ONE);
    texture.center = record.vec2_field("center").unwrap_or(Vec2::ZERO);
    texture.rotation = record.f32_field("rotation").unwrap_or(0.0);
    texture.flip_y = record.bool_field("flipY").unwrap_or(true);
    texture.premultiply_alpha = record.bool_field("premultiplyAlpha").unwrap_or(false);
    texture.generate_mipmaps = record.bool_field("generateMipmaps").unwrap_or(true);

    ctx.queue_image(texture.payload.clone(), source);
    Some(texture)
}

/// Fetch and decode one raster source into RGBA8 pixels.
async fn load_raster(
    assets: &Arc<dyn AssetSource>,
    source: &ImageSource,
) -> Result<ImageData, AssetError> {
    let (label, bytes) = match source {
        ImageSource::Url(url) => (url.clone(), assets.fetch(url).await?),
        ImageSource::Inline { data, .. } => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| AssetError::Decode("<inline>".to_string(), e.to_string()))?;
            ("<inline>".to_string(), bytes)
        }
        ImageSource::Cube(_) => {
            return Err(AssetError::Decode(
                "<cube>".to_string(),
                "cube payload has no single raster".to_string(),
            ))
        }
    };

    let img = image::load_from_memory(&bytes)
        .map_err(|e| AssetError::Decode(label, e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Drive one queued image payload to completion. Failures warn and leave
/// the placeholder pixels in place; they never propagate.
pub(crate) async fn materialize(assets: Arc<dyn AssetSource>, payload: ImagePayload, source: ImageSource) {
    match (payload, source) {
        (ImagePayload::Single(handle), source) => match load_raster(&assets, &source).await {
            Ok(data) => handle.replace(data),
            Err(e) => log::warn!("image load failed: {}", e),
        },
        (ImagePayload::Cube(handles), ImageSource::Cube(faces)) => {
            // All six faces settle before this operation completes.
            let loads = handles.into_iter().zip(faces).map(|(handle, face)| {
                let assets = assets.clone();
                async move {
                    match load_raster(&assets, &face).await {
                        Ok(data) => handle.replace(data),
                        Err(e) => log::warn!("cube face load failed: {}", e),
                    }
                }
            });
            join_all(loads).await;
        }
        (ImagePayload::Cube(_), _) => {
            log::warn!("cube texture queued with a non-cube source; leaving placeholders");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_source_shape() {
        let url = Texture::from_url("a.png");
        assert_eq!(encode(&url).kind(), "Texture");

        let inline = Texture::new(ImageSource::Inline {
            mime: "image/png".to_string(),
            data: "AAAA".to_string(),
        });
        assert_eq!(encode(&inline).kind(), "CanvasTexture");

        let cube = Texture::new(ImageSource::Cube(
            (0..6)
                .map(|i| ImageSource::Url(format!("f{}.png", i)))
                .collect(),
        ));
        assert_eq!(encode(&cube).kind(), "CubeTexture");
    }

    #[test]
    fn test_decode_roundtrips_sampler_state() {
        let mut tex = Texture::from_url("skin.png");
        tex.name = "skin".to_string();
        tex.wrap_s = WrapMode::MirroredRepeat;
        tex.repeat = Vec2::new(2.0, 2.0);
        tex.flip_y = false;

        let rec = encode(&tex);
        let mut ctx = ResolveContext::offline();
        let back = decode(&rec, &mut ctx).unwrap();

        assert_eq!(back.name, "skin");
        assert_eq!(back.wrap_s, WrapMode::MirroredRepeat);
        assert_eq!(back.repeat, Vec2::new(2.0, 2.0));
        assert!(!back.flip_y);
        assert!(ctx.has_pending());
    }

    #[test]
    fn test_malformed_image_yields_none() {
        let mut rec = Record::new("Texture", "t");
        rec.insert("image", 42);
        let mut ctx = ResolveContext::offline();
        assert!(decode(&rec, &mut ctx).is_none());
    }

    #[test]
    fn test_cube_with_wrong_face_count_is_malformed() {
        let mut rec = Record::new("CubeTexture", "t");
        rec.insert("image", serde_json::json!(["a.png", "b.png"]));
        let mut ctx = ResolveContext::offline();
        assert!(decode(&rec, &mut ctx).is_none());
    }
}
