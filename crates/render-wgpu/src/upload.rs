use shaderbox_common::{ImageData, ImageFormat, MeshData};
use std::sync::Arc;

use crate::layout::Vertex;

/// Interleaves a mesh into the vertex layout. Missing normals default to
/// +Y and missing uvs to zero.
pub fn mesh_vertices(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: mesh.uvs.get(i).copied().unwrap_or_default(),
        })
        .collect()
}

/// Converts an image to 8-bit RGBA suitable for an `Rgba8UnormSrgb`
/// texture. HDR input is Reinhard tonemapped and sRGB encoded.
pub fn rgba8_pixels(image: &ImageData) -> Vec<u8> {
    match image.format {
        ImageFormat::Rgba8Srgb => image.bytes.clone(),
        ImageFormat::Rgba32Float => image
            .bytes
            .chunks_exact(16)
            .flat_map(|texel| {
                let mut out = [0u8; 4];
                for (c, chunk) in texel.chunks_exact(4).enumerate() {
                    let v = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                    out[c] = if c == 3 {
                        unit_to_u8(v)
                    } else {
                        unit_to_u8(srgb_encode(tonemap(v)))
                    };
                }
                out
            })
            .collect(),
    }
}

/// 8-bit RGBA pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TexturePixels {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Converts `image` with [`rgba8_pixels`] and nearest-samples it down so
/// neither side exceeds `max_dim`. Aspect ratio is kept. `image` must be
/// valid.
pub fn texture_pixels(image: &ImageData, max_dim: u32) -> TexturePixels {
    let bytes = rgba8_pixels(image);
    let (width, height) = (image.width, image.height);
    let max_dim = max_dim.max(1);
    if width <= max_dim && height <= max_dim {
        return TexturePixels { width, height, bytes };
    }

    let scale = max_dim as f64 / width.max(height) as f64;
    let fit = |side: u32| ((side as f64 * scale).floor() as u32).clamp(1, max_dim);
    let (out_w, out_h) = (fit(width), fit(height));
    let mut out = Vec::with_capacity(out_w as usize * out_h as usize * 4);
    for y in 0..out_h {
        let sy = (y as u64 * height as u64 / out_h as u64) as usize;
        for x in 0..out_w {
            let sx = (x as u64 * width as u64 / out_w as u64) as usize;
            let i = (sy * width as usize + sx) * 4;
            out.extend_from_slice(&bytes[i..i + 4]);
        }
    }
    TexturePixels {
        width: out_w,
        height: out_h,
        bytes: out,
    }
}

/// True when both sides refer to the same image allocation, or both are
/// absent.
pub fn same_image(a: Option<&Arc<ImageData>>, b: Option<&Arc<ImageData>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn tonemap(v: f32) -> f32 {
    let v = v.max(0.0);
    v / (1.0 + v)
}

fn srgb_encode(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hdr_pixel(rgba: [f32; 4]) -> ImageData {
        ImageData {
            width: 1,
            height: 1,
            format: ImageFormat::Rgba32Float,
            bytes: rgba.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    #[test]
    fn ldr_passes_through() {
        let image = ImageData::solid([10, 20, 30, 255]);
        assert_eq!(rgba8_pixels(&image), vec![10, 20, 30, 255]);
    }

    #[test]
    fn hdr_is_tonemapped_into_range() {
        let pixels = rgba8_pixels(&hdr_pixel([0.0, 1.0, 1000.0, 1.0]));
        assert_eq!(pixels.len(), 4);
        assert_eq!(pixels[0], 0);
        assert!(pixels[1] > 150 && pixels[1] < 255);
        assert_eq!(pixels[2], 255);
        assert_eq!(pixels[3], 255);
    }

    #[test]
    fn negative_hdr_values_clamp_to_black() {
        let pixels = rgba8_pixels(&hdr_pixel([-5.0, -0.1, 0.0, 1.0]));
        assert_eq!(&pixels[..3], &[0, 0, 0]);
    }

    #[test]
    fn small_textures_keep_their_size() {
        let image = ImageData::solid([1, 2, 3, 4]);
        let pixels = texture_pixels(&image, 8192);
        assert_eq!((pixels.width, pixels.height), (1, 1));
        assert_eq!(pixels.bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn oversized_textures_shrink_under_the_limit() {
        // 8x2 image, each column tinted by its x.
        let bytes = (0..2)
            .flat_map(|_| (0..8u8).flat_map(|x| [x * 10, 0, 0, 255]))
            .collect();
        let image = ImageData {
            width: 8,
            height: 2,
            format: ImageFormat::Rgba8Srgb,
            bytes,
        };
        let pixels = texture_pixels(&image, 4);
        assert_eq!((pixels.width, pixels.height), (4, 1));
        assert_eq!(pixels.bytes.len(), 4 * 4);
        let reds: Vec<u8> = pixels.bytes.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(reds, vec![0, 20, 40, 60]);
    }

    #[test]
    fn wide_panoramas_never_collapse_to_zero_rows() {
        let image = ImageData {
            width: 64,
            height: 1,
            format: ImageFormat::Rgba8Srgb,
            bytes: vec![255; 64 * 4],
        };
        let pixels = texture_pixels(&image, 16);
        assert_eq!((pixels.width, pixels.height), (16, 1));
    }

    #[test]
    fn image_identity_is_by_allocation() {
        let a = Arc::new(ImageData::solid([9; 4]));
        let twin = Arc::new(ImageData::solid([9; 4]));
        assert!(same_image(Some(&a), Some(&a.clone())));
        assert!(!same_image(Some(&a), Some(&twin)));
        assert!(!same_image(Some(&a), None));
        assert!(same_image(None, None));
    }

    #[test]
    fn vertices_fill_missing_attributes() {
        let mesh = MeshData {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: Vec::new(),
            indices: vec![0, 1, 0],
        };
        let vertices = mesh_vertices(&mesh);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[1].uv, [0.0, 0.0]);
    }
}
