use glam::{Mat4, Vec3};
use shaderbox_common::{ImageData, ImageFormat, MeshData};
use std::path::Path;
use std::sync::Arc;

use crate::asset::{ModelData, ModelLight, ModelMesh};
use crate::error::AssetError;

/// Decode an 8-bit texture (PNG, JPEG, ...) to sRGB RGBA.
pub fn decode_texture(bytes: &[u8]) -> Result<ImageData, AssetError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Rgba8Srgb,
        bytes: rgba.into_raw(),
    })
}

/// Decode an environment map (Radiance HDR, EXR, or any 8-bit format) to
/// float RGBA.
pub fn decode_environment(bytes: &[u8]) -> Result<ImageData, AssetError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba32f();
    let (width, height) = rgba.dimensions();
    let bytes = rgba
        .into_raw()
        .into_iter()
        .flat_map(f32::to_le_bytes)
        .collect();
    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Rgba32Float,
        bytes,
    })
}

/// Decode a self-contained model (`.glb` or `.gltf` with embedded buffers).
pub fn decode_model(bytes: &[u8]) -> Result<ModelData, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    build_model(&document, &buffers)
}

/// Import a model from disk, resolving external buffers next to it.
pub(crate) fn import_model(path: &Path) -> Result<ModelData, AssetError> {
    let (document, buffers, _images) = gltf::import(path)?;
    build_model(&document, &buffers)
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<ModelData, AssetError> {
    let mut model = ModelData::default();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::Unsupported("glTF file has no scene".into()))?;

    for node in scene.nodes() {
        visit_node(&node, buffers, Mat4::IDENTITY, &mut model)?;
    }

    tracing::debug!(
        meshes = model.meshes.len(),
        lights = model.lights.len(),
        "decoded model"
    );
    Ok(model)
}

fn visit_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    model: &mut ModelData,
) -> Result<(), AssetError> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global = parent * local;

    if let Some(mesh) = node.mesh() {
        read_mesh(&mesh, buffers, global, model)?;
    }

    if let Some(light) = node.light() {
        if matches!(light.kind(), gltf::khr_lights_punctual::Kind::Point) {
            let id = node
                .name()
                .or(light.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("light_{}", light.index()));
            model.lights.push(ModelLight {
                id,
                position: global.transform_point3(Vec3::ZERO),
                color: light.color(),
                intensity: light.intensity(),
                range: light.range(),
            });
        } else {
            tracing::debug!(node = node.index(), "skipping non-point light");
        }
    }

    for child in node.children() {
        visit_node(&child, buffers, global, model)?;
    }
    Ok(())
}

fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
    model: &mut ModelData,
) -> Result<(), AssetError> {
    let base = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
    let primitive_count = mesh.primitives().count();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::Unsupported(format!("{base}: primitive without positions")))?
            .collect();
        let n = positions.len();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|it| it.collect())
            .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; n]);
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|it| it.into_f32().collect())
            .unwrap_or_else(|| vec![[0.0, 0.0]; n]);
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|it| it.into_u32().collect())
            .unwrap_or_else(|| (0..n as u32).collect());

        let data = MeshData {
            positions,
            normals,
            uvs,
            indices,
        };
        if !data.is_valid() {
            return Err(AssetError::Unsupported(format!(
                "{base}: inconsistent vertex attributes"
            )));
        }

        let id = if primitive_count > 1 {
            format!("{base}#{}", primitive.index())
        } else {
            base.clone()
        };
        model.meshes.push(ModelMesh {
            id,
            mesh: Arc::new(data),
            transform,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn texture_decodes_to_rgba8() {
        let img = decode_texture(&png_bytes(3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.format, ImageFormat::Rgba8Srgb);
        assert!(img.is_valid());
        assert_eq!(&img.bytes[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn environment_decodes_to_float() {
        let img = decode_environment(&png_bytes(2, 2)).unwrap();
        assert_eq!(img.format, ImageFormat::Rgba32Float);
        assert!(img.is_valid());
        let alpha = f32::from_le_bytes(img.bytes[12..16].try_into().unwrap());
        assert_eq!(alpha, 1.0);
    }

    #[test]
    fn garbage_texture_is_a_decode_error() {
        let err = decode_texture(b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }

    #[test]
    fn garbage_model_is_a_gltf_error() {
        let err = decode_model(b"{ not json").unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }
}
