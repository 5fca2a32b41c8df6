/// CPU-side triangle mesh, as produced by a model decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Attribute arrays agree in length and every index points at a vertex.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n
            && self.uvs.len() == n
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
    }
}

/// Pixel layout of an [`ImageData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// 8-bit sRGB with alpha (textures).
    Rgba8Srgb,
    /// 32-bit float RGBA (HDR environment maps).
    Rgba32Float,
}

impl ImageFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8Srgb => 4,
            Self::Rgba32Float => 16,
        }
    }
}

/// Decoded image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// 1x1 opaque image, used while the real texture is still loading.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            format: ImageFormat::Rgba8Srgb,
            bytes: rgba.to_vec(),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.format.bytes_per_pixel() as u32
    }

    /// Non-empty, with exactly one texel's worth of bytes per pixel.
    pub fn is_valid(&self) -> bool {
        let expected = self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64;
        expected > 0 && self.bytes.len() as u64 == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_validation_catches_out_of_range_index() {
        let mut mesh = MeshData {
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 2],
        };
        assert!(mesh.is_valid());
        assert_eq!(mesh.triangle_count(), 1);

        mesh.indices = vec![0, 1, 3];
        assert!(!mesh.is_valid());
    }

    #[test]
    fn solid_image_is_one_pixel() {
        let img = ImageData::solid([255, 255, 255, 255]);
        assert!(img.is_valid());
        assert_eq!(img.bytes_per_row(), 4);
    }

    #[test]
    fn hdr_rows_are_sixteen_bytes_per_pixel() {
        let img = ImageData {
            width: 2,
            height: 1,
            format: ImageFormat::Rgba32Float,
            bytes: vec![0; 32],
        };
        assert!(img.is_valid());
    }

    #[test]
    fn empty_image_is_invalid() {
        let img = ImageData {
            width: 0,
            height: 0,
            format: ImageFormat::Rgba8Srgb,
            bytes: Vec::new(),
        };
        assert!(!img.is_valid());
    }
}
