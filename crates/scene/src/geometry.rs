use shaderbox_common::MeshData;
use std::sync::Arc;

/// Shape of a mesh object. Procedural variants are tessellated on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    /// Flat grid in the XZ plane, facing +Y.
    Plane { width: f32, depth: f32, segments: u32 },
    Mesh(Arc<MeshData>),
}

impl Geometry {
    pub fn cube(size: f32) -> Self {
        Self::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    pub fn tessellate(&self) -> MeshData {
        match self {
            Self::Box {
                width,
                height,
                depth,
            } => box_mesh(*width, *height, *depth),
            Self::Plane {
                width,
                depth,
                segments,
            } => plane_mesh(*width, *depth, (*segments).max(1)),
            Self::Mesh(data) => data.as_ref().clone(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Plane { .. } => "plane",
            Self::Mesh(_) => "mesh",
        }
    }
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    // (normal, four corners counter-clockwise seen from outside)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([0.0, 0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
        ([1.0, 0.0, 0.0],  [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
        ([0.0, 1.0, 0.0],  [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
    ];
    let corner_uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.positions.len() as u32;
        for (corner, uv) in corners.iter().zip(corner_uvs) {
            mesh.positions.push(*corner);
            mesh.normals.push(normal);
            mesh.uvs.push(uv);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

fn plane_mesh(width: f32, depth: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = segments + 1;
    for iz in 0..=segments {
        for ix in 0..=segments {
            let u = ix as f32 / segments as f32;
            let v = iz as f32 / segments as f32;
            mesh.positions
                .push([(u - 0.5) * width, 0.0, (v - 0.5) * depth]);
            mesh.normals.push([0.0, 1.0, 0.0]);
            mesh.uvs.push([u, v]);
        }
    }
    for iz in 0..segments {
        for ix in 0..segments {
            let a = iz * row + ix;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_24_vertices_and_12_triangles() {
        let mesh = Geometry::cube(3.0).tessellate();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.is_valid());
        assert!(mesh.positions.iter().all(|p| p.iter().all(|c| c.abs() == 1.5)));
    }

    #[test]
    fn plane_grid_counts() {
        let mesh = Geometry::Plane {
            width: 4.0,
            depth: 4.0,
            segments: 8,
        }
        .tessellate();
        assert_eq!(mesh.vertex_count(), 81);
        assert_eq!(mesh.triangle_count(), 128);
        assert!(mesh.is_valid());
    }

    #[test]
    fn degenerate_segment_counts_are_raised() {
        let mesh = Geometry::Plane {
            width: 1.0,
            depth: 1.0,
            segments: 0,
        }
        .tessellate();
        assert_eq!(mesh.triangle_count(), 2);
    }
}
