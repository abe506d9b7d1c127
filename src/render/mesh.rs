use super::RenderError;
use crate::assets::{MeshData, Vertex};
use glam::Vec3;
use glow::HasContext;
use std::f32::consts::TAU;

const STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;

/// Mesh resident in GL buffers. Must be released with [`GpuMesh::destroy`]
/// while the owning context is current.
pub struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: i32,
    mode: u32,
}

impl GpuMesh {
    /// # Safety
    /// Requires the GL context to be current on this thread.
    pub unsafe fn upload(gl: &glow::Context, mesh: &MeshData, mode: u32) -> Result<Self, RenderError> {
        let vao = gl.create_vertex_array().map_err(RenderError::Resource)?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().map_err(RenderError::Resource)?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&mesh.vertices),
            glow::STATIC_DRAW,
        );

        let float = std::mem::size_of::<f32>() as i32;
        for (location, offset) in [(0u32, 0), (1, 3 * float), (2, 6 * float)] {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_f32(location, 3, glow::FLOAT, false, STRIDE, offset);
        }

        let ebo = gl.create_buffer().map_err(RenderError::Resource)?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&mesh.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);
        Ok(Self {
            vao,
            vbo,
            ebo,
            index_count: mesh.indices.len() as i32,
            mode,
        })
    }

    /// # Safety
    /// Requires the GL context to be current and a program bound.
    pub unsafe fn draw(&self, gl: &glow::Context) {
        gl.bind_vertex_array(Some(self.vao));
        gl.draw_elements(self.mode, self.index_count, glow::UNSIGNED_INT, 0);
        gl.bind_vertex_array(None);
    }

    /// # Safety
    /// Requires the GL context that created the mesh to be current.
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
        gl.delete_buffer(self.ebo);
    }
}

/// The 12 edges of a cube of side `size` centred on the origin, as line pairs.
pub fn wire_cube(size: f32, color: Vec3) -> MeshData {
    let h = size * 0.5;
    let vertices = (0..8)
        .map(|corner| {
            let pick = |bit: u32| if corner & bit != 0 { h } else { -h };
            let position = Vec3::new(pick(1), pick(2), pick(4));
            Vertex {
                position: position.to_array(),
                normal: position.normalize_or_zero().to_array(),
                color: color.to_array(),
            }
        })
        .collect();
    #[rustfmt::skip]
    let indices = vec![
        0, 1,  2, 3,  4, 5,  6, 7,
        0, 2,  1, 3,  4, 6,  5, 7,
        0, 4,  1, 5,  2, 6,  3, 7,
    ];
    MeshData { vertices, indices }
}

/// Flat disc in the XZ plane facing +Y. The vertex colour's red channel
/// carries the normalised distance from the centre for radial falloff.
pub fn disc(radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut vertices = vec![Vertex {
        position: [0.0; 3],
        normal: [0.0, 1.0, 0.0],
        color: [0.0; 3],
    }];
    vertices.extend((0..segments).map(|i| {
        let angle = i as f32 / segments as f32 * TAU;
        Vertex {
            position: [angle.cos() * radius, 0.0, angle.sin() * radius],
            normal: [0.0, 1.0, 0.0],
            color: [1.0, 0.0, 0.0],
        }
    }));
    let indices = (0..segments)
        .flat_map(|i| [0, 1 + (i + 1) % segments, 1 + i])
        .collect();
    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_cube_has_twelve_unit_edges() {
        let cube = wire_cube(1.5, Vec3::ONE);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.indices.len(), 24);
        for edge in cube.indices.chunks_exact(2) {
            let a = Vec3::from(cube.vertices[edge[0] as usize].position);
            let b = Vec3::from(cube.vertices[edge[1] as usize].position);
            assert!(((a - b).length() - 1.5).abs() < 1e-6);
        }
    }

    #[test]
    fn disc_triangles_face_up() {
        let disc = disc(6.0, 32);
        assert_eq!(disc.indices.len(), 32 * 3);
        for triangle in disc.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                .map(|i| Vec3::from(disc.vertices[i as usize].position));
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }
}
