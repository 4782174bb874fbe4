//! Mesh data for decoded models, CPU-side and GPU-side.
//!
//! [`MeshData`] is the CPU representation handed over by the decoder: flat
//! triangle soup with per-vertex attributes plus the geometry-to-element
//! mapping (`face_ids`). It is kept around for the whole model lifetime since
//! raycasting and subset extraction read it. [`GpuMesh`] is the uploaded
//! counterpart used for drawing.

use wgpu::util::DeviceExt;

use crate::decode::DecodeError;

/// Vertex layout shared by the model and highlight pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl ModelVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Vertex layout for line helpers (grid and axes).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Triangle mesh produced by the decoder.
///
/// `indices` come in groups of three; `face_ids[t]` names the express ID that
/// owns triangle `t`. `normals` and `colors` are either empty (defaults are
/// substituted at upload) or exactly as long as `positions`.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub face_ids: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Express ID owning triangle `triangle`, if the mapping covers it.
    pub fn express_id_of(&self, triangle: usize) -> Option<u32> {
        self.face_ids.get(triangle).copied()
    }

    /// Index list (3 per triangle) of all triangles owned by `element_ids`,
    /// in mesh order. This is what subset rendering draws.
    pub fn subset_indices(&self, element_ids: &[u32]) -> Vec<u32> {
        let mut out = Vec::new();
        for (triangle, id) in self.face_ids.iter().enumerate() {
            if element_ids.contains(id) {
                let base = triangle * 3;
                out.extend_from_slice(&self.indices[base..base + 3]);
            }
        }
        out
    }

    /// Consistency checks the viewer relies on. Run once per decode so that a
    /// misbehaving decoder surfaces as a rejection instead of a panic later.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.indices.len() % 3 != 0 {
            return Err(DecodeError::Geometry(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if self.face_ids.len() != self.triangle_count() {
            return Err(DecodeError::Geometry(format!(
                "face id map covers {} triangles, mesh has {}",
                self.face_ids.len(),
                self.triangle_count()
            )));
        }
        if let Some(&max) = self.indices.iter().max() {
            if max as usize >= self.positions.len() {
                return Err(DecodeError::Geometry(format!(
                    "index {} out of range for {} vertices",
                    max,
                    self.positions.len()
                )));
            }
        }
        for (name, attr) in [("normals", &self.normals), ("colors", &self.colors)] {
            if !attr.is_empty() && attr.len() != self.positions.len() {
                return Err(DecodeError::Geometry(format!(
                    "{} count {} does not match {} vertices",
                    name,
                    attr.len(),
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }

    fn vertices(&self) -> Vec<ModelVertex> {
        const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];
        (0..self.positions.len())
            .map(|i| ModelVertex {
                position: self.positions[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                color: self.colors.get(i).copied().unwrap_or(DEFAULT_COLOR),
            })
            .collect()
    }
}

/// Uploaded mesh buffers for one loaded model.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, name: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(face_ids: [u32; 2]) -> MeshData {
        MeshData {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: Vec::new(),
            colors: Vec::new(),
            indices: vec![0, 1, 2, 0, 2, 3],
            face_ids: face_ids.to_vec(),
        }
    }

    #[test]
    fn subset_indices_filters_by_owner() {
        let mesh = quad([7, 9]);
        assert_eq!(mesh.subset_indices(&[7]), vec![0, 1, 2]);
        assert_eq!(mesh.subset_indices(&[9]), vec![0, 2, 3]);
        assert_eq!(mesh.subset_indices(&[7, 9]).len(), 6);
        assert!(mesh.subset_indices(&[1234]).is_empty());
    }

    #[test]
    fn validate_rejects_short_face_id_map() {
        let mut mesh = quad([7, 9]);
        mesh.face_ids.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut mesh = quad([7, 9]);
        mesh.indices[0] = 99;
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_mesh() {
        assert!(quad([7, 9]).validate().is_ok());
    }
}
