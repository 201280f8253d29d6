use crate::game::mesh::SkinnedVertex;

impl SkinnedVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
        // position
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        // normal
        wgpu::VertexAttribute {
            offset: size_of::<[f32; 3]>() as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        // color
        wgpu::VertexAttribute {
            offset: size_of::<[f32; 6]>() as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x4,
        },
        // joints
        wgpu::VertexAttribute {
            offset: size_of::<[f32; 10]>() as wgpu::BufferAddress,
            shader_location: 3,
            format: wgpu::VertexFormat::Uint32x4,
        },
        // weights
        wgpu::VertexAttribute {
            offset: size_of::<[f32; 14]>() as wgpu::BufferAddress,
            shader_location: 4,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<SkinnedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_covers_the_whole_vertex() {
        let desc = SkinnedVertex::desc();
        assert_eq!(desc.array_stride, 72);
        let last = desc.attributes.last().unwrap();
        assert_eq!(last.offset + last.format.size(), desc.array_stride);
    }
}
