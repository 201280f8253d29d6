use crate::error::LoadError;

/// Influences per vertex.
pub const MAX_BONE_INFLUENCE: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub joints: [u32; MAX_BONE_INFLUENCE],
    pub weights: [f32; MAX_BONE_INFLUENCE],
}

impl Default for SkinnedVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0, 1.0, 0.0],
            color: [1.0; 4],
            joints: [0; MAX_BONE_INFLUENCE],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Scales weights to sum to one. A vertex without any weight is bound fully to its first joint.
pub fn normalize_weights(weights: [f32; MAX_BONE_INFLUENCE]) -> [f32; MAX_BONE_INFLUENCE] {
    let sum: f32 = weights.iter().sum();
    if sum <= f32::EPSILON {
        return [1.0, 0.0, 0.0, 0.0];
    }
    weights.map(|w| w / sum)
}

/// Triangle-list geometry for the whole skinned model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends another primitive, rebasing its indices.
    pub fn append(&mut self, vertices: Vec<SkinnedVertex>, indices: impl IntoIterator<Item = u32>) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        self.indices.extend(indices.into_iter().map(|i| i + base));
    }

    /// Every weighted joint reference must name a bone of the skeleton.
    pub fn validate(&self, bone_count: usize) -> Result<(), LoadError> {
        for (vertex, v) in self.vertices.iter().enumerate() {
            for (joint, weight) in v.joints.iter().zip(v.weights.iter()) {
                if *weight > 0.0 && *joint as usize >= bone_count {
                    return Err(LoadError::JointIndexOutOfRange {
                        vertex,
                        bone: *joint,
                        count: bone_count,
                    });
                }
            }
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(LoadError::Unsupported(format!(
                "index {} out of range for {} vertices",
                index,
                self.vertices.len()
            )));
        }
        Ok(())
    }
}
