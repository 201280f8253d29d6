use glam::{Mat4, Quat, Vec3};

use crate::error::LoadError;

/// Local bone transform in translation / rotation / scale form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TRS {
    pub t: Vec3,
    pub r: Quat,
    pub s: Vec3,
}

impl TRS {
    pub const IDENTITY: Self = Self {
        t: Vec3::ZERO,
        r: Quat::IDENTITY,
        s: Vec3::ONE,
    };

    /// translation * rotation * scale
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.s, self.r, self.t)
    }
}

impl Default for TRS {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub name: Option<String>,
    /// None for roots
    pub parent: Option<usize>,
    /// Maps model-space bind pose into bone-local space.
    pub inverse_bind_matrix: Mat4,
    /// Bind-local transform, used for channels a clip doesn't animate.
    pub rest: TRS,
    /// Static transform of non-bone nodes between this bone and its parent bone
    /// (or the scene root). Identity for most skeletons.
    pub offset: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>, inverse_bind_matrix: Mat4) -> Self {
        Self {
            name: Some(name.into()),
            parent,
            inverse_bind_matrix,
            rest: TRS::IDENTITY,
            offset: Mat4::IDENTITY,
        }
    }

    pub fn with_rest(mut self, rest: TRS) -> Self {
        self.rest = rest;
        self
    }

    pub fn with_offset(mut self, offset: Mat4) -> Self {
        self.offset = offset;
        self
    }
}

/// Flat bone arena. Parents are indices into the same list and may appear
/// after their children; [`Skeleton::evaluation_order`] resolves that.
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    depths: Vec<u32>,
    /// parents always precede children
    order: Vec<usize>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Result<Self, LoadError> {
        let count = bones.len();
        for (bone, b) in bones.iter().enumerate() {
            if let Some(parent) = b.parent {
                if parent >= count {
                    return Err(LoadError::ParentOutOfRange { bone, parent, count });
                }
            }
        }

        let depths = (0..count)
            .map(|bone| depth_of(&bones, bone))
            .collect::<Result<Vec<_>, _>>()?;

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&idx| depths[idx]);

        Ok(Self { bones, depths, order })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, idx: usize) -> Option<&Bone> {
        self.bones.get(idx)
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.bones.get(idx).and_then(|b| b.parent)
    }

    pub fn inverse_bind_matrix(&self, idx: usize) -> Option<Mat4> {
        self.bones.get(idx).map(|b| b.inverse_bind_matrix)
    }

    /// Number of parent links between the bone and its root.
    pub fn depth(&self, idx: usize) -> Option<u32> {
        self.depths.get(idx).copied()
    }

    pub fn evaluation_order(&self) -> &[usize] {
        &self.order
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter_map(|(idx, b)| b.parent.is_none().then_some(idx))
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones
            .iter()
            .position(|b| b.name.as_deref() == Some(name))
    }
}

fn depth_of(bones: &[Bone], bone: usize) -> Result<u32, LoadError> {
    let mut depth = 0u32;
    let mut cur = bone;
    while let Some(parent) = bones[cur].parent {
        depth += 1;
        if depth as usize > bones.len() {
            return Err(LoadError::CyclicHierarchy { bone });
        }
        cur = parent;
    }
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(parent: Option<usize>) -> Bone {
        Bone::new("b", parent, Mat4::IDENTITY)
    }

    #[test]
    fn parents_are_ordered_before_children() {
        // 0 <- 2 <- 1, stored out of hierarchy order
        let skeleton = Skeleton::new(vec![bone(None), bone(Some(2)), bone(Some(0))]).unwrap();
        let order = skeleton.evaluation_order();
        let pos = |idx: usize| order.iter().position(|&o| o == idx).unwrap();
        assert!(pos(0) < pos(2));
        assert!(pos(2) < pos(1));
        assert_eq!(skeleton.depth(1), Some(2));
    }

    #[test]
    fn rejects_parent_out_of_range() {
        let err = Skeleton::new(vec![bone(None), bone(Some(5))]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ParentOutOfRange { bone: 1, parent: 5, count: 2 }
        ));
    }

    #[test]
    fn rejects_cycles() {
        let err = Skeleton::new(vec![bone(Some(1)), bone(Some(0))]).unwrap_err();
        assert!(matches!(err, LoadError::CyclicHierarchy { .. }));

        let err = Skeleton::new(vec![bone(None), bone(Some(1))]).unwrap_err();
        assert!(matches!(err, LoadError::CyclicHierarchy { bone: 1 }));
    }

    #[test]
    fn lookups() {
        let skeleton = Skeleton::new(vec![
            Bone::new("hips", None, Mat4::IDENTITY),
            Bone::new("spine", Some(0), Mat4::from_translation(Vec3::Y)),
        ])
        .unwrap();
        assert_eq!(skeleton.find_bone("spine"), Some(1));
        assert_eq!(skeleton.find_bone("head"), None);
        assert_eq!(skeleton.parent(1), Some(0));
        assert_eq!(skeleton.parent(0), None);
        assert_eq!(skeleton.inverse_bind_matrix(1), Some(Mat4::from_translation(Vec3::Y)));
        assert_eq!(skeleton.roots().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn trs_matches_matrix_composition() {
        let trs = TRS {
            t: Vec3::new(1.0, 2.0, 3.0),
            r: Quat::from_rotation_z(0.3),
            s: Vec3::splat(2.0),
        };
        let expected = Mat4::from_translation(trs.t) * Mat4::from_quat(trs.r) * Mat4::from_scale(trs.s);
        assert!(trs.to_mat4().abs_diff_eq(expected, 1e-6));
    }
}
