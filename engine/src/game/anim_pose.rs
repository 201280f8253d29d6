use glam::Mat4;

use super::{
    animation::{AnimationClip, TimeWrapMode},
    skeleton::{Skeleton, TRS},
};

/// One evaluated pose. Every vector holds exactly one entry per bone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    /// parent-relative transforms
    pub locals: Vec<TRS>,
    /// model-space bone transforms
    pub model: Vec<Mat4>,
    /// model * inverse bind, what the shader consumes
    pub skinning: Vec<Mat4>,
}

impl Pose {
    pub fn with_capacity(bone_count: usize) -> Self {
        Self {
            locals: Vec::with_capacity(bone_count),
            model: Vec::with_capacity(bone_count),
            skinning: Vec::with_capacity(bone_count),
        }
    }

    pub fn len(&self) -> usize {
        self.skinning.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skinning.is_empty()
    }
}

/// Writes the local transform of every bone. Bones the clip doesn't animate keep their rest transform.
fn compute_animated_locals(
    skeleton: &Skeleton,
    clip: Option<&AnimationClip>,
    time: f32,
    time_wrap: TimeWrapMode,
    locals: &mut Vec<TRS>,
) {
    locals.clear();
    locals.extend(skeleton.bones().iter().map(|bone| bone.rest));

    let Some(clip) = clip else {
        return;
    };
    let t = time_wrap.sample_time(time, clip.duration());
    for track in clip.tracks() {
        if let Some(local) = locals.get_mut(track.target) {
            *local = track.sample(t, *local);
        }
    }
}

/// Evaluates `clip` at `time` into `pose`, reusing its allocations.
/// `clip = None` yields the rest pose.
pub fn compute_pose_into(
    skeleton: &Skeleton,
    clip: Option<&AnimationClip>,
    time: f32,
    time_wrap: TimeWrapMode,
    pose: &mut Pose,
) {
    let bone_count = skeleton.bone_count();
    compute_animated_locals(skeleton, clip, time, time_wrap, &mut pose.locals);

    pose.model.clear();
    pose.model.resize(bone_count, Mat4::IDENTITY);
    for &idx in skeleton.evaluation_order() {
        let bone = &skeleton.bones()[idx];
        let local = bone.offset * pose.locals[idx].to_mat4();
        pose.model[idx] = match bone.parent {
            Some(parent) => pose.model[parent] * local,
            None => local,
        };
    }

    pose.skinning.clear();
    pose.skinning.extend(
        skeleton
            .bones()
            .iter()
            .zip(pose.model.iter())
            .map(|(bone, model)| *model * bone.inverse_bind_matrix),
    );
}

pub fn compute_pose(
    skeleton: &Skeleton,
    clip: Option<&AnimationClip>,
    time: f32,
    time_wrap: TimeWrapMode,
) -> Pose {
    let mut pose = Pose::with_capacity(skeleton.bone_count());
    compute_pose_into(skeleton, clip, time, time_wrap, &mut pose);
    pose
}

pub fn compute_bind_pose(skeleton: &Skeleton) -> Pose {
    compute_pose(skeleton, None, 0.0, TimeWrapMode::Repeat)
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::game::{
        animation::{Channel, Track},
        skeleton::Bone,
    };

    fn two_bone_skeleton() -> Skeleton {
        // child bone sits one unit above the root in bind pose
        Skeleton::new(vec![
            Bone::new("root", None, Mat4::IDENTITY),
            Bone::new("child", Some(0), Mat4::from_translation(-Vec3::Y)).with_rest(TRS {
                t: Vec3::Y,
                ..TRS::IDENTITY
            }),
        ])
        .unwrap()
    }

    #[test]
    fn rest_pose_cancels_inverse_bind() {
        let pose = compute_bind_pose(&two_bone_skeleton());
        assert_eq!(pose.len(), 2);
        for m in &pose.skinning {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn children_compose_with_parents() {
        let skeleton = two_bone_skeleton();
        let clip = AnimationClip::new(
            "lift",
            1.0,
            vec![Track::new(0).with_translation(Channel::linear(vec![0.0], vec![Vec3::X]).unwrap())],
        )
        .unwrap();
        let pose = compute_pose(&skeleton, Some(&clip), 0.0, TimeWrapMode::Repeat);
        assert!(pose.model[1].abs_diff_eq(Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0)), 1e-6));
        // the whole arm moves along +X
        assert!(pose.skinning[1].abs_diff_eq(Mat4::from_translation(Vec3::X), 1e-6));
    }

    #[test]
    fn hierarchy_out_of_array_order() {
        let skeleton = Skeleton::new(vec![
            Bone::new("leaf", Some(2), Mat4::IDENTITY).with_rest(TRS { t: Vec3::Z, ..TRS::IDENTITY }),
            Bone::new("root", None, Mat4::IDENTITY).with_rest(TRS { t: Vec3::X, ..TRS::IDENTITY }),
            Bone::new("mid", Some(1), Mat4::IDENTITY).with_rest(TRS { t: Vec3::Y, ..TRS::IDENTITY }),
        ])
        .unwrap();
        let pose = compute_bind_pose(&skeleton);
        assert!(pose.model[0].abs_diff_eq(Mat4::from_translation(Vec3::ONE), 1e-6));
    }

    #[test]
    fn offsets_sit_between_parent_and_local() {
        let root_offset = Mat4::from_scale(Vec3::splat(0.5));
        let child_offset = Mat4::from_translation(Vec3::Z);
        let skeleton = Skeleton::new(vec![
            Bone::new("root", None, Mat4::IDENTITY).with_offset(root_offset),
            Bone::new("child", Some(0), Mat4::IDENTITY)
                .with_rest(TRS { t: Vec3::Y, ..TRS::IDENTITY })
                .with_offset(child_offset),
        ])
        .unwrap();
        let pose = compute_bind_pose(&skeleton);
        assert!(pose.model[0].abs_diff_eq(root_offset, 1e-6));
        let expected = root_offset * child_offset * Mat4::from_translation(Vec3::Y);
        assert!(pose.model[1].abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn reused_pose_is_fully_overwritten() {
        let skeleton = two_bone_skeleton();
        let clip = AnimationClip::new(
            "spin",
            1.0,
            vec![Track::new(1).with_rotation(
                Channel::linear(vec![0.0, 1.0], vec![Quat::IDENTITY, Quat::from_rotation_x(1.0)]).unwrap(),
            )],
        )
        .unwrap();
        let mut pose = compute_pose(&skeleton, Some(&clip), 0.7, TimeWrapMode::Repeat);
        compute_pose_into(&skeleton, Some(&clip), 0.2, TimeWrapMode::Repeat, &mut pose);
        assert_eq!(pose, compute_pose(&skeleton, Some(&clip), 0.2, TimeWrapMode::Repeat));
    }
}
