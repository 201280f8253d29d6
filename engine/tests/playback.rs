use engine::{
    error::SelectionError,
    game::{
        anim_pose::compute_pose,
        animation::{AnimationClip, Channel, TimeWrapMode, Track},
        animator::{AnimatedModel, PlaybackState},
        mesh::MeshBuffers,
        skeleton::{Bone, Skeleton, TRS},
        sim::{Command, Sim},
    },
};
use glam::{Mat4, Quat, Vec3};
use pretty_assertions::assert_eq;

fn arm() -> Skeleton {
    Skeleton::new(vec![
        Bone::new("root", None, Mat4::IDENTITY),
        Bone::new("forearm", Some(0), Mat4::from_translation(-Vec3::Y)).with_rest(TRS {
            t: Vec3::Y,
            ..TRS::IDENTITY
        }),
    ])
    .unwrap()
}

fn bend() -> AnimationClip {
    let rotation = Channel::linear(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_z(90f32.to_radians())],
    )
    .unwrap();
    AnimationClip::new("bend", 1.0, vec![Track::new(1).with_rotation(rotation)]).unwrap()
}

#[test]
fn child_bends_halfway_at_half_time() {
    let pose = compute_pose(&arm(), Some(&bend()), 0.5, TimeWrapMode::Repeat);
    let expected = Quat::from_rotation_z(45f32.to_radians());
    assert!(pose.locals[1].r.abs_diff_eq(expected, 1e-5));
    assert!(pose.locals[0].r.abs_diff_eq(Quat::IDENTITY, 1e-6));
}

#[test]
fn looping_repeats_the_pose() {
    let skeleton = arm();
    let clip = bend();
    let first = compute_pose(&skeleton, Some(&clip), 0.5, TimeWrapMode::Repeat);
    let second = compute_pose(&skeleton, Some(&clip), 1.5, TimeWrapMode::Repeat);
    for (a, b) in first.skinning.iter().zip(second.skinning.iter()) {
        assert!(a.abs_diff_eq(*b, 1e-5));
    }
}

#[test]
fn pose_length_matches_bones_at_every_time() {
    let skeleton = arm();
    let clip = bend();
    for t in [0.0, clip.duration(), 3.7] {
        for wrap in [TimeWrapMode::Clamp, TimeWrapMode::Repeat, TimeWrapMode::PingPong] {
            let pose = compute_pose(&skeleton, Some(&clip), t, wrap);
            assert_eq!(pose.len(), skeleton.bone_count());
            assert_eq!(pose.model.len(), skeleton.bone_count());
            assert_eq!(pose.locals.len(), skeleton.bone_count());
        }
    }
}

#[test]
fn single_clip_selection() {
    let mut model = AnimatedModel::new(arm(), vec![bend()], MeshBuffers::default()).unwrap();
    model.select_clip(0).unwrap();
    model.advance(0.4);

    assert_eq!(
        model.select_clip(1),
        Err(SelectionError::ClipOutOfRange { index: 1, count: 1 })
    );
    assert_eq!(model.current_clip(), Some(0));
    assert!((model.elapsed() - 0.4).abs() < 1e-6);

    model.select_clip(0).unwrap();
    assert_eq!(model.elapsed(), 0.0);
}

#[test]
fn missing_rotation_track_is_identity() {
    let translation = Channel::linear(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]).unwrap();
    let scale = Channel::linear(vec![0.0, 1.0], vec![Vec3::ONE, Vec3::splat(3.0)]).unwrap();
    let clip = AnimationClip::new(
        "slide",
        1.0,
        vec![Track::new(0).with_translation(translation).with_scale(scale)],
    )
    .unwrap();
    let pose = compute_pose(&arm(), Some(&clip), 0.5, TimeWrapMode::Repeat);

    let local = pose.locals[0].to_mat4();
    let expected = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
    assert!(local.abs_diff_eq(expected, 1e-6));
    assert_eq!(pose.locals[0].r, Quat::IDENTITY);
}

#[test]
fn ping_pong_plays_backwards() {
    let skeleton = arm();
    let clip = bend();
    let forward = compute_pose(&skeleton, Some(&clip), 0.25, TimeWrapMode::PingPong);
    let backward = compute_pose(&skeleton, Some(&clip), 1.75, TimeWrapMode::PingPong);
    assert!(forward.locals[1].r.abs_diff_eq(backward.locals[1].r, 1e-5));
}

#[test]
fn clamp_holds_last_pose() {
    let pose = compute_pose(&arm(), Some(&bend()), 5.0, TimeWrapMode::Clamp);
    assert!(pose.locals[1].r.abs_diff_eq(Quat::from_rotation_z(90f32.to_radians()), 1e-5));
}

#[test]
fn frame_loop_through_commands() {
    let second = AnimationClip::new("rest", 2.0, vec![]).unwrap();
    let model = AnimatedModel::new(arm(), vec![bend(), second], MeshBuffers::default()).unwrap();
    let mut sim = Sim::new(model);
    assert_eq!(sim.model().state(), PlaybackState::Idle);

    sim.push(Command::NextClip);
    sim.update(0.5);
    assert_eq!(sim.model().current_clip(), Some(0));
    assert!(sim.pose().locals[1].r.abs_diff_eq(Quat::from_rotation_z(45f32.to_radians()), 1e-5));

    sim.push(Command::TogglePlayback);
    sim.update(0.3);
    assert_eq!(sim.model().state(), PlaybackState::Paused);
    assert_eq!(sim.model().elapsed(), 0.5);

    sim.push(Command::NextClip);
    sim.push(Command::TogglePlayback);
    let matrices = sim.update(0.5).len();
    assert_eq!(matrices, 2);
    assert_eq!(sim.model().current_clip(), Some(1));
    assert_eq!(sim.model().elapsed(), 0.5);
}
