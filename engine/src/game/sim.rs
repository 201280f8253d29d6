use std::collections::VecDeque;

use glam::Mat4;

use super::{anim_pose::Pose, animator::AnimatedModel};

/// External requests, queued by the window and applied at the start of the next update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    NextClip,
    TogglePlayback,
    SelectClip(usize),
    Close,
}

/// Per-frame context: the model, pending commands and the latest pose.
pub struct Sim {
    model: AnimatedModel,
    inputs: VecDeque<Command>,
    pose: Pose,
    close_requested: bool,
}

impl Sim {
    pub fn new(model: AnimatedModel) -> Self {
        let mut pose = Pose::with_capacity(model.skeleton().bone_count());
        model.compute_pose_into(&mut pose);
        Self {
            model,
            inputs: VecDeque::new(),
            pose,
            close_requested: false,
        }
    }

    pub fn model(&self) -> &AnimatedModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut AnimatedModel {
        &mut self.model
    }

    pub fn push(&mut self, command: Command) {
        self.inputs.push_back(command);
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Last pose produced by [`Sim::update`].
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Applies queued commands in order without advancing time.
    pub fn apply_pending(&mut self) {
        while let Some(command) = self.inputs.pop_front() {
            self.apply(command);
        }
    }

    /// Applies queued commands in order, advances playback, then recomputes the pose.
    /// Returns the skinning matrices for this frame.
    pub fn update(&mut self, dt: f32) -> &[Mat4] {
        self.apply_pending();
        self.model.advance(dt);
        self.model.compute_pose_into(&mut self.pose);
        &self.pose.skinning
    }

    fn apply(&mut self, command: Command) {
        log::debug!("applying {:?}", command);
        match command {
            Command::NextClip => match self.model.next_clip() {
                Ok(idx) => log::info!(
                    "playing clip {} '{}'",
                    idx,
                    self.model.clips()[idx].name()
                ),
                Err(e) => log::warn!("{}", e),
            },
            Command::SelectClip(idx) => {
                if let Err(e) = self.model.select_clip(idx) {
                    log::warn!("{}", e);
                }
            }
            Command::TogglePlayback => self.model.toggle_play(),
            Command::Close => self.close_requested = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::game::{
        animation::{AnimationClip, Channel, Track},
        animator::PlaybackState,
        mesh::MeshBuffers,
        skeleton::{Bone, Skeleton},
    };

    fn sim() -> Sim {
        let skeleton = Skeleton::new(vec![Bone::new("root", None, Mat4::IDENTITY)]).unwrap();
        let clips = ["idle", "walk"]
            .into_iter()
            .map(|name| {
                let track = Track::new(0)
                    .with_translation(Channel::linear(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::Y]).unwrap());
                AnimationClip::new(name, 1.0, vec![track]).unwrap()
            })
            .collect();
        Sim::new(AnimatedModel::new(skeleton, clips, MeshBuffers::default()).unwrap())
    }

    #[test]
    fn commands_apply_before_advance() {
        let mut sim = sim();
        sim.push(Command::NextClip);
        let matrices = sim.update(0.5).to_vec();
        assert_eq!(sim.model().current_clip(), Some(0));
        assert!(matrices[0].abs_diff_eq(Mat4::from_translation(Vec3::Y * 0.5), 1e-6));
    }

    #[test]
    fn commands_apply_in_order() {
        let mut sim = sim();
        sim.push(Command::SelectClip(1));
        sim.push(Command::TogglePlayback);
        sim.push(Command::NextClip);
        sim.update(0.25);
        assert_eq!(sim.model().current_clip(), Some(0));
        assert_eq!(sim.model().state(), PlaybackState::Paused);
        assert_eq!(sim.model().elapsed(), 0.0);
    }

    #[test]
    fn bad_selection_does_not_stop_the_frame() {
        let mut sim = sim();
        sim.push(Command::SelectClip(0));
        sim.update(0.25);
        sim.push(Command::SelectClip(9));
        let len = sim.update(0.25).len();
        assert_eq!(len, 1);
        assert_eq!(sim.model().current_clip(), Some(0));
        assert_eq!(sim.model().elapsed(), 0.5);
    }

    #[test]
    fn pending_commands_apply_without_time() {
        let mut sim = sim();
        sim.push(Command::NextClip);
        sim.push(Command::Close);
        sim.apply_pending();
        assert!(sim.close_requested());
        assert_eq!(sim.model().current_clip(), Some(0));
        assert_eq!(sim.model().elapsed(), 0.0);
    }

    #[test]
    fn close_is_reported() {
        let mut sim = sim();
        assert!(!sim.close_requested());
        sim.push(Command::Close);
        sim.update(0.0);
        assert!(sim.close_requested());
    }
}
