use crate::error::{LoadError, SelectionError};

use super::{
    anim_pose::{compute_pose_into, Pose},
    animation::{AnimationClip, TimeWrapMode},
    mesh::MeshBuffers,
    skeleton::Skeleton,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// no clip selected, renders the rest pose
    Idle,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug)]
struct Playback {
    clip_idx: Option<usize>,
    /// seconds, kept within one period of `time_wrap`
    animation_time: f32,
    playing: bool,
    time_wrap: TimeWrapMode,
}

/// A skinned mesh, its skeleton and clips, and the playback state driving them.
pub struct AnimatedModel {
    skeleton: Skeleton,
    clips: Vec<AnimationClip>,
    mesh: MeshBuffers,
    playback: Playback,
}

impl AnimatedModel {
    /// Checks every clip and vertex against the skeleton. Nothing is kept on failure.
    pub fn new(skeleton: Skeleton, clips: Vec<AnimationClip>, mesh: MeshBuffers) -> Result<Self, LoadError> {
        let bone_count = skeleton.bone_count();
        for clip in &clips {
            if let Some(bone) = clip.max_target().filter(|&bone| bone >= bone_count) {
                return Err(LoadError::TrackTargetOutOfRange {
                    clip: clip.name().to_string(),
                    bone,
                    count: bone_count,
                });
            }
            let unanimated = bone_count - clip.tracks().len();
            if unanimated > 0 {
                log::warn!(
                    "clip '{}' leaves {} of {} bones at their rest transform",
                    clip.name(),
                    unanimated,
                    bone_count
                );
            }
        }
        mesh.validate(bone_count)?;

        Ok(Self {
            skeleton,
            clips,
            mesh,
            playback: Playback {
                clip_idx: None,
                animation_time: 0.0,
                playing: true,
                time_wrap: TimeWrapMode::default(),
            },
        })
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(AnimationClip::name)
    }

    pub fn find_clip(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|clip| clip.name() == name)
    }

    pub fn state(&self) -> PlaybackState {
        match (self.playback.clip_idx, self.playback.playing) {
            (None, _) => PlaybackState::Idle,
            (Some(_), true) => PlaybackState::Playing,
            (Some(_), false) => PlaybackState::Paused,
        }
    }

    pub fn current_clip(&self) -> Option<usize> {
        self.playback.clip_idx
    }

    pub fn current_clip_data(&self) -> Option<&AnimationClip> {
        self.playback.clip_idx.and_then(|idx| self.clips.get(idx))
    }

    pub fn elapsed(&self) -> f32 {
        self.playback.animation_time
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playback.playing = playing;
    }

    pub fn time_wrap(&self) -> TimeWrapMode {
        self.playback.time_wrap
    }

    pub fn set_time_wrap(&mut self, time_wrap: TimeWrapMode) {
        self.playback.time_wrap = time_wrap;
        if let Some(duration) = self.current_clip_data().map(AnimationClip::duration) {
            self.playback.animation_time = time_wrap.wrap(self.playback.animation_time, duration);
        }
    }

    /// Starts `idx` from the beginning. The play / pause flag is kept.
    pub fn select_clip(&mut self, idx: usize) -> Result<(), SelectionError> {
        if idx >= self.clips.len() {
            return Err(SelectionError::ClipOutOfRange {
                index: idx,
                count: self.clips.len(),
            });
        }
        self.playback.clip_idx = Some(idx);
        self.playback.animation_time = 0.0;
        Ok(())
    }

    /// Selects the clip after the current one, wrapping around. Idle selects the first clip.
    pub fn next_clip(&mut self) -> Result<usize, SelectionError> {
        if self.clips.is_empty() {
            return Err(SelectionError::NoClips);
        }
        let next = self
            .playback
            .clip_idx
            .map_or(0, |idx| (idx + 1) % self.clips.len());
        self.select_clip(next)?;
        Ok(next)
    }

    /// Startup selection. An out of range `initial_clip` falls back to the first clip,
    /// a model without clips stays idle.
    pub fn start(&mut self, initial_clip: usize, playing: bool, time_wrap: TimeWrapMode) {
        self.set_playing(playing);
        self.set_time_wrap(time_wrap);
        if self.clips.is_empty() {
            log::warn!("model has no animation clips, showing the rest pose");
            return;
        }
        if let Err(e) = self.select_clip(initial_clip) {
            log::warn!("{}, starting with clip 0 instead", e);
            // non-empty, so 0 is always valid
            let _ = self.select_clip(0);
        }
        if let Some(clip) = self.current_clip_data() {
            log::info!("playing clip {} '{}' ({:.2}s)", self.playback.clip_idx.unwrap_or(0), clip.name(), clip.duration());
        }
    }

    pub fn toggle_play(&mut self) {
        self.playback.playing = !self.playback.playing;
    }

    /// Moves playback forward by `dt` seconds. Does nothing unless playing.
    pub fn advance(&mut self, dt: f32) {
        if self.state() != PlaybackState::Playing {
            return;
        }
        let Some(duration) = self.current_clip_data().map(AnimationClip::duration) else {
            return;
        };
        let time_wrap = self.playback.time_wrap;
        self.playback.animation_time = time_wrap.wrap(self.playback.animation_time + dt, duration);
    }

    pub fn compute_pose_into(&self, pose: &mut Pose) {
        compute_pose_into(
            &self.skeleton,
            self.current_clip_data(),
            self.playback.animation_time,
            self.playback.time_wrap,
            pose,
        );
    }

    pub fn compute_pose(&self) -> Pose {
        let mut pose = Pose::with_capacity(self.skeleton.bone_count());
        self.compute_pose_into(&mut pose);
        pose
    }
}
