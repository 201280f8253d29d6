use std::cmp::Ordering;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

use super::{skeleton::TRS, utils::QuatExt as _};

/// What happens when animation time leaves [0, duration)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeWrapMode {
    Clamp,
    #[default]
    Repeat,
    PingPong,
}

impl TimeWrapMode {
    /// Folds an accumulated playback time back into one period of the mode.
    pub fn wrap(self, time: f32, duration: f32) -> f32 {
        if duration <= f32::EPSILON {
            return 0.0;
        }
        match self {
            TimeWrapMode::Clamp => time.clamp(0.0, duration),
            TimeWrapMode::Repeat => time.rem_euclid(duration),
            TimeWrapMode::PingPong => time.rem_euclid(duration * 2.0),
        }
    }

    /// Maps a playback time onto the clip's timeline.
    pub fn sample_time(self, time: f32, duration: f32) -> f32 {
        if duration <= f32::EPSILON {
            return 0.0;
        }
        match self {
            TimeWrapMode::Clamp => time.clamp(0.0, duration),
            TimeWrapMode::Repeat => time.rem_euclid(duration),
            TimeWrapMode::PingPong => {
                let period = duration * 2.0;
                let t2 = time.rem_euclid(period);
                if t2 <= duration { t2 } else { period - t2 }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    /// values are stored as (in tangent, value, out tangent) triplets
    CubicSpline,
}

/// Values that can live in a keyframe channel.
pub trait KeyValue: Copy {
    fn interpolate(a: Self, b: Self, alpha: f32) -> Self;
    fn hermite(v0: Self, out0: Self, v1: Self, in1: Self, dt: f32, alpha: f32) -> Self;
}

fn hermite_weights(s: f32) -> (f32, f32, f32, f32) {
    let s2 = s * s;
    let s3 = s2 * s;
    (
        2.0 * s3 - 3.0 * s2 + 1.0,
        s3 - 2.0 * s2 + s,
        -2.0 * s3 + 3.0 * s2,
        s3 - s2,
    )
}

impl KeyValue for Vec3 {
    fn interpolate(a: Self, b: Self, alpha: f32) -> Self {
        a.lerp(b, alpha)
    }

    fn hermite(v0: Self, out0: Self, v1: Self, in1: Self, dt: f32, alpha: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_weights(alpha);
        v0 * h00 + out0 * (h10 * dt) + v1 * h01 + in1 * (h11 * dt)
    }
}

impl KeyValue for Quat {
    fn interpolate(a: Self, b: Self, alpha: f32) -> Self {
        a.slerp_shortest(b, alpha)
    }

    fn hermite(v0: Self, out0: Self, v1: Self, in1: Self, dt: f32, alpha: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_weights(alpha);
        (v0 * h00 + out0 * (h10 * dt) + v1 * h01 + in1 * (h11 * dt)).normalize()
    }
}

/// Finds the keyframes bracketing `t`. Equal indices mean no blending.
pub fn bin_search_anim_indices(times: &[f32], t: f32) -> (usize, usize) {
    let n = times.len();
    if n <= 1 {
        return (0, 0);
    }

    match times.binary_search_by(|x| x.partial_cmp(&t).unwrap_or(Ordering::Greater)) {
        Ok(i) => (i, i),
        Err(0) => (0, 0),
        Err(i) if i >= n => (n - 1, n - 1),
        Err(i) => (i - 1, i),
    }
}

/// Keyframes for one property of one bone.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel<T> {
    times: Box<[f32]>,
    values: Box<[T]>,
    interpolation: Interpolation,
}

impl<T: KeyValue> Channel<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Result<Self, LoadError> {
        if times.is_empty() {
            return Err(LoadError::EmptyTrack);
        }
        let expected = match interpolation {
            Interpolation::CubicSpline => times.len() * 3,
            _ => times.len(),
        };
        if values.len() != expected {
            return Err(LoadError::KeyframeCountMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(LoadError::NonIncreasingTimestamps { index });
        }
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(LoadError::NonIncreasingTimestamps { index: index + 1 });
        }
        Ok(Self {
            times: times.into_boxed_slice(),
            values: values.into_boxed_slice(),
            interpolation,
        })
    }

    pub fn linear(times: Vec<f32>, values: Vec<T>) -> Result<Self, LoadError> {
        Self::new(times, values, Interpolation::Linear)
    }

    pub fn last_time(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    fn value(&self, idx: usize) -> T {
        match self.interpolation {
            Interpolation::CubicSpline => self.values[idx * 3 + 1],
            _ => self.values[idx],
        }
    }

    /// Samples the channel, clamping to the first / last keyframe outside its range.
    pub fn sample(&self, t: f32) -> T {
        let (i0, i1) = bin_search_anim_indices(&self.times, t);
        let (t0, t1) = (self.times[i0], self.times[i1]);
        if i0 == i1 || (t1 - t0).abs() < f32::EPSILON {
            return self.value(i0);
        }
        let alpha = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        match self.interpolation {
            Interpolation::Linear => T::interpolate(self.value(i0), self.value(i1), alpha),
            Interpolation::Step => self.value(i0),
            Interpolation::CubicSpline => {
                let out0 = self.values[i0 * 3 + 2];
                let in1 = self.values[i1 * 3];
                T::hermite(self.value(i0), out0, self.value(i1), in1, t1 - t0, alpha)
            }
        }
    }
}

/// All channels of one bone within a clip.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub target: usize,
    pub translation: Option<Channel<Vec3>>,
    pub rotation: Option<Channel<Quat>>,
    pub scale: Option<Channel<Vec3>>,
}

impl Track {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            translation: None,
            rotation: None,
            scale: None,
        }
    }

    pub fn with_translation(mut self, channel: Channel<Vec3>) -> Self {
        self.translation = Some(channel);
        self
    }

    pub fn with_rotation(mut self, channel: Channel<Quat>) -> Self {
        self.rotation = Some(channel);
        self
    }

    pub fn with_scale(mut self, channel: Channel<Vec3>) -> Self {
        self.scale = Some(channel);
        self
    }

    /// Latest keyframe time over all channels.
    pub fn end_time(&self) -> f32 {
        [
            self.translation.as_ref().map(Channel::last_time),
            self.rotation.as_ref().map(Channel::last_time),
            self.scale.as_ref().map(Channel::last_time),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
    }

    /// Channels the track lacks fall back to `rest`.
    pub fn sample(&self, t: f32, rest: TRS) -> TRS {
        TRS {
            t: self.translation.as_ref().map_or(rest.t, |c| c.sample(t)),
            r: self.rotation.as_ref().map_or(rest.r, |c| c.sample(t)),
            s: self.scale.as_ref().map_or(rest.s, |c| c.sample(t)),
        }
    }
}

/// One named animation. Tracks are kept sorted by target bone.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32, mut tracks: Vec<Track>) -> Result<Self, LoadError> {
        let name = name.into();
        if !duration.is_finite() || duration < 0.0 {
            return Err(LoadError::InvalidDuration { clip: name, duration });
        }
        tracks.sort_by_key(|track| track.target);
        if let Some(w) = tracks.windows(2).find(|w| w[0].target == w[1].target) {
            return Err(LoadError::DuplicateTrack {
                clip: name,
                bone: w[0].target,
            });
        }
        if duration <= f32::EPSILON {
            log::warn!("clip '{}' has zero duration, it will hold its first keyframe", name);
        }
        Ok(Self { name, duration, tracks })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, bone: usize) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&bone, |track| track.target)
            .ok()
            .map(|idx| &self.tracks[idx])
    }

    /// Highest bone index the clip animates.
    pub fn max_target(&self) -> Option<usize> {
        self.tracks.last().map(|track| track.target)
    }
}
