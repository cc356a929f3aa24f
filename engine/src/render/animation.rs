use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// How many times a clip plays before it stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    Indefinite,
    Count(u32),
}

/// A named time window over the animation keyframes.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    start_ms: f32,
    end_ms: f32,
    speed: f32,
    repeat: Repeat,
    elapsed_ms: f32,
    loops: u32,
    playing: bool,
}

impl AnimationClip {
    fn new(start_ms: u32, end_ms: u32) -> Self {
        Self {
            start_ms: start_ms as f32,
            end_ms: end_ms.max(start_ms) as f32,
            speed: 1.0,
            repeat: Repeat::Count(1),
            elapsed_ms: 0.0,
            loops: 0,
            playing: false,
        }
    }

    /// Playback rate multiplier applied to wall-clock milliseconds.
    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        self.speed = speed.max(0.0);
        self
    }

    pub fn set_repeat(&mut self, repeat: Repeat) -> &mut Self {
        self.repeat = repeat;
        self
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn duration(&self) -> f32 {
        self.end_ms - self.start_ms
    }

    fn local_time(&self) -> f32 {
        self.start_ms + self.elapsed_ms
    }

    fn advance(&mut self, dt_ms: f32) {
        if !self.playing {
            return;
        }

        let duration = self.duration();
        if duration <= 0.0 {
            self.playing = matches!(self.repeat, Repeat::Indefinite);
            return;
        }

        let step = dt_ms * self.speed;
        if !step.is_finite() {
            return;
        }
        self.elapsed_ms += step;
        if self.elapsed_ms < duration {
            return;
        }

        // Float to int casts saturate, so huge steps cannot overflow the loop count.
        let wraps = (self.elapsed_ms / duration).floor() as u32;
        match self.repeat {
            Repeat::Indefinite => {
                self.loops = self.loops.wrapping_add(wraps);
            }
            Repeat::Count(count) => {
                self.loops = self.loops.saturating_add(wraps);
                if self.loops >= count {
                    self.loops = count;
                    self.elapsed_ms = duration;
                    self.playing = false;
                    return;
                }
            }
        }
        self.elapsed_ms = self.elapsed_ms.rem_euclid(duration);
    }

    fn restart(&mut self) {
        self.elapsed_ms = 0.0;
        self.loops = 0;
        self.playing = true;
    }
}

/// Keyframe animation of a sprite's frame index.
///
/// Key times are in milliseconds; values are linearly interpolated and rounded to the
/// nearest frame.
#[derive(Clone, Debug)]
pub struct Animation {
    key_times: Vec<u32>,
    key_values: Vec<f32>,
    clips: HashMap<String, AnimationClip>,
    active: Option<String>,
    value: f32,
}

impl Animation {
    /// Build an animation from parallel key time / value slices.
    ///
    /// Keys past the shorter of the two slices are dropped.
    pub fn keyframes(key_times: &[u32], key_values: &[f32]) -> Self {
        let len = key_times.len().min(key_values.len());
        let mut keys: Vec<(u32, f32)> = key_times[..len]
            .iter()
            .copied()
            .zip(key_values[..len].iter().copied())
            .collect();
        keys.sort_by_key(|(t, _)| *t);

        let value = keys.first().map(|(_, v)| *v).unwrap_or(0.0);
        Self {
            key_times: keys.iter().map(|(t, _)| *t).collect(),
            key_values: keys.iter().map(|(_, v)| *v).collect(),
            clips: HashMap::new(),
            active: None,
            value,
        }
    }

    /// Create (or replace) a clip covering `[start_ms, end_ms]`.
    pub fn create_clip(&mut self, name: impl Into<String>, start_ms: u32, end_ms: u32) -> &mut AnimationClip {
        let clip = AnimationClip::new(start_ms, end_ms);
        match self.clips.entry(name.into()) {
            Entry::Occupied(mut entry) => {
                entry.insert(clip);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(clip),
        }
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    pub fn clip_mut(&mut self, name: &str) -> Option<&mut AnimationClip> {
        self.clips.get_mut(name)
    }

    /// Start `name` from its first key. Returns false for an unknown clip.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(clip) = self.clips.get_mut(name) else {
            log::warn!("Unknown animation clip '{name}'");
            return false;
        };
        clip.restart();
        self.value = self.sample(self.clips[name].local_time());
        self.active = Some(name.to_string());
        true
    }

    /// Stop `name`, freezing the current frame.
    pub fn stop(&mut self, name: &str) {
        if let Some(clip) = self.clips.get_mut(name) {
            clip.playing = false;
        }
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.clips.get(name).is_some_and(|c| c.playing)
    }

    pub fn update(&mut self, dt: f32) {
        let Some(active) = self.active.as_deref() else {
            return;
        };
        let Some(clip) = self.clips.get_mut(active) else {
            return;
        };
        if !clip.playing {
            return;
        }

        clip.advance(dt * 1000.0);
        let time = clip.local_time();
        self.value = self.sample(time);
    }

    /// Interpolated key value at the current time.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn current_frame(&self) -> usize {
        self.value.round().max(0.0) as usize
    }

    fn sample(&self, time_ms: f32) -> f32 {
        let (Some(&first), Some(&last)) = (self.key_times.first(), self.key_times.last()) else {
            return 0.0;
        };
        if time_ms <= first as f32 {
            return self.key_values[0];
        }
        if time_ms >= last as f32 {
            return self.key_values[self.key_values.len() - 1];
        }

        let next = self.key_times.partition_point(|&t| (t as f32) <= time_ms);
        let (t0, t1) = (self.key_times[next - 1] as f32, self.key_times[next] as f32);
        let (v0, v1) = (self.key_values[next - 1], self.key_values[next]);
        let span = t1 - t0;
        if span <= 0.0 {
            return v1;
        }
        v0 + (v1 - v0) * ((time_ms - t0) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flap() -> Animation {
        let mut anim = Animation::keyframes(&[0, 100, 200], &[0.0, 1.0, 2.0]);
        anim.create_clip("fly", 0, 200).set_repeat(Repeat::Indefinite);
        anim
    }

    #[test]
    fn interpolates_between_keys() {
        let mut anim = flap();
        assert!(anim.play("fly"));
        anim.update(0.05);
        assert!((anim.value() - 0.5).abs() < 1e-4);
        anim.update(0.03);
        assert_eq!(anim.current_frame(), 1);
    }

    #[test]
    fn indefinite_clip_wraps() {
        let mut anim = flap();
        anim.play("fly");
        anim.update(0.21);
        assert!(anim.is_playing("fly"));
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn huge_steps_wrap_in_one_go() {
        let mut anim = flap();
        anim.play("fly");
        anim.update(1.0e6);
        assert!(anim.is_playing("fly"));
        assert!(anim.current_frame() <= 2);

        anim.update(f32::MAX);
        assert!(anim.is_playing("fly"));
        assert!(anim.current_frame() <= 2);
    }

    #[test]
    fn counted_clip_stops_after_a_huge_step() {
        let mut anim = Animation::keyframes(&[0, 100], &[0.0, 3.0]);
        anim.create_clip("thrice", 0, 100).set_repeat(Repeat::Count(3));
        anim.play("thrice");
        anim.update(0.25);
        assert!(anim.is_playing("thrice"));
        anim.update(1.0e9);
        assert!(!anim.is_playing("thrice"));
        assert_eq!(anim.current_frame(), 3);
    }

    #[test]
    fn recreating_a_clip_resets_it() {
        let mut anim = flap();
        anim.play("fly");
        anim.update(0.05);
        anim.create_clip("fly", 0, 100).set_speed(2.0);
        let clip = anim.clip("fly").unwrap();
        assert!(!clip.is_playing());
        assert_eq!(clip.speed(), 2.0);
        assert_eq!(anim.clips.len(), 1);
    }

    #[test]
    fn speed_scales_playback() {
        let mut anim = flap();
        anim.clip_mut("fly").unwrap().set_speed(0.5);
        anim.play("fly");
        anim.update(0.2);
        assert_eq!(anim.current_frame(), 1);
    }

    #[test]
    fn counted_clip_stops_on_last_key() {
        let mut anim = Animation::keyframes(&[0, 100], &[0.0, 3.0]);
        anim.create_clip("once", 0, 100).set_repeat(Repeat::Count(1));
        anim.play("once");
        anim.update(0.5);
        assert!(!anim.is_playing("once"));
        assert_eq!(anim.current_frame(), 3);
    }

    #[test]
    fn stop_freezes_frame() {
        let mut anim = flap();
        anim.play("fly");
        anim.update(0.1);
        anim.stop("fly");
        let frame = anim.current_frame();
        anim.update(0.05);
        assert_eq!(anim.current_frame(), frame);
        assert!(!anim.is_playing("fly"));
    }

    #[test]
    fn unknown_clip_does_not_play() {
        let mut anim = flap();
        assert!(!anim.play("swim"));
        anim.update(0.1);
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn mismatched_key_slices_are_truncated() {
        let anim = Animation::keyframes(&[0, 10, 20], &[4.0]);
        assert_eq!(anim.current_frame(), 4);
    }
}
