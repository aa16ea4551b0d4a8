//! This module contains the [`MorphAnimator`], which eases the global morph factor towards the
//! shape that the user asked for.

use serde::{Deserialize, Serialize};
use tm_dataset::ConfigError;
use tracing::{instrument, trace, warn};

/// The discrete shape that the user wants to see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeState {
    /// Everything is scattered over a sphere.
    #[default]
    Scattered,

    /// Everything is assembled into the tree.
    Tree,
}

impl ShapeState {
    /// The morph factor that this state pulls towards.
    pub fn target(self) -> f32 {
        match self {
            Self::Scattered => 0.,
            Self::Tree => 1.,
        }
    }

    /// The other state.
    pub fn toggled(self) -> Self {
        match self {
            Self::Scattered => Self::Tree,
            Self::Tree => Self::Scattered,
        }
    }
}

/// The tuning of the [`MorphAnimator`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphSettings {
    /// The rate constant of the exponential smoothing, per second.
    pub speed: f32,

    /// Once the morph factor is closer than this to its target, it snaps onto the target.
    pub snap_epsilon: f32,
}

impl Default for MorphSettings {
    fn default() -> Self {
        Self {
            speed: 2.,
            snap_epsilon: 1e-3,
        }
    }
}

impl MorphSettings {
    /// Check that these settings will converge.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed.is_finite() && self.speed > 0.) {
            return Err(ConfigError::InvalidMorphSpeed(self.speed));
        }

        if !(self.snap_epsilon.is_finite() && self.snap_epsilon >= 0.) {
            return Err(ConfigError::InvalidSnapEpsilon(self.snap_epsilon));
        }

        Ok(())
    }
}

/// A first-order exponential smoother for the morph factor.
///
/// Each frame moves the current value a fraction `speed * Δt` of the way to the target, so the
/// convergence time doesn't depend on the frame rate. The current value is never reset, so
/// changing the target mid-transition simply turns the motion around without a jump.
#[derive(Clone, Debug, PartialEq)]
pub struct MorphAnimator {
    /// The current morph factor, always in `[0, 1]`.
    current: f32,

    /// The shape that we're heading towards.
    shape: ShapeState,

    /// The tuning of the smoother.
    settings: MorphSettings,
}

impl Default for MorphAnimator {
    fn default() -> Self {
        Self {
            current: 0.,
            shape: ShapeState::Scattered,
            settings: MorphSettings::default(),
        }
    }
}

impl MorphAnimator {
    /// Create a new animator, starting fully scattered.
    pub fn new(settings: MorphSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    /// The current morph factor.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// The shape we're currently heading towards.
    pub fn shape_state(&self) -> ShapeState {
        self.shape
    }

    /// The morph factor we're currently heading towards.
    pub fn target(&self) -> f32 {
        self.shape.target()
    }

    /// The current tuning.
    pub fn settings(&self) -> MorphSettings {
        self.settings
    }

    /// Whether the morph factor has reached its target.
    pub fn is_settled(&self) -> bool {
        self.current == self.target()
    }

    /// Set the shape to head towards. This takes effect gradually over the following frames.
    #[instrument(skip(self))]
    pub fn set_shape_state(&mut self, shape: ShapeState) {
        self.shape = shape;
    }

    /// Advance the animation by `delta_seconds` and return the new morph factor.
    ///
    /// A delta of zero changes nothing. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, delta_seconds: f32) -> f32 {
        if !delta_seconds.is_finite() || delta_seconds < 0. {
            warn!(delta_seconds, "Ignoring invalid frame delta");
            return self.current;
        }

        if delta_seconds == 0. {
            return self.current;
        }

        let target = self.target();

        // A step larger than the whole distance would overshoot the target, so cap it
        let step = (self.settings.speed * delta_seconds).min(1.);
        self.current += (target - self.current) * step;

        if (target - self.current).abs() < self.settings.snap_epsilon {
            self.current = target;
        }

        trace!(current = self.current, target, "Advanced morph factor");
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_the_tree_monotonically() {
        let mut animator = MorphAnimator::default();
        animator.set_shape_state(ShapeState::Tree);

        let mut previous = animator.current();
        let mut frames = 0;
        while !animator.is_settled() {
            let current = animator.advance(1. / 60.);
            assert!(current >= previous, "{current} < {previous}");
            assert!((0.0..=1.0).contains(&current));
            previous = current;

            frames += 1;
            assert!(frames < 10_000, "the animator never settled");
        }

        assert_eq!(animator.current(), 1.);

        // ln(1000) / 2 is about 3.45 seconds, which is about 207 frames at 60 fps
        assert!((190..230).contains(&frames), "took {frames} frames");
    }

    #[test]
    fn convergence_is_frame_rate_independent() {
        let settle_time = |fps: f32| {
            let mut animator = MorphAnimator::default();
            animator.set_shape_state(ShapeState::Tree);

            let mut time = 0.;
            while !animator.is_settled() {
                animator.advance(1. / fps);
                time += 1. / fps;
            }
            time
        };

        let slow = settle_time(30.);
        let fast = settle_time(240.);
        assert!((slow - fast).abs() < 0.1, "{slow}s at 30 fps vs {fast}s at 240 fps");
    }

    #[test]
    fn reversal_is_continuous() {
        let mut animator = MorphAnimator::default();
        animator.set_shape_state(ShapeState::Tree);

        for _ in 0..30 {
            animator.advance(1. / 60.);
        }
        let before = animator.current();
        assert!(0. < before && before < 1.);

        animator.set_shape_state(ShapeState::Scattered);
        assert_eq!(animator.current(), before, "changing target must not jump");

        let after = animator.advance(1. / 60.);
        assert!(after < before);
        assert!(before - after < 2. / 60., "a single frame moved too far");

        while !animator.is_settled() {
            animator.advance(1. / 60.);
        }
        assert_eq!(animator.current(), 0.);
    }

    #[test]
    fn zero_delta_changes_nothing() {
        let mut animator = MorphAnimator::default();
        animator.set_shape_state(ShapeState::Tree);
        animator.advance(0.1);

        let snapshot = animator.clone();
        for _ in 0..10 {
            animator.advance(0.);
        }
        assert_eq!(animator, snapshot);
    }

    #[test]
    fn invalid_deltas_are_ignored() {
        let mut animator = MorphAnimator::default();
        animator.set_shape_state(ShapeState::Tree);
        animator.advance(0.1);
        let current = animator.current();

        for delta in [-1., f32::NAN, f32::INFINITY] {
            assert_eq!(animator.advance(delta), current);
        }
    }

    #[test]
    fn huge_deltas_do_not_overshoot() {
        let mut animator = MorphAnimator::default();
        animator.set_shape_state(ShapeState::Tree);
        assert_eq!(animator.advance(10.), 1.);

        animator.set_shape_state(ShapeState::Scattered);
        assert_eq!(animator.advance(10.), 0.);
    }

    #[test]
    fn settings_are_validated() {
        assert!(MorphAnimator::new(MorphSettings::default()).is_ok());
        assert_eq!(
            MorphAnimator::new(MorphSettings {
                speed: 0.,
                snap_epsilon: 1e-3
            }),
            Err(ConfigError::InvalidMorphSpeed(0.))
        );
        assert_eq!(
            MorphAnimator::new(MorphSettings {
                speed: 2.,
                snap_epsilon: -1.
            }),
            Err(ConfigError::InvalidSnapEpsilon(-1.))
        );
    }

    #[test]
    fn toggling() {
        assert_eq!(ShapeState::Tree.toggled(), ShapeState::Scattered);
        assert_eq!(ShapeState::Scattered.toggled(), ShapeState::Tree);
        assert_eq!(ShapeState::default().target(), 0.);
    }
}
