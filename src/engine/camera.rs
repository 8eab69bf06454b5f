use std::f32::consts::FRAC_PI_2;

use log::debug;

use super::interaction::ViewMode;
use super::layout::Layout;
use super::math::Vec3;

const FIELD_OF_VIEW: f32 = 50.0_f32 * (std::f32::consts::PI / 180.0);
const NEAR_PLANE: f32 = 0.1;
const OVERVIEW_DISTANCE: f32 = 46.0;
const FLY_DISTANCE: f32 = 14.0;
const MIN_DISTANCE: f32 = 3.0;
const MAX_DISTANCE: f32 = 140.0;
const DEFAULT_AZIMUTH: f32 = 0.6;
const DEFAULT_POLAR: f32 = 0.95;
const POLAR_RANGE_3D: (f32, f32) = (0.2, 1.35);
const TOP_DOWN_POLAR: f32 = 0.001;
/// Look-at point relative to a node when flying to it.
const LOOK_AT_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

pub const DEFAULT_TRANSITION_SECS: f32 = 0.8;

/// Requests from the interaction controller; the camera decides how they animate.
#[derive(Clone, Debug, PartialEq)]
pub enum CameraCommand {
    FlyToNode(String),
    FlyTo(Vec3),
    Reset,
    SetView(ViewMode),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    /// Distance along the view direction.
    pub depth: f32,
    /// Screen pixels per world unit at this depth.
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    from_target: Vec3,
    to_target: Vec3,
    from_distance: f32,
    to_distance: f32,
    from_polar: f32,
    to_polar: f32,
    elapsed: f32,
    duration: f32,
}

impl Transition {
    fn progress(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Orbit camera around a look-at target.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    target: Vec3,
    distance: f32,
    azimuth: f32,
    /// Angle from straight up; 0 looks straight down.
    polar: f32,
    view: ViewMode,
    polar_3d: f32,
    transition_secs: f32,
    transition: Option<Transition>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(ViewMode::ThreeD, DEFAULT_TRANSITION_SECS)
    }
}

impl Camera {
    pub fn new(view: ViewMode, transition_secs: f32) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            distance: OVERVIEW_DISTANCE,
            azimuth: DEFAULT_AZIMUTH,
            polar: DEFAULT_POLAR,
            view: ViewMode::ThreeD,
            polar_3d: DEFAULT_POLAR,
            transition_secs: transition_secs.max(0.0),
            transition: None,
        };
        camera.set_view(view, false);
        camera
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn polar_range(&self) -> (f32, f32) {
        match self.view {
            ViewMode::TwoD => (TOP_DOWN_POLAR, TOP_DOWN_POLAR),
            ViewMode::ThreeD => POLAR_RANGE_3D,
        }
    }

    /// Applies a command; node targets are resolved against `layout` and unknown nodes are ignored.
    pub fn apply(&mut self, command: &CameraCommand, layout: &Layout) {
        match command {
            CameraCommand::FlyToNode(node_id) => match layout.get(node_id) {
                Some(position) => self.fly_to(position),
                None => debug!("camera: no position for {node_id}, ignoring fly-to"),
            },
            CameraCommand::FlyTo(position) => self.fly_to(*position),
            CameraCommand::Reset => {
                self.start_transition(Vec3::ZERO, OVERVIEW_DISTANCE, self.polar);
            }
            CameraCommand::SetView(view) => self.set_view(*view, true),
        }
    }

    fn fly_to(&mut self, position: Vec3) {
        self.start_transition(position + LOOK_AT_OFFSET, FLY_DISTANCE, self.polar);
    }

    fn set_view(&mut self, view: ViewMode, animate: bool) {
        if view == self.view && self.transition.is_none() && animate {
            return;
        }

        let polar = match view {
            ViewMode::TwoD => {
                if self.view == ViewMode::ThreeD {
                    self.polar_3d = self.polar;
                }
                TOP_DOWN_POLAR
            }
            ViewMode::ThreeD => self.polar_3d.clamp(POLAR_RANGE_3D.0, POLAR_RANGE_3D.1),
        };
        self.view = view;

        if animate {
            let target = self.transition.map_or(self.target, |t| t.to_target);
            let distance = self.transition.map_or(self.distance, |t| t.to_distance);
            self.start_transition(target, distance, polar);
        } else {
            self.polar = polar;
        }
    }

    fn start_transition(&mut self, to_target: Vec3, to_distance: f32, to_polar: f32) {
        self.transition = Some(Transition {
            from_target: self.target,
            to_target,
            from_distance: self.distance,
            to_distance: to_distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            from_polar: self.polar,
            to_polar,
            elapsed: 0.0,
            duration: self.transition_secs,
        });
        if self.transition_secs <= f32::EPSILON {
            self.update(0.0);
        }
    }

    /// Advances the active transition by `dt` seconds. Returns whether it is still running.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(mut transition) = self.transition else {
            return false;
        };

        transition.elapsed += dt.max(0.0);
        let progress = transition.progress();
        let eased = ease_out_cubic(progress);
        self.target = transition.from_target.lerp(transition.to_target, eased);
        self.distance =
            transition.from_distance + (transition.to_distance - transition.from_distance) * eased;
        self.polar = transition.from_polar + (transition.to_polar - transition.from_polar) * eased;

        if progress >= 1.0 {
            self.transition = None;
            false
        } else {
            self.transition = Some(transition);
            true
        }
    }

    /// Pointer-drag orbit. Pitch changes are ignored in 2D, where the camera stays top-down.
    pub fn orbit(&mut self, delta_azimuth: f32, delta_polar: f32) {
        self.azimuth = (self.azimuth + delta_azimuth).rem_euclid(std::f32::consts::TAU);
        if self.view == ViewMode::ThreeD && self.transition.is_none() {
            self.polar = (self.polar + delta_polar).clamp(POLAR_RANGE_3D.0, POLAR_RANGE_3D.1);
            self.polar_3d = self.polar;
        }
    }

    /// Scales the orbit distance; `factor < 1` moves closer.
    pub fn dolly(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        if let Some(transition) = &mut self.transition {
            transition.to_distance =
                (transition.to_distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    pub fn eye(&self) -> Vec3 {
        let polar = self.polar.clamp(0.0, FRAC_PI_2);
        let offset = Vec3::new(
            polar.sin() * self.azimuth.cos(),
            polar.cos(),
            polar.sin() * self.azimuth.sin(),
        );
        self.target + offset * self.distance
    }

    /// Perspective projection into a `width` x `height` viewport with the origin at its top-left.
    pub fn project(&self, point: Vec3, width: f32, height: f32) -> Option<Projection> {
        let eye = self.eye();
        let forward = (self.target - eye).normalized();
        let right = Vec3::new(self.azimuth.sin(), 0.0, -self.azimuth.cos());
        let up = right.cross(forward);

        let relative = point - eye;
        let depth = relative.dot(forward);
        if depth < NEAR_PLANE {
            return None;
        }

        let focal = (height * 0.5) / (FIELD_OF_VIEW * 0.5).tan();
        let scale = focal / depth;
        Some(Projection {
            x: width * 0.5 + relative.dot(right) * scale,
            y: height * 0.5 - relative.dot(up) * scale,
            depth,
            scale,
        })
    }
}
