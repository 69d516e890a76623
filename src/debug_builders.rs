// ==============================================================================
// debug_builders.rs — DEBUG OVERLAY PRIMITIVES (SERVER -> CLIENT)
// ------------------------------------------------------------------------------
// Defines serializable debug primitives:
// - DebugLine: free vector (aggregate suspension force, etc.)
// - DebugRay: suspension probe rays, coloured by wheel state
// - DebugWheel: per-wheel numeric state (grounded, compression, force)
//
// Helpers:
// - draw_vector(): one line for the current frame, colour picked by code
// - push_probe_ray() / push_wheel_debug(): per-wheel records from a sample
//
// Everything here lives for one frame. The overlay is cleared at the start of
// every tick and nothing in it is read back by the physics.
// ==============================================================================

use nalgebra::{Point3, Vector3};
use rapier3d::prelude::Real;
use serde::Serialize;

use crate::suspension::WheelSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugColor {
    Affirmative,
    Warning,
    Neutral,
    Default,
}

impl DebugColor {
    /// 1 = green, 2 = red, 3 = blue, anything else = white.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => DebugColor::Affirmative,
            2 => DebugColor::Warning,
            3 => DebugColor::Neutral,
            _ => DebugColor::Default,
        }
    }

    pub fn rgb(&self) -> [f32; 3] {
        match self {
            DebugColor::Affirmative => [0.0, 1.0, 0.0],
            DebugColor::Warning => [1.0, 0.0, 0.0],
            DebugColor::Neutral => [0.2, 0.4, 1.0],
            DebugColor::Default => [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugLine {
    pub origin: [f32; 3],
    pub end: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugRay {
    pub wheel: String,
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub hit: Option<[f32; 3]>,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugWheel {
    pub id: String, // "FL", "FR", "RL", "RR"
    pub mount: [f32; 3],
    pub grounded: bool,
    pub hit_distance: Option<f32>,
    pub compression: f32,
    pub point_y_velocity: f32,
    pub spring_force: f32,
    pub damper_force: f32,
    pub force: f32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DebugOverlay {
    pub lines: Vec<DebugLine>,
    pub suspension_rays: Vec<DebugRay>,
    pub wheels: Vec<DebugWheel>,
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.lines.clear();
        self.suspension_rays.clear();
        self.wheels.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.suspension_rays.is_empty() && self.wheels.is_empty()
    }
}

#[inline] fn p3(p: Point3<Real>) -> [f32; 3] { [p.x, p.y, p.z] }
#[inline] fn v3(v: Vector3<Real>) -> [f32; 3] { [v.x, v.y, v.z] }

/// Draw `vector` starting at `origin` for the current frame.
pub fn draw_vector(
    overlay: &mut DebugOverlay,
    vector: Vector3<Real>,
    color_code: i32,
    origin: Point3<Real>,
) {
    overlay.lines.push(DebugLine {
        origin: p3(origin),
        end: p3(origin + vector),
        color: DebugColor::from_code(color_code).rgb(),
    });
}

/// Probe ray for one wheel: green when pushing, grey when touching but
/// extended past rest, red when airborne.
pub fn push_probe_ray(overlay: &mut DebugOverlay, sample: &WheelSample, ray_length: Real) {
    let color = if sample.loaded() {
        DebugColor::Affirmative.rgb()
    } else if sample.grounded() {
        [0.6, 0.6, 0.6]
    } else {
        DebugColor::Warning.rgb()
    };

    overlay.suspension_rays.push(DebugRay {
        wheel: sample.id.to_string(),
        origin: p3(sample.mount_world),
        direction: v3(sample.direction),
        length: ray_length,
        hit: sample.hit.map(|h| p3(h.point)),
        color,
    });
}

pub fn push_wheel_debug(overlay: &mut DebugOverlay, sample: &WheelSample) {
    overlay.wheels.push(DebugWheel {
        id: sample.id.to_string(),
        mount: p3(sample.mount_world),
        grounded: sample.grounded(),
        hit_distance: sample.hit.map(|h| h.distance),
        compression: sample.compression,
        point_y_velocity: sample.point_y_velocity,
        spring_force: sample.spring_force,
        damper_force: sample.damper_force,
        force: sample.force,
    });
}
