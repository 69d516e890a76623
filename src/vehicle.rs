use nalgebra::Point3;
use rapier3d::prelude::*;

use crate::suspension::{ProbeFrame, SuspensionFrame, SuspensionParams, WheelId, WheelMount};

pub struct VehicleConfig {
    pub mass: f32,            // kg
    pub linear_damping: f32,  // drag
    pub angular_damping: f32, // rotational drag

    // --- Chassis geometry ---
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz] meters
    pub chassis_com_offset: [f32; 3],   // local offset from collider center
    pub spawn: [f32; 3],                // world position at (re)initialization

    // --- Suspension ---
    pub suspension: SuspensionParams,
    pub probe_frame: ProbeFrame,
    pub mounts: Vec<Option<WheelMount>>, // None = unassigned slot
}

impl VehicleConfig {
    pub fn assigned_wheels(&self) -> usize {
        self.mounts.iter().flatten().count()
    }
}

/// Hatchback-ish defaults: 1350 kg box on four corner mounts.
pub fn default_vehicle() -> VehicleConfig {
    VehicleConfig {
        mass: 1350.0,
        linear_damping: 0.08,
        angular_damping: 0.6,

        chassis_half_extents: [1.0, 0.35, 2.1],
        chassis_com_offset: [0.0, -0.15, 0.0], // slightly below visual center
        spawn: [0.0, 1.3, 0.0],

        suspension: SuspensionParams::default(),
        probe_frame: ProbeFrame::World,
        mounts: default_mounts(),
    }
}

pub fn default_mounts() -> Vec<Option<WheelMount>> {
    [
        (WheelId::FL, [-0.8, -0.3,  1.5]),
        (WheelId::FR, [ 0.8, -0.3,  1.5]),
        (WheelId::RL, [-0.8, -0.3, -1.5]),
        (WheelId::RR, [ 0.8, -0.3, -1.5]),
    ]
    .into_iter()
    .map(|(id, [x, y, z])| Some(WheelMount { id, offset: Point3::new(x, y, z) }))
    .collect()
}

pub struct Vehicle {
    pub id: String,
    pub body: RigidBodyHandle, // the chassis body
    pub config: VehicleConfig, // vehicle parameters
    pub last_frame: SuspensionFrame,
}

impl Vehicle {
    pub fn total_force(&self) -> f32 {
        self.last_frame.total.y
    }
}
