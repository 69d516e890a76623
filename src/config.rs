//! TOML configuration for the simulation host.
//!
//! Every field has a default, so an empty file (or no file) yields a working
//! four-wheel setup on flat ground.

use std::fs;
use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::suspension::{damper_for_ratio, suspension_from_sag, GroundFilter, ProbeFrame, SuspensionParams, WheelId, WheelMount};
use crate::vehicle::{default_vehicle, VehicleConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub server: ServerSettings,
    pub world: WorldSettings,
    pub vehicle: VehicleSettings,
    pub suspension: SuspensionSettings,
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub tick_hz: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:9001".to_string(),
            tick_hz: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    #[default]
    Flat,
    Bumpy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub gravity: f32,
    pub terrain: TerrainKind,
    pub seed: u64,
    pub size: f32,        // m, square side
    pub resolution: usize, // heightfield samples per side
    pub bump_height: f32, // m, peak-to-peak
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            terrain: TerrainKind::Flat,
            seed: 7,
            size: 200.0,
            resolution: 64,
            bump_height: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    pub id: Option<String>,
    /// Chassis-local mount point. Missing = unassigned slot.
    pub offset: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSettings {
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub half_extents: [f32; 3],
    pub com_offset: [f32; 3],
    pub spawn: [f32; 3],
    pub probe_frame: ProbeFrame,
    pub wheels: Vec<WheelSettings>,
}

impl Default for VehicleSettings {
    fn default() -> Self {
        let v = default_vehicle();
        Self {
            mass: v.mass,
            linear_damping: v.linear_damping,
            angular_damping: v.angular_damping,
            half_extents: v.chassis_half_extents,
            com_offset: v.chassis_com_offset,
            spawn: v.spawn,
            probe_frame: v.probe_frame,
            wheels: v
                .mounts
                .iter()
                .map(|m| WheelSettings {
                    id: m.map(|m| m.id.to_string()),
                    offset: m.map(|m| [m.offset.x, m.offset.y, m.offset.z]),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionSettings {
    pub ray_length: f32,
    pub rest_distance: f32,
    /// N/m. Absent: derived from `sag`, else the built-in default.
    pub spring_k: Option<f32>,
    /// N*s/m. Absent: derived from `damping_ratio`, else the built-in default.
    pub damper_c: Option<f32>,
    /// Static sag per wheel (m); used when `spring_k` is absent.
    pub sag: Option<f32>,
    /// Fraction of critical damping on the resolved spring; used when
    /// `damper_c` is absent.
    pub damping_ratio: Option<f32>,
    pub ground_filter: GroundFilter,
}

impl Default for SuspensionSettings {
    fn default() -> Self {
        let p = SuspensionParams::default();
        Self {
            ray_length: p.ray_length,
            rest_distance: p.rest_distance,
            spring_k: None,
            damper_c: None,
            sag: None,
            damping_ratio: None,
            ground_filter: GroundFilter::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub enabled: bool,
    /// Metres of line per newton of aggregate force.
    pub scale: f32,
    pub color: i32,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.0 / 10_000.0,
            color: 1,
        }
    }
}

fn ensure(ok: bool, field: &'static str, reason: impl Into<String>) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: reason.into() })
    }
}

fn non_negative(value: f32, field: &'static str) -> ConfigResult<()> {
    ensure(value.is_finite() && value >= 0.0, field, format!("must be finite and >= 0, got {value}"))
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        ensure(self.server.tick_hz > 0, "server.tick_hz", "must be > 0")?;
        ensure(self.world.gravity.is_finite(), "world.gravity", "must be finite")?;
        ensure(self.world.size > 0.0, "world.size", "must be > 0")?;
        ensure(self.world.resolution >= 2, "world.resolution", "needs at least 2 samples per side")?;
        non_negative(self.world.bump_height, "world.bump_height")?;

        ensure(self.vehicle.mass > 0.0 && self.vehicle.mass.is_finite(), "vehicle.mass", "must be > 0")?;
        ensure(
            self.vehicle.half_extents.iter().all(|h| *h > 0.0),
            "vehicle.half_extents",
            "all extents must be > 0",
        )?;
        non_negative(self.vehicle.linear_damping, "vehicle.linear_damping")?;
        non_negative(self.vehicle.angular_damping, "vehicle.angular_damping")?;
        for w in &self.vehicle.wheels {
            if let Some(id) = &w.id {
                ensure(WheelId::parse(id).is_some(), "vehicle.wheels.id", format!("unknown wheel id {id:?}"))?;
            }
        }

        let s = &self.suspension;
        non_negative(s.ray_length, "suspension.ray_length")?;
        non_negative(s.rest_distance, "suspension.rest_distance")?;
        if let Some(k) = s.spring_k {
            non_negative(k, "suspension.spring_k")?;
        }
        if let Some(c) = s.damper_c {
            non_negative(c, "suspension.damper_c")?;
        }
        if let Some(sag) = s.sag {
            ensure(sag.is_finite() && sag > 0.0, "suspension.sag", format!("must be > 0, got {sag}"))?;
        }
        if let Some(zeta) = s.damping_ratio {
            non_negative(zeta, "suspension.damping_ratio")?;
        }

        if s.ray_length < s.rest_distance {
            warn!(
                "suspension.ray_length ({}) < rest_distance ({}): wheels can never reach rest",
                s.ray_length, s.rest_distance
            );
        }

        non_negative(self.debug.scale, "debug.scale")?;
        Ok(())
    }

    /// Mount slots in config order. Slots without an offset stay `None`.
    pub fn wheel_mounts(&self) -> Vec<Option<WheelMount>> {
        self.vehicle
            .wheels
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let [x, y, z] = w.offset?;
                let id = w
                    .id
                    .as_deref()
                    .and_then(WheelId::parse)
                    .unwrap_or_else(|| WheelId::from_index(i));
                Some(WheelMount { id, offset: Point3::new(x, y, z) })
            })
            .collect()
    }

    /// Resolve the coefficients: explicit value, then sag / damping ratio,
    /// then the built-in default. The damper is sized against the spring
    /// actually in effect.
    pub fn suspension_params(&self) -> SuspensionParams {
        let s = &self.suspension;
        let defaults = SuspensionParams::default();
        let mass = self.vehicle.mass;
        let wheels = self.vehicle.wheels.iter().filter(|w| w.offset.is_some()).count();

        let spring_k = match (s.spring_k, s.sag) {
            (Some(k), _) => k,
            (None, Some(sag)) => suspension_from_sag(mass, wheels, sag, 0.0).0,
            (None, None) => defaults.spring_k,
        };
        let damper_c = match (s.damper_c, s.damping_ratio) {
            (Some(c), _) => c,
            (None, Some(zeta)) => damper_for_ratio(mass, wheels, spring_k, zeta),
            (None, None) => defaults.damper_c,
        };

        SuspensionParams {
            ray_length: s.ray_length,
            rest_distance: s.rest_distance,
            spring_k,
            damper_c,
        }
    }

    pub fn vehicle_config(&self) -> VehicleConfig {
        let v = &self.vehicle;
        VehicleConfig {
            mass: v.mass,
            linear_damping: v.linear_damping,
            angular_damping: v.angular_damping,
            chassis_half_extents: v.half_extents,
            chassis_com_offset: v.com_offset,
            spawn: v.spawn,
            suspension: self.suspension_params(),
            probe_frame: v.probe_frame,
            mounts: self.wheel_mounts(),
        }
    }

    pub fn tick_dt(&self) -> f32 {
        1.0 / self.server.tick_hz as f32
    }
}
