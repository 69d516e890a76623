// ==============================================================================
// suspension.rs — RAYCAST SPRING-DAMPER SUSPENSION (ENGINE-AGNOSTIC)
// ------------------------------------------------------------------------------
// Per wheel, every physics tick:
//   1) cast a ray down from the wheel mount (world or chassis frame)
//   2) compression = max(0, rest - hit_distance)
//   3) point velocity at the mount (linvel + ω×r), vertical component only
//   4) F = max(0, k * compression - c * v_y)
//   5) apply (0, F, 0) AT the mount point -> pitch/roll falls out as torque
//
// The ground and the body are reached through two small traits so the solver
// can run against rapier (physics.rs) or against plain test doubles.
//
// Notes:
// - Wheels never pull the body down. Both the compression and the final
//   force are clamped at zero.
// - The returned aggregate is diagnostics only. Forces were already applied
//   per wheel; re-applying the sum would double them.
// ==============================================================================

use nalgebra::{Point3, Vector3};
use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GRAVITY: Real = 9.81;

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WheelId { FL, FR, RL, RR, Extra(usize) }

impl WheelId {
    /// Conventional id for a slot index: 0..4 map to FL/FR/RL/RR.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => WheelId::FL,
            1 => WheelId::FR,
            2 => WheelId::RL,
            3 => WheelId::RR,
            n => WheelId::Extra(n),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FL" => Some(WheelId::FL),
            "FR" => Some(WheelId::FR),
            "RL" => Some(WheelId::RL),
            "RR" => Some(WheelId::RR),
            other => other
                .strip_prefix('W')
                .and_then(|n| n.parse::<usize>().ok())
                .map(WheelId::Extra),
        }
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelId::FL => write!(f, "FL"),
            WheelId::FR => write!(f, "FR"),
            WheelId::RL => write!(f, "RL"),
            WheelId::RR => write!(f, "RR"),
            WheelId::Extra(n) => write!(f, "W{n}"),
        }
    }
}

// ============================================
// ----- configs / mounts ---------------------
// ============================================

/// Mount point of one wheel, fixed in chassis-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelMount {
    pub id: WheelId,
    pub offset: Point3<Real>, // chassis local
}

/// Shared suspension tuning. All wheels read the same values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionParams {
    pub ray_length: Real,    // m, max probe distance
    pub rest_distance: Real, // m, equilibrium gap
    pub spring_k: Real,      // N/m
    pub damper_c: Real,      // N*s/m
}

impl Default for SuspensionParams {
    fn default() -> Self {
        Self {
            ray_length: 1.5,
            rest_distance: 0.8,
            spring_k: 18_000.0,
            damper_c: 2_200.0,
        }
    }
}

/// Which "down" the probe rays follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeFrame {
    /// Straight down in world space, regardless of chassis tilt.
    #[default]
    World,
    /// Along the chassis local -Y axis.
    Chassis,
}

/// Bit mask of surfaces that count as ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundFilter(pub u32);

impl GroundFilter {
    pub const ALL: GroundFilter = GroundFilter(u32::MAX);
}

impl Default for GroundFilter {
    fn default() -> Self {
        GroundFilter(0b0001)
    }
}

// ============================================
// ----- collaborators ------------------------
// ============================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub distance: Real,
    pub point: Point3<Real>,
    pub normal: Vector3<Real>,
}

/// Ray-vs-ground primitive supplied by the host physics engine.
pub trait GroundQuery {
    fn cast_ray(
        &self,
        origin: Point3<Real>,
        direction: Vector3<Real>,
        max_distance: Real,
        filter: GroundFilter,
        ignore_triggers: bool,
    ) -> Option<GroundHit>;
}

/// The subset of a rigid body the solver reads and writes.
pub trait SuspensionBody {
    /// Chassis-local point -> world point using the current pose.
    fn world_point(&self, local: &Point3<Real>) -> Point3<Real>;

    /// Chassis-local direction -> world direction (rotation only).
    fn world_vector(&self, local: &Vector3<Real>) -> Vector3<Real>;

    /// Linear velocity of the material point at `point` (linvel + ω×r).
    fn velocity_at_point(&self, point: &Point3<Real>) -> Vector3<Real>;

    /// Accumulate `force` at world `point` for the next integration step.
    fn apply_force_at_point(&mut self, force: Vector3<Real>, point: Point3<Real>);

    fn reset_velocities(&mut self);
}

// ============================================
// ----- per-wheel math -----------------------
// ============================================

/// `max(0, rest - hit)`. Extended wheels report zero, never negative.
#[inline]
pub fn compression(rest_distance: Real, hit_distance: Real) -> Real {
    (rest_distance - hit_distance).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelForce {
    pub spring: Real,
    pub damper: Real,
    /// max(0, spring + damper)
    pub net: Real,
}

pub fn spring_damper_force(
    compression: Real,
    point_y_velocity: Real,
    spring_k: Real,
    damper_c: Real,
) -> WheelForce {
    let spring = compression * spring_k;   // F_s = k * x
    let damper = -point_y_velocity * damper_c; // F_d = -c * v_y

    // f32::max drops NaN, so a poisoned sample still lands on 0
    let net = (spring + damper).max(0.0);

    WheelForce { spring, damper, net }
}

/// Spring and damper from static sag and a damping ratio.
/// k = (m g / n) / sag,  c = 2 ζ sqrt(k m/n)
pub fn suspension_from_sag(vehicle_mass: Real, wheels: usize, sag_m: Real, zeta: Real) -> (Real, Real) {
    let m = vehicle_mass / wheels.max(1) as Real;
    let f_static = m * GRAVITY;            // per wheel
    let k = f_static / sag_m.max(1e-3);    // N/m
    (k, damper_for_ratio(vehicle_mass, wheels, k, zeta))
}

/// Damper giving damping ratio `zeta` on a spring `k` that carries
/// `vehicle_mass / wheels`.
pub fn damper_for_ratio(vehicle_mass: Real, wheels: usize, spring_k: Real, zeta: Real) -> Real {
    let m = vehicle_mass / wheels.max(1) as Real;
    2.0 * zeta * (spring_k * m).sqrt()     // N*s/m
}

// ============================================
// ----- solver -------------------------------
// ============================================

/// Transient per-tick record of one wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSample {
    pub index: usize,
    pub id: WheelId,
    pub mount_world: Point3<Real>,
    pub direction: Vector3<Real>,
    pub hit: Option<GroundHit>,
    pub compression: Real,
    pub point_y_velocity: Real,
    pub spring_force: Real,
    pub damper_force: Real,
    pub force: Real,
}

impl WheelSample {
    pub fn grounded(&self) -> bool {
        self.hit.is_some()
    }

    pub fn loaded(&self) -> bool {
        self.force > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuspensionFrame {
    /// (0, Σ force, 0), diagnostics only
    pub total: Vector3<Real>,
    pub samples: Vec<WheelSample>,
}

impl Default for SuspensionFrame {
    fn default() -> Self {
        Self { total: Vector3::zeros(), samples: Vec::new() }
    }
}

impl SuspensionFrame {
    pub fn grounded_wheels(&self) -> usize {
        self.samples.iter().filter(|s| s.grounded()).count()
    }
}

/// Run one suspension pass and return the aggregate vertical force.
pub fn compute_and_apply_suspension<B, G>(
    body: Option<&mut B>,
    mounts: &[Option<WheelMount>],
    ground: &G,
    filter: GroundFilter,
    params: &SuspensionParams,
) -> Vector3<Real>
where
    B: SuspensionBody + ?Sized,
    G: GroundQuery + ?Sized,
{
    solve_suspension(body, mounts, ground, filter, params, ProbeFrame::World).total
}

/// Same as [`compute_and_apply_suspension`] but keeps every wheel sample.
/// Unassigned mounts (`None`) produce no sample.
pub fn solve_suspension<B, G>(
    body: Option<&mut B>,
    mounts: &[Option<WheelMount>],
    ground: &G,
    filter: GroundFilter,
    params: &SuspensionParams,
    probe: ProbeFrame,
) -> SuspensionFrame
where
    B: SuspensionBody + ?Sized,
    G: GroundQuery + ?Sized,
{
    let Some(body) = body else {
        return SuspensionFrame::default();
    };

    let up = Vector3::y();
    let mut total: Real = 0.0;
    let mut samples = Vec::with_capacity(mounts.len());

    for (index, mount) in mounts.iter().enumerate() {
        let Some(mount) = mount else { continue };

        let origin = body.world_point(&mount.offset);
        let dir = match probe {
            ProbeFrame::World => -up,
            ProbeFrame::Chassis => body.world_vector(&-up),
        };

        let mut sample = WheelSample {
            index,
            id: mount.id,
            mount_world: origin,
            direction: dir,
            hit: None,
            compression: 0.0,
            point_y_velocity: 0.0,
            spring_force: 0.0,
            damper_force: 0.0,
            force: 0.0,
        };

        // airborne: nothing engages this tick
        let Some(hit) = ground.cast_ray(origin, dir, params.ray_length, filter, true) else {
            samples.push(sample);
            continue;
        };

        let x = compression(params.rest_distance, hit.distance);
        let v_y = body.velocity_at_point(&origin).y;
        let f = spring_damper_force(x, v_y, params.spring_k, params.damper_c);

        if f.net > 0.0 {
            body.apply_force_at_point(up * f.net, origin);
        }
        total += f.net;

        sample.hit = Some(hit);
        sample.compression = x;
        sample.point_y_velocity = v_y;
        sample.spring_force = f.spring;
        sample.damper_force = f.damper;
        sample.force = f.net;
        samples.push(sample);
    }

    SuspensionFrame {
        total: up * total,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Isometry3, UnitQuaternion};

    const EPS: Real = 1e-3;

    /// Rigid body double: pose + velocities, records applied forces.
    struct TestBody {
        pose: Isometry3<Real>,
        linvel: Vector3<Real>,
        angvel: Vector3<Real>,
        forces: Vec<(Vector3<Real>, Point3<Real>)>,
    }

    impl TestBody {
        fn at_height(y: Real) -> Self {
            Self {
                pose: Isometry3::translation(0.0, y, 0.0),
                linvel: Vector3::zeros(),
                angvel: Vector3::zeros(),
                forces: Vec::new(),
            }
        }
    }

    impl SuspensionBody for TestBody {
        fn world_point(&self, local: &Point3<Real>) -> Point3<Real> {
            self.pose * local
        }
        fn world_vector(&self, local: &Vector3<Real>) -> Vector3<Real> {
            self.pose.rotation * local
        }
        fn velocity_at_point(&self, point: &Point3<Real>) -> Vector3<Real> {
            let com = Point3::from(self.pose.translation.vector);
            self.linvel + self.angvel.cross(&(point - com))
        }
        fn apply_force_at_point(&mut self, force: Vector3<Real>, point: Point3<Real>) {
            self.forces.push((force, point));
        }
        fn reset_velocities(&mut self) {
            self.linvel = Vector3::zeros();
            self.angvel = Vector3::zeros();
        }
    }

    /// Infinite plane at `height`.
    struct Plane {
        height: Real,
    }

    impl GroundQuery for Plane {
        fn cast_ray(
            &self,
            origin: Point3<Real>,
            direction: Vector3<Real>,
            max_distance: Real,
            _filter: GroundFilter,
            _ignore_triggers: bool,
        ) -> Option<GroundHit> {
            if direction.y >= 0.0 {
                return None;
            }
            let t = (origin.y - self.height) / -direction.y;
            (t >= 0.0 && t <= max_distance).then(|| GroundHit {
                distance: t,
                point: origin + direction * t,
                normal: Vector3::y(),
            })
        }
    }

    /// Fixed hit distance per wheel index, keyed by mount x (wheels are laid out on x).
    struct Scripted {
        distances: Vec<Option<Real>>,
    }

    impl GroundQuery for Scripted {
        fn cast_ray(
            &self,
            origin: Point3<Real>,
            direction: Vector3<Real>,
            max_distance: Real,
            _filter: GroundFilter,
            _ignore_triggers: bool,
        ) -> Option<GroundHit> {
            let slot = origin.x.round() as usize;
            let d = self.distances.get(slot).copied().flatten()?;
            (d <= max_distance).then(|| GroundHit {
                distance: d,
                point: origin + direction * d,
                normal: Vector3::y(),
            })
        }
    }

    fn line_mounts(n: usize) -> Vec<Option<WheelMount>> {
        (0..n)
            .map(|i| {
                Some(WheelMount {
                    id: WheelId::from_index(i),
                    offset: Point3::new(i as Real, 0.0, 0.0),
                })
            })
            .collect()
    }

    fn params(k: Real, c: Real) -> SuspensionParams {
        SuspensionParams { ray_length: 1.5, rest_distance: 0.8, spring_k: k, damper_c: c }
    }

    #[test]
    fn compression_never_negative() {
        assert_eq!(compression(0.8, 1.5), 0.0);
        assert_eq!(compression(0.8, 100.0), 0.0);
        assert_eq!(compression(0.8, 0.8), 0.0);
        assert!((compression(0.8, 0.5) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn wheel_force_is_never_negative() {
        let xs = [0.0, 0.01, 0.2, 0.8, 3.0];
        let vs = [-20.0, -1.0, 0.0, 0.5, 2.0, 50.0];
        let ks = [0.0, 1_000.0, 18_000.0];
        let cs = [0.0, 500.0, 2_200.0, 10_000.0];

        for &x in &xs {
            for &v in &vs {
                for &k in &ks {
                    for &c in &cs {
                        let f = spring_damper_force(x, v, k, c);
                        assert!(f.net >= 0.0, "x={x} v={v} k={k} c={c} -> {}", f.net);
                    }
                }
            }
        }
    }

    #[test]
    fn nan_velocity_collapses_to_zero_force() {
        let f = spring_damper_force(0.2, Real::NAN, 18_000.0, 2_200.0);
        assert_eq!(f.net, 0.0);
    }

    #[test]
    fn spring_force_strictly_increases_with_compression() {
        let springs: Vec<Real> = [0.8, 0.7, 0.6, 0.5, 0.3, 0.1]
            .iter()
            .map(|&hit| spring_damper_force(compression(0.8, hit), 0.0, 18_000.0, 2_200.0).spring)
            .collect();

        for pair in springs.windows(2) {
            assert!(pair[1] > pair[0], "{springs:?}");
        }
    }

    #[test]
    fn scenario_at_rest_distance_gives_no_force() {
        let x = compression(0.8, 0.8);
        let f = spring_damper_force(x, 0.0, 18_000.0, 2_200.0);
        assert_eq!(x, 0.0);
        assert_eq!(f.spring, 0.0);
        assert_eq!(f.net, 0.0);
    }

    #[test]
    fn scenario_compressed_static_wheel() {
        let x = compression(0.8, 0.5);
        let f = spring_damper_force(x, 0.0, 18_000.0, 2_200.0);
        assert!((x - 0.3).abs() < 1e-6);
        assert!((f.spring - 5_400.0).abs() < 0.1);
        assert!((f.net - 5_400.0).abs() < 0.1);
    }

    #[test]
    fn scenario_rising_wheel_is_damped() {
        let x = compression(0.8, 0.5);
        let f = spring_damper_force(x, 2.0, 18_000.0, 2_200.0);
        assert!((f.damper + 4_400.0).abs() < 0.1);
        assert!((f.net - 1_000.0).abs() < 0.1);
    }

    #[test]
    fn scenario_hit_at_max_range_counts_but_only_damper_acts() {
        let mut body = TestBody::at_height(0.0);
        let ground = Scripted { distances: vec![Some(1.5)] };
        let p = params(18_000.0, 2_200.0);

        let frame = solve_suspension(Some(&mut body), &line_mounts(1), &ground, GroundFilter::ALL, &p, ProbeFrame::World);
        let s = frame.samples[0];
        assert!(s.grounded());
        assert_eq!(s.compression, 0.0);
        assert_eq!(s.force, 0.0);

        // sinking wheel: damper alone pushes up
        body.linvel = Vector3::new(0.0, -1.0, 0.0);
        let frame = solve_suspension(Some(&mut body), &line_mounts(1), &ground, GroundFilter::ALL, &p, ProbeFrame::World);
        assert!((frame.samples[0].force - 2_200.0).abs() < 0.1);

        // rising wheel: damper would pull, clamped
        body.linvel = Vector3::new(0.0, 1.0, 0.0);
        let frame = solve_suspension(Some(&mut body), &line_mounts(1), &ground, GroundFilter::ALL, &p, ProbeFrame::World);
        assert_eq!(frame.samples[0].force, 0.0);
    }

    #[test]
    fn scenario_one_airborne_wheel_out_of_four() {
        let mut body = TestBody::at_height(0.0);
        let ground = Scripted { distances: vec![Some(0.6), None, Some(0.6), Some(0.6)] };

        let total = compute_and_apply_suspension(
            Some(&mut body),
            &line_mounts(4),
            &ground,
            GroundFilter::ALL,
            &params(18_000.0, 2_200.0),
        );

        assert!((total.y - 10_800.0).abs() < 0.5, "total = {}", total.y);
        assert_eq!(total.x, 0.0);
        assert_eq!(total.z, 0.0);
        assert_eq!(body.forces.len(), 3);
        assert!(body.forces.iter().all(|(_, p)| p.x.round() as usize != 1));
    }

    #[test]
    fn no_hit_contributes_exactly_zero() {
        let mut body = TestBody::at_height(10.0);
        let ground = Plane { height: 0.0 };
        let frame = solve_suspension(Some(&mut body), &line_mounts(4), &ground, GroundFilter::ALL, &params(18_000.0, 2_200.0), ProbeFrame::World);

        assert_eq!(frame.total, Vector3::zeros());
        assert_eq!(frame.grounded_wheels(), 0);
        assert_eq!(frame.samples.len(), 4);
        assert!(body.forces.is_empty());
    }

    #[test]
    fn all_unassigned_mounts_produce_zero() {
        let mut body = TestBody::at_height(0.5);
        let ground = Plane { height: 0.0 };
        let mounts: Vec<Option<WheelMount>> = vec![None; 4];

        let total = compute_and_apply_suspension(Some(&mut body), &mounts, &ground, GroundFilter::ALL, &params(18_000.0, 2_200.0));
        assert_eq!(total, Vector3::zeros());
        assert!(body.forces.is_empty());

        let total = compute_and_apply_suspension(Some(&mut body), &[], &ground, GroundFilter::ALL, &params(18_000.0, 2_200.0));
        assert_eq!(total, Vector3::zeros());
    }

    #[test]
    fn missing_body_is_a_no_op() {
        let ground = Plane { height: 0.0 };
        let total = compute_and_apply_suspension::<TestBody, _>(
            None,
            &line_mounts(4),
            &ground,
            GroundFilter::ALL,
            &params(18_000.0, 2_200.0),
        );
        assert_eq!(total, Vector3::zeros());
    }

    #[test]
    fn unassigned_slot_is_skipped_but_others_proceed() {
        let mut body = TestBody::at_height(0.6);
        let ground = Plane { height: 0.0 };
        let mut mounts = line_mounts(4);
        mounts[2] = None;

        let frame = solve_suspension(Some(&mut body), &mounts, &ground, GroundFilter::ALL, &params(18_000.0, 0.0), ProbeFrame::World);
        assert_eq!(frame.samples.len(), 3);
        assert_eq!(frame.samples.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 3]);
        assert!((frame.total.y - 3.0 * 3_600.0).abs() < 0.5);
    }

    #[test]
    fn forces_are_applied_upward_at_each_mount() {
        let mut body = TestBody::at_height(0.6);
        let ground = Plane { height: 0.0 };
        let mounts = line_mounts(2);

        compute_and_apply_suspension(Some(&mut body), &mounts, &ground, GroundFilter::ALL, &params(18_000.0, 2_200.0));

        assert_eq!(body.forces.len(), 2);
        for ((force, point), mount) in body.forces.iter().zip(mounts.iter().flatten()) {
            assert_eq!(force.x, 0.0);
            assert_eq!(force.z, 0.0);
            assert!(force.y > 0.0);
            assert!((point - body.pose * mount.offset).norm() < 1e-6);
        }
    }

    #[test]
    fn rolling_body_loads_the_falling_side_more() {
        // rolling about +z: the -x side moves down, the +x side moves up
        let mut body = TestBody::at_height(0.6);
        body.angvel = Vector3::new(0.0, 0.0, 1.0);
        let ground = Plane { height: 0.0 };
        let mounts = vec![
            Some(WheelMount { id: WheelId::FL, offset: Point3::new(-0.8, 0.0, 0.0) }),
            Some(WheelMount { id: WheelId::FR, offset: Point3::new(0.8, 0.0, 0.0) }),
        ];

        let frame = solve_suspension(Some(&mut body), &mounts, &ground, GroundFilter::ALL, &params(18_000.0, 2_200.0), ProbeFrame::World);
        let (left, right) = (frame.samples[0], frame.samples[1]);

        assert!((left.point_y_velocity + 0.8).abs() < EPS);
        assert!((right.point_y_velocity - 0.8).abs() < EPS);
        assert!(left.force > right.force);
    }

    #[test]
    fn world_probe_ignores_chassis_tilt() {
        let mut body = TestBody::at_height(0.6);
        body.pose.rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3);
        let ground = Plane { height: 0.0 };
        let mounts = vec![Some(WheelMount { id: WheelId::FL, offset: Point3::origin() })];

        let world = solve_suspension(Some(&mut body), &mounts, &ground, GroundFilter::ALL, &params(18_000.0, 0.0), ProbeFrame::World);
        assert!((world.samples[0].direction - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-6);
        assert!((world.samples[0].hit.map(|h| h.distance).unwrap_or_default() - 0.6).abs() < EPS);

        let chassis = solve_suspension(Some(&mut body), &mounts, &ground, GroundFilter::ALL, &params(18_000.0, 0.0), ProbeFrame::Chassis);
        let tilted = chassis.samples[0].hit.map(|h| h.distance).unwrap_or_default();
        assert!((tilted - 0.6 / 0.3_f32.cos()).abs() < EPS);
    }

    #[test]
    fn sag_derivation_matches_static_load() {
        let (k, c) = suspension_from_sag(1_350.0, 4, 0.05, 0.9);
        let per_wheel = 1_350.0 / 4.0 * GRAVITY;
        assert!((k * 0.05 - per_wheel).abs() < 1.0);
        assert!((c - 2.0 * 0.9 * (k * 1_350.0 / 4.0).sqrt()).abs() < 1.0);
    }

    #[test]
    fn wheel_ids_round_trip_through_text() {
        for i in 0..6 {
            let id = WheelId::from_index(i);
            assert_eq!(WheelId::parse(&id.to_string()), Some(id));
        }
        assert_eq!(WheelId::parse("nope"), None);
    }

    #[test]
    fn high_slot_indices_keep_distinct_ids() {
        assert_ne!(WheelId::from_index(255), WheelId::from_index(256));
        assert_eq!(WheelId::from_index(300).to_string(), "W300");
        assert_eq!(WheelId::parse("W300"), Some(WheelId::Extra(300)));
    }

    #[test]
    fn damper_for_ratio_hits_critical_damping() {
        // ζ = 1 on k = 40 kN/m carrying a quarter of 1350 kg
        let c = damper_for_ratio(1_350.0, 4, 40_000.0, 1.0);
        let critical = 2.0 * (40_000.0_f32 * 337.5).sqrt();
        assert!((c - critical).abs() < 1e-2, "c = {c}");
        assert_eq!(damper_for_ratio(1_350.0, 4, 40_000.0, 0.0), 0.0);
    }
}
