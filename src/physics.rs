// src/physics.rs

use nalgebra::{Isometry3, Point3, Vector3};
use rapier3d::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

use crate::config::{DebugSettings, WorldSettings};
use crate::debug_builders::{draw_vector, push_probe_ray, push_wheel_debug, DebugOverlay};
use crate::suspension::{
    solve_suspension, GroundFilter, GroundHit, GroundQuery, SuspensionBody, SuspensionFrame,
};
use crate::terrain::ground_collider;
use crate::vehicle::{Vehicle, VehicleConfig};

pub const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
pub const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Bodies further than this from the origin are considered exploded.
const WORLD_LIMIT: f32 = 1_000.0;

// --------------------------------------------------
// Ground query against rapier's query pipeline
// --------------------------------------------------
pub struct RapierGround<'a> {
    pub query: &'a QueryPipeline,
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub exclude: Option<RigidBodyHandle>, // the chassis casting the ray
}

impl GroundQuery for RapierGround<'_> {
    fn cast_ray(
        &self,
        origin: Point3<Real>,
        direction: Vector3<Real>,
        max_distance: Real,
        filter: GroundFilter,
        ignore_triggers: bool,
    ) -> Option<GroundHit> {
        let groups = InteractionGroups::new(Group::ALL, Group::from_bits_truncate(filter.0));
        let mut query_filter = QueryFilter::default().groups(groups);
        if ignore_triggers {
            query_filter = query_filter.exclude_sensors();
        }
        if let Some(handle) = self.exclude {
            query_filter = query_filter.exclude_rigid_body(handle);
        }

        let ray = Ray::new(origin, direction);
        let (_collider, hit) = self.query.cast_ray_and_get_normal(
            self.bodies,
            self.colliders,
            &ray,
            max_distance,
            true,
            query_filter,
        )?;

        Some(GroundHit {
            distance: hit.time_of_impact,
            point: ray.point_at(hit.time_of_impact),
            normal: hit.normal,
        })
    }
}

// --------------------------------------------------
// Direct body access (no ray query borrowing the set)
// --------------------------------------------------
impl SuspensionBody for RigidBody {
    fn world_point(&self, local: &Point3<Real>) -> Point3<Real> {
        self.position() * local
    }

    fn world_vector(&self, local: &Vector3<Real>) -> Vector3<Real> {
        self.position().rotation * local
    }

    fn velocity_at_point(&self, point: &Point3<Real>) -> Vector3<Real> {
        RigidBody::velocity_at_point(self, point)
    }

    fn apply_force_at_point(&mut self, force: Vector3<Real>, point: Point3<Real>) {
        self.add_force_at_point(force, point, true);
    }

    fn reset_velocities(&mut self) {
        self.set_linvel(Vector3::zeros(), true);
        self.set_angvel(Vector3::zeros(), true);
    }
}

// --------------------------------------------------
// Kinematic snapshot: the ray query holds &RigidBodySet, so forces are
// collected here first and flushed onto the real body afterwards.
// --------------------------------------------------
pub struct BodyKinematics {
    pose: Isometry3<Real>,
    linvel: Vector3<Real>,
    angvel: Vector3<Real>,
    com: Point3<Real>, // world space
    forces: Vec<(Vector3<Real>, Point3<Real>)>,
    reset: bool,
}

impl BodyKinematics {
    pub fn capture(body: &RigidBody) -> Self {
        Self {
            pose: *body.position(),
            linvel: *body.linvel(),
            angvel: *body.angvel(),
            com: *body.center_of_mass(),
            forces: Vec::new(),
            reset: false,
        }
    }

    pub fn pending(&self) -> &[(Vector3<Real>, Point3<Real>)] {
        &self.forces
    }

    /// Replace last tick's user forces on `body` with the collected ones.
    pub fn flush(self, body: &mut RigidBody) {
        body.reset_forces(true);
        body.reset_torques(true);
        if self.reset {
            SuspensionBody::reset_velocities(body);
        }
        for (force, point) in self.forces {
            body.add_force_at_point(force, point, true);
        }
    }
}

impl SuspensionBody for BodyKinematics {
    fn world_point(&self, local: &Point3<Real>) -> Point3<Real> {
        self.pose * local
    }

    fn world_vector(&self, local: &Vector3<Real>) -> Vector3<Real> {
        self.pose.rotation * local
    }

    fn velocity_at_point(&self, point: &Point3<Real>) -> Vector3<Real> {
        let r = point - self.com;            // r = p - com
        self.linvel + self.angvel.cross(&r)  // v = v + ω × r
    }

    fn apply_force_at_point(&mut self, force: Vector3<Real>, point: Point3<Real>) {
        self.forces.push((force, point));
    }

    fn reset_velocities(&mut self) {
        self.linvel = Vector3::zeros();
        self.angvel = Vector3::zeros();
        self.reset = true;
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion (i, j, k, w)
    pub total_force: f32,
    pub grounded_wheels: usize,
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet, // for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for raycasting
    pub vehicles: HashMap<String, Vehicle>, // vehicle id → vehicle
    pub ground_filter: GroundFilter,
    pub debug: DebugSettings,
    pub debug_overlay: DebugOverlay, // for debug visualization
}

impl PhysicsWorld {
    pub fn new(world: &WorldSettings, ground_filter: GroundFilter, debug: DebugSettings) -> Self {
        let gravity = vector![0.0, world.gravity, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let ground_handle = bodies.insert(RigidBodyBuilder::fixed().build());
        let ground = ground_collider(world)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground, ground_handle, &mut bodies);

        info!(
            "🌎 Ground inserted ({:?}). Bodies = {}, Colliders = {}",
            world.terrain,
            bodies.len(),
            colliders.len()
        );

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            vehicles: HashMap::new(),
            ground_filter,
            debug,
            debug_overlay: DebugOverlay::default(),
        }
    }

    pub fn debug_snapshot(&self) -> Option<DebugOverlay> {
        self.debug.enabled.then(|| self.debug_overlay.clone())
    }

    /// Spawn a box chassis with raycast wheels and initialize it at its
    /// spawn pose.
    pub fn spawn_vehicle(&mut self, id: impl Into<String>, config: VehicleConfig) -> RigidBodyHandle {
        let id = id.into();
        let [hx, hy, hz] = config.chassis_half_extents;
        let [cx, cy, cz] = config.chassis_com_offset;
        let volume = 8.0 * hx * hy * hz;
        let density = config.mass / volume; // ρ = m / V

        let rb = RigidBodyBuilder::dynamic()
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .ccd_enabled(true)
            .build();

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .translation(vector![cx, cy, cz]) // COM offset
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
            .density(density)
            .friction(0.0)
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        info!(
            "🚗 Spawned vehicle {} at {:?} with {}/{} wheels assigned (body = {:?})",
            id,
            config.spawn,
            config.assigned_wheels(),
            config.mounts.len(),
            handle
        );

        self.vehicles.insert(
            id.clone(),
            Vehicle {
                id: id.clone(),
                body: handle,
                config,
                last_frame: SuspensionFrame::default(),
            },
        );
        self.initialize_vehicle(&id);

        handle
    }

    /// Put the vehicle back at its spawn pose at rest. Returns false if the
    /// vehicle or its body is gone.
    pub fn initialize_vehicle(&mut self, id: &str) -> bool {
        let Some(vehicle) = self.vehicles.get_mut(id) else { return false };
        let Some(body) = self.bodies.get_mut(vehicle.body) else { return false };

        let [x, y, z] = vehicle.config.spawn;
        body.set_position(Isometry::translation(x, y, z), true);
        body.reset_forces(true);
        body.reset_torques(true);
        SuspensionBody::reset_velocities(body);
        vehicle.last_frame = SuspensionFrame::default();

        debug!("Initialized vehicle {} at {:?}", id, vehicle.config.spawn);
        true
    }

    pub fn reset_all(&mut self) {
        let ids: Vec<String> = self.vehicles.keys().cloned().collect();
        for id in ids {
            self.initialize_vehicle(&id);
        }
    }

    fn apply_suspension(&mut self) {
        self.query_pipeline.update(&self.colliders);

        for vehicle in self.vehicles.values_mut() {
            let mut kinematics = self.bodies.get(vehicle.body).map(BodyKinematics::capture);

            let ground = RapierGround {
                query: &self.query_pipeline,
                bodies: &self.bodies,
                colliders: &self.colliders,
                exclude: Some(vehicle.body),
            };

            let frame = solve_suspension(
                kinematics.as_mut(),
                &vehicle.config.mounts,
                &ground,
                self.ground_filter,
                &vehicle.config.suspension,
                vehicle.config.probe_frame,
            );

            match (kinematics, self.bodies.get_mut(vehicle.body)) {
                (Some(kinematics), Some(body)) => kinematics.flush(body),
                _ => trace!("vehicle {} has no body, suspension skipped", vehicle.id),
            }

            if self.debug.enabled {
                for sample in &frame.samples {
                    push_probe_ray(&mut self.debug_overlay, sample, vehicle.config.suspension.ray_length);
                    push_wheel_debug(&mut self.debug_overlay, sample);
                }
                if let Some(body) = self.bodies.get(vehicle.body) {
                    draw_vector(
                        &mut self.debug_overlay,
                        frame.total * self.debug.scale,
                        self.debug.color,
                        Point3::from(*body.translation()),
                    );
                }
            }

            trace!(
                "{}: total = {:.1} N, grounded = {}/{}",
                vehicle.id,
                frame.total.y,
                frame.grounded_wheels(),
                frame.samples.len()
            );
            vehicle.last_frame = frame;
        }
    }

    pub fn step(&mut self, dt: Real) {
        self.debug_overlay.clear();

        // 1) Suspension forces (collected, then written onto the bodies)
        self.apply_suspension();

        // 2) Integrate
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // 3) Safety: vehicles that blew up go back to spawn
        let exploded: Vec<String> = self
            .vehicles
            .values()
            .filter(|v| {
                self.bodies.get(v.body).is_some_and(|body| {
                    let pos = body.translation();
                    pos.iter().any(|c| !c.is_finite() || c.abs() > WORLD_LIMIT)
                })
            })
            .map(|v| v.id.clone())
            .collect();

        for id in exploded {
            warn!("⚠️ Vehicle {} left the world, resetting to spawn", id);
            self.initialize_vehicle(&id);
        }
    }

    pub fn vehicle_snapshots(&self) -> Vec<VehicleSnapshot> {
        let mut out: Vec<VehicleSnapshot> = self
            .vehicles
            .values()
            .filter_map(|v| {
                let body = self.bodies.get(v.body)?;
                let iso = body.position();
                Some(VehicleSnapshot {
                    id: v.id.clone(),
                    position: iso.translation.vector.into(),
                    rotation: [iso.rotation.i, iso.rotation.j, iso.rotation.k, iso.rotation.w],
                    total_force: v.total_force(),
                    grounded_wheels: v.last_frame.grounded_wheels(),
                })
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}
