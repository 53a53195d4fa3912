//! Owner of every instance and of the world-space AABBs used for culling.
//!
//! ## Per-frame flow (CPU path)
//!
//! 1. [`InstanceStore::animate`] recomputes the matrices of animated instances.
//! 2. [`InstanceStore::classify`] tests every cached AABB against the frustum
//!    and writes each instance's `visible` flag.
//! 3. [`InstanceStore::compact_into`] scans in store order and packs the
//!    visible instances, stopping at the caller's capacity.
//!
//! The AABBs are computed once in [`InstanceStore::push`] from the mesh's
//! local bounds and the instance's base placement.  Animated instances only
//! spin about their own centre, so the cached box is not refreshed when they
//! rotate; for the cube this under-covers the corners by at most a factor of
//! √2 in the horizontal plane.
use glam::{Quat, Vec3};
use rand::Rng;

use super::instance::{AabbRaw, Instance, InstanceRaw, Material};
use crate::culling::{Aabb, Frustum};
use crate::transform::Transform;

/// Parameters of the procedural startup layout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScatterLayout {
    /// Total number of instances, fixed placements included.
    pub count: usize,
    /// Random positions are drawn from `[-spread, spread]` on X and Z.
    pub spread: f32,
    /// Random positions are drawn from `[-height, height]` on Y.
    pub height: f32,
    /// Number of distinct material indices to pick from.
    pub materials: u32,
}

impl Default for ScatterLayout {
    fn default() -> Self {
        Self {
            count: 20,
            spread: 8.0,
            height: 2.0,
            materials: 2,
        }
    }
}

/// Outcome of one compaction pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Instances that passed culling.
    pub visible: usize,
    /// Instances actually packed (`min(visible, capacity)`).
    pub written: usize,
}

impl Compaction {
    /// Survivors dropped because the output was full.
    #[inline]
    pub fn truncated(&self) -> usize {
        self.visible - self.written
    }
}

pub struct InstanceStore {
    instances: Vec<Instance>,
    bounds: Vec<Aabb>,
    local_bounds: Aabb,
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new(Aabb::unit_cube())
    }
}

/// The two hand-placed spinning cubes every layout starts with.
const FIXED_PLACEMENTS: [Vec3; 2] = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];

impl InstanceStore {
    /// Empty store for a mesh whose object-space bounds are `local_bounds`.
    pub fn new(local_bounds: Aabb) -> Self {
        Self {
            instances: Vec::new(),
            bounds: Vec::new(),
            local_bounds,
        }
    }

    /// Builds the startup layout: the fixed, animated placements first,
    /// then random static ones until `layout.count` is reached.
    pub fn scatter(layout: &ScatterLayout, rng: &mut impl Rng) -> Self {
        let mut store = Self::default();
        store.instances.reserve(layout.count);
        store.bounds.reserve(layout.count);

        for pos in FIXED_PLACEMENTS.iter().take(layout.count) {
            store.push(Instance::new(Transform::from_position(*pos), Material::default()).animated());
        }

        let materials = layout.materials.max(1);
        while store.len() < layout.count {
            let position = Vec3::new(
                rng.gen_range(-1.0f32..=1.0) * layout.spread,
                rng.gen_range(-1.0f32..=1.0) * layout.height,
                rng.gen_range(-1.0f32..=1.0) * layout.spread,
            );
            let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
            let placement = Transform::from_position(position).with_rotation(Quat::from_rotation_y(yaw));
            let material = Material {
                shininess: 64.0,
                uses_normal_map: rng.gen_bool(0.5),
                index: rng.gen_range(0..materials),
            };
            store.push(Instance::new(placement, material));
        }
        store
    }

    /// Adds `instance` and caches its world-space bounds; returns its index.
    pub fn push(&mut self, instance: Instance) -> usize {
        self.bounds.push(instance.placed_bounds(&self.local_bounds));
        self.instances.push(instance);
        self.instances.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    /// Cached world-space bounds, parallel to [`InstanceStore::instances`].
    #[inline]
    pub fn bounds(&self) -> &[Aabb] {
        &self.bounds
    }

    /// Spins every animated instance to `angle` radians around +Y.
    pub fn animate(&mut self, angle: f32) {
        for inst in self.instances.iter_mut().filter(|i| i.animated) {
            inst.set_angle(angle);
        }
    }

    /// Writes each instance's `visible` flag; returns how many are visible.
    pub fn classify(&mut self, frustum: &Frustum) -> usize {
        let mut visible = 0;
        for (inst, aabb) in self.instances.iter_mut().zip(&self.bounds) {
            inst.visible = frustum.intersects_aabb(aabb);
            visible += usize::from(inst.visible);
        }
        visible
    }

    /// Indices of the instances flagged visible, in store order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.instances
            .iter()
            .enumerate()
            .filter_map(|(i, inst)| inst.visible.then_some(i))
            .collect()
    }

    /// Packs the visible instances into `out` in store order, keeping at most
    /// `capacity` of them.  `out` is cleared first.
    pub fn compact_into(&self, out: &mut Vec<InstanceRaw>, capacity: usize) -> Compaction {
        out.clear();
        let mut visible = 0;
        for inst in self.instances.iter().filter(|i| i.visible) {
            visible += 1;
            if out.len() < capacity {
                out.push(inst.to_raw());
            }
        }
        Compaction {
            visible,
            written: out.len(),
        }
    }

    /// Every instance in store order (the GPU path's kernel input).
    pub fn raw_into(&self, out: &mut Vec<InstanceRaw>) {
        out.clear();
        out.extend(self.instances.iter().map(Instance::to_raw));
    }

    /// Cached bounds in the GPU layout.
    pub fn gpu_bounds(&self) -> Vec<AabbRaw> {
        self.bounds.iter().map(AabbRaw::from).collect()
    }
}
