//! # Prop Picking
//!
//! Mouse-ray picking against the registered props of a scene.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: Convert device pixel coordinates to normalized
//!    device coordinates using the live viewport size
//! 2. **NDC to Ray**: Unproject the near and far plane points through the
//!    inverse view-projection to get a world-space ray
//! 3. **Ray vs props**: Test the ray against the bounding boxes of every
//!    mesh of every registered prop, keeping the nearest hit per prop
//!
//! Props whose loads have not finished are simply absent from the registry
//! and are skipped without error. Given identical camera state, viewport
//! and pointer coordinates, results are exactly reproducible.

use std::cmp::Ordering;
use std::collections::HashMap;

use cgmath::{
    ElementWise, EuclideanSpace, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero,
};

use crate::assets::registry::PropRegistry;
use crate::gfx::{camera::orbit_camera::OrbitCamera, scene::Scene};

/// Pointer position in normalized device coordinates, both axes in [-1, 1]
/// with +y up. Recomputed from scratch for every event; never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerNdc {
    pub x: f32,
    pub y: f32,
}

impl PointerNdc {
    /// Converts device pixel coordinates against the current viewport.
    pub fn from_device(px: f32, py: f32, width: f32, height: f32) -> Self {
        Self {
            x: (px / width) * 2.0 - 1.0,
            y: -(py / height) * 2.0 + 1.0,
        }
    }
}

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::new(vertex[0], vertex[1], vertex[2]);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    /// Slab test. Returns the distance to the entry point (or to the exit
    /// point when the origin is inside the box), None on a miss.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Transforms all 8 corners and rebuilds the bounds around them.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut transformed = Vec::with_capacity(8);
        for corner in &corners {
            let homogeneous = Vector4::new(corner.x, corner.y, corner.z, 1.0);
            let out = matrix * homogeneous;
            transformed.push([out.x / out.w, out.y / out.w, out.z / out.w]);
        }

        Self::from_vertices(&transformed)
    }
}

/// One registered prop intersected by the pick ray.
#[derive(Debug, Clone, PartialEq)]
pub struct PropHit {
    pub name: String,
    /// Distance from the ray origin to the nearest intersection.
    pub distance: f32,
}

/// What the OS cursor should look like given the current pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Pointer,
}

/// Pointer hint policy for move events: anything under the cursor means a
/// pointer cursor. Must be re-evaluated on every move event.
pub fn cursor_hint(hits: &[PropHit]) -> CursorHint {
    if hits.is_empty() {
        CursorHint::Default
    } else {
        CursorHint::Pointer
    }
}

/// Picker over the registered props of a scene
pub struct ScenePicker {
    /// Mesh-local bounds cached per object handle; transforms are applied
    /// per query since placements are fixed after installation.
    cached_bounds: HashMap<usize, Vec<Aabb>>,
}

impl ScenePicker {
    pub fn new() -> Self {
        Self {
            cached_bounds: HashMap::new(),
        }
    }

    /// Builds a world-space ray through the pointer from the camera.
    pub fn screen_to_ray(pointer: PointerNdc, camera: &OrbitCamera) -> Ray {
        let eye = cgmath::Point3::from_vec(camera.eye);
        let target = cgmath::Point3::from_vec(camera.target);
        let view = Matrix4::look_at_rh(eye, target, camera.up);
        let proj = cgmath::perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar);

        let inv_view_proj = (proj * view).invert().unwrap_or(Matrix4::from_scale(1.0));

        let near = inv_view_proj * Vector4::new(pointer.x, pointer.y, -1.0, 1.0);
        let far = inv_view_proj * Vector4::new(pointer.x, pointer.y, 1.0, 1.0);

        let near = Vector3::new(near.x / near.w, near.y / near.w, near.z / near.w);
        let far = Vector3::new(far.x / far.w, far.y / far.w, far.z / far.w);

        Ray::new(near, far - near)
    }

    /// Tests the pointer ray against every registered prop, all of its
    /// meshes included, and returns per-prop nearest hits sorted by
    /// ascending distance. Names without a loaded object are skipped.
    pub fn pick(
        &mut self,
        pointer: PointerNdc,
        camera: &OrbitCamera,
        scene: &Scene,
        registry: &PropRegistry,
    ) -> Vec<PropHit> {
        let ray = Self::screen_to_ray(pointer, camera);
        let mut hits = Vec::new();

        for (name, handle) in registry.iter() {
            let Some(object) = scene.get_object(handle) else {
                continue;
            };

            let bounds = self.cached_bounds.entry(handle.index()).or_insert_with(|| {
                object
                    .meshes
                    .iter()
                    .map(|mesh| {
                        let positions: Vec<[f32; 3]> =
                            mesh.vertices().iter().map(|v| v.position).collect();
                        Aabb::from_vertices(&positions)
                    })
                    .collect()
            });

            let mut nearest: Option<f32> = None;
            for aabb in bounds.iter() {
                let world = aabb.transform(&object.transform);
                if let Some(distance) = world.intersect_ray(&ray) {
                    nearest = Some(nearest.map_or(distance, |n: f32| n.min(distance)));
                }
            }

            if let Some(distance) = nearest {
                hits.push(PropHit {
                    name: name.to_string(),
                    distance,
                });
            }
        }

        // Distance then name, so equal-distance hits stay reproducible.
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hits
    }

    /// Drops cached bounds (call when the scene is rebuilt).
    pub fn invalidate(&mut self) {
        self.cached_bounds.clear();
    }
}

impl Default for ScenePicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::registry::PropHandle;
    use crate::gfx::camera::{camera_controller::CameraController, camera_utils::CameraManager};
    use crate::gfx::scene::object::{Mesh, Object};

    fn unit_cube_mesh() -> Mesh {
        // Axis-aligned cube spanning [-0.5, 0.5]^3, corners only; the
        // bounds are what picking consumes.
        let positions = vec![
            -0.5, -0.5, -0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, -0.5, -0.5, -0.5, 0.5,
            0.5, -0.5, 0.5, 0.5, 0.5, 0.5, -0.5, 0.5, 0.5,
        ];
        let normals = vec![0.0; positions.len()];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Mesh::new(positions, normals, indices)
    }

    fn test_scene_with(name: &str) -> (Scene, PropRegistry) {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1024.0 / 768.0);
        let manager = CameraManager::new(camera, CameraController::new(0.005, 0.1));
        let mut scene = Scene::new(manager);

        let mut object = Object::new(name, vec![unit_cube_mesh()]);
        object.transform = Matrix4::identity();
        let handle = scene.push_object(object);

        let mut registry = PropRegistry::new();
        registry.insert(name, handle);
        (scene, registry)
    }

    #[test]
    fn test_aabb_from_vertices() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = Aabb::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let hit = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&hit).is_some());

        let miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&miss).is_none());
    }

    #[test]
    fn test_screen_center_maps_to_ndc_origin() {
        let ndc = PointerNdc::from_device(512.0, 384.0, 1024.0, 768.0);
        assert_eq!(ndc.x, 0.0);
        assert_eq!(ndc.y, 0.0);

        let corner = PointerNdc::from_device(0.0, 0.0, 1024.0, 768.0);
        assert_eq!(corner.x, -1.0);
        assert_eq!(corner.y, 1.0);
    }

    #[test]
    fn test_center_pick_hits_prop_on_axis() {
        let (scene, registry) = test_scene_with("letter");
        let mut picker = ScenePicker::new();

        let hits = picker.pick(
            PointerNdc::from_device(512.0, 384.0, 1024.0, 768.0),
            &scene.camera_manager.camera,
            &scene,
            &registry,
        );

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "letter");
        assert!(hits[0].distance > 0.0);
    }

    #[test]
    fn test_pick_is_deterministic() {
        let (scene, registry) = test_scene_with("canon");
        let mut picker = ScenePicker::new();
        let pointer = PointerNdc::from_device(512.0, 384.0, 1024.0, 768.0);

        let first = picker.pick(pointer, &scene.camera_manager.camera, &scene, &registry);
        let second = picker.pick(pointer, &scene.camera_manager.camera, &scene, &registry);

        assert_eq!(first, second);
    }

    #[test]
    fn test_unloaded_props_are_skipped() {
        let (scene, mut registry) = test_scene_with("canon");
        // "letter" never finished loading: registered name, no object.
        registry.insert("letter", PropHandle(99));
        let mut picker = ScenePicker::new();

        let hits = picker.pick(
            PointerNdc::from_device(512.0, 384.0, 1024.0, 768.0),
            &scene.camera_manager.camera,
            &scene,
            &registry,
        );

        assert!(hits.iter().all(|hit| hit.name != "letter"));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_offscreen_pointer_misses() {
        let (scene, registry) = test_scene_with("bible");
        let mut picker = ScenePicker::new();

        let hits = picker.pick(
            PointerNdc::from_device(0.0, 0.0, 1024.0, 768.0),
            &scene.camera_manager.camera,
            &scene,
            &registry,
        );

        assert!(hits.is_empty());
        assert_eq!(cursor_hint(&hits), CursorHint::Default);
    }

    #[test]
    fn test_cursor_hint_follows_hits() {
        assert_eq!(cursor_hint(&[]), CursorHint::Default);
        let hit = PropHit {
            name: "letter".into(),
            distance: 2.0,
        };
        assert_eq!(cursor_hint(&[hit]), CursorHint::Pointer);
    }
}
