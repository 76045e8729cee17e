use wgpu::Device;

use crate::assets::loader::{MeshData, ModelData, Placement};
use crate::assets::registry::PropHandle;
use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::material::{Material, MaterialManager},
    scene::object::Mesh,
};

use super::object::Object;

/// Main scene containing objects, materials, and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager,
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    /// Installs a loaded model: registers its materials, builds its
    /// meshes (computing normals when the file carried none), applies the
    /// placement, and returns the handle picking will use.
    pub fn add_model(&mut self, name: &str, data: ModelData, placement: &Placement) -> PropHandle {
        for spec in &data.materials {
            // Skip if material already exists
            if self.material_manager.get_material(&spec.name).is_some() {
                continue;
            }
            self.material_manager.add_material(Material::new(
                &spec.name,
                spec.base_color,
                spec.metallic,
                spec.roughness,
            ));
        }

        let first_material = data
            .meshes
            .first()
            .and_then(|mesh| mesh.material)
            .and_then(|id| data.materials.get(id))
            .map(|spec| spec.name.clone());

        let meshes = data.meshes.into_iter().map(build_mesh).collect();

        let mut object = Object::new(name, meshes);
        object.set_placement(placement);
        if let Some(material_name) = first_material {
            object.set_material(&material_name);
        }

        self.push_object(object)
    }

    /// Adds a fully built object and returns its handle.
    pub fn push_object(&mut self, object: Object) -> PropHandle {
        self.objects.push(object);
        PropHandle(self.objects.len() - 1)
    }

    /// Creates GPU resources for any object or material that does not
    /// have them yet. Safe to call every frame; already-initialized
    /// resources are left alone.
    pub fn sync_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut() {
            if object.gpu_resources.is_none() {
                object.init_gpu_resources(device);
            }
        }
        self.material_manager
            .update_all_gpu_resources(device, queue);
    }

    /// Gets material for rendering an object
    ///
    /// Returns the material assigned to the object, or the default
    /// material if no material is assigned or the assigned one is gone.
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.get_material_id())
    }

    pub fn get_object(&self, handle: PropHandle) -> Option<&Object> {
        self.objects.get(handle.index())
    }

    pub fn get_object_mut(&mut self, handle: PropHandle) -> Option<&mut Object> {
        self.objects.get_mut(handle.index())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

fn build_mesh(data: MeshData) -> Mesh {
    // Use normals from the file if they line up, otherwise derive them
    let normals = if !data.normals.is_empty() && data.normals.len() == data.positions.len() {
        data.normals
    } else {
        Mesh::calculate_face_normals(&data.positions, &data.indices)
    };

    Mesh::new(data.positions, normals, data.indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::loader::MaterialSpec;
    use crate::gfx::camera::{camera_controller::CameraController, orbit_camera::OrbitCamera};
    use cgmath::{Vector3, Vector4, Zero};

    fn empty_scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let manager = CameraManager::new(camera, CameraController::new(0.005, 0.1));
        Scene::new(manager)
    }

    fn triangle_model(material: Option<usize>) -> ModelData {
        ModelData {
            meshes: vec![MeshData {
                name: "tri".into(),
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                normals: Vec::new(),
                indices: vec![0, 1, 2],
                material,
            }],
            materials: vec![MaterialSpec {
                name: "paper".into(),
                base_color: [0.9, 0.9, 0.8, 1.0],
                metallic: 0.0,
                roughness: 0.75,
            }],
        }
    }

    #[test]
    fn test_add_model_registers_material_and_handle() {
        let mut scene = empty_scene();
        let placement = Placement::uniform(Vector3::new(0.0, 1.0, 0.0), 2.0);

        let handle = scene.add_model("letter", triangle_model(Some(0)), &placement);

        let object = scene.get_object(handle).expect("object should exist");
        assert_eq!(object.name, "letter");
        assert_eq!(object.get_material_id().map(String::as_str), Some("paper"));
        assert!(scene.material_manager.get_material("paper").is_some());

        // Placement applied: origin vertex lands at the position.
        let origin = object.transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_add_model_without_material_uses_default() {
        let mut scene = empty_scene();
        let placement = Placement::uniform(Vector3::zero(), 1.0);
        let handle = scene.add_model("bare", triangle_model(None), &placement);

        let object = scene.get_object(handle).unwrap();
        assert!(object.get_material_id().is_none());
        assert_eq!(scene.get_material_for_object(object).name, "Default");
    }

    #[test]
    fn test_missing_normals_are_derived() {
        let mut scene = empty_scene();
        let placement = Placement::uniform(Vector3::zero(), 1.0);
        let handle = scene.add_model("tri", triangle_model(None), &placement);

        let object = scene.get_object(handle).unwrap();
        let normal = object.meshes[0].vertices()[0].normal;
        assert!((normal[2] - 1.0).abs() < 1e-5);
    }
}
