//! Scene session
//!
//! One [`SceneSession`] owns everything stateful about a running
//! vignette: the loader pump for its asset batch, the readiness gate,
//! the prop registry, the picker, and the dispatcher. Navigation tears
//! the session down and begins a fresh one, so nothing about loading or
//! interaction leaks across scenes.

use std::time::Instant;

use crate::assets::loader::AssetLoader;
use crate::assets::readiness::ReadinessGate;
use crate::assets::registry::{PropHandle, PropRegistry};
use crate::gfx::scene::Scene;
use crate::interaction::dispatch::{DispatchOutcome, InteractionDispatcher, PopupState};
use crate::interaction::picking::{PointerNdc, PropHit, ScenePicker};
use crate::scenes::SceneConfig;

/// What happened during one pump of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A prop finished loading and is now pickable.
    PropLoaded(String),
    /// A load failed; the scene will stay in the loading state forever.
    LoadFailed(String),
    /// The one-shot reveal: hide the loading UI, start drawing the scene.
    Revealed,
}

pub struct SceneSession {
    config: SceneConfig,
    loader: AssetLoader,
    gate: ReadinessGate,
    registry: PropRegistry,
    picker: ScenePicker,
    dispatcher: InteractionDispatcher,
    failed: bool,
}

impl SceneSession {
    /// Fires the whole asset batch for `config` and returns the session
    /// tracking it.
    pub fn begin(config: SceneConfig, now: Instant) -> Self {
        let expected = config.props.len();
        log::info!("scene '{}': loading {} assets", config.name, expected);

        let loader = AssetLoader::start_batch(config.props.clone());
        let gate = ReadinessGate::new(expected, now);
        let dispatcher =
            InteractionDispatcher::new(config.interactions.clone(), config.popup_text.clone());

        Self {
            config,
            loader,
            gate,
            registry: PropRegistry::new(),
            picker: ScenePicker::new(),
            dispatcher,
            failed: false,
        }
    }

    /// Drains finished loads into the scene and advances the gate.
    /// Called once per frame from the event loop; this is the only place
    /// session state mutates, so completions are serialized by
    /// construction.
    pub fn pump(&mut self, scene: &mut Scene, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        for completion in self.loader.poll() {
            let name = completion.request.name;
            match completion.result {
                Ok(data) => {
                    let handle =
                        scene.add_model(&name, data, &completion.request.placement);
                    if self.registry.insert(&name, handle) {
                        self.gate.on_asset_complete(now);
                        log::info!(
                            "prop '{}' loaded ({}/{})",
                            name,
                            self.gate.state().completed(),
                            self.gate.state().expected()
                        );
                        events.push(SessionEvent::PropLoaded(name));
                    }
                }
                Err(err) => {
                    log::error!("{}", err);
                    self.failed = true;
                    events.push(SessionEvent::LoadFailed(name));
                }
            }
        }

        if self.gate.take_reveal(now) {
            log::info!("scene '{}' ready", self.config.name);
            events.push(SessionEvent::Revealed);
        }

        events
    }

    /// Fresh pick against the current registry. Used for both move and
    /// click events; the ray is always rebuilt from the event's own
    /// coordinates, never reused from a previous event.
    pub fn pick(&mut self, pointer: PointerNdc, scene: &Scene) -> Vec<PropHit> {
        self.picker
            .pick(pointer, &scene.camera_manager.camera, scene, &self.registry)
    }

    /// Click handler: fresh pick, then at most one dispatched effect.
    pub fn click(&mut self, pointer: PointerNdc, scene: &Scene) -> Option<DispatchOutcome> {
        let hits = self.pick(pointer, scene);
        self.dispatcher.dispatch(&hits)
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// True once the reveal notification has fired; gates scene drawing.
    pub fn revealed(&self) -> bool {
        self.gate.revealed()
    }

    pub fn progress(&self) -> f32 {
        self.gate.progress()
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn registry(&self) -> &PropRegistry {
        &self.registry
    }

    pub fn handle_of(&self, name: &str) -> Option<PropHandle> {
        self.registry.get(name)
    }

    pub fn popup(&self) -> &PopupState {
        self.dispatcher.popup()
    }

    pub fn popup_mut(&mut self) -> &mut PopupState {
        self.dispatcher.popup_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::loader::tests::{write_cube_obj, write_triangle_obj};
    use crate::assets::loader::{AssetRequest, Placement};
    use crate::assets::readiness::REVEAL_DELAY;
    use crate::interaction::dispatch::PropEffect;
    use crate::gfx::camera::{
        camera_controller::CameraController, camera_utils::CameraManager,
        orbit_camera::OrbitCamera,
    };
    use crate::interaction::dispatch::InteractionMap;
    use crate::scenes::CameraPose;
    use cgmath::{Vector3, Zero};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let manager = CameraManager::new(camera, CameraController::new(0.005, 0.1));
        Scene::new(manager)
    }

    fn test_config(props: Vec<AssetRequest>) -> SceneConfig {
        SceneConfig {
            name: "test".into(),
            title: "test".into(),
            environment: None,
            camera: CameraPose {
                distance: 5.0,
                pitch: 0.4,
                yaw: 0.2,
                target: Vector3::zero(),
            },
            props,
            interactions: InteractionMap::new(),
            popup_text: String::new(),
        }
    }

    fn request(name: &str, path: PathBuf) -> AssetRequest {
        AssetRequest::new(name, path, Placement::uniform(Vector3::zero(), 1.0))
    }

    /// Pumps until `expected` terminal events arrive or the deadline
    /// passes, returning events in arrival order.
    fn pump_until(
        session: &mut SceneSession,
        scene: &mut Scene,
        now: Instant,
        expected: usize,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while events.len() < expected {
            assert!(Instant::now() < deadline, "session stalled");
            events.extend(session.pump(scene, now));
            std::thread::yield_now();
        }
        events
    }

    #[test]
    fn test_full_batch_progress_and_reveal() {
        let paths: Vec<_> = ["room", "canon", "bible", "desktop"]
            .iter()
            .map(|name| write_triangle_obj(name))
            .collect();
        let props = vec![
            request("room", paths[0].clone()),
            request("canon", paths[1].clone()),
            request("bible", paths[2].clone()),
            request("desktop", paths[3].clone()),
        ];

        let t0 = Instant::now();
        let mut session = SceneSession::begin(test_config(props), t0);
        let mut scene = test_scene();

        assert_eq!(session.progress(), 0.0);
        let events = pump_until(&mut session, &mut scene, t0, 4);

        assert!(events
            .iter()
            .all(|e| matches!(e, SessionEvent::PropLoaded(_))));
        assert!(session.is_ready());
        assert_eq!(session.progress(), 1.0);
        assert_eq!(scene.object_count(), 4);
        assert!(session.registry().contains("canon"));

        // Ready but not yet revealed: the delay has not elapsed.
        assert!(!session.revealed());
        let later = t0 + REVEAL_DELAY + Duration::from_millis(100);
        assert_eq!(session.pump(&mut scene, later), vec![SessionEvent::Revealed]);
        assert!(session.revealed());

        // Reveal is one-shot.
        assert!(session.pump(&mut scene, later).is_empty());

        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn test_failed_load_blocks_readiness_forever() {
        let good = write_triangle_obj("good");
        let props = vec![
            request("room", good.clone()),
            request("ghost", PathBuf::from("/missing/model.obj")),
        ];

        let t0 = Instant::now();
        let mut session = SceneSession::begin(test_config(props), t0);
        let mut scene = test_scene();

        let events = pump_until(&mut session, &mut scene, t0, 2);
        assert!(events.contains(&SessionEvent::PropLoaded("room".into())));
        assert!(events.contains(&SessionEvent::LoadFailed("ghost".into())));

        assert!(session.has_failed());
        assert!(!session.is_ready());
        assert!(session.progress() < 1.0);

        // No reveal, no matter how long we wait.
        let much_later = t0 + REVEAL_DELAY * 100;
        assert!(session.pump(&mut scene, much_later).is_empty());
        assert!(!session.revealed());

        let _ = std::fs::remove_file(good);
    }

    #[test]
    fn test_click_letter_shows_popup_idempotently() {
        let path = write_cube_obj("letter_click");
        let mut config = test_config(vec![request("letter", path.clone())]);
        config.interactions = InteractionMap::new().bind("letter", PropEffect::ShowPopup);
        config.popup_text = "good news".into();

        let t0 = Instant::now();
        let mut session = SceneSession::begin(config, t0);
        let mut scene = test_scene();
        pump_until(&mut session, &mut scene, t0, 1);
        let later = t0 + REVEAL_DELAY + Duration::from_millis(50);
        assert_eq!(session.pump(&mut scene, later), vec![SessionEvent::Revealed]);

        // Camera looks at the origin, so the screen center hits the cube.
        let center = PointerNdc::from_device(512.0, 384.0, 1024.0, 768.0);
        assert_eq!(
            session.click(center, &scene),
            Some(DispatchOutcome::PopupShown)
        );
        assert!(session.popup().is_visible());

        // An identical second click shows again; never a toggle.
        assert_eq!(
            session.click(center, &scene),
            Some(DispatchOutcome::PopupShown)
        );
        assert!(session.popup().is_visible());

        // Clicking empty space leaves the popup alone.
        let corner = PointerNdc::from_device(1.0, 1.0, 1024.0, 768.0);
        assert_eq!(session.click(corner, &scene), None);
        assert!(session.popup().is_visible());

        session.popup_mut().close();
        assert!(!session.popup().is_visible());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_empty_batch_reveals_after_delay() {
        let t0 = Instant::now();
        let mut session = SceneSession::begin(test_config(Vec::new()), t0);
        let mut scene = test_scene();

        assert!(session.is_ready());
        assert!(session.pump(&mut scene, t0).is_empty());

        let later = t0 + REVEAL_DELAY + Duration::from_millis(50);
        assert_eq!(session.pump(&mut scene, later), vec![SessionEvent::Revealed]);
    }
}
