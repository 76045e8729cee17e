//! # Vignette Configurations
//!
//! Each scene is described statically: the model batch to load (with
//! placements), the camera's starting pose, the interaction bindings,
//! the popup text, and an optional environment panorama. The app turns a
//! config into a live session and navigation targets back into configs.

use std::path::PathBuf;

use cgmath::Vector3;

use crate::assets::loader::AssetRequest;
use crate::interaction::dispatch::InteractionMap;

pub mod goodnews;
pub mod room;

/// Starting pose for the orbit camera.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: Vector3<f32>,
}

/// Static description of one vignette.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Stable identifier, also a navigation target.
    pub name: String,
    /// Window title shown while the scene is up.
    pub title: String,
    pub environment: Option<PathBuf>,
    pub camera: CameraPose,
    pub props: Vec<AssetRequest>,
    pub interactions: InteractionMap,
    pub popup_text: String,
}

/// Resolves a navigation target to a scene config, when one exists here.
pub fn by_name(name: &str) -> Option<SceneConfig> {
    match name {
        "room" => Some(room::config()),
        "goodnews" => Some(goodnews::config()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_scenes_resolve() {
        assert!(by_name("room").is_some());
        assert!(by_name("goodnews").is_some());
        assert!(by_name("page7").is_none());
    }

    #[test]
    fn test_interactions_reference_declared_props() {
        for config in [room::config(), goodnews::config()] {
            for (name, _) in config.interactions.iter() {
                assert!(
                    config.props.iter().any(|request| request.name == name),
                    "scene '{}' binds unknown prop '{}'",
                    config.name,
                    name
                );
            }
        }
    }

    #[test]
    fn test_prop_names_are_unique() {
        for config in [room::config(), goodnews::config()] {
            let mut names: Vec<_> = config.props.iter().map(|r| r.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), config.props.len());
        }
    }

    #[test]
    fn test_placements_are_finite() {
        for config in [room::config(), goodnews::config()] {
            for request in &config.props {
                assert!(request.placement.is_finite(), "{}", request.name);
            }
        }
    }

    #[test]
    fn test_goodnews_has_popup_text() {
        assert!(!goodnews::config().popup_text.is_empty());
    }
}
