//! The room vignette: a study with props that lead elsewhere.

use cgmath::Vector3;

use crate::assets::loader::{AssetRequest, Placement};
use crate::interaction::dispatch::{InteractionMap, PropEffect};

use super::{CameraPose, SceneConfig};

pub fn config() -> SceneConfig {
    let props = vec![
        AssetRequest::new(
            "room",
            "assets/models/room.obj",
            Placement::uniform(Vector3::new(0.0, 0.0, 0.0), 1.0),
        ),
        AssetRequest::new(
            "canon",
            "assets/models/canon.obj",
            Placement::uniform(Vector3::new(-1.4, 0.8, 0.75), 0.5),
        ),
        AssetRequest::new(
            "bible",
            "assets/models/bible.obj",
            Placement::uniform(Vector3::new(1.2, -0.6, 0.78), 0.6),
        ),
        AssetRequest::new(
            "desktop",
            "assets/models/desktop.obj",
            Placement::new(
                Vector3::new(0.2, 1.1, 0.8),
                Vector3::new(0.8, 0.5, 0.6),
            ),
        ),
    ];

    // Priority order doubles as click precedence for overlapping props.
    let interactions = InteractionMap::new()
        .bind("canon", PropEffect::Navigate("page2".into()))
        .bind("bible", PropEffect::Navigate("page1".into()))
        .bind("desktop", PropEffect::Navigate("goodnews".into()));

    SceneConfig {
        name: "room".into(),
        title: "the room".into(),
        environment: Some("assets/env/room.hdr".into()),
        camera: CameraPose {
            distance: 6.0,
            pitch: 0.35,
            yaw: 0.6,
            target: Vector3::new(0.0, 0.0, 0.8),
        },
        props,
        interactions,
        popup_text: String::new(),
    }
}
