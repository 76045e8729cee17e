//! The goodnews vignette: a desk with a letter that opens when clicked.

use cgmath::Vector3;

use crate::assets::loader::{AssetRequest, Placement};
use crate::interaction::dispatch::{InteractionMap, PropEffect};

use super::{CameraPose, SceneConfig};

const LETTER_TEXT: &str = "Good news!\n\n\
    The waiting is over: everything you hoped for arrived this morning, \
    all at once, the way spring does. Come home when you can.\n\n\
    \u{2014} M.";

pub fn config() -> SceneConfig {
    let props = vec![
        AssetRequest::new(
            "study",
            "assets/models/study.obj",
            Placement::uniform(Vector3::new(0.0, 0.0, 0.0), 1.0),
        ),
        AssetRequest::new(
            "letter",
            "assets/models/letter.obj",
            Placement::new(
                Vector3::new(0.0, 0.3, 0.82),
                Vector3::new(0.7, 0.5, 0.7),
            ),
        ),
    ];

    let interactions = InteractionMap::new().bind("letter", PropEffect::ShowPopup);

    SceneConfig {
        name: "goodnews".into(),
        title: "good news".into(),
        environment: Some("assets/env/goodnews.hdr".into()),
        camera: CameraPose {
            distance: 4.0,
            pitch: 0.5,
            yaw: -0.4,
            target: Vector3::new(0.0, 0.2, 0.8),
        },
        props,
        interactions,
        popup_text: LETTER_TEXT.into(),
    }
}
