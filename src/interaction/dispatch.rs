//! Click → effect dispatch
//!
//! Each scene declares a fixed [`InteractionMap`] from prop names to
//! effects. On a click the dispatcher walks the map in declaration order
//! and performs exactly one effect for the first bound prop the pick ray
//! intersected; everything after it is ignored for that click.

use crate::interaction::picking::PropHit;

/// What clicking a prop does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropEffect {
    /// Leave this scene for the named destination.
    Navigate(String),
    /// Show the scene's popup. Showing is idempotent; the popup closes
    /// only through its own close control, never by further scene clicks.
    ShowPopup,
}

/// Ordered prop-name → effect bindings. Declaration order is priority
/// order: when several bound props are intersected at once, the earliest
/// binding wins.
#[derive(Debug, Clone, Default)]
pub struct InteractionMap {
    bindings: Vec<(String, PropEffect)>,
}

impl InteractionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, effect: PropEffect) -> Self {
        self.bindings.push((name.into(), effect));
        self
    }

    pub fn effect_for(&self, name: &str) -> Option<&PropEffect> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, effect)| effect)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropEffect)> {
        self.bindings
            .iter()
            .map(|(name, effect)| (name.as_str(), effect))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Visibility and content of the scene popup.
#[derive(Debug, Clone, Default)]
pub struct PopupState {
    text: String,
    visible: bool,
}

impl PopupState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: false,
        }
    }

    /// Idempotent: showing an already-visible popup is a no-op, not a
    /// toggle.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// The one way to dismiss the popup.
    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What a click ended up doing, reported to the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Navigated(String),
    PopupShown,
}

/// Maps pick results to at most one effect per click.
pub struct InteractionDispatcher {
    map: InteractionMap,
    popup: PopupState,
}

impl InteractionDispatcher {
    pub fn new(map: InteractionMap, popup_text: impl Into<String>) -> Self {
        Self {
            map,
            popup: PopupState::new(popup_text),
        }
    }

    /// Click handler. First binding with a hit wins; no hit on any bound
    /// prop means no effect at all.
    pub fn dispatch(&mut self, hits: &[PropHit]) -> Option<DispatchOutcome> {
        for (name, effect) in self.map.iter() {
            if hits.iter().any(|hit| hit.name == name) {
                return Some(match effect {
                    PropEffect::Navigate(target) => {
                        log::info!("prop '{}' clicked, navigating to '{}'", name, target);
                        DispatchOutcome::Navigated(target.clone())
                    }
                    PropEffect::ShowPopup => {
                        log::info!("prop '{}' clicked, showing popup", name);
                        self.popup.show();
                        DispatchOutcome::PopupShown
                    }
                });
            }
        }
        None
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    pub fn popup_mut(&mut self) -> &mut PopupState {
        &mut self.popup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(name: &str, distance: f32) -> PropHit {
        PropHit {
            name: name.into(),
            distance,
        }
    }

    fn room_map() -> InteractionMap {
        InteractionMap::new()
            .bind("canon", PropEffect::Navigate("page2".into()))
            .bind("bible", PropEffect::Navigate("page1".into()))
            .bind("desktop", PropEffect::Navigate("goodnews".into()))
    }

    #[test]
    fn test_single_hit_navigates() {
        let mut dispatcher = InteractionDispatcher::new(room_map(), "");
        let outcome = dispatcher.dispatch(&[hit("bible", 3.0)]);
        assert_eq!(outcome, Some(DispatchOutcome::Navigated("page1".into())));
    }

    #[test]
    fn test_priority_order_wins_over_distance() {
        let mut dispatcher = InteractionDispatcher::new(room_map(), "");
        // "bible" is nearer, but "canon" is bound earlier.
        let outcome = dispatcher.dispatch(&[hit("bible", 1.0), hit("canon", 4.0)]);
        assert_eq!(outcome, Some(DispatchOutcome::Navigated("page2".into())));
    }

    #[test]
    fn test_no_hits_no_effect() {
        let mut dispatcher = InteractionDispatcher::new(room_map(), "");
        assert_eq!(dispatcher.dispatch(&[]), None);
        assert_eq!(dispatcher.dispatch(&[hit("lamp", 2.0)]), None);
        assert!(!dispatcher.popup().is_visible());
    }

    #[test]
    fn test_popup_show_is_idempotent() {
        let map = InteractionMap::new().bind("letter", PropEffect::ShowPopup);
        let mut dispatcher = InteractionDispatcher::new(map, "good news");

        assert_eq!(
            dispatcher.dispatch(&[hit("letter", 2.0)]),
            Some(DispatchOutcome::PopupShown)
        );
        assert!(dispatcher.popup().is_visible());

        // Second identical click shows again; it must not toggle off.
        assert_eq!(
            dispatcher.dispatch(&[hit("letter", 2.0)]),
            Some(DispatchOutcome::PopupShown)
        );
        assert!(dispatcher.popup().is_visible());
    }

    #[test]
    fn test_popup_closes_only_explicitly() {
        let map = InteractionMap::new().bind("letter", PropEffect::ShowPopup);
        let mut dispatcher = InteractionDispatcher::new(map, "good news");
        dispatcher.dispatch(&[hit("letter", 2.0)]);

        // A scene click that hits nothing leaves the popup alone.
        dispatcher.dispatch(&[]);
        assert!(dispatcher.popup().is_visible());

        dispatcher.popup_mut().close();
        assert!(!dispatcher.popup().is_visible());
        assert_eq!(dispatcher.popup().text(), "good news");
    }
}
