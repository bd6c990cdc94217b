use crate::event::Key;
use crate::state::InputState;
use std::collections::BTreeMap;
use vista_common::CameraMovement;

/// A high-level action resolved from the polled input state.
///
/// The frame loop consumes actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Step the camera in a direction for this frame's delta time.
    Move(CameraMovement),
    /// Request the window to close.
    Quit,
    /// Flip HDR tone mapping on or off.
    ToggleHdr,
    /// Raise exposure at the configured rate.
    ExposureUp,
    /// Lower exposure at the configured rate.
    ExposureDown,
    /// Show or hide the debug overlay.
    ToggleOverlay,
}

/// Key to action table.
///
/// Held bindings yield their action on every frame the key is down; toggle
/// bindings only on the frame their debounce state fires.
#[derive(Debug, Clone)]
pub struct Bindings {
    held: BTreeMap<Key, Action>,
    toggles: BTreeMap<Key, Action>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind_held(Key::W, Action::Move(CameraMovement::Forward));
        bindings.bind_held(Key::S, Action::Move(CameraMovement::Backward));
        bindings.bind_held(Key::A, Action::Move(CameraMovement::Left));
        bindings.bind_held(Key::D, Action::Move(CameraMovement::Right));
        bindings.bind_held(Key::Escape, Action::Quit);
        bindings.bind_held(Key::Q, Action::ExposureDown);
        bindings.bind_held(Key::E, Action::ExposureUp);
        bindings.bind_toggle(Key::Space, Action::ToggleHdr);
        bindings.bind_toggle(Key::F1, Action::ToggleOverlay);
        bindings
    }
}

impl Bindings {
    pub fn empty() -> Self {
        Self {
            held: BTreeMap::new(),
            toggles: BTreeMap::new(),
        }
    }

    pub fn bind_held(&mut self, key: Key, action: Action) {
        self.toggles.remove(&key);
        self.held.insert(key, action);
    }

    pub fn bind_toggle(&mut self, key: Key, action: Action) {
        self.held.remove(&key);
        self.toggles.insert(key, action);
    }

    /// Register every toggle key with the input state's debouncer.
    pub fn install(&self, input: &mut InputState) {
        for key in self.toggles.keys() {
            input.track_toggle(*key);
        }
    }

    /// Resolve this frame's actions: held bindings for keys down this frame
    /// in key order, followed by the toggles that fired.
    pub fn resolve(&self, input: &InputState, toggled: &[Key]) -> Vec<Action> {
        let held = self
            .held
            .iter()
            .filter(|(key, _)| input.is_down_this_frame(**key))
            .map(|(_, action)| *action);
        let fired = toggled.iter().filter_map(|key| self.toggles.get(key).copied());
        held.chain(fired).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputEvent;

    #[test]
    fn wasd_maps_to_camera_movement() {
        let bindings = Bindings::default();
        let mut input = InputState::new();
        input.apply(InputEvent::KeyPressed(Key::W));
        input.apply(InputEvent::KeyPressed(Key::D));
        let actions = bindings.resolve(&input, &[]);
        assert_eq!(
            actions,
            vec![
                Action::Move(CameraMovement::Forward),
                Action::Move(CameraMovement::Right),
            ]
        );
    }

    #[test]
    fn escape_quits() {
        let bindings = Bindings::default();
        let mut input = InputState::new();
        input.apply(InputEvent::KeyPressed(Key::Escape));
        assert_eq!(bindings.resolve(&input, &[]), vec![Action::Quit]);
    }

    #[test]
    fn toggles_resolve_only_when_fired() {
        let bindings = Bindings::default();
        let mut input = InputState::new();
        bindings.install(&mut input);
        input.apply(InputEvent::KeyPressed(Key::Space));

        let toggled = input.update_toggles();
        assert_eq!(bindings.resolve(&input, &toggled), vec![Action::ToggleHdr]);

        let toggled = input.update_toggles();
        assert!(bindings.resolve(&input, &toggled).is_empty());
    }

    #[test]
    fn rebinding_moves_key_between_tables() {
        let mut bindings = Bindings::empty();
        bindings.bind_toggle(Key::Q, Action::ToggleOverlay);
        bindings.bind_held(Key::Q, Action::ExposureDown);

        let mut input = InputState::new();
        bindings.install(&mut input);
        assert_eq!(input.toggle_state(Key::Q), None);

        input.apply(InputEvent::KeyPressed(Key::Q));
        assert_eq!(bindings.resolve(&input, &[Key::Q]), vec![Action::ExposureDown]);
    }
}
