/// Debounce state of a toggle key.
///
/// `Released -> Pressed` fires the toggle. `Pressed` decays to `Held` on the
/// next down sample and stays there, suppressing repeats, until a release
/// is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleKey {
    #[default]
    Released,
    Pressed,
    Held,
}

impl ToggleKey {
    /// Advance with this frame's key sample. Returns true when the toggle fires.
    pub fn update(&mut self, down: bool) -> bool {
        let (next, fired) = match (*self, down) {
            (_, false) => (ToggleKey::Released, false),
            (ToggleKey::Released, true) => (ToggleKey::Pressed, true),
            (ToggleKey::Pressed | ToggleKey::Held, true) => (ToggleKey::Held, false),
        };
        *self = next;
        fired
    }

    /// Advance with this frame's key level plus whether a press event
    /// arrived since the previous sample.
    ///
    /// A press seen while `Pressed` or `Held` implies a release in between,
    /// so the toggle re-arms before sampling. A press that was already
    /// released again by sampling time still counts as down for this frame.
    pub fn update_with_press(&mut self, down: bool, pressed_since_last: bool) -> bool {
        if pressed_since_last {
            *self = ToggleKey::Released;
        }
        self.update(down || pressed_since_last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_press() {
        let mut key = ToggleKey::default();
        let fired: Vec<bool> = [true, true, true, false, true]
            .into_iter()
            .map(|down| key.update(down))
            .collect();
        assert_eq!(fired, vec![true, false, false, false, true]);
    }

    #[test]
    fn state_transitions() {
        let mut key = ToggleKey::Released;
        key.update(true);
        assert_eq!(key, ToggleKey::Pressed);
        key.update(true);
        assert_eq!(key, ToggleKey::Held);
        key.update(false);
        assert_eq!(key, ToggleKey::Released);
    }

    #[test]
    fn release_while_pressed_rearms() {
        let mut key = ToggleKey::Released;
        assert!(key.update(true));
        assert!(!key.update(false));
        assert!(key.update(true));
    }

    #[test]
    fn tap_between_samples_still_fires() {
        let mut key = ToggleKey::Released;
        assert!(key.update_with_press(false, true));
        assert_eq!(key, ToggleKey::Pressed);
        assert!(!key.update_with_press(false, false));
        assert_eq!(key, ToggleKey::Released);
    }

    #[test]
    fn release_and_press_between_samples_fires_again() {
        let mut key = ToggleKey::Released;
        assert!(key.update_with_press(true, true));
        assert!(!key.update_with_press(true, false));
        assert_eq!(key, ToggleKey::Held);
        assert!(key.update_with_press(true, true));
    }
}
