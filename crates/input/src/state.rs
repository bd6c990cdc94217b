use crate::event::{InputEvent, Key};
use crate::toggle::ToggleKey;
use glam::Vec2;
use std::collections::{BTreeMap, HashSet};

/// Turns absolute cursor positions into per-sample offsets.
///
/// The very first sample only records the position, so the camera does not
/// jump by the distance between the window origin and the cursor.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    last: Option<(f64, f64)>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sample has been seen since creation or the last reset.
    pub fn has_sample(&self) -> bool {
        self.last.is_some()
    }

    /// Offset since the previous sample. `y` is flipped so that moving the
    /// cursor up yields a positive offset.
    pub fn sample(&mut self, x: f64, y: f64) -> Vec2 {
        let (last_x, last_y) = self.last.unwrap_or((x, y));
        self.last = Some((x, y));
        Vec2::new((x - last_x) as f32, (last_y - y) as f32)
    }

    /// Forget the previous sample, e.g. after the cursor was released and
    /// recaptured somewhere else.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Polled input state for the frame loop.
///
/// Written only by the window host while it drains its event queue, read by
/// the frame loop right after. Offsets are queued in arrival order and
/// drained once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
    // Press events since the last toggle sample, even if already released.
    pressed_since_poll: HashSet<Key>,
    // Presses consumed by the latest toggle sample.
    frame_presses: HashSet<Key>,
    cursor: CursorTracker,
    look_offsets: Vec<Vec2>,
    scroll_offsets: Vec<f32>,
    toggles: BTreeMap<Key, ToggleKey>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw event into the state.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyPressed(key) => {
                self.pressed.insert(key);
                self.pressed_since_poll.insert(key);
            }
            InputEvent::KeyReleased(key) => {
                self.pressed.remove(&key);
            }
            InputEvent::CursorMoved { x, y } => {
                let first = !self.cursor.has_sample();
                let offset = self.cursor.sample(x, y);
                if !first {
                    self.look_offsets.push(offset);
                }
            }
            InputEvent::Scroll { dy } => self.scroll_offsets.push(dy),
            InputEvent::FocusLost => self.clear_keys(),
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Held now, or pressed at any point during the frame sampled by the
    /// latest [`InputState::update_toggles`]. A tap shorter than one frame
    /// still counts.
    pub fn is_down_this_frame(&self, key: Key) -> bool {
        self.pressed.contains(&key) || self.frame_presses.contains(&key)
    }

    /// Release every held key.
    pub fn clear_keys(&mut self) {
        if !self.pressed.is_empty() {
            tracing::trace!(count = self.pressed.len(), "clearing held keys");
        }
        self.pressed.clear();
        self.pressed_since_poll.clear();
        self.frame_presses.clear();
    }

    pub fn cursor_mut(&mut self) -> &mut CursorTracker {
        &mut self.cursor
    }

    /// Take the cursor offsets queued since the last drain.
    pub fn drain_look_offsets(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.look_offsets)
    }

    /// Take the scroll offsets queued since the last drain.
    pub fn drain_scroll_offsets(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.scroll_offsets)
    }

    /// Start debouncing `key` as a toggle.
    pub fn track_toggle(&mut self, key: Key) {
        self.toggles.entry(key).or_default();
    }

    pub fn toggle_state(&self, key: Key) -> Option<ToggleKey> {
        self.toggles.get(&key).copied()
    }

    /// Close the current frame's input: sample every tracked toggle against
    /// the pressed set and the presses seen since the previous call. Returns
    /// the keys whose toggle fired this frame, in key order.
    pub fn update_toggles(&mut self) -> Vec<Key> {
        self.frame_presses = std::mem::take(&mut self.pressed_since_poll);
        let pressed = &self.pressed;
        let presses = &self.frame_presses;
        self.toggles
            .iter_mut()
            .filter_map(|(key, state)| {
                state
                    .update_with_press(pressed.contains(key), presses.contains(key))
                    .then_some(*key)
            })
            .collect()
    }
}
