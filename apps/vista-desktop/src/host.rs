use std::sync::Arc;
use vista_frame::FrameHost;
use vista_input::{InputEvent, InputState, Key};
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window};

/// Pixels of a trackpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F1 => Some(Key::F1),
        _ => None,
    }
}

/// A winit window seen through the frame loop's host contract.
///
/// winit pushes events as they arrive; they are queued here and only folded
/// into the input state when the loop polls. Resize and close requests are
/// held back the same way.
pub struct WinitHost {
    window: Arc<Window>,
    queue: Vec<InputEvent>,
    size: (u32, u32),
    pending_size: Option<(u32, u32)>,
    close_requested: bool,
    open: bool,
    cursor_grabbed: bool,
    /// Cursor position integrated from raw motion while the cursor is grabbed.
    virtual_cursor: (f64, f64),
}

impl WinitHost {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        let mut host = Self {
            window,
            queue: Vec::new(),
            size: (size.width, size.height),
            pending_size: None,
            close_requested: false,
            open: true,
            cursor_grabbed: false,
            virtual_cursor: (0.0, 0.0),
        };
        host.grab_cursor();
        host
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Hide and capture the cursor for mouse look. Falls back to plain
    /// cursor events where the platform refuses both grab modes.
    fn grab_cursor(&mut self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                self.cursor_grabbed = true;
            }
            Err(e) => {
                tracing::warn!("cursor grab unavailable, using cursor events: {e}");
                self.cursor_grabbed = false;
            }
        }
    }

    pub fn on_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => {
                self.pending_size = Some((size.width, size.height));
            }
            WindowEvent::Focused(false) => self.queue.push(InputEvent::FocusLost),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(*code) {
                    self.queue.push(match state {
                        ElementState::Pressed => InputEvent::KeyPressed(key),
                        ElementState::Released => InputEvent::KeyReleased(key),
                    });
                }
            }
            WindowEvent::CursorMoved { position, .. } if !self.cursor_grabbed => {
                self.queue.push(InputEvent::CursorMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.queue.push(InputEvent::Scroll { dy });
            }
            _ => {}
        }
    }

    pub fn on_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.cursor_grabbed {
                self.virtual_cursor.0 += delta.0;
                self.virtual_cursor.1 += delta.1;
                self.queue.push(InputEvent::CursorMoved {
                    x: self.virtual_cursor.0,
                    y: self.virtual_cursor.1,
                });
            }
        }
    }
}

impl FrameHost for WinitHost {
    fn is_open(&self) -> bool {
        self.open
    }

    fn poll_events(&mut self, input: &mut InputState) {
        if let Some(size) = self.pending_size.take() {
            tracing::debug!(width = size.0, height = size.1, "window resized");
            self.size = size;
        }
        for event in self.queue.drain(..) {
            input.apply(event);
        }
        if self.close_requested {
            self.open = false;
        }
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn swap_buffers(&mut self) {
        self.window.request_redraw();
    }
}
