use std::collections::VecDeque;
use vista_input::{InputEvent, InputState};

/// The window side of the frame loop.
///
/// The host owns the framebuffer size and the open/closed flag. Resize and
/// close requests are applied while events are polled, so the size read
/// after `poll_events` is current for the frame.
pub trait FrameHost {
    fn is_open(&self) -> bool;

    /// Drain pending window events, folding input into `input`.
    fn poll_events(&mut self, input: &mut InputState);

    /// Current drawable size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Request the loop to stop after the current frame.
    fn close(&mut self);

    /// Hand the finished frame to the display.
    fn swap_buffers(&mut self);
}

/// Events delivered by one `poll_events` call of a [`ScriptedHost`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedFrame {
    pub events: Vec<InputEvent>,
    pub resize: Option<(u32, u32)>,
    pub close: bool,
}

impl ScriptedFrame {
    pub fn events(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Headless host replaying a fixed script, one entry per frame.
///
/// The host closes itself when it hands out its last entry, so a script of
/// `n` entries runs exactly `n` frames.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    script: VecDeque<ScriptedFrame>,
    size: (u32, u32),
    open: bool,
    swaps: u64,
}

impl ScriptedHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            script: VecDeque::new(),
            size: (width, height),
            open: true,
            swaps: 0,
        }
    }

    pub fn push(&mut self, frame: ScriptedFrame) -> &mut Self {
        self.script.push_back(frame);
        self
    }

    /// Queue `count` frames without events.
    pub fn idle(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.script.push_back(ScriptedFrame::default());
        }
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}

impl FrameHost for ScriptedHost {
    fn is_open(&self) -> bool {
        self.open
    }

    fn poll_events(&mut self, input: &mut InputState) {
        let Some(frame) = self.script.pop_front() else {
            tracing::debug!("script exhausted; closing");
            self.open = false;
            return;
        };
        if let Some((width, height)) = frame.resize {
            tracing::debug!(width, height, "framebuffer resized");
            self.size = (width, height);
        }
        for event in frame.events {
            input.apply(event);
        }
        if frame.close || self.script.is_empty() {
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
        self.swaps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_input::Key;

    #[test]
    fn replays_one_entry_per_poll() {
        let mut host = ScriptedHost::new(800, 600);
        host.push(ScriptedFrame::events([InputEvent::KeyPressed(Key::W)]))
            .push(ScriptedFrame {
                resize: Some((1024, 768)),
                ..ScriptedFrame::default()
            });

        let mut input = InputState::new();
        host.poll_events(&mut input);
        assert!(input.is_pressed(Key::W));
        assert_eq!(host.framebuffer_size(), (800, 600));

        assert!(host.is_open());

        host.poll_events(&mut input);
        assert_eq!(host.framebuffer_size(), (1024, 768));
        assert!(!host.is_open());
    }

    #[test]
    fn scripted_close_stops_the_host() {
        let mut host = ScriptedHost::new(1, 1);
        host.push(ScriptedFrame {
            close: true,
            ..ScriptedFrame::default()
        })
        .idle(3);
        host.poll_events(&mut InputState::new());
        assert!(!host.is_open());
        assert_eq!(host.remaining(), 3);
    }
}
