/// Keyboard input tracker.
///
/// Each configured key activates one character (key `i` → character `i`).
/// Activations are edge-triggered: holding a key, or the terminal's
/// auto-repeat, does not jump again until the key has been released.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
/// In that mode a held key fires once more when the terminal's auto-repeat
/// starts, and two taps closer together than `HOLD_TIMEOUT` count as one.
/// The timeout is kept short so a double-tap spin still registers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events. Longer than the
/// usual auto-repeat interval, shorter than a deliberate double-tap.
const HOLD_TIMEOUT: Duration = Duration::from_millis(75);

/// Parse a config key name: a single character, or one of a few named keys.
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }
    match name.to_lowercase().as_str() {
        "space" => Some(KeyCode::Char(' ')),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    /// Activation keys, indexed by character.
    bindings: Vec<Option<KeyCode>>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new(key_names: &[String]) -> Self {
        let bindings: Vec<Option<KeyCode>> = key_names.iter()
            .map(|name| {
                let code = key_from_name(name);
                if code.is_none() {
                    log::warn!("unknown key name '{name}' in [input] keys");
                }
                code
            })
            .collect();
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            bindings,
            honor_release: false,
        }
    }

    /// Ask the terminal for Release events. Call after raw mode is on.
    pub fn enable_release_events(&mut self) {
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
            self.honor_release = execute!(std::io::stdout(), PushKeyboardEnhancementFlags(flags)).is_ok();
        }
        log::info!("key release events: {}", self.honor_release);
    }

    pub fn restore(&self) {
        if self.honor_release {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            // Without confirmed enhancement, rely on timeout-based expiry.
            KeyEventKind::Release => {}
            // A reported repeat is never a fresh press.
            KeyEventKind::Repeat if self.honor_release => {
                self.last_active.insert(code, now);
            }
            _ => {
                let was_held = self.last_active.get(&code)
                    .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT);
                self.last_active.insert(code, now);
                if !was_held {
                    self.fresh_presses.push(code);
                }
            }
        }
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&normalize(code))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Character indices activated this frame, in press order.
    pub fn activations(&self) -> Vec<usize> {
        self.fresh_presses.iter()
            .filter_map(|code| self.bindings.iter().position(|b| *b == Some(*code)))
            .collect()
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(&[KeyCode::Esc, KeyCode::Char('q')]) || self.ctrl_c_pressed()
    }

    pub fn restart_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Char('r'))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Letters compare case-insensitively so Shift or Caps Lock don't unbind keys.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
