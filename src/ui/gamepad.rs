/// Gamepad input tracker using gilrs.
///
/// At most one pad is active. The first pad seen becomes active; when the
/// active pad is unplugged the next one to connect (or press a button)
/// takes over. Events from any other pad are ignored.
///
/// Button mapping is loaded from `[input] buttons` in config.toml, one
/// button name per character. Default mapping:
///   A / B / X / Y   →  characters 1 / 2 / 3 / 4
///   Start           →  Restart (after the round ends)
///   Select          →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Button, EventType, Gilrs};

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Device-independent view of one gilrs event.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PadEvent {
    Connected,
    Disconnected,
    Pressed(Btn),
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Id of the active pad.
    active: Option<usize>,

    /// Activation buttons, indexed by character.
    bindings: Vec<Option<Btn>>,

    /// Buttons the active pad pressed since the last update.
    pressed: Vec<Btn>,
}

impl GamepadState {
    pub fn new(button_names: &[String]) -> Self {
        let bindings = button_names.iter()
            .map(|name| {
                let btn = Btn::from_name(name);
                if btn.is_none() {
                    log::warn!("unknown gamepad button '{name}' in [input] buttons");
                }
                btn
            })
            .collect();

        #[cfg(feature = "gamepad")]
        let (gilrs, active) = match Gilrs::new() {
            Ok(g) => {
                let first = g.gamepads().next().map(|(id, pad)| {
                    log::info!("gamepad attached: {} (#{id})", pad.name());
                    usize::from(id)
                });
                (Some(g), first)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, None)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let active = None;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            active,
            bindings,
            pressed: Vec::with_capacity(4),
        }
    }

    pub fn update(&mut self) {
        self.pressed.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            let pad = match event.event {
                EventType::Connected => PadEvent::Connected,
                EventType::Disconnected => PadEvent::Disconnected,
                EventType::ButtonPressed(btn, _) => match Btn::from_gilrs(btn) {
                    Some(b) => PadEvent::Pressed(b),
                    None => continue,
                },
                _ => continue,
            };
            self.handle(usize::from(event.id), pad);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn handle(&mut self, id: usize, event: PadEvent) {
        match event {
            PadEvent::Connected => {
                if self.active.is_none() {
                    log::info!("gamepad attached (#{id})");
                    self.active = Some(id);
                }
            }
            PadEvent::Disconnected => {
                if self.active == Some(id) {
                    log::info!("gamepad detached (#{id})");
                    self.active = None;
                    self.pressed.clear();
                }
            }
            PadEvent::Pressed(btn) => {
                if self.active.is_none() {
                    self.active = Some(id);
                }
                if self.active == Some(id) {
                    self.pressed.push(btn);
                }
            }
        }
    }

    /// Character indices activated since the last update, in press order.
    pub fn activations(&self) -> Vec<usize> {
        self.pressed.iter()
            .filter_map(|btn| self.bindings.iter().position(|b| *b == Some(*btn)))
            .collect()
    }

    pub fn restart_pressed(&self) -> bool {
        self.pressed.contains(&Btn::Start)
    }

    pub fn quit_pressed(&self) -> bool {
        self.pressed.contains(&Btn::Select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        let names: Vec<String> = ["A", "B", "X", "Y"].iter().map(|s| s.to_string()).collect();
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            active: None,
            bindings: names.iter().map(|n| Btn::from_name(n)).collect(),
            pressed: vec![],
        }
    }

    #[test]
    fn button_names_parse() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn first_attached_pad_is_active() {
        let mut p = pad();
        p.handle(3, PadEvent::Connected);
        p.handle(5, PadEvent::Connected);
        assert_eq!(p.active, Some(3));
        p.handle(5, PadEvent::Pressed(Btn::A));
        assert!(p.activations().is_empty());
        p.handle(3, PadEvent::Pressed(Btn::X));
        assert_eq!(p.activations(), vec![2]);
    }

    #[test]
    fn detach_of_other_pad_is_ignored() {
        let mut p = pad();
        p.handle(1, PadEvent::Connected);
        p.handle(2, PadEvent::Disconnected);
        assert_eq!(p.active, Some(1));
        p.handle(1, PadEvent::Disconnected);
        assert!(p.active.is_none());
        p.handle(2, PadEvent::Connected);
        assert_eq!(p.active, Some(2));
    }

    #[test]
    fn unmapped_buttons_activate_nobody() {
        let mut p = pad();
        p.handle(0, PadEvent::Pressed(Btn::L2));
        p.handle(0, PadEvent::Pressed(Btn::Start));
        assert!(p.activations().is_empty());
        assert!(p.restart_pressed());
        assert!(!p.quit_pressed());
    }
}
