//! Controller input types
//!
//! Contains `InputState` (the buttons and sticks held during one frame),
//! the `FrameInput` value delivered to the driver on every tick, and the
//! flat integer list layout used by the compression codec.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a logical video frame within a script.
pub type FrameIndex = u32;

/// Maximum stick magnitude (matches the signed 16-bit axis range).
pub const MAX_STICK_POWER: u16 = 32767;

/// Digital buttons of the console controller.
///
/// Wire ids start at 1; id 0 is reserved for the frame index in
/// encoded input lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    X,
    Y,
    L,
    R,
    ZL,
    ZR,
    Plus,
    Minus,
    DLeft,
    DUp,
    DRight,
    DDown,
}

impl Button {
    /// All buttons in wire-id order.
    pub const ALL: [Button; 14] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::L,
        Button::R,
        Button::ZL,
        Button::ZR,
        Button::Plus,
        Button::Minus,
        Button::DLeft,
        Button::DUp,
        Button::DRight,
        Button::DDown,
    ];

    /// Wire id used in encoded input lists (1..=14).
    pub fn id(self) -> u32 {
        match self {
            Button::A => 1,
            Button::B => 2,
            Button::X => 3,
            Button::Y => 4,
            Button::L => 5,
            Button::R => 6,
            Button::ZL => 7,
            Button::ZR => 8,
            Button::Plus => 9,
            Button::Minus => 10,
            Button::DLeft => 11,
            Button::DUp => 12,
            Button::DRight => 13,
            Button::DDown => 14,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        if id == 0 {
            return None;
        }
        Self::ALL.get(id as usize - 1).copied()
    }

    /// Key name as written in scripts (`KEY_A`, `KEY_DLEFT`, ...).
    pub fn key_name(self) -> &'static str {
        match self {
            Button::A => "KEY_A",
            Button::B => "KEY_B",
            Button::X => "KEY_X",
            Button::Y => "KEY_Y",
            Button::L => "KEY_L",
            Button::R => "KEY_R",
            Button::ZL => "KEY_ZL",
            Button::ZR => "KEY_ZR",
            Button::Plus => "KEY_PLUS",
            Button::Minus => "KEY_MINUS",
            Button::DLeft => "KEY_DLEFT",
            Button::DUp => "KEY_DUP",
            Button::DRight => "KEY_DRIGHT",
            Button::DDown => "KEY_DDOWN",
        }
    }

    pub fn from_key_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.key_name() == name)
    }

    /// Short label used in traces.
    pub fn label(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::L => "L",
            Button::R => "R",
            Button::ZL => "ZL",
            Button::ZR => "ZR",
            Button::Plus => "Plus",
            Button::Minus => "Minus",
            Button::DLeft => "Left",
            Button::DUp => "Up",
            Button::DRight => "Right",
            Button::DDown => "Down",
        }
    }
}

/// Which analog stick a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

/// Analog stick reading in polar form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickState {
    /// Magnitude, 0..=32767
    pub power: u16,
    /// Direction in whole degrees, 0..360 (0 = right, counter-clockwise)
    pub angle: u16,
}

impl StickState {
    pub fn new(power: u16, angle: u16) -> Self {
        Self {
            power: power.min(MAX_STICK_POWER),
            angle: angle % 360,
        }
    }

    /// Convert cartesian axis values to a polar reading.
    pub fn from_cartesian(x: i32, y: i32) -> Self {
        let (fx, fy) = (x as f64, y as f64);
        let power = fx.hypot(fy).round().min(MAX_STICK_POWER as f64) as u16;
        if power == 0 {
            return Self::default();
        }
        let degrees = fy.atan2(fx).to_degrees().rem_euclid(360.0).round() as u16;
        Self::new(power, degrees)
    }

    pub fn is_neutral(&self) -> bool {
        self.power == 0
    }
}

/// Everything held on the controller during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// Active buttons, in script order
    pub buttons: Vec<Button>,
    pub left_stick: StickState,
    pub right_stick: StickState,
}

impl InputState {
    pub fn new(buttons: Vec<Button>, left_stick: StickState, right_stick: StickState) -> Self {
        Self {
            buttons,
            left_stick,
            right_stick,
        }
    }

    /// State with only the given buttons held and both sticks neutral.
    pub fn with_buttons(buttons: &[Button]) -> Self {
        Self {
            buttons: buttons.to_vec(),
            ..Self::default()
        }
    }

    /// Reset to nothing held, keeping the button allocation.
    pub fn clear(&mut self) {
        self.buttons.clear();
        self.left_stick = StickState::default();
        self.right_stick = StickState::default();
    }

    /// Flatten into the codec's integer list.
    ///
    /// Layout: `[frame, button_count, buttons.., lpower, langle, rpower, rangle]`
    pub fn to_words(&self, frame: FrameIndex) -> Vec<u32> {
        let mut words = Vec::with_capacity(self.buttons.len() + 6);
        words.push(frame);
        words.push(self.buttons.len() as u32);
        words.extend(self.buttons.iter().map(|b| b.id()));
        words.push(self.left_stick.power as u32);
        words.push(self.left_stick.angle as u32);
        words.push(self.right_stick.power as u32);
        words.push(self.right_stick.angle as u32);
        words
    }

    /// Rebuild a frame index and state from the codec's integer list.
    pub fn from_words(words: &[u32]) -> Option<(FrameIndex, Self)> {
        let (&frame, rest) = words.split_first()?;
        let (&count, rest) = rest.split_first()?;
        let count = count as usize;
        if rest.len() != count + 4 {
            return None;
        }
        let buttons = rest[..count]
            .iter()
            .map(|&id| Button::from_id(id))
            .collect::<Option<Vec<_>>>()?;
        let sticks = &rest[count..];
        let stick = |power: u32, angle: u32| -> Option<StickState> {
            let power = u16::try_from(power).ok()?;
            let angle = u16::try_from(angle).ok()?;
            Some(StickState::new(power, angle))
        };
        Some((
            frame,
            Self {
                buttons,
                left_stick: stick(sticks[0], sticks[1])?,
                right_stick: stick(sticks[2], sticks[3])?,
            },
        ))
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.buttons.is_empty() {
            write!(f, "-")?;
        } else {
            let labels: Vec<&str> = self.buttons.iter().map(|b| b.label()).collect();
            write!(f, "{}", labels.join("+"))?;
        }
        write!(
            f,
            " | L {}@{} | R {}@{}",
            self.left_stick.power,
            self.left_stick.angle,
            self.right_stick.power,
            self.right_stick.angle
        )
    }
}

/// Value delivered to the driver on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameInput {
    /// Nothing changes this tick (not the same as "script ended")
    NoInput,
    /// Inputs to hold this tick
    Input(InputState),
}

impl FrameInput {
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }

    pub fn as_input(&self) -> Option<&InputState> {
        match self {
            Self::Input(state) => Some(state),
            Self::NoInput => None,
        }
    }
}

impl fmt::Display for FrameInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInput => write!(f, "no input"),
            Self::Input(state) => write!(f, "{}", state),
        }
    }
}
