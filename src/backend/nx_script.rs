//! Parser for line-oriented Switch TAS scripts.
//!
//! Each line holds the inputs for one frame:
//!
//! ```text
//! 12 KEY_A;KEY_ZR 0;32767 -1200;0
//! ```
//!
//! Fields are the frame number, `;`-separated key names (or `NONE`), and
//! the cartesian `x;y` position of the left and right sticks. Frames
//! without a line have no inputs. Blank lines and lines starting with
//! `//` or `#` are ignored.
//!
//! Parsing is lazy: lines are only interpreted when the frame they
//! describe is requested, so a long script can start playing at once.

use tracing::{debug, warn};

use super::{ScriptBackend, ScriptError};
use crate::input::{Button, FrameIndex, InputState, StickState};

/// Keyword for a frame that holds no buttons.
const NO_KEYS: &str = "NONE";

/// Largest accepted stick axis value.
const AXIS_LIMIT: i32 = 32767;

/// Cursor-based parser for NX TAS scripts.
#[derive(Debug, Default)]
pub struct NxScriptParser {
    lines: Vec<String>,
    /// Index of the next line that has not been consumed
    cursor: usize,
    /// Frame number of the last consumed line
    last_frame: Option<FrameIndex>,
    inputs: InputState,
}

impl NxScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with `source` loaded.
    pub fn with_script(source: &str) -> Self {
        let mut parser = Self::new();
        parser.set_script(source);
        parser
    }

    /// Number of lines that describe frames (ignoring blanks and comments).
    pub fn frame_line_count(&self) -> usize {
        self.lines.iter().filter(|l| !is_ignored(l)).count()
    }

    /// Advance the cursor past blank and comment lines.
    fn skip_ignored(&mut self) {
        while self
            .lines
            .get(self.cursor)
            .is_some_and(|line| is_ignored(line))
        {
            self.cursor += 1;
        }
    }

    fn consume(&mut self, frame: FrameIndex) {
        self.cursor += 1;
        self.last_frame = Some(frame);
    }

    fn seek(&mut self, index: FrameIndex) -> bool {
        loop {
            self.skip_ignored();
            let Some(line) = self.lines.get(self.cursor) else {
                return false;
            };
            let line_no = self.cursor + 1;

            let frame = match parse_frame_number(line, line_no) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed script line");
                    self.cursor += 1;
                    continue;
                }
            };

            if let Some(previous) = self.last_frame {
                if frame <= previous {
                    let e = ScriptError::OutOfOrder {
                        line: line_no,
                        frame,
                        previous,
                    };
                    warn!(error = %e, "Skipping malformed script line");
                    self.cursor += 1;
                    continue;
                }
            }

            if frame > index {
                return false;
            }
            if frame < index {
                debug!(frame, requested = index, "Passing over earlier script line");
                self.consume(frame);
                continue;
            }

            let parsed = parse_inputs(line, line_no, &mut self.inputs);
            self.consume(frame);
            return match parsed {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to parse script line");
                    self.inputs.clear();
                    false
                }
            };
        }
    }
}

impl ScriptBackend for NxScriptParser {
    fn set_script(&mut self, source: &str) {
        self.lines = source.lines().map(str::to_string).collect();
        self.skip_ignored();
    }

    fn get_frame(&mut self, index: FrameIndex) -> bool {
        let found = self.seek(index);
        self.skip_ignored();
        found
    }

    fn inputs_this_frame(&self) -> &InputState {
        &self.inputs
    }

    fn is_done(&self) -> bool {
        self.cursor >= self.lines.len()
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.last_frame = None;
        self.inputs.clear();
        self.skip_ignored();
    }
}

fn is_ignored(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#')
}

fn parse_frame_number(line: &str, line_no: usize) -> Result<FrameIndex, ScriptError> {
    let value = line.split_whitespace().next().unwrap_or_default();
    value.parse().map_err(|_| ScriptError::InvalidFrame {
        line: line_no,
        value: value.to_string(),
    })
}

/// Parse the key and stick fields of `line` into `out`.
fn parse_inputs(line: &str, line_no: usize, out: &mut InputState) -> Result<(), ScriptError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(ScriptError::FieldCount {
            line: line_no,
            found: fields.len(),
        });
    }

    out.clear();
    if fields[1] != NO_KEYS {
        for key in fields[1].split(';').filter(|k| !k.is_empty()) {
            let button = Button::from_key_name(key).ok_or_else(|| ScriptError::UnknownKey {
                line: line_no,
                key: key.to_string(),
            })?;
            out.buttons.push(button);
        }
    }
    out.left_stick = parse_stick(fields[2], line_no)?;
    out.right_stick = parse_stick(fields[3], line_no)?;
    Ok(())
}

fn parse_stick(value: &str, line_no: usize) -> Result<StickState, ScriptError> {
    let invalid = || ScriptError::InvalidStick {
        line: line_no,
        value: value.to_string(),
    };
    let (x, y) = value.split_once(';').ok_or_else(invalid)?;
    let x: i32 = x.trim().parse().map_err(|_| invalid())?;
    let y: i32 = y.trim().parse().map_err(|_| invalid())?;
    if !(-AXIS_LIMIT..=AXIS_LIMIT).contains(&x) || !(-AXIS_LIMIT..=AXIS_LIMIT).contains(&y) {
        return Err(invalid());
    }
    Ok(StickState::from_cartesian(x, y))
}
