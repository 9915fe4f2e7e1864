//! Console echo of written log lines
//!
//! Echo is a side channel: the writer reports echo failures through tracing and never
//! fails a write because of them.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::QueueableCommand;
use serde::{Deserialize, Serialize};

/// Standard console foreground colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsoleColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    #[default]
    White,
}

impl ConsoleColor {
    pub const ALL: [ConsoleColor; 16] = [
        ConsoleColor::Black,
        ConsoleColor::DarkBlue,
        ConsoleColor::DarkGreen,
        ConsoleColor::DarkCyan,
        ConsoleColor::DarkRed,
        ConsoleColor::DarkMagenta,
        ConsoleColor::DarkYellow,
        ConsoleColor::Gray,
        ConsoleColor::DarkGray,
        ConsoleColor::Blue,
        ConsoleColor::Green,
        ConsoleColor::Cyan,
        ConsoleColor::Red,
        ConsoleColor::Magenta,
        ConsoleColor::Yellow,
        ConsoleColor::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleColor::Black => "Black",
            ConsoleColor::DarkBlue => "DarkBlue",
            ConsoleColor::DarkGreen => "DarkGreen",
            ConsoleColor::DarkCyan => "DarkCyan",
            ConsoleColor::DarkRed => "DarkRed",
            ConsoleColor::DarkMagenta => "DarkMagenta",
            ConsoleColor::DarkYellow => "DarkYellow",
            ConsoleColor::Gray => "Gray",
            ConsoleColor::DarkGray => "DarkGray",
            ConsoleColor::Blue => "Blue",
            ConsoleColor::Green => "Green",
            ConsoleColor::Cyan => "Cyan",
            ConsoleColor::Red => "Red",
            ConsoleColor::Magenta => "Magenta",
            ConsoleColor::Yellow => "Yellow",
            ConsoleColor::White => "White",
        }
    }

    /// Terminal color for this console color
    ///
    /// crossterm's unprefixed names are the bright variants, so `Gray` maps to `Grey`
    /// and `DarkGray` to `DarkGrey`.
    pub fn to_crossterm(self) -> Color {
        match self {
            ConsoleColor::Black => Color::Black,
            ConsoleColor::DarkBlue => Color::DarkBlue,
            ConsoleColor::DarkGreen => Color::DarkGreen,
            ConsoleColor::DarkCyan => Color::DarkCyan,
            ConsoleColor::DarkRed => Color::DarkRed,
            ConsoleColor::DarkMagenta => Color::DarkMagenta,
            ConsoleColor::DarkYellow => Color::DarkYellow,
            ConsoleColor::Gray => Color::Grey,
            ConsoleColor::DarkGray => Color::DarkGrey,
            ConsoleColor::Blue => Color::Blue,
            ConsoleColor::Green => Color::Green,
            ConsoleColor::Cyan => Color::Cyan,
            ConsoleColor::Red => Color::Red,
            ConsoleColor::Magenta => Color::Magenta,
            ConsoleColor::Yellow => Color::Yellow,
            ConsoleColor::White => Color::White,
        }
    }
}

impl fmt::Display for ConsoleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsoleColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ConsoleColor::ALL
            .iter()
            .copied()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(wanted)
                    // Accept the British spelling crossterm uses
                    || c.as_str().replace("Gray", "Grey").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("unknown console color '{}'", s))
    }
}

/// Destination for echoed log lines
pub trait ConsoleSink {
    fn echo(&self, line: &str, color: ConsoleColor) -> io::Result<()>;
}

/// Writes colored lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl ConsoleSink for TerminalSink {
    fn echo(&self, line: &str, color: ConsoleColor) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.queue(SetForegroundColor(color.to_crossterm()))?
            .queue(Print(line))?
            .queue(ResetColor)?
            .queue(Print("\n"))?;
        out.flush()
    }
}

/// Collects echoed lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(String, ConsoleColor)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All echoed lines with their colors, oldest first
    pub fn lines(&self) -> Vec<(String, ConsoleColor)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ConsoleSink for MemorySink {
    fn echo(&self, line: &str, color: ConsoleColor) -> io::Result<()> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((line.to_string(), color));
        }
        Ok(())
    }
}
