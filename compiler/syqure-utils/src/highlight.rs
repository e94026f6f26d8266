//! Terminal highlighting for messages that the driver prints, i.e. log level
//! prefixes and reported errors.
use std::{fmt, ops::BitOr};

use crate::{stream::CompilerOutputStream, stream_writeln};

const RESET: &str = "\u{001b}[0m";

/// Foreground colours that a message can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
}

/// Text effects that can be combined with a [Colour].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Bold,
    Underline,
}

/// A [Colour] paired with a [Modifier], produced by `Colour | Modifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub colour: Colour,
    pub modifier: Modifier,
}

impl BitOr<Modifier> for Colour {
    type Output = Decoration;

    fn bitor(self, modifier: Modifier) -> Self::Output {
        Decoration { colour: self, modifier }
    }
}

impl BitOr<Colour> for Modifier {
    type Output = Decoration;

    fn bitor(self, colour: Colour) -> Self::Output {
        Decoration { colour, modifier: self }
    }
}

/// Anything that knows which ANSI escape sequence starts its effect.
pub trait Highlighter {
    fn write_escape(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Highlighter for Colour {
    fn write_escape(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Colour::Red => 31,
            Colour::Green => 32,
            Colour::Yellow => 33,
            Colour::Blue => 34,
            Colour::Magenta => 35,
        };

        write!(f, "\u{001b}[{code};1m")
    }
}

impl Highlighter for Modifier {
    fn write_escape(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Bold => f.write_str("\u{001b}[1m"),
            Modifier::Underline => f.write_str("\u{001b}[4m"),
        }
    }
}

impl Highlighter for Decoration {
    fn write_escape(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.colour.write_escape(f)?;
        self.modifier.write_escape(f)
    }
}

/// A message wrapped in a [Highlighter], rendered lazily.
pub struct Highlighted<H, T> {
    highlighter: H,
    message: T,
}

impl<H: Highlighter, T: fmt::Display> fmt::Display for Highlighted<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.highlighter.write_escape(f)?;
        write!(f, "{}{RESET}", self.message)
    }
}

/// Apply the given [Highlighter] to `message`, resetting the effect at the end
/// of the message.
pub fn highlight<H: Highlighter, T: fmt::Display>(highlighter: H, message: T) -> Highlighted<H, T> {
    Highlighted { highlighter, message }
}

/// Write `message` to `stream` as an `error:` line.
pub fn report_error(mut stream: CompilerOutputStream, message: impl fmt::Display) {
    stream_writeln!(
        stream,
        "{}: {}",
        highlight(Colour::Red | Modifier::Bold, "error"),
        highlight(Modifier::Bold, message)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoration_applies_colour_then_modifier() {
        let rendered = highlight(Colour::Red | Modifier::Bold, "error").to_string();
        assert_eq!(rendered, "\u{001b}[31;1m\u{001b}[1merror\u{001b}[0m");
    }

    #[test]
    fn errors_are_prefixed() {
        let stream = CompilerOutputStream::owned();
        report_error(stream.clone(), "no such file");

        let contents = stream.contents().unwrap();
        assert!(contents.starts_with("\u{001b}[31;1m\u{001b}[1merror\u{001b}[0m: "));
        assert!(contents.ends_with("no such file\u{001b}[0m\n"));
    }

    #[test]
    fn modifier_order_does_not_matter() {
        assert_eq!(Modifier::Underline | Colour::Blue, Colour::Blue | Modifier::Underline);
    }
}
