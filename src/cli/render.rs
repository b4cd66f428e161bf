//! Terminal rendering of coach output

use crate::markup::{self, Segment, TagKind};
use crate::preferences::Theme;
use crate::runtime::RenderEvent;
use crate::state_machine::{Control, MessageType, Render, Sender, Surface};
use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

/// Colors for one applied theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub user: Color,
    pub coach: Color,
    pub accent: Color,
    pub code: Color,
    pub muted: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(applied: Theme) -> Self {
        match applied {
            Theme::Dark | Theme::System => Self {
                user: Color::Cyan,
                coach: Color::White,
                accent: Color::Yellow,
                code: Color::Green,
                muted: Color::DarkGrey,
                error: Color::Red,
            },
            Theme::Light => Self {
                user: Color::DarkBlue,
                coach: Color::Black,
                accent: Color::DarkMagenta,
                code: Color::DarkGreen,
                muted: Color::Grey,
                error: Color::DarkRed,
            },
            // Monochrome
            Theme::Focus => Self {
                user: Color::White,
                coach: Color::White,
                accent: Color::White,
                code: Color::Grey,
                muted: Color::DarkGrey,
                error: Color::White,
            },
            Theme::Chill => Self {
                user: Color::Rgb { r: 180, g: 160, b: 255 },
                coach: Color::Rgb { r: 230, g: 225, b: 240 },
                accent: Color::Rgb { r: 255, g: 180, b: 220 },
                code: Color::Rgb { r: 160, g: 220, b: 200 },
                muted: Color::Rgb { r: 120, g: 110, b: 140 },
                error: Color::Rgb { r: 255, g: 120, b: 140 },
            },
        }
    }
}

/// Line-oriented view driven by [`RenderEvent`]s
pub struct TerminalView<W: Write> {
    out: W,
    palette: Palette,
    surface: Surface,
    input_enabled: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        Self {
            out,
            palette,
            surface: Surface::ProblemEntry,
            input_enabled: true,
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn apply(&mut self, event: &RenderEvent) -> io::Result<()> {
        let RenderEvent::Render(render) = event else {
            return Ok(());
        };
        match render {
            Render::AppendMessage {
                sender: Sender::User,
                text,
                ..
            } => {
                let prefix = "you ›".with(self.palette.user).bold();
                writeln!(self.out, "{prefix} {}", text.as_str().with(self.palette.user))?;
            }
            Render::AppendMessage {
                sender: Sender::Coach,
                text,
                message_type,
            } => self.write_coach(text, *message_type)?,
            Render::AppendMessage {
                sender: Sender::System,
                text,
                ..
            } => {
                let label = "coach ›".with(self.palette.accent).bold();
                writeln!(self.out, "{label} {}", text.as_str().with(self.palette.error))?;
            }
            Render::ShowLoading => {
                writeln!(self.out, "{}", "Thinking...".with(self.palette.muted).italic())?;
            }
            Render::ClearLoading | Render::ClearInputs => {}
            Render::ShowSurface { surface } => {
                self.surface = *surface;
                self.write_surface_hint()?;
            }
            Render::SetEnabled {
                control: Control::ProblemInput | Control::ConversationInput,
                enabled,
            } => self.input_enabled = *enabled,
            Render::SetEnabled { .. } => {}
        }
        self.out.flush()
    }

    /// Front-end message that is not part of the conversation
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text.with(self.palette.muted).italic())?;
        self.out.flush()
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text.with(self.palette.error))?;
        self.out.flush()
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "{}",
            "Hint Coach".with(self.palette.accent).bold()
        )?;
        self.notice("Type /help for commands.")?;
        self.write_surface_hint()
    }

    pub fn help(&mut self) -> io::Result<()> {
        let lines = [
            ("<text>", "problem name when idle, otherwise a message to the coach"),
            ("...\\", "end a line with a backslash to keep typing"),
            ("/context <text>", "context sent with the next problem"),
            ("/another", "ask for another hint"),
            ("/hint /analyze /suggest /explain /optimize", "quick actions"),
            ("/new", "start a new problem"),
            ("/timer [start|pause|reset|<time>]", "pomodoro timer, e.g. 25, 1:30, 2.5"),
            ("/theme [system|light|dark|focus|chill]", "show or change the theme"),
            ("/quit", "exit"),
        ];
        for (command, description) in lines {
            writeln!(
                self.out,
                "  {} {}",
                command.with(self.palette.accent),
                description.with(self.palette.muted)
            )?;
        }
        self.out.flush()
    }

    /// Prompt for the next line on the current surface
    pub fn prompt_text(&self) -> &'static str {
        match self.surface {
            Surface::ProblemEntry => "problem> ",
            Surface::Conversation => "> ",
        }
    }

    fn write_surface_hint(&mut self) -> io::Result<()> {
        let hint = match self.surface {
            Surface::ProblemEntry => {
                "Enter a problem name to get your first hint (optionally /context first)."
            }
            Surface::Conversation => {
                "Ask a follow-up, use /another for a new hint, or /new to switch problems."
            }
        };
        self.notice(hint)
    }

    fn write_coach(&mut self, text: &str, message_type: MessageType) -> io::Result<()> {
        let label = match message_type {
            MessageType::General => "coach ›".to_string(),
            other => format!("coach [{other}] ›"),
        };
        write!(self.out, "{} ", label.with(self.palette.accent).bold())?;

        let palette = self.palette;
        for segment in markup::parse(text) {
            match segment {
                Segment::Text(text) => write!(self.out, "{}", text.with(palette.coach))?,
                Segment::InlineCode(code) => write!(self.out, "{}", code.with(palette.code))?,
                Segment::CodeBlock(code) => {
                    writeln!(self.out)?;
                    for line in code.lines() {
                        writeln!(self.out, "    {}", line.with(palette.code))?;
                    }
                }
                Segment::Callout { kind, body } => write!(
                    self.out,
                    "{} {}",
                    kind.label().with(palette.accent).bold(),
                    body.with(palette.coach)
                )?,
                Segment::Tag { kind, text } => {
                    let color = match kind {
                        TagKind::TimeComplexity => palette.accent,
                        TagKind::SpaceComplexity => palette.code,
                        TagKind::Algorithm => palette.user,
                    };
                    write!(self.out, "{}", text.with(color).underlined())?;
                }
            }
        }
        writeln!(self.out)
    }
}

#[cfg(test)]
impl TerminalView<Vec<u8>> {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}
