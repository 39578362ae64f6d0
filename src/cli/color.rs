use owo_colors::OwoColorize;

use ranno::routing::RiskLevel;
use ranno::ui::Style;

/// Color helper with a single policy shared across commands.
///
/// All functions return `String`; colors apply only when `enabled`.
pub struct Colors {
    pub enabled: bool,
}

impl Colors {
    pub fn new(style: &Style) -> Self {
        Self {
            enabled: style.color,
        }
    }

    fn paint(&self, s: &str, f: impl Fn(&str) -> String) -> String {
        if self.enabled { f(s) } else { s.to_string() }
    }

    pub fn ok(&self, s: impl AsRef<str>) -> String {
        self.paint(s.as_ref(), |s| s.green().to_string())
    }

    pub fn err(&self, s: impl AsRef<str>) -> String {
        self.paint(s.as_ref(), |s| s.red().to_string())
    }

    pub fn warn(&self, s: impl AsRef<str>) -> String {
        self.paint(s.as_ref(), |s| s.yellow().to_string())
    }

    pub fn info(&self, s: impl AsRef<str>) -> String {
        self.paint(s.as_ref(), |s| s.cyan().to_string())
    }

    pub fn dim(&self, s: impl AsRef<str>) -> String {
        self.paint(s.as_ref(), |s| s.bright_black().to_string())
    }

    pub fn origin(&self, s: impl AsRef<str>) -> String {
        self.err(s)
    }

    pub fn destination(&self, s: impl AsRef<str>) -> String {
        self.ok(s)
    }

    /// Low green, medium yellow, high red. Unestimated risk stays dim.
    pub fn risk(&self, level: RiskLevel, estimated: bool, txt: impl AsRef<str>) -> String {
        if !estimated {
            return self.dim(txt);
        }
        match level {
            RiskLevel::Low => self.ok(txt),
            RiskLevel::Medium => self.warn(txt),
            RiskLevel::High => self.err(txt),
        }
    }
}
