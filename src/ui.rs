use owo_colors::OwoColorize;

#[derive(Clone, Copy, Debug)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub emoji: bool,
    pub color: bool,
}

impl Default for Style {
    fn default() -> Self {
        // NO_COLOR (https://no-color.org) wins over TTY detection.
        let color = std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout);
        Self { emoji: true, color }
    }
}

impl Style {
    pub fn plain() -> Self {
        Self {
            emoji: false,
            color: false,
        }
    }
}

pub fn info(msg: impl AsRef<str>) {
    print_line(Level::Info, msg.as_ref(), Style::default());
}

pub fn success(msg: impl AsRef<str>) {
    print_line(Level::Success, msg.as_ref(), Style::default());
}

pub fn warning(msg: impl AsRef<str>) {
    print_line(Level::Warning, msg.as_ref(), Style::default());
}

pub fn error(msg: impl AsRef<str>) {
    print_line(Level::Error, msg.as_ref(), Style::default());
}

pub fn render(level: Level, msg: &str, style: Style) -> String {
    let emoji = match level {
        Level::Info => "ℹ️ ",
        Level::Success => "✅ ",
        Level::Warning => "⚠️ ",
        Level::Error => "❌ ",
    };
    let prefix = if style.emoji { emoji } else { "" };
    let line = format!("{prefix}{msg}");

    if !style.color {
        return line;
    }
    match level {
        Level::Info => line,
        Level::Success => line.green().to_string(),
        Level::Warning => line.yellow().to_string(),
        Level::Error => line.red().to_string(),
    }
}

/// Warnings and errors go to stderr so `--json` output stays clean.
pub fn print_line(level: Level, msg: &str, style: Style) {
    let line = render(level, msg, style);
    match level {
        Level::Info | Level::Success => println!("{line}"),
        Level::Warning | Level::Error => eprintln!("{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_style_adds_nothing() {
        assert_eq!(render(Level::Error, "boom", Style::plain()), "boom");
    }
}
