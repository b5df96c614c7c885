//! Terminal output for the postboard-server CLI.
//!
//! Every message has a coloured form and a plain, tagged form (`[OK]`,
//! `[WARN]`, ...). The plain form is used with `--no-color`, when `NO_COLOR`
//! is set, or when stdout is not a terminal.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Output style configuration
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Colours only when allowed by the flag, `NO_COLOR` and the terminal.
    pub fn detect(no_color_flag: bool) -> Self {
        let env_disabled = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            colored: !no_color_flag && !env_disabled && std::io::stdout().is_terminal(),
        }
    }

    fn emit(&self, colored: impl FnOnce() -> String, plain: impl FnOnce() -> String) {
        if self.colored {
            println!("{}", colored());
        } else {
            println!("{}", plain());
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        self.emit(
            || {
                format!(
                    "\n   {} {}\n",
                    "postboard".bright_cyan().bold(),
                    version.dimmed()
                )
            },
            || format!("\n   postboard {}\n", version),
        );
    }

    pub fn success(&self, message: &str) {
        self.emit(
            || format!("  {} {}", "✓".green().bold(), message.green()),
            || format!("  [OK] {}", message),
        );
    }

    pub fn info(&self, message: &str) {
        self.emit(
            || format!("  {} {}", "•".blue(), message),
            || format!("  [INFO] {}", message),
        );
    }

    pub fn warning(&self, message: &str) {
        self.emit(
            || format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            || format!("  [WARN] {}", message),
        );
    }

    /// Errors go to stderr.
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// A file written by `init`.
    pub fn created(&self, kind: &str, path: &str) {
        self.emit(
            || format!("  {} {} {}", "✓".green().bold(), kind.dimmed(), path.bright_white()),
            || format!("  [CREATED] {} {}", kind, path),
        );
    }

    pub fn created_dir(&self, path: &str) {
        self.created("directory", path);
    }

    /// A file `init` left alone.
    pub fn skipped(&self, path: &str, reason: &str) {
        self.emit(
            || {
                format!(
                    "  {} {} {}",
                    "○".yellow(),
                    path.dimmed(),
                    format!("({})", reason).yellow()
                )
            },
            || format!("  [SKIPPED] {} ({})", path, reason),
        );
    }

    pub fn header(&self, title: &str) {
        self.emit(
            || format!("\n  {}", title.bright_white().bold().underline()),
            || format!("\n  === {} ===", title),
        );
    }

    /// One configuration entry.
    pub fn kv(&self, key: &str, value: &str) {
        self.emit(
            || format!("    {}: {}", key.dimmed(), value.bright_white()),
            || format!("    {}: {}", key, value),
        );
    }

    pub fn hint(&self, message: &str) {
        self.emit(
            || format!("\n  {}", message.dimmed().italic()),
            || format!("\n  [TIP] {}", message),
        );
    }

    /// A shell command the user may run next.
    pub fn command(&self, cmd: &str) {
        self.emit(
            || format!("     {}", format!("$ {}", cmd).bright_cyan()),
            || format!("     $ {}", cmd),
        );
    }

    pub fn complete(&self, message: &str) {
        self.emit(
            || format!("\n  {}", message.bright_green().bold()),
            || format!("\n  [DONE] {}", message),
        );
    }

    pub fn newline(&self) {
        println!();
    }
}
