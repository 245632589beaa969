//! `voxrelay check`: config validation and provider readiness report.
//!
//! Prints a structured report with `[ok]`, `[warn]`, `[fail]`, or `[info]`
//! per item and exits non-zero when any check fails.

use std::path::Path;

use {
    anyhow::Result,
    voxrelay_config::{Severity, VoxrelayConfig, validate},
    voxrelay_voice::voices::BUILTIN_VOICES,
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Fail,
            Severity::Warning => Self::Warn,
            Severity::Info => Self::Info,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

// ── Printing ────────────────────────────────────────────────────────────────

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Run every check against `config`, print the report, exit 1 on failures.
///
/// `source` is the file the config was loaded from, if any.
pub fn handle_check(config: &VoxrelayConfig, source: Option<&Path>) -> Result<()> {
    eprintln!("{BOLD}voxrelay check{RESET}");
    eprintln!("{BOLD}=============={RESET}\n");

    let sections = run_checks(config, source);
    let (errors, warnings) = print_report(&sections);

    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn run_checks(config: &VoxrelayConfig, source: Option<&Path>) -> Vec<Section> {
    vec![
        check_config(config, source),
        check_provider(config),
        check_voices(config),
    ]
}

fn check_config(config: &VoxrelayConfig, source: Option<&Path>) -> Section {
    let label = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".into());
    let mut section = Section::new(format!("Config ({label})"));

    let result = validate(config);
    if result.diagnostics.is_empty() {
        section.push(Status::Ok, "no problems found");
    }
    for d in &result.diagnostics {
        section.push(d.severity.into(), format!("{}: {}", d.path, d.message));
    }
    section
}

fn check_provider(config: &VoxrelayConfig) -> Section {
    let mut section = Section::new("Provider");
    let provider = &config.provider;

    section.push(Status::Info, format!("endpoint {}", provider.base_url));
    if provider.api_key.is_some() {
        section.push(Status::Ok, "API key configured");
    }
    section.push(
        Status::Info,
        format!(
            "timeouts: connect {}s, response headers {}s",
            provider.connect_timeout_secs, provider.timeout_secs
        ),
    );
    section
}

fn check_voices(config: &VoxrelayConfig) -> Section {
    let mut section = Section::new("Voices");
    let voices = config.voice_map();
    let overridden = config
        .voices
        .keys()
        .filter(|k| BUILTIN_VOICES.iter().any(|(builtin, _)| *builtin == k.as_str()))
        .count();

    section.push(
        Status::Ok,
        format!(
            "{} voice(s), {} from config ({overridden} override built-ins)",
            voices.len(),
            config.voices.len()
        ),
    );
    if !voices.contains(&config.relay.default_voice) {
        section.push(
            Status::Info,
            format!(
                "default voice `{}` is not in the table and is sent to the provider as-is",
                config.relay.default_voice
            ),
        );
    }
    section
}
