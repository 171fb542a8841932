//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:   green   (reachable paths, clean loads)
//!   - Warning:   yellow  (skipped edges, transitive edges)
//!   - Error:     red     (cycles, unreachable paths)
//!   - Info:      cyan    (concept and edge ids)
//!   - Muted:     dimmed  (field labels, arrows)
//!   - Emphasis:  bold    (section headers)

use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Colorize a concept or edge id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    info(id, config)
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Edge arrow, with ASCII fallback support.
pub(crate) fn arrow(config: &OutputConfig) -> String {
    let glyph = if config.use_ascii { "->" } else { "→" };
    dimmed(glyph, config)
}

/// Short tag describing an edge's derived flags.
pub(crate) fn edge_flags(is_transitive: bool, causes_cycle: bool, config: &OutputConfig) -> String {
    match (is_transitive, causes_cycle) {
        (false, false) => String::new(),
        (true, false) => warning("[transitive]", config),
        (false, true) => error("[cycle]", config),
        (true, true) => format!(
            "{} {}",
            warning("[transitive]", config),
            error("[cycle]", config)
        ),
    }
}
