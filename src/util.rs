use std::path::PathBuf;

/// Expands a leading `~` to the user's home directory. Other paths pass through.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
            match dirs::home_dir() {
                Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
                None => PathBuf::from(path),
            }
        }
        _ => PathBuf::from(path),
    }
}

/// Compact decimal for SVG attributes: at most three fractional digits, no trailing zeros.
/// Non-finite input prints as `0`.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if !rounded.is_finite() || rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
