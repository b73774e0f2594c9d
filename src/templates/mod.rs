/// The stock ClarksonBot mascot shipped with the customizer.
pub const MASCOT_SVG: &str = include_str!("../../assets/clarksonbot.svg");

/// Suggested download name for an exported mascot.
pub fn export_file_name(base: &str) -> String {
    let stem: String = base
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "clarksonbot-custom.svg".to_string()
    } else {
        format!("{stem}.svg")
    }
}
