// Display colors for programming languages.

/// Color used for languages missing from the table.
pub const DEFAULT_COLOR: &str = "#586069";

static LANGUAGE_COLORS: [(&str, &str); 18] = [
    ("Python", "#3776ab"),
    ("JavaScript", "#f1e05a"),
    ("TypeScript", "#2b7489"),
    ("Java", "#b07219"),
    ("C++", "#f34b7d"),
    ("C", "#555555"),
    ("HTML", "#e34c26"),
    ("CSS", "#1572b6"),
    ("PHP", "#4f5d95"),
    ("Ruby", "#701516"),
    ("Go", "#00ADD8"),
    ("Rust", "#dea584"),
    ("Swift", "#ffac45"),
    ("Kotlin", "#F18E33"),
    ("Dart", "#00B4AB"),
    ("Shell", "#89e051"),
    ("Vue", "#2c3e50"),
    ("React", "#61dafb"),
];

/// Hex color for a language name (exact, case-sensitive match).
pub fn language_color(name: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(language, _)| *language == name)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}
