use std::fmt::Write as _;
use std::path::Path;

use super::{PatchError, read_text};

pub const COLOR_FILE: &str = "color.ini";
const VAR_PREFIX: &str = "--apolo-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `1ed760`, `#1ed760` or the short form `#fff`.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// One section of a theme's `color.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorScheme {
    pub name: String,
    pub colors: Vec<(String, Rgb)>,
}

impl ColorScheme {
    /// Load `color.ini` from the theme folder and pick `scheme`.
    /// An empty `scheme` picks the first section.
    pub fn load(theme_folder: &Path, scheme: &str) -> Result<Self, PatchError> {
        let path = theme_folder.join(COLOR_FILE);
        if !path.is_file() {
            return Err(PatchError::ThemeFileMissing(path));
        }
        Ok(Self::parse(&read_text(&path)?, scheme))
    }

    pub fn parse(content: &str, scheme: &str) -> Self {
        let mut sections: Vec<ColorScheme> = Vec::new();
        let mut current = ColorScheme::default();

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let finished = std::mem::replace(
                    &mut current,
                    ColorScheme {
                        name: name.trim().to_string(),
                        colors: Vec::new(),
                    },
                );
                if !finished.name.is_empty() || !finished.colors.is_empty() {
                    sections.push(finished);
                }
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("ignoring malformed color line: {}", line);
                continue;
            };
            let value = value.split(';').next().unwrap_or_default();
            match Rgb::parse_hex(value) {
                Some(rgb) => current.colors.push((key.trim().to_string(), rgb)),
                None => tracing::warn!("ignoring invalid color {} = {}", key.trim(), value.trim()),
            }
        }
        if !current.name.is_empty() || !current.colors.is_empty() {
            sections.push(current);
        }

        if scheme.is_empty() {
            return sections.into_iter().next().unwrap_or_default();
        }
        let position = sections
            .iter()
            .position(|section| section.name.eq_ignore_ascii_case(scheme));
        match position {
            Some(idx) => sections.swap_remove(idx),
            None => {
                tracing::warn!("color scheme {} not found, using the first one", scheme);
                sections.into_iter().next().unwrap_or_default()
            }
        }
    }

    /// Render the scheme as CSS custom properties on `:root`.
    pub fn to_css(&self) -> String {
        if self.colors.is_empty() {
            return String::new();
        }
        let mut css = String::from(":root {\n");
        for (key, rgb) in &self.colors {
            let name = key.replace('_', "-");
            let _ = writeln!(css, "  {VAR_PREFIX}{name}: {};", rgb.hex());
            let _ = writeln!(css, "  {VAR_PREFIX}{name}-rgb: {},{},{};", rgb.0, rgb.1, rgb.2);
        }
        css.push_str("}\n");
        css
    }
}
