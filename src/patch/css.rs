//! Theme CSS injection.
//!
//! Every target stylesheet gets at most one region bounded by
//! [`MARKER_BEGIN`] and [`MARKER_END`]. Injection always strips the old region
//! before appending the new one, so re-running it converges instead of
//! stacking copies of the theme.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::colors::ColorScheme;
use super::{CssSettings, PatchError, read_text, write_if_changed};

pub const TARGET_STYLESHEET: &str = "glue.css";
pub const USER_CSS: &str = "user.css";
pub const MARKER_BEGIN: &str = "/* apolo:begin */";
pub const MARKER_END: &str = "/* apolo:end */";

/// Outcome of one [`apply`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CssReport {
    pub stylesheets: usize,
    pub changed: usize,
}

/// Merge the theme in `theme_folder` into every target stylesheet under
/// `app_folder`.
pub fn apply(
    app_folder: &Path,
    theme_folder: &Path,
    settings: CssSettings,
    color_scheme: &str,
) -> Result<CssReport, PatchError> {
    let block = build_block(theme_folder, settings, color_scheme)?;
    let targets = find_stylesheets(app_folder);
    if targets.is_empty() {
        return Err(PatchError::NoStylesheet {
            folder: app_folder.to_path_buf(),
            stylesheet: TARGET_STYLESHEET,
        });
    }

    let mut report = CssReport::default();
    for path in targets {
        let old = read_text(&path)?;
        let new = inject(&old, &block);
        if write_if_changed(&path, &old, &new)? {
            report.changed += 1;
        }
        report.stylesheets += 1;
    }
    tracing::info!(
        "css injection: {} of {} stylesheets changed",
        report.changed,
        report.stylesheets
    );
    Ok(report)
}

/// Replace the injected region of `content` with `block`.
/// An empty block only removes the region.
pub fn inject(content: &str, block: &str) -> String {
    let mut out = strip(content);
    if block.is_empty() {
        return out;
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(MARKER_BEGIN);
    out.push('\n');
    out.push_str(block);
    if !block.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(MARKER_END);
    out.push('\n');
    out
}

/// Remove every injected region, including the newline after each end marker.
/// An unterminated region runs to the end of the file.
pub fn strip(content: &str) -> String {
    let Some(start) = content.find(MARKER_BEGIN) else {
        return content.to_string();
    };
    let Some(len) = content[start..].find(MARKER_END) else {
        return content[..start].to_string();
    };
    let mut end = start + len + MARKER_END.len();
    if content[end..].starts_with('\n') {
        end += 1;
    }
    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..start]);
    out.push_str(&content[end..]);
    strip(&out)
}

fn build_block(
    theme_folder: &Path,
    settings: CssSettings,
    color_scheme: &str,
) -> Result<String, PatchError> {
    let mut block = String::new();

    if settings.replace_colors {
        match ColorScheme::load(theme_folder, color_scheme) {
            Ok(scheme) => block.push_str(&scheme.to_css()),
            Err(PatchError::ThemeFileMissing(path)) => {
                tracing::warn!("{} not found, skipping color replacement", path.display());
            }
            Err(err) => return Err(err),
        }
    }

    if settings.inject_css {
        let path = theme_folder.join(USER_CSS);
        if !path.is_file() {
            return Err(PatchError::ThemeFileMissing(path));
        }
        block.push_str(&neutralize_markers(&read_text(&path)?));
        if !block.is_empty() && !block.ends_with('\n') {
            block.push('\n');
        }
    }

    Ok(block)
}

/// Rewrite marker text inside theme content so a later `strip` cannot stop
/// in the middle of the injected region.
fn neutralize_markers(text: &str) -> String {
    text.replace(MARKER_BEGIN, "/* apolo-begin */")
        .replace(MARKER_END, "/* apolo-end */")
}

fn find_stylesheets(app_folder: &Path) -> Vec<PathBuf> {
    WalkDir::new(app_folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == TARGET_STYLESHEET)
        .map(|entry| entry.into_path())
        .collect()
}
