//! Output file naming.
//!
//! Every icon is written as `<stem>-<variant>.png`, where `<stem>` is the
//! input file name without its extension and with whitespace runs turned
//! into single dashes:
//!
//! - `imp.png` + red → `imp-red.png`
//! - `Fortune Teller.svg` + blue → `Fortune-Teller-blue.png`
//! - `scapegoat.v2.jpg` + travellergood → `scapegoat.v2-travellergood.png`

use crate::types::ColorOption;
use std::path::Path;

/// Fallback stem for inputs without a usable file name.
const DEFAULT_STEM: &str = "icon";

/// Input file stem with whitespace collapsed to dashes.
pub fn icon_stem(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let joined = stem.split_whitespace().collect::<Vec<_>>().join("-");
    if joined.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        joined
    }
}

/// File name of the icon generated from `input` for `variant`.
pub fn output_file_name(input: &Path, variant: ColorOption) -> String {
    format!("{}-{}.png", icon_stem(input), variant.name())
}
