//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every icon is shown by its positional index and name first, with the
//! source path as an indented `Source:` line underneath. Failures use the
//! same shape, so a batch reads as one inventory.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! 001 imp → out/imp-red.png (512x512)
//!     Source: uploads/imp.png
//! 002 baron FAILED at decode
//!     Source: uploads/baron.png
//!     Error: Could not decode image: ...
//!
//! Generated 1 icon, 1 failed
//! Background removal: 2 cached, 1 removed (3 total)
//! ```
//!
//! With `--verbose`, written icons get an extra `Stages:` line.
//!
//! ## Variants
//!
//! ```text
//! red            Evil              #8b1011
//! travellergood  Traveller (Good)  split
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::cache::CacheStats;
use crate::generate::{GenerateEvent, GenerateReport};
use crate::naming::icon_stem;
use crate::process::Stage;
use crate::types::ColorOption;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn stage_list(stages: &[Stage]) -> String {
    stages
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Generate output
// ============================================================================

/// Format a single generate progress event as display lines.
///
/// `index` in the event is 0-based; the display is 1-based.
pub fn format_generate_event(event: &GenerateEvent, verbose: bool) -> Vec<String> {
    match event {
        GenerateEvent::Written { index, icon } => {
            let mut lines = vec![
                format!(
                    "{} {} \u{2192} {} ({}x{})",
                    format_index(index + 1),
                    icon_stem(&icon.input),
                    icon.output.display(),
                    icon.width,
                    icon.height
                ),
                format!("    Source: {}", icon.input.display()),
            ];
            if verbose {
                lines.push(format!("    Stages: {}", stage_list(&icon.stages)));
            }
            lines
        }
        GenerateEvent::Failed { index, failure } => {
            let headline = match failure.stage {
                Some(stage) => format!(
                    "{} {} FAILED at {}",
                    format_index(index + 1),
                    icon_stem(&failure.input),
                    stage
                ),
                None => format!(
                    "{} {} FAILED",
                    format_index(index + 1),
                    icon_stem(&failure.input)
                ),
            };
            vec![
                headline,
                format!("    Source: {}", failure.input.display()),
                format!("    Error: {}", failure.error),
            ]
        }
    }
}

/// Print a generate progress event to stdout.
pub fn print_generate_event(event: &GenerateEvent, verbose: bool) {
    for line in format_generate_event(event, verbose) {
        println!("{}", line);
    }
}

/// Format the closing summary of a batch.
///
/// The background-removal line only appears when the cache saw any traffic.
pub fn format_summary(report: &GenerateReport, cache: Option<&CacheStats>) -> Vec<String> {
    let mut lines = vec![String::new()];
    let generated = plural(report.generated.len(), "icon");
    if report.failed.is_empty() {
        lines.push(format!("Generated {}", generated));
    } else {
        lines.push(format!(
            "Generated {}, {} failed",
            generated,
            report.failed.len()
        ));
    }
    if let Some(stats) = cache.filter(|s| s.total() > 0) {
        lines.push(format!("Background removal: {}", stats));
    }
    lines
}

/// Print the batch summary to stdout.
pub fn print_summary(report: &GenerateReport, cache: Option<&CacheStats>) {
    for line in format_summary(report, cache) {
        println!("{}", line);
    }
}

// ============================================================================
// Variants output
// ============================================================================

/// Format the list of colour variants with their labels and swatches.
pub fn format_variants() -> Vec<String> {
    let name_width = ColorOption::ALL
        .iter()
        .map(|c| c.name().len())
        .max()
        .unwrap_or(0);
    let label_width = ColorOption::ALL
        .iter()
        .map(|c| c.label().len())
        .max()
        .unwrap_or(0);

    ColorOption::ALL
        .iter()
        .map(|c| {
            format!(
                "{:<nw$}  {:<lw$}  {}",
                c.name(),
                c.label(),
                c.swatch_hex().unwrap_or("split"),
                nw = name_width,
                lw = label_width
            )
        })
        .collect()
}

/// Print the variant list to stdout.
pub fn print_variants() {
    for line in format_variants() {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{FailedIcon, GeneratedIcon};
    use std::path::PathBuf;

    fn written(index: usize) -> GenerateEvent {
        GenerateEvent::Written {
            index,
            icon: GeneratedIcon {
                input: PathBuf::from("uploads/imp.png"),
                output: PathBuf::from("out/imp-red.png"),
                width: 512,
                height: 512,
                stages: vec![Stage::Decode, Stage::Grayscale, Stage::Encode],
            },
        }
    }

    fn failed(stage: Option<Stage>) -> GenerateEvent {
        GenerateEvent::Failed {
            index: 1,
            failure: FailedIcon {
                input: PathBuf::from("uploads/baron.png"),
                stage,
                error: "bad bytes".to_string(),
            },
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_words() {
        assert_eq!(plural(1, "icon"), "1 icon");
        assert_eq!(plural(0, "icon"), "0 icons");
        assert_eq!(plural(3, "icon"), "3 icons");
    }

    // =========================================================================
    // Generate event tests
    // =========================================================================

    #[test]
    fn written_event_lines() {
        let lines = format_generate_event(&written(0), false);
        assert_eq!(
            lines,
            vec![
                "001 imp \u{2192} out/imp-red.png (512x512)".to_string(),
                "    Source: uploads/imp.png".to_string(),
            ]
        );
    }

    #[test]
    fn written_event_verbose_lists_stages() {
        let lines = format_generate_event(&written(4), true);
        assert!(lines[0].starts_with("005 imp"));
        assert_eq!(lines[2], "    Stages: decode, grayscale, encode");
    }

    #[test]
    fn failed_event_names_stage() {
        let lines = format_generate_event(&failed(Some(Stage::Decode)), false);
        assert_eq!(lines[0], "002 baron FAILED at decode");
        assert_eq!(lines[1], "    Source: uploads/baron.png");
        assert_eq!(lines[2], "    Error: bad bytes");
    }

    #[test]
    fn failed_event_without_stage() {
        let lines = format_generate_event(&failed(None), false);
        assert_eq!(lines[0], "002 baron FAILED");
    }

    // =========================================================================
    // Summary tests
    // =========================================================================

    #[test]
    fn summary_all_succeeded() {
        let report = GenerateReport::default();
        let lines = format_summary(&report, None);
        assert_eq!(lines, vec!["".to_string(), "Generated 0 icons".to_string()]);
    }

    #[test]
    fn summary_with_failures_and_cache() {
        let report = GenerateReport {
            generated: vec![],
            failed: vec![FailedIcon {
                input: PathBuf::from("a.png"),
                stage: None,
                error: "x".to_string(),
            }],
        };
        let stats = CacheStats { hits: 2, misses: 1 };
        let lines = format_summary(&report, Some(&stats));
        assert_eq!(lines[1], "Generated 0 icons, 1 failed");
        assert_eq!(lines[2], "Background removal: 2 cached, 1 removed (3 total)");
    }

    #[test]
    fn summary_hides_unused_cache() {
        let report = GenerateReport::default();
        let stats = CacheStats { hits: 0, misses: 0 };
        assert_eq!(format_summary(&report, Some(&stats)).len(), 2);
    }

    // =========================================================================
    // Variants tests
    // =========================================================================

    #[test]
    fn variants_list_every_option() {
        let lines = format_variants();
        assert_eq!(lines.len(), ColorOption::ALL.len());
        assert!(lines[0].starts_with("red "));
        assert!(lines[0].contains("Evil"));
        assert!(lines[0].ends_with("#8b1011"));
    }

    #[test]
    fn split_variants_have_no_swatch() {
        let lines = format_variants();
        let good = lines
            .iter()
            .find(|l| l.starts_with("travellergood"))
            .unwrap();
        assert!(good.contains("Traveller (Good)"));
        assert!(good.ends_with("split"));
    }

    #[test]
    fn variant_columns_align() {
        let lines = format_variants();
        let label_col = lines[0].find("Evil").unwrap();
        for line in &lines {
            let label = ColorOption::ALL
                .iter()
                .find(|c| line.starts_with(c.name()) && line[c.name().len()..].starts_with(' '))
                .unwrap()
                .label();
            assert_eq!(line.find(label).unwrap(), label_col);
        }
    }
}
