//! Human-readable report of duplicate groups and the removal preview.
//!
//! # Layout
//!
//! ```text
//! Group 1 of 2 (3 files, 4 B each):
//!   /photos/z.jpg
//!   /photos/y.jpg
//!   /photos/x.jpg
//! Keeping: /photos/z.jpg
//! The following will be removed:
//!   /photos/y.jpg
//!   /photos/x.jpg
//!
//! 2 duplicate groups, 3 redundant files, 12 B reclaimable (10 files scanned)
//! ```
//!
//! Rendering never touches the filesystem.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::{RemovalAction, RemovalPlan, RemovalReport};
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text report of one scan.
#[derive(Debug)]
pub struct TextReport<'a> {
    groups: &'a [DuplicateGroup],
    plan: &'a RemovalPlan,
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextReport<'a> {
    /// Create a report; `plan` must be built from `groups`.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], plan: &'a RemovalPlan, summary: &'a ScanSummary) -> Self {
        Self {
            groups,
            plan,
            summary,
            color: false,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the full report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(w, "{}", self.style("No duplicates found", Tone::Good))?;
        }

        let total = self.groups.len();
        for (i, (group, entry)) in self.groups.iter().zip(&self.plan.entries).enumerate() {
            let header = format!(
                "Group {} of {} ({} files, {} each):",
                i + 1,
                total,
                group.len(),
                ByteSize::b(group.size)
            );
            writeln!(w, "{}", self.style(&header, Tone::Heading))?;
            for file in &group.files {
                writeln!(w, "  {}", file.path.display())?;
            }
            let keep = entry.keep.path.display().to_string();
            writeln!(w, "Keeping: {}", self.style(&keep, Tone::Good))?;
            writeln!(w, "The following will be removed:")?;
            for file in &entry.remove {
                let path = file.path.display().to_string();
                writeln!(w, "  {}", self.style(&path, Tone::Bad))?;
            }
            writeln!(w)?;
        }

        if !self.summary.scan_errors.is_empty() {
            let header = format!("Skipped {} path(s):", self.summary.scan_errors.len());
            writeln!(w, "{}", self.style(&header, Tone::Warn))?;
            for err in &self.summary.scan_errors {
                writeln!(w, "  {err}")?;
            }
            writeln!(w)?;
        }

        writeln!(w, "{}", self.summary_line())
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn summary_line(&self) -> String {
        let s = self.summary;
        let mut line = format!(
            "{} duplicate group(s), {} redundant file(s), {} reclaimable ({} files scanned",
            s.duplicate_groups,
            s.duplicate_files,
            s.reclaimable_display(),
            s.total_files
        );
        if s.unhashed_files > 0 {
            line.push_str(&format!(", {} unreadable", s.unhashed_files));
        }
        if s.verified {
            line.push_str(", verified");
        }
        line.push(')');
        line
    }

    fn style(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Heading => text.bold().to_string(),
            Tone::Good => text.green().to_string(),
            Tone::Bad => text.red().to_string(),
            Tone::Warn => text.yellow().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Good,
    Bad,
    Warn,
}

/// Write the outcome of a removal run.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_removal_summary<W: Write>(
    w: &mut W,
    action: &RemovalAction,
    report: &RemovalReport,
) -> io::Result<()> {
    if report.interrupted {
        writeln!(w, "Interrupted. Remaining files were left in place.")?;
    } else {
        writeln!(w, "Done.")?;
    }
    writeln!(w, "{}", report.summary())?;
    if let RemovalAction::Quarantine { dir, .. } = action {
        if !report.removed.is_empty() {
            writeln!(w, "Quarantined files are in {}", dir.display())?;
        }
    }
    for failure in &report.failures {
        writeln!(w, "  failed: {failure}")?;
    }
    Ok(())
}
