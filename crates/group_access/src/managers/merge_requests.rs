//! Merge request reporting and bulk merging.

use std::io::{BufRead, Write};

use crate::adapter::MergeRequest;
use crate::client::GitlabApi;
use crate::discovery::ProjectDiscovery;
use crate::error::Result;
use crate::filter::GroupProjectFilter;
use crate::types::MergeStatus;

/// How `merge_all` treats mergeable merge requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStyle {
    /// Report only; never merge.
    No,
    /// Ask for confirmation before each merge.
    Yes,
    /// Merge without asking.
    Automatic,
}

/// Collects open merge requests across all projects matching a
/// group/project filter, optionally restricted by labels, and reports or
/// merges them.
pub struct MergeRequestManager<'a> {
    api: &'a GitlabApi,
    filter: GroupProjectFilter,
    labels: Vec<String>,
    style: MergeStyle,
}

impl<'a> MergeRequestManager<'a> {
    pub fn new(
        api: &'a GitlabApi,
        filter: GroupProjectFilter,
        labels: Vec<String>,
        style: MergeStyle,
    ) -> Self {
        Self {
            api,
            filter,
            labels,
            style,
        }
    }

    /// Fetch the open merge requests of every matching project.
    ///
    /// Eager: totals are reported at the end, so the whole sequence is
    /// materialized. Labels are a server-side filter.
    pub fn merge_requests(&self) -> Result<Vec<MergeRequest<'a>>> {
        let mut merge_requests = Vec::new();

        for project in ProjectDiscovery::new(self.api, self.filter.clone()).iter() {
            let project = project?;
            let records = self.api.open_merge_requests(project.id(), &self.labels)?;
            merge_requests.extend(
                records
                    .into_iter()
                    .map(|record| MergeRequest::new(self.api, record)),
            );
        }

        Ok(merge_requests)
    }

    /// Display all merge requests found with their status glyphs.
    pub fn show(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", show_header(&self.labels))?;

        for merge_request in self.merge_requests()? {
            let glyphs = status_glyphs(
                merge_request.is_mergeable(),
                merge_request.pipelines_succeeded()?,
            );
            writeln!(
                out,
                "{} {}: {}",
                glyphs,
                merge_request.reference(),
                merge_request.title()
            )?;
        }
        Ok(())
    }

    /// Merge all identified merge requests according to the configured
    /// style.
    ///
    /// Merge requests that cannot be merged are ignored; mergeable ones
    /// with a non-succeeding pipeline are skipped, even under
    /// [`MergeStyle::Automatic`]. With [`MergeStyle::Yes`] a `y` answer on
    /// `input` proceeds, anything else skips.
    pub fn merge_all(&self, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
        if self.style == MergeStyle::No {
            return self.show(out);
        }

        writeln!(out, "{}", merge_header(&self.labels))?;
        let mut merged = 0usize;

        for merge_request in self.merge_requests()? {
            let reference = merge_request.reference();
            let title = merge_request.title();

            match merge_decision(merge_request.merge_status(), || {
                merge_request.pipelines_succeeded()
            })? {
                MergeDecision::Ignore => {
                    writeln!(out, "{}", ignore_line(reference, title))?;
                }
                MergeDecision::Skip => {
                    writeln!(out, "{}", skip_line(reference, title))?;
                }
                MergeDecision::Merge => {
                    if self.style == MergeStyle::Yes {
                        write!(out, "{}", prompt_line(reference, title))?;
                        out.flush()?;
                        let mut answer = String::new();
                        input.read_line(&mut answer)?;
                        if answer.trim() != "y" {
                            continue;
                        }
                    } else {
                        writeln!(out, "Merging {reference}: {title}")?;
                    }
                    merge_request.merge()?;
                    merged += 1;
                }
            }
        }

        writeln!(out, "{}", merged_count_line(merged))?;
        Ok(())
    }
}

/// What to do with one merge request. The pipeline check runs only for
/// mergeable requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeDecision {
    Merge,
    Ignore,
    Skip,
}

fn merge_decision<F>(status: MergeStatus, pipelines_succeeded: F) -> Result<MergeDecision>
where
    F: FnOnce() -> Result<bool>,
{
    if status != MergeStatus::CanBeMerged {
        return Ok(MergeDecision::Ignore);
    }
    if !pipelines_succeeded()? {
        return Ok(MergeDecision::Skip);
    }
    Ok(MergeDecision::Merge)
}

/// Two-glyph status: mergeability, then pipeline state.
fn status_glyphs(mergeable: bool, pipelines_succeeded: bool) -> String {
    format!("{}{}", glyph(mergeable), glyph(pipelines_succeeded))
}

fn glyph(ok: bool) -> char {
    if ok {
        '✓'
    } else {
        '✗'
    }
}

fn show_header(labels: &[String]) -> String {
    if labels.is_empty() {
        "Open merge requests: (mergeable, pipeline status)".to_string()
    } else {
        format!("Open merge requests matching labels: {}", labels.join(","))
    }
}

fn merge_header(labels: &[String]) -> String {
    if labels.is_empty() {
        "Merging merge requests:".to_string()
    } else {
        format!("Merging merge requests that match labels: {}", labels.join(","))
    }
}

fn ignore_line(reference: &str, title: &str) -> String {
    format!("Ignoring {reference}: {title} ✗ Can't be merged")
}

fn skip_line(reference: &str, title: &str) -> String {
    format!("Skipping {reference}: {title} ✗ Pipeline not succeeded")
}

fn prompt_line(reference: &str, title: &str) -> String {
    format!("Proceed with merging ✓✓ {reference}: {title} ? (y/n) [n] ")
}

fn merged_count_line(merged: usize) -> String {
    if merged == 0 {
        "No MRs merged.".to_string()
    } else {
        format!("{merged} MRs merged.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_glyphs() {
        assert_eq!(status_glyphs(true, true), "✓✓");
        assert_eq!(status_glyphs(false, true), "✗✓");
        assert_eq!(status_glyphs(true, false), "✓✗");
    }

    #[test]
    fn test_merge_decision_mergeable_and_green() {
        let decision = merge_decision(MergeStatus::CanBeMerged, || Ok(true)).unwrap();
        assert_eq!(decision, MergeDecision::Merge);
    }

    #[test]
    fn test_merge_decision_not_mergeable_skips_pipeline_check() {
        let decision = merge_decision(MergeStatus::CannotBeMerged, || {
            panic!("pipeline check must not run for unmergeable MRs")
        })
        .unwrap();
        assert_eq!(decision, MergeDecision::Ignore);

        let decision = merge_decision(MergeStatus::Unknown, || Ok(true)).unwrap();
        assert_eq!(decision, MergeDecision::Ignore);
    }

    #[test]
    fn test_merge_decision_red_pipeline_skips() {
        let decision = merge_decision(MergeStatus::CanBeMerged, || Ok(false)).unwrap();
        assert_eq!(decision, MergeDecision::Skip);
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            show_header(&[]),
            "Open merge requests: (mergeable, pipeline status)"
        );
        assert_eq!(
            show_header(&["a".to_string(), "b".to_string()]),
            "Open merge requests matching labels: a,b"
        );
        assert_eq!(merge_header(&[]), "Merging merge requests:");
        assert_eq!(
            merge_header(&["release".to_string()]),
            "Merging merge requests that match labels: release"
        );
    }

    #[test]
    fn test_report_lines() {
        assert_eq!(
            ignore_line("g/p!42", "Bar"),
            "Ignoring g/p!42: Bar ✗ Can't be merged"
        );
        assert_eq!(
            skip_line("g/p!17", "Baz"),
            "Skipping g/p!17: Baz ✗ Pipeline not succeeded"
        );
        assert_eq!(
            prompt_line("g/p!3", "Foo"),
            "Proceed with merging ✓✓ g/p!3: Foo ? (y/n) [n] "
        );
    }

    #[test]
    fn test_merged_count_line() {
        assert_eq!(merged_count_line(0), "No MRs merged.");
        assert_eq!(merged_count_line(1), "1 MRs merged.");
        assert_eq!(merged_count_line(3), "3 MRs merged.");
    }

    /// One mergeable green MR, one unmergeable, one mergeable with a red
    /// pipeline: exactly the first merges, and the report reads as the
    /// automatic-merge transcript.
    #[test]
    fn test_automatic_merge_transcript() {
        let candidates = [
            ("g/p!3", "Foo", MergeStatus::CanBeMerged, true),
            ("g/p!42", "Bar", MergeStatus::CannotBeMerged, true),
            ("g/p!17", "Baz", MergeStatus::CanBeMerged, false),
        ];

        let mut lines = vec![merge_header(&[])];
        let mut merged = 0usize;
        for (reference, title, status, green) in candidates {
            match merge_decision(status, || Ok(green)).unwrap() {
                MergeDecision::Merge => {
                    lines.push(format!("Merging {reference}: {title}"));
                    merged += 1;
                }
                MergeDecision::Ignore => lines.push(ignore_line(reference, title)),
                MergeDecision::Skip => lines.push(skip_line(reference, title)),
            }
        }
        lines.push(merged_count_line(merged));

        assert_eq!(
            lines,
            [
                "Merging merge requests:",
                "Merging g/p!3: Foo",
                "Ignoring g/p!42: Bar ✗ Can't be merged",
                "Skipping g/p!17: Baz ✗ Pipeline not succeeded",
                "1 MRs merged.",
            ]
        );
    }
}
