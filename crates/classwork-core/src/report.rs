//! Class report types with JSON persistence and Markdown output.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Status, StudentId};
use crate::roster::ClassRoster;
use crate::statistics::AggregateResult;

/// Performance of a whole class over every assigned list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    pub class_name: String,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Roster at the time of the report.
    pub students: Vec<StudentId>,
    pub lists: Vec<ListPerformance>,
    /// Assigned lists that could not be read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<UnavailableList>,
}

/// An assigned list left out of a report, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableList {
    pub list: String,
    pub reason: String,
}

/// Aggregate of one list plus each student's share of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPerformance {
    pub result: AggregateResult,
    pub per_student: Vec<StudentScore>,
}

/// One student's line in a list breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentScore {
    pub student: StudentId,
    pub correct: usize,
    /// Keyed exercises counted for this student; 0 without progress.
    pub counted: usize,
    /// `None` when the student never started the list.
    pub status: Option<Status>,
}

impl StudentScore {
    pub fn is_finished(&self) -> bool {
        self.status == Some(Status::Complete)
    }

    /// Status as shown in tables.
    pub fn status_label(&self) -> String {
        match self.status {
            Some(status) => status.to_string(),
            None => "not started".to_string(),
        }
    }
}

/// Format an optional percentage, `n/a` when absent.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.1}%"),
        None => "n/a".to_string(),
    }
}

impl ClassReport {
    /// An empty report for a class, stamped now.
    pub fn new(roster: &ClassRoster) -> Self {
        let mut seen = BTreeSet::new();
        Self {
            class_name: roster.name.clone(),
            created_at: Utc::now(),
            students: roster
                .students
                .iter()
                .copied()
                .filter(|s| seen.insert(*s))
                .collect(),
            lists: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ClassReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }


    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Class {}\n\n", self.class_name));
        md.push_str(&format!(
            "**Generated:** {} | **Students:** {} | **Lists:** {}\n\n",
            self.created_at.format("%Y-%m-%d %H:%M UTC"),
            self.students.len(),
            self.lists.len()
        ));

        if self.lists.is_empty() && self.unavailable.is_empty() {
            md.push_str("No lists assigned.\n");
            return md;
        }

        if !self.unavailable.is_empty() {
            md.push_str("**Unavailable lists:**\n\n");
            for u in &self.unavailable {
                md.push_str(&format!("- {}: {}\n", u.list, u.reason));
            }
            md.push('\n');
        }

        if self.lists.is_empty() {
            return md;
        }

        md.push_str("| List | Correct | Counted | Students | Ratio |\n");
        md.push_str("|------|---------|---------|----------|-------|\n");
        for perf in &self.lists {
            let r = &perf.result;
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                r.list,
                r.numerator,
                r.denominator,
                r.students_counted,
                format_ratio(r.ratio)
            ));
        }

        for perf in &self.lists {
            md.push_str(&format!("\n### {}\n\n", perf.result.list));
            md.push_str("| Student | Correct | Counted | Status |\n");
            md.push_str("|---------|---------|---------|--------|\n");
            for s in &perf.per_student {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    s.student,
                    s.correct,
                    s.counted,
                    s.status_label()
                ));
            }
        }

        md
    }
}
