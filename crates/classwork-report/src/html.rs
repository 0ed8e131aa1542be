//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use classwork_core::report::{format_ratio, ClassReport, ListPerformance};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn ratio_class(ratio: Option<f64>) -> &'static str {
    match ratio {
        Some(r) if r >= 70.0 => "pass",
        Some(r) if r >= 50.0 => "warn",
        Some(_) => "fail",
        None => "none",
    }
}

/// Generate an HTML page from a class report.
pub fn generate_html(report: &ClassReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>classwork report: {}</title>\n",
        html_escape(&report.class_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>Class {}</h1>\n",
        html_escape(&report.class_name)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} students | {} lists | {}</p>\n",
        report.students.len(),
        report.lists.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    if !report.unavailable.is_empty() {
        html.push_str("<ul class=\"unavailable\">\n");
        for u in &report.unavailable {
            html.push_str(&format!(
                "<li><strong>{}</strong>: {}</li>\n",
                html_escape(&u.list),
                html_escape(&u.reason)
            ));
        }
        html.push_str("</ul>\n");
    }
    if report.lists.is_empty() {
        if report.unavailable.is_empty() {
            html.push_str("<p>No lists assigned.</p>\n");
        }
    } else {
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>List</th><th>Correct</th><th>Counted</th><th>Students</th><th>Ratio</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for perf in &report.lists {
            let r = &perf.result;
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
                html_escape(&r.list),
                r.numerator,
                r.denominator,
                r.students_counted,
                ratio_class(r.ratio),
                format_ratio(r.ratio),
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str(&generate_bar_chart(&report.lists));
    }
    html.push_str("</section>\n");

    for (i, perf) in report.lists.iter().enumerate() {
        html.push_str("<section class=\"results\">\n");
        html.push_str(&format!("<h2>{}</h2>\n", html_escape(&perf.result.list)));
        html.push_str(&format!(
            "<table class=\"results-table\" id=\"list-{i}\">\n"
        ));
        html.push_str(&format!(
            "<thead><tr><th onclick=\"sortTable('list-{i}', 0)\">Student</th><th onclick=\"sortTable('list-{i}', 1)\">Correct</th><th onclick=\"sortTable('list-{i}', 2)\">Counted</th><th onclick=\"sortTable('list-{i}', 3)\">Status</th></tr></thead>\n"
        ));
        html.push_str("<tbody>\n");
        for s in &perf.per_student {
            let row_class = if s.is_finished() { "pass" } else { "" };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                row_class,
                s.student,
                s.correct,
                s.counted,
                html_escape(&s.status_label())
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ClassReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(lists: &[ListPerformance]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = lists.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, perf) in lists.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let ratio = perf.result.ratio.unwrap_or(0.0);
        let width = (ratio / 100.0 * max_width as f64) as usize;

        let color = match ratio_class(perf.result.ratio) {
            "pass" => "#22c55e",
            "warn" => "#eab308",
            "fail" => "#ef4444",
            _ => "#9ca3af",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&perf.result.list)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            format_ratio(perf.result.ratio)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --warn: #fef9c3; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --warn: #713f12; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.unavailable { color: #b91c1c; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.warn { background: var(--warn); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
