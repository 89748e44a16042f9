//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, no I/O) and
//! a `print_*` wrapper that writes them to stdout. Logs go to stderr, so
//! stdout stays a clean report.
//!
//! # Output Format
//!
//! ## Add
//!
//! ```text
//! + Authentication.Login
//!     Services.Login → services/authentication.go (formatted)
//!     Models.User → prisma/schema.prisma
//!     Record: 3 services, 2 models
//! Hook: go mod tidy
//! ```
//!
//! ## Init
//!
//! ```text
//! Manifest: alchemy.yaml
//!     Project: shop
//!     Root: .
//!     ORM: Prisma (PostgreSQL)
//! Docker Compose: docker-compose.yaml
//! Hook: go mod tidy
//!
//! Next: alchemy add Authentication
//! ```

use crate::generate::{GenerationReport, InitReport, WrittenFile};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to the project when possible, `/`-separated.
fn display_path(path: &Path, project_dir: &Path) -> String {
    path.strip_prefix(project_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn file_line(file: &WrittenFile, project_dir: &Path) -> String {
    let suffix = if file.formatted { " (formatted)" } else { "" };
    format!(
        "{}{} → {}{}",
        indent(1),
        file.job_id,
        display_path(&file.path, project_dir),
        suffix
    )
}

pub fn format_generation_report(report: &GenerationReport) -> Vec<String> {
    let mut lines = Vec::new();
    for component in &report.components {
        lines.push(format!("+ {}", component.id));
        for file in &component.files {
            lines.push(file_line(file, &report.project_dir));
        }
        lines.push(format!(
            "{}Record: {}, {}",
            indent(1),
            plural(component.record.services.len(), "service"),
            plural(component.record.models.len(), "model")
        ));
    }
    if let Some(hook) = &report.hook {
        lines.push(format!("Hook: {hook}"));
    }
    lines
}

pub fn print_generation_report(report: &GenerationReport) {
    for line in format_generation_report(report) {
        println!("{}", line);
    }
}

pub fn format_init_output(report: &InitReport, project_dir: &Path) -> Vec<String> {
    let manifest = &report.manifest;
    let mut lines = vec![
        format!(
            "Manifest: {}",
            display_path(&report.manifest_path, project_dir)
        ),
        format!("{}Project: {}", indent(1), manifest.project_name),
        format!("{}Root: {}", indent(1), manifest.root),
        format!(
            "{}ORM: {} ({})",
            indent(1),
            manifest.orm.name,
            manifest.orm.database_provider
        ),
    ];
    if let Some(compose) = &report.compose_file {
        lines.push(format!(
            "Docker Compose: {}",
            display_path(compose, project_dir)
        ));
    }
    if let Some(hook) = &report.hook {
        lines.push(format!("Hook: {hook}"));
    }
    lines.push(String::new());
    if report.compose_file.is_some() {
        lines.push("Start the database: docker compose up -d".to_string());
    }
    lines.push("Next: alchemy add Authentication".to_string());
    lines
}

pub fn print_init_output(report: &InitReport, project_dir: &Path) {
    for line in format_init_output(report, project_dir) {
        println!("{}", line);
    }
}
