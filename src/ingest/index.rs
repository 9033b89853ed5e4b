/// Index job: scan category folders of n8n workflow exports into a template catalog
///
/// Layout expected under the root:
///   <root>/<category>/<workflow>.json
/// A directory counts as a category when it directly holds a `.json` file or a
/// `README.md`. Unreadable or unparsable workflow files are logged and skipped.

use crate::catalog::{store::write_templates, Template};
use anyhow::{Context, Result};
use serde_json::Value;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Top-level directories that never hold workflow exports
const SKIPPED_DIRS: &[&str] = &["scripts", "templates", "node_modules", "target"];

/// Scan `root` and write the resulting catalog to `output`
pub async fn run(root: &Path, output: &Path) -> Result<usize> {
    let templates = collect_templates(root)?;
    write_templates(output, &templates).await?;
    tracing::info!("📝 Wrote {} templates to {}", templates.len(), output.display());
    Ok(templates.len())
}

/// Build templates for every workflow file under the category directories of `root`
pub fn collect_templates(root: &Path) -> Result<Vec<Template>> {
    let mut templates = Vec::new();

    for category_dir in category_dirs(root)? {
        for file in json_files(&category_dir) {
            match build_template(&category_dir, &file) {
                Ok(template) => templates.push(template),
                Err(e) => tracing::warn!("⚠️ Skipping {}: {:#}", file.display(), e),
            }
        }
    }

    Ok(templates)
}

/// Immediate subdirectories of `root` that look like categories, sorted by name
fn category_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Template root {} is not a directory", root.display());
    }

    let dirs = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("⚠️ Failed to inspect entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|skip| name == *skip)
        })
        .map(|entry| entry.into_path())
        .filter(|dir| is_category_dir(dir))
        .collect();

    Ok(dirs)
}

fn is_category_dir(dir: &Path) -> bool {
    direct_files(dir).any(|file| {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        name.ends_with(".json") || name == "readme.md"
    })
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    direct_files(dir)
        .filter(|file| {
            file.extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect()
}

fn direct_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Turn one exported workflow file into a template record
pub fn build_template(category_dir: &Path, file: &Path) -> Result<Template> {
    let category = file_name_string(category_dir)?;
    let file_name = file_name_string(file)?;
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let workflow: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let title = workflow
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| stem.clone());

    Ok(Template {
        id: format!("{}/{}", category, stem),
        file_name,
        category,
        title,
        description: String::new(),
        tags: Vec::new(),
        node_types: node_types(&workflow),
        workflow,
    })
}

/// Distinct string `type` of each node, in first-seen order
pub fn node_types(workflow: &Value) -> Vec<String> {
    let Some(nodes) = workflow.get("nodes").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter_map(|node| node.get("type").and_then(Value::as_str))
        .filter(|node_type| seen.insert(*node_type))
        .map(str::to_string)
        .collect()
}

fn file_name_string(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}
