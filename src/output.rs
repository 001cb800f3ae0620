use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::summary::{ElementDetail, Summary};

#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize, Default, PartialEq,)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl OutputFormat {
    pub fn from_extension(path: &Path,) -> Option<OutputFormat,> {
        path.extension()
            .and_then(|ext| ext.to_str(),)
            .and_then(|ext_str| match ext_str.to_lowercase().as_str() {
                "json" => Some(OutputFormat::Json,),
                "yaml" | "yml" => Some(OutputFormat::Yaml,),
                "txt" => Some(OutputFormat::Text,),
                _ => None,
            },)
    }
}

/// What the CLI prints: one summary, or one per file of a directory.
#[derive(Debug, Clone, PartialEq,)]
pub enum SummaryReport {
    Document { origin: String, summary: Summary, },
    Directory(Vec<(PathBuf, Summary,),>,),
}

#[derive(Serialize,)]
struct DirectoryEntry<'a,> {
    path:   String,
    result: &'a Summary,
}

impl SummaryReport {
    pub fn to_string_formatted(&self, format: OutputFormat,) -> String {
        match format {
            OutputFormat::Json => match self {
                SummaryReport::Document { summary, .. } => serde_json::to_string_pretty(summary,)
                    .unwrap_or_else(|e| format!("Error serializing to JSON: {}", e),),
                SummaryReport::Directory(results,) => {
                    serde_json::to_string_pretty(&directory_entries(results,),).unwrap_or_else(
                        |e| format!("Error serializing directory results to JSON: {}", e),
                    )
                },
            },
            OutputFormat::Yaml => match self {
                SummaryReport::Document { summary, .. } => serde_yaml::to_string(summary,)
                    .unwrap_or_else(|e| format!("Error serializing to YAML: {}", e),),
                SummaryReport::Directory(results,) => {
                    serde_yaml::to_string(&directory_entries(results,),).unwrap_or_else(|e| {
                        format!("Error serializing directory results to YAML: {}", e)
                    },)
                },
            },
            OutputFormat::Text => match self {
                SummaryReport::Document { origin, summary, } => render_text(origin, summary,),
                SummaryReport::Directory(results,) => results
                    .iter()
                    .map(|(path, summary,)| render_text(&path.display().to_string(), summary,),)
                    .collect::<Vec<String,>>()
                    .join("\n\n",),
            },
        }
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        write!(f, "{}", self.to_string_formatted(OutputFormat::Text))
    }
}

fn directory_entries(results: &[(PathBuf, Summary,)],) -> Vec<DirectoryEntry<'_,>,> {
    results
        .iter()
        .map(|(path, summary,)| DirectoryEntry {
            path:   path.to_string_lossy().into_owned(),
            result: summary,
        },)
        .collect()
}

fn render_text(origin: &str, summary: &Summary,) -> String {
    let mut output = String::new();
    output.push_str(&format!("--- UI Dump: {} ---\n", origin),);
    output.push_str(&format!(
        "Elements with resource-id:    {}\n",
        summary.elements_with_resource_id
    ),);
    output.push_str(&format!(
        "Elements without resource-id: {}\n",
        summary.elements_without_resource_id
    ),);
    output.push_str(&format!("Elements focused:             {}\n", summary.elements_focused),);
    output.push_str(&format!(
        "Elements not focused:         {}\n",
        summary.elements_not_focused
    ),);

    output.push_str("\nWith resource-id:\n",);
    push_details(&mut output, &summary.with_resource_id_details,);
    output.push_str("\nMissing resource-id:\n",);
    push_details(&mut output, &summary.missing_resource_id_details,);
    output
}

fn push_details(output: &mut String, details: &[ElementDetail],) {
    if details.is_empty() {
        output.push_str("  (none)\n",);
        return;
    }
    for detail in details {
        output.push_str("  ",);
        output.push_str(&detail.xpath,);
        let fields = [
            ("resource_id", &detail.resource_id,),
            ("bounds", &detail.bounds,),
            ("text", &detail.text,),
            ("focused", &detail.focused,),
        ];
        for (name, value,) in fields {
            if let Some(value,) = value {
                output.push_str(&format!(" {}={:?}", name, value),);
            }
        }
        output.push('\n',);
    }
}
