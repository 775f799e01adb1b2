//! Output formatting for command results

use anyhow::{Context, Result};
use std::fmt::Write;

use crate::predeploy::{InferOutcome, SkipReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_outcome(&self, outcome: &InferOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome)
                .context("Failed to serialize outcome to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(outcome).context("Failed to serialize outcome to YAML")
            }
            OutputFormat::Human => Ok(format_outcome_human(outcome)),
        }
    }
}

fn format_outcome_human(outcome: &InferOutcome) -> String {
    let mut out = String::new();

    match outcome {
        InferOutcome::Skipped(SkipReason::AutoConfigureDisabled) => {
            out.push_str("Skipped: automatic pre-deploy configuration is disabled\n");
        }
        InferOutcome::Skipped(SkipReason::PreDeployTaskExists { task }) => {
            let _ = writeln!(out, "Skipped: pre-deploy task already set to '{}'", task);
        }
        InferOutcome::NotApplicable { discovered } => {
            let _ = writeln!(
                out,
                "Not a .NET workspace ({} .csproj file(s) found, runtime is not .NET)",
                discovered
            );
        }
        InferOutcome::Configured(plan) => {
            out.push_str("Configured .NET pre-deploy tasks\n");
            match &plan.descriptor {
                Some(descriptor) => {
                    let _ = writeln!(out, "  Project:        {}", descriptor.display());
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  Project:        assumed at {} ({} .csproj found)",
                        plan.project_dir.display(),
                        plan.discovered
                    );
                }
            }
            let _ = writeln!(out, "  Deploy subpath: {}", plan.deploy_subpath);
            let _ = writeln!(out, "  Publish path:   {}", plan.publish_path.display());
            out.push_str("  Tasks:\n");
            for task in &plan.tasks {
                match &task.depends_on {
                    Some(dep) => {
                        let _ = writeln!(out, "    {}: {} (after {})", task.label, task.command, dep);
                    }
                    None => {
                        let _ = writeln!(out, "    {}: {}", task.label, task.command);
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predeploy::PublishPlan;
    use crate::workspace::TaskSpec;
    use std::path::PathBuf;

    fn configured() -> InferOutcome {
        InferOutcome::Configured(PublishPlan {
            descriptor: Some(PathBuf::from("/ws/App.csproj")),
            discovered: 1,
            project_dir: PathBuf::from("/ws"),
            deploy_subpath: "bin/Debug/publish".to_string(),
            publish_path: PathBuf::from("/ws/bin/Debug/publish"),
            tasks: vec![
                TaskSpec::shell("clean", "dotnet clean /ws"),
                TaskSpec::shell("publish", "dotnet publish /ws -o /ws/bin/Debug/publish")
                    .depends_on("clean"),
            ],
        })
    }

    #[test]
    fn test_human_configured() {
        let out = OutputFormatter::new(OutputFormat::Human)
            .format_outcome(&configured())
            .unwrap();
        assert!(out.contains("Project:        /ws/App.csproj"));
        assert!(out.contains("publish: dotnet publish /ws -o /ws/bin/Debug/publish (after clean)"));
    }

    #[test]
    fn test_human_skipped() {
        let out = OutputFormatter::new(OutputFormat::Human)
            .format_outcome(&InferOutcome::Skipped(SkipReason::PreDeployTaskExists {
                task: "build".to_string(),
            }))
            .unwrap();
        assert!(out.contains("'build'"));
    }

    #[test]
    fn test_json_and_yaml() {
        let json = OutputFormatter::new(OutputFormat::Json)
            .format_outcome(&configured())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "configured");
        assert_eq!(value["tasks"][1]["dependsOn"], "clean");

        let yaml = OutputFormatter::new(OutputFormat::Yaml)
            .format_outcome(&InferOutcome::NotApplicable { discovered: 0 })
            .unwrap();
        assert!(yaml.contains("status: not_applicable"));
    }
}
