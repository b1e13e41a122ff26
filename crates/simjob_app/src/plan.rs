//! Job plans: RON files listing the jobs to simulate and how to tick them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_info;
use progress_core::{ProgressError, ProgressSettings, StageDefinition, DEFAULT_LOG_EVERY_PERCENT};
use progress_engine::{EngineConfig, JobSpec, DEFAULT_TICK_INTERVAL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::presets::Preset;

const DEFAULT_TICK_INTERVAL_MS: u64 = DEFAULT_TICK_INTERVAL.as_millis() as u64;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse plan {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
    #[error("job {0:?} sets both a preset and explicit stages")]
    AmbiguousStages(String),
    #[error("plan has no jobs")]
    Empty,
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    #[error("job {name:?}: {source}")]
    InvalidJob { name: String, source: ProgressError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPlan {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_log_every_percent")]
    pub log_every_percent: u8,
    pub jobs: Vec<PlannedJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedJob {
    pub name: String,
    pub duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<StageDefinition>,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_log_every_percent() -> u8 {
    DEFAULT_LOG_EVERY_PERCENT
}

impl JobPlan {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let plan: JobPlan = ron::from_str(&text).map_err(|source| PlanError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        engine_info!("Loaded plan {:?} with {} jobs", path, plan.jobs.len());
        Ok(plan)
    }

    /// A plan holding one job built from a preset.
    pub fn from_preset(preset: Preset, duration_ms: Option<i64>) -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            log_every_percent: DEFAULT_LOG_EVERY_PERCENT,
            jobs: vec![PlannedJob {
                name: preset.label().to_string(),
                duration_ms: duration_ms.unwrap_or_else(|| preset.default_duration_ms()),
                preset: Some(preset.key().to_string()),
                stages: Vec::new(),
            }],
        }
    }

    /// One job per preset, used as a starting point for hand-written plans.
    pub fn sample() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            log_every_percent: DEFAULT_LOG_EVERY_PERCENT,
            jobs: Preset::ALL
                .into_iter()
                .map(|preset| PlannedJob {
                    name: preset.label().to_string(),
                    duration_ms: preset.default_duration_ms(),
                    preset: None,
                    stages: preset.stages(),
                })
                .collect(),
        }
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }

    pub fn engine_config(&self) -> Result<EngineConfig, PlanError> {
        if self.tick_interval_ms == 0 {
            return Err(PlanError::ZeroTickInterval);
        }
        Ok(EngineConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            progress: ProgressSettings {
                log_every_percent: self.log_every_percent,
            },
        })
    }

    /// Resolves presets and validates every job.
    pub fn job_specs(&self) -> Result<Vec<JobSpec>, PlanError> {
        if self.jobs.is_empty() {
            return Err(PlanError::Empty);
        }
        self.jobs.iter().map(PlannedJob::to_spec).collect()
    }
}

impl PlannedJob {
    fn to_spec(&self) -> Result<JobSpec, PlanError> {
        let stages = match self.preset.as_deref() {
            Some(_) if !self.stages.is_empty() => {
                return Err(PlanError::AmbiguousStages(self.name.clone()));
            }
            Some(key) => Preset::from_key(key)
                .ok_or_else(|| PlanError::UnknownPreset(key.to_string()))?
                .stages(),
            None => self.stages.clone(),
        };
        let spec = JobSpec::new(self.name.clone(), self.duration_ms, stages);
        spec.validate().map_err(|source| PlanError::InvalidJob {
            name: self.name.clone(),
            source,
        })?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_plan(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_plan_with_defaults_and_presets() {
        let file = write_plan(
            r#"(
                jobs: [
                    (name: "Spring catalog", duration_ms: 3000, preset: Some("collection-builder")),
                    (name: "Custom", duration_ms: 1000, stages: [
                        (name: "Warmup", weight_percent: 20.0),
                        (name: "Main", weight_percent: 80.0),
                    ]),
                ],
            )"#,
        );

        let plan = JobPlan::load(file.path()).unwrap();
        assert_eq!(plan.tick_interval_ms, 100);
        assert_eq!(plan.log_every_percent, 7);

        let specs = plan.job_specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].stages, Preset::CollectionBuilder.stages());
        assert_eq!(
            specs[1].stages,
            vec![
                StageDefinition::new("Warmup", 20.0),
                StageDefinition::new("Main", 80.0),
            ]
        );

        let config = plan.engine_config().unwrap();
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = JobPlan::load(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, PlanError::Read { .. }));
        assert!(err.to_string().contains("here.ron"));
    }

    #[test]
    fn malformed_plan_is_a_parse_error() {
        let file = write_plan("(jobs: [ (name: 3) ])");
        assert!(matches!(
            JobPlan::load(file.path()),
            Err(PlanError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_jobs_are_rejected() {
        let mut plan = JobPlan::from_preset(Preset::LowHangingFruit, Some(0));
        assert!(matches!(
            plan.job_specs(),
            Err(PlanError::InvalidJob { .. })
        ));

        plan.jobs[0].duration_ms = 100;
        plan.jobs[0].preset = Some("nope".to_string());
        assert!(matches!(plan.job_specs(), Err(PlanError::UnknownPreset(key)) if key == "nope"));

        plan.jobs[0].preset = Some("low-hanging-fruit".to_string());
        plan.jobs[0].stages = vec![StageDefinition::new("x", 100.0)];
        assert!(matches!(plan.job_specs(), Err(PlanError::AmbiguousStages(_))));

        plan.jobs.clear();
        assert!(matches!(plan.job_specs(), Err(PlanError::Empty)));
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut plan = JobPlan::sample();
        plan.tick_interval_ms = 0;
        assert!(matches!(
            plan.engine_config(),
            Err(PlanError::ZeroTickInterval)
        ));
    }

    #[test]
    fn sample_plan_is_loadable() {
        let text = JobPlan::sample().to_ron().unwrap();
        let file = write_plan(&text);
        let plan = JobPlan::load(file.path()).unwrap();
        assert_eq!(plan, JobPlan::sample());
        assert_eq!(plan.job_specs().unwrap().len(), Preset::ALL.len());
    }
}
