use serde::{Deserialize, Serialize};

/// Name reported when a job was started without explicit stages.
pub const DEFAULT_STAGE: &str = "default";

/// A named phase of a job and its share of the total duration.
///
/// Weights are expected to add up to 100 but nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    pub weight_percent: f64,
}

impl StageDefinition {
    pub fn new(name: impl Into<String>, weight_percent: f64) -> Self {
        Self {
            name: name.into(),
            weight_percent,
        }
    }
}

/// Maps a percentage onto a stage using cumulative weight boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMapper {
    stages: Vec<StageDefinition>,
    cumulative: Vec<f64>,
}

impl StageMapper {
    pub fn new(stages: Vec<StageDefinition>) -> Self {
        let cumulative = stages
            .iter()
            .scan(0.0, |total, stage| {
                *total += stage.weight_percent;
                Some(*total)
            })
            .collect();
        Self { stages, cumulative }
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Index of the first stage whose cumulative weight reaches `percent`.
    ///
    /// A boundary value belongs to the stage it closes, so `[A 30, B 30]` maps
    /// 30 to A and 31 to B. Percentages beyond the last boundary stay on the
    /// last stage. An empty list always yields index 0 (the default stage).
    pub fn stage_index(&self, percent: u8) -> usize {
        let target = f64::from(percent);
        self.cumulative
            .iter()
            .position(|boundary| *boundary >= target)
            .unwrap_or_else(|| self.stages.len().saturating_sub(1))
    }

    pub fn stage_name(&self, percent: u8) -> &str {
        self.name_at(self.stage_index(percent))
    }

    pub fn name_at(&self, index: usize) -> &str {
        self.stages
            .get(index)
            .map(|stage| stage.name.as_str())
            .unwrap_or(DEFAULT_STAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(weights: &[(&str, f64)]) -> StageMapper {
        StageMapper::new(
            weights
                .iter()
                .map(|(name, weight)| StageDefinition::new(*name, *weight))
                .collect(),
        )
    }

    #[test]
    fn empty_list_reports_default_stage() {
        let mapper = StageMapper::new(Vec::new());
        assert_eq!(mapper.stage_name(0), DEFAULT_STAGE);
        assert_eq!(mapper.stage_name(100), DEFAULT_STAGE);
        assert_eq!(mapper.stage_index(55), 0);
    }

    #[test]
    fn uneven_weights_use_cumulative_boundaries() {
        let mapper = mapper(&[("fetch", 10.0), ("enrich", 80.0), ("write", 10.0)]);
        assert_eq!(mapper.stage_name(0), "fetch");
        assert_eq!(mapper.stage_name(10), "fetch");
        assert_eq!(mapper.stage_name(11), "enrich");
        assert_eq!(mapper.stage_name(90), "enrich");
        assert_eq!(mapper.stage_name(91), "write");
    }

    #[test]
    fn short_weights_stay_on_last_stage() {
        let mapper = mapper(&[("a", 20.0), ("b", 20.0)]);
        assert_eq!(mapper.stage_name(41), "b");
        assert_eq!(mapper.stage_name(100), "b");
    }

    #[test]
    fn rounding_in_thirds_still_ends_on_last_stage() {
        let mapper = mapper(&[("a", 33.3), ("b", 33.3), ("c", 33.4)]);
        assert_eq!(mapper.stage_name(100), "c");
        assert_eq!(mapper.stage_name(67), "c");
    }

    #[test]
    fn zero_weight_stage_is_skipped_except_at_its_boundary() {
        let mapper = mapper(&[("a", 50.0), ("marker", 0.0), ("b", 50.0)]);
        assert_eq!(mapper.stage_name(50), "a");
        assert_eq!(mapper.stage_name(51), "b");
    }
}
