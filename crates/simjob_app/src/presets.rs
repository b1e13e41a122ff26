use clap::ValueEnum;
use progress_core::StageDefinition;

/// Stage layouts for the dashboard's solution modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    AttributeExtraction,
    LowHangingFruit,
    CollectionBuilder,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::AttributeExtraction,
        Preset::LowHangingFruit,
        Preset::CollectionBuilder,
    ];

    /// Name used on the command line and in plan files.
    pub fn key(self) -> &'static str {
        match self {
            Preset::AttributeExtraction => "attribute-extraction",
            Preset::LowHangingFruit => "low-hanging-fruit",
            Preset::CollectionBuilder => "collection-builder",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::AttributeExtraction => "Attribute extraction",
            Preset::LowHangingFruit => "Low-hanging-fruit analysis",
            Preset::CollectionBuilder => "Collection builder",
        }
    }

    pub fn default_duration_ms(self) -> i64 {
        match self {
            Preset::AttributeExtraction => 12_000,
            Preset::LowHangingFruit => 9_000,
            Preset::CollectionBuilder => 6_000,
        }
    }

    pub fn stages(self) -> Vec<StageDefinition> {
        let weights: &[(&str, f64)] = match self {
            Preset::AttributeExtraction => &[
                ("Validating input", 10.0),
                ("Analyzing product titles", 25.0),
                ("Extracting attributes", 40.0),
                ("Normalizing values", 15.0),
                ("Generating output", 10.0),
            ],
            Preset::LowHangingFruit => &[
                ("Crawling pages", 30.0),
                ("Matching keywords", 30.0),
                ("Scoring opportunities", 25.0),
                ("Building report", 15.0),
            ],
            Preset::CollectionBuilder => &[
                ("Clustering products", 35.0),
                ("Drafting collections", 40.0),
                ("Writing metadata", 25.0),
            ],
        };
        weights
            .iter()
            .map(|(name, weight)| StageDefinition::new(*name, *weight))
            .collect()
    }
}
