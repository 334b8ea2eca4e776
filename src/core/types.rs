use serde::{Deserialize, Serialize};

/// Identifier of a water sample within a survey run
pub type SampleId = String;

/// Taxonomic rank, ordered from most general to most specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// All ranks, top-down
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
        };
        write!(f, "{name}")
    }
}

/// How a taxonomic assignment was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentMethod {
    /// k-mer match against the local reference catalog
    ReferenceMatch,
    /// Name resolved directly by the external taxonomy authority
    AuthorityLookup,
    /// Curated by hand
    Manual,
}

impl std::fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReferenceMatch => write!(f, "reference-match"),
            Self::AuthorityLookup => write!(f, "authority-lookup"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Kind of contamination a flag reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContaminationType {
    UnexpectedTaxa,
    CrossContamination,
    NegativeControl,
    LabContaminant,
    IndexBleed,
}

impl std::fmt::Display for ContaminationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTaxa => write!(f, "unexpected-taxa"),
            Self::CrossContamination => write!(f, "cross-contamination"),
            Self::NegativeControl => write!(f, "negative-control"),
            Self::LabContaminant => write!(f, "lab-contaminant"),
            Self::IndexBleed => write!(f, "index-bleed"),
        }
    }
}

/// Severity of a contamination flag
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    #[default]
    High,
}

impl Severity {
    /// Contribution of one flag of this severity to the contamination score
    #[must_use]
    pub fn score_weight(self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Medium => 5,
            Self::High => 20,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown severity '{other}' (expected low, medium or high)"
            )),
        }
    }
}

/// Environment a survey was expected to sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Marine,
    Freshwater,
    Terrestrial,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Marine => write!(f, "marine"),
            Self::Freshwater => write!(f, "freshwater"),
            Self::Terrestrial => write!(f, "terrestrial"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "marine" => Ok(Self::Marine),
            "freshwater" => Ok(Self::Freshwater),
            "terrestrial" => Ok(Self::Terrestrial),
            other => Err(format!(
                "unknown environment '{other}' (expected marine, freshwater or terrestrial)"
            )),
        }
    }
}
