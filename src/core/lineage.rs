use serde::{Deserialize, Serialize};

use crate::core::types::{AssignmentMethod, Rank};

/// Taxonomic lineage from kingdom down to species; every rank is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lineage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kingdom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phylum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
}

impl Lineage {
    /// Value at `rank`, treating empty strings as unset
    #[must_use]
    pub fn get(&self, rank: Rank) -> Option<&str> {
        let value = match rank {
            Rank::Kingdom => &self.kingdom,
            Rank::Phylum => &self.phylum,
            Rank::Class => &self.class,
            Rank::Order => &self.order,
            Rank::Family => &self.family,
            Rank::Genus => &self.genus,
            Rank::Species => &self.species,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, rank: Rank, value: impl Into<String>) {
        let slot = match rank {
            Rank::Kingdom => &mut self.kingdom,
            Rank::Phylum => &mut self.phylum,
            Rank::Class => &mut self.class,
            Rank::Order => &mut self.order,
            Rank::Family => &mut self.family,
            Rank::Genus => &mut self.genus,
            Rank::Species => &mut self.species,
        };
        *slot = Some(value.into());
    }

    /// True when no rank is populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Rank::ALL.iter().all(|&rank| self.get(rank).is_none())
    }

    /// Deepest populated rank and its value
    #[must_use]
    pub fn most_specific(&self) -> Option<(Rank, &str)> {
        Rank::ALL
            .iter()
            .rev()
            .find_map(|&rank| self.get(rank).map(|value| (rank, value)))
    }

    /// Semicolon-joined lineage, e.g. `Animalia;Chordata;...`
    #[must_use]
    pub fn to_path(&self) -> String {
        Rank::ALL
            .iter()
            .filter_map(|&rank| self.get(rank))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Taxonomic identity resolved for one ASV.
///
/// A confidence of 0 means the ASV is unassigned and the lineage is empty.
/// Any assignment with a positive confidence carries at least a kingdom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomicAssignment {
    pub asv_id: String,

    #[serde(flatten)]
    pub lineage: Lineage,

    /// 0-100
    pub confidence: u8,

    pub method: AssignmentMethod,

    /// Catalog entry the lineage was taken from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,

    /// Habitat flag; `None` when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_marine: Option<bool>,
}

impl TaxonomicAssignment {
    /// Assignment for an ASV with no qualifying reference hit
    pub fn unassigned(asv_id: impl Into<String>) -> Self {
        Self {
            asv_id: asv_id.into(),
            lineage: Lineage::default(),
            confidence: 0,
            method: AssignmentMethod::ReferenceMatch,
            reference_id: None,
            is_marine: None,
        }
    }

    /// Assignment built from a lineage.
    ///
    /// Falls back to [`TaxonomicAssignment::unassigned`] when the confidence is 0
    /// or the lineage has no kingdom, so the unassigned invariant always holds.
    pub fn assigned(
        asv_id: impl Into<String>,
        lineage: Lineage,
        confidence: u8,
        method: AssignmentMethod,
    ) -> Self {
        let asv_id = asv_id.into();
        if confidence == 0 || lineage.get(Rank::Kingdom).is_none() {
            return Self::unassigned(asv_id);
        }

        Self {
            asv_id,
            lineage,
            confidence: confidence.min(100),
            method,
            reference_id: None,
            is_marine: None,
        }
    }

    #[must_use]
    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        if self.is_assigned() {
            self.reference_id = Some(reference_id.into());
        }
        self
    }

    #[must_use]
    pub fn with_habitat(mut self, is_marine: Option<bool>) -> Self {
        if self.is_assigned() {
            self.is_marine = is_marine;
        }
        self
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.confidence > 0
    }

    /// Label used for abundance tables: deepest populated rank, else the ASV id
    #[must_use]
    pub fn label(&self) -> &str {
        self.lineage
            .most_specific()
            .map_or(self.asv_id.as_str(), |(_, value)| value)
    }
}
