//! End-to-end tests across assignment, screening and diversity.

use std::collections::HashMap;

use edna_core::contamination::screener::remove_contaminants;
use edna_core::diversity::{alpha_diversity_all, beta_diversity, pairwise_beta_diversity};
use edna_core::{
    AbundanceData, AssignmentEngine, AssignmentMethod, Asv, ContaminationScreener,
    ContaminationType, OfflineResolver, ReferenceCatalog, SampleSet, Severity, StaticResolver,
    TaxonomicAssignment,
};

fn reference_sequence(catalog: &ReferenceCatalog, id: &str) -> String {
    catalog
        .get(id)
        .unwrap_or_else(|| panic!("{id} missing from embedded catalog"))
        .sequence
        .clone()
}

fn survey(catalog: &ReferenceCatalog) -> Vec<Asv> {
    vec![
        Asv::new("ASV_1", reference_sequence(catalog, "REF_001"))
            .with_count("S1", 1200)
            .with_count("S2", 800),
        Asv::new("ASV_2", reference_sequence(catalog, "REF_002"))
            .with_count("S1", 300)
            .with_count("S2", 0),
        Asv::new("ASV_3", reference_sequence(catalog, "REF_010")).with_count("S1", 45),
        Asv::new("ASV_4", reference_sequence(catalog, "REF_008")).with_count("S2", 60),
    ]
}

fn by_id(assignments: Vec<TaxonomicAssignment>) -> HashMap<String, TaxonomicAssignment> {
    assignments
        .into_iter()
        .map(|a| (a.asv_id.clone(), a))
        .collect()
}

#[tokio::test]
async fn test_exact_reference_assignment() {
    let catalog = ReferenceCatalog::load_embedded().unwrap();
    let resolver = StaticResolver::new().with_species("Thunnus albacares", true);
    let engine = AssignmentEngine::new(&catalog, &resolver);

    let asv = Asv::new("ASV_1", reference_sequence(&catalog, "REF_001")).with_count("S1", 10);
    let assignment = engine.assign_taxonomy(&asv).await;

    assert_eq!(assignment.asv_id, "ASV_1");
    assert_eq!(assignment.confidence, 100);
    assert_eq!(assignment.method, AssignmentMethod::ReferenceMatch);
    assert_eq!(assignment.reference_id.as_deref(), Some("REF_001"));
    assert_eq!(assignment.lineage.species.as_deref(), Some("Thunnus albacares"));
    assert_eq!(assignment.is_marine, Some(true));
}

#[tokio::test]
async fn test_unrelated_sequence_is_unassigned() {
    let catalog = ReferenceCatalog::load_embedded().unwrap();
    let engine = AssignmentEngine::new(&catalog, &OfflineResolver);

    let asv = Asv::new("ASV_X", "A".repeat(120)).with_count("S1", 10);
    let assignment = engine.assign_taxonomy(&asv).await;

    assert!(!assignment.is_assigned());
    assert_eq!(assignment.confidence, 0);
    assert!(assignment.lineage.is_empty());
    assert!(assignment.reference_id.is_none());
}

#[tokio::test]
async fn test_screening_flags_contaminants_per_sample() {
    let catalog = ReferenceCatalog::load_embedded().unwrap();
    let engine = AssignmentEngine::new(&catalog, &OfflineResolver);
    let asvs = survey(&catalog);

    let batch = engine.assign_batch(&asvs).await;
    assert_eq!(batch.summary.total, 4);
    assert_eq!(batch.summary.assigned_count, 4);
    let assignments = by_id(batch.assignments);

    let screener = ContaminationScreener::new();
    let reports = screener.screen_samples(&asvs, &assignments);
    let samples: Vec<&str> = reports.iter().map(|r| r.sample_id.as_str()).collect();
    assert_eq!(samples, vec!["S1", "S2"]);

    // S1: tuna, cod and a human read set
    let s1 = &reports[0];
    assert_eq!(s1.total_asvs, 3);
    assert!(s1
        .flags
        .iter()
        .any(|f| f.asv_id == "ASV_3" && f.contamination_type == ContaminationType::LabContaminant));
    assert!(s1.severity_count(Severity::High) >= 1);
    assert!(!s1.is_clean);

    // S2: ASV_2 has a zero count and is not observed there
    let s2 = &reports[1];
    assert_eq!(s2.total_asvs, 2);
    assert!(s2
        .flags
        .iter()
        .any(|f| f.asv_id == "ASV_4" && f.contamination_type == ContaminationType::UnexpectedTaxa));
    assert!(s2.flags.iter().all(|f| f.asv_id != "ASV_2"));

    let flags = screener.detect_all(&asvs, &assignments);
    let removal = remove_contaminants(&asvs, &flags, Severity::High);
    assert_eq!(removal.removed, vec!["ASV_3".to_string()]);
    assert_eq!(removal.cleaned.len(), 3);

    let removal = remove_contaminants(&asvs, &flags, Severity::Medium);
    assert_eq!(
        removal.removed,
        vec!["ASV_3".to_string(), "ASV_4".to_string()]
    );
}

#[tokio::test]
async fn test_diversity_from_assignments() {
    let catalog = ReferenceCatalog::load_embedded().unwrap();
    let engine = AssignmentEngine::new(&catalog, &OfflineResolver);
    let asvs = survey(&catalog);
    let assignments = by_id(engine.assign_batch(&asvs).await.assignments);

    let samples = SampleSet::from_asvs(&asvs, &assignments);
    let s1 = samples.get("S1").unwrap();
    assert_eq!(s1.get("Thunnus albacares"), 1200);
    assert_eq!(s1.get("Gadus morhua"), 300);

    let alpha = alpha_diversity_all(&samples);
    assert_eq!(alpha.len(), 2);
    assert_eq!(alpha[0].sample_id, "S1");
    assert_eq!(alpha[0].richness, 3);
    assert_eq!(alpha[0].total_reads, 1545);
    assert!(alpha[0].shannon > 0.0);
    assert_eq!(alpha[1].richness, 2);

    let beta = pairwise_beta_diversity(&samples);
    assert_eq!(beta.len(), 1);
    assert_eq!(beta[0].shared_species, 1);
    assert!(beta[0].bray_curtis > 0.0 && beta[0].bray_curtis < 1.0);
}

#[test]
fn test_disjoint_samples_are_maximally_dissimilar() {
    let mut a = AbundanceData::new();
    a.add("A", 10);
    a.add("B", 0);
    let mut b = AbundanceData::new();
    b.add("A", 0);
    b.add("B", 10);

    let beta = beta_diversity("S1", &a, "S2", &b);
    assert!((beta.bray_curtis - 1.0).abs() < 1e-12);
    assert_eq!(beta.shared_species, 0);
    assert!((beta.jaccard - 1.0).abs() < 1e-12);
}
