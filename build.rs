use std::collections::HashSet;
use std::path::Path;

const CATALOG_PATH: &str = "catalogs/reference_sequences.json";
const RANKS: [&str; 7] = [
    "kingdom", "phylum", "class", "order", "family", "genus", "species",
];

fn main() {
    let catalog_path = Path::new(CATALOG_PATH);
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the reference catalog before building.\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    let entries = catalog.get("entries").unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Missing 'entries' field\n\
             The catalog must have a top-level 'entries' array.\n"
        );
    });

    let entries = entries.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: 'entries' must be an array\n\
             Got: {entries}\n"
        );
    });

    let mut seen_ids = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let entry_id = entry
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");

        assert!(
            seen_ids.insert(entry_id.to_string()),
            "\n\nCATALOG BUILD ERROR: Duplicate entry id '{entry_id}' (index {i})\n"
        );
        validate_entry_fields(entry, entry_id, i);
        validate_entry_lineage(entry, entry_id);
    }

    println!(
        "cargo:warning=Validated reference catalog: {} entries",
        entries.len()
    );
}

fn validate_entry_fields(entry: &serde_json::Value, entry_id: &str, index: usize) {
    assert!(
        entry.get("id").is_some(),
        "\n\nCATALOG BUILD ERROR: Entry at index {index} missing 'id' field\n"
    );

    let sequence = entry
        .get("sequence")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_else(|| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Entry '{entry_id}' (index {index}) missing 'sequence' string\n"
            )
        });
    assert!(
        !sequence.is_empty(),
        "\n\nCATALOG BUILD ERROR: Entry '{entry_id}' has an empty sequence\n"
    );
    assert!(
        sequence
            .chars()
            .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N')),
        "\n\nCATALOG BUILD ERROR: Entry '{entry_id}' sequence contains non-nucleotide characters\n"
    );
}

fn validate_entry_lineage(entry: &serde_json::Value, entry_id: &str) {
    let lineage = entry.get("lineage").unwrap_or_else(|| {
        panic!("\n\nCATALOG BUILD ERROR: Entry '{entry_id}' missing 'lineage' object\n")
    });

    let kingdom = lineage
        .get("kingdom")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    assert!(
        !kingdom.is_empty(),
        "\n\nCATALOG BUILD ERROR: Entry '{entry_id}' lineage must set a kingdom\n"
    );

    if let Some(object) = lineage.as_object() {
        for key in object.keys() {
            assert!(
                RANKS.contains(&key.as_str()),
                "\n\nCATALOG BUILD ERROR: Entry '{entry_id}' lineage has unknown rank '{key}'\n"
            );
        }
    }
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed={CATALOG_PATH}");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
