use std::collections::HashSet;
use std::path::Path;

fn main() {
    let catalog_path = Path::new("catalogs/beacons.json");
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the catalog file before building.\n",
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

    let organizations: HashSet<&str> = catalog
        .get("organizations")
        .and_then(|o| o.as_array())
        .map(|orgs| {
            orgs.iter()
                .filter_map(|o| o.get("id").and_then(|v| v.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let beacons = catalog
        .get("beacons")
        .and_then(|b| b.as_array())
        .unwrap_or_else(|| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Missing 'beacons' array\n\
                 The catalog must have a top-level 'beacons' array.\n"
            );
        });

    let ids: HashSet<&str> = beacons
        .iter()
        .filter_map(|b| b.get("id").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(
        ids.len(),
        beacons.len(),
        "\n\nCATALOG BUILD ERROR: Beacon ids must be present and unique\n"
    );

    let mut aggregators = 0;
    for (i, beacon) in beacons.iter().enumerate() {
        if validate_beacon(beacon, i, &organizations, &ids) {
            aggregators += 1;
        }
    }

    println!(
        "cargo:warning=Validated catalog: {} beacons, {aggregators} aggregators",
        beacons.len()
    );
}

/// Returns whether the beacon is an aggregator
fn validate_beacon(
    beacon: &serde_json::Value,
    index: usize,
    organizations: &HashSet<&str>,
    ids: &HashSet<&str>,
) -> bool {
    let id = beacon
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown>");

    assert!(
        beacon.get("name").is_some(),
        "\n\nCATALOG BUILD ERROR: Beacon '{id}' (index {index}) missing 'name' field\n"
    );

    let organization = beacon
        .get("organization")
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| {
            panic!("\n\nCATALOG BUILD ERROR: Beacon '{id}' (index {index}) missing 'organization' field\n")
        });
    assert!(
        organizations.contains(organization),
        "\n\nCATALOG BUILD ERROR: Beacon '{id}' references unknown organization '{organization}'\n"
    );

    let aggregator = beacon
        .get("aggregator")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    let has_strategy = beacon.get("strategy").is_some_and(|s| !s.is_null());
    assert!(
        aggregator != has_strategy,
        "\n\nCATALOG BUILD ERROR: Beacon '{id}' must be either an aggregator or declare a strategy\n"
    );

    if let Some(children) = beacon.get("children").and_then(|c| c.as_array()) {
        assert!(
            aggregator || children.is_empty(),
            "\n\nCATALOG BUILD ERROR: Beacon '{id}' is not an aggregator but has children\n"
        );
        for child in children {
            let child = child.as_str().unwrap_or("<invalid>");
            assert!(
                ids.contains(child),
                "\n\nCATALOG BUILD ERROR: Beacon '{id}' lists unknown child '{child}'\n"
            );
        }
    }

    aggregator
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed=catalogs/beacons.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
