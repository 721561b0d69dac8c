use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::catalog::hierarchy;
use crate::catalog::store::BeaconCatalog;
use crate::cli::{EngineOptions, OutputFormat};
use crate::core::beacon::Beacon;
use crate::core::types::BeaconId;
use crate::provider::registry::StrategyRegistry;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all visible beacons in the catalog
    List {
        /// Also list hidden beacons
        #[arg(long)]
        all: bool,
    },

    /// Show details of a specific beacon
    Show {
        /// Beacon ID
        #[arg(required = true)]
        id: String,
    },

    /// Print the aggregator hierarchy
    Tree {
        /// Start from this beacon instead of the catalog roots
        root: Option<String>,
    },

    /// List the provider strategies and how many beacons use each
    Strategies,

    /// Export the catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,
    },
}

/// Run a catalog subcommand
pub fn run(
    args: CatalogArgs,
    format: OutputFormat,
    engine: &EngineOptions,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = engine.load_catalog()?;
    if verbose {
        eprintln!(
            "Loaded catalog with {} beacons from {} organizations",
            catalog.len(),
            catalog.organizations().len()
        );
    }

    match args.command {
        CatalogCommands::List { all } => run_list(&catalog, all, format),
        CatalogCommands::Show { id } => run_show(&catalog, &BeaconId::new(id), format),
        CatalogCommands::Tree { root } => run_tree(&catalog, root.map(BeaconId::new), format),
        CatalogCommands::Strategies => run_strategies(&catalog, format),
        CatalogCommands::Export { output } => run_export(&catalog, &output),
    }
}

/// Strategy name for leaves, `aggregator` otherwise
fn kind(beacon: &Beacon) -> &'static str {
    beacon.strategy.map_or("aggregator", |s| s.name())
}

fn organization_name<'a>(catalog: &'a BeaconCatalog, beacon: &'a Beacon) -> &'a str {
    catalog
        .get_organization(&beacon.organization)
        .map_or(beacon.organization.0.as_str(), |o| o.name.as_str())
}

fn references(beacon: &Beacon) -> String {
    beacon
        .supported_references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn run_list(catalog: &BeaconCatalog, all: bool, format: OutputFormat) -> anyhow::Result<()> {
    let beacons: Vec<&Beacon> = if all {
        catalog.beacons().iter().collect()
    } else {
        catalog.list_visible()
    };

    match format {
        OutputFormat::Text => {
            let id_width = beacons.iter().map(|b| b.id.0.len()).max().unwrap_or(2).max(2);
            let name_width = beacons
                .iter()
                .map(|b| b.name.len().min(35))
                .max()
                .unwrap_or(4)
                .max(4);
            let org_width = beacons
                .iter()
                .map(|b| organization_name(catalog, b).len().min(30))
                .max()
                .unwrap_or(12)
                .max(12);

            println!("Beacon Catalog ({} beacons)\n", beacons.len());
            println!(
                "{:<id_width$}  {:<name_width$}  {:<org_width$}  {:<29}  Status",
                "ID", "Name", "Organization", "Kind"
            );
            println!("{}", "-".repeat(id_width + name_width + org_width + 45));

            for beacon in &beacons {
                let mut status = Vec::new();
                if !beacon.enabled {
                    status.push("disabled");
                }
                if !beacon.visible {
                    status.push("hidden");
                }
                println!(
                    "{:<id_width$}  {:<name_width$.35}  {:<org_width$.30}  {:<29}  {}",
                    beacon.id.0,
                    beacon.name,
                    organization_name(catalog, beacon),
                    kind(beacon),
                    if status.is_empty() {
                        "ok".to_string()
                    } else {
                        status.join(",")
                    }
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = beacons
                .iter()
                .map(|b| {
                    serde_json::json!({
                        "id": b.id,
                        "name": b.name,
                        "organization": organization_name(catalog, b),
                        "aggregator": b.aggregator,
                        "strategy": b.strategy,
                        "enabled": b.enabled,
                        "visible": b.visible,
                        "children": b.children,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\torganization\tkind\tenabled\tvisible\treferences\turl");
            for b in &beacons {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    b.id,
                    b.name,
                    organization_name(catalog, b),
                    kind(b),
                    b.enabled,
                    b.visible,
                    references(b),
                    b.url.as_deref().unwrap_or(""),
                );
            }
        }
    }

    Ok(())
}

fn run_show(catalog: &BeaconCatalog, id: &BeaconId, format: OutputFormat) -> anyhow::Result<()> {
    let beacon = catalog
        .get_beacon(id)
        .ok_or_else(|| anyhow::anyhow!("Beacon '{id}' not found"))?;

    match format {
        OutputFormat::Text => {
            println!("Beacon: {}\n", beacon.name);
            println!("ID:           {}", beacon.id);
            println!("Organization: {}", organization_name(catalog, beacon));
            println!("Kind:         {}", kind(beacon));
            println!("Enabled:      {}", beacon.enabled);
            println!("Visible:      {}", beacon.visible);
            if let Some(url) = &beacon.url {
                println!("URL:          {url}");
            }
            if !beacon.supported_references.is_empty() {
                println!("References:   {}", references(beacon));
            }
            if let Some(desc) = &beacon.description {
                println!("\nDescription: {desc}");
            }

            let parents = catalog.list_parents(&beacon.id);
            if !parents.is_empty() {
                let names: Vec<&str> = parents.iter().map(|p| p.id.as_str()).collect();
                println!("\nPart of: {}", names.join(", "));
            }

            let children = catalog.list_children(&beacon.id);
            if !children.is_empty() {
                println!("\nChildren ({}):", children.len());
                for child in children {
                    println!("  {:<25} {}", child.id.0, child.name);
                }
            }

            if beacon.aggregator {
                let leaves = hierarchy::leaf_descendants(catalog, &beacon.id);
                println!("\nAnswers from {} leaf beacons", leaves.len());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(beacon)?);
        }
        OutputFormat::Tsv => {
            println!("child\tname\tkind");
            for child in catalog.list_children(&beacon.id) {
                println!("{}\t{}\t{}", child.id, child.name, kind(child));
            }
        }
    }

    Ok(())
}

fn run_tree(
    catalog: &BeaconCatalog,
    root: Option<BeaconId>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let roots: Vec<BeaconId> = match root {
        Some(id) => {
            if catalog.get_beacon(&id).is_none() {
                anyhow::bail!("Beacon '{id}' not found");
            }
            vec![id]
        }
        None => catalog.roots().iter().map(|b| b.id.clone()).collect(),
    };

    let lines: Vec<(usize, BeaconId)> = roots
        .iter()
        .flat_map(|root| hierarchy::tree_lines(catalog, root))
        .collect();

    match format {
        OutputFormat::Text => {
            for (depth, id) in &lines {
                let name = catalog.get_beacon(id).map_or("", |b| b.name.as_str());
                println!("{}{id} ({name})", "  ".repeat(*depth));
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = lines
                .iter()
                .map(|(depth, id)| serde_json::json!({ "depth": depth, "id": id }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("depth\tid");
            for (depth, id) in &lines {
                println!("{depth}\t{id}");
            }
        }
    }

    Ok(())
}

fn run_strategies(catalog: &BeaconCatalog, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<(&'static str, &'static str, usize)> = StrategyRegistry::iter()
        .map(|(id, strategy)| {
            let used_by = catalog
                .beacons()
                .iter()
                .filter(|b| b.strategy == Some(id))
                .count();
            (id.name(), strategy.parser.name(), used_by)
        })
        .collect();

    match format {
        OutputFormat::Text => {
            println!("{:<29}  {:<32}  Beacons", "Strategy", "Parser");
            println!("{}", "-".repeat(72));
            for (name, parser, used_by) in &rows {
                println!("{name:<29}  {parser:<32}  {used_by}");
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = rows
                .iter()
                .map(|(name, parser, used_by)| {
                    serde_json::json!({ "strategy": name, "parser": parser, "beacons": used_by })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("strategy\tparser\tbeacons");
            for (name, parser, used_by) in &rows {
                println!("{name}\t{parser}\t{used_by}");
            }
        }
    }

    Ok(())
}

fn run_export(catalog: &BeaconCatalog, output: &Path) -> anyhow::Result<()> {
    let json = catalog.to_json()?;
    std::fs::write(output, json)?;

    println!("Exported {} beacons to {}", catalog.len(), output.display());

    Ok(())
}
