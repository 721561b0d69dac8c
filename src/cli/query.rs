use clap::Args;

use crate::catalog::store::BeaconCatalog;
use crate::cli::{EngineOptions, OutputFormat};
use crate::core::query::Query;
use crate::core::result::BeaconResponse;
use crate::core::types::{BeaconId, ReferenceGenome};

#[derive(Args)]
pub struct QueryArgs {
    /// Chromosome (e.g. "13", "X")
    #[arg(long)]
    pub chrom: Option<String>,

    /// Position on the chromosome
    #[arg(long)]
    pub pos: Option<u64>,

    /// Alternate allele (e.g. "G")
    #[arg(long)]
    pub allele: Option<String>,

    /// Reference genome of the position (hg18, hg19, hg38 or GRCh37/38)
    #[arg(long = "ref")]
    pub reference: Option<ReferenceGenome>,

    /// Ask only this beacon (aggregators are answered from their children)
    #[arg(long)]
    pub beacon: Option<String>,
}

impl QueryArgs {
    #[must_use]
    pub fn to_query(&self) -> Query {
        Query {
            chromosome: self.chrom.clone(),
            position: self.pos,
            allele: self.allele.clone(),
            reference: self.reference,
        }
    }
}

/// Ask the beacons and print their answers.
///
/// An incomplete query is still answered (no without asking anyone for the
/// whole catalog, unknown for a single beacon), matching the HTTP API.
pub fn run(
    args: QueryArgs,
    format: OutputFormat,
    engine: &EngineOptions,
    verbose: bool,
) -> anyhow::Result<()> {
    let dispatcher = engine.dispatcher()?;
    let catalog = dispatcher.catalog().snapshot();
    let query = args.to_query();

    if verbose {
        eprintln!("Loaded catalog with {} beacons", catalog.len());
        if !query.is_valid() {
            eprintln!("Query is incomplete; no beacon will be asked");
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    let responses = rt.block_on(async {
        match &args.beacon {
            Some(id) => vec![
                dispatcher
                    .respond_one(&BeaconId::new(id.as_str()), &query)
                    .await,
            ],
            None => dispatcher.respond_all(&query).await,
        }
    });

    print_responses(&responses, &query, &catalog, format)
}

fn print_responses(
    responses: &[BeaconResponse],
    query: &Query,
    catalog: &BeaconCatalog,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let id_width = responses
                .iter()
                .map(|r| r.beacon.id.as_deref().unwrap_or("-").len())
                .max()
                .unwrap_or(6)
                .max(6);
            let name_width = responses
                .iter()
                .map(|r| r.beacon.name.len().min(35))
                .max()
                .unwrap_or(4)
                .max(4);

            println!("Query: {query}\n");
            println!(
                "{:<id_width$}  {:<name_width$}  {:<8}  Note",
                "Beacon", "Name", "Answer"
            );
            println!("{}", "-".repeat(id_width + name_width + 20));

            for response in responses {
                let name = if response.beacon.name.len() > 35 {
                    format!("{}...", response.beacon.name.chars().take(32).collect::<String>())
                } else {
                    response.beacon.name.clone()
                };
                println!(
                    "{:<id_width$}  {:<name_width$}  {:<8}  {}",
                    response.beacon.id.as_deref().unwrap_or("-"),
                    name,
                    response.response.to_string(),
                    response.error.map(|e| e.to_string()).unwrap_or_default(),
                );
            }

            if let Some(aggregate) = responses.last().filter(|_| responses.len() > 1) {
                println!(
                    "\nAny of {} beacons: {}",
                    catalog.list_visible().len(),
                    aggregate.response
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(responses)?);
        }
        OutputFormat::Tsv => {
            println!("beacon\tname\tresponse\terror");
            for response in responses {
                println!(
                    "{}\t{}\t{}\t{}",
                    response.beacon.id.as_deref().unwrap_or(""),
                    response.beacon.name,
                    response.response,
                    response.error.map(|e| e.to_string()).unwrap_or_default(),
                );
            }
        }
    }

    Ok(())
}
