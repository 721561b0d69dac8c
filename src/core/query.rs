use serde::{Deserialize, Serialize};

use crate::core::types::ReferenceGenome;

/// A variant lookup: is `allele` observed at `chromosome:position`?
///
/// Fields are optional because queries arrive from untrusted input; a query
/// missing any of chromosome, position or allele is invalid and is never
/// dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "chrom")]
    pub chromosome: Option<String>,

    #[serde(rename = "pos")]
    pub position: Option<u64>,

    pub allele: Option<String>,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceGenome>,
}

/// The validated parts of a [`Query`], borrowed for request templating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRef<'a> {
    pub chromosome: &'a str,
    pub position: u64,
    pub allele: &'a str,
    pub reference: Option<ReferenceGenome>,
}

impl Query {
    pub fn new(chromosome: impl Into<String>, position: u64, allele: impl Into<String>) -> Self {
        Self {
            chromosome: Some(chromosome.into()),
            position: Some(position),
            allele: Some(allele.into()),
            reference: None,
        }
    }

    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceGenome) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Chromosome, position and allele are all present and non-blank
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.variant().is_some()
    }

    /// The validated variant, or `None` if the query is incomplete
    #[must_use]
    pub fn variant(&self) -> Option<VariantRef<'_>> {
        let chromosome = non_blank(self.chromosome.as_deref())?;
        let allele = non_blank(self.allele.as_deref())?;
        Some(VariantRef {
            chromosome,
            position: self.position?,
            allele,
            reference: self.reference,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chrom = self.chromosome.as_deref().unwrap_or("?");
        let allele = self.allele.as_deref().unwrap_or("?");
        match self.position {
            Some(pos) => write!(f, "{chrom}:{pos} {allele}")?,
            None => write!(f, "{chrom}:? {allele}")?,
        }
        if let Some(reference) = self.reference {
            write!(f, " ({reference})")?;
        }
        Ok(())
    }
}
