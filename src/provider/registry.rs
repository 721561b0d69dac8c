use serde::{Deserialize, Serialize};

use crate::core::beacon::Beacon;
use crate::core::query::VariantRef;
use crate::core::types::TriBool;
use crate::provider::parser::ResponseParser;
use crate::provider::request::{ProviderRequest, RequestFormat};

/// GA4GH-style `{"response": {"exists": ...}}` envelope
const RESPONSE_EXISTS: &[&str] = &["response", "exists"];

/// Identifier of a provider strategy, as stored in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyId {
    Ucsc,
    UcscV2,
    Ebi,
    Ncbi,
    Wtsi,
    #[serde(rename = "amplab")]
    AmpLab,
    Kaviar,
    BeaconizerStringChromosome,
    BeaconizerIntegerChromosome,
    CafeVariome,
    Broad,
    Icgc,
}

impl StrategyId {
    pub const ALL: [Self; 12] = [
        Self::Ucsc,
        Self::UcscV2,
        Self::Ebi,
        Self::Ncbi,
        Self::Wtsi,
        Self::AmpLab,
        Self::Kaviar,
        Self::BeaconizerStringChromosome,
        Self::BeaconizerIntegerChromosome,
        Self::CafeVariome,
        Self::Broad,
        Self::Icgc,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ucsc => "ucsc",
            Self::UcscV2 => "ucsc-v2",
            Self::Ebi => "ebi",
            Self::Ncbi => "ncbi",
            Self::Wtsi => "wtsi",
            Self::AmpLab => "amplab",
            Self::Kaviar => "kaviar",
            Self::BeaconizerStringChromosome => "beaconizer-string-chromosome",
            Self::BeaconizerIntegerChromosome => "beaconizer-integer-chromosome",
            Self::CafeVariome => "cafe-variome",
            Self::Broad => "broad",
            Self::Icgc => "icgc",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A request template paired with the parser for the provider's answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub request: RequestFormat,
    pub parser: ResponseParser,
}

impl Strategy {
    const fn new(request: RequestFormat, parser: ResponseParser) -> Self {
        Self { request, parser }
    }

    #[must_use]
    pub fn build_request(&self, beacon: &Beacon, variant: &VariantRef<'_>) -> Option<ProviderRequest> {
        self.request.build(beacon, variant)
    }

    #[must_use]
    pub fn parse_response(&self, beacon: &Beacon, variant: &VariantRef<'_>, body: &str) -> TriBool {
        self.parser.parse(beacon, variant.reference, body)
    }
}

/// Resolves strategy ids to their request/parser pair.
///
/// The set of strategies is closed: every [`StrategyId`] has exactly one
/// entry and resolution cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyRegistry;

impl StrategyRegistry {
    #[must_use]
    pub fn resolve(id: StrategyId) -> Strategy {
        use RequestFormat as R;
        use ResponseParser as P;

        match id {
            StrategyId::Ucsc => Strategy::new(R::Ucsc, P::StringYesNo),
            StrategyId::UcscV2 => Strategy::new(R::UcscV2, P::JsonFieldExists(&["response"])),
            StrategyId::Ebi => Strategy::new(R::Ebi, P::JsonFieldExists(RESPONSE_EXISTS)),
            StrategyId::Ncbi => {
                Strategy::new(R::Ncbi, P::JsonFieldGreaterThanZero(RESPONSE_EXISTS))
            }
            StrategyId::Wtsi => Strategy::new(R::Wtsi, P::StringYesNoWithRefCheck),
            StrategyId::AmpLab => Strategy::new(R::AmpLab, P::StringFound),
            StrategyId::Kaviar => Strategy::new(R::Kaviar, P::StringYesNo),
            StrategyId::BeaconizerStringChromosome => Strategy::new(
                R::BeaconizerStringChromosome,
                P::JsonFieldExists(RESPONSE_EXISTS),
            ),
            StrategyId::BeaconizerIntegerChromosome => Strategy::new(
                R::BeaconizerIntegerChromosome,
                P::JsonFieldExists(RESPONSE_EXISTS),
            ),
            StrategyId::CafeVariome => Strategy::new(R::CafeVariome, P::CafePrefixedJsonField),
            StrategyId::Broad => Strategy::new(R::Broad, P::StringYesNo),
            StrategyId::Icgc => {
                Strategy::new(R::Icgc, P::JsonFieldExistsNullAsFalse(RESPONSE_EXISTS))
            }
        }
    }

    /// Every registered strategy, in declaration order
    pub fn iter() -> impl Iterator<Item = (StrategyId, Strategy)> {
        StrategyId::ALL.into_iter().map(|id| (id, Self::resolve(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Query;

    #[test]
    fn test_strategy_ids_round_trip_through_names() {
        for id in StrategyId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.name()));
            let back: StrategyId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }
    }

    #[test]
    fn test_unknown_strategy_name_is_rejected() {
        let result: Result<StrategyId, _> = serde_json::from_str("\"carrier-pigeon\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_registry_covers_every_strategy() {
        assert_eq!(StrategyRegistry::iter().count(), StrategyId::ALL.len());
    }

    #[test]
    fn test_icgc_reads_null_as_false() {
        let strategy = StrategyRegistry::resolve(StrategyId::Icgc);
        let beacon = Beacon::leaf("icgc", "ICGC", "icgc", StrategyId::Icgc)
            .with_url("https://dcc.icgc.org/api/v1/beacon/query");
        let query = Query::new("1", 1, "A");
        let variant = query.variant().unwrap();

        assert!(strategy.build_request(&beacon, &variant).is_some());
        assert_eq!(
            strategy.parse_response(&beacon, &variant, r#"{"response":{"exists":null}}"#),
            TriBool::False
        );
    }

    #[test]
    fn test_ncbi_reads_counts() {
        let strategy = StrategyRegistry::resolve(StrategyId::Ncbi);
        let beacon = Beacon::leaf("ncbi", "NCBI", "ncbi", StrategyId::Ncbi);
        let query = Query::new("1", 1, "A");
        let variant = query.variant().unwrap();

        assert_eq!(
            strategy.parse_response(&beacon, &variant, r#"{"response":{"exists":2}}"#),
            TriBool::True
        );
        assert_eq!(
            strategy.parse_response(&beacon, &variant, r#"{"response":{"exists":0}}"#),
            TriBool::False
        );
    }
}
