//! Request templates for beacon providers.
//!
//! Building a request is pure string templating over the beacon URL and the
//! validated variant. Parameter values are percent-encoded by [`url::Url`].

use url::Url;

use crate::core::beacon::Beacon;
use crate::core::query::VariantRef;

/// Sent with every provider request
pub const ACCEPT_HEADER: &str = "application/json, text/plain";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully templated provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ProviderRequest {
    fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![("Accept".to_string(), ACCEPT_HEADER.to_string())],
            body: None,
        }
    }

    fn post_form(url: Url, params: &[(&str, String)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![
                ("Accept".to_string(), ACCEPT_HEADER.to_string()),
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ],
            body: Some(body),
        }
    }
}

/// URL scheme of one provider family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Ucsc,
    UcscV2,
    Ebi,
    Ncbi,
    Wtsi,
    AmpLab,
    Kaviar,
    BeaconizerStringChromosome,
    BeaconizerIntegerChromosome,
    CafeVariome,
    Broad,
    Icgc,
}

impl RequestFormat {
    /// Template the request for `beacon`.
    ///
    /// Returns `None` when the beacon has no URL or its URL does not parse.
    #[must_use]
    pub fn build(&self, beacon: &Beacon, variant: &VariantRef<'_>) -> Option<ProviderRequest> {
        let mut url = Url::parse(beacon.url.as_deref()?).ok()?;
        let reference = variant.reference.unwrap_or_else(|| beacon.default_reference());
        let chrom = variant.chromosome.to_string();
        let pos = variant.position.to_string();
        let allele = variant.allele.to_string();
        let id = beacon.id.0.clone();

        let params: Vec<(&str, String)> = match self {
            Self::Ucsc => vec![
                ("track", id),
                ("chrom", chrom),
                ("pos", pos),
                ("allele", allele),
            ],
            Self::UcscV2 => vec![
                ("dataset", id),
                ("chromosome", chrom),
                ("position", pos),
                ("allele", allele),
                ("format", "json".to_string()),
            ],
            Self::Ebi => vec![
                ("referenceName", chrom),
                ("start", pos),
                ("allele", allele),
                ("assemblyId", reference.grc_name().to_string()),
            ],
            Self::Ncbi => vec![
                ("chrom", chrom),
                ("pos", pos),
                ("allele", allele),
                ("ref", reference.grc_name().to_string()),
                ("format", "json".to_string()),
            ],
            Self::Wtsi => vec![
                ("src", "all".to_string()),
                ("chr", chrom),
                ("pos", pos),
                ("all", allele),
            ],
            Self::AmpLab => {
                let form = [
                    ("chr", chrom),
                    ("pos", pos),
                    ("allele", allele),
                    ("ref", reference.ucsc_name().to_string()),
                ];
                return Some(ProviderRequest::post_form(url, &form));
            }
            Self::Kaviar => vec![
                ("frz", reference.ucsc_name().to_string()),
                ("onebased", "1".to_string()),
                ("chr", chrom),
                ("pos", pos),
                ("allele", allele),
                ("format", "text".to_string()),
            ],
            Self::BeaconizerStringChromosome => vec![
                ("beacon", id),
                ("chrom", with_chr_prefix(&chrom)),
                ("pos", pos),
                ("allele", allele),
            ],
            Self::BeaconizerIntegerChromosome => vec![
                ("beacon", id),
                ("chrom", without_chr_prefix(&chrom).to_string()),
                ("pos", pos),
                ("allele", allele),
            ],
            Self::CafeVariome => vec![
                ("chrom", chrom),
                ("pos", pos),
                ("allele", allele),
                ("ref", reference.ucsc_name().to_string()),
            ],
            Self::Broad => vec![
                ("chrom", chrom),
                ("pos", pos),
                ("allele", allele),
                ("ref", reference.grc_name().to_string()),
            ],
            Self::Icgc => vec![
                ("chromosome", chrom),
                ("position", pos),
                ("allele", allele),
                ("reference", reference.grc_name().to_string()),
                ("dataset", String::new()),
            ],
        };

        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Some(ProviderRequest::get(url))
    }
}

fn without_chr_prefix(chrom: &str) -> &str {
    match chrom.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &chrom[3..],
        _ => chrom,
    }
}

fn with_chr_prefix(chrom: &str) -> String {
    format!("chr{}", without_chr_prefix(chrom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Query;
    use crate::core::types::ReferenceGenome;
    use crate::provider::registry::StrategyId;

    fn beacon(id: &str, url: &str) -> Beacon {
        Beacon::leaf(id, id, "org", StrategyId::Ucsc)
            .with_url(url)
            .with_references([ReferenceGenome::Hg19])
    }

    fn build(format: RequestFormat, beacon: &Beacon, query: &Query) -> ProviderRequest {
        format.build(beacon, &query.variant().unwrap()).unwrap()
    }

    #[test]
    fn test_ucsc_template() {
        let b = beacon("clinvar", "http://hgwdev-max.cse.ucsc.edu/cgi-bin/beacon/query");
        let req = build(RequestFormat::Ucsc, &b, &Query::new("13", 32_936_732, "C"));

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://hgwdev-max.cse.ucsc.edu/cgi-bin/beacon/query?track=clinvar&chrom=13&pos=32936732&allele=C"
        );
        assert!(req.body.is_none());
        assert!(req
            .headers
            .contains(&("Accept".to_string(), ACCEPT_HEADER.to_string())));
    }

    #[test]
    fn test_wtsi_template_matches_legacy_parameters() {
        let b = beacon("wtsi", "http://www.sanger.ac.uk/sanger/GA4GH_Beacon");
        let req = build(RequestFormat::Wtsi, &b, &Query::new("1", 10, "A"));
        assert_eq!(
            req.url,
            "http://www.sanger.ac.uk/sanger/GA4GH_Beacon?src=all&chr=1&pos=10&all=A"
        );
    }

    #[test]
    fn test_reference_defaults_to_beacon_support() {
        let b = beacon("ncbi", "http://ncbi.example/beacon.cgi")
            .with_references([ReferenceGenome::Hg38]);
        let req = build(RequestFormat::Ncbi, &b, &Query::new("1", 10, "A"));
        assert!(req.url.contains("ref=GRCh38"));

        let query = Query::new("1", 10, "A").with_reference(ReferenceGenome::Hg18);
        let req = build(RequestFormat::Ncbi, &b, &query);
        assert!(req.url.contains("ref=NCBI36"));
    }

    #[test]
    fn test_amplab_posts_form() {
        let b = beacon("amplab", "http://beacon.eecs.berkeley.edu/beacon.php");
        let req = build(RequestFormat::AmpLab, &b, &Query::new("2", 99, "TT"));

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://beacon.eecs.berkeley.edu/beacon.php");
        assert_eq!(req.body.as_deref(), Some("chr=2&pos=99&allele=TT&ref=hg19"));
    }

    #[test]
    fn test_beaconizer_chromosome_styles() {
        let b = beacon("platinum", "http://dnastack.com/p/beacon/");
        let query = Query::new("chr7", 5, "G");

        let string_style = build(RequestFormat::BeaconizerStringChromosome, &b, &query);
        assert!(string_style.url.contains("beacon=platinum&chrom=chr7&"));

        let integer_style = build(RequestFormat::BeaconizerIntegerChromosome, &b, &query);
        assert!(integer_style.url.contains("chrom=7&"));

        let plain = build(
            RequestFormat::BeaconizerStringChromosome,
            &b,
            &Query::new("X", 5, "G"),
        );
        assert!(plain.url.contains("chrom=chrX&"));
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let b = beacon("broad", "http://broad.example/query");
        let req = build(RequestFormat::Broad, &b, &Query::new("1", 1, "A&B"));
        assert!(req.url.contains("allele=A%26B"));
    }

    #[test]
    fn test_missing_or_malformed_url_builds_nothing() {
        let query = Query::new("1", 1, "A");
        let variant = query.variant().unwrap();

        let mut no_url = beacon("curoverse", "http://x");
        no_url.url = None;
        assert!(RequestFormat::Ebi.build(&no_url, &variant).is_none());

        let bad_url = beacon("bad", "not a url");
        assert!(RequestFormat::Ebi.build(&bad_url, &variant).is_none());
    }

    #[test]
    fn test_existing_query_string_is_kept() {
        let b = beacon("icgc", "https://dcc.icgc.org/api/v1/beacon/query?v=1");
        let req = build(RequestFormat::Icgc, &b, &Query::new("1", 1, "A"));
        assert!(req.url.starts_with("https://dcc.icgc.org/api/v1/beacon/query?v=1&chromosome=1"));
        assert!(req.url.ends_with("reference=GRCh37&dataset="));
    }
}
