use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::catalog::hierarchy;
use crate::catalog::shared::SharedCatalog;
use crate::catalog::store::BeaconCatalog;
use crate::core::beacon::Beacon;
use crate::core::query::{Query, VariantRef};
use crate::core::result::{BeaconResponse, BeaconResult, AGGREGATE_BEACON_ID};
use crate::core::types::{BeaconId, ErrorKind, TriBool};
use crate::dispatch::aggregator::{reduce, reduce_results};
use crate::dispatch::fetcher::{HttpFetcher, ResponseFetcher};
use crate::provider::registry::StrategyRegistry;

/// Default per-beacon deadline enforced by the dispatcher
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the query dispatcher
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Deadline for each provider call; a whole batch never waits longer
    pub request_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Answers of every visible beacon plus the catalog-wide answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAllResponse {
    pub per_beacon: BTreeMap<BeaconId, BeaconResult>,
    pub aggregate: BeaconResult,
}

impl QueryAllResponse {
    /// Client view: every per-beacon answer followed by the aggregate entry
    #[must_use]
    pub fn to_responses(&self, query: &Query, catalog: &BeaconCatalog) -> Vec<BeaconResponse> {
        self.per_beacon
            .values()
            .map(|result| BeaconResponse::from_result(result, query, catalog))
            .chain(std::iter::once(BeaconResponse::aggregate(
                &self.aggregate,
                query,
            )))
            .collect()
    }
}

/// Fans a query out to beacons and reduces their answers.
///
/// Each evaluation reads one catalog snapshot. The leaves reachable from the
/// requested beacons are asked concurrently, each under its own deadline, and
/// joined at a single barrier; aggregators are then reduced children first.
/// A leaf shared by several aggregators is asked once.
#[derive(Debug)]
pub struct QueryDispatcher<F = HttpFetcher> {
    catalog: Arc<SharedCatalog>,
    fetcher: Arc<F>,
    config: DispatchConfig,
}

impl<F> Clone for QueryDispatcher<F> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
        }
    }
}

impl<F: ResponseFetcher> QueryDispatcher<F> {
    pub fn new(catalog: Arc<SharedCatalog>, fetcher: F, config: DispatchConfig) -> Self {
        Self {
            catalog,
            fetcher: Arc::new(fetcher),
            config,
        }
    }

    /// The catalog handle queries are answered from
    pub fn catalog(&self) -> &Arc<SharedCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Ask one beacon; aggregators are answered from their descendants.
    ///
    /// Unknown and invisible ids give the invalid-beacon sentinel, a
    /// disabled beacon gives `Unknown/Disabled`, and an incomplete query
    /// gives `Unknown/InvalidQuery`. None of these dispatch anything.
    pub async fn query_one(&self, beacon_id: &BeaconId, query: &Query) -> BeaconResult {
        let catalog = self.catalog.snapshot();
        self.answer_one(&catalog, beacon_id, query).await
    }

    /// Ask every visible beacon.
    ///
    /// The aggregate is the reduction over every visible, enabled beacon.
    /// An incomplete query answers `False` with no per-beacon results and
    /// dispatches nothing.
    pub async fn query_all(&self, query: &Query) -> QueryAllResponse {
        let catalog = self.catalog.snapshot();
        self.answer_all(&catalog, query).await
    }

    /// [`query_one`](Self::query_one) in client form, described from the
    /// same snapshot the answer came from
    pub async fn respond_one(&self, beacon_id: &BeaconId, query: &Query) -> BeaconResponse {
        let catalog = self.catalog.snapshot();
        let result = self.answer_one(&catalog, beacon_id, query).await;
        BeaconResponse::from_result(&result, query, &catalog)
    }

    /// [`query_all`](Self::query_all) in client form: every visible beacon
    /// followed by the aggregate entry
    pub async fn respond_all(&self, query: &Query) -> Vec<BeaconResponse> {
        let catalog = self.catalog.snapshot();
        self.answer_all(&catalog, query)
            .await
            .to_responses(query, &catalog)
    }

    async fn answer_one(
        &self,
        catalog: &BeaconCatalog,
        beacon_id: &BeaconId,
        query: &Query,
    ) -> BeaconResult {
        let Some(beacon) = catalog.get_visible(beacon_id) else {
            tracing::debug!(beacon = %beacon_id, "Query for unknown beacon");
            return BeaconResult::invalid_beacon();
        };
        if !beacon.enabled {
            return BeaconResult::failed(beacon.id.clone(), ErrorKind::Disabled);
        }
        let Some(variant) = query.variant() else {
            return BeaconResult::failed(beacon.id.clone(), ErrorKind::InvalidQuery);
        };

        let mut results = self
            .evaluate(catalog, &variant, std::slice::from_ref(&beacon.id))
            .await;
        results
            .remove(&beacon.id)
            .unwrap_or_else(|| BeaconResult::answered(beacon.id.clone(), TriBool::Unknown))
    }

    async fn answer_all(&self, catalog: &BeaconCatalog, query: &Query) -> QueryAllResponse {
        let aggregate_id = BeaconId::new(AGGREGATE_BEACON_ID);

        let Some(variant) = query.variant() else {
            tracing::debug!(%query, "Incomplete query, answering no without dispatch");
            return QueryAllResponse {
                per_beacon: BTreeMap::new(),
                aggregate: BeaconResult {
                    beacon_id: Some(aggregate_id),
                    value: TriBool::False,
                    error: Some(ErrorKind::InvalidQuery),
                },
            };
        };

        let visible = catalog.list_visible();
        let targets: Vec<BeaconId> = visible
            .iter()
            .filter(|b| b.enabled)
            .map(|b| b.id.clone())
            .collect();
        let results = self.evaluate(catalog, &variant, &targets).await;

        // Every visible target, not only the roots: a leaf whose parents
        // are all hidden or disabled must still count.
        let answered: Vec<BeaconResult> = targets
            .iter()
            .filter_map(|id| results.get(id).cloned())
            .collect();
        let aggregate = reduce_results(Some(aggregate_id), &answered);

        let per_beacon = visible
            .into_iter()
            .map(|b| {
                let result = if b.enabled {
                    results.get(&b.id).cloned().unwrap_or_else(|| {
                        BeaconResult::answered(b.id.clone(), TriBool::Unknown)
                    })
                } else {
                    BeaconResult::failed(b.id.clone(), ErrorKind::Disabled)
                };
                (b.id.clone(), result)
            })
            .collect();

        tracing::debug!(%query, aggregate = %aggregate.value, "Answered query across catalog");
        QueryAllResponse {
            per_beacon,
            aggregate,
        }
    }

    /// Results for every beacon reachable from `targets`
    async fn evaluate(
        &self,
        catalog: &BeaconCatalog,
        variant: &VariantRef<'_>,
        targets: &[BeaconId],
    ) -> HashMap<BeaconId, BeaconResult> {
        let order = hierarchy::post_order(catalog, targets);
        let (aggregators, leaves): (Vec<&Beacon>, Vec<&Beacon>) = order
            .iter()
            .filter_map(|id| catalog.get_beacon(id))
            .partition(|b| b.aggregator);

        tracing::debug!(leaves = leaves.len(), "Dispatching provider requests");
        let answers = join_all(leaves.iter().map(|beacon| self.ask(beacon, variant))).await;

        let mut results: HashMap<BeaconId, BeaconResult> = leaves
            .iter()
            .map(|b| b.id.clone())
            .zip(answers)
            .collect();

        // post-order puts every child before its parents
        for aggregator in aggregators {
            let value = reduce(
                hierarchy::enabled_children(catalog, &aggregator.id)
                    .into_iter()
                    .filter_map(|child| results.get(child))
                    .map(|r| r.value),
            );
            results.insert(
                aggregator.id.clone(),
                BeaconResult::answered(aggregator.id.clone(), value),
            );
        }

        results
    }

    /// Ask one leaf beacon under the dispatch deadline
    async fn ask(&self, beacon: &Beacon, variant: &VariantRef<'_>) -> BeaconResult {
        let Some(strategy_id) = beacon.strategy else {
            return BeaconResult::failed(beacon.id.clone(), ErrorKind::Transport);
        };
        let strategy = StrategyRegistry::resolve(strategy_id);

        let Some(request) = strategy.build_request(beacon, variant) else {
            tracing::warn!(beacon = %beacon.id, url = ?beacon.url, "Beacon has no usable URL");
            return BeaconResult::failed(beacon.id.clone(), ErrorKind::Transport);
        };
        tracing::debug!(beacon = %beacon.id, strategy = %strategy_id, url = %request.url, "Asking beacon");

        match tokio::time::timeout(self.config.request_timeout, self.fetcher.execute(&request)).await
        {
            Err(_) => {
                tracing::warn!(beacon = %beacon.id, timeout = ?self.config.request_timeout, "Beacon timed out");
                BeaconResult::failed(beacon.id.clone(), ErrorKind::Timeout)
            }
            Ok(None) => BeaconResult::failed(beacon.id.clone(), ErrorKind::Transport),
            Ok(Some(body)) => match strategy.parse_response(beacon, variant, &body) {
                TriBool::Unknown => {
                    tracing::debug!(beacon = %beacon.id, parser = strategy.parser.name(), "Unrecognized answer");
                    BeaconResult::failed(beacon.id.clone(), ErrorKind::UnrecognizedResponse)
                }
                value => BeaconResult::answered(beacon.id.clone(), value),
            },
        }
    }
}
