//! Remote-fetch boundary.
//!
//! Tables enter a catalog from Virtual Observatory services. This module
//! defines the traits a client must implement to feed them in
//! ([`Registry`], [`ConeSearchResource`], [`TapService`]) and the two fetch
//! operations built on top of them. No HTTP client ships with this crate.
//!
//! [`cone_search`] asks the registry for matching resources and queries
//! them concurrently, at most [`FetchOptions::max_concurrency`] at a time. A
//! resource that fails is logged and left out; the others are unaffected.

mod error;
mod sky;

pub use error::FetchError;
pub use sky::{SkyPosition, Waveband};

pub use crate::metadata::FieldDescriptor;

use std::{sync::Arc, time::Duration};

use arrow::array::RecordBatch;
use async_trait::async_trait;
use futures::{StreamExt, stream};
use log::{debug, warn};
use snafu::prelude::*;

use crate::table::Table;
use error::EmptyQuerySnafu;

/// Identity of a remote table resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Service endpoint.
    pub access_url: String,
    /// Short name; becomes the table name.
    pub short_name: String,
    /// Resource title.
    pub title: String,
    /// Resource description.
    pub description: String,
}

/// Rows and column descriptors returned by a service call.
#[derive(Debug, Clone)]
pub struct ServiceResult {
    /// One descriptor per column.
    pub fields: Vec<FieldDescriptor>,
    /// The rows.
    pub rows: RecordBatch,
}

/// Kind of service a registry lookup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceType {
    /// Simple Cone Search.
    #[default]
    ConeSearch,
    /// Table Access Protocol.
    Tap,
}

/// A registry lookup by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryQuery {
    /// Search center.
    pub position: SkyPosition,
    /// Search radius in degrees.
    pub radius_deg: f64,
    /// Waveband of interest.
    pub waveband: Waveband,
    /// Service kind wanted.
    pub service_type: ServiceType,
}

/// Settings for [`cone_search`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Upper bound on concurrent resource queries. Zero is treated as one.
    pub max_concurrency: usize,
    /// Log per-resource failures at `warn` instead of `debug`.
    pub verbose: bool,
    /// Waveband passed to the registry.
    pub waveband: Waveband,
    /// Per-resource time limit.
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            max_concurrency: 10,
            verbose: false,
            waveband: Waveband::default(),
            timeout: None,
        }
    }
}

/// A searchable registry of services.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Resources matching `query`.
    async fn search(
        &self,
        query: &RegistryQuery,
    ) -> Result<Vec<Arc<dyn ConeSearchResource>>, FetchError>;
}

/// A service answering cone searches.
#[async_trait]
pub trait ConeSearchResource: Send + Sync {
    /// Identity of the resource.
    fn info(&self) -> &ResourceInfo;

    /// Rows within `radius_deg` of `position`.
    async fn cone_search(
        &self,
        position: &SkyPosition,
        radius_deg: f64,
    ) -> Result<ServiceResult, FetchError>;
}

/// A Table Access Protocol service.
#[async_trait]
pub trait TapService: Send + Sync {
    /// Run an ADQL query.
    async fn query(&self, query: &str) -> Result<ServiceResult, FetchError>;
}

/// Cone search every registry resource around `position`.
///
/// Returns the tables of the resources that answered, in completion order.
/// Only a bad radius or a failing registry is an error.
pub async fn cone_search(
    registry: &dyn Registry,
    position: SkyPosition,
    radius_deg: f64,
    options: &FetchOptions,
) -> Result<Vec<Table>, FetchError> {
    sky::check_radius(radius_deg)?;

    let query = RegistryQuery {
        position,
        radius_deg,
        waveband: options.waveband,
        service_type: ServiceType::ConeSearch,
    };
    let resources = registry.search(&query).await?;
    debug!(
        "cone search {position} r={radius_deg}: {} resources",
        resources.len()
    );

    let tables = stream::iter(resources)
        .map(|resource| fetch_resource(resource, position, radius_deg, options.timeout))
        .buffer_unordered(options.max_concurrency.max(1))
        .filter_map(|outcome| async move {
            match outcome {
                Ok(table) => Some(table),
                Err(e) => {
                    if options.verbose {
                        warn!("{e}");
                    } else {
                        debug!("{e}");
                    }
                    None
                }
            }
        })
        .collect::<Vec<_>>()
        .await;

    Ok(tables)
}

async fn fetch_resource(
    resource: Arc<dyn ConeSearchResource>,
    position: SkyPosition,
    radius_deg: f64,
    timeout: Option<Duration>,
) -> Result<Table, FetchError> {
    let call = resource.cone_search(&position, radius_deg);
    let result = match timeout {
        Some(after) => match tokio::time::timeout(after, call).await {
            Ok(result) => result?,
            Err(_) => {
                return error::TimeoutSnafu {
                    access_url: resource.info().access_url.clone(),
                    after,
                }
                .fail();
            }
        },
        None => call.await?,
    };
    Ok(Table::from_service_result(resource.info(), result))
}

/// Run `query` on a TAP service and wrap the answer as a table described
/// by `resource`.
pub async fn tap_query(
    service: &dyn TapService,
    resource: &ResourceInfo,
    query: &str,
) -> Result<Table, FetchError> {
    ensure!(
        !query.trim().is_empty(),
        EmptyQuerySnafu {
            access_url: &resource.access_url,
        }
    );
    let result = service.query(query).await?;
    Ok(Table::from_service_result(resource, result))
}
