//! The merge workflow: fetch schemas, reconcile, create the target, then copy
//! each source's records into it.
//!
//! Every remote call is awaited before the next one is issued.

use std::pin::pin;

use futures::TryStreamExt;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tokio::sync::mpsc::UnboundedSender;

use notion_merge_client::WorkspaceApi;
use notion_merge_core::{
    MergedSchema, PropertySources, PropertyType, Record, Schema, TransformOptions,
    carry_forward, collect_observed_options, merge_options, merged_property_options,
    missing_options, reconcile, reshape,
};

use crate::error::MergeError;
use crate::events::MergeEvent;
use crate::pagination::record_pages;
use crate::report::{MergeReport, RecordFailure, Rename, SourceReport};

/// Behaviour switches for a merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    pub transform: TransformOptions,
    /// Push every source's declared options to the target right after it is
    /// created, not only the options records actually use.
    pub seed_options: bool,
}

/// Result of reading and reconciling the sources without writing anything.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub schemas: Vec<Schema>,
    pub merged: MergedSchema,
    pub sources: PropertySources,
    /// Declared option union per enumerated property name
    pub options: IndexMap<String, Vec<String>>,
    /// Declared options per enumerated merged property, renamed ones included
    pub property_options: IndexMap<String, Vec<String>>,
}

impl MergePlan {
    /// Merged properties whose name differs from the source property feeding them.
    pub fn renamed(&self) -> Vec<Rename> {
        self.sources
            .iter()
            .flat_map(|(merged, source)| {
                source
                    .contributions()
                    .iter()
                    .filter(move |c| c.original_name != merged)
                    .map(move |c| (merged.to_string(), c.original_name.clone(), c.source))
            })
            .collect()
    }
}

/// Merges source databases through a [`WorkspaceApi`].
pub struct SchemaMerger<A> {
    api: A,
    options: MergeOptions,
    events: Option<UnboundedSender<MergeEvent>>,
}

impl<A: WorkspaceApi> SchemaMerger<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            options: MergeOptions::default(),
            events: None,
        }
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Send progress events to `tx`. The sender is dropped with the merger.
    pub fn with_events(mut self, tx: UnboundedSender<MergeEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn emit(&self, event: MergeEvent) {
        if let Some(tx) = &self.events {
            // The receiver going away only means nobody is watching.
            let _ = tx.send(event);
        }
    }

    /// Current property definitions of a database.
    pub async fn fetch_schema(&self, database_id: &str) -> Result<Schema, MergeError> {
        self.emit(MergeEvent::FetchingSchema {
            database_id: database_id.to_string(),
        });
        let database = self.api.retrieve_database(database_id).await?;
        Ok(database.properties)
    }

    /// Declared options of every select / multi-select property.
    pub async fn fetch_enumerated_options(
        &self,
        database_id: &str,
    ) -> Result<IndexMap<String, Vec<String>>, MergeError> {
        let schema = self.fetch_schema(database_id).await?;
        Ok(schema
            .iter()
            .filter(|(_, config)| config.kind().is_enumerated())
            .map(|(name, config)| (name.clone(), config.option_names()))
            .collect())
    }

    /// Add the names in `desired` that `property` of `target_id` lacks, in one
    /// update. Returns how many were added; zero means no request was sent.
    pub async fn sync_options(
        &self,
        target_id: &str,
        property: &str,
        desired: &[String],
    ) -> Result<usize, MergeError> {
        if desired.is_empty() {
            return Ok(0);
        }

        let schema = self.api.retrieve_database(target_id).await?.properties;
        let Some(config) = schema.get(property) else {
            log::debug!("Target has no property {:?}; skipping option sync", property);
            return Ok(0);
        };
        if !config.kind().is_enumerated() {
            return Ok(0);
        }

        let new = missing_options(desired, &config.option_names());
        if new.is_empty() {
            return Ok(0);
        }

        let patch = option_patch(property, config.kind(), &new);
        self.api.update_database(target_id, &patch).await?;
        log::info!("Added {} option(s) to {}", new.len(), property);
        self.emit(MergeEvent::OptionsSynced {
            property: property.to_string(),
            added: new.len(),
        });
        Ok(new.len())
    }

    /// Read every source schema and reconcile them. Nothing is written.
    pub async fn plan(&self, source_ids: &[String]) -> Result<MergePlan, MergeError> {
        if source_ids.is_empty() {
            return Err(MergeError::NoSources);
        }

        let mut schemas = Vec::with_capacity(source_ids.len());
        for id in source_ids {
            self.emit(MergeEvent::FetchingSchema {
                database_id: id.clone(),
            });
            let database = self.api.retrieve_database(id).await.map_err(|source| {
                MergeError::SourceUnavailable {
                    database_id: id.clone(),
                    source,
                }
            })?;
            schemas.push(database.properties);
        }

        let (merged, sources) = reconcile(&schemas);
        let options = merge_options(&schemas);
        let property_options = merged_property_options(&schemas, &sources, &merged);
        let plan = MergePlan {
            schemas,
            merged,
            sources,
            options,
            property_options,
        };

        self.emit(MergeEvent::SchemasReconciled {
            properties: plan.merged.len(),
            renamed: plan.renamed().len(),
        });
        Ok(plan)
    }

    /// Create the merged database under `parent_id`.
    pub async fn create_merged_resource(
        &self,
        source_ids: &[String],
        title: &str,
        parent_id: &str,
    ) -> Result<(String, PropertySources), MergeError> {
        let (target_id, plan) = self.create_from_sources(source_ids, title, parent_id).await?;
        Ok((target_id, plan.sources))
    }

    async fn create_from_sources(
        &self,
        source_ids: &[String],
        title: &str,
        parent_id: &str,
    ) -> Result<(String, MergePlan), MergeError> {
        let plan = self.plan(source_ids).await?;

        let target_id = self
            .api
            .create_database(parent_id, title, &plan.merged.to_request_properties())
            .await?;
        log::info!(
            "Created merged database {} with {} properties",
            target_id,
            plan.merged.len()
        );
        self.emit(MergeEvent::TargetCreated {
            database_id: target_id.clone(),
        });

        if self.options.seed_options {
            for (property, options) in &plan.property_options {
                self.sync_options(&target_id, property, options).await?;
            }
        }

        Ok((target_id, plan))
    }

    /// Copy every record of source `index` into `target_id`.
    ///
    /// Records are read in full before anything is written. Options the
    /// records use are added to the target first. A record the target
    /// rejects is logged and recorded in the returned report; copying
    /// continues with the next one.
    pub async fn copy_records(
        &self,
        source_id: &str,
        target_id: &str,
        index: usize,
        sources: &PropertySources,
    ) -> Result<SourceReport, MergeError> {
        self.emit(MergeEvent::FetchingSchema {
            database_id: source_id.to_string(),
        });
        let schema = self
            .api
            .retrieve_database(source_id)
            .await
            .map_err(|source| MergeError::SourceUnavailable {
                database_id: source_id.to_string(),
                source,
            })?
            .properties;
        self.copy_with_schema(source_id, &schema, target_id, index, sources)
            .await
    }

    async fn copy_with_schema(
        &self,
        source_id: &str,
        schema: &Schema,
        target_id: &str,
        index: usize,
        sources: &PropertySources,
    ) -> Result<SourceReport, MergeError> {
        let mut report = SourceReport::new(index, source_id);

        let special: IndexMap<String, PropertyType> = schema
            .iter()
            .filter(|(_, config)| config.kind().needs_reshaping())
            .map(|(name, config)| (name.clone(), config.kind().clone()))
            .collect();

        let records = self.read_records(source_id, index).await?;
        report.fetched = records.len();
        log::info!("Fetched {} records from {}", records.len(), source_id);

        let observed = collect_observed_options(&records, &special);
        for (property, options) in observed {
            let Some(target_property) = sources.merged_name_for(&property, index) else {
                continue;
            };
            let desired: Vec<String> = options.into_iter().collect();
            report.options_added += self.sync_options(target_id, target_property, &desired).await?;
        }

        let total = records.len();
        for (position, record) in records.iter().enumerate() {
            let carried = carry_forward(record, index, sources);
            let outgoing = reshape(&carried, &self.options.transform);
            if outgoing.is_empty() {
                report.skipped_empty += 1;
                continue;
            }

            match self.api.create_page(target_id, &outgoing).await {
                Ok(_) => {
                    report.inserted += 1;
                    self.emit(MergeEvent::RecordInserted {
                        index,
                        position: position + 1,
                        total,
                    });
                }
                Err(e) => {
                    let payload = serde_json::to_string(&outgoing).unwrap_or_default();
                    log::warn!(
                        "Error copying record {}: {}. Properties: {}",
                        record.id,
                        e,
                        payload
                    );
                    self.emit(MergeEvent::RecordFailed {
                        index,
                        record_id: record.id.clone(),
                        message: e.to_string(),
                    });
                    report.failures.push(RecordFailure {
                        record_id: record.id.clone(),
                        message: e.to_string(),
                        payload,
                    });
                }
            }
        }

        self.emit(MergeEvent::SourceFinished {
            index,
            inserted: report.inserted,
            failed: report.failures.len(),
        });
        Ok(report)
    }

    async fn read_records(&self, source_id: &str, index: usize) -> Result<Vec<Record>, MergeError> {
        let mut pages = pin!(record_pages(&self.api, source_id));
        let mut records = Vec::new();
        while let Some(page) = pages.try_next().await? {
            records.extend(page);
            self.emit(MergeEvent::RecordsFetched {
                index,
                records: records.len(),
            });
        }
        Ok(records)
    }

    /// Create the merged database and copy every source into it, in order.
    /// The report carries the new database's id.
    pub async fn merge_all(
        &self,
        source_ids: &[String],
        title: &str,
        parent_id: &str,
    ) -> Result<MergeReport, MergeError> {
        let (target_id, plan) = self.create_from_sources(source_ids, title, parent_id).await?;

        let mut report = MergeReport {
            target_id: target_id.clone(),
            title: title.to_string(),
            properties: plan.merged.len(),
            renamed: plan.renamed(),
            sources: Vec::with_capacity(source_ids.len()),
        };

        // Schemas read while planning are reused.
        for (index, (source_id, schema)) in source_ids.iter().zip(&plan.schemas).enumerate() {
            self.emit(MergeEvent::SourceStarted {
                index,
                total: source_ids.len(),
                database_id: source_id.clone(),
            });
            let source_report = self
                .copy_with_schema(source_id, schema, &target_id, index, &plan.sources)
                .await?;
            report.sources.push(source_report);
        }

        self.emit(MergeEvent::Done);
        Ok(report)
    }
}

/// `{ property: { <kind>: { options: [{name}, ...] } } }`
fn option_patch(property: &str, kind: &PropertyType, names: &[String]) -> Map<String, Value> {
    let options: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
    let mut patch = Map::new();
    patch.insert(
        property.to_string(),
        json!({ kind.as_str(): { "options": options } }),
    );
    patch
}
