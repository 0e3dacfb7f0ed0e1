//! Per-class orchestration: discover → fetch → parse → validate → persist.
//!
//! Classes are independent: a failed class is reported and the others carry
//! on. Within a class, pages that stay unavailable after retries are recorded
//! as missing, while a single rejected record fails the whole class.

mod stage;

pub use stage::{ClassReport, ClassStage};

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

use crate::archive::{ArchivedPage, Manifest, manifest_key, rider_page_key};
use crate::class::GpClass;
use crate::config::{Config, SiteConfig};
use crate::fetch::{Fetcher, Page};
use crate::parse::{EventFields, RiderFields, listing, parse_events, parse_rider};
use crate::sources::pulselive::{ApiEvent, ApiRider, PulseliveClient};
use crate::traits::{ArchiveStore, RecordBatch, RecordSink};
use crate::validate::{validate_events, validate_riders};
use crate::{ImporterError, Result};

fn run_span(command: &'static str) -> (String, Span) {
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("run", run_id = %run_id, command);
    (run_id, span)
}

fn fail_all(classes: &[GpClass], err: &ImporterError) -> Vec<ClassReport> {
    classes
        .iter()
        .map(|class| ClassReport::failed(class.as_str(), err))
        .collect()
}

pub struct Pipeline {
    fetcher: Fetcher,
    api: PulseliveClient,
    site: SiteConfig,
    season: i32,
    sink: Arc<dyn RecordSink>,
    archive: Option<Arc<dyn ArchiveStore>>,
}

impl Pipeline {
    pub fn new(config: &Config, sink: Arc<dyn RecordSink>) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(&config.fetch)?,
            api: PulseliveClient::new(&config.site.api_url, config.fetch.timeout)?,
            site: config.site.clone(),
            season: config.season,
            sink,
            archive: None,
        })
    }

    pub fn with_archive(mut self, archive: Arc<dyn ArchiveStore>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    fn archive(&self) -> Result<&dyn ArchiveStore> {
        self.archive.as_deref().ok_or_else(|| {
            ImporterError::ConfigError(
                "an archive directory is required for this step".to_string(),
            )
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<Page> {
        Ok(self.fetcher.fetch(url).await?)
    }

    /// Scrapes and persists riders for each class. The listing page is fetched once.
    pub async fn run_riders(&self, classes: &[GpClass]) -> Vec<ClassReport> {
        let (_, span) = run_span("riders");
        async {
            let listing = match self.fetch_page(&self.site.riders_url()).await {
                Ok(page) => page,
                Err(e) => return fail_all(classes, &e),
            };
            join_all(
                classes
                    .iter()
                    .map(|class| self.rider_class(*class, &listing.body)),
            )
            .await
        }
        .instrument(span)
        .await
    }

    async fn rider_class(&self, class: GpClass, listing: &str) -> ClassReport {
        let mut report = ClassReport::new(class.as_str());
        if let Err(e) = self.scrape_class(class, listing, &mut report).await {
            report.fail(&e);
        }
        report
    }

    async fn scrape_class(
        &self,
        class: GpClass,
        listing: &str,
        report: &mut ClassReport,
    ) -> Result<()> {
        let pages = self.fetch_class_pages(class, listing, report).await?;
        report.advance(ClassStage::Parsing);
        let fields = pages.iter().map(|page| parse_rider(&page.body)).collect();
        self.persist_riders(class, fields, report).await
    }

    async fn fetch_class_pages(
        &self,
        class: GpClass,
        listing: &str,
        report: &mut ClassReport,
    ) -> Result<Vec<Page>> {
        let urls = listing::rider_urls(listing, class, &self.site.base_url);
        if urls.is_empty() {
            return Err(ImporterError::ImportError(format!(
                "No rider links found for {class} on the listing page"
            )));
        }
        info!(class = %class, riders = urls.len(), "discovered riders");

        report.advance(ClassStage::Fetching);
        let batch = self.fetcher.fetch_all(urls).await?;
        report.missing_urls = batch.failures().map(|e| e.url().to_string()).collect();
        for url in &report.missing_urls {
            warn!(class = %class, url = %url, "rider page missing from batch");
        }

        let pages = batch.into_pages();
        if pages.is_empty() {
            return Err(ImporterError::ImportError(format!(
                "No rider pages could be fetched for {class}"
            )));
        }
        Ok(pages)
    }

    async fn persist_riders(
        &self,
        class: GpClass,
        fields: Vec<RiderFields>,
        report: &mut ClassReport,
    ) -> Result<()> {
        report.advance(ClassStage::Validating);
        let riders = validate_riders(fields)?;
        let batch = RecordBatch::riders(class, riders);
        let written = self.sink.persist(&batch).await?;
        report.persisted(batch.len(), written);
        Ok(())
    }

    async fn persist_events(
        &self,
        fields: Vec<EventFields>,
        report: &mut ClassReport,
    ) -> Result<()> {
        report.advance(ClassStage::Validating);
        let events = validate_events(fields)?;
        let batch = RecordBatch::events(report.label.clone(), events);
        let written = self.sink.persist(&batch).await?;
        report.persisted(batch.len(), written);
        Ok(())
    }

    /// Scrapes and persists the season calendar.
    pub async fn run_calendar(&self) -> ClassReport {
        let (_, span) = run_span("calendar");
        async {
            let mut report = ClassReport::new(format!("calendar-{}", self.season));
            if let Err(e) = self.scrape_calendar(&mut report).await {
                report.fail(&e);
            }
            report
        }
        .instrument(span)
        .await
    }

    async fn scrape_calendar(&self, report: &mut ClassReport) -> Result<()> {
        report.advance(ClassStage::Fetching);
        let page = self.fetch_page(&self.site.calendar_url()).await?;

        report.advance(ClassStage::Parsing);
        let fields = parse_events(&page.body, self.season);
        if fields.is_empty() {
            return Err(ImporterError::ImportError(
                "No events found on the calendar page".to_string(),
            ));
        }
        info!(events = fields.len(), "parsed calendar");
        self.persist_events(fields, report).await
    }

    /// Fetches each class's rider pages into the archive under `date`,
    /// without parsing them. A later [`Pipeline::load_riders`] picks them up.
    pub async fn extract_riders(&self, classes: &[GpClass], date: NaiveDate) -> Vec<ClassReport> {
        let (run_id, span) = run_span("extract");
        async {
            let archive = match self.archive() {
                Ok(archive) => archive,
                Err(e) => return fail_all(classes, &e),
            };
            let listing = match self.fetch_page(&self.site.riders_url()).await {
                Ok(page) => page,
                Err(e) => return fail_all(classes, &e),
            };
            let body = listing.body.as_str();
            let run_id = run_id.as_str();
            join_all(classes.iter().map(|class| async move {
                let mut report = ClassReport::new(class.as_str());
                let extracted = self
                    .extract_class(*class, body, date, archive, run_id, &mut report)
                    .await;
                if let Err(e) = extracted {
                    report.fail(&e);
                }
                report
            }))
            .await
        }
        .instrument(span)
        .await
    }

    async fn extract_class(
        &self,
        class: GpClass,
        listing: &str,
        date: NaiveDate,
        archive: &dyn ArchiveStore,
        run_id: &str,
        report: &mut ClassReport,
    ) -> Result<()> {
        let pages = self.fetch_class_pages(class, listing, report).await?;

        let mut archived = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let key = rider_page_key(class, date, index);
            archive.put(&key, page.body.as_bytes()).await?;
            archived.push(ArchivedPage {
                key,
                url: page.url.clone(),
            });
        }

        let manifest = Manifest {
            class,
            date,
            run_id: run_id.to_string(),
            pages: archived,
            missing_urls: report.missing_urls.clone(),
        };
        archive
            .put(&manifest_key(class, date), &serde_json::to_vec_pretty(&manifest)?)
            .await?;

        report.persisted(pages.len(), pages.len() as u64);
        Ok(())
    }

    /// Parses, validates and persists pages archived by [`Pipeline::extract_riders`] for `date`.
    pub async fn load_riders(&self, classes: &[GpClass], date: NaiveDate) -> Vec<ClassReport> {
        let (_, span) = run_span("load");
        async {
            let archive = match self.archive() {
                Ok(archive) => archive,
                Err(e) => return fail_all(classes, &e),
            };
            join_all(classes.iter().map(|class| async move {
                let mut report = ClassReport::new(class.as_str());
                if let Err(e) = self.load_class(*class, date, archive, &mut report).await {
                    report.fail(&e);
                }
                report
            }))
            .await
        }
        .instrument(span)
        .await
    }

    async fn load_class(
        &self,
        class: GpClass,
        date: NaiveDate,
        archive: &dyn ArchiveStore,
        report: &mut ClassReport,
    ) -> Result<()> {
        let bytes = archive.get(&manifest_key(class, date)).await?;
        let manifest: Manifest = serde_json::from_slice(&bytes)?;
        report.missing_urls = manifest.missing_urls;

        report.advance(ClassStage::Fetching);
        let mut bodies = Vec::with_capacity(manifest.pages.len());
        for page in &manifest.pages {
            let bytes = archive.get(&page.key).await?;
            bodies.push(String::from_utf8_lossy(&bytes).into_owned());
        }
        if bodies.is_empty() {
            return Err(ImporterError::ImportError(format!(
                "No archived rider pages for {class} on {date}"
            )));
        }

        report.advance(ClassStage::Parsing);
        let fields = bodies.iter().map(|body| parse_rider(body)).collect();
        self.persist_riders(class, fields, report).await
    }

    /// Loads a season's events from the results API instead of the calendar page.
    pub async fn run_api_events(&self, year: i32) -> ClassReport {
        let (_, span) = run_span("api-events");
        async {
            let mut report = ClassReport::new(format!("api-{year}"));
            if let Err(e) = self.api_events(year, &mut report).await {
                report.fail(&e);
            }
            report
        }
        .instrument(span)
        .await
    }

    async fn api_events(&self, year: i32, report: &mut ClassReport) -> Result<()> {
        report.advance(ClassStage::Fetching);
        let season_id = self.api.season_id(year).await?;
        let events = self.api.events(&season_id).await?;

        report.advance(ClassStage::Parsing);
        let fields: Vec<_> = events.iter().map(ApiEvent::to_fields).collect();
        if fields.is_empty() {
            return Err(ImporterError::ImportError(format!(
                "The API returned no events for {year}"
            )));
        }
        self.persist_events(fields, report).await
    }

    /// Loads the current riders of each class from the results API.
    pub async fn run_api_riders(&self, classes: &[GpClass]) -> Vec<ClassReport> {
        let (_, span) = run_span("api-riders");
        async {
            let riders = match self.api.riders().await {
                Ok(riders) => riders,
                Err(e) => return fail_all(classes, &e),
            };
            let mut reports = Vec::with_capacity(classes.len());
            for class in classes {
                let mut report = ClassReport::new(class.as_str());
                if let Err(e) = self.api_class(*class, &riders, &mut report).await {
                    report.fail(&e);
                }
                reports.push(report);
            }
            reports
        }
        .instrument(span)
        .await
    }

    async fn api_class(
        &self,
        class: GpClass,
        riders: &[ApiRider],
        report: &mut ClassReport,
    ) -> Result<()> {
        report.advance(ClassStage::Parsing);
        let fields: Vec<_> = riders
            .iter()
            .filter(|rider| rider.class() == Some(class))
            .map(ApiRider::to_fields)
            .collect();
        if fields.is_empty() {
            return Err(ImporterError::ImportError(format!(
                "The API returned no riders for {class}"
            )));
        }
        self.persist_riders(class, fields, report).await
    }
}
