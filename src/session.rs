//! Generation session: the catalog and image a user has supplied, and the
//! request flow that turns them into a mosaic.
//!
//! All work runs synchronously inside `&mut self` calls, so a second request
//! cannot begin while one is in flight.

use crate::budget::BudgetPolicy;
use crate::catalog::Catalog;
use crate::sample::Resample;
use crate::status::{Status, Verdict};
use crate::{Converter, Mosaic, MosaicError, Result, DEFAULT_BUDGET};
use image::DynamicImage;
use log::{info, warn};
use std::path::Path;

type Observer = Box<dyn FnMut(&Status)>;

struct Reporter(Option<Observer>);

impl Reporter {
    fn emit(&mut self, status: Status) {
        if status.is_failure() {
            warn!("{status}");
        } else {
            info!("{status}");
        }
        if let Some(observer) = self.0.as_mut() {
            observer(&status);
        }
    }
}

pub struct Session {
    budget: usize,
    policy: BudgetPolicy,
    resample: Resample,
    converter: Option<Converter>,
    image: Option<DynamicImage>,
    reporter: Reporter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            policy: BudgetPolicy::default(),
            resample: Resample::default(),
            converter: None,
            image: None,
            reporter: Reporter(None),
        }
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self.converter = self.converter.map(|c| c.with_budget(budget));
        self
    }

    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self.converter = self.converter.map(|c| c.with_policy(policy));
        self
    }

    pub fn with_resample(mut self, resample: Resample) -> Self {
        self.resample = resample;
        self.converter = self.converter.map(|c| c.with_resample(resample));
        self
    }

    /// Receive every status event as it happens.
    pub fn with_observer(mut self, observer: impl FnMut(&Status) + 'static) -> Self {
        self.reporter = Reporter(Some(Box::new(observer)));
        self
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.converter.as_ref().map(Converter::catalog)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Load the catalog from disk. On failure the session has no catalog
    /// until a later load succeeds.
    pub fn load_catalog(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        self.reporter.emit(Status::CatalogLoading);
        match Catalog::load(path) {
            Ok(catalog) => Ok(self.set_catalog(catalog)),
            Err(e) => {
                self.converter = None;
                self.reporter.emit(Status::CatalogFailed { reason: e.to_string() });
                Err(e)
            }
        }
    }

    pub fn set_catalog(&mut self, catalog: Catalog) -> usize {
        let count = catalog.len();
        self.converter = Some(
            Converter::new(catalog)
                .with_budget(self.budget)
                .with_policy(self.policy)
                .with_resample(self.resample),
        );
        self.reporter.emit(Status::CatalogLoaded { count });
        count
    }

    pub fn select_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.reporter.emit(Status::ImageLoading);
        self.image = None;
        self.image = Some(image::open(path)?);
        Ok(())
    }

    pub fn select_image_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reporter.emit(Status::ImageLoading);
        self.image = None;
        self.image = Some(image::load_from_memory(bytes)?);
        Ok(())
    }

    pub fn set_image(&mut self, image: DynamicImage) {
        self.image = Some(image);
    }

    /// Run one generation request against the current image and catalog.
    pub fn generate(&mut self) -> Result<Mosaic> {
        let image = self.image.as_ref().ok_or(MosaicError::NoImageSelected)?;
        let converter = self.converter.as_ref().ok_or(MosaicError::EmptyCatalog)?;

        let spec = converter.plan(image.width(), image.height());
        self.reporter.emit(Status::Generating {
            cols: spec.cols,
            rows: spec.rows,
            estimated: spec.estimated_chars,
        });

        let mosaic = converter.convert_with(image, spec);
        self.reporter.emit(Status::Done {
            length: mosaic.length,
            budget: converter.budget(),
            truncated: mosaic.truncated,
            verdict: Verdict::of(mosaic.length, converter.budget()),
        });
        Ok(mosaic)
    }
}
