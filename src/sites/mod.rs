//! Per-site extractors and generalizers, and the registry that pairs them.
//!
//! Every site follows the same two steps:
//!
//! 1. [`Extractor::extract`] classifies the page URL against the site's route
//!    table, then walks the DOM into the site's own raw record. It never fails;
//!    a page it cannot read comes back with `success == false`.
//! 2. [`Generalizer::generalize`] maps that raw record onto [`GeneralizedData`]
//!    through a [`RecordBuilder`](crate::model::RecordBuilder).
//!
//! The raw record's shape is private to each site. Hosts that only know a site
//! id go through [`RegisteredSite`], which exchanges raw records as JSON.

pub mod bg;
pub mod cwgc;
pub mod fields;
pub mod fmp;
pub mod irishg;
pub mod noda;

use scraper::Html;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::model::{GeneralizedData, Unusable};
use crate::page_url::UrlParts;

pub use fields::LabelledFields;

/// Outcome flags every raw record carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractStatus {
    pub url: String,
    pub success: bool,
    /// The route was recognized but its content anchor was missing, as when a
    /// page reports itself loaded before its data has rendered.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub data_may_be_incomplete: bool,
}

impl ExtractStatus {
    pub fn new(url: &str) -> Self {
        ExtractStatus {
            url: url.to_string(),
            ..Default::default()
        }
    }
}

pub trait RawRecord: Serialize + DeserializeOwned {
    fn status(&self) -> &ExtractStatus;
}

pub trait Extractor {
    type Record: RawRecord;

    fn extract(&self, document: &Html, url: &str) -> Self::Record;
}

pub trait Generalizer {
    type Record: RawRecord;

    /// Site id written to `source_of_data`.
    fn source(&self) -> &'static str;

    /// Only called for records whose extraction succeeded.
    fn generalize_extracted(&self, record: &Self::Record) -> GeneralizedData;

    fn generalize(&self, record: &Self::Record) -> GeneralizedData {
        if !record.status().success {
            debug!(site = self.source(), url = %record.status().url, "extraction failed, nothing to generalize");
            return GeneralizedData::unusable(self.source(), Unusable::ExtractionFailed);
        }
        self.generalize_extracted(record)
    }
}

pub(crate) fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Sentinel for a vocabulary token that maps to no record type.
pub(crate) fn unrecognized(source: &str, token: &str) -> GeneralizedData {
    debug!(site = source, token, "unrecognized record type");
    GeneralizedData::unusable(source, Unusable::UnrecognizedRecordType(token.to_string()))
}

/// Raw and generalized output for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub site: &'static str,
    pub status: ExtractStatus,
    pub raw: serde_json::Value,
    pub generalized: GeneralizedData,
}

/// A site as seen by a host that only knows its id.
pub trait RegisteredSite: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    /// Host names are matched on these suffixes.
    fn domains(&self) -> &'static [&'static str];

    fn process(&self, document: &Html, url: &str) -> Extraction;
    fn generalize_json(&self, raw: &serde_json::Value) -> Result<GeneralizedData, Error>;
}

/// Compile-time pairing of one site's extractor and generalizer.
pub struct Site<E, G> {
    pub id: &'static str,
    pub name: &'static str,
    pub domains: &'static [&'static str],
    pub extractor: E,
    pub generalizer: G,
}

impl<E, G> RegisteredSite for Site<E, G>
where
    E: Extractor + Send + Sync,
    G: Generalizer<Record = E::Record> + Send + Sync,
{
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn domains(&self) -> &'static [&'static str] {
        self.domains
    }

    fn process(&self, document: &Html, url: &str) -> Extraction {
        let record = self.extractor.extract(document, url);
        let generalized = self.generalizer.generalize(&record);
        Extraction {
            site: self.id,
            status: record.status().clone(),
            raw: serde_json::to_value(&record).unwrap_or_default(),
            generalized,
        }
    }

    fn generalize_json(&self, raw: &serde_json::Value) -> Result<GeneralizedData, Error> {
        let record: E::Record = serde_json::from_value(raw.clone())?;
        Ok(self.generalizer.generalize(&record))
    }
}

static SITES: [&dyn RegisteredSite; 5] = [&bg::SITE, &cwgc::SITE, &fmp::SITE, &irishg::SITE, &noda::SITE];

pub fn all() -> &'static [&'static dyn RegisteredSite] {
    &SITES
}

pub fn lookup(id: &str) -> Result<&'static dyn RegisteredSite, Error> {
    SITES
        .iter()
        .copied()
        .find(|site| site.id() == id)
        .ok_or_else(|| Error::UnknownSite(id.to_string()))
}

/// Site whose domain list covers the URL's host.
pub fn lookup_by_url(url: &str) -> Result<&'static dyn RegisteredSite, Error> {
    let host = UrlParts::parse(url)
        .map(|parts| parts.host().to_lowercase())
        .ok_or_else(|| Error::NoSiteForUrl(url.to_string()))?;
    SITES
        .iter()
        .copied()
        .find(|site| {
            site.domains()
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
        })
        .ok_or_else(|| Error::NoSiteForUrl(url.to_string()))
}
