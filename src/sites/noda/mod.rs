//! Digitalarkivet (Norwegian national archives) person records and scanned images.

mod extract;
mod generalize;

pub use extract::{CollectionHeading, NodaExtractor, NodaPanel, NodaPerson, NodaRecord, PageType};
pub use generalize::NodaGeneralizer;

use super::Site;

pub const ID: &str = "noda";

pub static SITE: Site<NodaExtractor, NodaGeneralizer> = Site {
    id: ID,
    name: "Digitalarkivet",
    domains: &["digitalarkivet.no"],
    extractor: NodaExtractor,
    generalizer: NodaGeneralizer,
};
