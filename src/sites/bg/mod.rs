//! BillionGraves grave pages.

mod extract;
mod generalize;

pub use extract::{BgExtractor, BgRecord};
pub use generalize::BgGeneralizer;

use super::Site;

pub const ID: &str = "bg";

pub static SITE: Site<BgExtractor, BgGeneralizer> = Site {
    id: ID,
    name: "BillionGraves",
    domains: &["billiongraves.com"],
    extractor: BgExtractor,
    generalizer: BgGeneralizer,
};
