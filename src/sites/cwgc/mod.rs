//! Commonwealth War Graves casualty pages.

mod extract;
mod generalize;

pub use extract::{CwgcExtractor, CwgcRecord};
pub use generalize::CwgcGeneralizer;

use super::Site;

pub const ID: &str = "cwgc";

pub static SITE: Site<CwgcExtractor, CwgcGeneralizer> = Site {
    id: ID,
    name: "Commonwealth War Graves",
    domains: &["cwgc.org"],
    extractor: CwgcExtractor,
    generalizer: CwgcGeneralizer,
};
