//! Findmypast transcripts, record images, family tree profiles and image shares.

mod extract;
mod generalize;
mod profile;

pub use extract::{FmpExtractor, FmpRecord, FmpSpouse, Household, HouseholdRow, PageKind};
pub use generalize::FmpGeneralizer;

use super::Site;

pub const ID: &str = "fmp";

pub static SITE: Site<FmpExtractor, FmpGeneralizer> = Site {
    id: ID,
    name: "Findmypast",
    domains: &[
        "findmypast.co.uk",
        "findmypast.com",
        "findmypast.ie",
        "findmypast.com.au",
    ],
    extractor: FmpExtractor,
    generalizer: FmpGeneralizer,
};
