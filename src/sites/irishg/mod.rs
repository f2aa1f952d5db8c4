//! IrishGenealogy.ie church and civil record pages.

mod extract;
mod generalize;

pub use extract::{IrishgExtractor, IrishgRecord};
pub use generalize::IrishgGeneralizer;

use super::Site;

pub const ID: &str = "irishg";

pub static SITE: Site<IrishgExtractor, IrishgGeneralizer> = Site {
    id: ID,
    name: "IrishGenealogy",
    domains: &["irishgenealogy.ie"],
    extractor: IrishgExtractor,
    generalizer: IrishgGeneralizer,
};
