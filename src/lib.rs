//! Record extraction for genealogy sites.
//!
//! A saved record page goes through two steps: its site's extractor reads the
//! page into a site-specific raw record, and the site's generalizer maps that
//! onto the site-independent [`model::GeneralizedData`]. Hosts look sites up
//! through [`sites::lookup`] or [`sites::lookup_by_url`].

pub mod dom;
pub mod error;
pub mod model;
pub mod normalize;
pub mod options;
pub mod page_url;
pub mod record_type;
pub mod sites;

pub use error::Error;
