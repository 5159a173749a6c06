//! Country catalog: keyed cache of country records.
//!
//! Built once from the country bulk source, either eagerly or on first use
//! through [`LazyCatalog`].

mod catalog;
mod lazy;
mod source;

pub use catalog::CountryCatalog;
pub use lazy::LazyCatalog;
pub use source::{CountrySource, GeoNamesCountries};
