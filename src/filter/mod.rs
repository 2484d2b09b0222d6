//! Filter string compilation
//!
//! This module turns a flat, human-writable filter string into a predicate
//! over entity documents plus an optional ordering.
//!
//! # Syntax
//!
//! ```text
//! key=value[,key=value...]
//! ```
//!
//! Pairs that do not split into exactly one key and one value are ignored.
//! All conditions combine with AND.
//!
//! # Keys
//!
//! - `field` - substring match for string fields, equality otherwise
//! - `a.b.c` - equality on a nested field; crossing a collection matches if
//!   any element matches
//! - `min<field>` / `max<field>` - inclusive range bound on a flat field;
//!   suppresses any plain condition on the same field
//! - `sortby` - dotted path to order results by
//! - `sortdescending` - `true` for descending order
//!
//! # Examples
//!
//! ```text
//! name=widget                              # Name contains "widget"
//! status=active,minprice=5,maxprice=20     # Active products between 5 and 20
//! reviews.rating=5                         # At least one five-star review
//! category.name=Tools,sortby=price,sortdescending=true
//! ```

pub mod coerce;
pub mod engine;
pub mod error;
pub mod parser;
pub mod path;
pub mod predicate;
pub mod sort;
pub mod value;

pub use coerce::coerce;
pub use engine::{CompiledFilter, FilterEngine};
pub use error::FilterError;
pub use parser::{CriterionKind, FilterCriterion, FilterParts};
pub use path::{PathStep, ResolvedPath, resolve, resolve_field};
pub use predicate::{Bound, Predicate};
pub use sort::{SortSpec, resolve_sort};
pub use value::Value;
