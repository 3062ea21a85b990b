#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! SeaORM backend for `relay_cursor`.
//!
//! ```ignore
//! let fields = FieldMap::<post::Entity>::new()
//!     .insert("created", post::Column::Created, FieldKind::DateTimeUtc)
//!     .insert("slug", post::Column::Slug, FieldKind::String);
//! let executor = SeaOrmExecutor::new(&conn, fields);
//! let page = executor
//!     .paginate("+created,+slug".parse()?)
//!     .build(&args)?
//!     .resolve()
//!     .await?;
//! ```

pub mod condition;
pub mod executor;
pub mod field_map;
pub mod kind;

pub use condition::{apply_order, coerce, predicate_to_condition, BuildError, BuildResult};
pub use executor::{DbAdapterError, SeaOrmExecutor};
pub use field_map::{Field, FieldMap};
pub use kind::FieldKind;
