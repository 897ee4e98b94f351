//! Rowshape – shared-schema records for bulk homogeneous data.
//!
//! Rowshape centers on the *schema* concept: a named, ordered field set that
//! many records share instead of each carrying its own keys, where:
//! * A [`construct::Schema`] is a shared handle to the ordered field names and
//!   their 1-based slots.
//! * A [`construct::Record`] holds one [`datatype::Value`] per field and a
//!   handle back to its schema.
//! * A [`construct::Mutator`] is handed out by shape changes that move slots
//!   (delete, reorder) and must be applied to every live record.
//!
//! Records behave like restricted associative containers: reads of undeclared
//! names are empty, writes to them fail, and single fields can never be
//! removed from a record (see [`interface::FieldMap`]).
//!
//! ## Modules
//! * [`construct`] – Schema, Record and Mutator.
//! * [`datatype`] – The [`datatype::Value`] cell type.
//! * [`interface`] – The map-like protocol and [`interface::instantiate`].
//! * [`comparator`] – Compiles textual or pair-list specifications into a
//!   composite record ordering.
//! * [`dates`] – Locale free date tokens with two-digit year pivoting.
//! * [`settings`] – Comparator tunables read through `config`.
//!
//! ## Quick Start
//! ```
//! use rowshape::{comparator::Comparator, construct::Schema, interface::instantiate};
//! use rowshape::datatype::Value;
//! let schema = Schema::with_fields(["firstname", "lastname", "birth"]).unwrap();
//! let mut people = instantiate(&schema, vec![
//!     vec![Value::from("Johann Sebastian"), Value::from("Bach"), Value::from(1685)],
//!     vec![Value::from("Ludwig van"), Value::from("Beethoven"), Value::from(1770)],
//! ]).unwrap();
//! let by_birth = Comparator::compile(&schema, "birth:-num").unwrap();
//! by_birth.sort(&mut people).unwrap();
//! assert_eq!(people[0].get("lastname"), &Value::from("Beethoven"));
//! ```
//!
//! ## Caveats
//! Schemas and records are plain in-memory structures. Shape changes are not
//! coordinated with readers, and the schema does not track its records, so
//! mutators must be applied by the caller.

pub mod comparator;
pub mod construct;
pub mod datatype;
pub mod dates;
pub mod error;
pub mod interface;
pub mod settings;

pub use error::{Result, RowshapeError};
