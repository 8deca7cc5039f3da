//! # rowset — raw SQL for humans
//!
//! > Write the SQL yourself. Let the rows come to you.
//!
//! rowset executes raw SQL through sqlx and hands back lazy, caching
//! record collections that can be indexed, sliced, iterated repeatedly,
//! and exported to tabular formats.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rowset::prelude::*;
//!
//! let db = Database::connect("postgres://localhost/mydb").await?;
//! let rows = db
//!     .query("SELECT * FROM repos WHERE language = :lang")
//!     .param("lang", "rust")
//!     .fetch()
//!     .await?;
//!
//! let first = rows.first()?;
//! println!("{}", rows.export("csv".parse()?)?);
//! ```
//!
//! ## Pieces
//!
//! | Type               | Role                                       |
//! |--------------------|--------------------------------------------|
//! | `Database`         | Connection pool, query entry point         |
//! | `Query`            | SQL text plus named/positional bindings    |
//! | `RecordCollection` | Lazy, caching sequence of result rows      |
//! | `Record`           | One ordered column-name → value row        |
//! | `Dataset`          | Column-oriented export form                |

pub mod engine;
pub mod error;
pub mod export;
pub mod record;
pub mod records;

pub mod prelude {
    pub use crate::engine::{Database, Query, SqlValue, Transaction};
    pub use crate::error::{RowsetError, RowsetResult};
    pub use crate::export::{Dataset, Format};
    pub use crate::record::Record;
    pub use crate::records::RecordCollection;
}
