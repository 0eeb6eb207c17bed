//! Extraction of childcare portal pages into structured Documents, plus the
//! flattened text and aggregate projections built from them.

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod flatten;
pub mod identity;
pub mod model;
pub mod parser;
pub mod retrieval;
pub mod source;

pub use aggregate::{project, Aggregate, AggregateOptions};
pub use batch::{process_batch, BatchOutcome, PageFailure, PageInput};
pub use config::Settings;
pub use error::{ExtractError, Result};
pub use flatten::{flatten, flatten_document};
pub use model::{
    Cell, CellText, ContentBlock, Document, Identity, ListItem, Section, Tab, TableBlock,
};
pub use parser::process_page;
pub use retrieval::{index_records, IndexRecord};
