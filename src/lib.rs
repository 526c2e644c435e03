//! Malconv: manga reading-list CSV to MyAnimeList import XML
//!
//! This crate converts a spreadsheet export of a manga reading list into the
//! XML document accepted by MyAnimeList's list import. The conversion is a
//! single sequential pass:
//!
//! 1. **Read** -- Stream CSV rows, resolving the six source columns by header
//!    name (or by position when the header is not recognized)
//! 2. **Map** -- Turn each row into an 18-field manga record: numeric id from
//!    the `/manga/<id>` URL, normalized dates, canonical status
//! 3. **Aggregate** -- Count records per status for the header block
//! 4. **Write** -- Emit `<myinfo>` followed by one `<manga>` element per record
//!
//! # Validation policies
//!
//! - **Lenient** (default) -- Unknown or empty values fall back to defaults;
//!   every row becomes a record and an empty input still yields a document
//! - **Strict** -- Rows without an id, a title or an exact status label are
//!   logged and skipped; when nothing survives no file is written
//!
//! # Key Modules
//!
//! - [`reader`] -- CSV streaming and column resolution
//! - [`mapper`] -- Date, status and id normalization; row-to-record mapping
//! - [`stats`] -- Per-status counts
//! - [`writer`] -- XML serialization with quick-xml
//! - [`convert`] -- End-to-end pipeline and output naming
//! - [`models`] -- Core data types (RawRow, MangaRecord, Status)
//! - [`config`] -- Constants for header identity and output naming
//!
//! # Example Usage
//!
//! ```bash
//! # Writes reading_list_mal.xml next to the input
//! malconv reading_list.csv
//!
//! # Reject malformed rows instead of defaulting them
//! malconv reading_list.csv --policy strict -v
//! ```

pub mod config;
pub mod convert;
pub mod mapper;
pub mod models;
pub mod reader;
pub mod stats;
pub mod writer;
