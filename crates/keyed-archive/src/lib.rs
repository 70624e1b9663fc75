//! Decoder and tree printer for keyed archives (`NSKeyedArchiver`
//! property lists).
//!
//! An archive stores an object graph as a flat `$objects` table plus UID
//! back-references, rooted at the entries of `$top`. [`Archive::build`]
//! classifies every record into a typed [`ArchiveNode`] and then resolves
//! references in a second pass; [`Archive::dump_string`] walks the roots
//! and renders a tree, expanding byte blobs that turn out to hold nested
//! archives, deflate streams or JSON.
//!
//! ```no_run
//! use keyed_archive::{Archive, InputOutputConfiguration};
//!
//! let bytes = std::fs::read("state.bplist").unwrap();
//! let archive = Archive::from_encoded_bytes(&bytes, InputOutputConfiguration::default()).unwrap();
//! print!("{}", archive.dump_string().unwrap());
//! ```

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod inflate;
pub mod keypath;
pub mod nodes;
pub mod render;
pub mod sniff;
pub mod sqlite;
pub mod value;

pub use archive::Archive;
pub use batch::{decode_batch, BatchRow};
pub use config::{Decompression, DumpEncoding, DumpLength, InputOutputConfiguration};
pub use error::{ArchiveError, ConfigError};
pub use keypath::{archive_from_plist_keypath, value_for_keypath};
pub use nodes::{ArchiveNode, InstanceKind, InstanceNode, NodeBody, NodeId, Slot};
pub use render::{RenderContext, MAX_RENDER_DEPTH};
pub use sniff::ascii_dump_for_data;
pub use sqlite::{archives_from_sqlite_table, ExtraColumns, TableScan};
pub use value::{parse_property_list, PrimitiveValue};

pub use keyed_archive_transport::{guess_encoding, InputEncoding, TransportEncoding};
