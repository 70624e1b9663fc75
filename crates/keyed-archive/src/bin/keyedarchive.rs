//! `keyedarchive`: print keyed archives as trees.
//!
//! ```text
//! keyedarchive state.bplist
//! pbpaste | keyedarchive -
//! keyedarchive --plist-path prefs.plist --plist-keypath Window.State
//! keyedarchive --sqlite-path notes.db --sqlite-table notes --sqlite-column state \
//!     --sqlite-extra-column id --sqlite-extra-sql 'WHERE id > 10'
//! ```

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use keyed_archive::sqlite::{archives_from_sqlite_table, open_read_only, TableScan};
use keyed_archive::{
    archive_from_plist_keypath, decode_batch, Archive, Decompression, DumpEncoding, DumpLength,
    InputEncoding, InputOutputConfiguration,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "keyedarchive", version)]
#[command(about = "Decode NSKeyedArchiver property lists and print their object graph")]
struct Args {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Dump data blobs as hex/base64 without looking for nested content
    #[arg(long)]
    dont_decode_data: bool,

    /// Bytes shown per data dump, -1 for no limit
    #[arg(long, default_value_t = 32, allow_negative_numbers = true, value_name = "N")]
    output_dump_length: i64,

    /// Encoding of data dumps: hex or base64
    #[arg(long, default_value = "hex", value_name = "ENCODING")]
    output_dump_encoding: DumpEncoding,

    /// Skip this many bytes of input before parsing
    #[arg(long, default_value_t = 0, value_name = "N")]
    input_data_offset: usize,

    /// Decompress input before parsing, e.g. `zlib` or `zlib:-15`
    #[arg(long, value_name = "ALGO[:OPTION]")]
    input_data_compression: Option<Decompression>,

    /// Transport encoding of the input: auto, hex, base64 or none
    #[arg(long, default_value = "auto", value_name = "ENCODING")]
    encoding: InputEncoding,

    /// Property list that stores an archive as data
    #[arg(long, requires = "plist_keypath", value_name = "PATH")]
    plist_path: Option<PathBuf>,

    /// Dotted key path of the archive inside --plist-path
    #[arg(long, requires = "plist_path", value_name = "KEYPATH")]
    plist_keypath: Option<String>,

    /// SQLite database with archives stored in a table column
    #[arg(
        long,
        requires_all = ["sqlite_table", "sqlite_column"],
        conflicts_with = "plist_path",
        value_name = "PATH"
    )]
    sqlite_path: Option<PathBuf>,

    /// Table to scan in --sqlite-path
    #[arg(long, requires = "sqlite_path", value_name = "TABLE")]
    sqlite_table: Option<String>,

    /// Column holding the archive bytes
    #[arg(long, requires = "sqlite_path", value_name = "COLUMN")]
    sqlite_column: Option<String>,

    /// Additional column printed above each row (repeatable)
    #[arg(long = "sqlite-extra-column", requires = "sqlite_path", value_name = "COLUMN")]
    sqlite_extra_columns: Vec<String>,

    /// SQL appended after the FROM clause, e.g. joins or a WHERE clause
    #[arg(long, requires = "sqlite_path", value_name = "SQL")]
    sqlite_extra_sql: Option<String>,

    /// Input files, `-` for stdin (the default)
    #[arg(value_name = "INFILE", conflicts_with_all = ["plist_path", "sqlite_path"])]
    infiles: Vec<PathBuf>,
}

impl Args {
    fn configuration(&self) -> InputOutputConfiguration {
        InputOutputConfiguration::new()
            .with_dont_decode_data(self.dont_decode_data)
            .with_output_dump_length(DumpLength::from_signed(self.output_dump_length))
            .with_output_dump_encoding(self.output_dump_encoding)
            .with_input_data_offset(self.input_data_offset)
            .with_input_data_decompression(self.input_data_compression)
            .with_input_encoding(self.encoding)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose);
    debug!(?args);

    let configuration = args.configuration();
    let mut out = io::stdout().lock();

    if let (Some(path), Some(keypath)) = (&args.plist_path, &args.plist_keypath) {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let archive = archive_from_plist_keypath(&bytes, keypath, configuration)
            .with_context(|| format!("decoding {keypath} in {}", path.display()))?;
        write!(out, "{}", archive.dump_string()?)?;
        return Ok(());
    }

    if let Some(path) = &args.sqlite_path {
        let (Some(table), Some(column)) = (&args.sqlite_table, &args.sqlite_column) else {
            bail!("--sqlite-path needs --sqlite-table and --sqlite-column");
        };
        let scan = TableScan::new(table, column)
            .with_extra_columns(args.sqlite_extra_columns.iter().cloned())
            .with_extra_sql(args.sqlite_extra_sql.clone().unwrap_or_default());
        let connection =
            open_read_only(path).with_context(|| format!("opening {}", path.display()))?;
        let rows = archives_from_sqlite_table(&connection, &scan, &configuration)
            .with_context(|| format!("scanning {table}.{column} in {}", path.display()))?;
        for row in &rows {
            writeln!(out, "{}", row.dump_string())?;
        }
        return Ok(());
    }

    let inputs = if args.infiles.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.infiles.clone()
    };

    if let [single] = inputs.as_slice() {
        let bytes = read_input(single)?;
        let archive = Archive::from_encoded_bytes(&bytes, configuration)
            .with_context(|| format!("decoding {}", single.display()))?;
        if archive.unresolved_reference_count() > 0 {
            debug!(
                count = archive.unresolved_reference_count(),
                "archive has unresolved references"
            );
        }
        write!(out, "{}", archive.dump_string()?)?;
        return Ok(());
    }

    let rows = inputs
        .iter()
        .map(|path| Ok((read_input(path)?, path.display().to_string())))
        .collect::<Result<Vec<_>>>()?;
    let decoded = decode_batch(rows, &configuration);
    for row in &decoded {
        writeln!(out, "{}", row.dump_string())?;
    }
    let failures = decoded.iter().filter(|row| row.error.is_some()).count();
    if failures > 0 {
        bail!("{failures} of {} inputs failed to decode", decoded.len());
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if path == Path::new("-") {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("reading stdin")?;
    } else {
        bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    }
    Ok(bytes)
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
