use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, CommandFactory, Parser};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use uidump_reader::output::{OutputFormat, SummaryReport};
use uidump_reader::server::{self, ServerConfig};
use uidump_reader::source::{self, DirectoryOptions, DocumentFetcher, FetchPolicy};

#[derive(Parser, Debug,)]
#[command(
    author,
    version,
    about = "Summarizes UI-dump XML: element paths, resource-ids and focus.",
    long_about = "
    Summarizes UI-dump XML (as produced by uiautomator and similar inspectors). Every element \
                  gets a positional path such as /hierarchy[1]/node[2], and elements are \
                  grouped by whether they carry a resource-id attribute.
    The same summary is served over HTTP with --serve.

    Usage:
        uidump-reader --file-path <FILE_PATH> [--format <FORMAT>] [--output-path <PATH>]
        uidump-reader --directory-path <DIRECTORY_PATH> [--recursive] [--filter-ext <EXT>] \
                  [--format <FORMAT>] [--output-path <PATH>]
        uidump-reader --xml-url <URL> [--format <FORMAT>]
        uidump-reader --serve [--bind-addr <ADDR>] [--port <PORT>]

    Examples:
        # Summarize a dump as JSON
        uidump-reader --file-path window_dump.xml --format json

        # Summarize every .xml file below a directory into one YAML file
        uidump-reader --directory-path dumps --recursive --output-path summary.yaml

        # Summarize a remote dump
        uidump-reader --xml-url https://example.com/window_dump.xml

        # Run the kickoff/status HTTP service on port 8080
        uidump-reader --serve --port 8080
    "
)]
#[clap(group(
    ArgGroup::new("input_source")
        .required(true)
        .args(&["file_path", "directory_path", "xml_url", "serve"]),
))]
struct Cli {
    /// Path to the UI dump to summarize
    #[arg(long, group = "input_source")]
    file_path: Option<PathBuf,>,

    /// Path to a directory of UI dumps
    #[arg(long, group = "input_source")]
    directory_path: Option<PathBuf,>,

    /// URL of a UI dump to fetch and summarize
    #[arg(long, group = "input_source")]
    xml_url: Option<String,>,

    /// Run the HTTP service instead of summarizing once
    #[arg(long, group = "input_source")]
    serve: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to write the output to instead of stdout
    #[arg(long, value_name = "PATH")]
    output_path: Option<PathBuf,>,

    /// Recursively read dumps in subdirectories
    #[arg(long)]
    recursive: bool,

    /// Extension of the dumps to read from a directory (default: xml)
    #[arg(long, value_name = "EXT")]
    filter_ext: Option<String,>,

    /// Address to bind with --serve (overrides configuration)
    #[arg(long, value_name = "ADDR")]
    bind_addr: Option<String,>,

    /// Port to listen on with --serve (overrides configuration)
    #[arg(long)]
    port: Option<u16,>,
}

// Helper function to write output
fn write_output(
    formatted_output: &str,
    output_path: Option<&Path,>,
) -> Result<(), Box<dyn std::error::Error,>,> {
    if let Some(path,) = output_path {
        let mut file = std::fs::File::create(path,).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Failed to create output file {}: {}", path.display(), e),
            ),) as Box<dyn std::error::Error,>
        },)?;
        writeln!(file, "{}", formatted_output).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Failed to write to output file {}: {}", path.display(), e),
            ),) as Box<dyn std::error::Error,>
        },)?;
        info!("Summary written to {}", path.display());
    } else {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", formatted_output)?;
    }
    Ok((),)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error,>,> {
    // Initialize tracing
    let file_appender = tracing_appender::rolling::never(".", "uidump-reader.log",);
    let (non_blocking, _guard,) = tracing_appender::non_blocking(file_appender,);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),),)
        .with(fmt::layer().with_writer(std::io::stderr,),)
        .with(fmt::layer().with_writer(non_blocking,).with_ansi(false,),)
        .init();

    if std::env::args().len() == 1 {
        // If no arguments are provided, print the help message
        Cli::command().print_help()?;
        return Ok((),);
    }

    let cli = Cli::parse();

    if cli.serve {
        let mut config = ServerConfig::load()?;
        if let Some(bind_addr,) = cli.bind_addr {
            config.bind_addr = bind_addr;
        }
        if let Some(port,) = cli.port {
            config.port = port;
        }
        server::start_server(config,).await?;
        return Ok((),);
    }

    // Infer output format from output_path extension if --format is not explicitly set
    let determined_output_format = if cli.output_path.is_some() && cli.format == OutputFormat::Text
    {
        cli.output_path
            .as_ref()
            .and_then(|path| OutputFormat::from_extension(path,),)
            .unwrap_or(OutputFormat::Text,)
    } else {
        cli.format
    };

    let report = if let Some(file_path,) = cli.file_path {
        let summary = source::summarize_file(&file_path,)?;
        SummaryReport::Document {
            origin: file_path.display().to_string(),
            summary,
        }
    } else if let Some(directory_path,) = cli.directory_path {
        let options = DirectoryOptions {
            recursive:   cli.recursive,
            filter_exts: cli.filter_ext.map(|e| vec![e],),
        };
        let results = source::summarize_directory(&directory_path, &options,)?;
        if results.is_empty() {
            warn!("No UI dumps found in {}", directory_path.display());
        }
        SummaryReport::Directory(results,)
    } else if let Some(xml_url,) = cli.xml_url {
        let fetcher = DocumentFetcher::new(FetchPolicy::default(),)?;
        let document = fetcher.fetch(&xml_url,).await?;
        let summary = uidump_reader::summarize(&document,)?;
        SummaryReport::Document {
            origin: xml_url,
            summary,
        }
    } else {
        return Err(Box::<dyn std::error::Error,>::from(
            "One of --file-path, --directory-path, --xml-url or --serve must be provided.",
        ),);
    };

    let formatted_output = report.to_string_formatted(determined_output_format,);
    write_output(&formatted_output, cli.output_path.as_deref(),)?;
    Ok((),)
}
