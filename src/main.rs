use std::io::{self, BufWriter, Write};
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mt::{transform, TransformConfig, ValidationError, DEFAULT_CHARSET, DEFAULT_VARIABLE};

#[derive(Parser, Debug)]
#[clap(
    name = "mustache",
    author = "Alexey Novakov",
    about = "Command line tool to render 'Mustache' templates with values from parameters and context files.",
    version
)]
struct Opts {
    /// Template file(s), rendered in order against the same context
    #[clap(value_name = "TEMPLATE", value_parser)]
    templates: Vec<String>,
    /// File(s) loaded as strings into the context under the matching variable names
    #[clap(
        short = 'f',
        long = "file",
        alias = "files",
        value_name = "FILE",
        value_delimiter = ',',
        value_parser
    )]
    files: Vec<String>,
    /// Variable name(s) for the context files, paired by position
    #[clap(
        long = "var",
        alias = "vars",
        value_name = "NAME",
        value_delimiter = ',',
        default_value = DEFAULT_VARIABLE,
        value_parser
    )]
    variables: Vec<String>,
    /// Charset used to decode context files
    #[clap(long, default_value = DEFAULT_CHARSET, value_parser)]
    charset: String,
    /// String value added to the context
    #[clap(short = 'D', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, String)>,
    /// Parse json/js/conf/hocon context files instead of binding their raw text
    #[clap(long, action)]
    structured: bool,
    #[clap(short, long, action)]
    debug: bool,
}

impl From<Opts> for TransformConfig {
    fn from(opts: Opts) -> Self {
        TransformConfig {
            templates: opts.templates,
            files: opts.files,
            variables: opts.variables,
            charset: opts.charset,
            params: opts.params,
            structured: opts.structured,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in '{}'", s))
}

fn setup_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &TransformConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    transform(config, |s| {
        writer
            .write_all(s.as_bytes())
            .with_context(|| "Failed to write to std out")
    })?;
    writer.flush().with_context(|| "Failed to flush std out")
}

fn main() {
    let opts: Opts = Opts::parse();
    setup_logging(opts.debug);
    let config = TransformConfig::from(opts);
    debug!("{:?}", config);

    if let Err(e) = run(&config) {
        match e.downcast_ref::<ValidationError>() {
            Some(invalid) => {
                for message in &invalid.messages {
                    eprintln!("error: {}", message);
                }
                eprintln!("\n{}", Opts::command().render_usage());
                process::exit(2)
            }
            None => {
                eprintln!("{:?}", e);
                process::exit(1)
            }
        }
    }
}
