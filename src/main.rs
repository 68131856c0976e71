//! RDG - protocol document validator
//!
//! Command-line interface: validate an instance document against a template
//! and print the translated document.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use rdg::{
    LogLevel, Mapping, MappingKind, Outcome, OutputFormat, ProtocolDocument, ProtocolValidator, RdgConfig,
    RdgError, RdgResult, Store, StoreReasoner, TranslatedDocument, TurtleParser,
};

#[derive(Parser)]
#[command(name = "rdg")]
#[command(version = env!("RDG_VERSION"))]
#[command(about = "Validate RDF protocol documents against templates", long_about = None)]
struct Cli {
    /// Template document (Turtle)
    #[arg(short, long, value_name = "FILE", required_unless_present = "print_config")]
    template: Option<PathBuf>,

    /// Instance document (Turtle)
    #[arg(short, long, value_name = "FILE", required_unless_present = "print_config")]
    instance: Option<PathBuf>,

    /// Ontology files loaded into the reasoner
    #[arg(long = "ontology", value_name = "FILE")]
    ontologies: Vec<PathBuf>,

    /// Mapping kind for the resource check
    #[arg(long, value_name = "KIND", value_parser = parse_kind)]
    resource_kind: Option<MappingKind>,

    /// Mapping kind for subjects
    #[arg(long, value_name = "KIND", value_parser = parse_kind)]
    subject_kind: Option<MappingKind>,

    /// Mapping kind for objects
    #[arg(long, value_name = "KIND", value_parser = parse_kind)]
    object_kind: Option<MappingKind>,

    /// Validate only, without translating into the template vocabulary
    #[arg(long)]
    no_translate: bool,

    /// Do not back-fill template default values
    #[arg(long)]
    no_defaults: bool,

    /// Require identical resource identifiers
    #[arg(long)]
    strict_resource: bool,

    /// Output only the statements produced by translation
    #[arg(long)]
    translated_only: bool,

    /// Output format
    #[arg(short, long, value_name = "FORMAT", value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Base URI for relative references
    #[arg(long)]
    base: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (overrides the search path)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode (no logs)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_kind(s: &str) -> Result<MappingKind, String> {
    MappingKind::from_str(s)
        .ok_or_else(|| format!("unknown mapping kind '{}' (sub, sub_if_not_top, super, equivalent, any)", s))
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s).ok_or_else(|| format!("unknown output format '{}' (ntriples, json)", s))
}

fn init_tracing(cli: &Cli, config: &RdgConfig) {
    // --quiet silences everything; --verbose honours RUST_LOG or shows info;
    // otherwise RUST_LOG wins over the configured level.
    let filter = if cli.quiet || (config.general.log_level == LogLevel::Quiet && !cli.verbose) {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.general.log_level.filter_directive().into())
    };

    let ansi = config.general.color && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<RdgConfig> {
    let mut config = match cli.config {
        Some(ref path) => {
            let mut config = RdgConfig::load_from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => RdgConfig::load()?,
    };

    let validation = &mut config.validation;
    if let Some(kind) = cli.resource_kind {
        validation.resource_kind = kind;
    }
    if let Some(kind) = cli.subject_kind {
        validation.subject_kind = kind;
    }
    if let Some(kind) = cli.object_kind {
        validation.object_kind = kind;
    }
    if cli.no_translate {
        validation.translate = false;
    }
    if cli.no_defaults {
        validation.closed_world_defaults = false;
    }
    if cli.strict_resource {
        validation.strict_resource = true;
    }

    if let Some(format) = cli.format {
        config.general.format = format;
    }
    if cli.base.is_some() {
        config.general.base_uri = cli.base.clone();
    }
    config.reasoner.ontologies.extend(cli.ontologies.iter().cloned());

    Ok(config)
}

/// Read and parse one Turtle file with the configured prefixes
fn read_store(path: &Path, config: &RdgConfig) -> RdgResult<Store> {
    let content = fs::read_to_string(path)
        .map_err(|e| RdgError::from(e).with_context("path", path.display().to_string()))?;

    let mut parser = match config.general.base_uri {
        Some(ref base) => TurtleParser::with_base(base),
        None => TurtleParser::new(),
    }
    .with_prefixes(&config.prefixes);

    parser
        .parse_document(&content)
        .map_err(|e| RdgError::from(e).at(path.display().to_string()))?;
    Ok(parser.finish())
}

fn read_document(path: &Path, config: &RdgConfig) -> RdgResult<ProtocolDocument> {
    let store = read_store(path, config)?;
    ProtocolDocument::discover(store).map_err(|e| RdgError::from(e).at(path.display().to_string()))
}

fn mapping_json(mapping: &Mapping) -> Value {
    let entries: Vec<Value> = mapping
        .iter()
        .map(|(instance, template)| {
            json!({
                "instance": instance.to_string(),
                "template": template.map(|t| t.to_string()),
                "required": mapping.is_required(instance),
            })
        })
        .collect();
    Value::Array(entries)
}

fn format_json(doc: &TranslatedDocument, translated_only: bool) -> String {
    let statements: Vec<String> = if translated_only {
        doc.translated.iter().map(|t| t.to_string()).collect()
    } else {
        doc.document.iter().map(|t| t.to_string()).collect()
    };

    let objects: serde_json::Map<String, Value> = doc
        .object_mappings
        .iter()
        .map(|(subject, mapping)| (subject.to_string(), mapping_json(mapping)))
        .collect();

    let value = json!({
        "graph": doc.graph.to_string(),
        "subjects": mapping_json(&doc.subject_mapping),
        "objects": objects,
        "statements": statements,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

fn format_ntriples(doc: &TranslatedDocument, translated_only: bool) -> String {
    if translated_only {
        let mut out = String::new();
        for triple in &doc.translated {
            out.push_str(&triple.to_string());
            out.push('\n');
        }
        out
    } else {
        doc.document.to_ntriples()
    }
}

fn write_output(cli: &Cli, content: &str) -> Result<()> {
    match cli.output {
        Some(ref path) => {
            fs::write(path, content).with_context(|| format!("Failed to write output file: {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes()).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&cli, &config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let (Some(template_path), Some(instance_path)) = (cli.template.as_deref(), cli.instance.as_deref()) else {
        anyhow::bail!("--template and --instance are required");
    };

    let mut ontology = Store::new();
    for path in &config.reasoner.ontologies {
        let store = read_store(path, &config).with_context(|| format!("Failed to load ontology: {}", path.display()))?;
        tracing::debug!(path = %path.display(), triples = store.len(), "loaded ontology");
        ontology.merge(&store);
    }

    let template = read_document(template_path, &config)
        .with_context(|| format!("Failed to load template: {}", template_path.display()))?;
    let instance = read_document(instance_path, &config)
        .with_context(|| format!("Failed to load instance: {}", instance_path.display()))?;

    let reasoner = StoreReasoner::new(ontology).with_max_depth(config.reasoner.max_depth);
    let validator = ProtocolValidator::new(&reasoner);

    match validator.validate(&instance, &template, &config.validation) {
        Outcome::Accepted(doc) => {
            tracing::info!(
                graph = %doc.graph,
                statements = doc.document.len(),
                translated = doc.translated.len(),
                "instance accepted"
            );
            let content = match config.general.format {
                OutputFormat::NTriples => format_ntriples(&doc, cli.translated_only),
                OutputFormat::Json => format_json(&doc, cli.translated_only),
            };
            write_output(&cli, &content)
        }
        Outcome::Rejected(failure) => {
            let error = RdgError::from(&failure);
            tracing::info!(stage = %failure.stage, kind = failure.kind.as_str(), "instance rejected");
            eprintln!("{}", error.to_json_pretty());
            process::exit(error.exit_status());
        }
    }
}
