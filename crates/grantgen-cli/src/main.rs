//! `grantgen` command-line tool

mod cli;

use anyhow::{Context, Result};
use clap::ArgMatches;
use grantgen_core::{
    DocumentKey, DocumentSession, DocumentStore, FileDocumentStore, GenerationRequest,
    GeneratorConfig, ReplayProvider, SectionGenerator,
};
use grantgen_document::{Document, SectionKind};
use grantgen_prompt::{build_context, build_context_for, PromptCompiler};
use grantgen_response::{enforce_envelope_value, ResponseProcessor};
use grantgen_rules::{FileOverrideStore, Language, RuleRegistry};
use grantgen_schema::schema_for;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn section(args: &ArgMatches) -> Result<SectionKind> {
    args.get_one::<SectionKind>("section")
        .copied()
        .context("--section is required")
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("--{name} is required"))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn load_document(path: &Path) -> Result<Document> {
    Document::from_json(&read_text(path)?)
        .with_context(|| format!("{} is not a proposal document", path.display()))
}

/// The `--document` file, or an empty document when none is given
fn optional_document(args: &ArgMatches) -> Result<Document> {
    match args.get_one::<PathBuf>("document") {
        Some(doc_path) => load_document(doc_path),
        None => Ok(Document::new()),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn language(args: &ArgMatches, config: &GeneratorConfig) -> Language {
    args.get_one::<Language>("language")
        .copied()
        .unwrap_or(config.language)
}

fn rule_registry(args: &ArgMatches) -> RuleRegistry {
    match args.get_one::<PathBuf>("rules") {
        Some(path) => RuleRegistry::new(Arc::new(FileOverrideStore::new(path))),
        None => RuleRegistry::default(),
    }
}

fn run_context(args: &ArgMatches) -> Result<()> {
    let document = load_document(path(args, "document")?)?;
    let context = match args.get_one::<SectionKind>("section") {
        Some(&section) => build_context_for(&document, section),
        None => build_context(&document),
    };
    println!("{context}");
    Ok(())
}

async fn run_prompt(args: &ArgMatches, config: &GeneratorConfig) -> Result<()> {
    let section = section(args)?;
    if args.get_flag("schema") {
        return print_json(&schema_for(section).to_json_schema());
    }

    let document = optional_document(args)?;
    let rules = rule_registry(args).resolve(language(args, config)).await?;
    let mode = cli::mode(args);
    let current = document.section_value(section);
    let prompt = PromptCompiler::new(&rules).compile(section, &document, &mode, &current);
    println!("{}", prompt.instruction);
    Ok(())
}

fn run_process(args: &ArgMatches, config: &GeneratorConfig) -> Result<()> {
    let section = section(args)?;
    let raw = read_text(path(args, "response")?)?;
    let processed = ResponseProcessor::new(config.processor_options()).process(
        &raw,
        section,
        &schema_for(section),
    )?;
    for diagnostic in &processed.diagnostics {
        eprintln!("schema: {diagnostic}");
    }

    let value: Value = match args.get_one::<PathBuf>("document") {
        Some(doc_path) if section.has_temporal_constraints() => {
            let document = load_document(doc_path)?;
            enforce_envelope_value(processed.value, document.envelope())?
        }
        _ => processed.value,
    };
    print_json(&value)
}

async fn run_rules(args: &ArgMatches, config: &GeneratorConfig) -> Result<()> {
    let rules = rule_registry(args).resolve(language(args, config)).await?;
    print_json(&rules)
}

async fn run_generate(args: &ArgMatches, config: &GeneratorConfig) -> Result<()> {
    let store = FileDocumentStore::new(path(args, "store")?);
    let project = args
        .get_one::<String>("project")
        .context("--project is required")?;
    let language = language(args, config);
    let key = DocumentKey::new(project.as_str(), language)?;

    let document = store.load(&key).await?.unwrap_or_else(|| {
        tracing::info!(key = %key, "no stored document, starting empty");
        Document::new()
    });
    let response = read_text(path(args, "response")?)?;
    let generator = SectionGenerator::new(Arc::new(ReplayProvider::new(response)))
        .with_rules(rule_registry(args))
        .with_config(config.clone());
    let session = DocumentSession::new(document, generator);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let request = GenerationRequest::new(section(args)?, cli::mode(args)).with_language(language);
    let outcome = session
        .generate(request, &cancel)
        .await
        .map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        })?;

    for diagnostic in &outcome.diagnostics {
        eprintln!("schema: {diagnostic}");
    }
    print_json(&outcome.merged)?;

    if args.get_flag("save") {
        store.save(&key, &session.document()).await?;
        tracing::info!(key = %key, path = %store.path_for(&key).display(), "document saved");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::command().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    match matches.subcommand() {
        Some(("context", args)) => run_context(args),
        Some(("prompt", args)) => run_prompt(args, &config).await,
        Some(("process", args)) => run_process(args, &config),
        Some(("rules", args)) => run_rules(args, &config).await,
        Some(("generate", args)) => run_generate(args, &config).await,
        _ => anyhow::bail!("unknown command"),
    }
}
