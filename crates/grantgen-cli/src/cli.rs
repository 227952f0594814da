//! Command-line definition

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use grantgen_document::{GenerationMode, ModeKind, SectionKind};
use grantgen_rules::Language;
use std::path::PathBuf;

fn section_arg(required: bool) -> Arg {
    Arg::new("section")
        .long("section")
        .required(required)
        .value_parser(value_parser!(SectionKind))
        .help("Section key, e.g. projectIdea or risks")
}

fn document_arg(required: bool) -> Arg {
    Arg::new("document")
        .long("document")
        .required(required)
        .value_parser(value_parser!(PathBuf))
        .help("Proposal document (JSON)")
}

fn mode_args() -> [Arg; 2] {
    [
        Arg::new("mode")
            .long("mode")
            .default_value("regenerate")
            .value_parser(value_parser!(ModeKind))
            .help("regenerate, fill, enhance or targetedFill"),
        Arg::new("indices")
            .long("indices")
            .value_delimiter(',')
            .value_parser(value_parser!(usize))
            .help("Positions for targetedFill, e.g. 1,3 (default: all empty items)"),
    ]
}

fn rules_args() -> [Arg; 2] {
    [
        Arg::new("language")
            .long("language")
            .value_parser(value_parser!(Language))
            .help("Output language: en or si (default from config)"),
        Arg::new("rules")
            .long("rules")
            .value_parser(value_parser!(PathBuf))
            .help("Rule override file (JSON)"),
    ]
}

/// Build the command tree
pub(crate) fn command() -> Command {
    Command::new("grantgen")
        .version(grantgen_core::VERSION)
        .about("EU grant proposal section generation pipeline")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (TOML)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("context")
                .about("Print the context extracted from a document")
                .arg(document_arg(true))
                .arg(section_arg(false)),
        )
        .subcommand(
            Command::new("prompt")
                .about("Print the compiled instruction for a section")
                .arg(document_arg(false))
                .arg(section_arg(true))
                .args(mode_args())
                .args(rules_args())
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .action(ArgAction::SetTrue)
                        .help("Print the section's JSON Schema instead"),
                ),
        )
        .subcommand(
            Command::new("process")
                .about("Sanitize a raw model response for a section")
                .arg(section_arg(true))
                .arg(
                    Arg::new("response")
                        .long("response")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Raw response text"),
                )
                .arg(document_arg(false)),
        )
        .subcommand(
            Command::new("rules")
                .about("Print the resolved rule set")
                .args(rules_args()),
        )
        .subcommand(
            Command::new("generate")
                .about("Run the full pipeline on a captured model response")
                .arg(
                    Arg::new("store")
                        .long("store")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document store directory"),
                )
                .arg(
                    Arg::new("project")
                        .long("project")
                        .required(true)
                        .help("Project identifier"),
                )
                .arg(section_arg(true))
                .arg(
                    Arg::new("response")
                        .long("response")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Captured model response"),
                )
                .args(mode_args())
                .args(rules_args())
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Write the merged document back to the store"),
                ),
        )
}

/// Generation mode from `--mode` and `--indices`
pub(crate) fn mode(args: &ArgMatches) -> GenerationMode {
    let kind = args
        .get_one::<ModeKind>("mode")
        .copied()
        .unwrap_or(ModeKind::Regenerate);
    match kind {
        ModeKind::Regenerate => GenerationMode::Regenerate,
        ModeKind::Fill => GenerationMode::Fill,
        ModeKind::Enhance => GenerationMode::Enhance,
        ModeKind::TargetedFill => GenerationMode::targeted(
            args.get_many::<usize>("indices")
                .into_iter()
                .flatten()
                .copied(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        command().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn command_tree_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn targeted_indices_parsed() {
        let matches = parse(&[
            "grantgen", "prompt", "--document", "doc.json", "--section", "risks",
            "--mode", "targetedFill", "--indices", "3,1",
        ]);
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(mode(args), GenerationMode::targeted([1, 3]));
        assert_eq!(args.get_one::<SectionKind>("section"), Some(&SectionKind::Risks));
    }

    #[test]
    fn mode_defaults_to_regenerate() {
        let matches = parse(&["grantgen", "rules"]);
        assert!(matches.subcommand_matches("rules").is_some());

        let matches = parse(&["grantgen", "prompt", "--document", "d.json", "--section", "kers"]);
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(mode(args), GenerationMode::Regenerate);
    }

    #[test]
    fn prompt_document_is_optional() {
        let matches = parse(&["grantgen", "prompt", "--section", "risks", "--schema"]);
        let (_, args) = matches.subcommand().unwrap();
        assert!(args.get_one::<PathBuf>("document").is_none());
        assert!(args.get_flag("schema"));

        let matches = parse(&["grantgen", "prompt", "--section", "risks"]);
        assert!(matches.subcommand_matches("prompt").is_some());
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(command()
            .try_get_matches_from(["grantgen", "context", "--document", "d.json", "--section", "budget"])
            .is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = parse(&["grantgen", "rules", "--language", "sl", "--log-json"]);
        assert!(matches.get_flag("log-json"));
        let args = matches.subcommand_matches("rules").unwrap();
        assert_eq!(args.get_one::<Language>("language"), Some(&Language::Si));
    }
}
