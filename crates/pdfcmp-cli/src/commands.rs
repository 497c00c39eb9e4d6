use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use pdfcmp_core::{CompareConfig, ComparePaths, CompareTool, Verdict};
use pdfcmp_diff::DifferenceSet;
use pdfcmp_doc::load_document;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Content(args) => cmd_content(args, &cli.format),
        Command::Visual(args) => cmd_visual(args),
        Command::Links(args) => cmd_links(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CompareConfig> {
    let config = match path {
        Some(path) => CompareConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => CompareConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn cmd_content(args: ContentArgs, format: &OutputFormat) -> anyhow::Result<ExitCode> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(limit) = args.limit {
        config = config.with_error_limit(limit);
    }
    if let Some(error) = args.abs_error {
        config = config.with_absolute_error(error);
    }
    if let Some(error) = args.rel_error {
        config = config.with_relative_error(error);
    }
    if args.xml_report {
        config = config.with_xml_report(true);
    }
    if let Some(name) = args.report_name {
        config = config.with_report_name(name);
    }

    let out_doc = load_document(&args.docs.out).with_context(|| format!("loading {}", args.docs.out.display()))?;
    let cmp_doc = load_document(&args.docs.cmp).with_context(|| format!("loading {}", args.docs.cmp.display()))?;
    let paths = ComparePaths {
        out_pdf: &args.docs.out,
        cmp_pdf: &args.docs.cmp,
        out_dir: &args.out_dir,
        diff_prefix: &args.diff_prefix,
    };
    let result = CompareTool::new(config).compare_documents(&out_doc, &cmp_doc, &paths)?;

    match format {
        OutputFormat::Text => print_differences(&result.differences),
        OutputFormat::Json => println!("{}", result.differences.structured_report().to_json()?),
    }
    Ok(print_verdict(&result.verdict))
}

fn cmd_visual(args: VisualArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let verdict = CompareTool::new(config).compare_visually(
        &args.docs.out,
        &args.docs.cmp,
        &args.out_dir,
        &args.diff_prefix,
    );
    Ok(print_verdict(&verdict))
}

fn cmd_links(args: PairArgs) -> anyhow::Result<ExitCode> {
    let tool = CompareTool::new(CompareConfig::default());
    let message = tool.compare_links(&args.docs.out, &args.docs.cmp)?;
    Ok(print_check(message, "Links match."))
}

fn cmd_info(args: PairArgs) -> anyhow::Result<ExitCode> {
    let tool = CompareTool::new(CompareConfig::default());
    let message = tool.compare_document_info(&args.docs.out, &args.docs.cmp)?;
    Ok(print_check(message, "Document info matches."))
}

fn print_check(failure: Option<String>, ok: &str) -> ExitCode {
    match failure {
        None => {
            println!("{} {ok}", "✓".green().bold());
            ExitCode::SUCCESS
        }
        Some(message) => {
            println!("{} {}", "✗".red().bold(), message);
            ExitCode::FAILURE
        }
    }
}

fn print_differences(differences: &DifferenceSet) {
    for (i, difference) in differences.iter().enumerate() {
        println!("{} {}", format!("[{}]", i + 1).yellow(), difference.message.bold());
        for line in difference.path.to_string().lines() {
            println!("    {}", line.dimmed());
        }
    }
}

fn print_verdict(verdict: &Verdict) -> ExitCode {
    match verdict {
        Verdict::Equal => {
            println!("{} Documents are equal.", "✓".green().bold());
            ExitCode::SUCCESS
        }
        Verdict::Different(failure) => {
            println!("{} {:?}", "✗".red().bold(), failure.kind);
            println!("{}", failure.message);
            ExitCode::FAILURE
        }
    }
}
