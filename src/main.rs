use anyhow::Context;
use clap::Parser;
use is_terminal::IsTerminal;
use mdiff::Engine;
use mdiff::render::PagerWriter;
use mdiff::render::terminal::{DiffPrinter, OpFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mdiff",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A visual diff for markdown blog posts",
    long_about = "Compares two versions of a markdown text and renders a \
    line-aligned visual diff with word-level highlighting, structural \
    awareness and move detection.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(index = 1, help = "The old version of the markdown file")]
    old: PathBuf,

    #[arg(index = 2, help = "The new version of the markdown file")]
    new: PathBuf,

    #[arg(
        short,
        long,
        help = "Append the structural change summary (headers, lists, quotes, code blocks)"
    )]
    summary: bool,

    #[arg(
        short,
        long,
        value_name = "CLASSES",
        help = "Only show operations of the given classes: A(dded), D(eleted), M(odified), V(moved), U(nchanged)"
    )]
    filter: Option<String>,

    #[arg(long, help = "Write straight to stdout instead of paging")]
    no_pager: bool,

    #[arg(long, help = "Disable colored output")]
    no_color: bool,

    #[arg(long, help = "Exit with status 1 when the texts differ")]
    exit_code: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let filter = match &cli.filter {
        Some(spec) => OpFilter::try_parse(spec)
            .ok_or_else(|| anyhow::anyhow!("invalid filter classes: {spec}"))?,
        None => OpFilter::all(),
    };

    let old_text = std::fs::read_to_string(&cli.old)
        .with_context(|| format!("cannot read {}", cli.old.display()))?;
    let new_text = std::fs::read_to_string(&cli.new)
        .with_context(|| format!("cannot read {}", cli.new.display()))?;

    let report = Engine::new().diff(&old_text, &new_text);

    if !cli.no_pager && std::io::stdout().is_terminal() {
        let pager = minus::Pager::new();
        let printer = DiffPrinter::new(Box::new(PagerWriter::new(pager.clone())), filter);
        printer.print_report(&report, &cli.old, &cli.new, cli.summary)?;
        minus::page_all(pager)?;
    } else {
        let printer = DiffPrinter::new(Box::new(std::io::stdout()), filter);
        printer.print_report(&report, &cli.old, &cli.new, cli.summary)?;
    }

    if cli.exit_code && !report.is_unchanged() {
        std::process::exit(1);
    }

    Ok(())
}
