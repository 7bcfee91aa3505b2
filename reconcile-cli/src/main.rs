//! Reconcile CLI
//!
//! Diffs two snapshots of an HTML fragment, prints or exports the patches,
//! and can replay them against a live tree built from the old snapshot.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use reconcile_common::warning::clear_warnings;
use reconcile_core::{Patch, PatchKind, PatchList, Tree, apply_all, diff, mirror, parse};
use reconcile_dom::{DomTree, NodeId, print_tree};

#[derive(Parser, Debug)]
#[command(name = "reconcile")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the patches between two files
    reconcile old.html new.html

    # Inline snapshots
    reconcile --old-html '<ul><li>1</li></ul>' --new-html '<ul><li>1</li><li>2</li></ul>'

    # Export the patches as JSON
    reconcile --json old.html new.html

    # Apply the patches to a live copy of OLD and check it matches NEW
    reconcile --apply old.html new.html

    # Show both parsed trees with addresses and source spans
    reconcile --tree old.html new.html
"#)]
struct Cli {
    /// Snapshot files: OLD then NEW (either may be given inline instead)
    #[arg(value_name = "FILE", num_args = 0..=2)]
    files: Vec<PathBuf>,

    /// Old snapshot markup, instead of a file
    #[arg(long, value_name = "HTML")]
    old_html: Option<String>,

    /// New snapshot markup, instead of a file
    #[arg(long, value_name = "HTML")]
    new_html: Option<String>,

    /// Apply the patches to a live tree mirroring OLD and print the result
    #[arg(short, long)]
    apply: bool,

    /// Print the patches as JSON records
    #[arg(short, long)]
    json: bool,

    /// Print both parsed trees with addresses and source spans
    #[arg(short, long)]
    tree: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (old_markup, new_markup) = load_snapshots(&cli)?;

    let old = parse_snapshot(&old_markup, "OLD")?;
    let new = parse_snapshot(&new_markup, "NEW")?;

    if cli.tree {
        println!("=== Old Tree ({} nodes) ===", old.len());
        print!("{old}");
        println!("\n=== New Tree ({} nodes) ===", new.len());
        print!("{new}");
        println!();
    }

    let patches = diff(&old, &new);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&patches.records())?);
    } else {
        print_patches(&patches);
    }

    if cli.apply {
        apply_to_mirror(&old, &new, patches)?;
    }
    Ok(())
}

/// Resolve OLD and NEW from inline flags first, then positional files.
fn load_snapshots(cli: &Cli) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut files = cli.files.iter();
    let old = match &cli.old_html {
        Some(html) => html.clone().into_bytes(),
        None => read_snapshot(files.next(), "OLD")?,
    };
    let new = match &cli.new_html {
        Some(html) => html.clone().into_bytes(),
        None => read_snapshot(files.next(), "NEW")?,
    };
    if let Some(extra) = files.next() {
        bail!("unexpected extra file '{}'", extra.display());
    }
    Ok((old, new))
}

/// Snapshots are read as raw bytes; the parser does not need UTF-8.
fn read_snapshot(path: Option<&PathBuf>, which: &str) -> Result<Vec<u8>> {
    let Some(path) = path else {
        bail!("no {which} snapshot: pass a file or --{}-html", which.to_lowercase());
    };
    fs::read(path).with_context(|| format!("Error reading '{}'", path.display()))
}

/// Parse one snapshot. Warnings are reset first so each snapshot reports
/// its own recoveries.
fn parse_snapshot(markup: &[u8], which: &str) -> Result<Tree> {
    clear_warnings();
    parse(markup).with_context(|| format!("failed to parse {which}"))
}

fn print_patches(patches: &PatchList<'_>) {
    println!("=== Patches ({}) ===", patches.summary());
    for (i, patch) in patches.iter().enumerate() {
        println!("  {i:3}: {}", colored(patch));
    }
}

fn colored(patch: &Patch<'_>) -> String {
    let line = patch.to_string();
    match patch.kind() {
        PatchKind::SetAttribute | PatchKind::RemoveAttribute => line.yellow().to_string(),
        PatchKind::RemoveNode => line.red().to_string(),
        PatchKind::ReplaceNode => line.cyan().to_string(),
        PatchKind::AppendChild => line.green().to_string(),
    }
}

/// Mirror OLD into a live tree, apply, and check the result against NEW.
fn apply_to_mirror(old: &Tree, new: &Tree, patches: PatchList<'_>) -> Result<()> {
    let mut live = DomTree::new();
    mirror(old, &mut live, NodeId::ROOT)?;
    let report = apply_all(patches, &mut live, NodeId::ROOT).context("failed to apply patches")?;

    println!("\n=== Live Tree ({} patches applied) ===", report.applied);
    print_tree(&live, NodeId::ROOT, 0);

    let mut expected = DomTree::new();
    mirror(new, &mut expected, NodeId::ROOT)?;
    let (actual, expected) = (live.inner_html(NodeId::ROOT), expected.inner_html(NodeId::ROOT));
    if actual != expected {
        bail!("live tree does not match NEW:\n  live: {actual}\n  new:  {expected}");
    }
    println!("\n{}", "live tree matches NEW".green());
    Ok(())
}
