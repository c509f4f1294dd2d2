use std::path::{Path, PathBuf};

use clap::Command;
use docsmith_core::{BuildContext, PackageMeta, SiteTree, TemplateRenderer, assets};

mod config;

fn main() -> anyhow::Result<()> {
    Command::new("docsmith")
        .about("Turn a directory of markdown into a linked documentation site")
        .version(env!("CARGO_PKG_VERSION"))
        .get_matches();

    let settings = config::BuildConfig::load()?;
    let cwd = std::env::current_dir()?;

    let docs_in = cwd.join(&settings.docs_in);
    let docs_out = cwd.join(&settings.docs_out);
    let source_dir = docs_in.join("md");
    let asset_dir = docs_in.join("assets");
    let theme_dir = theme_dir();

    // Project metadata is loaded once and shared down the whole tree
    let pkg = PackageMeta::read(cwd.join("Cargo.toml"))?;

    println!("Building {} docs from {}", pkg.name, source_dir.display());
    let tree = SiteTree::build(BuildContext::new(pkg, source_dir, docs_out.clone()))?;
    println!(
        "Discovered {} pages in {} categories",
        tree.page_count(),
        tree.category_count()
    );

    let renderer = TemplateRenderer::new(&theme_dir)?;
    docsmith_core::render_tree(&tree, &renderer)?;
    println!("Site written to {}", docs_out.display());

    // Asset failures don't fail the build unless strict mode says so
    if let Err(e) = assets::run_asset_pipeline(&theme_dir.join("static"), &asset_dir, &docs_out) {
        if settings.strict_assets {
            return Err(e.into());
        }
        eprintln!("Asset pipeline error: {}", e);
    }

    Ok(())
}

/// The theme ships with the tool and is not user-configurable.
fn theme_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../theme")
}
