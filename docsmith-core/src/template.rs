use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::site::{PageId, SiteTree};

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
    IoError(std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "Template error: {}", e),
            TemplateError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
struct Crumb {
    title: Option<String>,
    link: String,
}

#[derive(Debug, Serialize)]
struct Toplevel {
    link: String,
    pages: Vec<NavItem>,
    categories: Vec<NavItem>,
}

/// Renders page nodes through the theme's page template.
///
/// Construction loads `templates/page.html` as `page` and registers every
/// file under `templates/partials/` as a template named after its file stem,
/// so the theme can `{% include "nav" %}` by base name.
#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new(theme_dir: &Path) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        tera.add_template_file(theme_dir.join("templates/page.html"), Some("page"))?;

        let partial_dir = theme_dir.join("templates/partials");
        for entry in std::fs::read_dir(&partial_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let name = stem.to_string_lossy().to_string();
            tera.add_template_file(&path, Some(&name))?;
        }

        register_helpers(&mut tera);

        Ok(Self { tera })
    }

    /// Render one page node with its full data context.
    pub fn render_page(&self, tree: &SiteTree, id: PageId) -> Result<String, TemplateError> {
        Ok(self.tera.render("page", &page_context(tree, id))?)
    }
}

/// Static helper registry. The theme gains a helper by adding a registration
/// here, not by dropping a file into a directory.
fn register_helpers(tera: &mut Tera) {
    tera.register_function("asset_prefix", asset_prefix);
}

/// `asset_prefix(depth=N)` returns the `../` prefix that climbs from a node
/// at depth N back to the output root.
fn asset_prefix(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let depth = args.get("depth").and_then(Value::as_u64).unwrap_or(0) as usize;

    Ok(Value::String("../".repeat(depth.saturating_sub(1))))
}

fn page_context(tree: &SiteTree, id: PageId) -> Context {
    let page = tree.page(id);
    let pkg = tree.pkg();

    let mut context = Context::new();
    context.insert("title", &page.title);
    context.insert("content", &page.content);
    context.insert("link", &page.link);
    context.insert("depth", &page.depth);
    context.insert("index", &page.index);

    let path: Vec<Crumb> = page
        .path
        .iter()
        .map(|&cid| {
            let cat = tree.category(cid);
            Crumb {
                title: cat.title.clone(),
                link: cat.link.clone(),
            }
        })
        .collect();
    context.insert("path", &path);
    context.insert("pkg", pkg);

    let root = tree.category(tree.root());
    let toplevel = Toplevel {
        link: root.link.clone(),
        pages: root
            .pages
            .iter()
            .map(|&pid| {
                let p = tree.page(pid);
                NavItem {
                    text: p.title.clone().unwrap_or_else(|| pkg.name.clone()),
                    link: p.link.clone(),
                }
            })
            .collect(),
        categories: root
            .categories
            .iter()
            .map(|&cid| {
                let c = tree.category(cid);
                NavItem {
                    text: c.title.clone().unwrap_or_else(|| pkg.name.clone()),
                    link: c.link.clone(),
                }
            })
            .collect(),
    };
    context.insert("toplevel", &toplevel);

    context
}
