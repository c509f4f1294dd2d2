use std::fs;

use crate::site::SiteTree;
use crate::template::{TemplateError, TemplateRenderer};

#[derive(Debug)]
pub enum RenderError {
    TemplateError(TemplateError),
    IoError(std::io::Error),
}

impl From<TemplateError> for RenderError {
    fn from(err: TemplateError) -> Self {
        RenderError::TemplateError(err)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::IoError(err)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::TemplateError(e) => write!(f, "Template error: {}", e),
            RenderError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

/// Write the built tree to disk: per category, create the target directory,
/// render its pages, then descend into its sub-categories.
///
/// Pages come before sub-categories at every level; that ordering is the
/// fixed contract, not a semantic requirement. Existing files are
/// overwritten and nothing is rolled back on partial failure, so reruns are
/// idempotent.
pub fn render_tree(tree: &SiteTree, renderer: &TemplateRenderer) -> Result<(), RenderError> {
    let mut stack = vec![tree.root()];

    while let Some(id) = stack.pop() {
        let category = tree.category(id);

        // Creating an already existing directory is fine, any other failure
        // aborts the walk.
        fs::create_dir_all(&category.target)?;

        for &pid in &category.pages {
            let page = tree.page(pid);
            let html = renderer.render_page(tree, pid)?;
            fs::write(&page.target, html)?;
        }

        // Reverse push so the first sub-category is walked next
        for &cid in category.categories.iter().rev() {
            stack.push(cid);
        }
    }

    Ok(())
}
