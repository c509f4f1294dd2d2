pub mod assets;
pub mod config;
pub mod markdown;
pub mod renderer;
pub mod site;
pub mod slug;
pub mod template;

// Re-export main types
pub use config::PackageMeta;
pub use markdown::render_markdown;
pub use renderer::{RenderError, render_tree};
pub use site::{BuildContext, BuildError, CategoryId, CategoryNode, PageId, PageNode, SiteTree};
pub use template::{TemplateError, TemplateRenderer};
