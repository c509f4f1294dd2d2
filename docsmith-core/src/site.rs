use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PackageMeta;
use crate::markdown;
use crate::slug;

/// Reserved base name marking a directory's landing page.
const INDEX_TOKEN: &str = "index";
const HTML_EXT: &str = ".html";

#[derive(Debug)]
pub enum BuildError {
    Io(std::io::Error),
    InvalidPath(PathBuf),
    UnresolvableLink(PathBuf),
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Io(e) => write!(f, "IO error: {}", e),
            BuildError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
            BuildError::UnresolvableLink(p) => write!(
                f,
                "Cannot resolve navigation link for {}: directory has no pages and no sub-categories",
                p.display()
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// Index of a category node inside its [`SiteTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryId(usize);

/// Index of a page node inside its [`SiteTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageId(usize);

/// Everything a build shares across the whole tree, threaded explicitly
/// through construction instead of living as hidden globals.
pub struct BuildContext {
    pub pkg: PackageMeta,
    pub source_root: PathBuf,
    pub target_root: PathBuf,
}

impl BuildContext {
    pub fn new(pkg: PackageMeta, source_root: PathBuf, target_root: PathBuf) -> Self {
        Self {
            pkg,
            source_root,
            target_root,
        }
    }
}

/// Interior tree node, built from one source directory.
#[derive(Debug)]
pub struct CategoryNode {
    pub parent: Option<CategoryId>,
    pub depth: usize,
    /// Directory base name. The root category has none.
    pub title: Option<String>,
    /// Breadcrumb trail of ancestor categories, root first. Empty on the root.
    pub path: Vec<CategoryId>,
    pub source: PathBuf,
    pub target: PathBuf,
    /// Effective navigation link: the index page's link if the category has
    /// one, else the first page's, else the first sub-category's.
    pub link: String,
    pub categories: Vec<CategoryId>,
    pub pages: Vec<PageId>,
}

/// Leaf tree node, built from one source file.
#[derive(Debug)]
pub struct PageNode {
    pub parent: CategoryId,
    pub depth: usize,
    /// Raw file stem for display. Index pages inherit their category's title.
    pub title: Option<String>,
    pub path: Vec<CategoryId>,
    pub source: PathBuf,
    pub target: PathBuf,
    /// True when the slug base name is the reserved index token.
    pub index: bool,
    /// Index pages link to their containing directory, other pages to their
    /// own slug.
    pub link: String,
    /// Rendered HTML, produced at build time.
    pub content: String,
}

/// The site model: an id-addressed arena of categories and pages mirroring
/// the source directory tree. Built once per run, read-only afterwards.
#[derive(Debug)]
pub struct SiteTree {
    categories: Vec<CategoryNode>,
    pages: Vec<PageNode>,
    pkg: PackageMeta,
    source_root: PathBuf,
    target_root: PathBuf,
}

impl SiteTree {
    /// Walk the source tree and build the fully linked site model.
    ///
    /// Fails fast: any unreadable entry or a category with nothing to link to
    /// aborts the build.
    pub fn build(ctx: BuildContext) -> Result<Self, BuildError> {
        let mut tree = SiteTree {
            categories: Vec::new(),
            pages: Vec::new(),
            pkg: ctx.pkg,
            source_root: ctx.source_root,
            target_root: ctx.target_root,
        };

        // Explicit worklist keeps stack usage flat no matter how deep the
        // source tree nests. FIFO order preserves sibling enumeration order
        // and guarantees children land in the arena after their parent.
        let mut worklist: VecDeque<(PathBuf, Option<CategoryId>)> = VecDeque::new();
        worklist.push_back((tree.source_root.clone(), None));

        while let Some((dir, parent)) = worklist.pop_front() {
            let id = tree.add_category(&dir, parent)?;

            let mut subdirs = Vec::new();
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let meta = fs::metadata(&path)?;

                if meta.is_dir() {
                    subdirs.push(path);
                } else if meta.is_file() {
                    // Every file gets a page node, markdown or not.
                    tree.add_page(&path, id)?;
                }
            }

            for subdir in subdirs {
                worklist.push_back((subdir, Some(id)));
            }
        }

        tree.resolve_links()?;

        Ok(tree)
    }

    /// The shared toplevel category every node can reach.
    pub fn root(&self) -> CategoryId {
        CategoryId(0)
    }

    pub fn category(&self, id: CategoryId) -> &CategoryNode {
        &self.categories[id.0]
    }

    pub fn page(&self, id: PageId) -> &PageNode {
        &self.pages[id.0]
    }

    pub fn pkg(&self) -> &PackageMeta {
        &self.pkg
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn add_category(
        &mut self,
        dir: &Path,
        parent: Option<CategoryId>,
    ) -> Result<CategoryId, BuildError> {
        let rel = dir
            .strip_prefix(&self.source_root)
            .map_err(|_| BuildError::InvalidPath(dir.to_path_buf()))?;
        let slug = slug::resolve(rel);
        let target = if slug.is_empty() {
            self.target_root.clone()
        } else {
            self.target_root.join(&slug)
        };

        let (depth, title, path) = match parent {
            Some(pid) => {
                let p = &self.categories[pid.0];
                let mut path = p.path.clone();
                path.push(pid);
                let title = dir.file_name().map(|n| n.to_string_lossy().to_string());
                (p.depth + 1, title, path)
            }
            None => (0, None, Vec::new()),
        };

        let id = CategoryId(self.categories.len());
        self.categories.push(CategoryNode {
            parent,
            depth,
            title,
            path,
            source: dir.to_path_buf(),
            target,
            link: String::new(),
            categories: Vec::new(),
            pages: Vec::new(),
        });

        if let Some(pid) = parent {
            self.categories[pid.0].categories.push(id);
        }

        Ok(id)
    }

    fn add_page(&mut self, file: &Path, parent: CategoryId) -> Result<PageId, BuildError> {
        let rel = file
            .strip_prefix(&self.source_root)
            .map_err(|_| BuildError::InvalidPath(file.to_path_buf()))?;
        let slug = slug::resolve(rel);

        let file_slug = slug.rsplit('/').next().unwrap_or(&slug);
        let base = file_slug.strip_suffix(HTML_EXT).unwrap_or(file_slug);
        let index = base == INDEX_TOKEN;

        // An index page is addressed through its containing directory.
        let link = if index {
            match slug.rsplit_once('/') {
                Some((dir_slug, _)) => format!("{}/", dir_slug),
                None => String::new(),
            }
        } else {
            slug.clone()
        };

        let (depth, title, path) = {
            let p = &self.categories[parent.0];
            let mut path = p.path.clone();
            path.push(parent);
            let title = if index {
                p.title.clone()
            } else {
                file.file_stem().map(|n| n.to_string_lossy().to_string())
            };
            (p.depth + 1, title, path)
        };

        let raw = fs::read_to_string(file)?;
        let content = markdown::render_markdown(&raw);

        let id = PageId(self.pages.len());
        self.pages.push(PageNode {
            parent,
            depth,
            title,
            path,
            source: file.to_path_buf(),
            target: self.target_root.join(&slug),
            index,
            link,
            content,
        });

        self.categories[parent.0].pages.push(id);

        Ok(id)
    }

    /// Fill in every category's effective link, bottom-up.
    ///
    /// Children always sit after their parent in the arena, so walking the
    /// categories backwards resolves each child's link before its parent can
    /// ask for it.
    fn resolve_links(&mut self) -> Result<(), BuildError> {
        for idx in (0..self.categories.len()).rev() {
            let link = {
                let cat = &self.categories[idx];
                let index_page = cat.pages.iter().find(|&&pid| self.pages[pid.0].index);

                if let Some(&pid) = index_page.or_else(|| cat.pages.first()) {
                    Some(self.pages[pid.0].link.clone())
                } else {
                    cat.categories
                        .first()
                        .map(|&cid| self.categories[cid.0].link.clone())
                }
            };

            match link {
                Some(link) => self.categories[idx].link = link,
                None => {
                    return Err(BuildError::UnresolvableLink(
                        self.categories[idx].source.clone(),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pkg() -> PackageMeta {
        PackageMeta {
            name: "widget".into(),
            version: Some("0.1.0".into()),
            description: None,
            homepage: None,
            repository: None,
        }
    }

    fn ctx(src: &Path, out: &Path) -> BuildContext {
        BuildContext::new(pkg(), src.to_path_buf(), out.to_path_buf())
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn find_page<'t>(tree: &'t SiteTree, cat: &CategoryNode, index: bool) -> &'t PageNode {
        cat.pages
            .iter()
            .map(|&pid| tree.page(pid))
            .find(|p| p.index == index)
            .expect("page not found")
    }

    #[test]
    fn test_example_tree_links() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("index.md"), "# Home");
        write(&src.path().join("guide/index.md"), "# Guide");
        write(&src.path().join("guide/setup.md"), "# Setup");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();
        assert_eq!(tree.category_count(), 2);
        assert_eq!(tree.page_count(), 3);

        let root = tree.category(tree.root());
        assert!(root.title.is_none());
        assert_eq!(root.depth, 0);
        assert_eq!(root.link, "");

        let home = find_page(&tree, root, true);
        assert_eq!(home.link, "");
        assert_eq!(home.target, out.path().join("index.html"));

        let guide = tree.category(root.categories[0]);
        assert_eq!(guide.title.as_deref(), Some("guide"));
        assert_eq!(guide.depth, 1);
        assert_eq!(guide.link, "guide/");

        let guide_index = find_page(&tree, guide, true);
        assert_eq!(guide_index.link, "guide/");
        assert_eq!(guide_index.target, out.path().join("guide/index.html"));
        // Index pages inherit their category's title
        assert_eq!(guide_index.title.as_deref(), Some("guide"));

        let setup = find_page(&tree, guide, false);
        assert_eq!(setup.link, "guide/setup.html");
        assert_eq!(setup.title.as_deref(), Some("setup"));
        assert_eq!(setup.target, out.path().join("guide/setup.html"));
    }

    #[test]
    fn test_category_without_index_links_to_first_page() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("index.md"), "# Home");
        write(&src.path().join("My Category/Notes.md"), "# Notes");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();
        let root = tree.category(tree.root());

        let cat = tree.category(root.categories[0]);
        assert_eq!(cat.title.as_deref(), Some("My Category"));
        assert_eq!(cat.link, "my-category/notes.html");

        let notes = tree.page(cat.pages[0]);
        assert!(!notes.index);
        assert_eq!(notes.link, "my-category/notes.html");
        // Titles stay human-readable, not slugged
        assert_eq!(notes.title.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_category_link_falls_through_to_sub_category() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("index.md"), "# Home");
        write(&src.path().join("outer/inner/page.md"), "# Page");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();
        let root = tree.category(tree.root());

        let outer = tree.category(root.categories[0]);
        assert!(outer.pages.is_empty());
        assert_eq!(outer.link, "outer/inner/page.html");
    }

    #[test]
    fn test_empty_directory_fails_the_build() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("index.md"), "# Home");
        fs::create_dir(src.path().join("empty")).unwrap();

        let err = SiteTree::build(ctx(src.path(), out.path())).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvableLink(_)));
    }

    #[test]
    fn test_index_detection_is_case_insensitive() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("Index.MD"), "# Home");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();
        let page = tree.page(tree.category(tree.root()).pages[0]);
        assert!(page.index);
        assert_eq!(page.link, "");
    }

    #[test]
    fn test_non_markdown_file_still_becomes_a_page() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("notes.txt"), "just text");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();
        let page = tree.page(tree.category(tree.root()).pages[0]);
        assert!(!page.index);
        assert_eq!(page.link, "notes.txt");
        assert_eq!(page.target, out.path().join("notes.txt"));
        assert!(page.content.contains("just text"));
    }

    #[test]
    fn test_depth_and_breadcrumb_invariants() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("index.md"), "# Home");
        write(&src.path().join("a/index.md"), "# A");
        write(&src.path().join("a/b/index.md"), "# B");
        write(&src.path().join("a/b/c/deep.md"), "# Deep");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();

        for cat in &tree.categories {
            match cat.parent {
                Some(pid) => {
                    assert_eq!(cat.depth, tree.category(pid).depth + 1);
                    let mut expected = tree.category(pid).path.clone();
                    expected.push(pid);
                    assert_eq!(cat.path, expected);
                }
                None => {
                    assert_eq!(cat.depth, 0);
                    assert!(cat.path.is_empty());
                }
            }
        }

        for page in &tree.pages {
            assert_eq!(page.depth, tree.category(page.parent).depth + 1);
            let mut expected = tree.category(page.parent).path.clone();
            expected.push(page.parent);
            assert_eq!(page.path, expected);
        }
    }

    #[test]
    fn test_page_content_is_rendered_markdown() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&src.path().join("index.md"), "# Home\n\nSome *body*.");

        let tree = SiteTree::build(ctx(src.path(), out.path())).unwrap();
        let page = tree.page(tree.category(tree.root()).pages[0]);
        assert!(page.content.contains("<h1>Home</h1>"));
        assert!(page.content.contains("<em>body</em>"));
    }

    #[test]
    fn test_missing_source_root_is_fatal() {
        let out = TempDir::new().unwrap();
        let err = SiteTree::build(ctx(Path::new("/nonexistent/md"), out.path())).unwrap_err();
        assert!(matches!(err, BuildError::Io(_)));
    }
}
