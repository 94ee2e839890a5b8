//! Layering lint for the carmarket backend.
//!
//! The backend keeps its catalogue and account rules in `domain`, behind
//! port traits. HTTP and tRPC adapters live in `inbound`, Diesel and the
//! credential primitives live in `outbound`, and the Actix middleware lives
//! in `middleware`. Only `server` wires the layers together, so it is not
//! linted.
//!
//! Each layer carries a [`LayerRule`] naming the sibling modules and the
//! external crates it may not reference. Every `use` tree and every path
//! expression in a file is checked against the rule of the layer the file
//! lives in.
//!
//! Run it with `cargo run -p architecture-lint` from the workspace root.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Name the backend crate is imported under from integration code.
const CRATE_NAME: &str = "carmarket";

/// Top-level modules of the backend crate that form layers or wiring.
const TOP_LEVEL_MODULES: [&str; 5] = ["domain", "inbound", "middleware", "outbound", "server"];

const PERSISTENCE_CRATES: [&str; 3] = ["diesel", "diesel_async", "diesel_migrations"];

/// What a layer may not reference.
#[derive(Debug, Clone, Copy)]
pub struct LayerRule {
    /// Sibling top-level modules the layer must not import.
    pub modules: &'static [&'static str],
    /// External crates the layer must not import.
    pub crates: &'static [&'static str],
}

const DOMAIN_RULE: LayerRule = LayerRule {
    modules: &["inbound", "middleware", "outbound", "server"],
    crates: &[
        "actix_http",
        "actix_web",
        "argon2",
        "diesel",
        "diesel_async",
        "diesel_migrations",
        "jsonwebtoken",
        "utoipa",
    ],
};

const INBOUND_RULE: LayerRule = LayerRule {
    modules: &["outbound", "server"],
    crates: &[
        "argon2",
        "diesel",
        "diesel_async",
        "diesel_migrations",
        "jsonwebtoken",
    ],
};

const MIDDLEWARE_RULE: LayerRule = LayerRule {
    modules: &["inbound", "outbound", "server"],
    crates: &PERSISTENCE_CRATES,
};

const OUTBOUND_RULE: LayerRule = LayerRule {
    modules: &["inbound", "middleware", "server"],
    crates: &["actix_http", "actix_web"],
};

/// A linted layer of the backend crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Domain,
    Inbound,
    Middleware,
    Outbound,
}

impl Layer {
    /// Every linted layer, in the order sources are collected.
    pub const ALL: [Self; 4] = [Self::Domain, Self::Inbound, Self::Middleware, Self::Outbound];

    /// Classify a path relative to `backend/src` by its first component.
    pub fn of_file(relative: &Path) -> Option<Self> {
        let first = relative.components().next()?.as_os_str().to_str()?;
        Self::ALL.into_iter().find(|layer| layer.dir() == first)
    }

    /// Directory under `backend/src` holding the layer.
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Middleware => "middleware",
            Self::Outbound => "outbound",
        }
    }

    /// Restrictions applied to files of this layer.
    pub const fn rule(self) -> LayerRule {
        match self {
            Self::Domain => DOMAIN_RULE,
            Self::Inbound => INBOUND_RULE,
            Self::Middleware => MIDDLEWARE_RULE,
            Self::Outbound => OUTBOUND_RULE,
        }
    }
}

/// A Rust source file handed to the lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// One broken layering rule in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Why the lint did not pass.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Reading the source tree failed.
    Io { path: PathBuf, source: io::Error },
    /// A file sits outside every linted layer.
    UnknownLayer { file: PathBuf },
    /// A file is not valid Rust.
    Parse { file: PathBuf, message: String },
    /// The sources parsed but break layering rules.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::UnknownLayer { file } => {
                write!(f, "{} is not inside a linted layer", file.display())
            }
            Self::Parse { file, message } => {
                write!(f, "cannot parse {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} layering violation(s):", violations.len())?;
                violations
                    .iter()
                    .try_for_each(|violation| writeln!(f, "  {violation}"))
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Lint every layer under `backend_dir/src`.
///
/// # Errors
///
/// Returns [`ArchitectureLintError`] when the tree cannot be read or parsed,
/// or when any file breaks its layer's rule.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = backend_dir.join("src");
    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let dir = src_dir.join(layer.dir());
        if dir.is_dir() {
            read_rust_files(&src_dir, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources.
///
/// # Errors
///
/// Fails on the first unparsable or unclassifiable file; otherwise collects
/// every violation before failing.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let layer =
            Layer::of_file(&source.file).ok_or_else(|| ArchitectureLintError::UnknownLayer {
                file: source.file.clone(),
            })?;
        let syntax =
            syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: err.to_string(),
            })?;
        violations.extend(
            check_file(layer, &syntax)
                .into_iter()
                .map(|message| Violation {
                    file: source.file.clone(),
                    message,
                }),
        );
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

/// Sorted, de-duplicated messages for one parsed file.
fn check_file(layer: Layer, syntax: &syn::File) -> BTreeSet<String> {
    let rule = layer.rule();
    let mut imports = ImportCollector::default();
    imports.visit_file(syntax);

    imports
        .paths
        .iter()
        .filter_map(|segments| match Reference::of(segments)? {
            Reference::Module(module) if rule.modules.contains(&module) => Some(format!(
                "{} module must not depend on crate::{module}",
                layer.dir()
            )),
            Reference::Crate(name) if rule.crates.contains(&name) => Some(format!(
                "{} module must not depend on external crate `{name}`",
                layer.dir()
            )),
            _ => None,
        })
        .collect()
}

/// Where a path points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference<'a> {
    /// A top-level module of the backend crate.
    Module(&'a str),
    /// The root of an external crate, or a local item that looks like one.
    Crate(&'a str),
}

impl<'a> Reference<'a> {
    fn of(segments: &'a [String]) -> Option<Self> {
        let mut rest = segments.iter().map(String::as_str);
        let first = rest.next()?;
        match first {
            "crate" | "self" | "super" | CRATE_NAME => rest
                .find(|segment| !matches!(*segment, "self" | "super"))
                .filter(|segment| TOP_LEVEL_MODULES.contains(segment))
                .map(Self::Module),
            _ if TOP_LEVEL_MODULES.contains(&first) => Some(Self::Module(first)),
            _ => Some(Self::Crate(first)),
        }
    }
}

/// Gathers the segments of every `use` tree leaf and path expression.
#[derive(Default)]
struct ImportCollector {
    paths: BTreeSet<Vec<String>>,
}

impl ImportCollector {
    fn push_use_tree(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.push_use_tree(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                let mut leaf = prefix.clone();
                leaf.push(ident.to_string());
                self.paths.insert(leaf);
            }
            syn::UseTree::Glob(_) => {
                if !prefix.is_empty() {
                    self.paths.insert(prefix.clone());
                }
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.push_use_tree(item, prefix);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for ImportCollector {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.push_use_tree(&node.tree, &mut Vec::new());
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        if node.segments.len() > 1 || node.leading_colon.is_some() {
            self.paths.insert(
                node.segments
                    .iter()
                    .map(|segment| segment.ident.to_string())
                    .collect(),
            );
        }
        syn::visit::visit_path(self, node);
    }
}

fn read_rust_files(
    src_dir: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ArchitectureLintError::Io { path, source }
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(dir))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            read_rust_files(src_dir, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let contents = fs::read_to_string(&path).map_err(io_error(&path))?;
            let file = path
                .strip_prefix(src_dir)
                .map_or_else(|_| path.clone(), Path::to_path_buf);
            sources.push(LintSource { file, contents });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
