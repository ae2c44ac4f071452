//! Recursive discovery of the tables, views, and UDFs a root view depends on.

/// Ordered adjacency of views to their direct references.
pub mod graph;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogAdapter, Resolution};
use crate::classifier::function_registry::FunctionClass;
use crate::error::{CrawlError, Result};
use crate::parser::names::{qualify, ObjectRef};
use crate::parser::references::{Extraction, ReferenceExtractor};

pub use graph::DependencyGraph;

/// Captured definition of one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDefinition {
    /// The view.
    pub object: ObjectRef,
    /// Cleaned definition text.
    pub text: String,
}

/// Everything discovered from one root object.
///
/// Object lists are in first-discovery order (depth-first, extraction order),
/// so output built from them is reproducible for identical catalog contents.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// Root object of the crawl.
    pub root: ObjectRef,
    /// Every resolved object, in the order it was first discovered.
    pub visit_order: Vec<ObjectRef>,
    /// Objects resolved as tables.
    pub tables: Vec<ObjectRef>,
    /// Objects resolved as views.
    pub views: Vec<ObjectRef>,
    /// User-defined functions called by any crawled view, by name.
    pub functions: BTreeMap<String, FunctionClass>,
    /// View definitions, in discovery order.
    #[serde(skip)]
    pub view_definitions: Vec<ViewDefinition>,
    /// Views whose definition could not be parsed and so contributed no references.
    pub unparsed_views: Vec<ObjectRef>,
    /// Direct references of every expanded view.
    pub graph: DependencyGraph,
}

impl CrawlResult {
    /// Definition text captured for `view`.
    pub fn definition(&self, view: &ObjectRef) -> Option<&str> {
        self.view_definitions
            .iter()
            .find(|definition| &definition.object == view)
            .map(|definition| definition.text.as_str())
    }
}

/// Mutable state of a single crawl. Created fresh for every root.
#[derive(Debug)]
struct CrawlContext {
    default_schema: String,
    visited: HashSet<ObjectRef>,
    result: CrawlResult,
}

impl CrawlContext {
    /// Fresh context for `root`; unqualified references are attributed to the root's owner.
    fn new(root: &ObjectRef) -> Self {
        Self {
            default_schema: root.owner().to_string(),
            visited: HashSet::new(),
            result: CrawlResult {
                root: root.clone(),
                visit_order: Vec::new(),
                tables: Vec::new(),
                views: Vec::new(),
                functions: BTreeMap::new(),
                view_definitions: Vec::new(),
                unparsed_views: Vec::new(),
                graph: DependencyGraph::new(),
            },
        }
    }

    /// Schema used to qualify unqualified references.
    fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Record `object` as visited. Returns `false` if it already was.
    fn mark_visited(&mut self, object: &ObjectRef) -> bool {
        if !self.visited.insert(object.clone()) {
            return false;
        }
        self.result.visit_order.push(object.clone());
        true
    }

    /// Finish the crawl.
    fn into_result(self) -> CrawlResult {
        self.result
    }
}

/// A view whose children are being walked.
struct Frame {
    view: ObjectRef,
    children: Vec<ObjectRef>,
    next: usize,
}

impl Frame {
    fn next_child(&mut self) -> Option<ObjectRef> {
        let child = self.children.get(self.next).cloned()?;
        self.next += 1;
        Some(child)
    }
}

/// Walks catalog objects depth-first from a root view.
///
/// Each object is looked up in the catalog at most once per crawl. The walk
/// uses an explicit stack, so deep view hierarchies do not grow the call stack.
pub struct Crawler<C> {
    catalog: C,
    extractor: ReferenceExtractor,
}

impl<C: CatalogAdapter> Crawler<C> {
    /// Create a crawler over `catalog`.
    pub fn new(catalog: C, extractor: ReferenceExtractor) -> Self {
        Self { catalog, extractor }
    }

    /// Crawl the dependency closure of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::ObjectNotFound`] as soon as any reachable object
    /// is missing from the catalog, discarding everything found so far, and
    /// propagates catalog failures unchanged.
    pub fn crawl(&self, root: &ObjectRef) -> Result<CrawlResult> {
        info!("Crawling dependencies of {root}");
        let mut ctx = CrawlContext::new(root);
        let mut stack: Vec<Frame> = Vec::new();

        if let Some(frame) = self.visit(&mut ctx, root)? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.next_child() else {
                stack.pop();
                continue;
            };
            let parent = frame.view.clone();
            ctx.result.graph.push_edge(&parent, child.clone());

            if child == parent {
                debug!("{parent} references itself");
                continue;
            }
            if let Some(next) = self.visit(&mut ctx, &child)? {
                stack.push(next);
            }
        }

        let result = ctx.into_result();
        info!(
            "Crawl of {root} complete: {} views, {} tables, {} UDFs",
            result.views.len(),
            result.tables.len(),
            result.functions.len()
        );
        Ok(result)
    }

    /// Resolve one object. Returns a frame when it is a view to expand.
    fn visit(&self, ctx: &mut CrawlContext, object: &ObjectRef) -> Result<Option<Frame>> {
        if !ctx.mark_visited(object) {
            return Ok(None);
        }

        let definition = match self.catalog.resolve(object)? {
            Resolution::NotFound => {
                error!("Object not found: {object}");
                return Err(CrawlError::ObjectNotFound(object.clone()));
            }
            Resolution::Table => {
                debug!("{object}: table");
                ctx.result.tables.push(object.clone());
                return Ok(None);
            }
            Resolution::View { definition } => definition,
        };

        debug!("{object}: view");
        ctx.result.views.push(object.clone());

        let extraction = self.extractor.extract(&definition);
        if let Extraction::Unparsed { reason } = &extraction {
            warn!("{object}: definition could not be parsed, recording no dependencies: {reason}");
            ctx.result.unparsed_views.push(object.clone());
        }
        let references = extraction.references();
        ctx.result.functions.extend(references.functions);
        ctx.result.view_definitions.push(ViewDefinition {
            object: object.clone(),
            text: definition,
        });

        let children = references
            .tables
            .iter()
            .map(|table| qualify(table, ctx.default_schema()))
            .collect();

        Ok(Some(Frame {
            view: object.clone(),
            children,
            next: 0,
        }))
    }
}
