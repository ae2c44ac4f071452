use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use sqlparser::ast::{Expr, ObjectName, Query, Visit, Visitor};
use sqlparser::dialect::Dialect;
use tracing::warn;

use crate::classifier::function_registry::{BuiltinRegistry, FunctionClass};
use crate::error::CrawlError;
use crate::parser::names::{normalize_identifier, split_name_parts, strip_alias};
use crate::parser::sql_parser::{parse_definition, resolve_dialect};

/// Objects referenced by one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// Unique table-like references, sorted, as written (possibly unqualified).
    pub tables: Vec<String>,
    /// User-defined functions called by the definition. Built-ins are omitted.
    pub functions: BTreeMap<String, FunctionClass>,
}

/// Outcome of reference extraction.
///
/// `Unparsed` is the best-effort path: the parser rejected the definition, so
/// it contributes no references. Callers that only need the references can use
/// [`Extraction::references`], which yields an empty set in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The definition parsed; these are its references (possibly none).
    Resolved(References),
    /// The definition could not be parsed under the configured dialect.
    Unparsed {
        /// Parser error message.
        reason: String,
    },
}

impl Extraction {
    /// References found, or an empty set when the definition was unparsed.
    pub fn references(&self) -> References {
        match self {
            Extraction::Resolved(references) => references.clone(),
            Extraction::Unparsed { .. } => References::default(),
        }
    }

    /// True when the parser gave up on the definition.
    pub fn is_unparsed(&self) -> bool {
        matches!(self, Extraction::Unparsed { .. })
    }
}

/// Extracts table and function references from view definitions.
#[derive(Debug)]
pub struct ReferenceExtractor {
    dialect: Box<dyn Dialect>,
    registry: BuiltinRegistry,
}

impl ReferenceExtractor {
    /// Build an extractor for the named dialect.
    pub fn new(dialect: &str, registry: BuiltinRegistry) -> Result<Self, CrawlError> {
        Ok(Self {
            dialect: resolve_dialect(dialect)?,
            registry,
        })
    }

    /// Extract references from a cleaned definition.
    ///
    /// Parse errors never escape: they become [`Extraction::Unparsed`].
    pub fn extract(&self, sql: &str) -> Extraction {
        let statements = match parse_definition(self.dialect.as_ref(), sql) {
            Ok(statements) => statements,
            Err(e) => {
                return Extraction::Unparsed {
                    reason: e.to_string(),
                }
            }
        };

        let mut collector = ReferenceCollector::default();
        for statement in &statements {
            let _ = statement.visit(&mut collector);
        }

        let mut tables = BTreeSet::new();
        for relation in &collector.relations {
            let relation = strip_alias(relation);
            if is_pseudo_table(relation) {
                continue;
            }
            if is_remote(relation) {
                warn!("Skipping {relation}: objects behind database links are not crawled");
                continue;
            }
            tables.insert(relation.to_string());
        }

        let mut functions = BTreeMap::new();
        for name in &collector.calls {
            if self.registry.classify(name) == Some(FunctionClass::Udf) {
                functions.insert(normalize_dotted(name), FunctionClass::Udf);
            }
        }

        Extraction::Resolved(References {
            tables: tables.into_iter().collect(),
            functions,
        })
    }
}

/// Unqualified `DUAL` is the one-row pseudo-table, not a schema object.
fn is_pseudo_table(relation: &str) -> bool {
    normalize_identifier(relation) == "DUAL"
}

/// `owner.name@link` lives in another database.
fn is_remote(relation: &str) -> bool {
    let mut in_quotes = false;
    relation.chars().any(|ch| {
        if ch == '"' {
            in_quotes = !in_quotes;
        }
        ch == '@' && !in_quotes
    })
}

/// Upper-case and unquote each part of a dotted name.
fn normalize_dotted(name: &str) -> String {
    split_name_parts(name)
        .into_iter()
        .map(normalize_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// `WITH` names declared by one query.
///
/// Only the first `visible` names shadow catalog objects at the current point
/// of the walk: inside the body of CTE `i`, that is the CTEs declared before
/// it (plus itself for `WITH RECURSIVE`); everywhere else in the query, all.
struct CteScope {
    names: Vec<String>,
    bodies: Vec<*const Query>,
    recursive: bool,
    visible: usize,
}

impl CteScope {
    fn for_query(query: &Query) -> Self {
        let (names, bodies, recursive) = match &query.with {
            Some(with) => (
                with.cte_tables
                    .iter()
                    .map(|cte| normalize_identifier(&cte.alias.name.value))
                    .collect::<Vec<_>>(),
                with.cte_tables
                    .iter()
                    .map(|cte| &*cte.query as *const Query)
                    .collect(),
                with.recursive,
            ),
            None => (Vec::new(), Vec::new(), false),
        };
        let visible = names.len();
        Self {
            names,
            bodies,
            recursive,
            visible,
        }
    }

    fn body_index(&self, query: &Query) -> Option<usize> {
        self.bodies
            .iter()
            .position(|body| std::ptr::eq(*body, query))
    }

    fn shadows(&self, name: &str) -> bool {
        self.names[..self.visible].iter().any(|cte| cte == name)
    }
}

#[derive(Default)]
struct ReferenceCollector {
    relations: Vec<String>,
    calls: Vec<String>,
    scopes: Vec<CteScope>,
}

impl ReferenceCollector {
    /// A single-part relation matching a `WITH` name in scope refers to the CTE, not a catalog object.
    fn is_cte(&self, relation: &str) -> bool {
        let parts = split_name_parts(relation);
        if parts.len() != 1 {
            return false;
        }
        let name = normalize_identifier(strip_alias(parts[0]));
        self.scopes.iter().any(|scope| scope.shadows(&name))
    }
}

impl Visitor for ReferenceCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(parent) = self.scopes.last_mut() {
            if let Some(idx) = parent.body_index(query) {
                parent.visible = if parent.recursive { idx + 1 } else { idx };
            }
        }
        self.scopes.push(CteScope::for_query(query));
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        self.scopes.pop();
        if let Some(parent) = self.scopes.last_mut() {
            if parent.body_index(query).is_some() {
                parent.visible = parent.names.len();
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        let relation = relation.to_string();
        if !self.is_cte(&relation) {
            self.relations.push(relation);
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if let Expr::Function(func) = expr {
            self.calls.push(func.name.to_string());
        }
        ControlFlow::Continue(())
    }
}
