use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CrawlError;

/// Separator between owner and object name.
pub const OWNER_SEPARATOR: char = '.';

/// A normalized `owner.name` pair.
///
/// Both parts are unquoted and upper-cased on construction, so equality and
/// hashing compare canonical identities. This is the identity used for cycle
/// detection and for dependency graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    owner: String,
    name: String,
}

impl ObjectRef {
    /// Build a reference from raw owner and name parts.
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: normalize_identifier(owner),
            name: normalize_identifier(name),
        }
    }

    /// Owning schema.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Object name within the owner.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{OWNER_SEPARATOR}{}", self.owner, self.name)
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for ObjectRef {
    type Err = CrawlError;

    /// Parse a fully-qualified `owner.name`. Unqualified names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CrawlError::InvalidObjectName(s.to_string());
        let (owner, name) = split_owner_and_name(s.trim()).ok_or_else(invalid)?;
        if unquote_identifier(owner.trim()).is_empty() || unquote_identifier(name.trim()).is_empty()
        {
            return Err(invalid());
        }
        Ok(ObjectRef::new(owner, name))
    }
}

/// Return the identifier without surrounding double quotes.
pub fn unquote_identifier(ident: &str) -> &str {
    ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(ident)
}

/// Normalize an identifier for identity comparisons.
///
/// Trims whitespace, removes surrounding double quotes, and upper-cases.
pub fn normalize_identifier(ident: &str) -> String {
    unquote_identifier(ident.trim()).to_uppercase()
}

/// Split on the first owner separator that is not inside a quoted identifier.
///
/// `"my.schema".orders` splits into `("\"my.schema\"", "orders")`;
/// `a.b.c` splits into `("a", "b.c")`.
pub fn split_owner_and_name(name: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    for (idx, ch) in name.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            OWNER_SEPARATOR if !in_quotes => {
                return Some((&name[..idx], &name[idx + 1..]));
            }
            _ => {}
        }
    }
    None
}

/// Split a dotted name into all of its parts, honoring quoted identifiers.
pub fn split_name_parts(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = name;
    while let Some((head, tail)) = split_owner_and_name(rest) {
        parts.push(head);
        rest = tail;
    }
    parts.push(rest);
    parts
}

/// Keep only the leading identifier of a table reference, dropping any alias.
///
/// `"orders o"` becomes `"orders"`. Whitespace inside a quoted identifier is
/// part of the name, so `"ORDER ITEMS" oi` keeps `"ORDER ITEMS"`. Never fails:
/// blank input is returned as-is.
pub fn strip_alias(raw: &str) -> &str {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        return raw;
    }
    let mut in_quotes = false;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => return &trimmed[..idx],
            _ => {}
        }
    }
    trimmed
}

/// Attribute a (possibly unqualified) reference to an owner.
///
/// Qualified names keep their own owner; unqualified names are attributed
/// to `default_schema`. The crawler passes the root object's owner here, not
/// the owner of the view the reference was found in, so an unqualified name
/// inside a view from another schema is attributed to the root's schema.
pub fn qualify(name: &str, default_schema: &str) -> ObjectRef {
    let name = name.trim();
    match split_owner_and_name(name) {
        Some((owner, object)) => ObjectRef::new(owner, object),
        None => ObjectRef::new(default_schema, name),
    }
}

/// True for a plain (unquoted) identifier: a letter or `_` followed by
/// letters, digits, `_`, `$`, or `#`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '$' | '#'))
}

/// Make a fully-qualified name safe to use as a file stem.
pub fn sanitize_filename(fq_name: &str) -> String {
    fq_name.replace('.', "__").replace(['$', '/'], "_")
}
