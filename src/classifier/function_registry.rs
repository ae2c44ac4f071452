use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::names::{is_valid_identifier, split_name_parts, unquote_identifier};

/// Classification of a called function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionClass {
    /// Provided by the database platform.
    Builtin,
    /// User-defined; recorded but never crawled into.
    Udf,
}

impl fmt::Display for FunctionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionClass::Builtin => write!(f, "BUILTIN"),
            FunctionClass::Udf => write!(f, "UDF"),
        }
    }
}

/// Oracle built-in SQL functions and pseudo-functions.
const ORACLE_BUILTINS: &[&str] = &[
    // numeric
    "ABS", "ACOS", "ASIN", "ATAN", "ATAN2", "BITAND", "CEIL", "COS", "COSH", "EXP", "FLOOR",
    "LN", "LOG", "MOD", "NANVL", "POWER", "REMAINDER", "ROUND", "SIGN", "SIN", "SINH", "SQRT",
    "TAN", "TANH", "TRUNC", "WIDTH_BUCKET",
    // character
    "ASCII", "CHR", "CONCAT", "INITCAP", "INSTR", "INSTRB", "LENGTH", "LENGTHB", "LOWER",
    "LPAD", "LTRIM", "NLS_INITCAP", "NLS_LOWER", "NLS_UPPER", "NLSSORT", "REGEXP_COUNT",
    "REGEXP_INSTR", "REGEXP_LIKE", "REGEXP_REPLACE", "REGEXP_SUBSTR", "REPLACE", "RPAD",
    "RTRIM", "SOUNDEX", "SUBSTR", "SUBSTRB", "TRANSLATE", "TRIM", "UPPER",
    // date and time
    "ADD_MONTHS", "CURRENT_DATE", "CURRENT_TIMESTAMP", "DBTIMEZONE", "EXTRACT", "FROM_TZ",
    "LAST_DAY", "LOCALTIMESTAMP", "MONTHS_BETWEEN", "NEW_TIME", "NEXT_DAY", "NUMTODSINTERVAL",
    "NUMTOYMINTERVAL", "SESSIONTIMEZONE", "SYS_EXTRACT_UTC", "SYSDATE", "SYSTIMESTAMP",
    "TO_DSINTERVAL", "TO_TIMESTAMP", "TO_TIMESTAMP_TZ", "TO_YMINTERVAL", "TZ_OFFSET",
    // conversion
    "ASCIISTR", "BIN_TO_NUM", "CAST", "CHARTOROWID", "COMPOSE", "CONVERT", "DECOMPOSE",
    "HEXTORAW", "RAWTOHEX", "ROWIDTOCHAR", "TO_BINARY_DOUBLE", "TO_BINARY_FLOAT", "TO_BLOB",
    "TO_CHAR", "TO_CLOB", "TO_DATE", "TO_LOB", "TO_MULTI_BYTE", "TO_NCHAR", "TO_NCLOB",
    "TO_NUMBER", "TO_SINGLE_BYTE", "UNISTR", "VALIDATE_CONVERSION",
    // null handling and comparison
    "COALESCE", "DECODE", "GREATEST", "LEAST", "LNNVL", "NULLIF", "NVL", "NVL2",
    // aggregate
    "APPROX_COUNT_DISTINCT", "AVG", "COLLECT", "CORR", "COUNT", "COVAR_POP", "COVAR_SAMP",
    "CUME_DIST", "DENSE_RANK", "FIRST", "GROUP_ID", "GROUPING", "GROUPING_ID", "LAST",
    "LISTAGG", "MAX", "MEDIAN", "MIN", "PERCENT_RANK", "PERCENTILE_CONT", "PERCENTILE_DISC",
    "RANK", "REGR_AVGX", "REGR_AVGY", "REGR_COUNT", "REGR_INTERCEPT", "REGR_R2", "REGR_SLOPE",
    "REGR_SXX", "REGR_SXY", "REGR_SYY", "STATS_MODE", "STDDEV", "STDDEV_POP", "STDDEV_SAMP",
    "SUM", "VAR_POP", "VAR_SAMP", "VARIANCE", "XMLAGG",
    // analytic
    "FIRST_VALUE", "LAG", "LAST_VALUE", "LEAD", "NTH_VALUE", "NTILE", "RATIO_TO_REPORT",
    "ROW_NUMBER",
    // environment and identifiers
    "NLS_CHARSET_ID", "NLS_CHARSET_NAME", "ORA_HASH", "STANDARD_HASH", "SYS_CONTEXT",
    "SYS_GUID", "SYS_CONNECT_BY_PATH", "UID", "USER", "USERENV", "VSIZE", "DUMP", "EMPTY_BLOB",
    "EMPTY_CLOB", "BFILENAME",
    // JSON and XML
    "JSON_ARRAY", "JSON_ARRAYAGG", "JSON_OBJECT", "JSON_OBJECTAGG", "JSON_QUERY", "JSON_TABLE",
    "JSON_VALUE", "XMLCAST", "XMLCONCAT", "XMLELEMENT", "XMLFOREST", "XMLQUERY", "XMLSERIALIZE",
    "XMLTABLE", "XMLTYPE", "EXTRACTVALUE",
    // collections
    "CARDINALITY", "SET", "TABLE",
];

/// SQL keywords that a parser may surface in call position.
const SQL_KEYWORDS: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "BETWEEN", "BY", "CASE", "CONNECT", "DISTINCT", "ELSE", "END",
    "EXISTS", "FROM", "GROUP", "HAVING", "IN", "INTERSECT", "IS", "JOIN", "LIKE", "MINUS",
    "NOT", "NULL", "ON", "OR", "ORDER", "PRIOR", "SELECT", "SOME", "START", "THEN", "UNION",
    "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Markers a parser uses for anonymous or administrative blocks.
const RESERVED_MARKERS: &[&str] = &["ANONYMOUS", "BLOCK"];

/// Registry of platform-provided function names.
#[derive(Debug, Clone)]
pub struct BuiltinRegistry {
    /// Upper-cased built-in names.
    pub builtins: HashSet<String>,
}

impl BuiltinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            builtins: HashSet::new(),
        }
    }

    /// Registry pre-populated with Oracle built-ins.
    pub fn oracle() -> Self {
        Self {
            builtins: ORACLE_BUILTINS.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Load additional built-in names from a JSON array of strings.
    pub fn load_from_json(&mut self, json: &str) -> Result<(), String> {
        let parsed: Vec<String> = serde_json::from_str(json)
            .map_err(|e| format!("Invalid built-in registry JSON: {e}"))?;
        for name in parsed {
            self.register(&name);
        }
        Ok(())
    }

    /// Add one built-in name.
    pub fn register(&mut self, name: &str) {
        self.builtins.insert(name.trim().to_uppercase());
    }

    /// Exact, case-insensitive membership check.
    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains(&name.to_uppercase())
    }

    /// Classify a candidate function name.
    ///
    /// Returns `None` for names that are not functions of interest: invalid
    /// identifiers, SQL keywords, and reserved parser markers. A dotted name
    /// (`pkg.fn`) is valid when every part is a valid identifier or a quoted
    /// identifier.
    pub fn classify(&self, name: &str) -> Option<FunctionClass> {
        let upper = name.trim().to_uppercase();
        let valid = split_name_parts(&upper).into_iter().all(|part| {
            let unquoted = unquote_identifier(part);
            (unquoted.len() != part.len() && !unquoted.is_empty()) || is_valid_identifier(part)
        });
        if !valid
            || SQL_KEYWORDS.contains(&upper.as_str())
            || RESERVED_MARKERS.contains(&upper.as_str())
        {
            return None;
        }
        if self.builtins.contains(&upper) {
            Some(FunctionClass::Builtin)
        } else {
            Some(FunctionClass::Udf)
        }
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::oracle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_case_insensitive() {
        let registry = BuiltinRegistry::oracle();
        assert!(registry.contains("upper"));
        assert_eq!(registry.classify("Upper"), Some(FunctionClass::Builtin));
        assert_eq!(registry.classify("NVL"), Some(FunctionClass::Builtin));
    }

    #[test]
    fn unknown_names_are_udfs() {
        let registry = BuiltinRegistry::oracle();
        assert_eq!(registry.classify("calc_tax"), Some(FunctionClass::Udf));
        assert_eq!(registry.classify("billing.calc_tax"), Some(FunctionClass::Udf));
        assert_eq!(registry.classify("\"Billing\".calc_tax"), Some(FunctionClass::Udf));
    }

    #[test]
    fn keywords_markers_and_invalid_names_are_ignored() {
        let registry = BuiltinRegistry::oracle();
        assert_eq!(registry.classify("EXISTS"), None);
        assert_eq!(registry.classify("anonymous"), None);
        assert_eq!(registry.classify("BLOCK"), None);
        assert_eq!(registry.classify("9lives"), None);
        assert_eq!(registry.classify("a-b"), None);
        assert_eq!(registry.classify(""), None);
    }

    #[test]
    fn load_from_json_extends_builtins() {
        let mut registry = BuiltinRegistry::oracle();
        assert_eq!(registry.classify("CALC_TAX"), Some(FunctionClass::Udf));
        registry
            .load_from_json(r#"["calc_tax", " fmt_money "]"#)
            .expect("registry json should parse");
        assert_eq!(registry.classify("CALC_TAX"), Some(FunctionClass::Builtin));
        assert!(registry.contains("FMT_MONEY"));
    }

    #[test]
    fn load_from_json_rejects_non_arrays() {
        let mut registry = BuiltinRegistry::new();
        let err = registry
            .load_from_json(r#"{"calc_tax": true}"#)
            .expect_err("object should be rejected");
        assert!(err.contains("Invalid built-in registry JSON"));
    }

    #[test]
    fn function_class_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&FunctionClass::Udf).unwrap(),
            "\"UDF\""
        );
        assert_eq!(FunctionClass::Builtin.to_string(), "BUILTIN");
    }
}
