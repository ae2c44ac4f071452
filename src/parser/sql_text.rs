use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};

/// Remove comments and normalize whitespace in a view definition.
///
/// Comments are dropped token-wise so that `--` or `/*` inside string
/// literals and quoted identifiers survive. If the text cannot be tokenized
/// (for example an unterminated literal), comments are left in place and
/// only whitespace is normalized.
pub fn clean_definition(sql: &str) -> String {
    let sql = sql.replace("\r\n", "\n");
    let stripped = match Tokenizer::new(&GenericDialect {}, &sql)
        .with_unescape(false)
        .tokenize()
    {
        Ok(tokens) => tokens
            .into_iter()
            .filter_map(|token| match token {
                Token::Whitespace(Whitespace::SingleLineComment { .. }) => {
                    Some(Token::Whitespace(Whitespace::Newline))
                }
                Token::Whitespace(Whitespace::MultiLineComment(_)) => {
                    Some(Token::Whitespace(Whitespace::Space))
                }
                Token::EOF => None,
                other => Some(other),
            })
            .map(|token| token.to_string())
            .collect::<String>(),
        Err(e) => {
            tracing::debug!("definition could not be tokenized, keeping comments: {e}");
            sql
        }
    };
    normalize_whitespace(&stripped)
}

/// Trim trailing whitespace on every line, collapse runs of blank lines,
/// and drop leading and trailing blank lines.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut previous_blank = true;
    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(line);
        previous_blank = blank;
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Join definition fragments the way multi-row catalog text is stored,
/// then clean the result.
pub fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    clean_definition(&joined)
}
