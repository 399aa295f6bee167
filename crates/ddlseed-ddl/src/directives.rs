//! Inline directive comments carried by annotated DDL.
//!
//! Column directives trail the column definition on the same line:
//!
//! ```sql
//! CREATE TABLE people (
//!     id int PRIMARY KEY,
//!     name text, -- type:name
//!     age int -- range:[18 - 90]
//! ); -- count:500
//! ```

use std::sync::LazyLock;

use regex::Regex;

const DIRECTIVE_KINDS: [&str; 3] = ["type:", "oneof:", "range:"];

static ROW_COUNT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)--[ \t]*count:(0|[1-9]\d{0,4})[ \t]*\r?$").ok());

/// Directive text (e.g. `type:email`) attached to `column` in `statement`.
pub fn column_directive<'a>(statement: &'a str, column: &str) -> Option<&'a str> {
    statement.lines().find_map(|line| {
        let (code, comment) = split_comment(line)?;
        let directive = comment.trim_start_matches('-').trim();
        if !DIRECTIVE_KINDS
            .iter()
            .any(|kind| directive.starts_with(kind))
        {
            return None;
        }
        let definition = last_definition(code);
        (leading_identifier(definition)? == column).then_some(directive)
    })
}

/// Table-level `-- count:N` directive, if present.
pub fn row_count(statement: &str) -> Option<u64> {
    let pattern = ROW_COUNT.as_ref()?;
    pattern
        .captures(statement)
        .and_then(|captures| captures.get(1))
        .and_then(|count| count.as_str().parse().ok())
}

/// Split a line at its first `--` outside quotes.
fn split_comment(line: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    let mut previous_dash = false;
    for (idx, ch) in line.char_indices() {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '-') if previous_dash => return Some((&line[..idx - 1], &line[idx - 1..])),
            _ => {}
        }
        previous_dash = quote.is_none() && ch == '-';
    }
    None
}

/// The last column-level definition in `code`: the text after the last
/// `,` or unmatched `(` at the top level, ignoring a trailing comma.
fn last_definition(code: &str) -> &str {
    let code = code.trim_end();
    let code = code.strip_suffix(',').unwrap_or(code);
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    for (idx, ch) in code.char_indices().rev() {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ')') => depth += 1,
            (None, '(') if depth > 0 => depth -= 1,
            (None, '(' | ',') if depth == 0 => return &code[idx + 1..],
            _ => {}
        }
    }
    code
}

/// First identifier of a definition: quoted names verbatim, unquoted ones
/// folded to lower case the way Postgres does.
fn leading_identifier(definition: &str) -> Option<String> {
    let definition = definition.trim_start();
    if let Some(rest) = definition.strip_prefix('"') {
        let end = rest.find('"')?;
        return Some(rest[..end].to_string());
    }
    let ident: String = definition
        .chars()
        .take_while(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '$')
        .collect();
    (!ident.is_empty()).then(|| ident.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "CREATE TABLE people (\n    id int PRIMARY KEY,\n    \"FullName\" text, -- type:name\n    price numeric(10, 2) -- range:[1.5 - 99.9]\n    , age int --oneof:[18,21]\n);\n-- count:25\n";

    #[test]
    fn finds_trailing_column_directives() {
        assert_eq!(column_directive(TABLE, "FullName"), Some("type:name"));
        assert_eq!(column_directive(TABLE, "price"), Some("range:[1.5 - 99.9]"));
        assert_eq!(column_directive(TABLE, "age"), Some("oneof:[18,21]"));
        assert_eq!(column_directive(TABLE, "id"), None);
        assert_eq!(column_directive(TABLE, "fullname"), None);
    }

    #[test]
    fn single_line_definitions_use_last_column() {
        let statement = "CREATE TABLE t(id int, name text -- type:name\n); -- count:5";
        assert_eq!(column_directive(statement, "name"), Some("type:name"));
        assert_eq!(column_directive(statement, "id"), None);
        assert_eq!(row_count(statement), Some(5));

        let first = "CREATE TABLE t(Id int -- range:[1 - 9]\n);";
        assert_eq!(column_directive(first, "id"), Some("range:[1 - 9]"));
    }

    #[test]
    fn ignores_dashes_inside_literals() {
        let statement = "CREATE TABLE t (\n    note text DEFAULT '-- type:email'\n);";
        assert_eq!(column_directive(statement, "note"), None);
    }

    #[test]
    fn row_count_bounds() {
        assert_eq!(row_count(TABLE), Some(25));
        assert_eq!(row_count("CREATE TABLE t (id int);\n-- count:0\n"), Some(0));
        assert_eq!(row_count("CREATE TABLE t (id int);\n-- count:007\n"), None);
        assert_eq!(row_count("CREATE TABLE t (id int);\n-- count:123456\n"), None);
        assert_eq!(row_count("CREATE TABLE t (id int);"), None);
    }
}
