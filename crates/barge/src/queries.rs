//! Parameterized construction of the canned query shapes.
//!
//! Filter values are never interpolated raw: they pass through
//! [`sql_literal`], which quotes the value and doubles embedded quotes.

/// Quote `value` as a SQL string literal.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn papers_by_field_of_study(database: &str, table: &str, field: &str) -> String {
    format!(
        "SELECT p.title, p.authors, p.journal.name, p.year \
         FROM {database}.{table} p, UNNEST(p.s2fieldsofstudy) AS t (field) \
         WHERE field.category = {} LIMIT 5",
        sql_literal(field)
    )
}

/// Partial author-name match.
pub fn papers_by_author(database: &str, table: &str, author: &str) -> String {
    format!(
        "SELECT p.title, p.authors, p.journal.name, p.year \
         FROM {database}.{table} p, UNNEST(p.authors) AS t (author) \
         WHERE author.name LIKE {} LIMIT 5",
        sql_literal(&format!("%{author}%"))
    )
}

pub fn papers_by_journal(database: &str, table: &str, journal: &str) -> String {
    format!(
        "SELECT p.title, p.authors, p.journal.name, p.year \
         FROM {database}.{table} p \
         WHERE p.journal.name = {} LIMIT 5",
        sql_literal(journal)
    )
}

/// Display names for the columns the canned shapes select.
pub const CANNED_COLUMNS: [&str; 4] = ["Title", "Authors", "Journal", "Year"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_doubles_embedded_quotes() {
        assert_eq!(sql_literal("O'Brien"), "'O''Brien'");
        assert_eq!(sql_literal("plain"), "'plain'");
    }

    #[test]
    fn field_filter_is_quoted() {
        let sql = papers_by_field_of_study("webinar", "papers", "Computer Science");
        assert!(sql.contains("field.category = 'Computer Science'"));
        assert!(sql.contains("FROM webinar.papers p"));
    }

    #[test]
    fn author_filter_wraps_wildcards_inside_the_literal() {
        let sql = papers_by_author("webinar", "papers", "Knuth");
        assert!(sql.contains("author.name LIKE '%Knuth%'"));
    }

    #[test]
    fn hostile_journal_name_cannot_break_out() {
        let sql = papers_by_journal("webinar", "papers", "Nature'; DROP TABLE papers; --");
        assert!(sql.contains("p.journal.name = 'Nature''; DROP TABLE papers; --'"));
    }
}
