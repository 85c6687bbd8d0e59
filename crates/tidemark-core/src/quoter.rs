//! Identifier and literal quoting strategies.
//!
//! One stateless [`Quoter`] per dialect. The trait carries ANSI defaults;
//! dialects override quote characters, literal formats, and system methods.

use chrono::{NaiveDate, NaiveDateTime};

use crate::column::{SystemMethod, Value};

/// Dialect-specific escaping of identifiers, literals, and system methods.
pub trait Quoter {
    /// Opening identifier quote character.
    fn open_quote(&self) -> char {
        '"'
    }

    /// Closing identifier quote character.
    fn close_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling embedded closing quotes.
    fn quote(&self, name: &str) -> String {
        let close = self.close_quote();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(self.open_quote());
        for c in name.chars() {
            out.push(c);
            if c == close {
                out.push(close);
            }
        }
        out.push(close);
        out
    }

    /// Quotes a schema-qualified name.
    ///
    /// Dialects without a schema concept override this to drop the schema.
    fn quote_qualified(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(s) => format!("{}.{}", self.quote(s), self.quote(name)),
            None => self.quote(name),
        }
    }

    /// Quotes a string literal, doubling embedded single quotes.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Formats a binary literal.
    fn quote_bytes(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex(bytes))
    }

    /// SQL literal for boolean true.
    fn true_literal(&self) -> &'static str {
        "TRUE"
    }

    /// SQL literal for boolean false.
    fn false_literal(&self) -> &'static str {
        "FALSE"
    }

    /// Formats a date literal.
    fn format_date(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    /// Formats a date/time literal.
    fn format_datetime(&self, dt: &NaiveDateTime) -> String {
        format!("'{}'", dt.format("%Y-%m-%dT%H:%M:%S"))
    }

    /// Renders a system method (CURRENT_TIMESTAMP equivalents).
    fn system_method(&self, method: SystemMethod) -> &'static str;

    /// Renders any [`Value`] as a SQL literal.
    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b {
                self.true_literal()
            } else {
                self.false_literal()
            }
            .to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => self.quote_string(s),
            Value::Bytes(b) => self.quote_bytes(b),
            Value::Date(d) => self.format_date(d),
            Value::DateTime(dt) => self.format_datetime(dt),
            Value::Guid(g) => self.quote_string(g),
            Value::Expression(e) => e.clone(),
            Value::Method(m) => self.system_method(*m).to_string(),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// PostgreSQL quoter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresQuoter;

impl Quoter for PostgresQuoter {
    fn quote_bytes(&self, bytes: &[u8]) -> String {
        format!("E'\\\\x{}'", hex(bytes))
    }

    fn system_method(&self, method: SystemMethod) -> &'static str {
        match method {
            SystemMethod::CurrentDateTime => "now()",
            SystemMethod::CurrentUtcDateTime => "(now() at time zone 'UTC')",
            SystemMethod::CurrentUser => "current_user",
            SystemMethod::NewGuid => "gen_random_uuid()",
        }
    }
}

/// SQLite quoter. SQLite has no schema concept, so qualification is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQuoter;

impl Quoter for SqliteQuoter {
    fn quote_qualified(&self, _schema: Option<&str>, name: &str) -> String {
        self.quote(name)
    }

    // SQLite stores booleans as 0/1.
    fn true_literal(&self) -> &'static str {
        "1"
    }

    fn false_literal(&self) -> &'static str {
        "0"
    }

    fn system_method(&self, method: SystemMethod) -> &'static str {
        match method {
            SystemMethod::CurrentDateTime | SystemMethod::CurrentUtcDateTime => "CURRENT_TIMESTAMP",
            SystemMethod::CurrentUser => "''",
            SystemMethod::NewGuid => "(lower(hex(randomblob(16))))",
        }
    }
}

/// MySQL quoter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlQuoter;

impl Quoter for MySqlQuoter {
    fn open_quote(&self) -> char {
        '`'
    }

    fn close_quote(&self) -> char {
        '`'
    }

    // Backslash is an escape character in MySQL string literals.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn quote_bytes(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex(bytes))
    }

    fn system_method(&self, method: SystemMethod) -> &'static str {
        match method {
            SystemMethod::CurrentDateTime => "NOW()",
            SystemMethod::CurrentUtcDateTime => "UTC_TIMESTAMP()",
            SystemMethod::CurrentUser => "CURRENT_USER()",
            SystemMethod::NewGuid => "UUID()",
        }
    }
}

/// SQL Server quoter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSqlQuoter;

impl Quoter for MsSqlQuoter {
    fn open_quote(&self) -> char {
        '['
    }

    fn close_quote(&self) -> char {
        ']'
    }

    fn quote_bytes(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex(bytes))
    }

    fn true_literal(&self) -> &'static str {
        "1"
    }

    fn false_literal(&self) -> &'static str {
        "0"
    }

    fn system_method(&self, method: SystemMethod) -> &'static str {
        match method {
            SystemMethod::CurrentDateTime => "GETDATE()",
            SystemMethod::CurrentUtcDateTime => "GETUTCDATE()",
            SystemMethod::CurrentUser => "CURRENT_USER",
            SystemMethod::NewGuid => "NEWID()",
        }
    }
}

/// Oracle quoter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleQuoter;

/// Oracle rejects string literals longer than 4000 characters.
const ORACLE_MAX_LITERAL: usize = 4000;

impl Quoter for OracleQuoter {
    /// Long literals are split into concatenated chunks. Chunk length is
    /// measured after quote-doubling so no piece exceeds the limit.
    fn quote_string(&self, value: &str) -> String {
        let mut parts = Vec::new();
        let mut chunk = String::new();
        let mut len = 0;
        for c in value.chars() {
            let cost = if c == '\'' { 2 } else { 1 };
            if len + cost > ORACLE_MAX_LITERAL {
                parts.push(format!("'{chunk}'"));
                chunk.clear();
                len = 0;
            }
            chunk.push(c);
            if c == '\'' {
                chunk.push('\'');
            }
            len += cost;
        }
        parts.push(format!("'{chunk}'"));
        parts.join(" || ")
    }

    fn quote_bytes(&self, bytes: &[u8]) -> String {
        format!("hextoraw('{}')", hex(bytes))
    }

    fn true_literal(&self) -> &'static str {
        "1"
    }

    fn false_literal(&self) -> &'static str {
        "0"
    }

    fn format_date(&self, date: &NaiveDate) -> String {
        format!("TO_DATE('{}', 'YYYY-MM-DD')", date.format("%Y-%m-%d"))
    }

    fn format_datetime(&self, dt: &NaiveDateTime) -> String {
        format!(
            "TO_DATE('{}', 'YYYY-MM-DD HH24:MI:SS')",
            dt.format("%Y-%m-%d %H:%M:%S")
        )
    }

    fn system_method(&self, method: SystemMethod) -> &'static str {
        match method {
            SystemMethod::CurrentDateTime => "sysdate",
            SystemMethod::CurrentUtcDateTime => "sys_extract_utc(systimestamp)",
            SystemMethod::CurrentUser => "USER",
            SystemMethod::NewGuid => "sys_guid()",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_identifier_escaping() {
        let q = PostgresQuoter;
        assert_eq!(q.quote("users"), "\"users\"");
        assert_eq!(q.quote("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_bracket_identifier_escaping() {
        let q = MsSqlQuoter;
        assert_eq!(q.quote("users"), "[users]");
        assert_eq!(q.quote("we]ird"), "[we]]ird]");
    }

    #[test]
    fn test_backtick_identifier_escaping() {
        let q = MySqlQuoter;
        assert_eq!(q.quote("users"), "`users`");
        assert_eq!(q.quote("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_qualified_names() {
        let q = PostgresQuoter;
        assert_eq!(q.quote_qualified(Some("app"), "users"), "\"app\".\"users\"");
        assert_eq!(q.quote_qualified(None, "users"), "\"users\"");

        // SQLite drops the schema entirely.
        let q = SqliteQuoter;
        assert_eq!(q.quote_qualified(Some("app"), "users"), "\"users\"");
    }

    #[test]
    fn test_string_literal_escaping() {
        let q = PostgresQuoter;
        assert_eq!(q.quote_string("it's"), "'it''s'");
    }

    #[test]
    fn test_value_rendering() {
        let q = MsSqlQuoter;
        assert_eq!(q.quote_value(&Value::Null), "NULL");
        assert_eq!(q.quote_value(&Value::Bool(true)), "1");
        assert_eq!(q.quote_value(&Value::Int(42)), "42");
        assert_eq!(q.quote_value(&Value::from("x")), "'x'");
        assert_eq!(
            q.quote_value(&Value::Method(SystemMethod::NewGuid)),
            "NEWID()"
        );
        assert_eq!(q.quote_value(&Value::Bytes(vec![0xDE, 0xAD])), "0xDEAD");
    }

    #[test]
    fn test_mysql_backslash_escaping() {
        let q = MySqlQuoter;
        assert_eq!(q.quote_string("C:\\temp"), "'C:\\\\temp'");
        assert_eq!(q.quote_string("it's"), "'it''s'");
        // A trailing backslash must not swallow the closing quote.
        assert_eq!(q.quote_string("trail\\"), "'trail\\\\'");
    }

    #[test]
    fn test_oracle_chunking_counts_escaped_quotes() {
        let q = OracleQuoter;
        // Each quote doubles when escaped, so 2001 of them need two chunks.
        let long = "'".repeat(2001);
        let sql = q.quote_string(&long);
        let parts: Vec<&str> = sql.split(" || ").collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), ORACLE_MAX_LITERAL + 2);
        assert_eq!(parts[1], "''''");
    }

    #[test]
    fn test_oracle_long_literal_chunking() {
        let q = OracleQuoter;
        let long = "a".repeat(4001);
        let sql = q.quote_string(&long);
        assert!(sql.contains(" || "));
        let parts: Vec<&str> = sql.split(" || ").collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 4002); // 4000 chars plus the two quotes
        assert_eq!(parts[1], "'a'");

        // Short literals stay a single chunk.
        assert_eq!(q.quote_string("short"), "'short'");
    }

    #[test]
    fn test_oracle_date_formatting() {
        let q = OracleQuoter;
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
        assert_eq!(q.format_date(&d), "TO_DATE('2024-03-15', 'YYYY-MM-DD')");
    }
}
