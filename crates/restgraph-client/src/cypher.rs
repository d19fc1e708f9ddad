//! Cypher query execution through the server's Cypher plugin.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::client::{Client, ClientError};
use crate::transport::Transport;

const EXECUTE_QUERY_PATH: &str = "/ext/CypherPlugin/graphdb/execute_query";

// ── Query ─────────────────────────────────────────────────────────

/// A Cypher template with positional `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    template: String,
    params: Vec<Value>,
}

impl Query {
    pub fn new(template: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            template: template.into(),
            params,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Substitute the parameters into the template.
    ///
    /// Each `?` outside a quoted literal takes the next parameter, written as
    /// a Cypher literal. The placeholder and parameter counts must match.
    pub fn to_cypher(&self) -> Result<String, ClientError> {
        let mut out = String::with_capacity(self.template.len());
        let mut params = self.params.iter();
        let mut placeholders = 0;
        let mut quote: Option<char> = None;
        let mut chars = self.template.chars();

        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => {
                    placeholders += 1;
                    if let Some(param) = params.next() {
                        write_literal(&mut out, param);
                    }
                }
                _ => out.push(c),
            }
        }

        if placeholders != self.params.len() {
            return Err(ClientError::QueryParameters {
                placeholders,
                given: self.params.len(),
            });
        }
        Ok(out)
    }
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('\'');
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '"' => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    _ => out.push(c),
                }
            }
            out.push('\'');
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, item);
            }
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    out.push('`');
                    out.push_str(&key.replace('`', "``"));
                    out.push('`');
                }
                out.push_str(": ");
                write_literal(out, item);
            }
            out.push('}');
        }
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Results ───────────────────────────────────────────────────────

/// One result row: column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows returned by a Cypher query.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Decode `{columns: [...], data: [[...], ...]}`.
    fn decode(path: &str, body: &Value) -> Result<Self, ClientError> {
        let columns = body
            .get("columns")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::malformed(path, "query result without 'columns'"))?
            .iter()
            .map(|c| {
                c.as_str().map(str::to_string).ok_or_else(|| {
                    ClientError::malformed(path, format!("column name {c} is not a string"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = match body.get("data") {
            None | Some(Value::Null) => {
                return Ok(Self {
                    columns,
                    rows: Vec::new(),
                })
            }
            Some(Value::Array(data)) => data,
            Some(other) => {
                return Err(ClientError::malformed(
                    path,
                    format!("expected a list of rows, got {other}"),
                ))
            }
        };

        let mut rows = Vec::with_capacity(data.len());
        for row in data {
            let values = row
                .as_array()
                .ok_or_else(|| ClientError::malformed(path, format!("row {row} is not a list")))?;
            if values.len() != columns.len() {
                return Err(ClientError::malformed(
                    path,
                    format!(
                        "row has {} values for {} columns",
                        values.len(),
                        columns.len()
                    ),
                ));
            }
            rows.push(Row {
                cells: columns.iter().cloned().zip(values.iter().cloned()).collect(),
            });
        }

        Ok(Self { columns, rows })
    }
}

impl std::ops::Index<usize> for ResultSet {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<T: Transport> Client<T> {
    /// Run a Cypher query.
    ///
    /// A 204 or a `null` body is an empty result.
    pub async fn execute_cypher_query(&self, query: &Query) -> Result<ResultSet, ClientError> {
        let cypher = query.to_cypher()?;
        let body = serde_json::json!({ "query": cypher });

        let response = self.post(EXECUTE_QUERY_PATH, Some(&body)).await?;
        if !response.is_success() {
            return Err(self.remote_failure(EXECUTE_QUERY_PATH, response.code));
        }

        match response.body() {
            None => Ok(ResultSet::default()),
            Some(data) => {
                let results = ResultSet::decode(EXECUTE_QUERY_PATH, data)?;
                tracing::debug!(rows = results.len(), "Cypher query returned");
                Ok(results)
            }
        }
    }
}
