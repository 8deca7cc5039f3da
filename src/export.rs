//! Column-oriented datasets and export-format dispatch.
//!
//! A [`Dataset`] is the fully materialized, column-oriented form of a
//! result set: ordered headers plus ordered rows of values. Formatting
//! dispatches on [`Format`]; text formats only. Binary spreadsheet
//! formats (xls, xlsx, dbf, ods) are not implemented and fail with an
//! unsupported-format error at parse time.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::{RowsetError, RowsetResult};

/// A supported export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Tsv,
    Json,
    Yaml,
    Html,
    Latex,
}

impl FromStr for Format {
    type Err = RowsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "tsv" => Ok(Format::Tsv),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "html" => Ok(Format::Html),
            "latex" | "tex" => Ok(Format::Latex),
            other => Err(RowsetError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Csv => "csv",
            Format::Tsv => "tsv",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Html => "html",
            Format::Latex => "latex",
        };
        f.write_str(name)
    }
}

/// A column-oriented tabular dataset: ordered column names plus ordered
/// rows of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create an empty dataset with the given column headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append one row of values. The row must match the header width.
    pub fn push(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// The ordered column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The ordered rows of values.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize the dataset in the requested format.
    ///
    /// An empty dataset is not an error: csv/tsv yield header-only (or
    /// fully empty) output, json yields `[]`.
    pub fn export(&self, format: Format) -> RowsetResult<String> {
        match format {
            Format::Csv => self.to_delimited(b','),
            Format::Tsv => self.to_delimited(b'\t'),
            Format::Json => self.to_json(),
            Format::Yaml => self.to_yaml(),
            Format::Html => Ok(self.to_html()),
            Format::Latex => Ok(self.to_latex()),
        }
    }

    fn to_delimited(&self, delimiter: u8) -> RowsetResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        if !self.headers.is_empty() {
            writer
                .write_record(&self.headers)
                .map_err(|e| RowsetError::Export(e.to_string()))?;
        }
        for row in &self.rows {
            writer
                .write_record(row.iter().map(cell_text))
                .map_err(|e| RowsetError::Export(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| RowsetError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RowsetError::Export(e.to_string()))
    }

    fn to_json(&self) -> RowsetResult<String> {
        serde_json::to_string_pretty(&self.as_objects())
            .map_err(|e| RowsetError::Export(e.to_string()))
    }

    fn to_yaml(&self) -> RowsetResult<String> {
        serde_yaml::to_string(&self.as_objects())
            .map_err(|e| RowsetError::Export(e.to_string()))
    }

    fn to_html(&self) -> String {
        let mut out = String::from("<table>\n<thead>\n<tr>");
        for header in &self.headers {
            out.push_str("<th>");
            out.push_str(&escape_html(header));
            out.push_str("</th>");
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in &self.rows {
            out.push_str("<tr>");
            for value in row {
                out.push_str("<td>");
                out.push_str(&escape_html(&cell_text(value)));
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>");
        out
    }

    fn to_latex(&self) -> String {
        let cols = "l".repeat(self.headers.len().max(1));
        let mut out = format!("\\begin{{tabular}}{{{cols}}}\n\\hline\n");
        if !self.headers.is_empty() {
            let cells: Vec<String> = self.headers.iter().map(|h| escape_latex(h)).collect();
            out.push_str(&cells.join(" & "));
            out.push_str(" \\\\\n\\hline\n");
        }
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| escape_latex(&cell_text(v))).collect();
            out.push_str(&cells.join(" & "));
            out.push_str(" \\\\\n");
        }
        out.push_str("\\hline\n\\end{tabular}");
        out
    }

    /// One ordered JSON object per row, for the structured formats.
    fn as_objects(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut map = serde_json::Map::new();
                for (header, value) in self.headers.iter().zip(row) {
                    map.insert(header.clone(), value.clone());
                }
                Value::Object(map)
            })
            .collect()
    }
}

/// Render a value as a plain text cell. Null becomes the empty string;
/// strings are unquoted.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dataset() -> Dataset {
        let mut data = Dataset::new(vec!["id".to_string(), "name".to_string()]);
        data.push(vec![json!(1), json!("a")]);
        data.push(vec![json!(2), json!("b")]);
        data
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!("YAML".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
    }

    #[test]
    fn test_format_unsupported() {
        let err = "xls".parse::<Format>().unwrap_err();
        assert!(matches!(err, RowsetError::UnsupportedFormat(name) if name == "xls"));
    }

    #[test]
    fn test_csv() {
        let out = dataset().export(Format::Csv).unwrap();
        assert_eq!(out, "id,name\n1,a\n2,b\n");
    }

    #[test]
    fn test_csv_quotes_delimiter() {
        let mut data = Dataset::new(vec!["note".to_string()]);
        data.push(vec![json!("a,b")]);
        let out = data.export(Format::Csv).unwrap();
        assert_eq!(out, "note\n\"a,b\"\n");
    }

    #[test]
    fn test_csv_empty_dataset() {
        let data = Dataset::new(Vec::new());
        let out = data.export(Format::Csv).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_csv_header_only() {
        let data = Dataset::new(vec!["id".to_string()]);
        let out = data.export(Format::Csv).unwrap();
        assert_eq!(out, "id\n");
    }

    #[test]
    fn test_tsv() {
        let out = dataset().export(Format::Tsv).unwrap();
        assert_eq!(out, "id\tname\n1\ta\n2\tb\n");
    }

    #[test]
    fn test_csv_null_is_empty_cell() {
        let mut data = Dataset::new(vec!["id".to_string(), "name".to_string()]);
        data.push(vec![json!(1), Value::Null]);
        let out = data.export(Format::Csv).unwrap();
        assert_eq!(out, "id,name\n1,\n");
    }

    #[test]
    fn test_json() {
        let out = dataset().export(Format::Json).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})]);
    }

    #[test]
    fn test_json_empty() {
        let data = Dataset::new(vec!["id".to_string()]);
        assert_eq!(data.export(Format::Json).unwrap(), "[]");
    }

    #[test]
    fn test_yaml() {
        let out = dataset().export(Format::Yaml).unwrap();
        assert_eq!(out, "- id: 1\n  name: a\n- id: 2\n  name: b\n");
    }

    #[test]
    fn test_html_escapes() {
        let mut data = Dataset::new(vec!["v".to_string()]);
        data.push(vec![json!("<b>&</b>")]);
        let out = data.export(Format::Html).unwrap();
        assert!(out.contains("<td>&lt;b&gt;&amp;&lt;/b&gt;</td>"));
    }

    #[test]
    fn test_latex_escapes() {
        let mut data = Dataset::new(vec!["pct_done".to_string()]);
        data.push(vec![json!("50%")]);
        let out = data.export(Format::Latex).unwrap();
        assert!(out.starts_with("\\begin{tabular}{l}"));
        assert!(out.contains("pct\\_done"));
        assert!(out.contains("50\\%"));
    }
}
