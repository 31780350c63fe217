//! Notebook (`.ipynb`) flattening.
//!
//! Renders markdown and code cells, plus stream and `text/plain` results of
//! code cells, into one annotated text blob:
//!
//! ```text
//! --- MARKDOWN CELL ---
//! # Title
//!
//! --- CODE CELL ---
//! print('hi')
//!
//! OUTPUT:
//! Hello
//! ```
//!
//! Parsing is lenient below the top level: anything that does not fit the
//! expected shape is skipped rather than reported.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::NormalizeResult;

/// A notebook field holding either a string or a list of string fragments.
#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineText {
    Single(String),
    Fragments(Vec<Fragment>),
    Other(IgnoredAny),
}

/// One list element; non-string elements are dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum Fragment {
    Text(String),
    Other(IgnoredAny),
}

/// Deserialize a [`MultilineText`] straight into its joined form.
fn joined<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match MultilineText::deserialize(deserializer)? {
        MultilineText::Single(text) => text,
        MultilineText::Fragments(fragments) => fragments
            .into_iter()
            .filter_map(|fragment| match fragment {
                Fragment::Text(text) => Some(text),
                Fragment::Other(_) => None,
            })
            .collect(),
        MultilineText::Other(_) => String::new(),
    })
}

/// Deserialize a list whose malformed items become `T::default()`.
///
/// A non-list value yields an empty list.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Deserialize, Default)]
struct Notebook {
    #[serde(default, deserialize_with = "lenient_seq")]
    cells: Vec<Cell>,
}

#[derive(Deserialize, Default)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum Cell {
    Markdown {
        #[serde(default, deserialize_with = "joined")]
        source: String,
    },
    Code {
        #[serde(default, deserialize_with = "joined")]
        source: String,
        #[serde(default, deserialize_with = "lenient_seq")]
        outputs: Vec<Output>,
    },
    /// `raw` and any other cell type.
    #[default]
    #[serde(other)]
    Ignored,
}

#[derive(Deserialize, Default)]
#[serde(tag = "output_type", rename_all = "snake_case")]
enum Output {
    Stream {
        #[serde(default, deserialize_with = "joined")]
        text: String,
    },
    ExecuteResult {
        #[serde(default)]
        data: MimeBundle,
    },
    /// `display_data`, `error` and any other output type.
    #[default]
    #[serde(other)]
    Ignored,
}

#[derive(Deserialize, Default)]
struct MimeBundle {
    #[serde(rename = "text/plain", default, deserialize_with = "joined")]
    text_plain: String,
}

/// Flatten notebook JSON into annotated plain text.
///
/// Fails only when `json` is not valid JSON. A document without a usable
/// `cells` list renders as the empty string.
pub fn extract_notebook_text(json: &str) -> NormalizeResult<String> {
    let value: Value = serde_json::from_str(json)?;

    let notebook = if value.is_object() {
        Notebook::deserialize(value).unwrap_or_default()
    } else {
        Notebook::default()
    };

    let mut out = String::new();
    for cell in &notebook.cells {
        match cell {
            Cell::Markdown { source } => push_cell(&mut out, "MARKDOWN", source),
            Cell::Code { source, outputs } => {
                push_cell(&mut out, "CODE", source);
                for output in outputs {
                    match output {
                        Output::Stream { text } => push_section(&mut out, "OUTPUT:", text),
                        Output::ExecuteResult { data } => {
                            push_section(&mut out, "RESULT:", &data.text_plain)
                        }
                        Output::Ignored => {}
                    }
                }
            }
            Cell::Ignored => {}
        }
    }

    Ok(out.trim().to_string())
}

fn push_cell(out: &mut String, kind: &str, source: &str) {
    if source.trim().is_empty() {
        return;
    }
    out.push_str("--- ");
    out.push_str(kind);
    out.push_str(" CELL ---\n");
    out.push_str(source);
    out.push_str("\n\n");
}

fn push_section(out: &mut String, label: &str, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    out.push_str(label);
    out.push('\n');
    out.push_str(text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;
    use serde_json::json;

    fn render(value: Value) -> String {
        extract_notebook_text(&value.to_string()).unwrap()
    }

    #[test]
    fn test_markdown_and_code_with_stream() {
        let text = render(json!({
            "cells": [
                {"cell_type": "markdown", "source": "# Title"},
                {
                    "cell_type": "code",
                    "source": "print('hi')",
                    "outputs": [{"output_type": "stream", "text": "Hello"}]
                }
            ]
        }));

        assert_eq!(
            text,
            "--- MARKDOWN CELL ---\n# Title\n\n--- CODE CELL ---\nprint('hi')\n\nOUTPUT:\nHello"
        );
    }

    #[test]
    fn test_fragments_are_concatenated() {
        let text = render(json!({
            "cells": [{
                "cell_type": "code",
                "source": ["import os\n", "print(os.getcwd())"],
                "outputs": [{"output_type": "stream", "name": "stdout", "text": ["/home\n", "done\n"]}]
            }]
        }));

        assert_eq!(
            text,
            "--- CODE CELL ---\nimport os\nprint(os.getcwd())\n\nOUTPUT:\n/home\ndone"
        );
    }

    #[test]
    fn test_execute_result_uses_text_plain() {
        let text = render(json!({
            "cells": [{
                "cell_type": "code",
                "source": "1 + 1",
                "outputs": [{
                    "output_type": "execute_result",
                    "execution_count": 1,
                    "data": {"text/plain": ["2"], "text/html": "<b>2</b>"}
                }]
            }]
        }));

        assert_eq!(text, "--- CODE CELL ---\n1 + 1\n\nRESULT:\n2");
    }

    #[test]
    fn test_outputs_keep_source_order() {
        let text = render(json!({
            "cells": [{
                "cell_type": "code",
                "source": "x",
                "outputs": [
                    {"output_type": "stream", "text": "first"},
                    {"output_type": "execute_result", "data": {"text/plain": "second"}},
                    {"output_type": "stream", "text": "third"}
                ]
            }]
        }));

        assert_eq!(
            text,
            "--- CODE CELL ---\nx\n\nOUTPUT:\nfirst\nRESULT:\nsecond\nOUTPUT:\nthird"
        );
    }

    #[test]
    fn test_raw_cells_are_skipped() {
        let text = render(json!({
            "cells": [
                {"cell_type": "raw", "source": "do not show me"},
                {"cell_type": "markdown", "source": "shown"}
            ]
        }));

        assert_eq!(text, "--- MARKDOWN CELL ---\nshown");
    }

    #[test]
    fn test_display_data_and_errors_are_ignored() {
        let text = render(json!({
            "cells": [{
                "cell_type": "code",
                "source": "plot()",
                "outputs": [
                    {"output_type": "display_data", "data": {"text/plain": "<Figure>"}},
                    {"output_type": "error", "ename": "ValueError", "traceback": ["boom"]}
                ]
            }]
        }));

        assert_eq!(text, "--- CODE CELL ---\nplot()");
    }

    #[test]
    fn test_whitespace_only_fields_are_absent() {
        let text = render(json!({
            "cells": [
                {"cell_type": "markdown", "source": "   \n\t"},
                {
                    "cell_type": "code",
                    "source": ["", "  "],
                    "outputs": [
                        {"output_type": "stream", "text": "\n\n"},
                        {"output_type": "execute_result", "data": {"text/plain": "42"}}
                    ]
                }
            ]
        }));

        // Outputs render even when the cell's own source is blank.
        assert_eq!(text, "RESULT:\n42");
    }

    #[test]
    fn test_source_keeps_inner_whitespace() {
        let text = render(json!({
            "cells": [
                {"cell_type": "markdown", "source": "  indented\n"},
                {"cell_type": "markdown", "source": "next"}
            ]
        }));

        assert_eq!(
            text,
            "--- MARKDOWN CELL ---\n  indented\n\n\n--- MARKDOWN CELL ---\nnext"
        );
    }

    #[test]
    fn test_missing_or_malformed_cells_render_empty() {
        assert_eq!(render(json!({"metadata": {}})), "");
        assert_eq!(render(json!({"cells": "not a list"})), "");
        assert_eq!(render(json!({"cells": null})), "");
        assert_eq!(render(json!([1, 2, 3])), "");
        assert_eq!(render(json!("just a string")), "");
    }

    #[test]
    fn test_malformed_cells_and_outputs_are_skipped() {
        let text = render(json!({
            "cells": [
                42,
                {"source": "no type"},
                {"cell_type": "markdown", "source": 7},
                {
                    "cell_type": "code",
                    "source": "ok",
                    "outputs": [{"text": "no type"}, "junk", {"output_type": "stream", "text": "fine"}]
                },
                {"cell_type": "code", "source": "again", "outputs": {"not": "a list"}}
            ]
        }));

        assert_eq!(
            text,
            "--- CODE CELL ---\nok\n\nOUTPUT:\nfine\n--- CODE CELL ---\nagain"
        );
    }

    #[test]
    fn test_non_string_fragments_are_skipped() {
        let text = render(json!({
            "cells": [{
                "cell_type": "code",
                "source": ["a = 1\n", 1, null, "b = 2"],
                "outputs": [{"output_type": "stream", "text": [{"x": 1}, "kept"]}]
            }]
        }));

        assert_eq!(text, "--- CODE CELL ---\na = 1\nb = 2\n\nOUTPUT:\nkept");
    }

    #[test]
    fn test_missing_source_is_empty() {
        let text = render(json!({
            "cells": [{
                "cell_type": "code",
                "outputs": [{"output_type": "stream", "text": "orphan output"}]
            }]
        }));

        assert_eq!(text, "OUTPUT:\norphan output");
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = extract_notebook_text("{\"cells\": [").unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedNotebook(_)));
    }
}
