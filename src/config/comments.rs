//! Documentation comments for serialized configuration files.
//!
//! Works on the text the codec produces, not on parsed trees: each schema
//! field's block (its key line plus every deeper-indented line after it) is
//! located by indentation and prefixed with blank lines and `#` comments
//! taken from the schema table. Layouts other than the codec's own output
//! are passed through on a best-effort basis.

use super::schema::SchemaField;
use regex_lite::Regex;
use std::sync::LazyLock;

/// `<indent><key>:` followed by a space or end of line. The key is plain or
/// single/double quoted, as the encoder quotes keys like `on` and `no`.
static KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^( *)(?:'([^']*)'|"([^"\\]*)"|([A-Za-z0-9_][A-Za-z0-9_.-]*)):(?: |$)"#)
        .expect("key-line pattern is valid")
});

/// Insert documentation comments and spacing from `fields` into `text`.
pub fn annotate(text: &str, fields: &[SchemaField]) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::with_capacity(lines.len() * 2);
    annotate_block(&lines, fields, 0, &mut out);

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn annotate_block(lines: &[&str], fields: &[SchemaField], indent: usize, out: &mut Vec<String>) {
    let mut start = 0;
    while start < lines.len() {
        let end = block_end(lines, start, indent);
        let field = key_at(lines[start], indent).and_then(|key| SchemaField::find(fields, key));

        let Some(field) = field else {
            out.extend(lines[start..end].iter().map(|line| line.to_string()));
            start = end;
            continue;
        };

        let pad = " ".repeat(indent);
        out.extend(std::iter::repeat_n(String::new(), field.spacing));
        if let Some(doc) = field.doc {
            out.extend(comment_lines(doc, &pad));
        }
        out.push(lines[start].to_string());

        // Inner fields first, so their comments land inside this block
        let body = &lines[start + 1..end];
        match (field.nested, child_indent(body, indent)) {
            (Some(nested), Some(child)) => annotate_block(body, nested, child, out),
            _ => out.extend(body.iter().map(|line| line.to_string())),
        }
        start = end;
    }
}

/// Index one past the last line of the block starting at `start`.
fn block_end(lines: &[&str], start: usize, indent: usize) -> usize {
    let mut end = start + 1;
    while let Some(line) = lines.get(end) {
        let continues = line.trim().is_empty()
            || indent_of(line) > indent
            || is_sequence_item(line, indent);
        if !continues {
            break;
        }
        end += 1;
    }
    end
}

/// Sequence entries of a block-style list sit at the key's own indentation.
fn is_sequence_item(line: &str, indent: usize) -> bool {
    if indent_of(line) != indent {
        return false;
    }
    let rest = &line[indent..];
    rest == "-" || rest.starts_with("- ")
}

fn key_at(line: &str, indent: usize) -> Option<&str> {
    let caps = KEY_LINE.captures(line)?;
    if caps.get(1)?.as_str().len() != indent {
        return None;
    }
    caps.get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map(|key| key.as_str())
}

fn child_indent(body: &[&str], indent: usize) -> Option<usize> {
    body.iter()
        .find(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .filter(|&child| child > indent)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Render documentation text as comment lines, with the common leading
/// whitespace and surrounding blank lines removed.
fn comment_lines(doc: &str, pad: &str) -> Vec<String> {
    let lines: Vec<&str> = doc.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    let lines = &lines[first..=last];

    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                format!("{}#", pad)
            } else {
                format!("{}# {}", pad, line[common..].trim_end())
            }
        })
        .collect()
}
