//! Section markers and field encodings of the GB format.
//!
//! ```text
//! * GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V,1A)
//! "graph",2,1
//! * Vertices
//! "look",A0
//! "feel",0
//! * Arcs
//! V1,0,1
//! * Checksum 420748703
//! ```
//!
//! Vertex `k` is written `V<k>` and arc `k` is `A<k>`, numbered by file
//! position. A null pointer is `0`; a vertex field may also hold `1`, the
//! marker value.

use graphbase_graph::{VertexId, VertexRef};

pub const HEADER_PREFIX: &str = "* GraphBase graph (util_types ";
pub const VERTICES_MARK: &str = "* Vertices";
pub const ARCS_MARK: &str = "* Arcs";
pub const CHECKSUM_PREFIX: &str = "* Checksum ";

/// Field separator.
pub const SEP: char = ',';

/// Marks a line that continues inside a string.
pub const CONTINUATION: char = '\\';

pub const QUOTE: char = '"';

pub fn encode_vertex_ref(vertex: VertexRef) -> String {
    match vertex {
        VertexRef::Null => "0".to_string(),
        VertexRef::Marker => "1".to_string(),
        VertexRef::Id(id) => format!("V{}", id.index()),
    }
}

pub fn encode_arc_index(index: Option<usize>) -> String {
    match index {
        Some(k) => format!("A{}", k),
        None => "0".to_string(),
    }
}

/// True if `text` can sit between quotes in a GB record.
pub fn is_encodable(text: &str) -> bool {
    !text.contains(&[QUOTE, '\n', '\r'][..])
}

/// Splits a joined record into fields. Quoted fields keep their quotes.
pub fn split_fields(record: &str) -> Result<Vec<&str>, String> {
    let mut fields = Vec::new();
    let mut rest = record;
    loop {
        let end = if let Some(inner) = rest.strip_prefix(QUOTE) {
            let close = inner
                .find(QUOTE)
                .ok_or_else(|| "unterminated string".to_string())?;
            close + 2
        } else {
            rest.find(SEP).unwrap_or(rest.len())
        };
        fields.push(&rest[..end]);
        rest = &rest[end..];

        if rest.is_empty() {
            break;
        }
        rest = rest
            .strip_prefix(SEP)
            .ok_or_else(|| format!("expected '{}' after string field", SEP))?;
    }
    Ok(fields)
}

pub fn unquote(field: &str) -> Result<&str, String> {
    field
        .strip_prefix(QUOTE)
        .and_then(|f| f.strip_suffix(QUOTE))
        .ok_or_else(|| format!("expected a quoted string, found '{}'", field))
}

pub fn parse_int(field: &str) -> Result<i64, String> {
    field
        .parse()
        .map_err(|_| format!("expected an integer, found '{}'", field))
}

pub fn parse_count(field: &str, suffix: char) -> Result<usize, String> {
    field
        .strip_suffix(suffix)
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| format!("expected a count ending in '{}', found '{}'", suffix, field))
}

/// Decodes a vertex pointer against a graph of `n` vertices.
pub fn parse_vertex_ref(field: &str, n: usize) -> Result<VertexRef, String> {
    match field {
        "0" => Ok(VertexRef::Null),
        "1" => Ok(VertexRef::Marker),
        _ => {
            let index = pointer_index(field, 'V')?;
            if index >= n {
                return Err(format!("vertex {} out of range ({} vertices)", field, n));
            }
            Ok(VertexRef::Id(VertexId::new(index)))
        }
    }
}

/// Decodes an arc pointer against a file of `m` arcs.
pub fn parse_arc_index(field: &str, m: usize) -> Result<Option<usize>, String> {
    if field == "0" {
        return Ok(None);
    }
    let index = pointer_index(field, 'A')?;
    if index >= m {
        return Err(format!("arc {} out of range ({} arcs)", field, m));
    }
    Ok(Some(index))
}

fn pointer_index(field: &str, tag: char) -> Result<usize, String> {
    field
        .strip_prefix(tag)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| format!("expected '{}<index>' or a null pointer, found '{}'", tag, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_and_quoted() {
        let fields = split_fields("\"a, b\",A3,-7,\"\"").unwrap();
        assert_eq!(fields, vec!["\"a, b\"", "A3", "-7", "\"\""]);
    }

    #[test]
    fn test_split_rejects_bad_strings() {
        assert!(split_fields("\"open,A1").is_err());
        assert!(split_fields("\"closed\"x,A1").is_err());
    }

    #[test]
    fn test_pointers() {
        assert_eq!(parse_vertex_ref("0", 2), Ok(VertexRef::Null));
        assert_eq!(parse_vertex_ref("1", 2), Ok(VertexRef::Marker));
        assert_eq!(
            parse_vertex_ref("V1", 2),
            Ok(VertexRef::Id(VertexId::new(1)))
        );
        assert!(parse_vertex_ref("V2", 2).is_err());
        assert!(parse_vertex_ref("V", 2).is_err());
        assert!(parse_vertex_ref("2", 2).is_err());

        assert_eq!(parse_arc_index("0", 0), Ok(None));
        assert_eq!(parse_arc_index("A0", 1), Ok(Some(0)));
        assert!(parse_arc_index("A1", 1).is_err());
        assert!(parse_arc_index("A+1", 5).is_err());
    }

    #[test]
    fn test_counts() {
        assert_eq!(parse_count("12V", 'V'), Ok(12));
        assert!(parse_count("12A", 'V').is_err());
    }

    #[test]
    fn test_encodable() {
        assert!(is_encodable("look, feel"));
        assert!(!is_encodable("say \"hi\""));
        assert!(!is_encodable("two\nlines"));
    }
}
