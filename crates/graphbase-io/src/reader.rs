//! GB reader.
//!
//! Parsing happens in two passes. The first pass reads every record into raw
//! form and checks pointers against the declared counts. The second pass
//! rebuilds the graph, replaying each vertex's arc list oldest first so the
//! resulting newest-first order matches the file.

use crate::checksum::Checksum;
use crate::error::{parse_error, GbError};
use crate::format::{
    parse_arc_index, parse_count, parse_int, parse_vertex_ref, split_fields, unquote, ARCS_MARK,
    CHECKSUM_PREFIX, CONTINUATION, HEADER_PREFIX, SEP, VERTICES_MARK,
};
use graphbase_graph::{ArcId, Graph, GraphError, Util, UtilKind, UtilTypes, VertexId, VertexRef};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads a graph in GB format.
pub fn read_gb<R: BufRead>(input: R) -> Result<Graph, GbError> {
    let mut source = LineSource::new(input);

    let (line, header) = source.expect_line("GraphBase header")?;
    let (types, n, m) = parse_header(line, &header)?;

    let (line, record) = source.record("graph record")?;
    let graph_record = parse_graph_record(line, &record, &types, n, m)?;

    source.expect_mark(VERTICES_MARK)?;
    let mut vertices = Vec::new();
    for _ in 0..n {
        let (line, record) = source.record("vertex record")?;
        vertices.push(parse_vertex(line, &record, &types, n, m)?);
    }

    source.expect_mark(ARCS_MARK)?;
    let mut arcs = Vec::new();
    for _ in 0..m {
        let (line, record) = source.record("arc record")?;
        arcs.push(parse_arc(line, &record, &types, n, m)?);
    }

    let actual = source.checksum();
    let (line, text) = source.expect_line("checksum")?;
    let expected = text
        .strip_prefix(CHECKSUM_PREFIX)
        .and_then(|digits| digits.trim().parse::<u64>().ok())
        .ok_or_else(|| parse_error(line, format!("expected checksum line, found '{}'", text)))?;
    if expected != actual {
        return Err(GbError::ChecksumMismatch { expected, actual });
    }
    while let Some((line, text)) = source.next_line()? {
        if !text.trim().is_empty() {
            return Err(parse_error(line, "unexpected content after checksum"));
        }
    }

    let graph = assemble(graph_record, vertices, arcs, types)?;
    debug!(
        id = graph.id(),
        vertices = graph.n(),
        arcs = graph.m(),
        "read GB graph"
    );
    Ok(graph)
}

/// Reads a GB file from `path`.
pub fn load_gb<P: AsRef<Path>>(path: P) -> Result<Graph, GbError> {
    let path = path.as_ref();
    let graph = read_gb(BufReader::new(File::open(path)?))?;
    info!("Loaded graph '{}' from {}", graph.id(), path.display());
    Ok(graph)
}

/// Numbered input lines with a running checksum.
struct LineSource<R> {
    lines: Lines<R>,
    line_no: usize,
    checksum: Checksum,
}

impl<R: BufRead> LineSource<R> {
    fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
            checksum: Checksum::new(),
        }
    }

    fn checksum(&self) -> u64 {
        self.checksum.value()
    }

    fn next_line(&mut self) -> Result<Option<(usize, String)>, GbError> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                let line = line?;
                self.line_no += 1;
                self.checksum.update_line(&line);
                Ok(Some((self.line_no, line)))
            }
        }
    }

    fn expect_line(&mut self, what: &str) -> Result<(usize, String), GbError> {
        self.next_line()?.ok_or_else(|| {
            parse_error(
                self.line_no,
                format!("unexpected end of file, expected {}", what),
            )
        })
    }

    fn expect_mark(&mut self, mark: &str) -> Result<(), GbError> {
        let (line, text) = self.expect_line(mark)?;
        if text.trim_end() != mark {
            return Err(parse_error(
                line,
                format!("expected '{}', found '{}'", mark, text),
            ));
        }
        Ok(())
    }

    /// Reads one logical record, joining continued lines.
    fn record(&mut self, what: &str) -> Result<(usize, String), GbError> {
        let (start, mut current) = self.expect_line(what)?;
        if current.starts_with('*') {
            return Err(parse_error(
                start,
                format!("expected {}, found '{}'", what, current),
            ));
        }

        let mut record = String::new();
        loop {
            if let Some(body) = current.strip_suffix(CONTINUATION) {
                record.push_str(body);
            } else {
                record.push_str(&current);
                if !current.ends_with(SEP) {
                    break;
                }
            }
            current = self.expect_line(what)?.1;
        }
        Ok((start, record))
    }
}

enum RawUtil {
    Int(i64),
    Str(String),
    Vertex(VertexRef),
    Arc(Option<usize>),
}

struct RawGraph {
    id: String,
    utils: Vec<(usize, RawUtil)>,
}

struct RawVertex {
    line: usize,
    name: String,
    first_arc: Option<usize>,
    utils: Vec<(usize, RawUtil)>,
}

struct RawArc {
    line: usize,
    tip: VertexRef,
    next: Option<usize>,
    len: i64,
    utils: Vec<(usize, RawUtil)>,
}

fn parse_header(line: usize, text: &str) -> Result<(UtilTypes, usize, usize), GbError> {
    let body = text
        .strip_prefix(HEADER_PREFIX)
        .and_then(|rest| rest.trim_end().strip_suffix(')'))
        .ok_or_else(|| parse_error(line, "not a GraphBase header"))?;

    let parts: Vec<&str> = body.split(SEP).collect();
    let [types, n, m] = parts.as_slice() else {
        return Err(parse_error(line, format!("malformed header '{}'", text)));
    };

    let types: UtilTypes = types
        .parse()
        .map_err(|e: GraphError| parse_error(line, e.to_string()))?;
    if types.uses(UtilKind::Graph) {
        return Err(GbError::UnsupportedUtil(UtilKind::Graph.code()));
    }
    let n = parse_count(n, 'V').map_err(|e| parse_error(line, e))?;
    let m = parse_count(m, 'A').map_err(|e| parse_error(line, e))?;
    Ok((types, n, m))
}

fn fields_of(line: usize, record: &str, at_least: usize) -> Result<Vec<&str>, GbError> {
    let fields = split_fields(record).map_err(|e| parse_error(line, e))?;
    if fields.len() < at_least {
        return Err(parse_error(
            line,
            format!("expected at least {} fields, found {}", at_least, fields.len()),
        ));
    }
    Ok(fields)
}

fn parse_graph_record(
    line: usize,
    record: &str,
    types: &UtilTypes,
    n: usize,
    m: usize,
) -> Result<RawGraph, GbError> {
    let fields = fields_of(line, record, 3)?;
    let id = unquote(fields[0]).map_err(|e| parse_error(line, e))?;

    let counts = (fields[1].parse::<usize>(), fields[2].parse::<usize>());
    if counts != (Ok(n), Ok(m)) {
        return Err(parse_error(
            line,
            format!(
                "graph record counts {},{} disagree with header {}V,{}A",
                fields[1], fields[2], n, m
            ),
        ));
    }

    let utils = parse_utils(line, &fields[3..], types.graph_kinds(), n, m)?;
    Ok(RawGraph {
        id: id.to_string(),
        utils,
    })
}

fn parse_vertex(
    line: usize,
    record: &str,
    types: &UtilTypes,
    n: usize,
    m: usize,
) -> Result<RawVertex, GbError> {
    let fields = fields_of(line, record, 2)?;
    let name = unquote(fields[0]).map_err(|e| parse_error(line, e))?;
    let first_arc = parse_arc_index(fields[1], m).map_err(|e| parse_error(line, e))?;
    let utils = parse_utils(line, &fields[2..], types.vertex_kinds(), n, m)?;

    Ok(RawVertex {
        line,
        name: name.to_string(),
        first_arc,
        utils,
    })
}

fn parse_arc(
    line: usize,
    record: &str,
    types: &UtilTypes,
    n: usize,
    m: usize,
) -> Result<RawArc, GbError> {
    let fields = fields_of(line, record, 3)?;
    let tip = parse_vertex_ref(fields[0], n).map_err(|e| parse_error(line, e))?;
    let next = parse_arc_index(fields[1], m).map_err(|e| parse_error(line, e))?;
    let len = parse_int(fields[2]).map_err(|e| parse_error(line, e))?;
    let utils = parse_utils(line, &fields[3..], types.arc_kinds(), n, m)?;

    Ok(RawArc {
        line,
        tip,
        next,
        len,
        utils,
    })
}

fn parse_utils(
    line: usize,
    fields: &[&str],
    kinds: &[UtilKind],
    n: usize,
    m: usize,
) -> Result<Vec<(usize, RawUtil)>, GbError> {
    let declared: Vec<(usize, UtilKind)> = kinds
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, kind)| *kind != UtilKind::Unused)
        .collect();
    if fields.len() != declared.len() {
        return Err(parse_error(
            line,
            format!(
                "expected {} utility fields, found {}",
                declared.len(),
                fields.len()
            ),
        ));
    }

    declared
        .into_iter()
        .zip(fields)
        .map(|((slot, kind), field)| {
            let value = match kind {
                UtilKind::Int => parse_int(field).map(RawUtil::Int),
                UtilKind::Str => unquote(field).map(|s| RawUtil::Str(s.to_string())),
                UtilKind::Vertex => parse_vertex_ref(field, n).map(RawUtil::Vertex),
                UtilKind::Arc => parse_arc_index(field, m).map(RawUtil::Arc),
                UtilKind::Unused | UtilKind::Graph => {
                    return Err(GbError::UnsupportedUtil(kind.code()))
                }
            };
            value
                .map(|value| (slot, value))
                .map_err(|e| parse_error(line, e))
        })
        .collect()
}

fn assemble(
    raw_graph: RawGraph,
    vertices: Vec<RawVertex>,
    arcs: Vec<RawArc>,
    types: UtilTypes,
) -> Result<Graph, GbError> {
    let mut graph = Graph::with_capacity(vertices.len());
    graph.set_id(&raw_graph.id);
    graph.set_util_types(types)?;

    for vertex in &vertices {
        if graph.find(&vertex.name).is_some() {
            warn!(
                line = vertex.line,
                name = %vertex.name,
                "duplicate vertex name; lookups resolve to the first"
            );
        }
        graph.push_vertex(&vertex.name);
    }

    let mut claimed = vec![false; arcs.len()];
    let mut arc_ids: Vec<Option<ArcId>> = vec![None; arcs.len()];
    for (index, vertex) in vertices.iter().enumerate() {
        let mut chain = Vec::new();
        let mut cursor = vertex.first_arc;
        while let Some(k) = cursor {
            if claimed[k] {
                return Err(parse_error(
                    arcs[k].line,
                    format!("arc A{} is on more than one arc list", k),
                ));
            }
            claimed[k] = true;
            chain.push(k);
            cursor = arcs[k].next;
        }

        let tail = VertexId::new(index);
        for &k in chain.iter().rev() {
            let VertexRef::Id(tip) = arcs[k].tip else {
                return Err(parse_error(
                    arcs[k].line,
                    format!("arc A{} does not point to a vertex", k),
                ));
            };
            arc_ids[k] = Some(graph.add_arc_between(tail, tip, arcs[k].len)?);
        }
    }
    if let Some(k) = claimed.iter().position(|claimed| !claimed) {
        return Err(parse_error(
            arcs[k].line,
            format!("arc A{} is not on any vertex's arc list", k),
        ));
    }
    let arc_ids: Vec<ArcId> = arc_ids.into_iter().flatten().collect();

    for (slot, raw) in raw_graph.utils {
        let util = resolve(&mut graph, raw, &arc_ids);
        graph.set_graph_util(slot, util)?;
    }
    for (index, vertex) in vertices.into_iter().enumerate() {
        for (slot, raw) in vertex.utils {
            let util = resolve(&mut graph, raw, &arc_ids);
            graph.set_vertex_util(VertexId::new(index), slot, util)?;
        }
    }
    for (arc, raw_arc) in arc_ids.iter().zip(arcs) {
        for (slot, raw) in raw_arc.utils {
            let util = resolve(&mut graph, raw, &arc_ids);
            graph.set_arc_util(*arc, slot, util)?;
        }
    }
    Ok(graph)
}

fn resolve(graph: &mut Graph, raw: RawUtil, arc_ids: &[ArcId]) -> Util {
    match raw {
        RawUtil::Int(value) => Util::Int(value),
        RawUtil::Str(text) => Util::Str(graph.intern(&text)),
        RawUtil::Vertex(vertex) => Util::Vertex(vertex),
        RawUtil::Arc(index) => Util::Arc(index.map(|k| arc_ids[k])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_gb;

    fn with_checksum(body: &str) -> String {
        let mut checksum = Checksum::new();
        for line in body.lines() {
            checksum.update_line(line);
        }
        format!("{}{}{}\n", body, CHECKSUM_PREFIX, checksum.value())
    }

    fn read_str(text: &str) -> Result<Graph, GbError> {
        read_gb(text.as_bytes())
    }

    #[test]
    fn test_reads_two_vertex_graph() {
        let text = with_checksum(
            "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V,1A)\n\
             \"senses\",2,1\n\
             * Vertices\n\
             \"look\",A0\n\
             \"feel\",0\n\
             * Arcs\n\
             V1,0,1\n",
        );
        let graph = read_str(&text).unwrap();

        assert_eq!(graph.id(), "senses");
        assert_eq!(graph.n(), 2);
        assert_eq!(graph.m(), 1);

        let look = graph.find("look").unwrap();
        let arcs = graph.out_arcs(look);
        assert_eq!(arcs.len(), 1);
        assert_eq!(graph.name(arcs[0].tip), Some("feel"));
        assert_eq!(arcs[0].arc.len, 1);
    }

    #[test]
    fn test_joins_continued_lines() {
        let text = with_checksum(
            "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,1V,0A)\n\
             \"gr\\\n\
             aph\",\n\
             1,0\n\
             * Vertices\n\
             \"*starts with a star\\\n\
             *\",\n\
             0\n\
             * Arcs\n",
        );
        let graph = read_str(&text).unwrap();

        assert_eq!(graph.id(), "graph");
        assert_eq!(graph.name(VertexId::new(0)), Some("*starts with a star*"));
    }

    #[test]
    fn test_detects_checksum_mismatch() {
        let mut graph = Graph::new();
        graph.add_arc("look", "feel", 1);
        let mut out = Vec::new();
        write_gb(&graph, &mut out).unwrap();

        let tampered = String::from_utf8(out).unwrap().replace("\"feel\"", "\"fell\"");
        let err = read_str(&tampered).unwrap_err();
        assert!(matches!(err, GbError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_rejects_bad_header() {
        let err = read_str("GraphBase?\n").unwrap_err();
        assert!(matches!(err, GbError::Parse { line: 1, .. }));

        let err = read_str("* GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V)\n").unwrap_err();
        assert!(matches!(err, GbError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_rejects_graph_utils() {
        let err = read_str("* GraphBase graph (util_types ZZZZZZZZGZZZZZ,0V,0A)\n").unwrap_err();
        assert!(matches!(err, GbError::UnsupportedUtil('G')));
    }

    #[test]
    fn test_rejects_count_mismatch() {
        let text = "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V,1A)\n\"g\",3,1\n";
        let err = read_str(text).unwrap_err();
        assert!(matches!(err, GbError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_rejects_out_of_range_pointer() {
        let text = "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,1V,1A)\n\
                    \"g\",1,1\n\
                    * Vertices\n\
                    \"a\",A0\n\
                    * Arcs\n\
                    V1,0,1\n";
        let err = read_str(text).unwrap_err();
        assert!(matches!(err, GbError::Parse { line: 6, .. }));
    }

    #[test]
    fn test_rejects_orphan_arc() {
        let text = with_checksum(
            "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,1V,1A)\n\
             \"g\",1,1\n\
             * Vertices\n\
             \"a\",0\n\
             * Arcs\n\
             V0,0,1\n",
        );
        let err = read_str(&text).unwrap_err();
        assert!(
            matches!(err, GbError::Parse { line: 6, ref message } if message.contains("not on any"))
        );
    }

    #[test]
    fn test_rejects_shared_arc_lists() {
        let text = with_checksum(
            "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V,1A)\n\
             \"g\",2,1\n\
             * Vertices\n\
             \"a\",A0\n\
             \"b\",A0\n\
             * Arcs\n\
             V0,0,1\n",
        );
        let err = read_str(&text).unwrap_err();
        assert!(
            matches!(err, GbError::Parse { ref message, .. } if message.contains("more than one"))
        );
    }

    #[test]
    fn test_rejects_truncated_file() {
        let text = "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V,0A)\n\
                    \"g\",2,0\n\
                    * Vertices\n\
                    \"a\",0\n";
        let err = read_str(text).unwrap_err();
        assert!(
            matches!(err, GbError::Parse { ref message, .. } if message.contains("end of file"))
        );
    }

    #[test]
    fn test_rejects_oversized_counts() {
        let text = "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,18446744073709551615V,0A)\n\
                    \"g\",18446744073709551615,0\n\
                    * Vertices\n\
                    \"a\",0\n";
        let err = read_str(text).unwrap_err();
        assert!(
            matches!(err, GbError::Parse { ref message, .. } if message.contains("end of file"))
        );
    }

    #[test]
    fn test_rejects_content_after_checksum() {
        let mut graph = Graph::new();
        graph.add_arc("look", "feel", 1);
        let mut out = Vec::new();
        write_gb(&graph, &mut out).unwrap();

        let mut text = String::from_utf8(out).unwrap();
        text.push_str("\n\"stray\",0\n");
        let err = read_str(&text).unwrap_err();
        assert!(matches!(
            err,
            GbError::Parse { line: 10, ref message } if message.contains("after checksum")
        ));
    }

    #[test]
    fn test_rejects_section_in_place_of_record() {
        let text = "* GraphBase graph (util_types ZZZZZZZZZZZZZZ,2V,0A)\n\
                    \"g\",2,0\n\
                    * Vertices\n\
                    \"a\",0\n\
                    * Arcs\n";
        let err = read_str(text).unwrap_err();
        assert!(matches!(err, GbError::Parse { line: 5, .. }));
    }

    #[test]
    fn test_reads_marker_and_null_vertex_utils() {
        let text = with_checksum(
            "* GraphBase graph (util_types VZZZZZZZZZZZZZ,2V,0A)\n\
             \"g\",2,0\n\
             * Vertices\n\
             \"a\",0,1\n\
             \"b\",0,0\n\
             * Arcs\n",
        );
        let graph = read_str(&text).unwrap();

        let a = graph.vertex(VertexId::new(0)).unwrap();
        let b = graph.vertex(VertexId::new(1)).unwrap();
        assert_eq!(a.utils[0], Util::Vertex(VertexRef::Marker));
        assert_eq!(b.utils[0], Util::Vertex(VertexRef::Null));
    }
}
