//! GB writer.
//!
//! Arcs are numbered by walking vertices in id order and each vertex's
//! out-arcs newest first, so every arc list is a run of consecutive arc
//! lines in the file.

use crate::checksum::Checksum;
use crate::config::GbConfig;
use crate::error::GbError;
use crate::format::{
    encode_arc_index, encode_vertex_ref, is_encodable, ARCS_MARK, CHECKSUM_PREFIX, CONTINUATION,
    HEADER_PREFIX, QUOTE, SEP, VERTICES_MARK,
};
use graphbase_graph::{ArcId, ArcRef, Graph, Util, UtilKind, VertexRef};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Writes `graph` to `out` in GB format with the default configuration.
pub fn write_gb<W: Write>(graph: &Graph, out: &mut W) -> Result<(), GbError> {
    write_gb_with(graph, out, &GbConfig::default())
}

/// Writes `graph` to `out` in GB format.
pub fn write_gb_with<W: Write>(
    graph: &Graph,
    out: &mut W,
    config: &GbConfig,
) -> Result<(), GbError> {
    config.validate()?;

    let numbering = ArcNumbering::new(graph);
    let types = graph.util_types();
    let mut records = RecordWriter::new(out, config.line_width);

    records.line(&format!(
        "{}{}{}{}V{}{}A)",
        HEADER_PREFIX,
        types,
        SEP,
        graph.n(),
        SEP,
        graph.m()
    ))?;

    records.string_field("graph id", graph.id())?;
    records.field(&graph.n().to_string())?;
    records.field(&graph.m().to_string())?;
    write_utils(&mut records, types.graph_kinds(), graph.utils(), &numbering)?;
    records.end_record()?;

    records.line(VERTICES_MARK)?;
    for (id, vertex) in graph.vertices() {
        records.string_field("vertex name", &vertex.name)?;
        records.field(&encode_arc_index(numbering.first[id.index()]))?;
        write_utils(&mut records, types.vertex_kinds(), &vertex.utils, &numbering)?;
        records.end_record()?;
    }

    records.line(ARCS_MARK)?;
    for (index, arc) in numbering.order.iter().enumerate() {
        records.field(&encode_vertex_ref(VertexRef::Id(arc.tip)))?;
        records.field(&encode_arc_index(numbering.next[index]))?;
        records.field(&arc.arc.len.to_string())?;
        write_utils(&mut records, types.arc_kinds(), &arc.arc.utils, &numbering)?;
        records.end_record()?;
    }

    let sum = records.checksum();
    records.line(&format!("{}{}", CHECKSUM_PREFIX, sum))?;
    out.flush()?;

    debug!(
        id = graph.id(),
        vertices = graph.n(),
        arcs = graph.m(),
        checksum = sum,
        "wrote GB graph"
    );
    Ok(())
}

/// Writes `graph` to a GB file at `path`.
pub fn save_gb<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<(), GbError> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_gb(graph, &mut out)?;
    info!("Saved graph '{}' to {}", graph.id(), path.display());
    Ok(())
}

fn write_utils<W: Write>(
    records: &mut RecordWriter<'_, W>,
    kinds: &[UtilKind],
    values: &[Util],
    numbering: &ArcNumbering<'_>,
) -> Result<(), GbError> {
    for (kind, util) in kinds.iter().zip(values) {
        match (kind, util) {
            (UtilKind::Unused, _) => {}
            (UtilKind::Str, Util::Str(text)) => records.string_field("string utility", text)?,
            (UtilKind::Str, _) => records.string_field("string utility", "")?,
            (UtilKind::Int, Util::Int(value)) => records.field(&value.to_string())?,
            (UtilKind::Vertex, Util::Vertex(vertex)) => {
                records.field(&encode_vertex_ref(*vertex))?
            }
            (UtilKind::Arc, Util::Arc(Some(arc))) => {
                let index = numbering.index.get(arc).copied().ok_or_else(|| {
                    GbError::Unencodable {
                        what: "arc reference",
                        value: format!("A{}", arc.index()),
                    }
                })?;
                records.field(&encode_arc_index(Some(index)))?
            }
            (UtilKind::Graph, _) => return Err(GbError::UnsupportedUtil(kind.code())),
            // Declared slots that were never set write their null value.
            _ => records.field("0")?,
        }
    }
    Ok(())
}

/// File positions of arcs.
struct ArcNumbering<'g> {
    order: Vec<ArcRef<'g>>,
    index: HashMap<ArcId, usize>,
    /// Per vertex, the position of its first arc.
    first: Vec<Option<usize>>,
    /// Per arc position, the position of the next arc on the same list.
    next: Vec<Option<usize>>,
}

impl<'g> ArcNumbering<'g> {
    fn new(graph: &'g Graph) -> Self {
        let mut numbering = Self {
            order: Vec::with_capacity(graph.m()),
            index: HashMap::with_capacity(graph.m()),
            first: Vec::with_capacity(graph.n()),
            next: Vec::with_capacity(graph.m()),
        };

        for (id, _) in graph.vertices() {
            let arcs = graph.out_arcs(id);
            let start = numbering.order.len();
            numbering
                .first
                .push(if arcs.is_empty() { None } else { Some(start) });

            let count = arcs.len();
            for (offset, arc) in arcs.into_iter().enumerate() {
                let position = start + offset;
                numbering.index.insert(arc.id, position);
                numbering
                    .next
                    .push((offset + 1 < count).then_some(position + 1));
                numbering.order.push(arc);
            }
        }
        numbering
    }
}

/// Lays fields out on lines no wider than the configured width.
///
/// A record breaks after a separator, or inside a string with a trailing
/// continuation mark. One column is kept free on every line for that mark.
struct RecordWriter<'a, W: Write> {
    out: &'a mut W,
    limit: usize,
    line: String,
    fields: usize,
    checksum: Checksum,
}

impl<'a, W: Write> RecordWriter<'a, W> {
    fn new(out: &'a mut W, width: usize) -> Self {
        Self {
            out,
            limit: width - 1,
            line: String::with_capacity(width),
            fields: 0,
            checksum: Checksum::new(),
        }
    }

    fn checksum(&self) -> u64 {
        self.checksum.value()
    }

    /// Writes a complete line outside of any record.
    fn line(&mut self, text: &str) -> Result<(), GbError> {
        self.checksum.update_line(text);
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush_line(&mut self) -> Result<(), GbError> {
        let line = std::mem::take(&mut self.line);
        self.line(&line)
    }

    /// Starts a new field, breaking the line first if `width` columns won't fit.
    fn separate(&mut self, width: usize) -> Result<(), GbError> {
        if self.fields > 0 {
            self.line.push(SEP);
            if self.line.len() + width > self.limit {
                self.flush_line()?;
            }
        }
        self.fields += 1;
        Ok(())
    }

    fn field(&mut self, text: &str) -> Result<(), GbError> {
        self.separate(text.len())?;
        self.line.push_str(text);
        Ok(())
    }

    fn string_field(&mut self, what: &'static str, text: &str) -> Result<(), GbError> {
        if !is_encodable(text) {
            return Err(GbError::Unencodable {
                what,
                value: text.to_string(),
            });
        }

        let quoted = format!("{}{}{}", QUOTE, text, QUOTE);
        if quoted.len() <= self.limit {
            return self.field(&quoted);
        }

        if self.fields > 0 {
            self.line.push(SEP);
            if self.line.len() >= self.limit {
                self.flush_line()?;
            }
        }
        self.fields += 1;
        for ch in quoted.chars() {
            if self.line.len() + ch.len_utf8() > self.limit {
                self.line.push(CONTINUATION);
                self.flush_line()?;
            }
            self.line.push(ch);
        }
        Ok(())
    }

    fn end_record(&mut self) -> Result<(), GbError> {
        if self.fields > 0 {
            self.flush_line()?;
        }
        self.fields = 0;
        Ok(())
    }
}
