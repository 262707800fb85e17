use graphbase_graph::{Graph, Util, UtilKind, UtilSlot, VertexRef};
use graphbase_io::{load_gb, read_gb, save_gb, write_gb, write_gb_with, GbConfig};
use std::collections::HashMap;

fn round_trip(graph: &Graph, config: &GbConfig) -> Graph {
    let mut out = Vec::new();
    write_gb_with(graph, &mut out, config).unwrap();
    read_gb(out.as_slice()).unwrap()
}

fn arc_triples(graph: &Graph) -> HashMap<(String, String, i64), usize> {
    let mut triples = HashMap::new();
    for arc in graph.arcs() {
        let key = (
            graph.name(arc.tail).unwrap().to_string(),
            graph.name(arc.tip).unwrap().to_string(),
            arc.arc.len,
        );
        *triples.entry(key).or_insert(0) += 1;
    }
    triples
}

#[test]
fn test_look_feel() {
    let mut graph = Graph::with_capacity(3);
    graph.add_arc("look", "feel", 1);

    assert_eq!(graph.n(), 2, "Sum was incorrect, got: {}, want: {}.", graph.n(), 2);

    let mut out = Vec::new();
    write_gb(&graph, &mut out).unwrap();
    assert!(!out.is_empty());
    assert_eq!(graph.n(), 2);
}

#[test]
fn test_empty_graph_round_trip() {
    let graph = Graph::new();
    let copy = round_trip(&graph, &GbConfig::default());

    assert_eq!(copy.n(), 0);
    assert_eq!(copy.m(), 0);
    assert_eq!(copy.id(), graph.id());
}

#[test]
fn test_round_trip_preserves_arcs_and_order() {
    let mut graph = Graph::new();
    graph.set_id("senses");
    graph.add_arc("look", "feel", 1);
    graph.add_arc("look", "hear", -2);
    graph.add_arc("hear", "hear", 0);
    graph.add_arc("look", "feel", 1);
    graph.add_edge("taste", "smell", 7);
    graph.add_arc("", "look", 3);

    let copy = round_trip(&graph, &GbConfig::default());

    assert_eq!(copy.id(), "senses");
    assert_eq!(copy.n(), graph.n());
    assert_eq!(copy.m(), graph.m());
    assert_eq!(arc_triples(&copy), arc_triples(&graph));

    for (id, vertex) in graph.vertices() {
        assert_eq!(copy.name(id), Some(vertex.name.as_str()));
        let original: Vec<(usize, i64)> = graph
            .out_arcs(id)
            .iter()
            .map(|a| (a.tip.index(), a.arc.len))
            .collect();
        let restored: Vec<(usize, i64)> = copy
            .out_arcs(id)
            .iter()
            .map(|a| (a.tip.index(), a.arc.len))
            .collect();
        assert_eq!(original, restored);
    }
}

#[test]
fn test_round_trip_preserves_utils() {
    let mut graph = Graph::new();
    let first = graph.add_arc("a", "b", 1);
    let second = graph.add_arc("b", "c", 2);
    let a = graph.find("a").unwrap();
    let c = graph.find("c").unwrap();

    graph.set_util_type(UtilSlot::Vertex(0), UtilKind::Str).unwrap();
    graph.set_util_type(UtilSlot::Vertex(5), UtilKind::Vertex).unwrap();
    graph.set_util_type(UtilSlot::Arc(1), UtilKind::Arc).unwrap();
    graph.set_util_type(UtilSlot::Graph(2), UtilKind::Int).unwrap();

    let label = graph.intern("start, here");
    graph.set_vertex_util(a, 0, Util::Str(label)).unwrap();
    graph.set_vertex_util(a, 5, Util::Vertex(VertexRef::Id(c))).unwrap();
    graph.set_vertex_util(c, 5, Util::Vertex(VertexRef::Marker)).unwrap();
    graph.set_arc_util(first, 1, Util::Arc(Some(second))).unwrap();
    graph.set_graph_util(2, Util::Int(i64::MIN)).unwrap();

    let copy = round_trip(&graph, &GbConfig::default());

    assert_eq!(copy.util_types(), graph.util_types());
    assert_eq!(copy.utils()[2], Util::Int(i64::MIN));

    let copy_a = copy.vertex(a).unwrap();
    assert_eq!(copy_a.utils[0], Util::Str("start, here".into()));
    assert_eq!(copy_a.utils[5], Util::Vertex(VertexRef::Id(c)));
    assert_eq!(copy.vertex(c).unwrap().utils[5], Util::Vertex(VertexRef::Marker));

    let copy_first = copy.out_arcs(a)[0];
    let copy_second = copy.out_arcs(copy.find("b").unwrap())[0];
    assert_eq!(copy_first.arc.utils[1], Util::Arc(Some(copy_second.id)));
    assert_eq!(copy_second.arc.utils[1], Util::Arc(None));
}

#[test]
fn test_long_names_wrap_and_round_trip() {
    let config = GbConfig { line_width: 40 };
    let long_name = "abcdefghij".repeat(12);
    let other = format!("{}\\tail", "x".repeat(37));
    let mut graph = Graph::new();
    graph.set_id(&"id".repeat(30));
    graph.add_arc(&long_name, &other, 1);

    let mut out = Vec::new();
    write_gb_with(&graph, &mut out, &config).unwrap();
    let text = String::from_utf8(out.clone()).unwrap();
    for line in text.lines().filter(|line| !line.starts_with('*')) {
        assert!(line.len() <= 40, "line too long: {}", line);
    }

    let copy = read_gb(out.as_slice()).unwrap();
    assert_eq!(copy.id(), graph.id());
    assert!(copy.find(&long_name).is_some());
    assert!(copy.find(&other).is_some());
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("senses.gb");

    let mut graph = Graph::with_capacity(3);
    graph.add_arc("look", "feel", 1);
    save_gb(&graph, &path).unwrap();

    let loaded = load_gb(&path).unwrap();
    assert_eq!(loaded.n(), 2);
    assert_eq!(loaded.m(), 1);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_gb(dir.path().join("absent.gb")).unwrap_err();
    assert!(matches!(err, graphbase_io::GbError::Io(_)));
}
