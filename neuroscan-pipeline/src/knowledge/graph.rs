//! Treatment graph utilities

use std::fmt::Write;

use neuroscan_client::neo4j::{GraphEdge, GraphNode};

pub const DETECTED_BY: &str = "DETECTED_BY";
pub const TREATED_BY: &str = "TREATED_BY";

/// Reference medical graph used to seed both lookup backends
pub fn medical_graph() -> Vec<GraphEdge> {
    let glioblastoma = GraphNode::new("Tumor", "Glioblastoma");
    vec![
        GraphEdge {
            source: glioblastoma.clone(),
            relation: DETECTED_BY.to_string(),
            target: GraphNode::new("Analysis", "MRI VGG19"),
        },
        GraphEdge {
            source: glioblastoma,
            relation: TREATED_BY.to_string(),
            target: GraphNode::new("Treatment", "Surgery + Radiotherapy"),
        },
    ]
}

/// Renders edges as a Graphviz digraph
pub fn to_dot(edges: &[GraphEdge]) -> String {
    let mut out = String::from("digraph medical {\n    rankdir=LR;\n");
    for edge in edges {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [label=\"{}\"];",
            escape(&edge.source.name),
            escape(&edge.target.name),
            escape(&edge.relation)
        );
    }
    out.push('}');
    out.push('\n');
    out
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medical_graph_links_glioblastoma() {
        let graph = medical_graph();
        assert_eq!(graph.len(), 2);
        assert!(graph.iter().all(|e| e.source.name == "Glioblastoma"));
        assert!(graph.iter().any(|e| e.relation == TREATED_BY));
    }

    #[test]
    fn test_dot_output() {
        let dot = to_dot(&medical_graph());
        assert!(dot.starts_with("digraph medical {"));
        assert!(dot.contains("\"Glioblastoma\" -> \"Surgery + Radiotherapy\" [label=\"TREATED_BY\"];"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let edge = GraphEdge {
            source: GraphNode::new("Tumor", "a\"b"),
            relation: "R".to_string(),
            target: GraphNode::new("T", "c"),
        };
        assert!(to_dot(&[edge]).contains("\"a\\\"b\""));
    }
}
