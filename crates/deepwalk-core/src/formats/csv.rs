//! CSV format support.
//!
//! Expects headerless `source,target` records. Extra columns (weights,
//! labels) are ignored; a record with a single column declares a node.

use crate::{Error, Graph, Result};
use std::io::Read;

/// CSV edge-list handler.
pub struct Csv;

impl Csv {
    /// Read a graph from CSV.
    pub fn read<R: Read>(reader: R, directed: bool) -> Result<Graph> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut graph = Graph::new(directed);

        for result in reader.records() {
            let record = result?;
            // Position counts skipped comment lines too.
            let line = record.position().map_or(0, |p| p.line() as usize);
            match record.len() {
                0 => {}
                1 if !record[0].is_empty() => {
                    graph.add_node(&record[0]);
                }
                1 => {}
                _ => {
                    if record[0].is_empty() || record[1].is_empty() {
                        return Err(Error::Parse {
                            line,
                            message: "empty node id".to_string(),
                        });
                    }
                    graph.add_edge(&record[0], &record[1]);
                }
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Adjacency;

    #[test]
    fn test_csv_two_and_three_columns() {
        let data = "a,b\nb,c,0.5\n# comment\nd\n";
        let g = Csv::read(data.as_bytes(), false).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree(3), 0);
    }

    #[test]
    fn test_csv_empty_id_rejected() {
        let data = "a,b\n,c\n";
        let err = Csv::read(data.as_bytes(), false).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_csv_error_line_counts_comments() {
        let err = Csv::read("# header\na,b\n,c\n".as_bytes(), false).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
        assert_eq!(err.to_string(), "parse error on line 3: empty node id");
    }
}
