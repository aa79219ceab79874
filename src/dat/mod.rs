use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    num,
};

use crate::instance::*;

use fnv::FnvHashSet;
use thiserror::Error;

// Instance files are line based:
//   1) number of nodes
//   2) number of arcs
//   3) one `index tail head weight` record per arc
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("missing {0} line")]
    MissingHeader(&'static str),
    #[error("line {line}: expected `index tail head weight`, got {found:?}")]
    MalformedRecord { line: usize, found: String },
    #[error("declared {declared} arcs but found {found} records")]
    ArcCountMismatch { declared: usize, found: usize },
    #[error("line {line}: arc index {index} is outside 0..{arc_count}")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        arc_count: usize,
    },
    #[error("line {line}: arc index {index} appears twice")]
    DuplicateIndex { line: usize, index: usize },
    #[error("declared {declared} nodes, more than {arc_count} arcs can touch")]
    NodeCountOutOfRange { declared: usize, arc_count: usize },
    #[error("invalid graph")]
    Graph(#[from] GraphError),
    #[error("io error")]
    IO(#[from] io::Error),
    #[error("not a valid value")]
    ParseError(#[from] num::ParseIntError),
}

type Result<T> = std::result::Result<T, FormatError>;

pub fn parse(filename: &str) -> Result<Graph> {
    let file = File::open(filename)?;
    read(BufReader::new(file))
}

pub fn parse_str(contents: &str) -> Result<Graph> {
    read(contents.as_bytes())
}

pub fn read<R: BufRead>(reader: R) -> Result<Graph> {
    // Blank lines carry nothing, keep the original line numbers for errors
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(ix, line)| line.map(|l| (ix + 1, l)))
        .filter(|l| match l {
            Ok((_, line)) => !line.trim().is_empty(),
            // Keep errors! We need to terminate ASAP
            _ => true,
        });

    let mut header = |what: &'static str| -> Result<usize> {
        match lines.next() {
            Some(line) => Ok(line?.1.trim().parse::<usize>()?),
            None => Err(FormatError::MissingHeader(what)),
        }
    };
    let node_count = header("node count")?;
    let arc_count = header("arc count")?;

    // Sized by the records actually present, never by the headers
    let mut records: Vec<ArcRecord> = vec![];
    let mut seen = FnvHashSet::default();
    let mut found = 0;
    for line in lines {
        let (line_no, text) = line?;
        found += 1;
        if found > arc_count {
            continue;
        }
        let record = ArcRecord::parse(line_no, &text)?;
        if record.index >= arc_count {
            return Err(FormatError::IndexOutOfRange {
                line: line_no,
                index: record.index,
                arc_count,
            });
        }
        if !seen.insert(record.index) {
            return Err(FormatError::DuplicateIndex {
                line: line_no,
                index: record.index,
            });
        }
        records.push(record);
    }

    if found != arc_count {
        return Err(FormatError::ArcCountMismatch {
            declared: arc_count,
            found,
        });
    }

    // Nodes beyond what the arcs can touch are isolated and only inflate the model
    if node_count > arc_count.saturating_mul(2).saturating_add(1) {
        return Err(FormatError::NodeCountOutOfRange {
            declared: node_count,
            arc_count,
        });
    }

    // Indices are unique, in range and as many as declared, so sorting restores index order
    records.sort_unstable_by_key(|r| r.index);
    let arcs = records
        .into_iter()
        .map(|r| Arc::new(r.tail, r.head, r.weight))
        .collect();
    Ok(Graph::new(node_count, arcs)?)
}

/// Writes `graph` in the format `read` accepts. Arcs are written as stored, i.e. oriented away
/// from the root.
pub fn write<W: Write>(graph: &Graph, out: &mut W) -> Result<()> {
    writeln!(out, "{}", graph.node_count())?;
    writeln!(out, "{}", graph.forward_count())?;
    for ix in 0..graph.forward_count() {
        let arc = graph.arc(graph.forward(ix));
        writeln!(out, "{} {} {} {}", ix, arc.tail.0, arc.head.0, arc.weight)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct ArcRecord {
    index: usize,
    tail: usize,
    head: usize,
    weight: u64,
}

impl ArcRecord {
    fn parse(line: usize, text: &str) -> Result<Self> {
        let words: Vec<&str> = text.split_ascii_whitespace().collect();
        if words.len() != 4 {
            return Err(FormatError::MalformedRecord {
                line,
                found: text.to_string(),
            });
        }
        Ok(Self {
            index: words[0].parse::<usize>()?,
            tail: words[1].parse::<usize>()?,
            head: words[2].parse::<usize>()?,
            weight: words[3].parse::<u64>()?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SMALL: &str = "4\n5\n0 0 1 1\n1 0 2 5\n2 1 2 1\n3 1 3 2\n4 2 3 1\n";

    #[test]
    fn test_parse_small_instance() {
        let g = parse_str(SMALL).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.forward_count(), 5);
        assert_eq!(g.arc_count(), 8);
        assert_eq!(g.weight(g.forward(1)), 5);
    }

    #[test]
    fn test_records_may_come_in_any_order() {
        let g = parse_str("3\n2\n1 1 2 7\n0 0 1 3\n").unwrap();
        assert_eq!(g.arc(g.forward(0)).head, Node(1));
        assert_eq!(g.weight(g.forward(1)), 7);
    }

    #[test]
    fn test_write_then_read() {
        let g = parse_str(SMALL).unwrap();
        let mut buf = vec![];
        write(&g, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), SMALL);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse_str("4\n"),
            Err(FormatError::MissingHeader("arc count"))
        ));
        assert!(matches!(
            parse_str(""),
            Err(FormatError::MissingHeader("node count"))
        ));
    }

    #[test]
    fn test_record_count_mismatch() {
        assert!(matches!(
            parse_str("3\n3\n0 0 1 1\n1 1 2 1\n"),
            Err(FormatError::ArcCountMismatch {
                declared: 3,
                found: 2
            })
        ));
        assert!(matches!(
            parse_str("3\n1\n0 0 1 1\n1 1 2 1\n"),
            Err(FormatError::ArcCountMismatch {
                declared: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_bad_records() {
        assert!(matches!(
            parse_str("3\n1\n0 0 x 1\n"),
            Err(FormatError::ParseError(_))
        ));
        assert!(matches!(
            parse_str("3\n1\n0 0 1\n"),
            Err(FormatError::MalformedRecord { line: 3, .. })
        ));
        assert!(matches!(
            parse_str("3\n1\n0 0 1 -4\n"),
            Err(FormatError::ParseError(_))
        ));
        assert!(matches!(
            parse_str("3\n2\n0 0 1 1\n2 1 2 1\n"),
            Err(FormatError::IndexOutOfRange { index: 2, .. })
        ));
        assert!(matches!(
            parse_str("3\n2\n0 0 1 1\n0 1 2 1\n"),
            Err(FormatError::DuplicateIndex { line: 4, index: 0 })
        ));
        assert!(matches!(
            parse_str("3\n1\n0 0 3 1\n"),
            Err(FormatError::Graph(GraphError::EndpointOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_huge_headers_are_errors() {
        assert!(matches!(
            parse_str("4\n18446744073709551615\n0 0 1 1\n"),
            Err(FormatError::ArcCountMismatch { found: 1, .. })
        ));
        assert!(matches!(
            parse_str("18446744073709551615\n1\n0 0 1 1\n"),
            Err(FormatError::NodeCountOutOfRange { arc_count: 1, .. })
        ));
        assert!(matches!(
            parse_str("18446744073709551615\n18446744073709551615\n0 0 1 1\n"),
            Err(FormatError::ArcCountMismatch { found: 1, .. })
        ));
    }

    #[test]
    fn test_node_count_limited_by_arcs() {
        // two arcs touch at most five nodes
        let g = parse_str("5\n2\n0 0 1 1\n1 2 3 1\n").unwrap();
        assert_eq!(g.node_count(), 5);
        assert!(matches!(
            parse_str("6\n2\n0 0 1 1\n1 2 3 1\n"),
            Err(FormatError::NodeCountOutOfRange {
                declared: 6,
                arc_count: 2
            })
        ));
    }
}
