//! Plain-text summary of a loaded transaction network
//!
//! Generates a short stdout-friendly overview of what the visualization
//! will contain: account and transaction counts, node categories, and
//! the before/after split.

use std::io::{self, Write};

use crate::graph::TransactionGraph;
use crate::render::NodeCategory;

/// Write a summary of the network to the given writer.
pub fn generate_summary<W: Write>(graph: &TransactionGraph, writer: &mut W) -> io::Result<()> {
    let mut short_codes = 0usize;
    let mut reset_parties = 0usize;
    let mut credit_parties = 0usize;
    for id in graph.node_ids() {
        match NodeCategory::classify(id, graph) {
            NodeCategory::ShortCode => short_codes += 1,
            NodeCategory::ResetParty => reset_parties += 1,
            NodeCategory::CreditParty => credit_parties += 1,
        }
    }

    let mut before = 0usize;
    let mut after = 0usize;
    let mut total_amount = 0.0f64;
    for (_, _, edge) in graph.edges() {
        if edge.relative_time == 0 {
            before += 1;
        } else {
            after += 1;
        }
        total_amount += edge.amount;
    }

    writeln!(writer, "SIM Swap Network Summary")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Accounts: {} | Transactions: {}",
        graph.node_count(),
        graph.edge_count()
    )?;
    writeln!(
        writer,
        "  Short codes: {} | Reset parties: {} | Credit parties: {}",
        short_codes, reset_parties, credit_parties
    )?;
    writeln!(
        writer,
        "  Before reset: {} | After reset: {}",
        before, after
    )?;
    writeln!(writer, "  Total amount: {:.2}", total_amount)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::graph::tests::{record, table};

    #[test]
    fn test_summary_counts() {
        let graph = build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000001", "1002", 1),
        ]))
        .unwrap();

        let mut output = Vec::new();
        generate_summary(&graph, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("Accounts: 3 | Transactions: 2"));
        assert!(text.contains("Short codes: 2 | Reset parties: 1 | Credit parties: 0"));
        assert!(text.contains("Before reset: 1 | After reset: 1"));
        assert!(text.contains("Total amount: 50000.00"));
    }

    #[test]
    fn test_summary_empty_graph() {
        let graph = build_graph(&table(Vec::new())).unwrap();

        let mut output = Vec::new();
        generate_summary(&graph, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("Accounts: 0 | Transactions: 0"));
    }
}
