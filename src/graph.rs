//! Transaction graph assembly
//!
//! Turns the loaded table into an undirected multigraph: accounts become
//! nodes, every transaction row becomes its own edge between the reset
//! account and the credited account.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use thiserror::Error;

use crate::loader::{SchemaError, TransactionRecord, TransactionTable};

/// Columns the builder reads by name when extracting edge attributes.
pub const EDGE_ATTRIBUTE_COLUMNS: [&str; 7] = [
    "PIN RESET MSISDN",
    "DEBIT PARTY",
    "CREDIT PARTY",
    "CREDIT PARTY SHORTCODE/MSISDN",
    "TRANSACTION TIME",
    "TRANSACTION ID",
    "TRANSACTION AMOUNT",
];

/// Errors that can occur while building the graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Attributes carried by every edge: the record's selected columns plus
/// the derived before/after indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEdge {
    pub reset_msisdn: String,
    pub debit_party: String,
    pub credit_party: String,
    pub credit_shortcode: String,
    pub relative_time: u8,
    pub transaction_time: String,
    pub transaction_id: String,
    pub amount: f64,
}

impl From<&TransactionRecord> for TransactionEdge {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            reset_msisdn: record.reset_msisdn.clone(),
            debit_party: record.debit_party.clone(),
            credit_party: record.credit_party.clone(),
            credit_shortcode: record.credit_shortcode.clone(),
            relative_time: record.relative_time,
            transaction_time: record.transaction_time.clone(),
            transaction_id: record.transaction_id.clone(),
            amount: record.amount,
        }
    }
}

/// The assembled network: one node per distinct account identifier, one
/// edge per transaction row (parallel edges preserved).
///
/// Built once from a table and never mutated afterwards.
#[derive(Debug, Default)]
pub struct TransactionGraph {
    graph: UnGraph<String, TransactionEdge>,
    reset_accounts: HashSet<String>,
}

impl TransactionGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node identifiers in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Whether this account appears as a reset account in any row.
    pub fn is_reset_account(&self, id: &str) -> bool {
        self.reset_accounts.contains(id)
    }

    /// Edges as `(source index, target index, attributes)`, with node
    /// indices matching the [`node_ids`](Self::node_ids) order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &TransactionEdge)> {
        self.graph.edge_indices().filter_map(|edge| {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            Some((a.index(), b.index(), &self.graph[edge]))
        })
    }

    pub fn edge_weight(&self, edge: EdgeIndex) -> Option<&TransactionEdge> {
        self.graph.edge_weight(edge)
    }
}

/// Build the transaction graph from a loaded table.
///
/// Depends on named-column access into the table, so the required
/// columns are re-checked here; a missing one is the same schema
/// mismatch the loader raises.
pub fn build_graph(table: &TransactionTable) -> Result<TransactionGraph, GraphError> {
    table.require_columns(&EDGE_ATTRIBUTE_COLUMNS)?;

    let mut graph = UnGraph::new_undirected();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();
    let mut reset_accounts = HashSet::new();

    for record in &table.records {
        let source = intern(&mut graph, &mut index_of, &record.reset_msisdn);
        let target = intern(&mut graph, &mut index_of, &record.credit_party);
        graph.add_edge(source, target, TransactionEdge::from(record));
        reset_accounts.insert(record.reset_msisdn.clone());
    }

    Ok(TransactionGraph {
        graph,
        reset_accounts,
    })
}

fn intern(
    graph: &mut UnGraph<String, TransactionEdge>,
    index_of: &mut HashMap<String, NodeIndex>,
    id: &str,
) -> NodeIndex {
    if let Some(&index) = index_of.get(id) {
        return index;
    }
    let index = graph.add_node(id.to_string());
    index_of.insert(id.to_string(), index);
    index
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::loader::TransactionTable;
    use chrono::NaiveDate;

    pub(crate) fn record(
        reset_msisdn: &str,
        credit_party: &str,
        relative_time: u8,
    ) -> TransactionRecord {
        let midnight = |d: u32| {
            NaiveDate::from_ymd_opt(2018, 8, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        TransactionRecord {
            reset_time: midnight(21),
            reset_msisdn: reset_msisdn.to_string(),
            compare_time: midnight(if relative_time == 0 { 22 } else { 20 }),
            debit_party: "JOHN DOE".to_string(),
            credit_party: credit_party.to_string(),
            credit_shortcode: "255710000002".to_string(),
            transaction_time: "2018-08-22 11:30:00".to_string(),
            transaction_id: "TX100".to_string(),
            amount: 25000.0,
            relative_time,
        }
    }

    pub(crate) fn table(records: Vec<TransactionRecord>) -> TransactionTable {
        TransactionTable {
            columns: EDGE_ATTRIBUTE_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            records,
        }
    }

    #[test]
    fn test_one_edge_per_record() {
        let graph = build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000001", "1002", 1),
        ]))
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_parallel_edges_preserved() {
        let graph = build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000001", "1001", 1),
            record("255700000001", "1001", 1),
        ]))
        .unwrap();

        // Same account pair, three transactions, three edges.
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_node_set_is_union_of_both_sides() {
        let graph = build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000002", "255700000001", 1),
        ]))
        .unwrap();

        let ids: Vec<&str> = graph.node_ids().collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"255700000001"));
        assert!(ids.contains(&"255700000002"));
        assert!(ids.contains(&"1001"));
    }

    #[test]
    fn test_reset_account_membership() {
        let graph = build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000002", "255700000001", 1),
        ]))
        .unwrap();

        assert!(graph.is_reset_account("255700000001"));
        assert!(graph.is_reset_account("255700000002"));
        assert!(!graph.is_reset_account("1001"));
    }

    #[test]
    fn test_edge_attributes_carried_over() {
        let graph = build_graph(&table(vec![record("255700000001", "1001", 1)])).unwrap();

        let (_, _, edge) = graph.edges().next().unwrap();
        assert_eq!(edge.reset_msisdn, "255700000001");
        assert_eq!(edge.credit_party, "1001");
        assert_eq!(edge.debit_party, "JOHN DOE");
        assert_eq!(edge.credit_shortcode, "255710000002");
        assert_eq!(edge.relative_time, 1);
        assert_eq!(edge.transaction_id, "TX100");
        assert_eq!(edge.amount, 25000.0);
    }

    #[test]
    fn test_edge_endpoints_are_valid_nodes() {
        let graph = build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000001", "1002", 1),
        ]))
        .unwrap();

        let n = graph.node_count();
        for (source, target, _) in graph.edges() {
            assert!(source < n);
            assert!(target < n);
        }
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let mut bad = table(vec![record("255700000001", "1001", 0)]);
        bad.columns.retain(|c| c != "TRANSACTION ID");

        let err = build_graph(&bad).unwrap_err();
        let GraphError::Schema(SchemaError(key)) = err;
        assert_eq!(key, "TRANSACTION ID");
    }

    #[test]
    fn test_empty_table() {
        let graph = build_graph(&table(Vec::new())).unwrap();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
