//! Interactive HTML rendering of the transaction network
//!
//! Generates a single self-contained HTML document with embedded CSS,
//! JavaScript, and graph payload. The page draws the precomputed layout
//! on a canvas and wires up hover tooltips, tap selection, panning, and
//! wheel zoom. No external assets are referenced.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::graph::TransactionGraph;
use crate::layout::{self, spring_layout};

/// Output file, written to the working directory.
pub const OUTPUT_FILE: &str = "TZ_SimSwap_Network.html";

pub const PLOT_TITLE: &str = "Tanzania SIM Swaps & PIN Resets 21-28 August 2018";

/// Logical pixel size of the square canvas.
pub const CANVAS_SIZE: u32 = 800;

/// Half-extent of the plot axes; the layout fits inside this range.
pub const AXIS_RANGE: f64 = 1.1;

/// Node palette: short codes, reset parties, other credit parties.
pub const NODE_PALETTE: [&str; 3] = ["#808080", "#B22222", "#FFA07A"];

/// Edge palette indexed by the relative-time flag. Note the assignment
/// is inverted relative to natural 0..1 palette order: 1 maps to
/// firebrick, 0 to mediumseagreen. Changing it changes the rendered
/// output, so it stays as-is.
pub const EDGE_PALETTE: [&str; 2] = ["mediumseagreen", "firebrick"];

/// Identifiers shorter than a full MSISDN are treated as short codes.
pub const SHORTCODE_LEN: usize = 12;

/// Presentation category of a node, derived from its identifier and
/// from whether it appears as a reset account anywhere in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    /// Identifier shorter than a full MSISDN.
    ShortCode,
    /// Full-length identifier seen as a reset account.
    ResetParty,
    /// Full-length identifier seen only on the credit side.
    CreditParty,
}

impl NodeCategory {
    /// Classify a node. The length check wins over reset membership.
    ///
    /// The length threshold is a proxy for "short code vs. MSISDN" and
    /// is known to be fragile for non-numeric identifiers; it is kept
    /// as-is because changing it would alter the visible output.
    pub fn classify(id: &str, graph: &TransactionGraph) -> Self {
        if id.len() < SHORTCODE_LEN {
            NodeCategory::ShortCode
        } else if graph.is_reset_account(id) {
            NodeCategory::ResetParty
        } else {
            NodeCategory::CreditParty
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            NodeCategory::ShortCode => NODE_PALETTE[0],
            NodeCategory::ResetParty => NODE_PALETTE[1],
            NodeCategory::CreditParty => NODE_PALETTE[2],
        }
    }
}

/// Layout parameters for a render run.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub seed: u64,
    pub iterations: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            seed: layout::DEFAULT_SEED,
            iterations: layout::DEFAULT_ITERATIONS,
        }
    }
}

/// Errors that can occur while writing the HTML output
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write HTML output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode graph payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct NodePayload {
    id: String,
    x: f64,
    y: f64,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct EdgePayload {
    source: usize,
    target: usize,
    color: &'static str,
    rmsisdn: String,
    rname: String,
    crmsisdn: String,
    crname: String,
}

#[derive(Debug, Serialize)]
struct GraphPayload {
    nodes: Vec<NodePayload>,
    edges: Vec<EdgePayload>,
}

/// Render the network to [`OUTPUT_FILE`] in the working directory,
/// overwriting any existing file. Returns the path written.
pub fn render_network(
    graph: &TransactionGraph,
    options: &RenderOptions,
) -> Result<PathBuf, RenderError> {
    let path = PathBuf::from(OUTPUT_FILE);
    render_to(graph, options, &path)?;
    Ok(path)
}

/// Render the network to an explicit path.
pub fn render_to(
    graph: &TransactionGraph,
    options: &RenderOptions,
    path: &Path,
) -> Result<(), RenderError> {
    let payload = graph_payload(graph, options);
    let html = build_html(&serde_json::to_string(&payload)?);
    fs::write(path, html)?;
    Ok(())
}

/// Lay out the graph and assemble the serializable payload the embedded
/// renderer consumes.
fn graph_payload(graph: &TransactionGraph, options: &RenderOptions) -> GraphPayload {
    let edge_endpoints: Vec<(usize, usize)> = graph
        .edges()
        .map(|(source, target, _)| (source, target))
        .collect();
    let positions = spring_layout(
        graph.node_count(),
        &edge_endpoints,
        options.seed,
        options.iterations,
    );

    let nodes = graph
        .node_ids()
        .zip(&positions)
        .map(|(id, position)| NodePayload {
            id: id.to_string(),
            x: position.x,
            y: position.y,
            color: NodeCategory::classify(id, graph).color(),
        })
        .collect();

    let edges = graph
        .edges()
        .map(|(source, target, edge)| EdgePayload {
            source,
            target,
            color: if edge.relative_time == 1 {
                EDGE_PALETTE[1]
            } else {
                EDGE_PALETTE[0]
            },
            rmsisdn: edge.reset_msisdn.clone(),
            rname: edge.debit_party.clone(),
            crmsisdn: edge.credit_party.clone(),
            crname: edge.credit_shortcode.clone(),
        })
        .collect();

    GraphPayload { nodes, edges }
}

fn build_html(payload_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <div id="plot">
            <canvas id="network" width="{size}" height="{size}"></canvas>
            <div id="tooltip" hidden></div>
        </div>
        <p class="hint">Hover an edge for transaction details. Click to select. Drag to pan, scroll to zoom.</p>
    </div>
    <script>
const GRAPH = {payload};
const AXIS_RANGE = {range};
{js}
    </script>
</body>
</html>"#,
        title = PLOT_TITLE,
        css = inline_css(),
        size = CANVAS_SIZE,
        payload = payload_json,
        range = AXIS_RANGE,
        js = inline_js(),
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    color: #111827;
    background: #ffffff;
    margin: 0;
}

.container {
    max-width: 900px;
    margin: 0 auto;
    padding: 1.5rem;
}

h1 {
    font-size: 1.25rem;
    font-weight: 600;
    margin: 0 0 1rem 0;
}

#plot {
    position: relative;
    width: fit-content;
}

#network {
    border: 1px solid #e5e7eb;
    cursor: default;
    display: block;
}

#tooltip {
    position: absolute;
    pointer-events: none;
    background: #ffffff;
    border: 1px solid #d1d5db;
    border-radius: 0.25rem;
    box-shadow: 0 2px 6px rgba(0, 0, 0, 0.15);
    padding: 0.5rem 0.75rem;
    font-size: 0.8rem;
    white-space: nowrap;
    z-index: 10;
}

#tooltip .label {
    color: #6b7280;
    margin-right: 0.5rem;
}

.hint {
    color: #6b7280;
    font-size: 0.8rem;
}
"#
}

/// Inline JavaScript: canvas renderer with hover, tap-select, pan, and
/// wheel zoom over the embedded GRAPH payload.
fn inline_js() -> &'static str {
    r#"
(function() {
    const canvas = document.getElementById('network');
    const ctx = canvas.getContext('2d');
    const tooltip = document.getElementById('tooltip');
    const SIZE = canvas.width;

    // World [-AXIS_RANGE, AXIS_RANGE] to screen pixels, y flipped.
    let scale = SIZE / (2 * AXIS_RANGE);
    let offsetX = SIZE / 2;
    let offsetY = SIZE / 2;

    let hoverEdge = -1;
    let hoverNode = -1;
    let hoverLinked = new Set();
    let selectedEdge = -1;
    let selectedNodes = new Set();

    let dragging = false;
    let dragMoved = false;
    let lastX = 0;
    let lastY = 0;

    function toScreen(n) {
        return { x: n.x * scale + offsetX, y: -n.y * scale + offsetY };
    }

    function draw() {
        ctx.clearRect(0, 0, SIZE, SIZE);

        GRAPH.edges.forEach(function(e, i) {
            const a = toScreen(GRAPH.nodes[e.source]);
            const b = toScreen(GRAPH.nodes[e.target]);
            const active = i === hoverEdge || i === selectedEdge;
            ctx.globalAlpha = active ? 1.0 : 0.5;
            ctx.lineWidth = active ? 5 : 3;
            ctx.strokeStyle = e.color;
            ctx.beginPath();
            ctx.moveTo(a.x, a.y);
            ctx.lineTo(b.x, b.y);
            ctx.stroke();
        });

        ctx.globalAlpha = 1.0;
        GRAPH.nodes.forEach(function(n, i) {
            const p = toScreen(n);
            let radius = 7;
            if (selectedNodes.has(i)) radius = 10;
            if (i === hoverNode || hoverLinked.has(i)) radius = 15;
            ctx.fillStyle = n.color;
            ctx.strokeStyle = n.color;
            ctx.beginPath();
            ctx.arc(p.x, p.y, radius, 0, 2 * Math.PI);
            ctx.fill();
            ctx.stroke();
        });
    }

    function nodeAt(x, y) {
        for (let i = GRAPH.nodes.length - 1; i >= 0; i--) {
            const p = toScreen(GRAPH.nodes[i]);
            const dx = x - p.x;
            const dy = y - p.y;
            if (dx * dx + dy * dy <= 9 * 9) return i;
        }
        return -1;
    }

    function edgeAt(x, y) {
        for (let i = GRAPH.edges.length - 1; i >= 0; i--) {
            const e = GRAPH.edges[i];
            const a = toScreen(GRAPH.nodes[e.source]);
            const b = toScreen(GRAPH.nodes[e.target]);
            if (segmentDistance(x, y, a, b) <= 4) return i;
        }
        return -1;
    }

    function segmentDistance(x, y, a, b) {
        const vx = b.x - a.x;
        const vy = b.y - a.y;
        const len2 = vx * vx + vy * vy;
        let t = len2 > 0 ? ((x - a.x) * vx + (y - a.y) * vy) / len2 : 0;
        t = Math.max(0, Math.min(1, t));
        const px = a.x + t * vx;
        const py = a.y + t * vy;
        return Math.hypot(x - px, y - py);
    }

    function showTooltip(edge, x, y) {
        const rows = [
            ['Reset No.', edge.rmsisdn],
            ['Reset Name', edge.rname],
            ['Credit No.', edge.crmsisdn],
            ['Creditor Name', edge.crname]
        ];
        tooltip.innerHTML = rows.map(function(r) {
            return '<div><span class="label">' + r[0] + '</span>' + escapeHtml(r[1]) + '</div>';
        }).join('');
        tooltip.style.left = (x + 14) + 'px';
        tooltip.style.top = (y + 14) + 'px';
        tooltip.hidden = false;
    }

    function escapeHtml(value) {
        const div = document.createElement('div');
        div.textContent = value == null ? '' : String(value);
        return div.innerHTML;
    }

    function updateHover(x, y) {
        hoverNode = nodeAt(x, y);
        hoverEdge = hoverNode === -1 ? edgeAt(x, y) : -1;
        hoverLinked.clear();

        if (hoverEdge !== -1) {
            // Hovering an edge also highlights its endpoints.
            const e = GRAPH.edges[hoverEdge];
            hoverLinked.add(e.source);
            hoverLinked.add(e.target);
            showTooltip(e, x, y);
        } else {
            tooltip.hidden = true;
        }

        canvas.style.cursor =
            hoverNode !== -1 || hoverEdge !== -1 ? 'pointer' : 'default';
    }

    canvas.addEventListener('mousemove', function(event) {
        const rect = canvas.getBoundingClientRect();
        const x = event.clientX - rect.left;
        const y = event.clientY - rect.top;

        if (dragging) {
            offsetX += x - lastX;
            offsetY += y - lastY;
            lastX = x;
            lastY = y;
            dragMoved = true;
            tooltip.hidden = true;
        } else {
            updateHover(x, y);
        }
        draw();
    });

    canvas.addEventListener('mousedown', function(event) {
        dragging = true;
        dragMoved = false;
        const rect = canvas.getBoundingClientRect();
        lastX = event.clientX - rect.left;
        lastY = event.clientY - rect.top;
    });

    window.addEventListener('mouseup', function() {
        dragging = false;
    });

    canvas.addEventListener('mouseleave', function() {
        hoverEdge = -1;
        hoverNode = -1;
        hoverLinked.clear();
        tooltip.hidden = true;
        draw();
    });

    canvas.addEventListener('click', function(event) {
        if (dragMoved) return;
        const rect = canvas.getBoundingClientRect();
        const x = event.clientX - rect.left;
        const y = event.clientY - rect.top;

        selectedEdge = -1;
        selectedNodes.clear();

        const node = nodeAt(x, y);
        const edge = node === -1 ? edgeAt(x, y) : -1;
        if (node !== -1) {
            selectedNodes.add(node);
        } else if (edge !== -1) {
            // Selecting an edge also selects its endpoints.
            selectedEdge = edge;
            selectedNodes.add(GRAPH.edges[edge].source);
            selectedNodes.add(GRAPH.edges[edge].target);
        }
        draw();
    });

    canvas.addEventListener('wheel', function(event) {
        event.preventDefault();
        const rect = canvas.getBoundingClientRect();
        const x = event.clientX - rect.left;
        const y = event.clientY - rect.top;
        const factor = event.deltaY < 0 ? 1.1 : 1 / 1.1;

        // Zoom about the cursor.
        offsetX = x + (offsetX - x) * factor;
        offsetY = y + (offsetY - y) * factor;
        scale *= factor;
        draw();
    }, { passive: false });

    draw();
})();
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{record, table};
    use crate::graph::build_graph;

    fn two_row_graph() -> TransactionGraph {
        build_graph(&table(vec![
            record("255700000001", "1001", 0),
            record("255700000001", "1002", 1),
        ]))
        .unwrap()
    }

    #[test]
    fn test_classify_short_code() {
        let graph = two_row_graph();
        assert_eq!(
            NodeCategory::classify("1001", &graph),
            NodeCategory::ShortCode
        );
        assert_eq!(NodeCategory::classify("1001", &graph).color(), "#808080");
    }

    #[test]
    fn test_classify_reset_party() {
        let graph = two_row_graph();
        // Exactly 12 characters, present on the reset side.
        assert_eq!(
            NodeCategory::classify("255700000001", &graph),
            NodeCategory::ResetParty
        );
        assert_eq!(
            NodeCategory::classify("255700000001", &graph).color(),
            "#B22222"
        );
    }

    #[test]
    fn test_classify_credit_party() {
        let graph = build_graph(&table(vec![record("255700000001", "255719999999", 0)])).unwrap();
        assert_eq!(
            NodeCategory::classify("255719999999", &graph),
            NodeCategory::CreditParty
        );
        assert_eq!(
            NodeCategory::classify("255719999999", &graph).color(),
            "#FFA07A"
        );
    }

    #[test]
    fn test_length_check_wins_over_reset_membership() {
        // A short reset id still renders as a short code.
        let graph = build_graph(&table(vec![record("1234", "255719999999", 0)])).unwrap();
        assert_eq!(
            NodeCategory::classify("1234", &graph),
            NodeCategory::ShortCode
        );
    }

    #[test]
    fn test_payload_counts_and_colors() {
        let graph = two_row_graph();
        let payload = graph_payload(&graph, &RenderOptions::default());

        assert_eq!(payload.nodes.len(), 3);
        assert_eq!(payload.edges.len(), 2);

        let reset = payload
            .nodes
            .iter()
            .find(|n| n.id == "255700000001")
            .unwrap();
        assert_eq!(reset.color, "#B22222");

        // Before-reset transaction green, after-reset firebrick.
        assert_eq!(payload.edges[0].color, "mediumseagreen");
        assert_eq!(payload.edges[1].color, "firebrick");
    }

    #[test]
    fn test_payload_positions_within_axis_range() {
        let graph = two_row_graph();
        let payload = graph_payload(&graph, &RenderOptions::default());
        for node in &payload.nodes {
            assert!(node.x.abs() <= AXIS_RANGE);
            assert!(node.y.abs() <= AXIS_RANGE);
        }
    }

    #[test]
    fn test_payload_is_deterministic() {
        let graph = two_row_graph();
        let options = RenderOptions {
            seed: 9,
            iterations: 60,
        };
        let a = serde_json::to_string(&graph_payload(&graph, &options)).unwrap();
        let b = serde_json::to_string(&graph_payload(&graph, &options)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tooltip_fields_come_from_edge_attributes() {
        let graph = two_row_graph();
        let payload = graph_payload(&graph, &RenderOptions::default());

        let edge = &payload.edges[0];
        assert_eq!(edge.rmsisdn, "255700000001");
        assert_eq!(edge.rname, "JOHN DOE");
        assert_eq!(edge.crmsisdn, "1001");
        assert_eq!(edge.crname, "255710000002");
    }

    #[test]
    fn test_render_writes_self_contained_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.html");

        render_to(&two_row_graph(), &RenderOptions::default(), &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(PLOT_TITLE));
        assert!(html.contains("Reset No."));
        assert!(html.contains("Creditor Name"));
        assert!(html.contains("255700000001"));
        // Self-contained: no external references.
        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.html");
        std::fs::write(&path, "stale").unwrap();

        render_to(&two_row_graph(), &RenderOptions::default(), &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(PLOT_TITLE));
    }

    #[test]
    fn test_render_empty_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.html");

        let graph = build_graph(&table(Vec::new())).unwrap();
        render_to(&graph, &RenderOptions::default(), &path).unwrap();
        assert!(path.exists());
    }
}
