//! Force-directed node placement
//!
//! Fruchterman-Reingold spring layout with a seeded generator so that
//! identical input always produces identical coordinates. Positions are
//! centered on the origin and scaled so the furthest node sits at
//! distance 1.0 on its dominant axis.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ITERATIONS: usize = 50;

/// Minimum node separation used when two nodes coincide.
const MIN_DISTANCE: f64 = 1e-4;

/// A node position in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Compute a spring layout for `node_count` nodes connected by `edges`
/// (pairs of node indices).
///
/// The same `seed`, `iterations`, and input produce the same output.
pub fn spring_layout(
    node_count: usize,
    edges: &[(usize, usize)],
    seed: u64,
    iterations: usize,
) -> Vec<Position> {
    if node_count == 0 {
        return Vec::new();
    }
    if node_count == 1 {
        return vec![Position::default()];
    }

    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut positions: Vec<Position> = (0..node_count)
        .map(|_| Position {
            x: rng.gen_range(-1.0..1.0),
            y: rng.gen_range(-1.0..1.0),
        })
        .collect();

    // Ideal spring length for a 2x2 layout area.
    let k = (4.0 / node_count as f64).sqrt();

    // Linear cooling, starting at a tenth of the layout extent.
    let mut temperature = 0.2;
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut disp = vec![Position::default(); node_count];

        // Repulsion between every node pair.
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / distance;
                let fx = dx / distance * force;
                let fy = dy / distance * force;
                disp[i].x += fx;
                disp[i].y += fy;
                disp[j].x -= fx;
                disp[j].y -= fy;
            }
        }

        // Attraction along edges.
        for &(from, to) in edges {
            if from >= node_count || to >= node_count || from == to {
                continue;
            }
            let dx = positions[from].x - positions[to].x;
            let dy = positions[from].y - positions[to].y;
            let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let force = distance * distance / k;
            let fx = dx / distance * force;
            let fy = dy / distance * force;
            disp[from].x -= fx;
            disp[from].y -= fy;
            disp[to].x += fx;
            disp[to].y += fy;
        }

        // Move each node, capped by the current temperature.
        for i in 0..node_count {
            let length = (disp[i].x * disp[i].x + disp[i].y * disp[i].y).sqrt();
            if length > 0.0 {
                let step = length.min(temperature);
                positions[i].x += disp[i].x / length * step;
                positions[i].y += disp[i].y / length * step;
            }
        }

        temperature -= cooling;
        if temperature <= 0.0 {
            break;
        }
    }

    rescale(&mut positions);
    positions
}

/// Center positions on the origin and normalize the maximum absolute
/// coordinate to 1.0.
fn rescale(positions: &mut [Position]) {
    let n = positions.len() as f64;
    let cx = positions.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = positions.iter().map(|p| p.y).sum::<f64>() / n;

    let mut max_abs: f64 = 0.0;
    for p in positions.iter_mut() {
        p.x -= cx;
        p.y -= cy;
        max_abs = max_abs.max(p.x.abs()).max(p.y.abs());
    }

    if max_abs > 0.0 {
        for p in positions.iter_mut() {
            p.x /= max_abs;
            p.y /= max_abs;
        }
    }
}
