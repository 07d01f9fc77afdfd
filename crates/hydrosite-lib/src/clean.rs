//! Input line cleanup: dissolve touching lines of the same category.
//!
//! River networks are often digitized as many short pieces per reach. Plants
//! may only span a single line, so pieces that share an endpoint and a
//! category are joined into one polyline first.

use std::collections::BTreeMap;

use tracing::debug;

use crate::geometry::{Point, RiverLine};

/// Dissolve `lines` by category.
///
/// Consecutive duplicate vertices are removed, parts left with fewer than two
/// vertices are dropped, and parts of the same category whose endpoints
/// coincide are chained (reversing a part when needed) until no join is left.
/// Output is ordered by category, then by first appearance in the input.
pub fn clean_lines(lines: &[RiverLine]) -> Vec<RiverLine> {
    let mut by_category: BTreeMap<u32, Vec<Vec<Point>>> = BTreeMap::new();
    for line in lines {
        let vertices = dedup_vertices(&line.vertices);
        if vertices.len() >= 2 {
            by_category.entry(line.category).or_default().push(vertices);
        }
    }

    let mut cleaned = Vec::new();
    for (category, parts) in by_category {
        let before = parts.len();
        let merged = dissolve(parts);
        debug!(category, before, after = merged.len(), "dissolved river parts");
        cleaned.extend(
            merged
                .into_iter()
                .map(|vertices| RiverLine::new(category, vertices)),
        );
    }
    cleaned
}

fn dedup_vertices(vertices: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(vertices.len());
    for &vertex in vertices {
        if out.last() != Some(&vertex) {
            out.push(vertex);
        }
    }
    out
}

fn dissolve(mut pending: Vec<Vec<Point>>) -> Vec<Vec<Point>> {
    let mut merged = Vec::new();

    while !pending.is_empty() {
        let mut chain = pending.remove(0);
        loop {
            let Some((position, join)) = find_join(&chain, &pending) else {
                break;
            };
            let part = pending.remove(position);
            join.apply(&mut chain, part);
        }
        merged.push(chain);
    }

    merged
}

#[derive(Debug, Clone, Copy)]
enum Join {
    /// part.start == chain.end
    Append,
    /// part.end == chain.end
    AppendReversed,
    /// part.end == chain.start
    Prepend,
    /// part.start == chain.start
    PrependReversed,
}

impl Join {
    fn apply(self, chain: &mut Vec<Point>, mut part: Vec<Point>) {
        match self {
            Join::Append => chain.extend(part.into_iter().skip(1)),
            Join::AppendReversed => {
                part.reverse();
                chain.extend(part.into_iter().skip(1));
            }
            Join::Prepend => {
                part.pop();
                part.append(chain);
                *chain = part;
            }
            Join::PrependReversed => {
                part.reverse();
                part.pop();
                part.append(chain);
                *chain = part;
            }
        }
    }
}

fn find_join(chain: &[Point], pending: &[Vec<Point>]) -> Option<(usize, Join)> {
    let (start, end) = (chain.first()?, chain.last()?);
    if start == end {
        return None;
    }
    pending.iter().enumerate().find_map(|(position, part)| {
        let (part_start, part_end) = (part.first()?, part.last()?);
        let join = if part_start == end {
            Join::Append
        } else if part_end == start {
            Join::Prepend
        } else if part_end == end {
            Join::AppendReversed
        } else if part_start == start {
            Join::PrependReversed
        } else {
            return None;
        };
        Some((position, join))
    })
}
