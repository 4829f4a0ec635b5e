//! Minimum edit distance with configurable operation costs.
//!
//! With the default costs a substitution (2) costs as much as a delete plus
//! an insert, so the result is a weighted metric and not a character count.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCosts {
    pub insertion: u32,
    pub deletion: u32,
    pub substitution: u32,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            insertion: 1,
            deletion: 1,
            substitution: 2,
        }
    }
}

/// The full dynamic-programming table and its final cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDistance {
    /// `(source_len + 1) x (target_len + 1)` cost table.
    pub matrix: Vec<Vec<u32>>,
    pub distance: u32,
}

/// Compute the weighted distance table between `source` and `target`.
pub fn edit_distance_matrix(source: &str, target: &str, costs: &EditCosts) -> EditDistance {
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();
    let (m, n) = (source.len(), target.len());

    let mut d = vec![vec![0u32; n + 1]; m + 1];
    for i in 1..=m {
        d[i][0] = d[i - 1][0].saturating_add(costs.deletion);
    }
    for j in 1..=n {
        d[0][j] = d[0][j - 1].saturating_add(costs.insertion);
    }

    for i in 1..=m {
        for j in 1..=n {
            let substitution = if source[i - 1] == target[j - 1] {
                0
            } else {
                costs.substitution
            };
            d[i][j] = d[i - 1][j]
                .saturating_add(costs.deletion)
                .min(d[i][j - 1].saturating_add(costs.insertion))
                .min(d[i - 1][j - 1].saturating_add(substitution));
        }
    }

    let distance = d[m][n];
    EditDistance { matrix: d, distance }
}

/// Weighted minimum edit distance from `source` to `target`.
pub fn min_edit_distance(source: &str, target: &str, costs: &EditCosts) -> u32 {
    edit_distance_matrix(source, target, costs).distance
}
