//! Weighted discrete sampling
//!
//! Two strategies over a finite `{item: weight}` distribution:
//! - Roulette: linear scan, no precompute. Used for spawn pools that change
//!   whenever the level does.
//! - Alias (Vose): O(n) table build, O(1) draw. Used for fixed distributions
//!   that are sampled often, like powerup drops.
//!
//! Weights that are zero, negative or not finite never win a draw. A
//! distribution whose usable total is zero is "exhausted" and yields the
//! caller-supplied fallback item instead of failing.

use rand::Rng;

/// Anything that can draw an item from a weighted distribution
pub trait WeightedSampler<T> {
    /// Draw one item. Never fails: exhausted distributions return the fallback.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T;

    /// True when no item has a usable weight
    fn is_exhausted(&self) -> bool;
}

/// Clamp unusable weights to zero
#[inline]
fn usable(weight: f32) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight as f64
    } else {
        0.0
    }
}

/// Linear-scan weighted pick over borrowed items.
///
/// Draws uniformly in `[0, total)`, subtracts weights in list order and returns
/// the first item where the remainder drops to zero or below. Floating point
/// residue that survives the scan lands on the last item with positive weight.
/// Returns `None` when the total usable weight is zero.
pub fn roulette<'a, T, R, F>(items: &'a [T], weight_of: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    let total: f64 = items.iter().map(|item| usable(weight_of(item))).sum();
    if total <= 0.0 {
        return None;
    }

    let mut remaining = rng.random::<f64>() * total;
    let mut last_positive = None;
    for item in items {
        let weight = usable(weight_of(item));
        if weight <= 0.0 {
            continue;
        }
        last_positive = Some(item);
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(item);
        }
    }

    last_positive
}

/// Owned roulette distribution with a fallback item
#[derive(Debug, Clone)]
pub struct Roulette<T> {
    entries: Vec<(T, f32)>,
    fallback: T,
}

impl<T> Roulette<T> {
    pub fn new(entries: impl IntoIterator<Item = (T, f32)>, fallback: T) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            fallback,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> WeightedSampler<T> for Roulette<T> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        match roulette(&self.entries, |(_, w)| *w, rng) {
            Some((item, _)) => item,
            None => {
                log::warn!("roulette distribution exhausted, using fallback item");
                &self.fallback
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.entries.iter().all(|(_, w)| usable(*w) <= 0.0)
    }
}

/// Vose alias table
///
/// Only items with usable weight get a column, so a column's own item and its
/// alias always have positive probability.
#[derive(Debug, Clone)]
pub struct AliasTable<T> {
    items: Vec<T>,
    prob: Vec<f64>,
    alias: Vec<usize>,
    fallback: T,
}

impl<T> AliasTable<T> {
    /// Build the table in O(n)
    pub fn new(entries: impl IntoIterator<Item = (T, f32)>, fallback: T) -> Self {
        let (items, weights): (Vec<T>, Vec<f64>) = entries
            .into_iter()
            .map(|(item, w)| (item, usable(w)))
            .filter(|(_, w)| *w > 0.0)
            .unzip();

        let n = items.len();
        let total: f64 = weights.iter().sum();
        let mut prob = vec![0.0; n];
        let mut alias = vec![0; n];

        if n > 0 && total > 0.0 {
            // Scale so the average column holds exactly 1.0
            let mut scaled: Vec<f64> = weights.iter().map(|w| w * n as f64 / total).collect();
            let mut small: Vec<usize> = Vec::with_capacity(n);
            let mut large: Vec<usize> = Vec::with_capacity(n);
            for (i, &p) in scaled.iter().enumerate() {
                if p < 1.0 {
                    small.push(i);
                } else {
                    large.push(i);
                }
            }

            while let Some(l) = small.pop() {
                let Some(g) = large.pop() else {
                    small.push(l);
                    break;
                };
                prob[l] = scaled[l];
                alias[l] = g;
                scaled[g] = (scaled[g] + scaled[l]) - 1.0;
                if scaled[g] < 1.0 {
                    small.push(g);
                } else {
                    large.push(g);
                }
            }

            // Leftovers are full columns; anything still in `small` is rounding residue
            for g in large {
                prob[g] = 1.0;
                alias[g] = g;
            }
            for l in small {
                prob[l] = 1.0;
                alias[l] = l;
            }
        }

        Self {
            items,
            prob,
            alias,
            fallback,
        }
    }

    /// Number of columns (items with usable weight)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Probability of keeping column `i`'s own item
    pub fn column(&self, i: usize) -> Option<(&T, f64, &T)> {
        let own = self.items.get(i)?;
        let alias = &self.items[self.alias[i]];
        Some((own, self.prob[i], alias))
    }
}

impl<T> WeightedSampler<T> for AliasTable<T> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        if self.items.is_empty() {
            log::warn!("alias table exhausted, using fallback item");
            return &self.fallback;
        }
        let column = rng.random_range(0..self.items.len());
        if rng.random::<f64>() < self.prob[column] {
            &self.items[column]
        } else {
            &self.items[self.alias[column]]
        }
    }

    fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }
}
