//! Money-note multisets.
//!
//! Notes are fungible: a holding is just a count per face value. The map is
//! ordered so that equal holdings serialize to identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A multiset of money notes, keyed by face value.
///
/// ```
/// use kuhhandel::ledger::Notes;
///
/// let notes = Notes::from_counts([(0, 2), (10, 4), (50, 1)]);
/// assert_eq!(notes.total_value(), 90);
/// assert_eq!(notes.note_count(), 7);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Notes {
    counts: BTreeMap<u32, u32>,
}

impl Notes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(face value, count)` pairs. Zero counts are dropped.
    #[must_use]
    pub fn from_counts(counts: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut notes = Self::new();
        for (value, count) in counts {
            notes.add(value, count);
        }
        notes
    }

    /// Add `count` notes of `value`.
    pub fn add(&mut self, value: u32, count: u32) {
        if count > 0 {
            *self.counts.entry(value).or_insert(0) += count;
        }
    }

    /// Add every note of `other`.
    pub fn add_all(&mut self, other: &Notes) {
        for (value, count) in other.iter() {
            self.add(value, count);
        }
    }

    /// Remove every note of `other`.
    ///
    /// On shortage nothing is removed and the first short denomination is
    /// returned as `(value, requested, held)`.
    pub fn remove_all(&mut self, other: &Notes) -> Result<(), (u32, u32, u32)> {
        if let Some(shortage) = self.shortage(other) {
            return Err(shortage);
        }
        for (value, count) in other.iter() {
            if let Some(held) = self.counts.get_mut(&value) {
                *held -= count;
                if *held == 0 {
                    self.counts.remove(&value);
                }
            }
        }
        Ok(())
    }

    /// The first denomination where `other` asks for more than is held.
    #[must_use]
    pub fn shortage(&self, other: &Notes) -> Option<(u32, u32, u32)> {
        other.iter().find_map(|(value, requested)| {
            let held = self.count(value);
            (requested > held).then_some((value, requested, held))
        })
    }

    /// Whether `other` is a sub-multiset of `self`.
    #[must_use]
    pub fn contains(&self, other: &Notes) -> bool {
        self.shortage(other).is_none()
    }

    /// Number of notes of one face value.
    #[must_use]
    pub fn count(&self, value: u32) -> u32 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Total number of notes (what opponents can see).
    #[must_use]
    pub fn note_count(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Sum of face values.
    #[must_use]
    pub fn total_value(&self) -> u64 {
        self.counts
            .iter()
            .map(|(&value, &count)| u64::from(value) * u64::from(count))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(face value, count)` pairs in ascending face value.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().map(|(&v, &c)| (v, c))
    }

    /// Every note individually, ascending.
    pub fn each_note(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter()
            .flat_map(|(value, count)| std::iter::repeat(value).take(count as usize))
    }

    /// Smallest face value held.
    #[must_use]
    pub fn smallest(&self) -> Option<u32> {
        self.counts.keys().next().copied()
    }

    /// For every reachable total, the sub-multiset reaching it with the fewest
    /// notes. Zero-value notes never appear in a combination.
    ///
    /// Bounded-multiplicity subset sum: holdings stay small (a few dozen
    /// notes) so the table has at most a few hundred entries.
    #[must_use]
    pub fn combinations(&self) -> BTreeMap<u64, Notes> {
        let mut reachable: BTreeMap<u64, Notes> = BTreeMap::new();
        reachable.insert(0, Notes::new());

        for (value, held) in self.iter().filter(|&(v, _)| v > 0) {
            let mut next = reachable.clone();
            for (&sum, combo) in &reachable {
                for k in 1..=held {
                    let total = sum + u64::from(value) * u64::from(k);
                    let notes = combo.note_count() + k;
                    let better = next
                        .get(&total)
                        .map_or(true, |existing| notes < existing.note_count());
                    if better {
                        let mut candidate = combo.clone();
                        candidate.add(value, k);
                        next.insert(total, candidate);
                    }
                }
            }
            reachable = next;
        }
        reachable
    }

    /// Fewest-notes combination with the smallest total `>= amount`.
    #[must_use]
    pub fn cover(&self, amount: u64) -> Option<Notes> {
        self.combinations()
            .range(amount..)
            .next()
            .map(|(_, notes)| notes.clone())
    }

    /// Fewest-notes combination with the largest total `<= amount`.
    #[must_use]
    pub fn best_within(&self, amount: u64) -> Notes {
        self.combinations()
            .range(..=amount)
            .next_back()
            .map(|(_, notes)| notes.clone())
            .unwrap_or_default()
    }

    /// Notes for exactly `amount` from an unlimited supply.
    ///
    /// Largest denomination first when that lands exactly (it does for the
    /// standard table), otherwise the fewest notes that do. `None` if the
    /// positive denominations cannot form `amount`.
    #[must_use]
    pub fn mint(amount: u64, denominations: &[u32]) -> Option<Notes> {
        let mut positive: Vec<u32> = denominations.iter().copied().filter(|&d| d > 0).collect();
        positive.sort_unstable_by(|a, b| b.cmp(a));
        positive.dedup();

        let mut notes = Notes::new();
        let mut remaining = amount;
        for &value in &positive {
            let count = remaining / u64::from(value);
            if count > 0 {
                notes.add(value, u32::try_from(count).ok()?);
                remaining -= count * u64::from(value);
            }
        }
        if remaining == 0 {
            Some(notes)
        } else {
            Self::mint_fewest(amount, &positive)
        }
    }

    /// Unbounded change-making over multiples of the denominations' gcd.
    fn mint_fewest(amount: u64, positive: &[u32]) -> Option<Notes> {
        let unit = positive.iter().fold(0, |g, &d| gcd(g, u64::from(d)));
        if unit == 0 || amount % unit != 0 {
            return None;
        }
        let target = usize::try_from(amount / unit).ok()?;
        let steps: Vec<(u32, usize)> = positive
            .iter()
            .filter_map(|&d| Some((d, usize::try_from(u64::from(d) / unit).ok()?)))
            .collect();

        // fewest[i]: note count reaching i units; last[i]: the note added last.
        let mut fewest = vec![u32::MAX; target + 1];
        let mut last = vec![0u32; target + 1];
        fewest[0] = 0;
        for i in 1..=target {
            for &(value, step) in &steps {
                if step <= i && fewest[i - step] != u32::MAX && fewest[i - step] + 1 < fewest[i] {
                    fewest[i] = fewest[i - step] + 1;
                    last[i] = value;
                }
            }
        }
        if fewest[target] == u32::MAX {
            return None;
        }

        let mut notes = Notes::new();
        let mut i = target;
        while i > 0 {
            let value = last[i];
            notes.add(value, 1);
            i -= usize::try_from(u64::from(value) / unit).ok()?;
        }
        Some(notes)
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl FromIterator<u32> for Notes {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut notes = Notes::new();
        for value in iter {
            notes.add(value, 1);
        }
        notes
    }
}

impl std::fmt::Display for Notes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let parts: Vec<String> = self.iter().map(|(v, c)| format!("{c}x{v}")).collect();
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starting() -> Notes {
        Notes::from_counts([(0, 2), (10, 4), (50, 1)])
    }

    #[test]
    fn test_totals() {
        let notes = starting();
        assert_eq!(notes.total_value(), 90);
        assert_eq!(notes.note_count(), 7);
        assert_eq!(notes.smallest(), Some(0));
        assert_eq!(notes.to_string(), "2x0 4x10 1x50");
    }

    #[test]
    fn test_zero_counts_are_canonical() {
        let a = Notes::from_counts([(10, 0), (50, 1)]);
        let b: Notes = [50].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove_all_is_all_or_nothing() {
        let mut notes = starting();
        let request = Notes::from_counts([(10, 2), (50, 2)]);
        assert_eq!(notes.remove_all(&request), Err((50, 2, 1)));
        assert_eq!(notes, starting());

        notes.remove_all(&Notes::from_counts([(10, 4)])).unwrap();
        assert_eq!(notes.count(10), 0);
        assert_eq!(notes.total_value(), 50);
        assert!(!notes.iter().any(|(v, _)| v == 10));
    }

    #[test]
    fn test_cover_prefers_exact() {
        let notes = starting();
        assert_eq!(notes.cover(60).unwrap(), Notes::from_counts([(10, 1), (50, 1)]));
        assert_eq!(notes.cover(50).unwrap(), Notes::from_counts([(50, 1)]));
        assert_eq!(notes.cover(0).unwrap(), Notes::new());
        assert!(notes.cover(100).is_none());
    }

    #[test]
    fn test_cover_overpays_minimally() {
        let notes = Notes::from_counts([(50, 1), (200, 1)]);
        assert_eq!(notes.cover(30).unwrap(), Notes::from_counts([(50, 1)]));
        assert_eq!(notes.cover(60).unwrap(), Notes::from_counts([(200, 1)]));
        assert_eq!(notes.cover(210).unwrap(), Notes::from_counts([(50, 1), (200, 1)]));
    }

    #[test]
    fn test_best_within() {
        let notes = Notes::from_counts([(10, 2), (50, 1)]);
        assert_eq!(notes.best_within(40), Notes::from_counts([(10, 2)]));
        assert_eq!(notes.best_within(5), Notes::new());
        assert_eq!(notes.best_within(1000).total_value(), 70);
    }

    #[test]
    fn test_combinations_skip_zero_notes() {
        let combos = starting().combinations();
        assert!(combos.values().all(|c| c.count(0) == 0));
        assert_eq!(combos.keys().copied().collect::<Vec<_>>(), vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
    }

    #[test]
    fn test_mint() {
        let denoms = [0, 10, 50, 100, 200, 500];
        assert_eq!(Notes::mint(1000, &denoms), Some(Notes::from_counts([(500, 2)])));
        assert_eq!(
            Notes::mint(160, &denoms),
            Some(Notes::from_counts([(100, 1), (50, 1), (10, 1)]))
        );
        assert_eq!(Notes::mint(0, &denoms), Some(Notes::new()));
    }

    #[test]
    fn test_mint_never_overpays() {
        let denoms = [0, 10, 50, 100, 200, 500];
        assert_eq!(Notes::mint(15, &denoms), None);
        assert_eq!(Notes::mint(10, &[0, 50, 100, 200, 500]), None);
        assert_eq!(Notes::mint(10, &[0]), None);
        assert_eq!(Notes::mint(10, &[]), None);
    }

    #[test]
    fn test_mint_finds_non_greedy_change() {
        // Largest-first takes 40 and is stuck at 20.
        assert_eq!(Notes::mint(60, &[30, 40]), Some(Notes::from_counts([(30, 2)])));
        assert_eq!(Notes::mint(110, &[30, 40]), Some(Notes::from_counts([(30, 1), (40, 2)])));
        assert_eq!(Notes::mint(50, &[30, 40]), None);
    }
}
