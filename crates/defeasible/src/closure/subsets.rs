use crate::{kb::KnowledgeBase, logic::Formula};

/// The `k`-element subsets of `0..n` as sorted index vectors, in
/// lexicographic order.
pub(crate) struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        let current = if k <= n { Some((0..k).collect()) } else { None };
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let res = self.current.take()?;
        let k = res.len();

        let mut next = res.clone();
        // Rightmost position that can still move up
        let pivot = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        if let Some(i) = pivot {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            self.current = Some(next);
        }

        Some(res)
    }
}

pub(crate) fn subsets_of_size(kb: &KnowledgeBase, k: usize) -> impl Iterator<Item = KnowledgeBase> + '_ {
    let formulas: Vec<&Formula> = kb.iter().collect();
    Combinations::new(formulas.len(), k)
        .map(move |idx| idx.into_iter().map(|i| formulas[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_knowledge_base;

    #[test]
    fn combinations() {
        let c: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ],
            c
        );
    }

    #[test]
    fn edge_sizes() {
        assert_eq!(vec![Vec::<usize>::new()], Combinations::new(3, 0).collect::<Vec<_>>());
        assert_eq!(vec![vec![0, 1, 2]], Combinations::new(3, 3).collect::<Vec<_>>());
        assert_eq!(0, Combinations::new(2, 3).count());
        assert_eq!(10, Combinations::new(5, 3).count());
    }

    #[test]
    fn formula_subsets() {
        let kb = parse_knowledge_base("a; b; c").unwrap();
        let subs: Vec<_> = subsets_of_size(&kb, 2).collect();
        assert_eq!(3, subs.len());
        assert_eq!(parse_knowledge_base("a; b").unwrap(), subs[0]);
        assert_eq!(parse_knowledge_base("b; c").unwrap(), subs[2]);
    }
}
