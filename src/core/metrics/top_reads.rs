use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub struct TopRead {
    pub length: u64,
    pub quality: f64,
    pub read_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RankBy {
    Length,
    Quality,
}

// equal keys keep the earlier row first
pub fn top_reads(
    lengths: &[u64],
    quals: &[f64],
    read_ids: Option<&[String]>,
    rank_by: RankBy,
    n: usize,
) -> Vec<TopRead> {
    let rows = lengths.len().min(quals.len());
    let k = n.min(rows);
    if k == 0 {
        return Vec::new();
    }

    let by_rank = |a: &usize, b: &usize| -> Ordering {
        let key = match rank_by {
            RankBy::Length => lengths[*b].cmp(&lengths[*a]),
            RankBy::Quality => quals[*b].total_cmp(&quals[*a]),
        };
        key.then(a.cmp(b))
    };

    let mut idx: Vec<usize> = (0..rows).collect();
    if k < rows {
        idx.select_nth_unstable_by(k - 1, by_rank);
        idx.truncate(k);
    }
    idx.sort_unstable_by(by_rank);

    idx.into_iter()
        .map(|i| TopRead {
            length: lengths[i],
            quality: quals[i],
            read_id: read_ids.and_then(|ids| ids.get(i).cloned()),
        })
        .collect()
}
