use super::StatsError;

// first length at which the ascending cumulative sum reaches half the total
pub fn n50(lengths: &[u64]) -> Result<u64, StatsError> {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable();
    n50_sorted(&sorted)
}

pub fn n50_sorted(sorted: &[u64]) -> Result<u64, StatsError> {
    // u128 so that lengths near u64::MAX cannot wrap the running sum
    let total: u128 = sorted.iter().map(|&len| u128::from(len)).sum();
    let half = total.div_ceil(2);
    let mut cum = 0u128;
    sorted
        .iter()
        .copied()
        .find(|&len| {
            cum += u128::from(len);
            cum >= half
        })
        .ok_or(StatsError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_long_read_dominates() {
        assert_eq!(n50(&[1, 2, 3, 4, 90]), Ok(90));
        assert_eq!(n50(&[90, 4, 3, 2, 1]), Ok(90));
    }

    #[test]
    fn balanced_lengths() {
        assert_eq!(n50(&[10, 100, 1000]), Ok(1000));
        assert_eq!(n50_sorted(&[2, 2, 2, 2]), Ok(2));
        // 1..=20 sums to 210; cumulative reaches 105 at 14.
        let lengths: Vec<u64> = (1..=20).collect();
        assert_eq!(n50_sorted(&lengths), Ok(14));
    }

    #[test]
    fn exact_half_is_reached() {
        // total 20, cumulative 10 at the second read
        assert_eq!(n50_sorted(&[5, 5, 10]), Ok(5));
    }

    #[test]
    fn zero_lengths() {
        assert_eq!(n50(&[0, 0, 0]), Ok(0));
    }

    #[test]
    fn lengths_beyond_u64_total() {
        assert_eq!(n50(&[u64::MAX, u64::MAX, 1]), Ok(u64::MAX));
        assert_eq!(n50(&[1, 2, u64::MAX - 1]), Ok(u64::MAX - 1));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(n50(&[]), Err(StatsError::EmptyInput));
    }
}
