//! Small descriptive statistics shared by the fitted stages

/// Median of the non-missing values, averaging the two middle values for
/// even counts. Returns `None` when there is nothing to take the median of.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();

    if present.is_empty() {
        return None;
    }

    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;

    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(vec![Some(3.0), Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median(vec![Some(4.0), Some(1.0), Some(2.0), Some(3.0)]), Some(2.5));
    }

    #[test]
    fn test_median_ignores_missing() {
        assert_eq!(median(vec![None, Some(10.0), None, Some(20.0)]), Some(15.0));
    }

    #[test]
    fn test_median_all_missing() {
        assert_eq!(median(vec![None, None]), None);
        assert_eq!(median(Vec::new()), None);
    }
}
