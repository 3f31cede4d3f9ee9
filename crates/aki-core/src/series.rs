//! Operations on hourly value series.
//!
//! A series is one stay's column on the contiguous hourly grid, `None`
//! marking hours without a usable value.

/// Tolerant `x >= y`, absorbing floating point noise in thresholds like
/// `1.3 - 1.0 >= 0.3`.
pub fn approx_gte(x: f64, y: f64) -> bool {
    x >= y || (x - y).abs() <= 1e-8 + 1e-5 * y.abs()
}

/// Replaces missing entries with the last known value.
///
/// With a limit, at most `limit` consecutive missing entries after each
/// known value are filled; the rest of the run stays missing.
pub fn forward_fill<T: Copy>(values: &mut [Option<T>], limit: Option<usize>) {
    let mut last: Option<T> = None;
    let mut run = 0usize;
    for value in values.iter_mut() {
        match value {
            Some(v) => {
                last = Some(*v);
                run = 0;
            }
            None => {
                run += 1;
                if limit.is_none_or(|limit| run <= limit) {
                    *value = last;
                }
            }
        }
    }
}

/// Replaces missing entries with the next known value, at most `limit`
/// entries before each known value.
pub fn backward_fill(values: &mut [Option<f64>], limit: usize) {
    let mut next: Option<f64> = None;
    let mut run = 0usize;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => {
                next = Some(*v);
                run = 0;
            }
            None => {
                run += 1;
                if run <= limit {
                    *value = next;
                }
            }
        }
    }
}

/// Spreads each value evenly over itself and the unmeasured hours before it.
///
/// A value preceded by `g` missing hours is divided by `min(g, threshold) + 1`
/// and copied back into at most `threshold` of those hours, so the volume of
/// a multi-hour collection is attributed to the hours it was produced in.
pub fn spread_backward(values: &mut [Option<f64>], threshold: usize) {
    let mut gap = 0usize;
    for value in values.iter_mut() {
        match value {
            Some(v) => {
                *v /= (gap.min(threshold) + 1) as f64;
                gap = 0;
            }
            None => gap += 1,
        }
    }
    backward_fill(values, threshold);
}

/// Window aggregation for [`rolling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAgg {
    Mean,
    Max,
}

/// Trailing window of `window` rows ending at each row.
///
/// A row gets a value only when the full window is available and every
/// entry in it is present.
pub fn rolling(values: &[Option<f64>], window: usize, agg: WindowAgg) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }
    for end in (window - 1)..values.len() {
        let slice = &values[end + 1 - window..=end];
        let Some(present) = slice.iter().copied().collect::<Option<Vec<f64>>>() else {
            continue;
        };
        out[end] = Some(match agg {
            WindowAgg::Mean => present.iter().sum::<f64>() / window as f64,
            WindowAgg::Max => present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });
    }
    out
}

/// Row-wise maximum over stage columns; missing where every column is missing.
pub fn row_max(columns: &[Vec<Option<i64>>], len: usize) -> Vec<Option<i64>> {
    (0..len)
        .map(|row| {
            columns
                .iter()
                .filter_map(|column| column.get(row).copied().flatten())
                .max()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nan(n: usize) -> Vec<Option<f64>> {
        vec![None; n]
    }

    #[test]
    fn approx_gte_absorbs_rounding() {
        assert!(approx_gte(1.3 - 1.0, 0.3));
        assert!(approx_gte(4.0, 4.0));
        assert!(approx_gte(4.1, 4.0));
        assert!(!approx_gte(3.99, 4.0));
        assert!(!approx_gte(1.49, 1.5));
    }

    #[test]
    fn forward_fill_respects_limit() {
        let mut values = vec![Some(2.0), None, None, Some(1.0), None];
        forward_fill(&mut values, Some(1));
        assert_eq!(values, vec![Some(2.0), Some(2.0), None, Some(1.0), Some(1.0)]);

        let mut values = vec![None, Some(0), None, None];
        forward_fill(&mut values, None);
        assert_eq!(values, vec![None, Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn backward_fill_respects_limit() {
        let mut values = vec![None, None, Some(3.0)];
        backward_fill(&mut values, 1);
        assert_eq!(values, vec![None, Some(3.0), Some(3.0)]);
    }

    #[test]
    fn spread_backward_divides_by_gap() {
        let mut values = vec![Some(4.0)];
        values.extend(nan(14));
        values.push(Some(2.0));
        values.extend(nan(7));
        values.push(Some(1.0));
        spread_backward(&mut values, 1);

        let mut expected = vec![Some(4.0)];
        expected.extend(nan(13));
        expected.extend([Some(1.0), Some(1.0)]);
        expected.extend(nan(6));
        expected.extend([Some(0.5), Some(0.5)]);
        assert_eq!(values, expected);
    }

    #[test]
    fn spread_backward_caps_at_threshold() {
        let mut values = vec![None, None, None, Some(8.0)];
        spread_backward(&mut values, 6);
        assert_eq!(values, vec![Some(2.0); 4]);
    }

    #[test]
    fn rolling_requires_complete_windows() {
        let values = vec![Some(1.0), Some(3.0), None, Some(5.0), Some(7.0)];
        assert_eq!(
            rolling(&values, 2, WindowAgg::Mean),
            vec![None, Some(2.0), None, None, Some(6.0)]
        );
        assert_eq!(
            rolling(&values, 2, WindowAgg::Max),
            vec![None, Some(3.0), None, None, Some(7.0)]
        );
        assert_eq!(rolling(&values, 6, WindowAgg::Mean), nan(5));
    }

    #[test]
    fn row_max_ignores_missing() {
        let columns = vec![vec![Some(1), None, None], vec![Some(3), Some(0), None]];
        assert_eq!(row_max(&columns, 3), vec![Some(3), Some(0), None]);
    }
}
