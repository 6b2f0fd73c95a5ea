//! Left folds over sequences.

use std::ops::ControlFlow;

/// Left fold that stops before the first element rejected by `keep_going`.
///
/// `keep_going` sees each element together with the accumulator built so far;
/// when it returns `false` the fold ends and the current accumulator is
/// returned without consuming the rest of the sequence.
///
/// The deferred-action combinators do not use this; `Parallel::all` and
/// `Task::all` run their own loops.
///
/// # Examples
///
/// ```rust
/// use deferral::control::fold_while;
///
/// // Sum elements while the running total stays below 10.
/// let total = fold_while(
///     vec![3, 4, 5, 6],
///     0,
///     |item, total| total + item < 10,
///     |total, item| total + item,
/// );
/// assert_eq!(total, 7);
/// ```
pub fn fold_while<I, A, P, F>(items: I, initial: A, mut keep_going: P, mut algebra: F) -> A
where
    I: IntoIterator,
    P: FnMut(&I::Item, &A) -> bool,
    F: FnMut(A, I::Item) -> A,
{
    let folded = items.into_iter().try_fold(initial, |accumulator, item| {
        if keep_going(&item, &accumulator) {
            ControlFlow::Continue(algebra(accumulator, item))
        } else {
            ControlFlow::Break(accumulator)
        }
    });

    match folded {
        ControlFlow::Continue(accumulator) | ControlFlow::Break(accumulator) => accumulator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![1, 2, 3], 6)]
    #[case(vec![1, 2, -1, 4], 3)]
    fn test_fold_while_stops_at_first_negative(#[case] items: Vec<i32>, #[case] expected: i32) {
        let sum = fold_while(items, 0, |item, _| *item >= 0, |sum, item| sum + item);
        assert_eq!(sum, expected);
    }

    #[rstest]
    fn test_fold_while_does_not_consume_past_stop() {
        let mut seen = Vec::new();
        let items = (1..=10).inspect(|item| seen.push(*item));
        let product = fold_while(items, 1, |_, product| *product < 20, |product, item| product * item);
        assert_eq!(product, 24);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }
}
