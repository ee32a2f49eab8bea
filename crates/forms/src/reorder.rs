use crate::errors::{FormError, FormResult};

/// Move the element at `from` so that it ends up at index `to`, shifting the
/// elements in between. Both indices must be in `0..items.len()`; on error
/// `items` is untouched.
///
/// `[A, B, C, D]` with `from = 0, to = 2` becomes `[B, C, A, D]`.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> FormResult<()> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(FormError::IndexOutOfRange { index, len });
        }
    }

    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(from: usize, to: usize) -> Vec<char> {
        let mut items = vec!['A', 'B', 'C', 'D'];
        move_item(&mut items, from, to).expect("in range");
        items
    }

    #[test]
    fn moves_forward() {
        assert_eq!(moved(0, 2), vec!['B', 'C', 'A', 'D']);
        assert_eq!(moved(0, 3), vec!['B', 'C', 'D', 'A']);
    }

    #[test]
    fn moves_backward() {
        assert_eq!(moved(2, 0), vec!['C', 'A', 'B', 'D']);
        assert_eq!(moved(3, 1), vec!['A', 'D', 'B', 'C']);
    }

    #[test]
    fn same_index_is_identity() {
        assert_eq!(moved(1, 1), vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn out_of_range_leaves_items_alone() {
        let mut items = vec!['A', 'B'];
        let err = move_item(&mut items, 0, 2).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { index: 2, len: 2 }));
        let err = move_item(&mut items, 5, 0).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { index: 5, len: 2 }));
        assert_eq!(items, vec!['A', 'B']);

        let mut empty: Vec<char> = Vec::new();
        assert!(move_item(&mut empty, 0, 0).is_err());
    }
}
