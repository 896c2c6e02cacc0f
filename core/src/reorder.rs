//! List reordering.
//!
//! A move instruction names a moved element and a reference element: the
//! moved element is taken out of the sequence and reinserted so that it
//! ends up at the index the reference held before the move. Every other
//! element keeps its relative order, so the result is always a permutation
//! of the input.
//!
//! # Example
//!
//! ```
//! use form_schema_core::move_item;
//!
//! let mut items = vec!['a', 'b', 'c', 'd'];
//! move_item(&mut items, 0, 2);
//! assert_eq!(items, vec!['b', 'c', 'a', 'd']);
//!
//! move_item(&mut items, 3, 0);
//! assert_eq!(items, vec!['d', 'b', 'c', 'a']);
//! ```

/// Moves the element at `from` so that it ends at index `to`.
///
/// Removing the element first shifts every later index down by one, so when
/// `from < to` the reinsertion index in the shortened sequence is `to`
/// itself, which lands the element just after the old occupant of `to`.
/// Out-of-range indices and `from == to` leave the slice untouched.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Moves the element matching `moved` to the index held by the element
/// matching `reference`.
///
/// Returns `Ok(true)` when the order changed, `Ok(false)` when both keys
/// name the same element, and `Err` with the first key that matched
/// nothing.
///
/// # Examples
///
/// ```
/// use form_schema_core::reorder_by_key;
///
/// let mut items = vec![(1, "a"), (2, "b"), (3, "c")];
/// assert_eq!(reorder_by_key(&mut items, &3, &1, |item| item.0), Ok(true));
/// assert_eq!(items, vec![(3, "c"), (1, "a"), (2, "b")]);
///
/// assert_eq!(reorder_by_key(&mut items, &2, &2, |item| item.0), Ok(false));
/// assert_eq!(reorder_by_key(&mut items, &9, &2, |item| item.0), Err(9));
/// ```
pub fn reorder_by_key<T, K, F>(
    items: &mut Vec<T>,
    moved: &K,
    reference: &K,
    key: F,
) -> Result<bool, K>
where
    K: PartialEq + Clone,
    F: Fn(&T) -> K,
{
    let from = items
        .iter()
        .position(|item| key(item) == *moved)
        .ok_or_else(|| moved.clone())?;
    let to = items
        .iter()
        .position(|item| key(item) == *reference)
        .ok_or_else(|| reference.clone())?;

    if from == to {
        return Ok(false);
    }
    move_item(items, from, to);
    Ok(true)
}
