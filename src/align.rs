/// Rounds `ix` up to the next multiple of `alignment`, which must be a power
/// of 2.
pub(crate) fn align(ix: usize, alignment: usize) -> usize {
    debug_assert!(
        alignment.is_power_of_two(),
        "{} is not power of 2, cannot be used as alignment",
        alignment
    );
    let mask = alignment - 1;
    ix.saturating_add(mask) & !mask
}
