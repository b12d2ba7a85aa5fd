/// Keeps at most `max_chars` characters of `input`, cutting mid-word if needed.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &input[..byte_index],
        None => input,
    }
}

/// Counts the pieces produced by splitting on single spaces.
///
/// Runs of spaces yield empty pieces that still count, and the empty string
/// counts as one word.
pub fn word_count(input: &str) -> usize {
    input.split(' ').count()
}
