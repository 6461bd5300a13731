/// Sentence delimiter used when splitting article text
const SENTENCE_DELIMITER: &str = ". ";

/// Character budget per chunk for the local summarization model
pub const DEFAULT_CHUNK_LENGTH: usize = 500;

/// Splits text into chunks of whole sentences, each at most `max_chunk_length`
/// characters.
///
/// Sentences are accumulated greedily. A sentence that is longer than the limit
/// on its own is emitted as a single oversized chunk rather than cut, so callers
/// must tolerate the occasional chunk above the budget.
///
/// Every sentence keeps its delimiter, so concatenating the chunks yields the
/// original text.
pub fn split_text(text: &str, max_chunk_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in text.split_inclusive(SENTENCE_DELIMITER) {
        let sentence_len = sentence.chars().count();

        if !current.is_empty() && current_len + sentence_len > max_chunk_length {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
