//! Chirp body cleaning.

/// Words replaced by [`clean_chirp`], matched case-insensitively.
const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

/// Replace profane words with `****`.
///
/// The body is split on single spaces and each word is compared whole, so a
/// word with punctuation attached (`kerfuffle!`) is left alone.
pub fn clean_chirp(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(' ')
        .to_string()
}
