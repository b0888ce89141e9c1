//! Lightweight language identification by stop-word frequency.
//!
//! Each supported language has a short list of its most frequent function
//! words. The language whose list covers the largest share of the text's
//! words wins, provided the share clears [`MIN_COVERAGE`].

use unicode_segmentation::UnicodeSegmentation;

/// Share of words that must be stop words of the winning language.
pub const MIN_COVERAGE: f64 = 0.08;

/// Texts with fewer words than this are not classified.
pub const MIN_WORDS: usize = 4;

/// Words considered from the start of the text.
const SAMPLE_WORDS: usize = 2000;

const PROFILES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "a", "in", "is", "that", "it", "for", "was", "on", "with",
            "as", "this", "by", "be", "are", "from", "at", "or", "which", "an", "not",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "und", "das", "ist", "nicht", "den", "mit", "sich", "des", "auf", "ein",
            "eine", "dem", "zu", "von", "auch", "es", "im", "für", "wird", "sind", "aus", "bei",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "de", "des", "et", "est", "un", "une", "du", "que", "qui", "dans",
            "pour", "pas", "au", "sur", "ce", "il", "sont", "avec", "par", "plus", "ne",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "de", "y", "que", "en", "es", "un", "una", "por", "con",
            "para", "del", "se", "no", "al", "lo", "como", "más", "pero", "su", "sus",
        ],
    ),
    (
        "it",
        &[
            "il", "di", "che", "la", "è", "e", "per", "un", "una", "non", "in", "del", "della",
            "sono", "gli", "le", "con", "si", "da", "anche", "lo", "dei", "nel", "alla",
        ],
    ),
    (
        "nl",
        &[
            "de", "het", "een", "en", "van", "is", "dat", "niet", "op", "te", "zijn", "met",
            "voor", "die", "er", "ook", "aan", "maar", "wordt", "door", "naar", "bij", "dit", "om",
        ],
    ),
    (
        "pt",
        &[
            "o", "a", "os", "as", "de", "e", "que", "do", "da", "em", "um", "uma", "para", "com",
            "não", "se", "por", "mais", "dos", "das", "como", "mas", "ao", "é",
        ],
    ),
];

/// Guess the ISO 639-1 code of the language `text` is written in.
///
/// Returns `None` when the text is too short or no language profile is a
/// clear match.
pub fn detect_language(text: &str) -> Option<String> {
    let words: Vec<String> = text
        .unicode_words()
        .take(SAMPLE_WORDS)
        .map(str::to_lowercase)
        .collect();

    if words.len() < MIN_WORDS {
        return None;
    }

    let (code, hits) = PROFILES
        .iter()
        .map(|(code, stop_words)| {
            let hits = words
                .iter()
                .filter(|w| stop_words.contains(&w.as_str()))
                .count();
            (*code, hits)
        })
        .max_by_key(|(_, hits)| *hits)?;

    let coverage = hits as f64 / words.len() as f64;
    (coverage >= MIN_COVERAGE).then(|| code.to_string())
}
