//! Text normalization, tokenization and lemmatization shared by training,
//! serving and the dashboard.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// English stopwords (the NLTK list)
pub const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Irregular plural nouns
static IRREGULAR_NOUNS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("wolves", "wolf"),
        ("thieves", "thief"),
        ("loaves", "loaf"),
        ("calves", "calf"),
        ("selves", "self"),
        ("oxen", "ox"),
    ]
    .into_iter()
    .collect()
});

/// Words that end in `s` but are already their own base form
static UNINFLECTED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "news", "series", "species", "means", "physics", "mathematics", "economics", "measles",
        "diabetes", "clothes", "chaos", "gas", "lens", "bias", "atlas", "canvas", "yes", "thus",
        "plus", "always", "perhaps", "whereas", "besides", "towards", "afterwards", "sometimes",
        "unless", "nevertheless", "various", "previous", "serious", "famous", "dangerous",
        "was", "has", "his", "its", "this", "does", "aids", "politics", "logistics", "ethics",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Lowercase and replace everything outside `[a-z0-9]` with a space
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect()
}

/// Reduce a lowercase word to its noun base form.
///
/// Suffix rules are applied only when the word is long enough and does not
/// end in a form that looks singular already (`-ss`, `-us`, `-is`).
pub fn lemmatize(word: &str) -> String {
    if let Some(&base) = IRREGULAR_NOUNS.get(word) {
        return base.to_string();
    }
    if word.len() <= 3
        || UNINFLECTED.contains(word)
        || !word.ends_with('s')
        || word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
    {
        return word.to_string();
    }

    // A stripped plural can itself be an irregular form ("womens" -> "women")
    let strip = |n: usize| {
        let stem = &word[..word.len() - n];
        IRREGULAR_NOUNS.get(stem).copied().unwrap_or(stem).to_string()
    };

    if word.ends_with("sses") || word.ends_with("zzes") {
        // classes -> class, quizzes -> quiz
        return strip(if word.ends_with("zzes") { 3 } else { 2 });
    }
    if word.ends_with("ches") || word.ends_with("shes") || word.ends_with("xes") {
        return strip(2);
    }
    if word.ends_with("ies") && word.len() > 4 {
        return format!("{}y", strip(3));
    }

    strip(1)
}

/// Full training/serving tokenizer: normalize, split, drop stopwords, lemmatize.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .map(lemmatize)
        .filter(|lemma| !is_stopword(lemma))
        .collect()
}
