// file: src/scoring/normalizer.rs
// description: strips articles and links from post text before embedding
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL: Regex = Regex::new(r"http\S+").expect("URL regex is valid");
}

/// Removed in this order, as raw case-sensitive substrings. Occurrences
/// inside longer words ("data " -> "dat") are removed too.
const ARTICLES: [&str; 3] = ["a ", "an ", "the "];

pub fn normalize(text: &str) -> String {
    let stripped = ARTICLES
        .iter()
        .fold(text.to_string(), |acc, article| acc.replace(article, ""));

    URL.replace_all(&stripped, "").into_owned()
}
