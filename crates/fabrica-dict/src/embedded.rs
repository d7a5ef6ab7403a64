//! Built-in wordlists, compiled into the binary.

pub const LANGS: &[&str] = &["en", "pt"];

/// Raw contents of a built-in wordlist, one sample per line. `_format`
/// categories hold pipe-separated composition rules instead of samples.
pub fn wordlist(lang: &str, category: &str) -> Option<&'static str> {
    match (lang, category) {
        ("en", "first_names") => Some(include_str!("../data/en/first_names")),
        ("en", "last_names") => Some(include_str!("../data/en/last_names")),
        ("en", "name_prefixes") => Some(include_str!("../data/en/name_prefixes")),
        ("en", "cities") => Some(include_str!("../data/en/cities")),
        ("en", "states") => Some(include_str!("../data/en/states")),
        ("en", "full_name_format") => Some(include_str!("../data/en/full_name_format")),
        ("en", "phone_number_format") => Some(include_str!("../data/en/phone_number_format")),
        ("pt", "first_names") => Some(include_str!("../data/pt/first_names")),
        ("pt", "last_names") => Some(include_str!("../data/pt/last_names")),
        ("pt", "name_prefixes") => Some(include_str!("../data/pt/name_prefixes")),
        ("pt", "cities") => Some(include_str!("../data/pt/cities")),
        ("pt", "phone_number_format") => Some(include_str!("../data/pt/phone_number_format")),
        _ => None,
    }
}
