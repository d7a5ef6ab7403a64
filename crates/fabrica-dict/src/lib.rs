//! Dictionary sampler for Fabrica.
//!
//! A `Dictionary` resolves a category name to a sampled value, looking at
//! an external data location first (when configured), then the built-in
//! wordlists, then `_format` composition rules. It also reports the
//! theoretical possibility count of a category, with `-1` standing for
//! "effectively infinite".

mod embedded;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use fabrica_core::{Error, GenRng, Result};

/// Dictionary configuration, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct DictConfig {
    /// Language of the built-in wordlists.
    pub lang: String,
    /// Look for on-disk wordlists before the built-in data.
    pub use_external_data: bool,
    /// Path prefix for external wordlist files.
    pub custom_data_location: Option<PathBuf>,
    /// On a missing-language miss, retry the category in English.
    pub en_fallback: bool,
}

impl Default for DictConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            use_external_data: false,
            custom_data_location: None,
            en_fallback: true,
        }
    }
}

/// Sampler over named wordlists and format strings.
pub struct Dictionary {
    config: DictConfig,
    cache: RefCell<BTreeMap<String, Rc<Vec<String>>>>,
}

impl Dictionary {
    /// Build a dictionary, validating the language against the built-in
    /// language set.
    pub fn new(config: DictConfig) -> Result<Self> {
        if !embedded::LANGS.contains(&config.lang.as_str()) {
            return Err(Error::Config(format!(
                "language {:?} is not available",
                config.lang
            )));
        }
        Ok(Self {
            config,
            cache: RefCell::new(BTreeMap::new()),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: DictConfig::default(),
            cache: RefCell::new(BTreeMap::new()),
        }
    }

    /// Languages shipped with the built-in data.
    pub fn available_langs() -> &'static [&'static str] {
        embedded::LANGS
    }

    /// Sample a value for `category`. Missing wordlists fall back through
    /// external data, built-in data, the English wordlist, and finally
    /// `_format` composition; a full miss yields an empty string.
    pub fn value(&self, category: &str, rng: &mut GenRng) -> String {
        let sampled = self.try_lookup(category, rng);
        if !sampled.is_empty() {
            return sampled;
        }
        let format = self.try_lookup(&format!("{category}_format"), rng);
        if format.is_empty() {
            return String::new();
        }
        self.value_from_format(&format, rng)
    }

    /// Theoretical possibility count for `category`: wordlist line count,
    /// or the product of sub-possibilities across format parts. Overflow
    /// yields -1; a full miss yields 0.
    pub fn possible_values(&self, category: &str) -> i64 {
        if let Some(samples) = self.samples(&self.config.lang, category) {
            return samples.len() as i64;
        }
        self.format_possibilities(&self.config.lang, category)
            .unwrap_or(0)
    }

    fn try_lookup(&self, category: &str, rng: &mut GenRng) -> String {
        let lang = self.config.lang.clone();
        match self.samples(&lang, category) {
            Some(samples) if !samples.is_empty() => {
                samples[rng.int_n(samples.len() as i64) as usize].clone()
            }
            _ if lang != "en" && self.config.en_fallback => match self.samples("en", category) {
                Some(samples) if !samples.is_empty() => {
                    samples[rng.int_n(samples.len() as i64) as usize].clone()
                }
                _ => String::new(),
            },
            _ => String::new(),
        }
    }

    fn value_from_format(&self, format: &str, rng: &mut GenRng) -> String {
        let mut result = String::new();
        for part in format.split('|') {
            if part.contains('#') {
                result.push_str(&self.numeric_format(part, rng));
            } else if part == " " {
                result.push(' ');
            } else {
                result.push_str(&self.composite_format(part, rng));
            }
        }
        result
    }

    fn composite_format(&self, part: &str, rng: &mut GenRng) -> String {
        let sampled = self.try_lookup(part, rng);
        if sampled.is_empty() {
            part.to_string()
        } else if part.ends_with("_format") {
            self.value_from_format(&sampled, rng)
        } else {
            sampled
        }
    }

    fn numeric_format(&self, part: &str, rng: &mut GenRng) -> String {
        part.chars()
            .map(|ch| {
                if ch == '#' {
                    char::from_digit(rng.int_n(10) as u32, 10).unwrap_or('0')
                } else {
                    ch
                }
            })
            .collect()
    }

    fn format_possibilities(&self, lang: &str, category: &str) -> Option<i64> {
        let samples = self.samples(lang, &format!("{category}_format"))?;
        let mut result: i64 = 1;
        for line in samples.iter() {
            for part in line.split('|') {
                let sub = if part.contains('#') {
                    let slots = part.matches('#').count() as u32;
                    match 9_i64.checked_pow(slots) {
                        Some(value) => value,
                        None => return Some(-1),
                    }
                } else if part == " " {
                    0
                } else {
                    self.possible_values(part)
                };
                if sub != 0 {
                    match result.checked_mul(sub) {
                        Some(value) if value > 0 => result = value,
                        _ => return Some(-1),
                    }
                }
            }
        }
        Some(result)
    }

    /// Cached sample lines for `lang/category`, external data first.
    fn samples(&self, lang: &str, category: &str) -> Option<Rc<Vec<String>>> {
        let key = format!("{lang}/{category}");
        if let Some(samples) = self.cache.borrow().get(&key) {
            return Some(Rc::clone(samples));
        }
        let data = self.read_raw(lang, category)?;
        let samples: Rc<Vec<String>> = Rc::new(
            data.trim()
                .split('\n')
                .map(|line| line.to_string())
                .collect(),
        );
        self.cache.borrow_mut().insert(key, Rc::clone(&samples));
        Some(samples)
    }

    fn read_raw(&self, lang: &str, category: &str) -> Option<String> {
        if self.config.use_external_data {
            let path = match &self.config.custom_data_location {
                Some(prefix) => prefix.join(category),
                None => PathBuf::from(category),
            };
            if let Ok(data) = fs::read_to_string(&path) {
                if !data.trim().is_empty() {
                    return Some(data);
                }
            }
        }
        embedded::wordlist(lang, category).map(|data| data.to_string())
    }
}
