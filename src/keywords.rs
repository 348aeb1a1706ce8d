//! Frequency-based keyword extraction for lecture text.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_KEYWORD_COUNT: usize = 10;

/// English stopwords (the NLTK corpus list).
const ENGLISH_STOPWORDS: &str = "i me my myself we our ours ourselves you you're you've you'll \
you'd your yours yourself yourselves he him his himself she she's her hers herself it it's its \
itself they them their theirs themselves what which who whom this that that'll these those am is \
are was were be been being have has had having do does did doing a an the and but if or because \
as until while of at by for with about against between into through during before after above \
below to from up down in out on off over under again further then once here there when where why \
how all any both each few more most other some such no nor not only own same so than too very s t \
can will just don don't should should've now d ll m o re ve y ain aren aren't couldn couldn't \
didn didn't doesn doesn't hadn hadn't hasn hasn't haven haven't isn isn't ma mightn mightn't \
mustn mustn't needn needn't shan shan't shouldn shouldn't wasn wasn't weren weren't won won't \
wouldn wouldn't";

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\[\]]*\]\([^()]*\)").unwrap());

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhttps?://\S+").unwrap());

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\W_]+").unwrap());

/// Holds the stopword set; build once with [`KeywordExtractor::new`] and reuse.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: HashSet<String>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.split_whitespace())
    }

    pub fn with_stopwords<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let stopwords = words.into_iter().map(|w| w.to_lowercase()).collect();
        Self { stopwords }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// The `count` most frequent non-stopword tokens of `text`, most frequent
    /// first. Ties keep the order in which the words first appear.
    pub fn extract(&self, text: &str, count: usize) -> Vec<String> {
        let text = MARKDOWN_IMAGE_RE.replace_all(text, " ");
        let text = URL_RE.replace_all(&text, " ");
        let lowered = text.to_lowercase();

        let mut freq: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, token) in TOKEN_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.is_stopword(t))
            .enumerate()
        {
            freq.entry(token).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = freq
            .into_iter()
            .map(|(word, (n, first))| (word, n, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(count)
            .map(|(word, _, _)| word.to_string())
            .collect()
    }
}
