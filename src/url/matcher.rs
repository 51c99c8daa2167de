use regex::RegexSet;
use std::collections::HashSet;

/// Compiled set of product-shape patterns
///
/// A URL is a product URL when any pattern matches anywhere in the string.
#[derive(Debug, Clone)]
pub struct ProductPatterns {
    set: RegexSet,
}

impl ProductPatterns {
    /// Compiles the given regular expressions into a pattern set
    ///
    /// # Examples
    ///
    /// ```
    /// use product_scout::url::ProductPatterns;
    ///
    /// let patterns = ProductPatterns::new(["/dp/", "/product/"]).unwrap();
    /// assert!(patterns.is_product("https://a.com/dp/1"));
    /// assert!(!patterns.is_product("https://a.com/help"));
    /// ```
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            set: RegexSet::new(patterns)?,
        })
    }

    /// Returns true if at least one pattern matches the URL
    pub fn is_product(&self, url: &str) -> bool {
        self.set.is_match(url)
    }

    /// The source patterns, in configured order
    pub fn patterns(&self) -> &[String] {
        self.set.patterns()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Keeps the URLs matching at least one product pattern, with exact duplicates removed
///
/// The result has set semantics. The current implementation keeps first-seen
/// order, but callers must not rely on it.
///
/// # Examples
///
/// ```
/// use product_scout::url::{classify, ProductPatterns};
///
/// let patterns = ProductPatterns::new(["/dp/"]).unwrap();
/// let urls = vec![
///     "https://a.com/dp/1".to_string(),
///     "https://a.com/dp/1".to_string(),
///     "https://a.com/help".to_string(),
/// ];
/// assert_eq!(classify(&urls, &patterns), vec!["https://a.com/dp/1"]);
/// ```
pub fn classify(urls: &[String], patterns: &ProductPatterns) -> Vec<String> {
    let mut seen = HashSet::new();

    urls.iter()
        .filter(|url| patterns.is_product(url))
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}
