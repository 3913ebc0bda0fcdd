//! Heuristic classification of pasted text.

use once_cell::sync::Lazy;
use regex::Regex;

pub const FENCE: &str = "```";

static KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:const|let|var|function|class|import|export|if|for|return|interface|type)\b",
    )
    .expect("keyword pattern is valid")
});

/// Replaceable predicate deciding whether text looks like source code.
pub trait CodeDetector {
    fn is_likely_code(&self, text: &str) -> bool;
}

impl<F> CodeDetector for F
where
    F: Fn(&str) -> bool,
{
    fn is_likely_code(&self, text: &str) -> bool {
        self(text)
    }
}

/// Default detector: multi-line text plus one code signal (structural
/// symbol, language keyword, or an indented line).
///
/// Lines are counted with [`str::lines`], so a single trailing newline does
/// not make a one-line paste multi-line.
#[derive(Clone, Debug)]
pub struct HeuristicCodeDetector {
    pub min_lines: usize,
    pub symbols: Vec<char>,
    pub keywords: Regex,
}

impl Default for HeuristicCodeDetector {
    fn default() -> Self {
        Self {
            min_lines: 2,
            symbols: vec!['{', '}', ';', '=', '(', ')', '[', ']', '<', '>'],
            keywords: KEYWORDS.clone(),
        }
    }
}

impl HeuristicCodeDetector {
    fn has_symbol(&self, text: &str) -> bool {
        text.chars().any(|c| self.symbols.contains(&c))
    }

    fn has_indented_line(text: &str) -> bool {
        text.lines()
            .any(|line| line.starts_with("  ") || line.starts_with('\t'))
    }
}

impl CodeDetector for HeuristicCodeDetector {
    fn is_likely_code(&self, text: &str) -> bool {
        if text.lines().count() < self.min_lines {
            return false;
        }
        self.has_symbol(text) || self.keywords.is_match(text) || Self::has_indented_line(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteDecision {
    /// Clipboard carried files; text classification is skipped.
    UploadFiles,
    /// Let the text through unchanged.
    PassThrough,
    /// Intercept the paste and insert the text inside a generic fence.
    WrapAsCode,
}

pub struct PasteClassifier {
    detector: Box<dyn CodeDetector + Send + Sync>,
}

impl Default for PasteClassifier {
    fn default() -> Self {
        Self::new(HeuristicCodeDetector::default())
    }
}

impl std::fmt::Debug for PasteClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteClassifier").finish_non_exhaustive()
    }
}

impl PasteClassifier {
    pub fn new(detector: impl CodeDetector + Send + Sync + 'static) -> Self {
        Self {
            detector: Box::new(detector),
        }
    }

    pub fn classify(&self, text: &str, has_files: bool) -> PasteDecision {
        if has_files {
            return PasteDecision::UploadFiles;
        }
        if text.trim_start().starts_with(FENCE) {
            return PasteDecision::PassThrough;
        }
        if self.detector.is_likely_code(text) {
            PasteDecision::WrapAsCode
        } else {
            PasteDecision::PassThrough
        }
    }
}
