//! Inline markup codec
//!
//! Bidirectional conversion between styled runs and the lightweight
//! inline markup used by the flattened output: `**bold**`, `*italic*`
//! and `_underline_`. Only these three markers exist; spans never
//! overlap and nesting is not supported.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::models::{FormattedRun, TextFormatting};

// Token pattern, tried in priority order: bold, italic, underline.
// The underline body class excludes underscores and whitespace, so a
// bare run of underscores ("__", "___") can never match as an empty
// underline span.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*[^*]+\*\*|\*[^*]+\*|_[^_\s]+_").unwrap());

/// Encode a single run as markup.
///
/// Bold wraps first, then italic, then underline, each applied to the
/// output of the previous wrapping. Empty runs encode to nothing so
/// stray style flags cannot produce marker noise like `****`.
pub fn encode_run(run: &FormattedRun) -> String {
    if run.text.is_empty() {
        return String::new();
    }

    let mut text = run.text.clone();
    if run.formatting.bold {
        text = format!("**{text}**");
    }
    if run.formatting.italic {
        text = format!("*{text}*");
    }
    if run.formatting.underline {
        text = format!("_{text}_");
    }
    text
}

/// Encode a sequence of runs, in order, into one markup string.
pub fn encode_runs(runs: &[FormattedRun]) -> String {
    runs.iter().map(encode_run).collect()
}

/// Decode a markup string back into styled runs.
///
/// The split is total: every character of the input lands in exactly
/// one run, in order of appearance. Anything the tokenizer does not
/// recognize - including unterminated or otherwise malformed markers -
/// passes through as plain text. Decoding never fails.
pub fn decode(markup: &str) -> Vec<FormattedRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for token in TOKEN_PATTERN.find_iter(markup) {
        if token.start() > last {
            runs.push(FormattedRun::plain(&markup[last..token.start()]));
        }

        let text = token.as_str();
        let run = if let Some(inner) = text
            .strip_prefix("**")
            .and_then(|t| t.strip_suffix("**"))
        {
            FormattedRun {
                text: inner.to_string(),
                formatting: TextFormatting {
                    bold: true,
                    ..Default::default()
                },
            }
        } else if let Some(inner) = text.strip_prefix('*').and_then(|t| t.strip_suffix('*')) {
            FormattedRun {
                text: inner.to_string(),
                formatting: TextFormatting {
                    italic: true,
                    ..Default::default()
                },
            }
        } else {
            // Underline is the only remaining token shape
            let inner = &text[1..text.len() - 1];
            FormattedRun {
                text: inner.to_string(),
                formatting: TextFormatting {
                    underline: true,
                    ..Default::default()
                },
            }
        };

        runs.push(run);
        last = token.end();
    }

    if last < markup.len() {
        runs.push(FormattedRun::plain(&markup[last..]));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(text: &str, bold: bool, italic: bool, underline: bool) -> FormattedRun {
        FormattedRun {
            text: text.to_string(),
            formatting: TextFormatting {
                bold,
                italic,
                underline,
            },
        }
    }

    #[test]
    fn encode_wraps_each_style() {
        assert_eq!(encode_run(&styled("từ", true, false, false)), "**từ**");
        assert_eq!(encode_run(&styled("từ", false, true, false)), "*từ*");
        assert_eq!(encode_run(&styled("từ", false, false, true)), "_từ_");
        assert_eq!(encode_run(&styled("từ", false, false, false)), "từ");
    }

    #[test]
    fn encode_nests_bold_then_italic_then_underline() {
        assert_eq!(encode_run(&styled("x", true, true, false)), "***x***");
        assert_eq!(encode_run(&styled("x", true, false, true)), "_**x**_");
        assert_eq!(encode_run(&styled("x", true, true, true)), "_***x***_");
    }

    #[test]
    fn empty_run_encodes_to_nothing() {
        assert_eq!(encode_run(&styled("", true, true, true)), "");
    }

    #[test]
    fn decode_single_style_round_trips() {
        for run in [
            styled("đậm", true, false, false),
            styled("nghiêng", false, true, false),
            styled("gạch", false, false, true),
        ] {
            let decoded = decode(&encode_run(&run));
            assert_eq!(decoded.len(), 1);
            assert_eq!(decoded[0], run);
        }
    }

    #[test]
    fn decode_mixed_paragraph() {
        let runs = decode("Chọn từ có phần **gạch chân** đọc *khác* với _từ còn lại");
        assert_eq!(
            runs,
            vec![
                FormattedRun::plain("Chọn từ có phần "),
                styled("gạch chân", true, false, false),
                FormattedRun::plain(" đọc "),
                styled("khác", false, true, false),
                FormattedRun::plain(" với _từ còn lại"),
            ]
        );
    }

    #[test]
    fn decode_covers_input_with_no_gaps() {
        let input = "a **b** c *d* e _f_ g";
        let text: String = decode(input).iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, "a b c d e f g");
    }

    #[test]
    fn malformed_markers_pass_through_as_text() {
        assert_eq!(decode("3 * 4 = 12"), vec![FormattedRun::plain("3 * 4 = 12")]);
        assert_eq!(decode("**dở dang"), vec![FormattedRun::plain("**dở dang")]);
    }

    #[test]
    fn underscore_runs_are_not_underline() {
        // Fill-in-the-blank answer slots are plain text, not markup
        assert_eq!(decode("___"), vec![FormattedRun::plain("___")]);
        let runs = decode("Điền vào chỗ trống: ____ nhé");
        assert_eq!(runs, vec![FormattedRun::plain("Điền vào chỗ trống: ____ nhé")]);
    }

    #[test]
    fn underline_span_must_not_contain_whitespace() {
        assert_eq!(
            decode("_hai từ_"),
            vec![FormattedRun::plain("_hai từ_")]
        );
    }

    #[test]
    fn nested_markers_decode_as_outer_recognized_layer() {
        // Composition is unsupported: bold+italic encodes as ***x***,
        // which decodes to a bold core with stray plain asterisks.
        let runs = decode("***x***");
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, "*x*");
        assert!(runs.iter().any(|r| r.formatting.bold));
    }
}
