//! Alternate combination for merged utterances.
//!
//! Each fragment of an utterance carries its own ranked alternates. The
//! merged utterance's alternates are the cross-product of the per-fragment
//! lists, enumerated depth-first and truncated once the configured cap is
//! reached. The space grows multiplicatively, so the cap is a hard stop, not
//! an error.

use crate::result::{Alternate, RecognitionResult};

/// Joins the non-empty texts with `separator`.
///
/// Empty fragment texts (engine-confirmed silence or noise) carry audio and
/// timing but contribute no words.
pub(crate) fn join_non_empty<'a>(texts: impl Iterator<Item = &'a str>, separator: &str) -> String {
    let mut joined = String::new();
    for text in texts {
        if text.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push_str(separator);
        }
        joined.push_str(text);
    }
    joined
}

/// Enumerates up to `max` combined alternates across `fragments`.
///
/// A fragment with no alternates of its own contributes its primary text and
/// confidence as its single branch. Combined confidence is the minimum of the
/// confidences present along the branch, or `None` if no branch reports one.
pub(crate) fn cross_product(
    fragments: &[RecognitionResult],
    separator: &str,
    max: usize,
) -> Vec<Alternate> {
    let mut combined = Vec::new();
    if max == 0 || fragments.is_empty() {
        return combined;
    }
    let mut branch = Vec::with_capacity(fragments.len());
    descend(fragments, separator, max, &mut branch, &mut combined);
    combined
}

fn descend<'a>(
    fragments: &'a [RecognitionResult],
    separator: &str,
    max: usize,
    branch: &mut Vec<(&'a str, Option<f32>)>,
    combined: &mut Vec<Alternate>,
) {
    if combined.len() >= max {
        return;
    }
    let Some((fragment, rest)) = fragments.split_first() else {
        let text = join_non_empty(branch.iter().map(|(text, _)| *text), separator);
        let confidence = branch
            .iter()
            .filter_map(|(_, confidence)| *confidence)
            .reduce(f32::min);
        combined.push(Alternate::new(text, confidence));
        return;
    };

    if fragment.alternates.is_empty() {
        branch.push((fragment.text.as_str(), Some(fragment.confidence)));
        descend(rest, separator, max, branch, combined);
        branch.pop();
    } else {
        for alternate in &fragment.alternates {
            if combined.len() >= max {
                break;
            }
            branch.push((alternate.text.as_str(), alternate.confidence));
            descend(rest, separator, max, branch, combined);
            branch.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSegment;
    use crate::time::Timestamp;

    fn fragment(text: &str, confidence: f32, alternates: Vec<Alternate>) -> RecognitionResult {
        RecognitionResult::new_final(
            text,
            confidence,
            AudioSegment::empty(16000),
            None,
            Timestamp::from_millis(0),
        )
        .with_alternates(alternates)
    }

    #[test]
    fn test_join_skips_empty_texts() {
        let joined = join_non_empty(["hello", "", "world"].into_iter(), " ");
        assert_eq!(joined, "hello world");
    }

    #[test]
    fn test_join_all_empty_is_empty() {
        let joined = join_non_empty(["", ""].into_iter(), " ");
        assert_eq!(joined, "");
    }

    #[test]
    fn test_join_single_text_has_no_separator() {
        let joined = join_non_empty(["foo"].into_iter(), " ");
        assert_eq!(joined, "foo");
    }

    #[test]
    fn test_two_by_two_product_depth_first() {
        let fragments = vec![
            fragment(
                "a",
                0.9,
                vec![
                    Alternate::new("a1", Some(0.8)),
                    Alternate::new("a2", Some(0.6)),
                ],
            ),
            fragment(
                "b",
                0.9,
                vec![
                    Alternate::new("b1", Some(0.7)),
                    Alternate::new("b2", Some(0.5)),
                ],
            ),
        ];

        let combined = cross_product(&fragments, " ", 8);

        let texts: Vec<&str> = combined.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["a1 b1", "a1 b2", "a2 b1", "a2 b2"]);
        assert_eq!(combined[0].confidence, Some(0.7));
        assert_eq!(combined[1].confidence, Some(0.5));
        assert_eq!(combined[2].confidence, Some(0.6));
        assert_eq!(combined[3].confidence, Some(0.5));
    }

    #[test]
    fn test_cap_truncates_enumeration() {
        let fragments = vec![
            fragment(
                "a",
                0.9,
                vec![
                    Alternate::new("a1", None),
                    Alternate::new("a2", None),
                    Alternate::new("a3", None),
                ],
            ),
            fragment(
                "b",
                0.9,
                vec![
                    Alternate::new("b1", None),
                    Alternate::new("b2", None),
                    Alternate::new("b3", None),
                ],
            ),
        ];

        let combined = cross_product(&fragments, " ", 4);

        assert_eq!(combined.len(), 4);
        let texts: Vec<&str> = combined.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["a1 b1", "a1 b2", "a1 b3", "a2 b1"]);
    }

    #[test]
    fn test_fragment_without_alternates_uses_primary() {
        let fragments = vec![
            fragment("hello", 0.9, Vec::new()),
            fragment(
                "world",
                0.8,
                vec![
                    Alternate::new("world", Some(0.8)),
                    Alternate::new("whirled", Some(0.3)),
                ],
            ),
        ];

        let combined = cross_product(&fragments, " ", 8);

        let texts: Vec<&str> = combined.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["hello world", "hello whirled"]);
        assert_eq!(combined[0].confidence, Some(0.8));
        assert_eq!(combined[1].confidence, Some(0.3));
    }

    #[test]
    fn test_confidence_ignores_missing_values() {
        let fragments = vec![
            fragment("a", 0.9, vec![Alternate::new("a1", None)]),
            fragment("b", 0.9, vec![Alternate::new("b1", Some(0.4))]),
        ];

        let combined = cross_product(&fragments, " ", 8);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].confidence, Some(0.4));
    }

    #[test]
    fn test_all_confidences_missing_yields_none() {
        let fragments = vec![fragment("a", 0.9, vec![Alternate::new("a1", None)])];

        let combined = cross_product(&fragments, " ", 8);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].confidence, None);
    }

    #[test]
    fn test_empty_branch_text_is_skipped_in_join() {
        let fragments = vec![
            fragment("", 0.9, Vec::new()),
            fragment("world", 0.8, Vec::new()),
        ];

        let combined = cross_product(&fragments, " ", 8);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].text, "world");
    }

    #[test]
    fn test_zero_cap_yields_nothing() {
        let fragments = vec![fragment("a", 0.9, Vec::new())];
        assert!(cross_product(&fragments, " ", 0).is_empty());
    }

    #[test]
    fn test_no_fragments_yields_nothing() {
        assert!(cross_product(&[], " ", 8).is_empty());
    }
}
