//! Pulls the YAML body out of a model response that may be wrapped in
//! markdown code fences.

const FENCE: &str = "```";
const LABELED_FENCES: [&str; 2] = ["```yaml", "```yml"];

/// Returns the content of the first fenced block, preferring the earliest
/// block labeled `yaml` or `yml`. Without fences the trimmed text is returned
/// as-is. An unclosed fence yields everything after the opening marker.
pub fn extract_yaml(text: &str) -> &str {
    let text = text.trim();

    let labeled = LABELED_FENCES
        .iter()
        .filter_map(|label| text.find(label).map(|start| start + label.len()))
        .min();
    if let Some(body) = labeled {
        return until_fence(&text[body..]);
    }

    if let Some(start) = text.find(FENCE) {
        return until_fence(&text[start + FENCE.len()..]);
    }

    text
}

fn until_fence(rest: &str) -> &str {
    match rest.find(FENCE) {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_yaml_labeled_fence() {
        let input = "Here you go:\n```yaml\ncv:\n  name: Jane\n```\nGood luck!";
        assert_eq!(extract_yaml(input), "cv:\n  name: Jane");
    }

    #[test]
    fn test_extracts_unlabeled_fence() {
        let input = "```\ncv:\n  name: Jane\n```";
        assert_eq!(extract_yaml(input), "cv:\n  name: Jane");
    }

    #[test]
    fn test_labeled_fence_wins_over_earlier_plain_fence() {
        let input = "```\nnot this\n```\n```yaml\ncv: {}\n```";
        assert_eq!(extract_yaml(input), "cv: {}");
    }

    #[test]
    fn test_earliest_labeled_fence_wins() {
        let input = "```yml\nfirst: 1\n```\n```yaml\nsecond: 2\n```";
        assert_eq!(extract_yaml(input), "first: 1");
    }

    #[test]
    fn test_only_first_block_is_taken() {
        let input = "```yaml\na: 1\n```\n```yaml\nb: 2\n```";
        assert_eq!(extract_yaml(input), "a: 1");
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(extract_yaml("\n  cv:\n    name: Jane\n\n"), "cv:\n    name: Jane");
    }

    #[test]
    fn test_unclosed_fence_keeps_remainder() {
        assert_eq!(extract_yaml("```yaml\ncv: {}\n"), "cv: {}");
    }
}
