pub fn truncate_for_log(text: &str) -> String {
    let trimmed = text.trim();
    let max_chars = 300usize;
    match trimmed.char_indices().nth(max_chars) {
        None => trimmed.to_string(),
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
    }
}

pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_only_trimmed() {
        assert_eq!(truncate_for_log("  ok \n"), "ok");
    }

    #[test]
    fn long_multibyte_text_is_cut_on_a_char_boundary() {
        let text = "가".repeat(400);
        let truncated = truncate_for_log(&text);
        assert_eq!(truncated, format!("{}...", "가".repeat(300)));
    }

    #[test]
    fn success_range() {
        assert!(is_success_status(200));
        assert!(is_success_status(201));
        assert!(!is_success_status(199));
        assert!(!is_success_status(400));
        assert!(!is_success_status(503));
    }
}
