use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `s` to at most `max_width` terminal columns, ending in `…` when cut.
/// Process names can carry wide glyphs, so this counts columns, not chars.
pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_pass_through() {
        assert_eq!(truncate_unicode("bash", 30), "bash");
    }

    #[test]
    fn long_names_end_in_ellipsis() {
        let cut = truncate_unicode("systemd-journald-audit", 10);
        assert_eq!(cut, "systemd-j\u{2026}");
        assert_eq!(cut.width(), 10);
    }

    #[test]
    fn wide_glyphs_count_two_columns() {
        let cut = truncate_unicode("進程監視器", 5);
        assert!(cut.width() <= 5);
        assert!(cut.ends_with('\u{2026}'));
    }
}
