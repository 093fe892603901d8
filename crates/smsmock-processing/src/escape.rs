/// Escapes a string for safe embedding in HTML or SVG markup.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their entity equivalents.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a string for an XML text node, dropping characters XML 1.0 forbids.
///
/// Control characters other than tab, newline and carriage return (and the
/// noncharacters U+FFFE, U+FFFF) make the whole document unparseable.
pub fn escape_xml(s: &str) -> String {
    let allowed: String = s.chars().filter(|&c| is_xml_char(c)).collect();
    escape_html(&allowed)
}

fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}
